//! The service invocation orchestrator.
//!
//! Every invocation walks one state machine:
//!
//! ```text
//! CREATED -> DIRECTORY_RESOLVED -> PAYMENT_CONFIRMED -> EXECUTING -> COMPLETED
//!    \______________\____________________\_________________\______-> FAILED
//! ```
//!
//! A request only leaves `DIRECTORY_RESOLVED` with a confirmed receipt, so a
//! service is never called before it is paid for.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use tollgate_account::AccountManager;
use tollgate_directory::ServiceDirectory;
use tollgate_settle::{RetryPolicy, SettleError, SettlementEngine};
use tollgate_types::{
    Address, PaymentReceipt, RequestState, ServiceDescriptor, ServiceId, ServiceRequest,
};

use crate::budget::BudgetTracker;
use crate::config::GatewayConfig;
use crate::error::{FailureContext, GatewayError, GatewayResult};
use crate::executor::{ExecutionError, ServiceExecutor};

/// Per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// Bound on the service call; the gateway default when `None`
    pub execution_timeout: Option<Duration>,
    /// Cancels the invocation at its next suspension point
    pub cancel: Option<CancellationToken>,
}

impl InvokeOptions {
    /// Options with an execution timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            execution_timeout: Some(timeout),
            cancel: None,
        }
    }
}

/// A completed invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    request: ServiceRequest,
    result: Value,
}

impl Invocation {
    /// The request in its final `COMPLETED` state, with its trace.
    pub fn request(&self) -> &ServiceRequest {
        &self.request
    }

    /// The confirmed receipt the service was called with.
    pub fn receipt(&self) -> Option<&PaymentReceipt> {
        self.request.receipt()
    }

    /// Result payload returned by the service.
    pub fn result(&self) -> &Value {
        &self.result
    }

    /// Take the result payload.
    pub fn into_result(self) -> Value {
        self.result
    }
}

/// Resolves, pays for and calls services on behalf of one account.
pub struct Gateway {
    directory: Arc<dyn ServiceDirectory>,
    engine: Arc<SettlementEngine>,
    account: Arc<AccountManager>,
    executor: Arc<dyn ServiceExecutor>,
    budget: Option<BudgetTracker>,
    payment_retry: RetryPolicy,
    execution_timeout: Duration,
}

impl Gateway {
    /// Assemble a gateway from its collaborators.
    pub fn new(
        directory: Arc<dyn ServiceDirectory>,
        engine: Arc<SettlementEngine>,
        account: Arc<AccountManager>,
        executor: Arc<dyn ServiceExecutor>,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            directory,
            engine,
            account,
            executor,
            budget: config
                .budget
                .map(|limit| BudgetTracker::new(limit, config.budget_currency)),
            payment_retry: RetryPolicy::from_config(&config.payment_retry),
            execution_timeout: config.execution_timeout,
        }
    }

    /// The paying account.
    pub fn account(&self) -> &Arc<AccountManager> {
        &self.account
    }

    /// Address of the paying account.
    pub fn get_account_address(&self) -> Address {
        self.account.get_address()
    }

    /// The settlement engine and its receipt book.
    pub fn engine(&self) -> &Arc<SettlementEngine> {
        &self.engine
    }

    /// The service directory.
    pub fn directory(&self) -> &Arc<dyn ServiceDirectory> {
        &self.directory
    }

    /// Session budget, if one is configured.
    pub fn budget(&self) -> Option<&BudgetTracker> {
        self.budget.as_ref()
    }

    /// Call `service_id` with `parameters` and return the result payload.
    pub async fn use_service(
        &self,
        service_id: &str,
        parameters: Map<String, Value>,
    ) -> GatewayResult<Value> {
        let service_id = ServiceId::new(service_id)
            .map_err(|_| GatewayError::InvalidServiceId(service_id.to_string()))?;
        let invocation = self
            .invoke(ServiceRequest::new(service_id, parameters))
            .await?;
        Ok(invocation.into_result())
    }

    /// Run `request` to completion.
    pub async fn invoke(&self, request: ServiceRequest) -> GatewayResult<Invocation> {
        self.invoke_with(request, InvokeOptions::default()).await
    }

    /// Run `request`, giving up with `Cancelled` once `cancel` fires.
    pub async fn invoke_with_cancel(
        &self,
        request: ServiceRequest,
        cancel: CancellationToken,
    ) -> GatewayResult<Invocation> {
        let options = InvokeOptions {
            cancel: Some(cancel),
            ..Default::default()
        };
        self.invoke_with(request, options).await
    }

    /// Run `request` with per-call options.
    #[instrument(
        skip_all,
        fields(service = %request.service_id, request_id = %request.request_id)
    )]
    pub async fn invoke_with(
        &self,
        mut request: ServiceRequest,
        options: InvokeOptions,
    ) -> GatewayResult<Invocation> {
        let cancel = options.cancel.unwrap_or_default();
        let execution_timeout = options.execution_timeout.unwrap_or(self.execution_timeout);

        let resolved = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            r = self.directory.resolve(&request.service_id) => Some(r),
        };
        let descriptor = match resolved {
            None => return Err(self.cancelled(&mut request).await),
            Some(Ok(descriptor)) => descriptor,
            Some(Err(source)) => {
                warn!(error = %source, "Directory lookup failed");
                return Err(GatewayError::Directory {
                    source,
                    context: fail(&mut request),
                });
            }
        };
        request.resolve(descriptor.clone()).map_err(internal)?;

        if let Some(budget) = &self.budget {
            if let Err(over) =
                budget.reserve(request.request_id, descriptor.price, descriptor.currency)
            {
                warn!(price = %descriptor.price, remaining = %over.remaining, "Over session budget");
                return Err(GatewayError::BudgetExceeded {
                    price: descriptor.price,
                    remaining: over.remaining,
                    currency: budget.currency(),
                    context: fail(&mut request),
                });
            }
        }

        let receipt = self.settle(&mut request, &descriptor, &cancel).await?;
        request
            .transition(RequestState::PaymentConfirmed)
            .map_err(internal)?;

        request
            .transition(RequestState::Executing)
            .map_err(internal)?;
        let call = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            r = timeout(
                execution_timeout,
                self.executor.execute(&descriptor, &request.parameters, &receipt),
            ) => Some(r),
        };

        let source = match call {
            None => return Err(self.cancelled(&mut request).await),
            Some(Ok(Ok(result))) => {
                request
                    .transition(RequestState::Completed)
                    .map_err(internal)?;
                info!(tx = %receipt.transaction_id, "Invocation completed");
                return Ok(Invocation { request, result });
            }
            Some(Ok(Err(source))) => source,
            Some(Err(_elapsed)) => ExecutionError::Timeout(execution_timeout),
        };

        warn!(
            tx = %receipt.transaction_id,
            error = %source,
            "Service failed after payment"
        );
        Err(GatewayError::Execution {
            source,
            context: fail(&mut request),
        })
    }

    /// Pay for the request, resuming a pending payment under bounded backoff.
    async fn settle(
        &self,
        request: &mut ServiceRequest,
        descriptor: &ServiceDescriptor,
        cancel: &CancellationToken,
    ) -> GatewayResult<PaymentReceipt> {
        let request_id = request.request_id;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let paid = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                r = self.engine.pay(&self.account, request_id, descriptor) => Some(r),
            };

            match paid {
                None => return Err(self.cancelled(request).await),
                Some(Ok(receipt)) => {
                    if let Some(budget) = &self.budget {
                        budget.settle(&receipt);
                    }
                    request.record_receipt(receipt.clone());
                    return Ok(receipt);
                }
                Some(Err(SettleError::Timeout { receipt })) => {
                    request.record_receipt(*receipt);
                    if attempts >= self.payment_retry.max_attempts() {
                        warn!(attempts, "Payment still pending, giving up");
                        return Err(GatewayError::PaymentTimeout {
                            attempts,
                            context: fail(request),
                        });
                    }

                    let delay = self.payment_retry.delay_for_attempt(attempts);
                    info!(attempts, ?delay, "Payment pending, resuming same request");
                    let cancelled = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => true,
                        _ = sleep(delay) => false,
                    };
                    if cancelled {
                        return Err(self.cancelled(request).await);
                    }
                }
                Some(Err(source)) => {
                    if let Some(receipt) = source.receipt() {
                        request.record_receipt(receipt.clone());
                    }
                    if let Some(budget) = &self.budget {
                        budget.release(&request_id);
                    }
                    warn!(error = %source, "Payment failed");
                    return Err(GatewayError::Settlement {
                        source,
                        context: fail(request),
                    });
                }
            }
        }
    }

    async fn cancelled(&self, request: &mut ServiceRequest) -> GatewayError {
        let receipt = self.engine.receipt(&request.request_id).await;
        if let Some(budget) = &self.budget {
            match &receipt {
                Some(receipt) if receipt.is_confirmed() => {
                    budget.settle(receipt);
                }
                // A pending transfer may still land; resuming settles it.
                Some(receipt) if receipt.is_pending() => {}
                _ => budget.release(&request.request_id),
            }
        }
        if let Some(receipt) = receipt {
            request.record_receipt(receipt);
        }
        info!(state = %request.state(), "Invocation cancelled");
        GatewayError::Cancelled {
            context: fail(request),
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("account", &self.account)
            .field("engine", &self.engine)
            .field("budget", &self.budget)
            .field("execution_timeout", &self.execution_timeout)
            .finish_non_exhaustive()
    }
}

/// Move the request to `FAILED` and capture where it was.
fn fail(request: &mut ServiceRequest) -> Box<FailureContext> {
    let state = request.state();
    request.fail();
    Box::new(FailureContext {
        service_id: request.service_id.clone(),
        request_id: request.request_id,
        state,
        receipt: request.receipt().cloned(),
        trace: request.trace().to_vec(),
    })
}

fn internal(err: tollgate_types::TypesError) -> GatewayError {
    GatewayError::internal(err.to_string())
}
