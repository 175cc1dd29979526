//! Calling a paid service endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};
use tollgate_types::{PaymentReceipt, ServiceDescriptor, TransactionId};

/// Header carrying the payment transaction id.
pub const PAYMENT_HEADER: &str = "X-Payment-Transaction";

/// Default HTTP timeout for service calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Why a service call failed.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The service answered with a non-2xx status.
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The service could not be reached.
    #[error("service unreachable: {0}")]
    Transport(String),

    /// The service did not answer in time.
    #[error("service did not answer within {0:?}")]
    Timeout(Duration),

    /// The response body could not be read.
    #[error("invalid service response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ExecutionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Invokes a resolved service with proof of payment.
#[async_trait]
pub trait ServiceExecutor: Send + Sync {
    /// Call `descriptor.endpoint` with `parameters` and the confirmed `receipt`.
    async fn execute(
        &self,
        descriptor: &ServiceDescriptor,
        parameters: &Map<String, Value>,
        receipt: &PaymentReceipt,
    ) -> Result<Value, ExecutionError>;
}

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    parameters: &'a Map<String, Value>,
    transaction_id: &'a TransactionId,
}

/// Calls services over HTTP.
///
/// `POST {endpoint}` with `{ "parameters": ..., "transaction_id": ... }` and
/// the transaction id in the `X-Payment-Transaction` header. A 2xx JSON body
/// is the result; a non-JSON body is returned as a JSON string.
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// Create an executor with the default transport timeout.
    pub fn new() -> Result<Self, ExecutionError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create an executor with a transport timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ExecutionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExecutionError::Transport(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ServiceExecutor for HttpExecutor {
    async fn execute(
        &self,
        descriptor: &ServiceDescriptor,
        parameters: &Map<String, Value>,
        receipt: &PaymentReceipt,
    ) -> Result<Value, ExecutionError> {
        debug!(
            endpoint = %descriptor.endpoint,
            tx = %receipt.transaction_id,
            "Calling service"
        );

        let body = ExecuteRequest {
            parameters,
            transaction_id: &receipt.transaction_id,
        };
        let response = self
            .client
            .post(descriptor.endpoint.clone())
            .header(PAYMENT_HEADER, receipt.transaction_id.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ExecutionError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            warn!(endpoint = %descriptor.endpoint, %status, "Service call failed");
            return Err(ExecutionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}
