//! Per-invocation request state machine.
//!
//! ```text
//! CREATED → DIRECTORY_RESOLVED → PAYMENT_CONFIRMED → EXECUTING → COMPLETED
//!    └────────────┴───────────────────┴─────────────────┴──────→ FAILED
//! ```
//!
//! `PAYMENT_CONFIRMED` and `EXECUTING` are only reachable while the request
//! holds a confirmed receipt.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TypesError, TypesResult};
use crate::receipt::{PaymentReceipt, RequestId};
use crate::service::{ServiceDescriptor, ServiceId};
use crate::now_millis;

/// Lifecycle state of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    Created,
    DirectoryResolved,
    PaymentConfirmed,
    Executing,
    Completed,
    Failed,
}

impl RequestState {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `self → next` is an edge of the state machine.
    pub fn can_transition_to(&self, next: RequestState) -> bool {
        use RequestState::*;
        match (self, next) {
            (Created, DirectoryResolved)
            | (DirectoryResolved, PaymentConfirmed)
            | (PaymentConfirmed, Executing)
            | (Executing, Completed) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::DirectoryResolved => "DIRECTORY_RESOLVED",
            Self::PaymentConfirmed => "PAYMENT_CONFIRMED",
            Self::Executing => "EXECUTING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded edge of a request's state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: RequestState,
    pub to: RequestState,
    /// Unix milliseconds.
    pub at: u64,
}

/// A single invocation of a paid service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    /// Idempotency key shared by every retry of this request.
    pub request_id: RequestId,
    /// Requested service.
    pub service_id: ServiceId,
    /// Parameters forwarded to the endpoint.
    pub parameters: Map<String, Value>,
    descriptor: Option<ServiceDescriptor>,
    receipt: Option<PaymentReceipt>,
    state: RequestState,
    trace: Vec<StateTransition>,
}

impl ServiceRequest {
    /// Create a request in the `CREATED` state.
    pub fn new(service_id: ServiceId, parameters: Map<String, Value>) -> Self {
        Self {
            request_id: RequestId::new(),
            service_id,
            parameters,
            descriptor: None,
            receipt: None,
            state: RequestState::Created,
            trace: Vec::new(),
        }
    }

    /// Use a caller-chosen request ID (for resuming a request).
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn descriptor(&self) -> Option<&ServiceDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn receipt(&self) -> Option<&PaymentReceipt> {
        self.receipt.as_ref()
    }

    /// Every transition taken so far, oldest first.
    pub fn trace(&self) -> &[StateTransition] {
        &self.trace
    }

    /// Record the resolved descriptor and move to `DIRECTORY_RESOLVED`.
    pub fn resolve(&mut self, descriptor: ServiceDescriptor) -> TypesResult<()> {
        self.transition(RequestState::DirectoryResolved)?;
        self.descriptor = Some(descriptor);
        Ok(())
    }

    /// Attach the latest known receipt without changing state.
    pub fn record_receipt(&mut self, receipt: PaymentReceipt) {
        self.receipt = Some(receipt);
    }

    /// Move to `next`, enforcing the state machine and the receipt guard.
    pub fn transition(&mut self, next: RequestState) -> TypesResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(TypesError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        if matches!(next, RequestState::PaymentConfirmed | RequestState::Executing)
            && !self.receipt.as_ref().is_some_and(PaymentReceipt::is_confirmed)
        {
            return Err(TypesError::ReceiptNotConfirmed(self.request_id.to_string()));
        }

        self.trace.push(StateTransition {
            from: self.state,
            to: next,
            at: now_millis(),
        });
        self.state = next;
        Ok(())
    }

    /// Move to `FAILED` unless already terminal.
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            let _ = self.transition(RequestState::Failed);
        }
    }

    /// Whether the trace ever entered `state`.
    pub fn visited(&self, state: RequestState) -> bool {
        self.trace.iter().any(|t| t.to == state)
    }
}
