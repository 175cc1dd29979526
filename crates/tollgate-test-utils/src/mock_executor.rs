//! Recording service executor.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::{Arc, RwLock};
use tollgate_gateway::{ExecutionError, ServiceExecutor};
use tollgate_types::{PaymentReceipt, ServiceDescriptor, ServiceId, Url};

/// One call seen by the executor.
#[derive(Debug, Clone)]
pub struct ExecutedCall {
    /// Service that was called
    pub service_id: ServiceId,
    /// Endpoint that was called
    pub endpoint: Url,
    /// Parameters sent
    pub parameters: Map<String, Value>,
    /// Receipt presented as proof of payment
    pub receipt: PaymentReceipt,
}

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Status(u16, String),
    Hang,
}

struct RecordingExecutorInner {
    calls: Vec<ExecutedCall>,
    reply: Reply,
}

/// A [`ServiceExecutor`] that records calls and answers from a script.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct RecordingExecutor {
    inner: Arc<RwLock<RecordingExecutorInner>>,
}

impl Default for RecordingExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingExecutor {
    /// Answer every call with `{ "result": "ok" }`.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RecordingExecutorInner {
                calls: Vec::new(),
                reply: Reply::Json(json!({ "result": "ok" })),
            })),
        }
    }

    /// Answer every call with `value`.
    pub fn replying(value: Value) -> Self {
        let executor = Self::new();
        executor.inner.write().unwrap().reply = Reply::Json(value);
        executor
    }

    /// Fail every call with an HTTP status.
    pub fn failing(status: u16, body: &str) -> Self {
        let executor = Self::new();
        executor.inner.write().unwrap().reply = Reply::Status(status, body.to_string());
        executor
    }

    /// Never answer.
    pub fn hanging() -> Self {
        let executor = Self::new();
        executor.inner.write().unwrap().reply = Reply::Hang;
        executor
    }

    /// Every call so far.
    pub fn calls(&self) -> Vec<ExecutedCall> {
        self.inner.read().unwrap().calls.clone()
    }

    /// Number of calls so far.
    pub fn call_count(&self) -> usize {
        self.inner.read().unwrap().calls.len()
    }
}

#[async_trait]
impl ServiceExecutor for RecordingExecutor {
    async fn execute(
        &self,
        descriptor: &ServiceDescriptor,
        parameters: &Map<String, Value>,
        receipt: &PaymentReceipt,
    ) -> Result<Value, ExecutionError> {
        let reply = {
            let mut inner = self.inner.write().unwrap();
            inner.calls.push(ExecutedCall {
                service_id: descriptor.service_id.clone(),
                endpoint: descriptor.endpoint.clone(),
                parameters: parameters.clone(),
                receipt: receipt.clone(),
            });
            inner.reply.clone()
        };

        match reply {
            Reply::Json(value) => Ok(value),
            Reply::Status(status, body) => Err(ExecutionError::Status { status, body }),
            Reply::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending future resolved")
            }
        }
    }
}
