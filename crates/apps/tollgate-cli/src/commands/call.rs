//! Pay for and call a service.

use std::time::Duration;

use serde_json::{Map, Value};
use tollgate_gateway::{CancellationToken, InvokeOptions};
use tollgate_types::{ServiceId, ServiceRequest};
use tracing::info;

use crate::config::CliConfig;
use crate::context::GatewayContext;
use crate::error::{CliError, CliResult};
use crate::output::{CallOutput, OutputFormat, Render};
use crate::progress::with_spinner;

/// Parse `key=value` pairs. Values that parse as JSON are kept as JSON,
/// anything else becomes a string.
pub fn parse_params(pairs: &[String]) -> CliResult<Map<String, Value>> {
    let mut params = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| CliError::user(format!("Expected KEY=VALUE, got '{}'", pair)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::user(format!("Empty parameter name in '{}'", pair)));
        }
        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        params.insert(key.to_string(), value);
    }
    Ok(params)
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling invocation");
            token.cancel();
        }
    });
}

/// Execute the call command.
pub async fn call(
    config: CliConfig,
    format: OutputFormat,
    service_id: &str,
    params: &[String],
    timeout: Option<u64>,
) -> CliResult<String> {
    let service_id =
        ServiceId::new(service_id).map_err(|e| CliError::user(e.to_string()))?;
    let parameters = parse_params(params)?;

    let ctx = GatewayContext::new(config)?;
    let gateway = ctx.gateway()?;

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());
    let options = InvokeOptions {
        execution_timeout: timeout.map(Duration::from_secs),
        cancel: Some(cancel),
    };

    let request = ServiceRequest::new(service_id, parameters);
    let invocation = with_spinner(
        "Paying and calling service...",
        format,
        gateway.invoke_with(request, options),
    )
    .await?;

    let receipt = invocation.receipt();
    let output = CallOutput {
        service_id: invocation.request().service_id.to_string(),
        request_id: invocation.request().request_id.to_string(),
        transaction_id: receipt.map(|r| r.transaction_id.to_string()),
        amount: receipt.map(|r| r.amount.to_string()),
        currency: receipt.map(|r| r.currency.to_string()),
        state: invocation.request().state().to_string(),
        result: invocation.result().clone(),
    };
    Ok(output.render(format))
}
