//! The `search` and `research` commands.

use tollgate_gateway::ServiceTool;

use crate::config::CliConfig;
use crate::context::GatewayContext;
use crate::error::CliResult;
use crate::output::{render_value, OutputFormat, Render, ToolOutput};
use crate::progress::with_spinner;

/// Run `tool` with `query`.
pub async fn tool(
    config: CliConfig,
    format: OutputFormat,
    tool: ServiceTool,
    query: &str,
) -> CliResult<String> {
    let ctx = GatewayContext::new(config)?;
    let gateway = ctx.gateway()?;

    let value = with_spinner(
        &format!("{}...", tool.name()),
        format,
        tool.invoke(&gateway, query),
    )
    .await?;

    let output = ToolOutput {
        tool: tool.name().to_string(),
        query: query.to_string(),
        output: render_value(&value),
    };
    Ok(output.render(format))
}
