//! Named service tools for agents.
//!
//! Each tool is a thin wrapper over [`Gateway::use_service`] with a fixed
//! service id, taking a single query string.

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::error::GatewayResult;
use crate::orchestrator::Gateway;

/// Fixed set of paid capabilities exposed to agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceTool {
    /// Web search through Tavily.
    TavilySearch,
    /// Long-form research through GPT Researcher.
    GptResearcher,
}

impl ServiceTool {
    /// Every tool, in display order.
    pub const ALL: [ServiceTool; 2] = [ServiceTool::TavilySearch, ServiceTool::GptResearcher];

    /// Tool name shown to agents.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TavilySearch => "Tavily Search",
            Self::GptResearcher => "GPT Research",
        }
    }

    /// What the tool does.
    pub fn description(&self) -> &'static str {
        match self {
            Self::TavilySearch => "Search the internet for information using Tavily",
            Self::GptResearcher => "Conduct detailed analysis using GPT Researcher",
        }
    }

    /// Directory id of the backing service.
    pub fn service_id(&self) -> &'static str {
        match self {
            Self::TavilySearch => "tavily_search",
            Self::GptResearcher => "gpt_researcher",
        }
    }

    /// Parameters sent for `query`.
    pub fn parameters(query: &str) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("query".to_string(), json!(query));
        params
    }

    /// Call the service with `{ "query": query }`.
    pub async fn invoke(&self, gateway: &Gateway, query: &str) -> GatewayResult<Value> {
        gateway
            .use_service(self.service_id(), Self::parameters(query))
            .await
    }

    /// Call the service and render the outcome as text.
    ///
    /// Failures are logged and returned as an `Error: ...` line.
    pub async fn run(&self, gateway: &Gateway, query: &str) -> String {
        match self.invoke(gateway, query).await {
            Ok(value) => render(&value),
            Err(e) => {
                warn!(tool = self.name(), kind = %e.kind(), error = %e, "Tool call failed");
                format!("Error: {}", e)
            }
        }
    }
}

impl std::fmt::Display for ServiceTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
