//! Output formatting for CLI.

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use 'human' or 'json'.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Trait for renderable output.
pub trait Render: Serialize {
    /// Render as human-readable string.
    fn render_human(&self) -> String;

    /// Render as JSON string.
    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Render in the specified format.
    fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => self.render_human(),
            OutputFormat::Json => self.render_json(),
        }
    }
}

// =============================================================================
// Output Types
// =============================================================================

/// Output for `init`.
#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub config_path: String,
    pub network: String,
    pub credential: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Render for InitOutput {
    fn render_human(&self) -> String {
        let mut lines = vec![
            format!(
                "{} {}",
                "Configuration saved to:".green().bold(),
                self.config_path
            ),
            format!("{} {}", "Network:".bold(), self.network),
            format!("{} {}", "Signing key:".bold(), self.credential),
        ];
        if let Some(address) = &self.address {
            lines.push(format!("{} {}", "Address:".bold(), address));
        }
        lines.join("\n")
    }
}

/// Output for `address`.
#[derive(Debug, Serialize)]
pub struct AddressOutput {
    pub address: String,
    pub network: String,
    pub public_key: String,
}

impl Render for AddressOutput {
    fn render_human(&self) -> String {
        [
            format!("{} {}", "Address:".bold(), self.address),
            format!("{} {}", "Network:".bold(), self.network),
            format!("{} {}", "Public Key:".bold(), self.public_key),
        ]
        .join("\n")
    }
}

/// Output for `balance`.
#[derive(Debug, Serialize)]
pub struct BalanceOutput {
    pub address: String,
    pub balance: String,
    pub currency: String,
}

impl Render for BalanceOutput {
    fn render_human(&self) -> String {
        format!(
            "{} {} {}\n{} {}",
            "Balance:".bold(),
            self.balance.green(),
            self.currency,
            "Account:".dimmed(),
            self.address
        )
    }
}

/// Output for `resolve`.
#[derive(Debug, Serialize)]
pub struct ResolveOutput {
    pub service_id: String,
    pub endpoint: String,
    pub price: String,
    pub currency: String,
    pub payee: String,
}

impl Render for ResolveOutput {
    fn render_human(&self) -> String {
        [
            format!("{} {}", "Service:".bold(), self.service_id),
            format!("{} {}", "Endpoint:".bold(), self.endpoint),
            format!(
                "{} {} {}",
                "Price:".bold(),
                self.price.yellow(),
                self.currency
            ),
            format!("{} {}", "Payee:".bold(), self.payee),
        ]
        .join("\n")
    }
}

/// Output for `call`.
#[derive(Debug, Serialize)]
pub struct CallOutput {
    pub service_id: String,
    pub request_id: String,
    pub transaction_id: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub state: String,
    pub result: Value,
}

impl Render for CallOutput {
    fn render_human(&self) -> String {
        let mut lines = vec![format!(
            "{} {} ({})",
            "Completed".green().bold(),
            self.service_id,
            self.state
        )];
        if let (Some(tx), Some(amount), Some(currency)) =
            (&self.transaction_id, &self.amount, &self.currency)
        {
            lines.push(format!(
                "{} {} {} {}",
                "Paid:".bold(),
                amount,
                currency,
                format!("(tx {})", tx).dimmed()
            ));
        }
        lines.push(String::new());
        lines.push(render_value(&self.result));
        lines.join("\n")
    }
}

/// Output for `search` and `research`.
#[derive(Debug, Serialize)]
pub struct ToolOutput {
    pub tool: String,
    pub query: String,
    pub output: String,
}

impl Render for ToolOutput {
    fn render_human(&self) -> String {
        format!("{} {}\n\n{}", self.tool.bold(), self.query.dimmed(), self.output)
    }
}

/// Pretty-print a result payload; strings are shown as is.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
