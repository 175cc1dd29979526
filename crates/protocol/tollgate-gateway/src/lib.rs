//! Service invocation for Tollgate.
//!
//! The [`Gateway`] ties the pieces together for one paying account:
//!
//! 1. resolve the service in the [`ServiceDirectory`](tollgate_directory::ServiceDirectory)
//! 2. pay its price through the [`SettlementEngine`](tollgate_settle::SettlementEngine)
//! 3. call the endpoint with the confirmed receipt via a [`ServiceExecutor`]
//!
//! ```ignore
//! let result = gateway
//!     .use_service("tavily_search", ServiceTool::parameters("rust async runtimes"))
//!     .await?;
//! ```

mod budget;
mod config;
mod error;
mod executor;
mod orchestrator;
mod tools;

pub use budget::{BudgetStatus, BudgetTracker, OverBudget};
pub use config::GatewayConfig;
pub use error::{FailureContext, GatewayError, GatewayResult};
pub use executor::{ExecutionError, HttpExecutor, ServiceExecutor, PAYMENT_HEADER};
pub use orchestrator::{Gateway, Invocation, InvokeOptions};
pub use tools::ServiceTool;

pub use tokio_util::sync::CancellationToken;
