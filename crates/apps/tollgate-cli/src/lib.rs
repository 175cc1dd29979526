//! Command-line interface for Tollgate.
//!
//! This crate provides the `tollgate` binary:
//!
//! - **Account**: `init`, `address`, `balance`
//! - **Directory**: `resolve` a service without paying
//! - **Invocation**: `call` any service, or the `search` / `research` tools
//!
//! # Quick Start
//!
//! ```bash
//! # Write a config and a fresh signing key
//! tollgate init --key-file ~/.tollgate/payer.key
//!
//! # Fund the printed address, then
//! tollgate balance
//! tollgate call tavily_search -p query="rust async runtimes"
//! ```
//!
//! # Output Formats
//!
//! All commands support `--format human|json`.
//!
//! # Configuration
//!
//! Loaded from the platform config directory (`config.toml`), or
//! `$TOLLGATE_HOME/config.toml`. Override with `--config`. A `.env` file in
//! the working directory is loaded first, so `TOLLGATE_PRIVATE_KEY` can live
//! there.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod progress;

// Re-export main types
pub use cli::{Cli, Commands, CompletionShell, OutputFormatArg};
pub use config::CliConfig;
pub use context::GatewayContext;
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, Render};
