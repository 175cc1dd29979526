//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Tollgate CLI.
#[derive(Parser, Debug)]
#[command(name = "tollgate")]
#[command(author = "Tollgate Contributors")]
#[command(version)]
#[command(about = "Pay-per-call access to metered services")]
#[command(
    long_about = "Tollgate resolves a service in the directory, pays its price on the settlement network and calls it with the receipt.\n\nRun 'tollgate init' to get started."
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "TOLLGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (human or json).
    #[arg(short, long, global = true, default_value = "human")]
    pub format: OutputFormatArg,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Output format argument for clap.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormatArg {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Shells supported by `tollgate completions`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

/// CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // =========================================================================
    // Account Commands
    // =========================================================================
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing configuration.
        #[arg(long)]
        force: bool,

        /// Generate a signing key at this path and use it.
        #[arg(long)]
        key_file: Option<PathBuf>,
    },

    /// Show the account address and network.
    Address,

    /// Show the account balance.
    Balance {
        /// Currency to query.
        #[arg(long, default_value = "USDC")]
        currency: String,
    },

    // =========================================================================
    // Service Commands
    // =========================================================================
    /// Resolve a service in the directory (free).
    Resolve {
        /// Service identifier.
        service_id: String,
    },

    /// Pay for and call a service.
    Call {
        /// Service identifier.
        service_id: String,

        /// Parameter as key=value (repeatable). Values are parsed as JSON
        /// when possible.
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Bound on the service call in seconds.
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Search the web through the paid search service.
    Search {
        /// Search query.
        query: String,
    },

    /// Run a research task through the paid research service.
    Research {
        /// Research question.
        query: String,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: CompletionShell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_call() {
        let cli = Cli::parse_from([
            "tollgate",
            "--format",
            "json",
            "call",
            "tavily_search",
            "-p",
            "query=rust",
            "--param",
            "max_results=5",
            "--timeout",
            "30",
        ]);
        assert!(matches!(cli.format, OutputFormatArg::Json));
        match cli.command {
            Commands::Call {
                service_id,
                params,
                timeout,
            } => {
                assert_eq!(service_id, "tavily_search");
                assert_eq!(params, vec!["query=rust", "max_results=5"]);
                assert_eq!(timeout, Some(30));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tollgate", "balance", "-v", "--config", "/tmp/t.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.toml")));
    }
}
