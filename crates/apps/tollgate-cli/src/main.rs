//! Tollgate CLI binary entry point.

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tollgate_cli::{
    cli::{Cli, Commands},
    commands,
    config::{default_config_path, CliConfig},
    error::{CliError, CliResult},
    output::OutputFormat,
};
use tollgate_gateway::ServiceTool;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Keys may live in a local .env
    let _ = dotenvy::dotenv();

    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        print_error(&e);
        std::process::exit(e.exit_code());
    }
}

/// Install a subscriber when `--verbose` or `RUST_LOG` asks for logs.
fn init_logging(verbose: bool) {
    if !verbose && std::env::var("RUST_LOG").is_err() {
        return;
    }
    let mut filter = EnvFilter::from_default_env();
    if verbose {
        if let Ok(directive) = "tollgate=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Print a user-friendly error message with error kind and recovery hint.
fn print_error(e: &CliError) {
    eprintln!(
        "{} [{}]: {}",
        "Error".red().bold(),
        e.kind().to_string().yellow(),
        e
    );

    if let Some(suggestion) = e.suggestion() {
        eprintln!("{}: {}", "Hint".cyan(), suggestion);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let format: OutputFormat = cli.format.into();

    let output = match cli.command {
        Commands::Init { force, key_file } => {
            commands::init(&config_path, format, force, key_file.as_deref())?
        }

        Commands::Completions { shell } => commands::completions(shell)?,

        command => {
            let config = CliConfig::load(&config_path)?;
            match command {
                Commands::Address => commands::address(config, format)?,

                Commands::Balance { currency } => {
                    commands::balance(config, format, &currency).await?
                }

                Commands::Resolve { service_id } => {
                    commands::resolve(config, format, &service_id).await?
                }

                Commands::Call {
                    service_id,
                    params,
                    timeout,
                } => commands::call(config, format, &service_id, &params, timeout).await?,

                Commands::Search { query } => {
                    commands::tool(config, format, ServiceTool::TavilySearch, &query).await?
                }

                Commands::Research { query } => {
                    commands::tool(config, format, ServiceTool::GptResearcher, &query).await?
                }

                Commands::Init { .. } | Commands::Completions { .. } => String::new(),
            }
        }
    };

    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
