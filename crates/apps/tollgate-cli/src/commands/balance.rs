//! Show the account balance.

use tollgate_types::Currency;

use crate::config::CliConfig;
use crate::context::GatewayContext;
use crate::error::{CliError, CliResult};
use crate::output::{BalanceOutput, OutputFormat, Render};
use crate::progress::with_spinner;

/// Execute the balance command.
pub async fn balance(config: CliConfig, format: OutputFormat, currency: &str) -> CliResult<String> {
    let currency: Currency = currency
        .parse()
        .map_err(|e: tollgate_types::TypesError| CliError::user(e.to_string()))?;
    let ctx = GatewayContext::new(config)?;

    let amount = with_spinner(
        "Querying ledger...",
        format,
        ctx.account.get_balance(currency),
    )
    .await?;

    let output = BalanceOutput {
        address: ctx.account.address().to_string(),
        balance: amount.to_string(),
        currency: currency.to_string(),
    };
    Ok(output.render(format))
}
