//! Show the account address.

use crate::config::CliConfig;
use crate::context::GatewayContext;
use crate::error::CliResult;
use crate::output::{AddressOutput, OutputFormat, Render};

/// Execute the address command.
pub fn address(config: CliConfig, format: OutputFormat) -> CliResult<String> {
    let ctx = GatewayContext::new(config)?;

    let output = AddressOutput {
        address: ctx.account.address().to_string(),
        network: ctx.account.network().to_string(),
        public_key: format!("0x{}", hex::encode(ctx.account.public_key())),
    };
    Ok(output.render(format))
}
