//! Keys command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use platewise_vision::{CredentialPool, KeyRotationGateway};

/// Execute the keys command.
///
/// Cooldowns live in memory only, so a fresh process reports every
/// configured slot as available.
pub fn execute_keys(config: &Config, formatter: &Formatter) -> Result<()> {
    let pool = CredentialPool::from_config_and_env(&config.analyzer.vision.api_keys);
    let gateway = KeyRotationGateway::new(pool).with_cooldown(config.analyzer.vision.cooldown());
    println!("{}", formatter.format_keys(&gateway.status())?);
    Ok(())
}
