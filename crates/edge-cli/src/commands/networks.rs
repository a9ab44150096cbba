//! `networks`: built-in and configured profiles

use edge_suite::NetworkProfile;
use serde_json::{json, Value};

use crate::{config::Config, output::Output, CliError};

pub fn execute(config: &Config, json: bool) -> Result<(), CliError> {
    let mut entries = Vec::new();
    let mut lines = Vec::new();

    for name in config.network_names() {
        let source = match (
            NetworkProfile::builtin(&name).is_some(),
            config.networks.contains_key(&name),
        ) {
            (true, true) => "builtin+config",
            (true, false) => "builtin",
            _ => "config",
        };
        let marker = if name == config.network { "*" } else { " " };

        match config.profile(&name) {
            Ok(profile) => {
                let gas = profile
                    .default_gas_limit
                    .map_or_else(|| "estimate".to_string(), |g| g.to_string());
                lines.push(format!(
                    "{} {:<16} chain {:<6} {:<28} signers {}  gas {}  ({})",
                    marker,
                    profile.name,
                    profile.chain_id,
                    profile.url,
                    profile.private_keys.len(),
                    gas,
                    source
                ));
                entries.push(json!({
                    "name": profile.name,
                    "url": profile.url,
                    "chain_id": profile.chain_id,
                    "signers": profile.private_keys.len(),
                    "default_gas_limit": profile.default_gas_limit,
                    "tx_type": profile.tx_kind,
                    "settle_ms": profile.settle_delay.as_millis() as u64,
                    "timeout_secs": profile.timeout.as_secs(),
                    "source": source,
                    "default": name == config.network,
                }));
            }
            Err(e) => {
                lines.push(format!("{} {:<16} invalid: {}", marker, name, e));
                entries.push(json!({ "name": name, "error": e.to_string(), "source": source }));
            }
        }
    }

    Output::new(json)
        .field("networks", Value::Array(entries))
        .lines(lines)
        .print();
    Ok(())
}
