//! Network profiles
//!
//! A profile names a node endpoint and everything needed to drive it: the
//! chain id it must report, the signer keys, and the timing the suites use
//! while waiting on it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{SuiteError, SuiteResult};

/// Hedera local node key for `0x67D8d32E9Bf1a9968a5ff53B87d777Aa8EBBEe69`
const HEDERA_LOCAL_KEY_0: &str = "0x105d050185ccb907fba04dd92d8de9e32c18305e097ab41dadda21489a211524";
/// Hedera local node key for `0x05FbA803Be258049A27B820088bab1cAD2058871`
const HEDERA_LOCAL_KEY_1: &str = "0x2e1d968b041d84dd120a5860cee60cd83f9374ef527ca86996317ada3d0d03e7";
const HEDERA_TESTNET_KEY: &str = "0x96ee63a654bd9d07915b5a38d765366c54838848bf7fc32a9a981e3988dbb8f8";
/// Besu dev genesis key for `0xf17f52151EbEF6C7334FAD080c5704D77216b732`
const BESU_KEY_0: &str = "ae6ae8e5ccbfb04590405997ee2d52d2b330726137b875053c36d94e974d162f";
/// Besu dev genesis key for `0x627306090abaB3A6e1400e9345bC60c78a8BEf57`
const BESU_KEY_1: &str = "c87509a1c067bbde78beb793e6fa76530b6382a4c0241e5e4a9ec0a0f44dc0d3";

/// Gas limit the local nodes are driven with when nothing else is given
const LOCAL_GAS_LIMIT: u64 = 1_000_000_000;

/// Transaction envelope used for submissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    /// Type 0, EIP-155 protected
    #[default]
    Legacy,
    /// Type 2
    Eip1559,
}

/// A node to run against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    /// Profile name
    pub name: String,
    /// JSON-RPC endpoint
    pub url: String,
    /// Chain id the node must report
    pub chain_id: u64,
    /// Signer private keys, hex
    pub private_keys: Vec<String>,
    /// Per-request timeout, also the receipt wait deadline
    pub timeout: Duration,
    /// Pause after deployments before the next step
    pub settle_delay: Duration,
    /// Receipt polling interval
    pub poll_interval: Duration,
    /// Gas limit used when a send gives none; `None` estimates
    pub default_gas_limit: Option<u64>,
    /// Envelope for submissions
    pub tx_kind: TxKind,
}

impl NetworkProfile {
    /// Built-in profile by name
    pub fn builtin(name: &str) -> Option<Self> {
        Self::builtins().into_iter().find(|p| p.name == name)
    }

    /// All built-in profiles
    pub fn builtins() -> Vec<Self> {
        vec![
            Self {
                name: "hedera_local".to_string(),
                url: "http://127.0.0.1:7546".to_string(),
                chain_id: 298,
                private_keys: vec![HEDERA_LOCAL_KEY_0.to_string(), HEDERA_LOCAL_KEY_1.to_string()],
                timeout: Duration::from_secs(60),
                settle_delay: Duration::from_millis(3000),
                poll_interval: Duration::from_millis(1000),
                default_gas_limit: Some(LOCAL_GAS_LIMIT),
                tx_kind: TxKind::Legacy,
            },
            Self {
                name: "hedera_testnet".to_string(),
                url: "http://127.0.0.1:7546".to_string(),
                chain_id: 296,
                private_keys: vec![HEDERA_TESTNET_KEY.to_string()],
                timeout: Duration::from_secs(60),
                settle_delay: Duration::from_millis(3000),
                poll_interval: Duration::from_millis(1000),
                default_gas_limit: None,
                tx_kind: TxKind::Legacy,
            },
            Self {
                name: "besu_local".to_string(),
                url: "http://127.0.0.1:8544".to_string(),
                chain_id: 1337,
                private_keys: vec![BESU_KEY_0.to_string(), BESU_KEY_1.to_string()],
                timeout: Duration::from_secs(60),
                settle_delay: Duration::from_millis(1000),
                poll_interval: Duration::from_millis(500),
                default_gas_limit: Some(LOCAL_GAS_LIMIT),
                tx_kind: TxKind::Legacy,
            },
        ]
    }

    /// Resolve `name` against the built-ins, then apply `overrides`. A name
    /// that is not built in needs both url and chain id in `overrides`.
    pub fn resolve(name: &str, overrides: Option<&ProfileOverrides>) -> SuiteResult<Self> {
        let mut profile = match (Self::builtin(name), overrides) {
            (Some(profile), _) => profile,
            (None, Some(o)) => match (&o.url, o.chain_id) {
                (Some(url), Some(chain_id)) => Self {
                    name: name.to_string(),
                    url: url.clone(),
                    chain_id,
                    private_keys: Vec::new(),
                    timeout: Duration::from_secs(60),
                    settle_delay: Duration::from_millis(3000),
                    poll_interval: Duration::from_millis(1000),
                    default_gas_limit: None,
                    tx_kind: TxKind::Legacy,
                },
                _ => {
                    return Err(SuiteError::Setup(format!(
                        "network {} is not built in and its config lacks url or chain_id",
                        name
                    )))
                }
            },
            (None, None) => {
                return Err(SuiteError::Unknown {
                    kind: "network",
                    id: name.to_string(),
                })
            }
        };
        if let Some(o) = overrides {
            o.apply(&mut profile);
        }
        Ok(profile)
    }
}

/// Per-network settings read from configuration; unset fields keep the
/// profile's value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileOverrides {
    /// Endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Chain id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Replaces the signer list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_keys: Option<Vec<String>>,
    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Settle delay in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_ms: Option<u64>,
    /// Receipt polling interval in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_ms: Option<u64>,
    /// Fixed gas limit; 0 switches to estimation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_gas_limit: Option<u64>,
    /// Envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<TxKind>,
}

impl ProfileOverrides {
    /// Write every set field into `profile`
    pub fn apply(&self, profile: &mut NetworkProfile) {
        if let Some(url) = &self.url {
            profile.url = url.clone();
        }
        if let Some(chain_id) = self.chain_id {
            profile.chain_id = chain_id;
        }
        if let Some(keys) = &self.private_keys {
            profile.private_keys = keys.clone();
        }
        if let Some(secs) = self.timeout_secs {
            profile.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.settle_ms {
            profile.settle_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.poll_ms {
            profile.poll_interval = Duration::from_millis(ms);
        }
        if let Some(gas) = self.default_gas_limit {
            profile.default_gas_limit = (gas > 0).then_some(gas);
        }
        if let Some(kind) = self.tx_type {
            profile.tx_kind = kind;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_sdk::Wallet;

    #[test]
    fn test_builtins() {
        let names: Vec<_> = NetworkProfile::builtins().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["hedera_local", "hedera_testnet", "besu_local"]);

        let local = NetworkProfile::builtin("hedera_local").unwrap();
        assert_eq!(local.chain_id, 298);
        assert_eq!(local.timeout, Duration::from_secs(60));
        assert_eq!(NetworkProfile::builtin("besu_local").unwrap().chain_id, 1337);
        assert_eq!(NetworkProfile::builtin("hedera_testnet").unwrap().chain_id, 296);
        assert!(NetworkProfile::builtin("mainnet").is_none());
    }

    #[test]
    fn test_builtin_keys_match_documented_addresses() {
        let local = NetworkProfile::builtin("hedera_local").unwrap();
        let addr = Wallet::from_private_key_hex(&local.private_keys[0]).unwrap();
        assert_eq!(
            addr.address().to_hex(),
            "0x67d8d32e9bf1a9968a5ff53b87d777aa8ebbee69"
        );

        let besu = NetworkProfile::builtin("besu_local").unwrap();
        let addr = Wallet::from_private_key_hex(&besu.private_keys[1]).unwrap();
        assert_eq!(
            addr.address().to_hex(),
            "0x627306090abab3a6e1400e9345bc60c78a8bef57"
        );
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = ProfileOverrides {
            url: Some("http://10.0.0.5:7546".to_string()),
            settle_ms: Some(0),
            default_gas_limit: Some(0),
            tx_type: Some(TxKind::Eip1559),
            ..Default::default()
        };
        let profile = NetworkProfile::resolve("hedera_local", Some(&overrides)).unwrap();
        assert_eq!(profile.url, "http://10.0.0.5:7546");
        assert_eq!(profile.chain_id, 298);
        assert_eq!(profile.settle_delay, Duration::ZERO);
        assert_eq!(profile.default_gas_limit, None);
        assert_eq!(profile.tx_kind, TxKind::Eip1559);
    }

    #[test]
    fn test_custom_network_needs_url_and_chain() {
        assert!(matches!(
            NetworkProfile::resolve("devnet", None),
            Err(SuiteError::Unknown { kind: "network", .. })
        ));

        let partial = ProfileOverrides {
            url: Some("http://localhost:8545".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            NetworkProfile::resolve("devnet", Some(&partial)),
            Err(SuiteError::Setup(_))
        ));

        let full = ProfileOverrides {
            chain_id: Some(31337),
            ..partial
        };
        let profile = NetworkProfile::resolve("devnet", Some(&full)).unwrap();
        assert_eq!(profile.chain_id, 31337);
        assert!(profile.private_keys.is_empty());
    }

    #[test]
    fn test_overrides_from_json() {
        let o: ProfileOverrides =
            serde_json::from_str(r#"{"chain_id": 298, "tx_type": "eip1559"}"#).unwrap();
        assert_eq!(o.chain_id, Some(298));
        assert_eq!(o.tx_type, Some(TxKind::Eip1559));
        assert!(serde_json::from_str::<ProfileOverrides>(r#"{"chainid": 1}"#).is_err());
    }
}
