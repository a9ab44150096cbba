//! CLI configuration management
//!
//! Lives at `~/.evm-edge/config.toml`:
//!
//! ```toml
//! network = "hedera_local"
//! artifacts_dir = "artifacts"
//!
//! [networks.hedera_testnet]
//! url = "https://testnet.hashio.io/api"
//! private_keys = ["0x..."]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use edge_suite::{NetworkProfile, ProfileOverrides};
use serde::{Deserialize, Serialize};

use crate::CliError;

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Network used when `--network` is not given
    #[serde(default = "default_network")]
    pub network: String,
    /// Root of the compiled contract artifacts
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
    /// Per-network overrides, keyed by profile name
    #[serde(default)]
    pub networks: BTreeMap<String, ProfileOverrides>,
}

fn default_network() -> String {
    "hedera_local".to_string()
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: default_network(),
            artifacts_dir: default_artifacts_dir(),
            networks: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".evm-edge"))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load config from file or return default
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    /// Load config from `path`
    pub fn load_from(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<PathBuf, CliError> {
        let path = Self::config_path()
            .ok_or_else(|| CliError::Config("cannot determine config path".to_string()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the profile called `name` with this config's overrides
    pub fn profile(&self, name: &str) -> Result<NetworkProfile, CliError> {
        Ok(NetworkProfile::resolve(name, self.networks.get(name))?)
    }

    /// Built-in profile names followed by configured-only ones
    pub fn network_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NetworkProfile::builtins()
            .into_iter()
            .map(|p| p.name)
            .collect();
        for name in self.networks.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Point `network` at `url` for this invocation only
    pub fn override_url(&mut self, network: &str, url: String) {
        self.networks.entry(network.to_string()).or_default().url = Some(url);
    }
}
