//! Bundle configuration

use configtx_types::{ConfigTxError, PolicyType, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Construction-time settings for a resource bundle and its coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Policy types the provider registry visits, in order.
    pub policy_types: Vec<PolicyType>,

    /// Number of commit records the coordinator retains.
    pub history_limit: usize,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            policy_types: PolicyType::ALL.to_vec(),
            history_limit: 64,
        }
    }
}

impl BundleConfig {
    /// Load configuration from a TOML file, or the default if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigTxError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ConfigTxError::Config(e.to_string()))
    }
}
