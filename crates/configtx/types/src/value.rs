//! Payloads carried by a configuration update.
//!
//! Value and policy bodies are opaque bytes to the tree walk; the handler that
//! owns a key decodes them (JSON) into its own typed representation.

use crate::error::{ConfigTxError, Result};
use crate::policy_type::PolicyType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single proposed configuration value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValue {
    pub version: u64,
    pub value: Vec<u8>,
    /// Name of the policy that governs future modification of this value.
    #[serde(default)]
    pub mod_policy: String,
}

impl ConfigValue {
    pub fn new(value: Vec<u8>) -> Self {
        Self {
            version: 0,
            value,
            mod_policy: String::new(),
        }
    }

    /// Encode a typed value as the JSON body of a config value.
    pub fn json<T: Serialize>(body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| ConfigTxError::Config(format!("cannot encode value: {e}")))?;
        Ok(Self::new(bytes))
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn with_mod_policy(mut self, mod_policy: impl Into<String>) -> Self {
        self.mod_policy = mod_policy.into();
        self
    }

    /// Decode the body for `key`. Malformed bodies are validation failures.
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        serde_json::from_slice(&self.value).map_err(|e| ConfigTxError::Decode {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

/// A typed policy body: which provider compiles it and the encoded rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyPayload {
    pub policy_type: PolicyType,
    pub value: Vec<u8>,
}

/// A single proposed policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPolicy {
    pub version: u64,
    pub policy: PolicyPayload,
    #[serde(default)]
    pub mod_policy: String,
}

impl ConfigPolicy {
    pub fn new(policy_type: PolicyType, value: Vec<u8>) -> Self {
        Self {
            version: 0,
            policy: PolicyPayload { policy_type, value },
            mod_policy: String::new(),
        }
    }

    /// Encode a typed rule as the JSON body of a policy of `policy_type`.
    pub fn json<T: Serialize>(policy_type: PolicyType, rule: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(rule)
            .map_err(|e| ConfigTxError::Config(format!("cannot encode policy: {e}")))?;
        Ok(Self::new(policy_type, bytes))
    }

    /// Wrap this policy as a generic config value (the non-privileged path).
    pub fn to_value(&self) -> Result<ConfigValue> {
        ConfigValue::json(self)
    }
}

/// One node of a configuration update tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigGroup {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub groups: BTreeMap<String, ConfigGroup>,
    #[serde(default)]
    pub values: BTreeMap<String, ConfigValue>,
    #[serde(default)]
    pub policies: BTreeMap<String, ConfigPolicy>,
    #[serde(default)]
    pub mod_policy: String,
}

impl ConfigGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, name: impl Into<String>, group: ConfigGroup) -> Self {
        self.groups.insert(name.into(), group);
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn with_policy(mut self, key: impl Into<String>, policy: ConfigPolicy) -> Self {
        self.policies.insert(key.into(), policy);
        self
    }

    /// Child group names in sorted order.
    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }
}
