use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a policy encoding, used to pick the provider that compiles it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyType {
    /// Never has a provider.
    Unknown,
    Signature,
    Msp,
    ImplicitMeta,
}

impl PolicyType {
    /// Every defined policy type, in declaration order.
    pub const ALL: [PolicyType; 4] = [
        PolicyType::Unknown,
        PolicyType::Signature,
        PolicyType::Msp,
        PolicyType::ImplicitMeta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::Unknown => "UNKNOWN",
            PolicyType::Signature => "SIGNATURE",
            PolicyType::Msp => "MSP",
            PolicyType::ImplicitMeta => "IMPLICIT_META",
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
