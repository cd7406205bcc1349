use configtx_types::{ConfigTxError, PolicyType};
use thiserror::Error;

/// Errors from compiling or evaluating policies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("policy not satisfied: {0}")]
    Unsatisfied(String),

    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("no provider registered for policy type {0}")]
    NoProvider(PolicyType),
}

impl From<PolicyError> for ConfigTxError {
    fn from(e: PolicyError) -> Self {
        ConfigTxError::validation("policy", e.to_string())
    }
}
