use crate::error::PolicyError;
use configtx_msp::SerializedIdentity;
use configtx_types::PolicyType;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A compiled policy rule.
///
/// `signers` are identities whose signatures were already verified by the
/// caller; evaluation only decides whether they are sufficient.
pub trait Policy: Send + Sync + fmt::Debug {
    fn evaluate(&self, signers: &[SerializedIdentity]) -> Result<(), PolicyError>;
}

/// Compiles encoded rules of one policy type.
pub trait PolicyProvider: Send + Sync {
    fn policy_type(&self) -> PolicyType;

    fn new_policy(&self, data: &[u8]) -> Result<Arc<dyn Policy>, PolicyError>;
}

/// Policy type → provider, as built by the provider registry.
pub type ProviderMap = BTreeMap<PolicyType, Arc<dyn PolicyProvider>>;
