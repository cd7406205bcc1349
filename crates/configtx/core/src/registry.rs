//! Policy provider registry.

use configtx_msp::MembershipResolver;
use configtx_policies::{PolicyProvider, ProviderMap, SignaturePolicyProvider};
use configtx_types::PolicyType;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds the policy type to provider mapping for one resource bundle.
///
/// Types are visited once each, in the order given. A type without a
/// provider is valid and simply stays out of the mapping.
pub struct PolicyProviderRegistry {
    policy_types: Vec<PolicyType>,
    membership: Arc<dyn MembershipResolver>,
}

impl PolicyProviderRegistry {
    pub fn new(policy_types: Vec<PolicyType>, membership: Arc<dyn MembershipResolver>) -> Self {
        Self {
            policy_types,
            membership,
        }
    }

    /// The provider for `policy_type`, if one exists.
    fn provider_for(&self, policy_type: PolicyType) -> Option<Arc<dyn PolicyProvider>> {
        match policy_type {
            PolicyType::Unknown => None,
            PolicyType::Signature => Some(
                Arc::new(SignaturePolicyProvider::new(self.membership.clone()))
                    as Arc<dyn PolicyProvider>,
            ),
            // Extension point: no MSP policy provider exists yet.
            PolicyType::Msp => None,
            PolicyType::ImplicitMeta => None,
        }
    }

    pub fn build(&self) -> ProviderMap {
        let mut visited = BTreeSet::new();
        let mut providers = ProviderMap::new();
        for &policy_type in &self.policy_types {
            if !visited.insert(policy_type) {
                continue;
            }
            match self.provider_for(policy_type) {
                Some(provider) => {
                    providers.insert(policy_type, provider);
                }
                None => debug!(%policy_type, "No policy provider registered"),
            }
        }
        info!(
            visited = visited.len(),
            registered = providers.len(),
            "Policy provider registry built"
        );
        providers
    }
}
