//! Property tests: the provider registry never registers `UNKNOWN` and
//! registers exactly one provider for `SIGNATURE` whenever it is listed.

use configtx::msp::MembershipConfigHandler;
use configtx::types::PolicyType;
use configtx::PolicyProviderRegistry;
use proptest::prelude::*;
use std::sync::Arc;

fn arb_policy_type() -> impl Strategy<Value = PolicyType> {
    prop::sample::select(PolicyType::ALL.to_vec())
}

proptest! {
    #[test]
    fn registry_shape(types in prop::collection::vec(arb_policy_type(), 0..10)) {
        let registry =
            PolicyProviderRegistry::new(types.clone(), Arc::new(MembershipConfigHandler::new()));
        let providers = registry.build();

        prop_assert!(!providers.contains_key(&PolicyType::Unknown));
        prop_assert!(!providers.contains_key(&PolicyType::Msp));
        let expected = usize::from(types.contains(&PolicyType::Signature));
        prop_assert_eq!(providers.len(), expected);
        for (policy_type, provider) in &providers {
            prop_assert_eq!(provider.policy_type(), *policy_type);
        }
    }
}
