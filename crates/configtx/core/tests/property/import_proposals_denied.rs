//! Property tests: the import policy handler refuses every generic
//! proposal, at every depth, whatever the key or body.

use configtx::types::{ConfigHandler, ConfigValue};
use configtx::Initializer;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn arb_value() -> impl Strategy<Value = ConfigValue> {
    (any::<u64>(), prop::collection::vec(any::<u8>(), 0..64), "[A-Za-z]{0,8}").prop_map(
        |(version, body, mod_policy)| {
            ConfigValue::new(body)
                .with_version(version)
                .with_mod_policy(mod_policy)
        },
    )
}

fn arb_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Z][a-z]{1,6}", 0..4)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn propose_always_denied(key in "[A-Za-z]{1,12}", value in arb_value(), path in arb_path()) {
        let init = Initializer::default();
        let mut handler: std::sync::Arc<dyn ConfigHandler> =
            std::sync::Arc::new(init.policy_handler());
        for group in &path {
            let children = handler.begin_config(std::slice::from_ref(group)).unwrap();
            prop_assert_eq!(children.len(), 1);
            let err = handler.propose_config(&key, &value).unwrap_err();
            prop_assert!(err.is_permission_denied());
            handler = children[0].clone();
        }
        handler.begin_config(&[]).unwrap();
        prop_assert!(handler.propose_config(&key, &value).unwrap_err().is_permission_denied());
        handler.rollback_config();
    }

    #[test]
    fn begin_mirrors_wrapped_child_count(
        names in prop::collection::btree_set("[A-Z][a-z]{1,6}", 0..5)
    ) {
        let init = Initializer::default();
        let names: Vec<String> = names.into_iter().collect();
        let children = init.policy_handler().begin_config(&names).unwrap();
        prop_assert_eq!(children.len(), names.len());
        for (child, name) in children.iter().zip(&names) {
            prop_assert_eq!(child.name(), format!("policies/{name}"));
        }
    }
}
