//! Property tests: the root accepts exactly one group. Every other count is
//! fatal, every time.

use configtx::types::ConfigHandler;
use configtx::Initializer;
use proptest::prelude::*;
use std::panic::{self, AssertUnwindSafe};

proptest! {
    #[test]
    fn only_one_root_group_is_accepted(
        names in prop::collection::vec("[A-Za-z]{1,8}", 0..5)
    ) {
        let init = Initializer::default();
        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| init.begin_config(&names).map(|h| h.len())));
        if names.len() == 1 {
            prop_assert_eq!(outcome.ok().and_then(|r| r.ok()), Some(1));
            prop_assert_eq!(init.bundle().epoch(), 0);
        } else {
            prop_assert!(outcome.is_err());
            prop_assert!(!init.in_transaction());
        }
    }
}
