//! Property tests: any mix of proposals followed by rollback leaves the
//! bundle bit-for-bit unchanged; followed by commit, every accepted
//! proposal is visible.

use configtx::handlers::{AnchorPeer, BatchSize};
use configtx::types::{keys, ConfigHandler, ConfigValue};
use configtx::Initializer;
use proptest::prelude::*;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Proposal {
    Batch(BatchSize),
    Acls(BTreeMap<String, String>),
    Peers(Vec<(String, u16)>),
}

fn arb_batch_size() -> impl Strategy<Value = BatchSize> {
    (0u32..100, 0u32..4096, 0u32..4096).prop_map(|(count, absolute, preferred)| BatchSize {
        max_message_count: count,
        absolute_max_bytes: absolute,
        preferred_max_bytes: preferred,
    })
}

fn arb_acls() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z/]{0,8}", "[A-Za-z]{0,8}", 0..4)
}

fn arb_peers() -> impl Strategy<Value = Vec<(String, u16)>> {
    prop::collection::vec(("[a-z0-9.]{0,10}", any::<u16>()), 0..3)
}

fn arb_proposal() -> impl Strategy<Value = Proposal> {
    prop_oneof![
        arb_batch_size().prop_map(Proposal::Batch),
        arb_acls().prop_map(Proposal::Acls),
        arb_peers().prop_map(Proposal::Peers),
    ]
}

/// Open a transaction touching the orderer, application and one org, apply
/// every proposal and return how many were accepted.
fn stage(init: &Initializer, proposals: &[Proposal]) -> usize {
    let root = init.begin_config(&["Channel".to_string()]).unwrap();
    let subtrees = root[0]
        .begin_config(&["Application".to_string(), "Orderer".to_string()])
        .unwrap();
    let orgs = subtrees[0].begin_config(&["Org1".to_string()]).unwrap();
    subtrees[1].begin_config(&[]).unwrap();
    orgs[0].begin_config(&[]).unwrap();

    proposals
        .iter()
        .filter(|proposal| {
            let result = match proposal {
                Proposal::Batch(size) => subtrees[1]
                    .propose_config(keys::BATCH_SIZE, &ConfigValue::json(size).unwrap()),
                Proposal::Acls(acls) => {
                    subtrees[0].propose_config(keys::ACLS, &ConfigValue::json(acls).unwrap())
                }
                Proposal::Peers(peers) => {
                    let peers: Vec<AnchorPeer> = peers
                        .iter()
                        .map(|(host, port)| AnchorPeer::new(host.clone(), *port))
                        .collect();
                    orgs[0].propose_config(keys::ANCHOR_PEERS, &ConfigValue::json(&peers).unwrap())
                }
            };
            result.is_ok()
        })
        .count()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn rollback_leaves_digest_unchanged(
        proposals in prop::collection::vec(arb_proposal(), 0..8)
    ) {
        let init = Initializer::default();
        let before = init.bundle().snapshot();
        let digest = before.digest().unwrap();

        stage(&init, &proposals);
        init.rollback_config();

        let after = init.bundle().snapshot();
        prop_assert_eq!(after.digest().unwrap(), digest);
        prop_assert_eq!(after, before);
    }

    #[test]
    fn committed_batch_size_is_last_accepted(
        sizes in prop::collection::vec(arb_batch_size(), 1..6)
    ) {
        let init = Initializer::default();
        let proposals: Vec<Proposal> = sizes.iter().cloned().map(Proposal::Batch).collect();
        stage(&init, &proposals);
        init.commit_config();

        let expected = sizes
            .iter()
            .rev()
            .find(|s| {
                s.max_message_count > 0
                    && s.absolute_max_bytes > 0
                    && s.preferred_max_bytes <= s.absolute_max_bytes
            })
            .copied()
            .unwrap_or_default();
        prop_assert_eq!(init.bundle().orderer_config().batch_size(), expected);
    }

    #[test]
    fn readers_never_see_staged_values(
        proposals in prop::collection::vec(arb_proposal(), 1..8)
    ) {
        let init = Initializer::default();
        let before = init.bundle().snapshot();
        stage(&init, &proposals);
        prop_assert_eq!(init.bundle().snapshot(), before);
        init.commit_config();
        prop_assert_eq!(init.bundle().epoch(), 1);
    }
}
