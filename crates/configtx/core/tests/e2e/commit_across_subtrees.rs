//! End-to-end: values proposed on the orderer and application subtrees
//! become visible together on commit, and not before.

use crate::common::{groups, init_tracing, value};
use configtx::handlers::{BatchTimeout, ConsensusType};
use configtx::types::{keys, ConfigHandler};
use configtx::{BundleConfig, Initializer};
use std::collections::BTreeMap;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn acls() -> BTreeMap<String, String> {
    let mut acls = BTreeMap::new();
    acls.insert("peer/Propose".into(), "/Channel/Application/Writers".into());
    acls
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn orderer_and_application_values_commit_together() {
    init_tracing();
    let init = Initializer::new(&BundleConfig::default());
    let bundle = init.bundle();

    let root = init.begin_config(&groups(&["ChannelGroup"])).unwrap();
    assert_eq!(root.len(), 1);

    let subtrees = root[0]
        .begin_config(&groups(&["Orderer", "Application"]))
        .unwrap();
    let (orderer, application) = (&subtrees[0], &subtrees[1]);
    orderer.begin_config(&[]).unwrap();
    application.begin_config(&[]).unwrap();

    orderer
        .propose_config(
            keys::BATCH_TIMEOUT,
            &value(&BatchTimeout {
                timeout: "500ms".into(),
            }),
        )
        .unwrap();
    orderer
        .propose_config(
            keys::CONSENSUS_TYPE,
            &value(&ConsensusType {
                kind: "solo".into(),
            }),
        )
        .unwrap();
    application.propose_config(keys::ACLS, &value(&acls())).unwrap();

    // Nothing is visible while the transaction is open.
    assert_eq!(bundle.orderer_config().batch_timeout(), Duration::from_secs(2));
    assert!(bundle.orderer_config().consensus_type().is_empty());
    assert!(bundle.application_config().acls().is_empty());
    assert_eq!(bundle.snapshot().epoch, 0);

    init.commit_config();

    assert_eq!(
        bundle.orderer_config().batch_timeout(),
        Duration::from_millis(500)
    );
    assert_eq!(bundle.orderer_config().consensus_type(), "solo");
    assert_eq!(bundle.application_config().acls(), acls());

    let snapshot = bundle.snapshot();
    assert_eq!(snapshot.epoch, 1);
    assert_eq!(snapshot.orderer.consensus_type, "solo");
    assert_eq!(snapshot.application_acls, acls());
}

#[test]
fn untouched_values_carry_over_between_transactions() {
    init_tracing();
    let init = Initializer::default();
    let bundle = init.bundle();

    let root = init.begin_config(&groups(&["Channel"])).unwrap();
    let app = root[0].begin_config(&groups(&["Application"])).unwrap();
    app[0].begin_config(&[]).unwrap();
    app[0].propose_config(keys::ACLS, &value(&acls())).unwrap();
    init.commit_config();

    let root = init.begin_config(&groups(&["Channel"])).unwrap();
    let orderer = root[0].begin_config(&groups(&["Orderer"])).unwrap();
    orderer[0].begin_config(&[]).unwrap();
    orderer[0]
        .propose_config(
            keys::KAFKA_BROKERS,
            &value(&vec!["kafka0:9092".to_string()]),
        )
        .unwrap();
    init.commit_config();

    assert_eq!(bundle.application_config().acls(), acls());
    assert_eq!(bundle.orderer_config().kafka_brokers(), vec!["kafka0:9092"]);
    assert_eq!(bundle.epoch(), 2);
    assert_eq!(init.history().len(), 2);
}

#[test]
fn snapshot_held_by_reader_survives_commit() {
    init_tracing();
    let init = Initializer::default();
    let held = init.bundle().snapshot();

    let root = init.begin_config(&groups(&["Channel"])).unwrap();
    let app = root[0].begin_config(&groups(&["Application"])).unwrap();
    app[0].begin_config(&[]).unwrap();
    app[0].propose_config(keys::ACLS, &value(&acls())).unwrap();
    init.commit_config();

    assert!(held.application_acls.is_empty());
    assert_ne!(held.digest().unwrap(), init.bundle().snapshot().digest().unwrap());
}
