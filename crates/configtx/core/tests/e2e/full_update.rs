//! End-to-end: a complete update tree applied through the walker.

use crate::common::{init_tracing, signed_by, value};
use configtx::handlers::{
    AnchorPeer, BatchSize, BatchTimeout, ConsensusType, HashingAlgorithm, HashingAlgorithmValue,
};
use configtx::msp::{MspConfig, MspPrincipal, SerializedIdentity};
use configtx::types::{keys, ConfigGroup};
use configtx::{apply_config_update, Initializer};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn genesis() -> ConfigGroup {
    let orderer_org = ConfigGroup::new()
        .with_value(keys::MSP, value(&MspConfig::new("OrdererMSP").with_admin("osn-admin")))
        .with_policy("Admins", signed_by(MspPrincipal::admin("OrdererMSP")));
    let orderer = ConfigGroup::new()
        .with_value(keys::CONSENSUS_TYPE, value(&ConsensusType { kind: "solo".into() }))
        .with_value(keys::BATCH_SIZE, value(&BatchSize::default()))
        .with_value(keys::BATCH_TIMEOUT, value(&BatchTimeout { timeout: "1s".into() }))
        .with_value(keys::INGRESS_POLICY_NAMES, value(&vec!["Writers".to_string()]))
        .with_group("OrdererOrg", orderer_org);

    let org1 = ConfigGroup::new()
        .with_value(
            keys::MSP,
            value(&MspConfig::new("Org1MSP").with_admin("alice").with_member("bob")),
        )
        .with_value(keys::ANCHOR_PEERS, value(&vec![AnchorPeer::new("peer0.org1", 7051)]));
    let mut acls = BTreeMap::new();
    acls.insert("peer/Propose".to_string(), "/Channel/Application/Writers".to_string());
    let application = ConfigGroup::new()
        .with_value(keys::ACLS, value(&acls))
        .with_policy("Writers", signed_by(MspPrincipal::member("Org1MSP")))
        .with_group("Org1", org1);

    let channel = ConfigGroup::new()
        .with_value(
            keys::HASHING_ALGORITHM,
            value(&HashingAlgorithmValue {
                name: HashingAlgorithm::Sha256,
            }),
        )
        .with_value(keys::ORDERER_ADDRESSES, value(&vec!["orderer0:7050".to_string()]))
        .with_group(keys::ORDERER_GROUP, orderer)
        .with_group(keys::APPLICATION_GROUP, application);

    ConfigGroup::new().with_group(keys::CHANNEL_GROUP, channel)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn genesis_update_populates_every_accessor() {
    init_tracing();
    let init = Initializer::default();
    let record = apply_config_update(&init, &genesis()).unwrap();
    assert_eq!(record.epoch, 1);
    assert_eq!(record.root_group, keys::CHANNEL_GROUP);

    let bundle = init.bundle();
    assert_eq!(bundle.channel_config().orderer_addresses(), vec!["orderer0:7050"]);
    assert_eq!(bundle.orderer_config().consensus_type(), "solo");
    assert_eq!(bundle.orderer_config().ingress_policy_names(), vec!["Writers"]);
    assert_eq!(
        bundle.orderer_config().organizations()["OrdererOrg"].msp_id.as_deref(),
        Some("OrdererMSP")
    );
    assert_eq!(bundle.msp_manager().msp_ids(), vec!["OrdererMSP", "Org1MSP"]);
    assert_eq!(bundle.application_config().anchor_peers()["Org1"][0].host, "peer0.org1");

    let policies = bundle.policy_manager();
    let writers = policies.get_policy("/Channel/Application/Writers").unwrap();
    assert!(writers.evaluate(&[SerializedIdentity::new("Org1MSP", "bob")]).is_ok());
    let osn_admins = policies
        .get_policy("Channel/Orderer/OrdererOrg/Admins")
        .unwrap();
    assert!(osn_admins
        .evaluate(&[SerializedIdentity::new("OrdererMSP", "osn-admin")])
        .is_ok());
}

#[test]
fn conflicting_follow_up_update_leaves_genesis_intact() {
    init_tracing();
    let init = Initializer::default();
    apply_config_update(&init, &genesis()).unwrap();
    let before = init.bundle().snapshot();

    let orderer = ConfigGroup::new()
        .with_value(
            keys::BATCH_SIZE,
            value(&BatchSize {
                max_message_count: 99,
                ..BatchSize::default()
            }),
        )
        .with_value(
            keys::CONSENSUS_TYPE,
            value(&ConsensusType {
                kind: "kafka".into(),
            }),
        );
    let update = ConfigGroup::new().with_group(
        keys::CHANNEL_GROUP,
        ConfigGroup::new().with_group(keys::ORDERER_GROUP, orderer),
    );
    let err = apply_config_update(&init, &update).unwrap_err();
    assert!(err.is_validation());

    assert_eq!(init.bundle().snapshot(), before);
    assert_eq!(init.history().len(), 1);
}

#[test]
fn reapplying_genesis_is_stable() {
    init_tracing();
    let init = Initializer::default();
    apply_config_update(&init, &genesis()).unwrap();
    let first = init.bundle().snapshot();
    apply_config_update(&init, &genesis()).unwrap();
    let second = init.bundle().snapshot();
    assert_eq!(second.epoch, 2);
    assert_eq!(first.policies, second.policies);
    assert_eq!(first.msps, second.msps);
}
