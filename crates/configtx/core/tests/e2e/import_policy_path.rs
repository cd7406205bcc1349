//! End-to-end: the import policy handler exposes the policy tree's shape
//! while refusing generic value writes at every depth.

use crate::common::{groups, init_tracing, signed_by};
use configtx::msp::{MspPrincipal, SerializedIdentity};
use configtx::policies::PolicyHandler;
use configtx::types::{ConfigHandler, PolicyType};
use configtx::Initializer;

#[test]
fn nested_generic_proposals_fail() {
    init_tracing();
    let init = Initializer::default();
    init.begin_config(&groups(&["Channel"])).unwrap();

    let adapter = init.policy_handler();
    let channel = adapter.begin_config(&groups(&["Channel"])).unwrap();
    assert_eq!(channel.len(), 1);
    let subtrees = channel[0]
        .begin_config(&groups(&["Orderer", "Application"]))
        .unwrap();
    assert_eq!(subtrees.len(), 2);
    let orgs = subtrees[1].begin_config(&groups(&["Org1"])).unwrap();

    let policy_value = signed_by(MspPrincipal::member("Org1MSP")).to_value().unwrap();
    for handler in channel.iter().chain(&subtrees).chain(&orgs) {
        let err = handler.propose_config("Readers", &policy_value).unwrap_err();
        assert!(err.is_permission_denied(), "{}", handler.name());
    }
    assert!(adapter
        .propose_config("Readers", &policy_value)
        .unwrap_err()
        .is_permission_denied());

    init.commit_config();
    assert!(init.bundle().policy_manager().get_policy("/Channel/Readers").is_none());
}

#[test]
fn privileged_path_installs_policies_on_commit() {
    init_tracing();
    let init = Initializer::default();
    let root = init.begin_config(&groups(&["Channel"])).unwrap();
    let app = root[0].begin_config(&groups(&["Application"])).unwrap();
    let orgs = app[0].begin_config(&groups(&["Org1"])).unwrap();
    orgs[0].begin_config(&[]).unwrap();
    orgs[0]
        .propose_config(
            configtx::types::keys::MSP,
            &crate::common::value(
                &configtx::msp::MspConfig::new("Org1MSP")
                    .with_admin("alice")
                    .with_member("bob"),
            ),
        )
        .unwrap();

    let adapter = init.policy_handler();
    let channel = adapter.begin_policy_config(&groups(&["Channel"])).unwrap();
    let application = channel[0]
        .begin_policy_config(&groups(&["Application"]))
        .unwrap();
    application[0].begin_policy_config(&[]).unwrap();
    channel[0]
        .propose_policy("Admins", &signed_by(MspPrincipal::admin("Org1MSP")))
        .unwrap();
    application[0]
        .propose_policy("Writers", &signed_by(MspPrincipal::member("Org1MSP")))
        .unwrap();

    let before = init.bundle().policy_manager();
    assert!(before.get_policy("/Channel/Admins").is_none());

    init.commit_config();

    // A lookup taken before the commit keeps its epoch.
    assert!(before.get_policy("/Channel/Admins").is_none());
    let lookup = init.bundle().policy_manager();
    let admins = lookup.get_policy("/Channel/Admins").unwrap();
    assert!(admins
        .evaluate(&[SerializedIdentity::new("Org1MSP", "alice")])
        .is_ok());
    assert!(admins
        .evaluate(&[SerializedIdentity::new("Org1MSP", "bob")])
        .is_err());

    let writers = lookup
        .manager(&["Channel", "Application"])
        .unwrap()
        .get_policy("Writers")
        .unwrap();
    assert!(writers
        .evaluate(&[SerializedIdentity::new("Org1MSP", "bob")])
        .is_ok());
}

#[test]
fn policy_without_provider_rejected() {
    init_tracing();
    let init = Initializer::default();
    init.begin_config(&groups(&["Channel"])).unwrap();
    let adapter = init.policy_handler();
    adapter.begin_policy_config(&[]).unwrap();
    let msp_policy = configtx::types::ConfigPolicy::new(PolicyType::Msp, Vec::new());
    assert!(adapter
        .propose_policy("Readers", &msp_policy)
        .unwrap_err()
        .is_validation());
    init.rollback_config();
}
