//! Application configuration: resource ACLs and peer organizations.

use crate::org::{AnchorPeer, OrgHandler, OrgKind, OrgValues};
use configtx_msp::MembershipConfigHandler;
use configtx_types::{keys, ConfigHandler, ConfigTxError, ConfigValue, Result, Staged, TxState};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Read-only view of committed application configuration.
pub trait ApplicationConfig: Send + Sync {
    /// Resource name to policy reference.
    fn acls(&self) -> BTreeMap<String, String>;

    fn organizations(&self) -> BTreeMap<String, OrgValues>;

    /// Anchor peers of every application organization, keyed by org.
    fn anchor_peers(&self) -> BTreeMap<String, Vec<AnchorPeer>>;
}

#[derive(Clone, Default)]
struct ApplicationState {
    acls: BTreeMap<String, String>,
    orgs: BTreeMap<String, Arc<OrgHandler>>,
}

/// Handler for the `Application` group. Children are peer organizations.
pub struct ApplicationConfigManager {
    membership: Arc<MembershipConfigHandler>,
    state: Staged<ApplicationState>,
}

impl ApplicationConfigManager {
    pub fn new(membership: Arc<MembershipConfigHandler>) -> Self {
        Self {
            membership,
            state: Staged::new(keys::APPLICATION_GROUP, ApplicationState::default()),
        }
    }

    pub fn state(&self) -> TxState {
        self.state.state()
    }

    /// Frozen copy of the committed ACLs and organizations.
    pub fn committed(&self) -> ApplicationView {
        let state = self.state.current();
        ApplicationView {
            acls: state.acls.clone(),
            organizations: state
                .orgs
                .iter()
                .map(|(name, org)| (name.clone(), OrgValues::clone(&org.values())))
                .collect(),
        }
    }

    fn pending_orgs(&self) -> Vec<Arc<OrgHandler>> {
        self.state
            .with_pending(|s| s.orgs.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl ConfigHandler for ApplicationConfigManager {
    fn name(&self) -> &str {
        keys::APPLICATION_GROUP
    }

    fn begin_config(&self, groups: &[String]) -> Result<Vec<Arc<dyn ConfigHandler>>> {
        self.state.begin()?;
        let membership = &self.membership;
        self.state.stage(|state| {
            let orgs: Vec<Arc<dyn ConfigHandler>> = groups
                .iter()
                .map(|group| {
                    state
                        .orgs
                        .entry(group.clone())
                        .or_insert_with(|| {
                            Arc::new(OrgHandler::new(
                                group.clone(),
                                OrgKind::Application,
                                membership.clone(),
                            ))
                        })
                        .clone() as Arc<dyn ConfigHandler>
                })
                .collect();
            Ok(orgs)
        })
    }

    fn propose_config(&self, key: &str, value: &ConfigValue) -> Result<()> {
        if key != keys::ACLS {
            return Err(ConfigTxError::UnknownKey {
                handler: self.name().into(),
                key: key.into(),
            });
        }
        let acls: BTreeMap<String, String> = value.decode(key)?;
        if let Some((resource, policy)) = acls
            .iter()
            .find(|(resource, policy)| resource.trim().is_empty() || policy.trim().is_empty())
        {
            return Err(ConfigTxError::validation(
                key,
                format!("invalid ACL entry {resource:?} -> {policy:?}"),
            ));
        }
        self.state.stage(|s| {
            s.acls = acls;
            Ok(())
        })
    }

    fn rollback_config(&self) {
        for org in self.pending_orgs() {
            org.rollback_config();
        }
        self.state.rollback();
    }

    fn commit_config(&self) {
        for org in self.pending_orgs() {
            org.commit_config();
        }
        if self.state.commit() {
            let state = self.state.current();
            info!(
                acls = state.acls.len(),
                orgs = state.orgs.len(),
                "Application config committed"
            );
        }
    }
}

/// Application configuration as committed at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplicationView {
    pub acls: BTreeMap<String, String>,
    pub organizations: BTreeMap<String, OrgValues>,
}

impl ApplicationConfig for ApplicationView {
    fn acls(&self) -> BTreeMap<String, String> {
        self.acls.clone()
    }

    fn organizations(&self) -> BTreeMap<String, OrgValues> {
        self.organizations.clone()
    }

    fn anchor_peers(&self) -> BTreeMap<String, Vec<AnchorPeer>> {
        self.organizations
            .iter()
            .filter(|(_, org)| !org.anchor_peers.is_empty())
            .map(|(name, org)| (name.clone(), org.anchor_peers.clone()))
            .collect()
    }
}

/// Reads whatever is committed at call time.
impl ApplicationConfig for ApplicationConfigManager {
    fn acls(&self) -> BTreeMap<String, String> {
        self.state.current().acls.clone()
    }

    fn organizations(&self) -> BTreeMap<String, OrgValues> {
        self.committed().organizations
    }

    fn anchor_peers(&self) -> BTreeMap<String, Vec<AnchorPeer>> {
        self.committed().anchor_peers()
    }
}
