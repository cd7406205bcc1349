use crate::config::{Identity, MspConfig, MspPrincipal, MspRole, SerializedIdentity};
use crate::error::MspError;
use crate::MembershipResolver;
use configtx_types::{keys, ConfigHandler, ConfigTxError, ConfigValue, Staged, TxState};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Committed MSP definitions keyed by MSP id.
pub type MspSet = BTreeMap<String, MspConfig>;

/// Config handler owning channel membership.
///
/// Only the `MSP` key is accepted, normally forwarded from an organization
/// handler. MSPs not mentioned by a transaction carry over unchanged.
pub struct MembershipConfigHandler {
    msps: Staged<MspSet>,
    /// MSP ids proposed in the open transaction.
    proposed: Mutex<BTreeSet<String>>,
}

impl MembershipConfigHandler {
    pub fn new() -> Self {
        Self {
            msps: Staged::new("membership", MspSet::new()),
            proposed: Mutex::new(BTreeSet::new()),
        }
    }

    /// Stage an MSP definition, returning its id.
    pub fn propose_msp(&self, value: &ConfigValue) -> Result<String, ConfigTxError> {
        let config: MspConfig = value.decode(keys::MSP)?;
        config.validate()?;

        let name = config.name.clone();
        let mut proposed = self.proposed.lock().expect("lock not poisoned");
        self.msps.stage(|msps| {
            if proposed.contains(&name) && msps.get(&name) != Some(&config) {
                warn!(msp = %name, "Conflicting MSP definition in one transaction");
                return Err(MspError::DuplicateMsp(name.clone()).into());
            }
            msps.insert(name.clone(), config);
            Ok(())
        })?;
        proposed.insert(name.clone());

        debug!(msp = %name, "MSP staged");
        Ok(name)
    }

    /// Committed MSP definitions.
    pub fn msps(&self) -> Arc<MspSet> {
        self.msps.current()
    }

    /// Frozen view of the committed MSPs.
    pub fn committed(&self) -> MembershipView {
        MembershipView::new(self.msps.current())
    }

    pub fn state(&self) -> TxState {
        self.msps.state()
    }

    fn clear_proposed(&self) {
        self.proposed.lock().expect("lock not poisoned").clear();
    }
}

impl Default for MembershipConfigHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigHandler for MembershipConfigHandler {
    fn name(&self) -> &str {
        "membership"
    }

    fn begin_config(
        &self,
        groups: &[String],
    ) -> Result<Vec<Arc<dyn ConfigHandler>>, ConfigTxError> {
        if let Some(group) = groups.first() {
            return Err(ConfigTxError::UnrecognizedGroup {
                parent: self.name().into(),
                group: group.clone(),
            });
        }
        self.msps.begin()?;
        self.clear_proposed();
        Ok(Vec::new())
    }

    fn propose_config(&self, key: &str, value: &ConfigValue) -> Result<(), ConfigTxError> {
        if key != keys::MSP {
            return Err(ConfigTxError::UnknownKey {
                handler: self.name().into(),
                key: key.into(),
            });
        }
        self.propose_msp(value).map(|_| ())
    }

    fn rollback_config(&self) {
        if self.msps.rollback() {
            info!("Membership changes rolled back");
        }
        self.clear_proposed();
    }

    fn commit_config(&self) {
        if self.msps.commit() {
            info!(msps = self.msps.current().len(), "Membership committed");
        }
        self.clear_proposed();
    }
}

/// Membership as committed at one point in time.
#[derive(Clone, Debug, Default)]
pub struct MembershipView {
    msps: Arc<MspSet>,
}

impl MembershipView {
    pub fn new(msps: Arc<MspSet>) -> Self {
        Self { msps }
    }

    pub fn msps(&self) -> &MspSet {
        &self.msps
    }
}

impl MembershipResolver for MembershipView {
    fn deserialize_identity(&self, identity: &SerializedIdentity) -> Result<Identity, MspError> {
        let msp = self
            .msps
            .get(&identity.msp_id)
            .ok_or_else(|| MspError::UnknownMsp(identity.msp_id.clone()))?;
        if !msp.is_member(&identity.id) {
            return Err(MspError::UnknownMember {
                msp_id: identity.msp_id.clone(),
                id: identity.id.clone(),
            });
        }
        Ok(Identity {
            msp_id: identity.msp_id.clone(),
            id: identity.id.clone(),
            admin: msp.is_admin(&identity.id),
        })
    }

    fn satisfies_principal(
        &self,
        identity: &Identity,
        principal: &MspPrincipal,
    ) -> Result<(), MspError> {
        let role_ok = match principal.role {
            MspRole::Member => true,
            MspRole::Admin => identity.admin,
        };
        if identity.msp_id == principal.msp_id && role_ok {
            Ok(())
        } else {
            Err(MspError::PrincipalNotSatisfied {
                msp_id: identity.msp_id.clone(),
                id: identity.id.clone(),
                principal: principal.to_string(),
            })
        }
    }

    fn msp_ids(&self) -> Vec<String> {
        self.msps.keys().cloned().collect()
    }
}

/// Resolves against whatever is committed at call time.
impl MembershipResolver for MembershipConfigHandler {
    fn deserialize_identity(&self, identity: &SerializedIdentity) -> Result<Identity, MspError> {
        self.committed().deserialize_identity(identity)
    }

    fn satisfies_principal(
        &self,
        identity: &Identity,
        principal: &MspPrincipal,
    ) -> Result<(), MspError> {
        self.committed().satisfies_principal(identity, principal)
    }

    fn msp_ids(&self) -> Vec<String> {
        self.committed().msp_ids()
    }
}
