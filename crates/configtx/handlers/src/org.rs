use configtx_msp::MembershipConfigHandler;
use configtx_types::{keys, ConfigHandler, ConfigTxError, ConfigValue, Result, Staged, TxState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Which subtree an organization belongs to; application orgs also carry
/// anchor peers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrgKind {
    Orderer,
    Application,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorPeer {
    pub host: String,
    pub port: u16,
}

impl AnchorPeer {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

/// Committed values of one organization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgValues {
    pub msp_id: Option<String>,
    pub anchor_peers: Vec<AnchorPeer>,
}

/// Handler for one organization group. `MSP` values are forwarded to the
/// membership handler, which must already be in a transaction.
pub struct OrgHandler {
    name: String,
    kind: OrgKind,
    membership: Arc<MembershipConfigHandler>,
    values: Staged<OrgValues>,
}

impl OrgHandler {
    pub fn new(
        name: impl Into<String>,
        kind: OrgKind,
        membership: Arc<MembershipConfigHandler>,
    ) -> Self {
        let name = name.into();
        Self {
            values: Staged::new(format!("org {name}"), OrgValues::default()),
            name,
            kind,
            membership,
        }
    }

    pub fn kind(&self) -> OrgKind {
        self.kind
    }

    pub fn values(&self) -> Arc<OrgValues> {
        self.values.current()
    }

    pub fn state(&self) -> TxState {
        self.values.state()
    }

    fn propose_anchor_peers(&self, value: &ConfigValue) -> Result<()> {
        let peers: Vec<AnchorPeer> = value.decode(keys::ANCHOR_PEERS)?;
        if let Some(bad) = peers.iter().find(|p| p.host.trim().is_empty() || p.port == 0) {
            return Err(ConfigTxError::validation(
                keys::ANCHOR_PEERS,
                format!("invalid anchor peer {}:{}", bad.host, bad.port),
            ));
        }
        self.values.stage(|v| {
            v.anchor_peers = peers;
            Ok(())
        })
    }
}

impl ConfigHandler for OrgHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin_config(&self, groups: &[String]) -> Result<Vec<Arc<dyn ConfigHandler>>> {
        if let Some(group) = groups.first() {
            return Err(ConfigTxError::UnrecognizedGroup {
                parent: self.name.clone(),
                group: group.clone(),
            });
        }
        self.values.begin()?;
        Ok(Vec::new())
    }

    fn propose_config(&self, key: &str, value: &ConfigValue) -> Result<()> {
        match key {
            keys::MSP => {
                // Own staging first so a closed org never leaks into membership.
                self.values.stage(|_| Ok(()))?;
                let msp_id = self.membership.propose_msp(value)?;
                debug!(org = %self.name, msp = %msp_id, "Organization MSP staged");
                self.values.stage(|v| {
                    v.msp_id = Some(msp_id);
                    Ok(())
                })
            }
            keys::ANCHOR_PEERS if self.kind == OrgKind::Application => {
                self.propose_anchor_peers(value)
            }
            _ => Err(ConfigTxError::UnknownKey {
                handler: self.name.clone(),
                key: key.into(),
            }),
        }
    }

    fn rollback_config(&self) {
        self.values.rollback();
    }

    fn commit_config(&self) {
        self.values.commit();
    }
}
