use configtx_handlers::{ChannelValues, OrdererValues, OrgValues};
use configtx_msp::MspConfig;
use configtx_policies::PolicyTree;
use configtx_types::{ConfigTxError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// BLAKE3 digest of a snapshot's canonical JSON.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotDigest(pub [u8; 32]);

impl SnapshotDigest {
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotDigest({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..12])
    }
}

/// Committed configuration of every sub-manager at one epoch.
///
/// Built from one published view of the bundle, so it never mixes values from
/// before and after a commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub epoch: u64,
    pub channel: ChannelValues,
    pub orderer: OrdererValues,
    pub orderer_orgs: BTreeMap<String, OrgValues>,
    pub application_acls: BTreeMap<String, String>,
    pub application_orgs: BTreeMap<String, OrgValues>,
    pub msps: BTreeMap<String, MspConfig>,
    pub policies: PolicyTree,
}

impl ConfigSnapshot {
    /// Canonical encoding: JSON with every map in key order.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| ConfigTxError::Config(format!("cannot encode snapshot: {e}")))
    }

    pub fn digest(&self) -> Result<SnapshotDigest> {
        Ok(SnapshotDigest::hash(&self.to_canonical_json()?))
    }
}
