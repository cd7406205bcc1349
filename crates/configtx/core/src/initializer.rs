//! Transaction coordinator at the root of the configuration tree.

use crate::bundle::ResourceBundle;
use crate::config::BundleConfig;
use crate::import::ImportPolicyAdapter;
use chrono::{DateTime, Utc};
use configtx_types::{ConfigHandler, ConfigTxError, ConfigValue, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// One committed configuration transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub tx_id: Uuid,
    /// Bundle epoch after the commit.
    pub epoch: u64,
    pub root_group: String,
    pub started_at: DateTime<Utc>,
    pub committed_at: DateTime<Utc>,
    /// Handlers the coordinator itself handed out.
    pub handlers: usize,
}

struct OpenTx {
    tx_id: Uuid,
    root_group: String,
    started_at: DateTime<Utc>,
    handlers: Vec<Arc<dyn ConfigHandler>>,
}

/// Drives begin, propose, commit and rollback across the handler tree.
///
/// The root has exactly one child group by protocol; `begin_config` with
/// any other count is a caller bug and panics. Values are never proposed on
/// the root itself. Membership is staged before anything else so later
/// validation can resolve identities introduced by the same update.
pub struct Initializer {
    bundle: Arc<ResourceBundle>,
    open: Mutex<Option<OpenTx>>,
    history: RwLock<Vec<CommitRecord>>,
    history_limit: usize,
}

impl Initializer {
    pub fn new(config: &BundleConfig) -> Self {
        Self {
            bundle: Arc::new(ResourceBundle::new(config)),
            open: Mutex::new(None),
            history: RwLock::new(Vec::new()),
            history_limit: config.history_limit,
        }
    }

    /// The bundle whose accessors expose committed state.
    pub fn bundle(&self) -> Arc<ResourceBundle> {
        self.bundle.clone()
    }

    /// Policy handler for import flows: structure may be discovered, but
    /// values can only enter through `propose_policy`.
    pub fn policy_handler(&self) -> ImportPolicyAdapter {
        ImportPolicyAdapter::new(self.bundle.policy_handler().clone())
    }

    /// Whether a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.open.lock().expect("lock not poisoned").is_some()
    }

    /// Retained commit records, oldest first.
    pub fn history(&self) -> Vec<CommitRecord> {
        self.history.read().expect("lock not poisoned").clone()
    }

    pub fn last_commit(&self) -> Option<CommitRecord> {
        self.history.read().expect("lock not poisoned").last().cloned()
    }

    /// Commit the open transaction, returning its record. `None` when no
    /// transaction was open.
    pub fn commit(&self) -> Option<CommitRecord> {
        let Some(tx) = self.open.lock().expect("lock not poisoned").take() else {
            debug!("Commit requested with no open transaction");
            return None;
        };

        let membership = self.bundle.membership_handler();
        let policies = self.bundle.policy_handler();
        let epoch = self.bundle.publish(|| {
            membership.commit_config();
            for handler in &tx.handlers {
                handler.commit_config();
            }
            policies.commit_config();
        });

        let record = CommitRecord {
            tx_id: tx.tx_id,
            epoch,
            root_group: tx.root_group,
            started_at: tx.started_at,
            committed_at: Utc::now(),
            handlers: tx.handlers.len(),
        };
        info!(tx_id = %record.tx_id, epoch, "Configuration transaction committed");
        self.remember(record.clone());
        Some(record)
    }

    fn remember(&self, record: CommitRecord) {
        if self.history_limit == 0 {
            return;
        }
        let mut history = self.history.write().expect("lock not poisoned");
        history.push(record);
        if history.len() > self.history_limit {
            let excess = history.len() - self.history_limit;
            history.drain(..excess);
        }
    }
}

impl Default for Initializer {
    fn default() -> Self {
        Self::new(&BundleConfig::default())
    }
}

impl ConfigHandler for Initializer {
    fn name(&self) -> &str {
        "initializer"
    }

    fn begin_config(&self, groups: &[String]) -> Result<Vec<Arc<dyn ConfigHandler>>> {
        if groups.len() != 1 {
            error!(
                groups = groups.len(),
                "Configuration root must have exactly one group"
            );
            panic!(
                "configuration root supports exactly one group, got {}",
                groups.len()
            );
        }

        let mut open = self.open.lock().expect("lock not poisoned");
        if open.is_some() {
            return Err(ConfigTxError::TransactionInProgress(self.name().into()));
        }
        let policies = self.bundle.policy_handler();
        if policies.state().is_in_progress() {
            return Err(ConfigTxError::TransactionInProgress(policies.name().into()));
        }
        self.bundle.membership_handler().begin_config(&[])?;

        let channel: Arc<dyn ConfigHandler> = self.bundle.channel_handler().clone();
        let tx = OpenTx {
            tx_id: Uuid::new_v4(),
            root_group: groups[0].clone(),
            started_at: Utc::now(),
            handlers: vec![channel.clone()],
        };
        info!(tx_id = %tx.tx_id, root = %tx.root_group, "Configuration transaction begun");
        *open = Some(tx);
        Ok(vec![channel])
    }

    fn propose_config(&self, key: &str, _value: &ConfigValue) -> Result<()> {
        warn!(key, "Value proposed directly on the configuration root");
        Err(ConfigTxError::permission_denied(
            "configuration root (values belong on child handlers)",
            key,
        ))
    }

    fn rollback_config(&self) {
        let Some(tx) = self.open.lock().expect("lock not poisoned").take() else {
            debug!("Rollback requested with no open transaction");
            return;
        };
        for handler in tx.handlers.iter().rev() {
            handler.rollback_config();
        }
        self.bundle.policy_handler().rollback_config();
        self.bundle.membership_handler().rollback_config();
        info!(tx_id = %tx.tx_id, "Configuration transaction rolled back");
    }

    fn commit_config(&self) {
        self.commit();
    }
}
