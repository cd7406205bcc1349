//! Restricted policy handler for import flows.

use configtx_policies::PolicyHandler;
use configtx_types::{ConfigHandler, ConfigPolicy, ConfigTxError, ConfigValue, Result};
use std::sync::Arc;
use tracing::warn;

/// Wraps a policy handler so the generic value path is closed.
///
/// `begin_config` delegates and wraps every child it gets back, so the
/// restriction covers the whole subtree. `propose_config` always fails;
/// policies enter only through [`PolicyHandler::propose_policy`]. Commit and
/// rollback pass straight through.
#[derive(Clone)]
pub struct ImportPolicyAdapter {
    inner: Arc<dyn PolicyHandler>,
}

impl ImportPolicyAdapter {
    pub fn new(inner: Arc<dyn PolicyHandler>) -> Self {
        Self { inner }
    }

    fn wrap_children(&self, groups: &[String]) -> Result<Vec<ImportPolicyAdapter>> {
        Ok(self
            .inner
            .begin_policy_config(groups)?
            .into_iter()
            .map(ImportPolicyAdapter::new)
            .collect())
    }
}

impl ConfigHandler for ImportPolicyAdapter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn begin_config(&self, groups: &[String]) -> Result<Vec<Arc<dyn ConfigHandler>>> {
        Ok(self
            .wrap_children(groups)?
            .into_iter()
            .map(|child| Arc::new(child) as Arc<dyn ConfigHandler>)
            .collect())
    }

    fn propose_config(&self, key: &str, _value: &ConfigValue) -> Result<()> {
        warn!(handler = %self.name(), key, "Rejected value proposal on import policy path");
        Err(ConfigTxError::permission_denied(
            format!("import policy handler {}", self.name()),
            key,
        ))
    }

    fn rollback_config(&self) {
        self.inner.rollback_config();
    }

    fn commit_config(&self) {
        self.inner.commit_config();
    }
}

impl PolicyHandler for ImportPolicyAdapter {
    fn begin_policy_config(&self, groups: &[String]) -> Result<Vec<Arc<dyn PolicyHandler>>> {
        Ok(self
            .wrap_children(groups)?
            .into_iter()
            .map(|child| Arc::new(child) as Arc<dyn PolicyHandler>)
            .collect())
    }

    fn propose_policy(&self, key: &str, policy: &ConfigPolicy) -> Result<()> {
        self.inner.propose_policy(key, policy)
    }
}
