//! Hierarchical policy manager.

use crate::error::PolicyError;
use crate::policy::{Policy, ProviderMap};
use configtx_types::{
    ConfigHandler, ConfigPolicy, ConfigTxError, ConfigValue, Result, Staged, TxState,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Privileged path for policies: typed proposals instead of raw values.
pub trait PolicyHandler: ConfigHandler {
    /// Like `begin_config`, but the children keep the privileged path.
    fn begin_policy_config(&self, groups: &[String]) -> Result<Vec<Arc<dyn PolicyHandler>>>;

    fn propose_policy(&self, key: &str, policy: &ConfigPolicy) -> Result<()>;
}

/// Read-only policy resolution against committed state.
pub trait PolicyLookup: Send + Sync {
    /// Resolve a relative (`Application/Readers`) or absolute
    /// (`<base_path>/Readers`) policy id.
    fn get_policy(&self, id: &str) -> Option<Arc<dyn Policy>>;

    /// The manager for a non-empty path of child group names.
    fn manager(&self, path: &[&str]) -> Option<Arc<dyn PolicyLookup>>;

    fn base_path(&self) -> &str;

    /// Names of the policies defined directly at this level, sorted.
    fn policy_names(&self) -> Vec<String>;
}

#[derive(Clone)]
struct PolicyEntry {
    source: ConfigPolicy,
    compiled: Arc<dyn Policy>,
}

#[derive(Clone, Default)]
struct PolicyState {
    policies: BTreeMap<String, PolicyEntry>,
    children: BTreeMap<String, Arc<PolicyManager>>,
}

/// Committed policy sources of a manager and its descendants.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTree {
    pub policies: BTreeMap<String, ConfigPolicy>,
    pub children: BTreeMap<String, PolicyTree>,
}

/// Policy manager for one configuration group.
///
/// Child managers are created on demand by `begin_config`; a child that
/// already exists is reused so its committed policies carry over.
pub struct PolicyManager {
    label: String,
    base_path: String,
    providers: Arc<ProviderMap>,
    state: Staged<PolicyState>,
}

impl PolicyManager {
    /// Root manager with an empty base path.
    pub fn new(providers: ProviderMap) -> Self {
        Self::with_base_path("", Arc::new(providers))
    }

    fn with_base_path(base_path: impl Into<String>, providers: Arc<ProviderMap>) -> Self {
        let base_path = base_path.into();
        let label = if base_path.is_empty() {
            "policies".to_string()
        } else {
            format!("policies{base_path}")
        };
        Self {
            state: Staged::new(label.clone(), PolicyState::default()),
            label,
            base_path,
            providers,
        }
    }

    pub fn state(&self) -> TxState {
        self.state.state()
    }

    /// Number of registered providers.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Open a transaction and hand out one child manager per group.
    pub fn begin_children(&self, groups: &[String]) -> Result<Vec<Arc<PolicyManager>>> {
        self.state.begin()?;
        let base_path = &self.base_path;
        let providers = &self.providers;
        self.state.stage(|state| {
            let children: Vec<Arc<PolicyManager>> = groups
                .iter()
                .map(|group| {
                    state
                        .children
                        .entry(group.clone())
                        .or_insert_with(|| {
                            Arc::new(PolicyManager::with_base_path(
                                format!("{base_path}/{group}"),
                                providers.clone(),
                            ))
                        })
                        .clone()
                })
                .collect();
            Ok(children)
        })
    }

    /// Committed policy sources of this subtree.
    pub fn export(&self) -> PolicyTree {
        self.committed().export()
    }

    /// Frozen view of this subtree's committed policies.
    pub fn committed(&self) -> Arc<PolicyView> {
        let state = self.state.current();
        Arc::new(PolicyView {
            base_path: self.base_path.clone(),
            policies: state.policies.clone(),
            children: state
                .children
                .iter()
                .map(|(name, child)| (name.clone(), child.committed()))
                .collect(),
        })
    }

    fn pending_children(&self) -> Vec<Arc<PolicyManager>> {
        self.state
            .with_pending(|state| state.children.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl ConfigHandler for PolicyManager {
    fn name(&self) -> &str {
        &self.label
    }

    fn begin_config(&self, groups: &[String]) -> Result<Vec<Arc<dyn ConfigHandler>>> {
        let children = self.begin_children(groups)?;
        Ok(children
            .into_iter()
            .map(|c| c as Arc<dyn ConfigHandler>)
            .collect())
    }

    /// Generic path: the value body is a JSON-encoded [`ConfigPolicy`].
    fn propose_config(&self, key: &str, value: &ConfigValue) -> Result<()> {
        let policy: ConfigPolicy = value.decode(key)?;
        self.propose_policy(key, &policy)
    }

    fn rollback_config(&self) {
        for child in self.pending_children() {
            child.rollback_config();
        }
        if self.state.rollback() {
            debug!(path = %self.base_path, "Policy changes rolled back");
        }
    }

    fn commit_config(&self) {
        for child in self.pending_children() {
            child.commit_config();
        }
        if self.state.commit() {
            debug!(
                path = %self.base_path,
                policies = self.state.current().policies.len(),
                "Policies committed"
            );
        }
    }
}

impl PolicyHandler for PolicyManager {
    fn begin_policy_config(&self, groups: &[String]) -> Result<Vec<Arc<dyn PolicyHandler>>> {
        let children = self.begin_children(groups)?;
        Ok(children
            .into_iter()
            .map(|c| c as Arc<dyn PolicyHandler>)
            .collect())
    }

    fn propose_policy(&self, key: &str, policy: &ConfigPolicy) -> Result<()> {
        if key.is_empty() || key.contains('/') {
            return Err(ConfigTxError::validation(
                key,
                "policy names must be a single non-empty segment",
            ));
        }
        let policy_type = policy.policy.policy_type;
        let provider = self.providers.get(&policy_type).ok_or_else(|| {
            warn!(path = %self.base_path, key, %policy_type, "No provider for policy type");
            ConfigTxError::validation(key, PolicyError::NoProvider(policy_type).to_string())
        })?;
        let compiled = provider
            .new_policy(&policy.policy.value)
            .map_err(|e| ConfigTxError::validation(key, e.to_string()))?;

        self.state.stage(|state| {
            state.policies.insert(
                key.to_string(),
                PolicyEntry {
                    source: policy.clone(),
                    compiled,
                },
            );
            Ok(())
        })?;
        info!(path = %self.base_path, key, %policy_type, "Policy staged");
        Ok(())
    }
}

/// Policies as committed at one point in time.
#[derive(Clone, Default)]
pub struct PolicyView {
    base_path: String,
    policies: BTreeMap<String, PolicyEntry>,
    children: BTreeMap<String, Arc<PolicyView>>,
}

impl PolicyView {
    pub fn export(&self) -> PolicyTree {
        PolicyTree {
            policies: self
                .policies
                .iter()
                .map(|(name, entry)| (name.clone(), entry.source.clone()))
                .collect(),
            children: self
                .children
                .iter()
                .map(|(name, child)| (name.clone(), child.export()))
                .collect(),
        }
    }

    fn resolve(&self, segments: &[&str]) -> Option<Arc<dyn Policy>> {
        match segments {
            [] => None,
            [name] => self.policies.get(*name).map(|entry| entry.compiled.clone()),
            [group, rest @ ..] => self.children.get(*group)?.resolve(rest),
        }
    }
}

impl PolicyLookup for PolicyView {
    fn get_policy(&self, id: &str) -> Option<Arc<dyn Policy>> {
        let relative = match id.strip_prefix('/') {
            Some(_) => id.strip_prefix(&format!("{}/", self.base_path))?,
            None => id,
        };
        let segments: Vec<&str> = relative.split('/').collect();
        self.resolve(&segments)
    }

    fn manager(&self, path: &[&str]) -> Option<Arc<dyn PolicyLookup>> {
        match path {
            [] => None,
            [name] => self
                .children
                .get(*name)
                .map(|c| c.clone() as Arc<dyn PolicyLookup>),
            [name, rest @ ..] => self.children.get(*name)?.manager(rest),
        }
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }

    fn policy_names(&self) -> Vec<String> {
        self.policies.keys().cloned().collect()
    }
}

/// Resolves against whatever is committed at call time.
impl PolicyLookup for PolicyManager {
    fn get_policy(&self, id: &str) -> Option<Arc<dyn Policy>> {
        self.committed().get_policy(id)
    }

    fn manager(&self, path: &[&str]) -> Option<Arc<dyn PolicyLookup>> {
        self.committed().manager(path)
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }

    fn policy_names(&self) -> Vec<String> {
        self.state.current().policies.keys().cloned().collect()
    }
}
