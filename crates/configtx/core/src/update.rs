//! Applying a whole configuration update tree.

use crate::initializer::{CommitRecord, Initializer};
use configtx_policies::PolicyHandler;
use configtx_types::{ConfigGroup, ConfigHandler, ConfigTxError, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Stage every value and policy of `update` and commit, or roll back on the
/// first error and return it.
///
/// `update` is the configuration root. It must hold exactly one group; any
/// other shape is rejected before the coordinator is touched. Values on the
/// root itself go to the coordinator and are refused there; root policies
/// go to the root policy manager.
pub fn apply_config_update(
    coordinator: &Initializer,
    update: &ConfigGroup,
) -> Result<CommitRecord> {
    let names = update.group_names();
    if names.len() != 1 {
        return Err(ConfigTxError::validation(
            "root",
            format!("update root must hold exactly one group, found {}", names.len()),
        ));
    }

    // A refused begin leaves nothing of ours to undo; another caller's
    // transaction may be open.
    let handlers = coordinator.begin_config(&names)?;
    let policies = coordinator.policy_handler();
    if let Err(e) = stage_root(coordinator, &policies, update, &names, handlers) {
        warn!(error = %e, "Configuration update rejected");
        coordinator.rollback_config();
        return Err(e);
    }
    coordinator
        .commit()
        .ok_or_else(|| ConfigTxError::NoTransaction(coordinator.name().into()))
}

fn stage_root(
    coordinator: &Initializer,
    policies: &dyn PolicyHandler,
    update: &ConfigGroup,
    names: &[String],
    handlers: Vec<Arc<dyn ConfigHandler>>,
) -> Result<()> {
    let policy_children = policies.begin_policy_config(names)?;
    for (key, value) in &update.values {
        coordinator.propose_config(key, value)?;
    }
    for (key, policy) in &update.policies {
        policies.propose_policy(key, policy)?;
    }
    walk_children(update, handlers, policy_children)
}

fn walk_children(
    group: &ConfigGroup,
    handlers: Vec<Arc<dyn ConfigHandler>>,
    policy_children: Vec<Arc<dyn PolicyHandler>>,
) -> Result<()> {
    let pairs = handlers.into_iter().zip(policy_children);
    for (child, (handler, policies)) in group.groups.values().zip(pairs) {
        walk_group(child, handler.as_ref(), policies.as_ref())?;
    }
    Ok(())
}

fn walk_group(
    group: &ConfigGroup,
    handler: &dyn ConfigHandler,
    policies: &dyn PolicyHandler,
) -> Result<()> {
    let names = group.group_names();
    let children = handler.begin_config(&names)?;
    let policy_children = policies.begin_policy_config(&names)?;
    debug!(group = %handler.name(), children = names.len(), "Group begun");

    for (key, value) in &group.values {
        handler.propose_config(key, value)?;
    }
    for (key, policy) in &group.policies {
        policies.propose_policy(key, policy)?;
    }
    walk_children(group, children, policy_children)
}
