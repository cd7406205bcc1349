//! The capability every configuration tree node implements.

use crate::error::Result;
use crate::value::ConfigValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifecycle of one transaction on one handler.
///
/// `Idle → InProgress → {Committed | RolledBack}`; a handler in any state
/// other than `InProgress` may begin again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxState {
    Idle,
    InProgress,
    Committed,
    RolledBack,
}

impl TxState {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, TxState::InProgress)
    }
}

/// A node of the configuration tree.
///
/// The tree walk is written against this trait only, never against concrete
/// node types. All methods take `&self`: handlers are shared between the
/// tree and the read accessors of the resource bundle, so staging uses
/// interior mutability.
pub trait ConfigHandler: Send + Sync {
    /// Human-readable name for logs and errors.
    fn name(&self) -> &str;

    /// Open a transaction on this node and return one child handler per
    /// requested group name, in request order. Fails if a name is not a
    /// child this node supports.
    fn begin_config(&self, groups: &[String]) -> Result<Vec<Arc<dyn ConfigHandler>>>;

    /// Stage `key = value`. Not visible to readers until commit.
    fn propose_config(&self, key: &str, value: &ConfigValue) -> Result<()>;

    /// Discard everything staged since the last begin. Never fails.
    fn rollback_config(&self);

    /// Publish everything staged since the last begin. Never fails.
    fn commit_config(&self);
}
