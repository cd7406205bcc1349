use crate::error::{ConfigTxError, Result};
use crate::handler::TxState;
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

struct Pending<T> {
    value: Option<T>,
    state: TxState,
}

/// Committed/pending pair backing a concrete handler.
///
/// Readers only ever see the committed `Arc<T>`. A transaction works on a
/// private clone that replaces the committed value wholesale on commit, so a
/// reader holding an earlier `Arc` keeps a consistent view.
///
/// Lock order is pending before committed.
pub struct Staged<T> {
    owner: String,
    committed: RwLock<Arc<T>>,
    pending: Mutex<Pending<T>>,
}

impl<T: Clone> Staged<T> {
    pub fn new(owner: impl Into<String>, initial: T) -> Self {
        Self {
            owner: owner.into(),
            committed: RwLock::new(Arc::new(initial)),
            pending: Mutex::new(Pending {
                value: None,
                state: TxState::Idle,
            }),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The committed value.
    pub fn current(&self) -> Arc<T> {
        self.committed.read().expect("lock not poisoned").clone()
    }

    pub fn state(&self) -> TxState {
        self.pending.lock().expect("lock not poisoned").state
    }

    /// Start a transaction from a copy of the committed value.
    pub fn begin(&self) -> Result<()> {
        let mut pending = self.pending.lock().expect("lock not poisoned");
        if pending.state.is_in_progress() {
            return Err(ConfigTxError::TransactionInProgress(self.owner.clone()));
        }
        let base = self.committed.read().expect("lock not poisoned");
        pending.value = Some(T::clone(&base));
        pending.state = TxState::InProgress;
        debug!(owner = %self.owner, "Transaction begun");
        Ok(())
    }

    /// Apply `f` to the pending value.
    ///
    /// `f` runs on a scratch copy that only replaces the pending value when
    /// it returns `Ok`, so a rejected proposal leaves earlier staging intact.
    pub fn stage<R>(&self, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        let mut pending = self.pending.lock().expect("lock not poisoned");
        let current = pending
            .value
            .as_mut()
            .ok_or_else(|| ConfigTxError::NoTransaction(self.owner.clone()))?;
        let mut scratch = current.clone();
        let out = f(&mut scratch)?;
        *current = scratch;
        Ok(out)
    }

    /// Read the pending value, if a transaction is open.
    pub fn with_pending<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let pending = self.pending.lock().expect("lock not poisoned");
        pending.value.as_ref().map(f)
    }

    /// Publish the pending value. Returns `false` when nothing was pending.
    pub fn commit(&self) -> bool {
        let mut pending = self.pending.lock().expect("lock not poisoned");
        match pending.value.take() {
            Some(value) => {
                *self.committed.write().expect("lock not poisoned") = Arc::new(value);
                pending.state = TxState::Committed;
                debug!(owner = %self.owner, "Transaction committed");
                true
            }
            None => false,
        }
    }

    /// Drop the pending value. Returns `false` when nothing was pending.
    pub fn rollback(&self) -> bool {
        let mut pending = self.pending.lock().expect("lock not poisoned");
        match pending.value.take() {
            Some(_) => {
                pending.state = TxState::RolledBack;
                debug!(owner = %self.owner, "Transaction rolled back");
                true
            }
            None => false,
        }
    }
}
