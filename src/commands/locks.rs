use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tokio::sync::RwLock;

/// Registry of per-user critical sections
///
/// Every balance mutation for a user runs under that user's write lock for
/// its whole read-validate-write-log cycle, so two concurrent operations can
/// never both pass validation against the same stale balance. Reads take the
/// lock in shared mode and therefore never block each other, and operations
/// on different users never contend at all.
///
/// Entries are never removed: users are never deleted in this model, so the
/// registry is bounded by the user population.
#[derive(Debug, Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<u64, Arc<RwLock<()>>>>,
}

impl UserLocks {
    /// Lock guarding all balance and history state for one user
    pub fn for_user(&self, user_id: u64) -> Arc<RwLock<()>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user_id)
            .or_default()
            .clone()
    }
}
