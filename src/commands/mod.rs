use std::sync::Arc;

pub mod charge;
pub mod locks;
pub mod show_history;
pub mod show_point;
pub mod use_point;

use self::locks::UserLocks;

/// The core service: orchestrates validation, balance mutation and history
/// append as one logical unit per request.
///
/// Each operation is a [`tower::Service`] implemented in its own module.
/// The stores are dumb; every invariant is enforced here, under the per-user
/// critical section from [`UserLocks`].
pub struct PointLedger<B, H> {
    balances: Arc<B>,
    history: Arc<H>,
    locks: Arc<UserLocks>,
}

impl<B, H> PointLedger<B, H> {
    pub fn new(balances: Arc<B>, history: Arc<H>) -> Self {
        Self {
            balances,
            history,
            locks: Arc::new(UserLocks::default()),
        }
    }
}

/// Cloning shares the stores and the lock registry, so clones stay mutually
/// serialized per user.
impl<B, H> Clone for PointLedger<B, H> {
    fn clone(&self) -> Self {
        Self {
            balances: self.balances.clone(),
            history: self.history.clone(),
            locks: self.locks.clone(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Negative amount on a charge or use; rejected before any state change.
    #[error("negative amount is not allowed: {amount}")]
    InvalidAmount { amount: i64 },

    /// Balance (or history, see [`show_history`]) requested for a user that
    /// has never transacted.
    #[error("user not found: {user_id}")]
    UserNotFound { user_id: u64 },

    /// Use exceeds the available balance; nothing was mutated.
    #[error("not enough points: user {user_id} requested {requested}, available {available}")]
    InsufficientBalance {
        user_id: u64,
        requested: u64,
        available: u64,
    },

    /// Charging would overflow the balance; rejected before any state change
    /// rather than silently wrapping.
    #[error("balance overflow: user {user_id} has {current}, charging {amount}")]
    BalanceOverflow {
        user_id: u64,
        current: u64,
        amount: u64,
    },

    #[error("balance store error: {0:?}")]
    Balance(#[from] crate::ports::balance::Error),
    #[error("history log error: {0:?}")]
    History(#[from] crate::ports::history::Error),
}

impl Error {
    /// Caller errors: no state change happened and retrying the same request
    /// cannot succeed. Everything else is internal to the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidAmount { .. }
                | Error::UserNotFound { .. }
                | Error::InsufficientBalance { .. }
        )
    }
}

/// Sign check shared by both mutating commands; runs before the critical
/// section is entered.
fn validated_magnitude(amount: i64) -> Result<u64, Error> {
    u64::try_from(amount).map_err(|_| Error::InvalidAmount { amount })
}
