use crate::domain::Balance;

/// Key-value store for per-user balances
///
/// This is a dumb mutator: no validation happens here. Callers must compute
/// `amount` from a consistent prior `get` — the ledger holds the per-user
/// critical section that makes that read-modify-write safe.
#[mockall::automock]
#[async_trait::async_trait]
pub trait BalanceStore {
    /// `None` means the user has never transacted.
    async fn get(&self, user_id: u64) -> Result<Option<Balance>, Error>;

    /// Unconditionally overwrites the stored amount and refreshes the
    /// `updated_at` timestamp.
    async fn set(&self, user_id: u64, amount: u64) -> Result<Balance, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not
    /// part of the domain model, such as connectivity, configuration, or
    /// permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
