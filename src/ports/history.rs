use crate::domain::{HistoryRecord, TransactionKind};

/// Append-only log of applied transactions
#[mockall::automock]
#[async_trait::async_trait]
pub trait HistoryLog {
    /// Assigns the next sequence id and stamps the record with the current
    /// time. `took_micros` is a diagnostic hint from the caller.
    async fn append(
        &self,
        user_id: u64,
        amount: u64,
        kind: TransactionKind,
        took_micros: u64,
    ) -> Result<HistoryRecord, Error>;

    /// All records for the user in append order; empty (not an error) if the
    /// user has none.
    async fn list_by_user(&self, user_id: u64) -> Result<Vec<HistoryRecord>, Error>;
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
