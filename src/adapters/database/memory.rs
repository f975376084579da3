use crate::{
    domain::{Balance, HistoryRecord, TransactionKind},
    ports::{balance, history},
};
use chrono::Utc;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

/// In-memory balance table
///
/// The inner mutex only protects the map itself; serializing read-modify-write
/// cycles against a single user is the ledger's job.
#[derive(Clone, Debug, Default)]
pub struct MemoryBalanceStore {
    balances: Arc<Mutex<HashMap<u64, Balance>>>,
}

#[async_trait::async_trait]
impl balance::BalanceStore for MemoryBalanceStore {
    async fn get(&self, user_id: u64) -> Result<Option<Balance>, balance::Error> {
        let found = self.balances.lock()?.get(&user_id).cloned();
        Ok(found)
    }

    async fn set(&self, user_id: u64, amount: u64) -> Result<Balance, balance::Error> {
        let balance = Balance {
            user_id,
            point: amount,
            updated_at: Utc::now(),
        };
        self.balances.lock()?.insert(user_id, balance.clone());
        Ok(balance)
    }
}

/// In-memory append-only transaction log
///
/// Sequence ids are assigned from a single counter, so they are unique and
/// monotonic across all users.
#[derive(Clone, Debug, Default)]
pub struct MemoryHistoryLog {
    inner: Arc<Mutex<LogInner>>,
}

#[derive(Debug)]
struct LogInner {
    next_id: u64,
    records: Vec<HistoryRecord>,
}

// Sequence ids start at 1; 0 is never a valid record id.
impl Default for LogInner {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl history::HistoryLog for MemoryHistoryLog {
    async fn append(
        &self,
        user_id: u64,
        amount: u64,
        kind: TransactionKind,
        took_micros: u64,
    ) -> Result<HistoryRecord, history::Error> {
        let mut inner = self.inner.lock()?;
        let record = HistoryRecord {
            id: inner.next_id,
            user_id,
            amount,
            kind,
            created_at: Utc::now(),
            took_micros,
        };
        inner.next_id += 1;
        inner.records.push(record.clone());
        Ok(record)
    }

    async fn list_by_user(&self, user_id: u64) -> Result<Vec<HistoryRecord>, history::Error> {
        let records = self
            .inner
            .lock()?
            .records
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        Ok(records)
    }
}

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we
/// erase the error and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for balance::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for history::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}
