use chrono::{DateTime, Utc};

/// Current point total for a user
///
/// Absence of a `Balance` (rather than a sentinel amount) means the user has
/// never transacted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Balance {
    /// Unique identifier for the user
    ///
    /// Assigned by the caller; this service never creates or deletes users.
    pub user_id: u64,

    /// Current amount of points
    ///
    /// Unsigned by construction: no sequence of valid operations may take a
    /// balance below zero.
    pub point: u64,

    /// When the balance was last written
    pub updated_at: DateTime<Utc>,
}

/// One applied charge or use, immutable once recorded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRecord {
    /// Sequence id, monotonically increasing across all users
    pub id: u64,
    pub user_id: u64,
    /// Magnitude of the transaction; the direction lives in `kind`
    pub amount: u64,
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
    /// How long the originating mutation took, in microseconds
    ///
    /// Diagnostic only; not part of any invariant.
    pub took_micros: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionKind {
    Charge,
    Use,
}

impl TransactionKind {
    /// Wire name used by the HTTP boundary
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Charge => "CHARGE",
            TransactionKind::Use => "USE",
        }
    }
}
