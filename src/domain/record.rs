use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, Shillings};

pub type RecordId = Uuid;

/// What kind of money movement a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    /// External funding into a bucket (no source)
    Deposit,
    /// External spend out of a bucket (no destination)
    Send,
    /// Internal move between two buckets
    Reallocate,
    /// A time-gated bucket unlocking on schedule
    Release,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::Deposit => "deposit",
            TransferKind::Send => "send",
            TransferKind::Reallocate => "reallocate",
            TransferKind::Release => "release",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deposit" => Some(TransferKind::Deposit),
            "send" => Some(TransferKind::Send),
            "reallocate" => Some(TransferKind::Reallocate),
            "release" => Some(TransferKind::Release),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in the append-only audit trail. Records are immutable once
/// appended; the ledger never edits or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: RecordId,
    /// Monotonically increasing sequence number, assigned by the ledger
    pub sequence: i64,
    pub timestamp: DateTime<Utc>,
    /// Bucket the money left; absent for external deposits
    pub source: Option<AccountId>,
    /// Bucket the money entered; absent for external sends
    pub destination: Option<AccountId>,
    /// Amount moved (always positive); for releases, the balance unlocked
    pub amount: Shillings,
    pub kind: TransferKind,
    /// Recipient phone/name for sends
    pub counterparty: Option<String>,
    /// Gateway receipt code for deposits and sends
    pub reference: Option<String>,
}

impl TransferRecord {
    fn new(
        kind: TransferKind,
        source: Option<AccountId>,
        destination: Option<AccountId>,
        amount: Shillings,
        timestamp: DateTime<Utc>,
    ) -> Self {
        assert!(amount > 0, "Record amount must be positive");
        Self {
            id: Uuid::new_v4(),
            sequence: 0, // assigned by the ledger on append
            timestamp,
            source,
            destination,
            amount,
            kind,
            counterparty: None,
            reference: None,
        }
    }

    pub fn deposit(target: AccountId, amount: Shillings, timestamp: DateTime<Utc>) -> Self {
        Self::new(TransferKind::Deposit, None, Some(target), amount, timestamp)
    }

    pub fn send(source: AccountId, amount: Shillings, timestamp: DateTime<Utc>) -> Self {
        Self::new(TransferKind::Send, Some(source), None, amount, timestamp)
    }

    pub fn reallocation(
        from: AccountId,
        to: AccountId,
        amount: Shillings,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(TransferKind::Reallocate, Some(from), Some(to), amount, timestamp)
    }

    /// Release records carry the unlocked balance with source == destination,
    /// so they are conservation-neutral by construction.
    pub fn release(account: AccountId, balance: Shillings, timestamp: DateTime<Utc>) -> Self {
        Self::new(
            TransferKind::Release,
            Some(account),
            Some(account),
            balance,
            timestamp,
        )
    }

    pub fn with_counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = Some(counterparty.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Returns true if the given bucket is the source or destination.
    pub fn involves(&self, account: AccountId) -> bool {
        self.source == Some(account) || self.destination == Some(account)
    }
}
