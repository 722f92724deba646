use thiserror::Error;

use crate::domain::LedgerError;

use super::ProviderError;

/// Application-level error taxonomy surfaced to UI collaborators. Every
/// variant is recoverable and maps to a user-facing message; the wizards
/// offer retry on all of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Account name did not resolve to one of the four buckets
    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    /// InvalidAmount, InsufficientBalance, AccountLocked or SameAccount
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The simulated gateway declined or timed out
    #[error("Payment failed: {0}")]
    PaymentFailed(#[from] ProviderError),

    /// Recipient input rejected before reaching the gateway
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}
