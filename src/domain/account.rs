use serde::{Deserialize, Serialize};

use super::Shillings;

/// Cosmetic annual interest rate on the savings bucket, in basis points.
/// Display-only: no accrual is ever posted to the ledger.
pub const SAVINGS_INTEREST_BPS: i64 = 1_300;

/// The four time-scoped buckets a session's money is split across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountId {
    /// Day-to-day spending money, released every morning
    Daily,
    /// Week-scoped allocation, release-gated until Sunday
    Weekly,
    /// Rent, bills and other monthly obligations, release-gated until the 1st
    Monthly,
    /// Long-term savings with instant access
    Savings,
}

impl AccountId {
    pub const ALL: [AccountId; 4] = [
        AccountId::Daily,
        AccountId::Weekly,
        AccountId::Monthly,
        AccountId::Savings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountId::Daily => "daily",
            AccountId::Weekly => "weekly",
            AccountId::Monthly => "monthly",
            AccountId::Savings => "savings",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "daily" => Some(AccountId::Daily),
            "weekly" => Some(AccountId::Weekly),
            "monthly" => Some(AccountId::Monthly),
            "savings" => Some(AccountId::Savings),
            _ => None,
        }
    }

    /// User-facing bucket name as shown on the wallet cards.
    pub fn display_name(&self) -> &'static str {
        match self {
            AccountId::Daily => "Daily Wallet",
            AccountId::Weekly => "Weekly Wallet",
            AccountId::Monthly => "Monthly Wallet",
            AccountId::Savings => "Savings",
        }
    }

    /// Weekly and Monthly buckets start release-gated; Daily and Savings
    /// are liquid from session start.
    pub fn locked_at_start(&self) -> bool {
        matches!(self, AccountId::Weekly | AccountId::Monthly)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One bucket's live state. Balances never go negative; `locked` gates
/// external sends only (reallocations pass in both directions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAccount {
    pub id: AccountId,
    pub balance: Shillings,
    pub locked: bool,
}

impl WalletAccount {
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            balance: 0,
            locked: id.locked_at_start(),
        }
    }

    pub fn with_balance(mut self, balance: Shillings) -> Self {
        assert!(balance >= 0, "Account balance must be non-negative");
        self.balance = balance;
        self
    }
}

/// Estimated interest the savings balance earns in one day, in shillings.
/// Purely informational; mirrors the "Interest earned today" banner.
pub fn estimated_daily_interest(balance: Shillings) -> f64 {
    balance as f64 * SAVINGS_INTEREST_BPS as f64 / 10_000.0 / 365.0
}
