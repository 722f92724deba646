use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::{
    estimated_daily_interest, AccountId, ReleaseSchedule, Shillings, TransferKind,
    TransferRecord, WalletAccount, WalletLedger,
};

use super::{PaymentProvider, WalletError};

/// Balance line for one bucket, ready for display.
#[derive(Debug, Clone)]
pub struct BalanceEntry {
    pub account: AccountId,
    pub balance: Shillings,
    pub locked: bool,
    /// Next scheduled unlock, present only while the bucket is gated
    pub next_release: Option<DateTime<Utc>>,
}

/// Filter for history queries. Results are most recent first.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Records where the bucket is source or destination
    pub account: Option<AccountId>,
    pub kind: Option<TransferKind>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

/// Session-wide overview: per-bucket balances, the four-bucket total and the
/// cosmetic savings interest estimate.
#[derive(Debug, Clone)]
pub struct WalletSummary {
    pub entries: Vec<BalanceEntry>,
    pub total: Shillings,
    pub daily_interest_estimate: f64,
}

/// Result of one scheduled unlock.
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    pub account: AccountId,
    pub released: Shillings,
    /// Absent when the bucket unlocked empty
    pub record: Option<TransferRecord>,
}

struct SessionState {
    ledger: WalletLedger,
    gateway: Box<dyn PaymentProvider + Send>,
    /// Reference point for due-release checks; advances on every run
    last_release_check: DateTime<Utc>,
}

/// The primary interface for UI collaborators (wizards, CLI). Resolves
/// account names, consults the payment gateway for external movements and
/// serializes every operation behind one mutex, so each runs
/// read-validate-mutate-log to completion without interleaving.
pub struct WalletService {
    state: Mutex<SessionState>,
    msisdn: String,
}

impl WalletService {
    pub fn new(
        ledger: WalletLedger,
        gateway: Box<dyn PaymentProvider + Send>,
        msisdn: impl Into<String>,
    ) -> Self {
        Self {
            state: Mutex::new(SessionState {
                ledger,
                gateway,
                last_release_check: Utc::now(),
            }),
            msisdn: msisdn.into(),
        }
    }

    /// Backdate the session start, so release boundaries between then and
    /// now count as due.
    pub fn with_session_start(mut self, started_at: DateTime<Utc>) -> Self {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .last_release_check = started_at;
        self
    }

    pub fn msisdn(&self) -> &str {
        &self.msisdn
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // Ledger mutations are validate-then-apply, so state stays
        // consistent even if a previous holder panicked mid-call.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve a user-entered account name to a bucket id.
    pub fn resolve_account(name: &str) -> Result<AccountId, WalletError> {
        AccountId::from_str(name).ok_or_else(|| WalletError::UnknownAccount(name.to_string()))
    }

    // ========================
    // Mutations
    // ========================

    /// Add money: gateway STK-push against the session MSISDN, then the
    /// ledger deposit. Bounds are checked before the gateway is contacted,
    /// so a confirmed payment can never be rejected afterwards.
    pub fn deposit(&self, target: &str, amount: Shillings) -> Result<TransferRecord, WalletError> {
        let target = Self::resolve_account(target)?;
        let mut state = self.state();

        state.ledger.check_deposit(amount)?;

        let receipt = match state.gateway.request_deposit(&self.msisdn, amount) {
            Ok(receipt) => receipt,
            Err(error) => {
                warn!(%target, amount, %error, "deposit declined by gateway");
                return Err(error.into());
            }
        };

        let record = state
            .ledger
            .deposit(target, amount, Some(receipt.reference), Utc::now())?;
        info!(%target, amount, reference = record.reference.as_deref(), "deposit applied");
        Ok(record)
    }

    /// Send money to an external recipient from an unlocked bucket.
    pub fn send(
        &self,
        source: &str,
        amount: Shillings,
        phone: &str,
        name: Option<&str>,
    ) -> Result<TransferRecord, WalletError> {
        let source = Self::resolve_account(source)?;
        let label = recipient_label(phone, name)?;
        let mut state = self.state();

        state.ledger.check_withdraw(source, amount)?;

        let receipt = match state.gateway.request_payout(phone, amount) {
            Ok(receipt) => receipt,
            Err(error) => {
                warn!(%source, amount, %error, "send declined by gateway");
                return Err(error.into());
            }
        };

        let record = state.ledger.withdraw(
            source,
            amount,
            Some(label),
            Some(receipt.reference),
            Utc::now(),
        )?;
        info!(%source, amount, "send applied");
        Ok(record)
    }

    /// Move money between two buckets. No gateway involved.
    pub fn reallocate(
        &self,
        from: &str,
        to: &str,
        amount: Shillings,
    ) -> Result<TransferRecord, WalletError> {
        let from = Self::resolve_account(from)?;
        let to = Self::resolve_account(to)?;

        let record = self.state().ledger.reallocate(from, to, amount, Utc::now())?;
        info!(%from, %to, amount, "reallocation applied");
        Ok(record)
    }

    /// Unlock every gated bucket whose release boundary passed since the
    /// last check. Meant to be driven by a timer collaborator.
    pub fn run_releases(&self, now: DateTime<Utc>) -> Vec<ReleaseOutcome> {
        let mut state = self.state();
        let reference = state.last_release_check;
        let mut outcomes = Vec::new();

        for account in AccountId::ALL {
            if !state.ledger.is_locked(account) {
                continue;
            }
            if !ReleaseSchedule::is_due(account, reference, now) {
                continue;
            }
            let released = state.ledger.balance(account);
            let record = state.ledger.release(account, now);
            info!(%account, released, "scheduled release executed");
            outcomes.push(ReleaseOutcome {
                account,
                released,
                record,
            });
        }

        if now > state.last_release_check {
            state.last_release_check = now;
        }
        outcomes
    }

    // ========================
    // Queries
    // ========================

    pub fn balance(&self, account: &str) -> Result<Shillings, WalletError> {
        let account = Self::resolve_account(account)?;
        Ok(self.state().ledger.balance(account))
    }

    pub fn balances(&self) -> Vec<BalanceEntry> {
        let state = self.state();
        let now = Utc::now();
        AccountId::ALL
            .iter()
            .map(|&account| {
                let locked = state.ledger.is_locked(account);
                BalanceEntry {
                    account,
                    balance: state.ledger.balance(account),
                    locked,
                    next_release: locked
                        .then(|| ReleaseSchedule::next_release(account, now))
                        .flatten(),
                }
            })
            .collect()
    }

    pub fn total(&self) -> Shillings {
        self.state().ledger.total()
    }

    /// Snapshot of the raw account states, used by the exporter.
    pub fn accounts(&self) -> Vec<WalletAccount> {
        self.state().ledger.accounts().to_vec()
    }

    /// Filtered history, most recent first.
    pub fn history(&self, filter: &HistoryFilter) -> Vec<TransferRecord> {
        let state = self.state();
        let matching = state
            .ledger
            .records()
            .iter()
            .rev()
            .filter(|r| filter.account.is_none_or(|a| r.involves(a)))
            .filter(|r| filter.kind.is_none_or(|k| r.kind == k))
            .filter(|r| filter.from_date.is_none_or(|d| r.timestamp >= d))
            .filter(|r| filter.to_date.is_none_or(|d| r.timestamp <= d))
            .cloned();

        match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }

    pub fn summary(&self) -> WalletSummary {
        let entries = self.balances();
        let total = entries.iter().map(|e| e.balance).sum();
        let savings = entries
            .iter()
            .find(|e| e.account == AccountId::Savings)
            .map(|e| e.balance)
            .unwrap_or(0);

        WalletSummary {
            entries,
            total,
            daily_interest_estimate: estimated_daily_interest(savings),
        }
    }
}

/// Build the counterparty label stored on send records: "Name (phone)".
/// Rejects phone numbers with fewer than 10 digits, mirroring the
/// recipient-step validation.
fn recipient_label(phone: &str, name: Option<&str>) -> Result<String, WalletError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 10 {
        return Err(WalletError::InvalidRecipient(
            "Please enter a valid phone number".to_string(),
        ));
    }
    match name {
        Some(name) if !name.trim().is_empty() => Ok(format!("{} ({})", name.trim(), phone)),
        _ => Ok(phone.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_label_with_name() {
        let label = recipient_label("+254 722 111 222", Some("Mama Pima")).unwrap();
        assert_eq!(label, "Mama Pima (+254 722 111 222)");
    }

    #[test]
    fn test_recipient_label_phone_only() {
        let label = recipient_label("+254700000000", None).unwrap();
        assert_eq!(label, "+254700000000");
    }

    #[test]
    fn test_recipient_label_rejects_short_numbers() {
        assert!(matches!(
            recipient_label("12345", Some("Bob")),
            Err(WalletError::InvalidRecipient(_))
        ));
    }
}
