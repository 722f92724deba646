use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{
    format_kes, AccountId, Shillings, TransferRecord, WalletAccount, MAX_TRANSACTION,
    MIN_OPERATION,
};

/// Rejection reasons for ledger operations. All are recoverable: a failed
/// operation leaves balances and the log untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance in {account}: balance KES {balance}, required KES {required}")]
    InsufficientBalance {
        account: AccountId,
        balance: Shillings,
        required: Shillings,
    },

    #[error("{0} is locked until its next scheduled release")]
    AccountLocked(AccountId),

    #[error("Cannot reallocate from {0} to itself")]
    SameAccount(AccountId),
}

/// The sole owner of the four bucket balances and the append-only transfer
/// log. Every mutation validates fully before touching any state, so an
/// operation either applies completely (balance change plus record) or not
/// at all.
#[derive(Debug, Clone)]
pub struct WalletLedger {
    accounts: [WalletAccount; 4],
    records: Vec<TransferRecord>,
    next_sequence: i64,
}

impl WalletLedger {
    /// Fresh session: zero balances, weekly/monthly release-gated.
    pub fn new() -> Self {
        Self {
            accounts: AccountId::ALL.map(WalletAccount::new),
            records: Vec::new(),
            next_sequence: 1,
        }
    }

    /// Session with explicit opening balances.
    pub fn seeded(
        daily: Shillings,
        weekly: Shillings,
        monthly: Shillings,
        savings: Shillings,
    ) -> Self {
        let mut ledger = Self::new();
        ledger.accounts[0] = WalletAccount::new(AccountId::Daily).with_balance(daily);
        ledger.accounts[1] = WalletAccount::new(AccountId::Weekly).with_balance(weekly);
        ledger.accounts[2] = WalletAccount::new(AccountId::Monthly).with_balance(monthly);
        ledger.accounts[3] = WalletAccount::new(AccountId::Savings).with_balance(savings);
        ledger
    }

    /// The demo profile from the mock session.
    pub fn demo_profile() -> Self {
        Self::seeded(100, 375, 1500, 4525)
    }

    fn index(account: AccountId) -> usize {
        match account {
            AccountId::Daily => 0,
            AccountId::Weekly => 1,
            AccountId::Monthly => 2,
            AccountId::Savings => 3,
        }
    }

    pub fn account(&self, id: AccountId) -> &WalletAccount {
        &self.accounts[Self::index(id)]
    }

    fn account_mut(&mut self, id: AccountId) -> &mut WalletAccount {
        &mut self.accounts[Self::index(id)]
    }

    pub fn balance(&self, id: AccountId) -> Shillings {
        self.account(id).balance
    }

    pub fn is_locked(&self, id: AccountId) -> bool {
        self.account(id).locked
    }

    pub fn accounts(&self) -> &[WalletAccount; 4] {
        &self.accounts
    }

    /// Sum across all four buckets. Invariant under reallocation and release.
    pub fn total(&self) -> Shillings {
        self.accounts.iter().map(|a| a.balance).sum()
    }

    /// Records in append order. Callers wanting most-recent-first reverse.
    pub fn records(&self) -> &[TransferRecord] {
        &self.records
    }

    /// Validate a deposit amount without applying anything. The service uses
    /// this before contacting the payment gateway so a declined validation
    /// never follows a confirmed payment.
    pub fn check_deposit(&self, amount: Shillings) -> Result<(), LedgerError> {
        if amount < MIN_OPERATION {
            return Err(LedgerError::InvalidAmount(format!(
                "Minimum amount is {}",
                format_kes(MIN_OPERATION)
            )));
        }
        if amount > MAX_TRANSACTION {
            return Err(LedgerError::InvalidAmount(format!(
                "Maximum amount is {}",
                format_kes(MAX_TRANSACTION)
            )));
        }
        Ok(())
    }

    /// Validate an external send without applying anything. Sends are bounded
    /// by the operation minimum and the available balance only.
    pub fn check_withdraw(&self, source: AccountId, amount: Shillings) -> Result<(), LedgerError> {
        if amount < MIN_OPERATION {
            return Err(LedgerError::InvalidAmount(format!(
                "Minimum amount is {}",
                format_kes(MIN_OPERATION)
            )));
        }
        let account = self.account(source);
        if account.locked {
            return Err(LedgerError::AccountLocked(source));
        }
        if amount > account.balance {
            return Err(LedgerError::InsufficientBalance {
                account: source,
                balance: account.balance,
                required: amount,
            });
        }
        Ok(())
    }

    /// External funding into a bucket. Locked buckets may receive deposits.
    /// Increases the four-bucket total by exactly `amount`.
    pub fn deposit(
        &mut self,
        target: AccountId,
        amount: Shillings,
        reference: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<TransferRecord, LedgerError> {
        self.check_deposit(amount)?;

        self.account_mut(target).balance += amount;

        let mut record = TransferRecord::deposit(target, amount, timestamp);
        if let Some(reference) = reference {
            record = record.with_reference(reference);
        }
        Ok(self.append(record))
    }

    /// External spend out of a bucket ("send money"). Rejected when the
    /// source is release-gated; decreases the total by exactly `amount`.
    pub fn withdraw(
        &mut self,
        source: AccountId,
        amount: Shillings,
        counterparty: Option<String>,
        reference: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<TransferRecord, LedgerError> {
        self.check_withdraw(source, amount)?;

        self.account_mut(source).balance -= amount;

        let mut record = TransferRecord::send(source, amount, timestamp);
        if let Some(counterparty) = counterparty {
            record = record.with_counterparty(counterparty);
        }
        if let Some(reference) = reference {
            record = record.with_reference(reference);
        }
        Ok(self.append(record))
    }

    /// Internal move between two buckets in one atomic step. Lock state is
    /// irrelevant here: only external sends are gated, so gated buckets can
    /// both give and receive through reallocation.
    pub fn reallocate(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Shillings,
        timestamp: DateTime<Utc>,
    ) -> Result<TransferRecord, LedgerError> {
        if from == to {
            return Err(LedgerError::SameAccount(from));
        }
        if amount < MIN_OPERATION {
            return Err(LedgerError::InvalidAmount(format!(
                "Minimum amount is {}",
                format_kes(MIN_OPERATION)
            )));
        }
        let balance = self.balance(from);
        if amount > balance {
            return Err(LedgerError::InsufficientBalance {
                account: from,
                balance,
                required: amount,
            });
        }

        self.account_mut(from).balance -= amount;
        self.account_mut(to).balance += amount;

        Ok(self.append(TransferRecord::reallocation(from, to, amount, timestamp)))
    }

    /// Scheduled unlock of a release-gated bucket. Returns `None` when the
    /// bucket is already liquid or holds nothing worth logging.
    pub fn release(
        &mut self,
        account: AccountId,
        timestamp: DateTime<Utc>,
    ) -> Option<TransferRecord> {
        let entry = self.account_mut(account);
        if !entry.locked {
            return None;
        }
        entry.locked = false;

        let balance = entry.balance;
        if balance == 0 {
            // Nothing unlocked; the state flip alone is the event
            return None;
        }
        Some(self.append(TransferRecord::release(account, balance, timestamp)))
    }

    fn append(&mut self, mut record: TransferRecord) -> TransferRecord {
        record.sequence = self.next_sequence;
        self.next_sequence += 1;
        self.records.push(record.clone());
        record
    }
}

impl Default for WalletLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransferKind;

    #[test]
    fn test_deposit_increases_target_and_total() {
        let mut ledger = WalletLedger::demo_profile();
        let before_total = ledger.total();

        let record = ledger
            .deposit(AccountId::Savings, 500, None, Utc::now())
            .unwrap();

        assert_eq!(ledger.balance(AccountId::Savings), 5025);
        assert_eq!(ledger.total(), before_total + 500);
        assert_eq!(record.kind, TransferKind::Deposit);
        assert_eq!(ledger.records().len(), 1);
    }

    #[test]
    fn test_deposit_bounds() {
        let mut ledger = WalletLedger::new();
        assert!(matches!(
            ledger.deposit(AccountId::Daily, 9, None, Utc::now()),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            ledger.deposit(AccountId::Daily, 150_001, None, Utc::now()),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(ledger.deposit(AccountId::Daily, 10, None, Utc::now()).is_ok());
        assert!(
            ledger
                .deposit(AccountId::Daily, 150_000, None, Utc::now())
                .is_ok()
        );
    }

    #[test]
    fn test_deposit_into_locked_bucket_allowed() {
        let mut ledger = WalletLedger::new();
        assert!(ledger.is_locked(AccountId::Weekly));
        ledger
            .deposit(AccountId::Weekly, 200, None, Utc::now())
            .unwrap();
        assert_eq!(ledger.balance(AccountId::Weekly), 200);
    }

    #[test]
    fn test_withdraw_rejects_overdraft_and_leaves_state() {
        let mut ledger = WalletLedger::seeded(100, 0, 0, 0);

        let err = ledger
            .withdraw(AccountId::Daily, 150, None, None, Utc::now())
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                account: AccountId::Daily,
                balance: 100,
                required: 150,
            }
        );
        assert_eq!(ledger.balance(AccountId::Daily), 100);
        assert!(ledger.records().is_empty());
    }

    #[test]
    fn test_withdraw_has_no_upper_bound_below_balance() {
        // Sends are limited by the balance alone; the gateway ceiling only
        // applies to deposits
        let mut ledger = WalletLedger::seeded(200_000, 0, 0, 0);

        let record = ledger
            .withdraw(AccountId::Daily, 160_000, None, None, Utc::now())
            .unwrap();

        assert_eq!(record.amount, 160_000);
        assert_eq!(ledger.balance(AccountId::Daily), 40_000);
    }

    #[test]
    fn test_bound_messages_use_thousands_separators() {
        let mut ledger = WalletLedger::new();

        let err = ledger
            .deposit(AccountId::Daily, 200_000, None, Utc::now())
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidAmount("Maximum amount is KES 150,000".to_string())
        );

        let err = ledger.deposit(AccountId::Daily, 5, None, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidAmount("Minimum amount is KES 10".to_string())
        );
    }

    #[test]
    fn test_withdraw_from_locked_bucket_rejected() {
        let mut ledger = WalletLedger::seeded(0, 375, 0, 0);

        let err = ledger
            .withdraw(AccountId::Weekly, 50, None, None, Utc::now())
            .unwrap_err();

        assert_eq!(err, LedgerError::AccountLocked(AccountId::Weekly));
        assert_eq!(ledger.balance(AccountId::Weekly), 375);
    }

    #[test]
    fn test_withdraw_decreases_total() {
        let mut ledger = WalletLedger::seeded(100, 0, 0, 0);
        let before_total = ledger.total();

        let record = ledger
            .withdraw(
                AccountId::Daily,
                50,
                Some("Mama Pima (+254 722 111 222)".to_string()),
                None,
                Utc::now(),
            )
            .unwrap();

        assert_eq!(ledger.total(), before_total - 50);
        assert_eq!(record.counterparty.as_deref(), Some("Mama Pima (+254 722 111 222)"));
    }

    #[test]
    fn test_reallocate_conserves_total() {
        let mut ledger = WalletLedger::demo_profile();
        let before_total = ledger.total();

        ledger
            .reallocate(AccountId::Daily, AccountId::Weekly, 50, Utc::now())
            .unwrap();

        assert_eq!(ledger.balance(AccountId::Daily), 50);
        assert_eq!(ledger.balance(AccountId::Weekly), 425);
        assert_eq!(ledger.total(), before_total);
    }

    #[test]
    fn test_reallocate_same_account_rejected() {
        let mut ledger = WalletLedger::demo_profile();
        let before = ledger.balance(AccountId::Daily);

        let err = ledger
            .reallocate(AccountId::Daily, AccountId::Daily, 50, Utc::now())
            .unwrap_err();

        assert_eq!(err, LedgerError::SameAccount(AccountId::Daily));
        assert_eq!(ledger.balance(AccountId::Daily), before);
        assert!(ledger.records().is_empty());
    }

    #[test]
    fn test_reallocate_through_locked_bucket_both_directions() {
        let mut ledger = WalletLedger::demo_profile();

        // Into a locked bucket
        ledger
            .reallocate(AccountId::Daily, AccountId::Monthly, 50, Utc::now())
            .unwrap();
        // Out of a locked bucket
        ledger
            .reallocate(AccountId::Monthly, AccountId::Savings, 100, Utc::now())
            .unwrap();

        assert_eq!(ledger.balance(AccountId::Monthly), 1450);
        assert_eq!(ledger.balance(AccountId::Savings), 4625);
    }

    #[test]
    fn test_release_unlocks_and_logs_once() {
        let mut ledger = WalletLedger::seeded(0, 375, 0, 0);

        let record = ledger.release(AccountId::Weekly, Utc::now()).unwrap();
        assert_eq!(record.kind, TransferKind::Release);
        assert_eq!(record.amount, 375);
        assert!(!ledger.is_locked(AccountId::Weekly));

        // Second release is a no-op
        assert!(ledger.release(AccountId::Weekly, Utc::now()).is_none());
        assert_eq!(ledger.records().len(), 1);
    }

    #[test]
    fn test_release_is_conservation_neutral() {
        let mut ledger = WalletLedger::demo_profile();
        let before_total = ledger.total();

        ledger.release(AccountId::Weekly, Utc::now());
        ledger.release(AccountId::Monthly, Utc::now());

        assert_eq!(ledger.total(), before_total);
    }

    #[test]
    fn test_sequences_are_monotonic() {
        let mut ledger = WalletLedger::demo_profile();
        let a = ledger
            .deposit(AccountId::Daily, 100, None, Utc::now())
            .unwrap();
        let b = ledger
            .reallocate(AccountId::Daily, AccountId::Savings, 50, Utc::now())
            .unwrap();
        let c = ledger
            .withdraw(AccountId::Daily, 20, None, None, Utc::now())
            .unwrap();

        assert_eq!((a.sequence, b.sequence, c.sequence), (1, 2, 3));
    }
}
