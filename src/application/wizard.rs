//! Linear step machines behind the Add Money, Send Money and Reallocate
//! flows. They collect input, run advisory validation so obviously bad
//! entries never reach the confirm step, then call the service and map its
//! structured error to the failure message. The authoritative checks live
//! in the ledger; nothing here duplicates them as a source of truth.

use crate::domain::{
    format_kes, parse_amount, AccountId, Shillings, TransferRecord, MAX_TRANSACTION,
    MIN_OPERATION,
};

use super::WalletService;

/// Quick-pick amounts offered on the Add Money screen.
pub const DEPOSIT_PRESETS: [Shillings; 5] = [100, 500, 1000, 2000, 5000];

/// Steps of the deposit and reallocate flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Input,
    Confirm,
    Processing,
    Success,
    Failed,
}

/// Steps of the send flow, which collects the recipient first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStep {
    Recipient,
    Amount,
    Confirm,
    Processing,
    Success,
    Failed,
}

/// Add Money: amount entry, confirm against the session MSISDN, simulated
/// STK push via the service.
pub struct DepositWizard {
    target: AccountId,
    amount_input: String,
    step: WizardStep,
    error: Option<String>,
    record: Option<TransferRecord>,
}

impl DepositWizard {
    pub fn new(target: AccountId) -> Self {
        Self {
            target,
            amount_input: String::new(),
            step: WizardStep::Input,
            error: None,
            record: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn record(&self) -> Option<&TransferRecord> {
        self.record.as_ref()
    }

    pub fn amount(&self) -> Option<Shillings> {
        parse_amount(&self.amount_input).ok()
    }

    /// Digits only, like the modal's input filter.
    pub fn enter_amount(&mut self, raw: &str) {
        self.amount_input = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        self.error = None;
    }

    pub fn choose_preset(&mut self, preset: Shillings) {
        self.amount_input = preset.to_string();
        self.error = None;
    }

    /// Advisory bound check; moves to the confirm step on success.
    pub fn proceed(&mut self) -> bool {
        let amount = match self.amount() {
            Some(amount) if amount >= MIN_OPERATION => amount,
            _ => {
                self.error = Some(format!("Minimum amount is {}", format_kes(MIN_OPERATION)));
                return false;
            }
        };
        if amount > MAX_TRANSACTION {
            self.error = Some(format!("Maximum amount is {}", format_kes(MAX_TRANSACTION)));
            return false;
        }
        self.step = WizardStep::Confirm;
        true
    }

    /// Run the deposit. The authoritative validation and the gateway call
    /// happen inside the service.
    pub fn confirm(&mut self, service: &WalletService) -> WizardStep {
        if self.step != WizardStep::Confirm {
            return self.step;
        }
        self.step = WizardStep::Processing;

        let amount = self.amount().unwrap_or(0);
        match service.deposit(self.target.as_str(), amount) {
            Ok(record) => {
                self.record = Some(record);
                self.step = WizardStep::Success;
            }
            Err(error) => {
                self.error = Some(error.to_string());
                self.step = WizardStep::Failed;
            }
        }
        self.step
    }

    /// Back to the confirm step after a failure.
    pub fn retry(&mut self) {
        if self.step == WizardStep::Failed {
            self.step = WizardStep::Confirm;
        }
    }
}

/// Send Money: recipient entry, then amount, then confirm and payout.
pub struct SendWizard {
    source: AccountId,
    phone: String,
    name: String,
    amount_input: String,
    step: SendStep,
    error: Option<String>,
    record: Option<TransferRecord>,
}

impl SendWizard {
    pub fn new(source: AccountId) -> Self {
        Self {
            source,
            phone: String::new(),
            name: String::new(),
            amount_input: String::new(),
            step: SendStep::Recipient,
            error: None,
            record: None,
        }
    }

    pub fn step(&self) -> SendStep {
        self.step
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn record(&self) -> Option<&TransferRecord> {
        self.record.as_ref()
    }

    pub fn enter_phone(&mut self, phone: &str) {
        self.phone = phone.trim().to_string();
        self.error = None;
    }

    pub fn enter_name(&mut self, name: &str) {
        self.name = name.trim().to_string();
        self.error = None;
    }

    /// One tap on a recent recipient fills both fields.
    pub fn choose_recent(&mut self, name: &str, phone: &str) {
        self.enter_name(name);
        self.enter_phone(phone);
    }

    pub fn proceed_recipient(&mut self) -> bool {
        let digits = self.phone.chars().filter(|c| c.is_ascii_digit()).count();
        if digits < 10 {
            self.error = Some("Please enter a valid phone number".to_string());
            return false;
        }
        if self.name.is_empty() {
            self.error = Some("Please enter the recipient's name".to_string());
            return false;
        }
        self.step = SendStep::Amount;
        true
    }

    pub fn enter_amount(&mut self, raw: &str) {
        self.amount_input = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        self.error = None;
    }

    pub fn amount(&self) -> Option<Shillings> {
        parse_amount(&self.amount_input).ok()
    }

    /// Advisory minimum and available-balance check.
    pub fn proceed_amount(&mut self, service: &WalletService) -> bool {
        let amount = match self.amount() {
            Some(amount) if amount >= MIN_OPERATION => amount,
            _ => {
                self.error = Some(format!("Minimum amount is {}", format_kes(MIN_OPERATION)));
                return false;
            }
        };
        let available = service.balance(self.source.as_str()).unwrap_or(0);
        if amount > available {
            self.error = Some(format!(
                "Insufficient balance. Available: {}",
                format_kes(available)
            ));
            return false;
        }
        self.step = SendStep::Confirm;
        true
    }

    pub fn confirm(&mut self, service: &WalletService) -> SendStep {
        if self.step != SendStep::Confirm {
            return self.step;
        }
        self.step = SendStep::Processing;

        let amount = self.amount().unwrap_or(0);
        match service.send(self.source.as_str(), amount, &self.phone, Some(&self.name)) {
            Ok(record) => {
                self.record = Some(record);
                self.step = SendStep::Success;
            }
            Err(error) => {
                self.error = Some(error.to_string());
                self.step = SendStep::Failed;
            }
        }
        self.step
    }

    pub fn retry(&mut self) {
        if self.step == SendStep::Failed {
            self.step = SendStep::Confirm;
        }
    }
}

/// Reallocate: source and destination pickers plus amount, all on the input
/// step, then an instant internal move.
pub struct ReallocateWizard {
    from: Option<AccountId>,
    to: Option<AccountId>,
    amount_input: String,
    step: WizardStep,
    error: Option<String>,
    record: Option<TransferRecord>,
}

impl ReallocateWizard {
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            amount_input: String::new(),
            step: WizardStep::Input,
            error: None,
            record: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn record(&self) -> Option<&TransferRecord> {
        self.record.as_ref()
    }

    pub fn select_source(&mut self, account: AccountId) {
        self.from = Some(account);
        if self.to == Some(account) {
            self.to = None;
        }
        self.error = None;
    }

    /// Ignored when it matches the selected source (the picker disables it).
    pub fn select_destination(&mut self, account: AccountId) -> bool {
        if self.from == Some(account) {
            return false;
        }
        self.to = Some(account);
        self.error = None;
        true
    }

    pub fn enter_amount(&mut self, raw: &str) {
        self.amount_input = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        self.error = None;
    }

    pub fn amount(&self) -> Option<Shillings> {
        parse_amount(&self.amount_input).ok()
    }

    /// Quarter, half and full source balance, dropping picks below the
    /// operation minimum.
    pub fn quick_picks(&self, service: &WalletService) -> Vec<Shillings> {
        let Some(from) = self.from else {
            return Vec::new();
        };
        let balance = service.balance(from.as_str()).unwrap_or(0);
        [balance / 4, balance / 2, balance]
            .into_iter()
            .filter(|&a| a >= MIN_OPERATION)
            .collect()
    }

    pub fn proceed(&mut self, service: &WalletService) -> bool {
        let (Some(from), Some(to)) = (self.from, self.to) else {
            self.error = Some("Select source and destination wallets".to_string());
            return false;
        };
        if from == to {
            self.error = Some("Source and destination must differ".to_string());
            return false;
        }
        let amount = match self.amount() {
            Some(amount) if amount >= MIN_OPERATION => amount,
            _ => {
                self.error = Some(format!("Minimum amount is {}", format_kes(MIN_OPERATION)));
                return false;
            }
        };
        let available = service.balance(from.as_str()).unwrap_or(0);
        if amount > available {
            self.error = Some("Insufficient balance in source wallet".to_string());
            return false;
        }
        self.step = WizardStep::Confirm;
        true
    }

    pub fn confirm(&mut self, service: &WalletService) -> WizardStep {
        if self.step != WizardStep::Confirm {
            return self.step;
        }
        self.step = WizardStep::Processing;

        let (from, to) = match (self.from, self.to) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                self.error = Some("Select source and destination wallets".to_string());
                self.step = WizardStep::Failed;
                return self.step;
            }
        };
        let amount = self.amount().unwrap_or(0);
        match service.reallocate(from.as_str(), to.as_str(), amount) {
            Ok(record) => {
                self.record = Some(record);
                self.step = WizardStep::Success;
            }
            Err(error) => {
                self.error = Some(error.to_string());
                self.step = WizardStep::Failed;
            }
        }
        self.step
    }

    pub fn retry(&mut self) {
        if self.step == WizardStep::Failed {
            self.step = WizardStep::Confirm;
        }
    }
}

impl Default for ReallocateWizard {
    fn default() -> Self {
        Self::new()
    }
}
