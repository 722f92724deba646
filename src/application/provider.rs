use std::collections::VecDeque;

use thiserror::Error;

use crate::domain::Shillings;

/// Outcomes a gateway interaction can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Transaction declined: {0}")]
    Declined(String),

    #[error("Request timed out waiting for confirmation")]
    Timeout,
}

/// Receipt returned by an approved gateway interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Gateway confirmation code, e.g. "MP00000042"
    pub reference: String,
}

/// The mobile-money gateway seam. The original mock rolled dice
/// (`Math.random() > 0.1`) inside the UI; here failure injection is an
/// explicit collaborator so outcomes are deterministic and testable.
pub trait PaymentProvider {
    /// STK-push analog: ask the user's phone to approve pulling `amount`
    /// into the wallet.
    fn request_deposit(&mut self, msisdn: &str, amount: Shillings)
    -> Result<Receipt, ProviderError>;

    /// Push `amount` out to an external recipient.
    fn request_payout(
        &mut self,
        recipient: &str,
        amount: Shillings,
    ) -> Result<Receipt, ProviderError>;
}

/// Gateway that approves everything and mints sequential receipt codes.
#[derive(Debug, Default)]
pub struct InstantGateway {
    counter: u64,
}

impl InstantGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self) -> Receipt {
        self.counter += 1;
        Receipt {
            reference: format!("MP{:08}", self.counter),
        }
    }
}

impl PaymentProvider for InstantGateway {
    fn request_deposit(&mut self, _msisdn: &str, _amount: Shillings)
    -> Result<Receipt, ProviderError> {
        Ok(self.mint())
    }

    fn request_payout(
        &mut self,
        _recipient: &str,
        _amount: Shillings,
    ) -> Result<Receipt, ProviderError> {
        Ok(self.mint())
    }
}

/// Gateway with a scripted queue of outcomes for tests and demos. When the
/// queue runs dry it behaves like [`InstantGateway`].
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    outcomes: VecDeque<Result<(), ProviderError>>,
    counter: u64,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `n` approvals.
    pub fn approve_next(&mut self, n: usize) -> &mut Self {
        for _ in 0..n {
            self.outcomes.push_back(Ok(()));
        }
        self
    }

    /// Queue one failure.
    pub fn decline_next(&mut self, error: ProviderError) -> &mut Self {
        self.outcomes.push_back(Err(error));
        self
    }

    fn next_outcome(&mut self) -> Result<Receipt, ProviderError> {
        match self.outcomes.pop_front() {
            Some(Ok(())) | None => {
                self.counter += 1;
                Ok(Receipt {
                    reference: format!("MP{:08}", self.counter),
                })
            }
            Some(Err(error)) => Err(error),
        }
    }
}

impl PaymentProvider for ScriptedGateway {
    fn request_deposit(&mut self, _msisdn: &str, _amount: Shillings)
    -> Result<Receipt, ProviderError> {
        self.next_outcome()
    }

    fn request_payout(
        &mut self,
        _recipient: &str,
        _amount: Shillings,
    ) -> Result<Receipt, ProviderError> {
        self.next_outcome()
    }
}
