//! Escrow ledger port.
//!
//! The board consumes an external currency ledger; it never implements
//! balances itself. Only the lifecycle engine and the mailbox may call
//! these operations.

use crate::contract::domain::{Coins, ParticipantId};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// External currency ledger contract.
#[async_trait]
pub trait EscrowLedger: Send + Sync {
    /// Returns the participant's current balance.
    async fn balance(&self, participant: ParticipantId) -> LedgerResult<Coins>;

    /// Debits the participant.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientFunds`] when the balance does
    /// not cover `amount`; no partial debit occurs.
    async fn withdraw(&self, participant: ParticipantId, amount: Coins) -> LedgerResult<()>;

    /// Credits the participant.
    async fn deposit(&self, participant: ParticipantId, amount: Coins) -> LedgerResult<()>;
}

/// Errors returned by escrow ledger implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The balance does not cover the requested debit.
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds {
        /// Amount the operation required.
        needed: Coins,
        /// Balance at the time of the check.
        available: Coins,
    },

    /// The ledger backend could not be reached.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}
