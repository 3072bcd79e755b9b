//! Service-level errors for contract board operations.

use crate::contract::domain::{Coins, ContractDomainError, ContractId, ContractKind};
use crate::contract::ports::{ContractStoreError, LedgerError};
use thiserror::Error;

/// Errors surfaced by the lifecycle engine and its collaborators.
///
/// Every variant except [`ContractBoardError::PersistenceFailure`]
/// leaves no state change behind; a failed create compensates by
/// reversing the escrow debit before returning.
#[derive(Debug, Error)]
pub enum ContractBoardError {
    /// The contract kind is disabled by configuration.
    #[error("contract kind {0} is disabled")]
    KindDisabled(ContractKind),

    /// The net reward lies outside the kind's configured bounds.
    #[error("reward {reward} outside allowed range [{min}, {max}]")]
    RewardOutOfRange {
        /// Rejected reward.
        reward: Coins,
        /// Smallest accepted reward.
        min: Coins,
        /// Largest accepted reward.
        max: Coins,
    },

    /// The contractor already holds their configured number of active
    /// contracts.
    #[error("active contract limit {limit} reached")]
    LimitReached {
        /// Configured per-contractor limit.
        limit: u32,
    },

    /// The metadata payload does not belong to the requested kind.
    #[error("metadata kind {actual} does not match contract kind {expected}")]
    MetadataMismatch {
        /// Kind requested at creation.
        expected: ContractKind,
        /// Kind of the rejected payload.
        actual: ContractKind,
    },

    /// The escrow ledger balance does not cover the debit.
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds {
        /// Amount the operation required.
        needed: Coins,
        /// Balance at the time of the check.
        available: Coins,
    },

    /// The escrow ledger could not be reached.
    #[error("escrow ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// No live contract with the given id.
    #[error("contract {0} not found")]
    NotFound(ContractId),

    /// The contract is no longer open for acceptance.
    #[error("contract {0} has already been taken")]
    AlreadyTaken(ContractId),

    /// A contractor attempted to work their own contract.
    #[error("cannot work your own contract")]
    SelfDealing,

    /// The acting participant is not the contract's contractor (or, on
    /// completion, not its worker).
    #[error("contract {0} belongs to another participant")]
    NotYours(ContractId),

    /// The contract kind does not support liveness tracking.
    #[error("contract {0} is not liveness-tracked")]
    NotTrackable(ContractId),

    /// The durable store rejected the operation.
    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] ContractStoreError),

    /// A domain invariant rejected the mutation.
    #[error(transparent)]
    Domain(#[from] ContractDomainError),
}

impl From<LedgerError> for ContractBoardError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds { needed, available } => {
                Self::InsufficientFunds { needed, available }
            }
            LedgerError::Unavailable(reason) => Self::LedgerUnavailable(reason),
        }
    }
}
