//! Error types for contract domain validation and parsing.

use super::{ContractId, ContractKind, ContractStatus};
use thiserror::Error;

/// Errors returned while mutating domain contract values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContractDomainError {
    /// The requested status change is not permitted by the state machine.
    #[error("contract {contract}: illegal transition {from} -> {to}")]
    InvalidTransition {
        /// Contract being mutated.
        contract: ContractId,
        /// Status before the attempted change.
        from: ContractStatus,
        /// Rejected target status.
        to: ContractStatus,
    },

    /// A contractor attempted to work their own contract.
    #[error("contract {0}: contractor cannot act as worker")]
    SelfDealing(ContractId),

    /// A status requiring a worker was reached without one, or a worker
    /// was present in a status that forbids it.
    #[error("contract {contract}: status {status} violates the worker-presence invariant")]
    WorkerInvariantViolated {
        /// Contract being mutated or reconstructed.
        contract: ContractId,
        /// Offending status.
        status: ContractStatus,
    },

    /// A metadata payload of the wrong kind was supplied.
    #[error("contract {contract}: metadata kind {actual} does not match contract kind {expected}")]
    MetadataKindMismatch {
        /// Contract being mutated.
        contract: ContractId,
        /// Kind fixed at creation.
        expected: ContractKind,
        /// Kind of the rejected payload.
        actual: ContractKind,
    },
}

/// Error returned while parsing contract statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown contract status: {0}")]
pub struct ParseContractStatusError(pub String);

/// Error returned while parsing contract kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown contract kind: {0}")]
pub struct ParseContractKindError(pub String);
