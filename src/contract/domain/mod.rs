//! Domain model for escrow-backed task contracts.
//!
//! The contract domain models the contract aggregate, its status state
//! machine, typed per-kind metadata, money values, refund mailbox
//! entries, and participant aggregates while keeping all infrastructure
//! concerns outside of the domain boundary.

mod contract;
mod error;
mod ids;
mod kind;
mod metadata;
mod money;
mod refund;
mod stats;
mod status;

pub use contract::{Contract, NewContractRecord, PersistedContractData};
pub use error::{ContractDomainError, ParseContractKindError, ParseContractStatusError};
pub use ids::{ContractId, Participant, ParticipantId, RefundId};
pub use kind::ContractKind;
pub use metadata::{ContractMetadata, XpMode};
pub use money::Coins;
pub use refund::{NewRefundRecord, RefundEntry};
pub use stats::ParticipantStats;
pub use status::ContractStatus;
