//! Storage port for contracts, refund mail, and participant stats.

use crate::contract::domain::{
    Contract, ContractId, NewContractRecord, NewRefundRecord, ParticipantId, ParticipantStats,
    RefundEntry,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for contract store operations.
pub type ContractStoreResult<T> = Result<T, ContractStoreError>;

/// Durable storage contract.
///
/// Implementations need not serialize calls themselves; the storage
/// gateway submits every operation through a single worker, so the
/// store never observes two operations concurrently.
#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Inserts a new contract and returns the live aggregate with its
    /// store-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ContractStoreError::Persistence`] when the insert
    /// fails; no row is visible afterwards.
    async fn insert_contract(&self, record: NewContractRecord) -> ContractStoreResult<Contract>;

    /// Persists status, worker, and metadata of an existing contract.
    ///
    /// # Errors
    ///
    /// Returns [`ContractStoreError::NotFound`] when the contract does
    /// not exist.
    async fn update_contract(&self, contract: &Contract) -> ContractStoreResult<()>;

    /// Loads every non-terminal contract, for cache hydration at
    /// startup.
    async fn load_active(&self) -> ContractStoreResult<Vec<Contract>>;

    /// Inserts a pending refund entry.
    async fn insert_refund(&self, record: NewRefundRecord) -> ContractStoreResult<RefundEntry>;

    /// Returns a recipient's pending refunds, oldest first.
    async fn refunds_for(&self, recipient: ParticipantId)
    -> ContractStoreResult<Vec<RefundEntry>>;

    /// Deletes every pending refund for a recipient.
    async fn delete_refunds_for(&self, recipient: ParticipantId) -> ContractStoreResult<()>;

    /// Inserts or replaces a participant's aggregate counters.
    async fn upsert_stats(&self, stats: &ParticipantStats) -> ContractStoreResult<()>;

    /// Returns a participant's aggregate counters, if recorded.
    async fn stats_for(
        &self,
        participant: ParticipantId,
    ) -> ContractStoreResult<Option<ParticipantStats>>;

    /// Returns the top spenders, highest first.
    async fn top_by_spent(&self, limit: u32) -> ContractStoreResult<Vec<ParticipantStats>>;

    /// Returns the top earners, highest first.
    async fn top_by_earned(&self, limit: u32) -> ContractStoreResult<Vec<ParticipantStats>>;
}

/// Errors returned by contract store implementations and the gateway.
#[derive(Debug, Clone, Error)]
pub enum ContractStoreError {
    /// The contract was not found.
    #[error("contract not found: {0}")]
    NotFound(ContractId),

    /// The storage gateway worker is no longer running.
    #[error("storage gateway is not running")]
    GatewayClosed,

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ContractStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
