//! Thread-safe in-memory contract store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::contract::domain::{
    Contract, ContractId, NewContractRecord, NewRefundRecord, ParticipantId, ParticipantStats,
    RefundEntry, RefundId,
};
use crate::contract::ports::{ContractStore, ContractStoreError, ContractStoreResult};

/// In-memory [`ContractStore`] with monotonically assigned ids.
///
/// Rows survive terminal transitions just like a durable store: only
/// [`ContractStore::load_active`] filters to non-terminal status.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContractStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    contracts: HashMap<ContractId, Contract>,
    next_contract_id: i64,
    refunds: Vec<RefundEntry>,
    next_refund_id: i64,
    stats: HashMap<ParticipantId, ParticipantStats>,
}

impl InMemoryContractStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored row for a contract, terminal rows included.
    ///
    /// Test helper; production reads go through the live cache.
    #[must_use]
    pub fn stored_contract(&self, id: ContractId) -> Option<Contract> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.contracts.get(&id).cloned())
    }

    fn write_state(
        &self,
    ) -> ContractStoreResult<std::sync::RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|err| ContractStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn read_state(&self) -> ContractStoreResult<std::sync::RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|err| ContractStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

fn top_by<F>(state: &StoreState, limit: u32, key: F) -> Vec<ParticipantStats>
where
    F: Fn(&ParticipantStats) -> i64,
{
    let mut all: Vec<ParticipantStats> = state.stats.values().cloned().collect();
    all.sort_by_key(|stats| std::cmp::Reverse(key(stats)));
    all.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    all
}

#[async_trait]
impl ContractStore for InMemoryContractStore {
    async fn insert_contract(&self, record: NewContractRecord) -> ContractStoreResult<Contract> {
        let mut state = self.write_state()?;
        state.next_contract_id += 1;
        let id = ContractId::new(state.next_contract_id);
        let contract = Contract::from_new(id, record);
        state.contracts.insert(id, contract.clone());
        Ok(contract)
    }

    async fn update_contract(&self, contract: &Contract) -> ContractStoreResult<()> {
        let mut state = self.write_state()?;
        if !state.contracts.contains_key(&contract.id()) {
            return Err(ContractStoreError::NotFound(contract.id()));
        }
        state.contracts.insert(contract.id(), contract.clone());
        Ok(())
    }

    async fn load_active(&self) -> ContractStoreResult<Vec<Contract>> {
        let state = self.read_state()?;
        Ok(state
            .contracts
            .values()
            .filter(|contract| contract.is_active())
            .cloned()
            .collect())
    }

    async fn insert_refund(&self, record: NewRefundRecord) -> ContractStoreResult<RefundEntry> {
        let mut state = self.write_state()?;
        state.next_refund_id += 1;
        let entry = RefundEntry::from_new(RefundId::new(state.next_refund_id), record);
        state.refunds.push(entry.clone());
        Ok(entry)
    }

    async fn refunds_for(
        &self,
        recipient: ParticipantId,
    ) -> ContractStoreResult<Vec<RefundEntry>> {
        let state = self.read_state()?;
        let mut entries: Vec<RefundEntry> = state
            .refunds
            .iter()
            .filter(|entry| entry.recipient() == recipient)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| (entry.created_at(), entry.id()));
        Ok(entries)
    }

    async fn delete_refunds_for(&self, recipient: ParticipantId) -> ContractStoreResult<()> {
        let mut state = self.write_state()?;
        state.refunds.retain(|entry| entry.recipient() != recipient);
        Ok(())
    }

    async fn upsert_stats(&self, stats: &ParticipantStats) -> ContractStoreResult<()> {
        let mut state = self.write_state()?;
        state.stats.insert(stats.participant(), stats.clone());
        Ok(())
    }

    async fn stats_for(
        &self,
        participant: ParticipantId,
    ) -> ContractStoreResult<Option<ParticipantStats>> {
        let state = self.read_state()?;
        Ok(state.stats.get(&participant).cloned())
    }

    async fn top_by_spent(&self, limit: u32) -> ContractStoreResult<Vec<ParticipantStats>> {
        let state = self.read_state()?;
        Ok(top_by(&state, limit, |stats| stats.total_spent().amount()))
    }

    async fn top_by_earned(&self, limit: u32) -> ContractStoreResult<Vec<ParticipantStats>> {
        let state = self.read_state()?;
        Ok(top_by(&state, limit, |stats| stats.total_earned().amount()))
    }
}
