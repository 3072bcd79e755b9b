//! Participant statistics ledger.
//!
//! Keeps an in-memory tally of spend and earnings per participant and
//! mirrors every change to the store through the gateway. Leaderboard
//! queries go straight to the store so they see persisted totals.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::contract::domain::{Coins, Participant, ParticipantId, ParticipantStats};
use crate::contract::ports::ContractStoreResult;
use crate::contract::services::StorageGateway;

/// Aggregated spend and earnings tracking for leaderboards.
pub struct StatsLedger {
    gateway: Arc<StorageGateway>,
    cache: RwLock<HashMap<ParticipantId, ParticipantStats>>,
}

impl StatsLedger {
    /// Creates an empty ledger backed by the given gateway.
    #[must_use]
    pub fn new(gateway: Arc<StorageGateway>) -> Self {
        Self {
            gateway,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn with_entry(
        &self,
        participant: &Participant,
        apply: impl FnOnce(&mut ParticipantStats),
    ) -> ParticipantStats {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let entry = cache.entry(participant.id()).or_insert_with(|| {
            ParticipantStats::new(participant.id(), participant.display_name())
        });
        entry.set_display_name(participant.display_name());
        apply(entry);
        entry.clone()
    }

    /// Records an escrow debit, bumping the posted-contract count.
    pub fn record_spent(&self, participant: &Participant, amount: Coins) {
        let snapshot = self.with_entry(participant, |stats| stats.record_spent(amount));
        self.gateway.upsert_stats(&snapshot);
    }

    /// Records a payout, bumping the completed-contract count.
    pub fn record_earned(&self, participant: &Participant, amount: Coins) {
        let snapshot = self.with_entry(participant, |stats| stats.record_earned(amount));
        self.gateway.upsert_stats(&snapshot);
    }

    /// Returns a participant's statistics, consulting the cache first
    /// and falling back to the store.
    ///
    /// # Errors
    ///
    /// Returns the store error when the fallback read fails.
    pub async fn stats_for(
        &self,
        participant: ParticipantId,
    ) -> ContractStoreResult<Option<ParticipantStats>> {
        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&participant)
            .cloned();
        if cached.is_some() {
            return Ok(cached);
        }

        let loaded = self.gateway.stats_for(participant).await?;
        if let Some(stats) = &loaded {
            self.cache
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(participant, stats.clone());
        }
        Ok(loaded)
    }

    /// Returns the top spenders, highest total spent first.
    ///
    /// # Errors
    ///
    /// Returns the store error when the query fails.
    pub async fn top_by_spent(&self, limit: u32) -> ContractStoreResult<Vec<ParticipantStats>> {
        self.gateway.top_by_spent(limit).await
    }

    /// Returns the top earners, highest total earned first.
    ///
    /// # Errors
    ///
    /// Returns the store error when the query fails.
    pub async fn top_by_earned(&self, limit: u32) -> ContractStoreResult<Vec<ParticipantStats>> {
        self.gateway.top_by_earned(limit).await
    }
}
