//! Per-participant aggregate counters.

use super::{Coins, ParticipantId};
use serde::{Deserialize, Serialize};

/// Lifetime totals for one participant.
///
/// Owned by the stats ledger; the lifecycle engine only reports deltas
/// and never reads these back for decision-making.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStats {
    participant: ParticipantId,
    display_name: String,
    total_spent: Coins,
    total_earned: Coins,
    contracts_posted: u32,
    contracts_completed: u32,
}

impl ParticipantStats {
    /// Creates a zeroed record for a participant.
    #[must_use]
    pub fn new(participant: ParticipantId, display_name: impl Into<String>) -> Self {
        Self {
            participant,
            display_name: display_name.into(),
            total_spent: Coins::ZERO,
            total_earned: Coins::ZERO,
            contracts_posted: 0,
            contracts_completed: 0,
        }
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(
        participant: ParticipantId,
        display_name: String,
        total_spent: Coins,
        total_earned: Coins,
        contracts_posted: u32,
        contracts_completed: u32,
    ) -> Self {
        Self {
            participant,
            display_name,
            total_spent,
            total_earned,
            contracts_posted,
            contracts_completed,
        }
    }

    /// Returns the participant identity.
    #[must_use]
    pub const fn participant(&self) -> ParticipantId {
        self.participant
    }

    /// Returns the most recently seen display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the lifetime amount spent posting contracts (tax
    /// included).
    #[must_use]
    pub const fn total_spent(&self) -> Coins {
        self.total_spent
    }

    /// Returns the lifetime amount earned completing contracts.
    #[must_use]
    pub const fn total_earned(&self) -> Coins {
        self.total_earned
    }

    /// Returns the number of contracts posted.
    #[must_use]
    pub const fn contracts_posted(&self) -> u32 {
        self.contracts_posted
    }

    /// Returns the number of contracts completed as a worker.
    #[must_use]
    pub const fn contracts_completed(&self) -> u32 {
        self.contracts_completed
    }

    /// Records a posting: adds the full debit and bumps the posted count.
    pub fn record_spent(&mut self, amount: Coins) {
        self.total_spent += amount;
        self.contracts_posted = self.contracts_posted.saturating_add(1);
    }

    /// Records a completion payout: adds the credit and bumps the
    /// completed count.
    pub fn record_earned(&mut self, amount: Coins) {
        self.total_earned += amount;
        self.contracts_completed = self.contracts_completed.saturating_add(1);
    }

    /// Refreshes the display name captured from the latest interaction.
    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }
}
