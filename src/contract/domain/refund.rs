//! Pending-refund mailbox entries.

use super::{Coins, ParticipantId, RefundId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A payout waiting in a recipient's mailbox.
///
/// Created whenever a payout cannot be delivered synchronously; deleted
/// only by explicit batch collection. Entries never expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundEntry {
    id: RefundId,
    recipient: ParticipantId,
    amount: Coins,
    reason: String,
    created_at: DateTime<Utc>,
}

/// Payload for inserting a refund entry; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRefundRecord {
    /// Participant owed the amount.
    pub recipient: ParticipantId,
    /// Amount owed.
    pub amount: Coins,
    /// Free-text reason shown on collection.
    pub reason: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl RefundEntry {
    /// Builds the entry for a freshly inserted record.
    #[must_use]
    pub fn from_new(id: RefundId, record: NewRefundRecord) -> Self {
        Self {
            id,
            recipient: record.recipient,
            amount: record.amount,
            reason: record.reason,
            created_at: record.created_at,
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(
        id: RefundId,
        recipient: ParticipantId,
        amount: Coins,
        reason: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            recipient,
            amount,
            reason,
            created_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> RefundId {
        self.id
    }

    /// Returns the participant owed the amount.
    #[must_use]
    pub const fn recipient(&self) -> ParticipantId {
        self.recipient
    }

    /// Returns the amount owed.
    #[must_use]
    pub const fn amount(&self) -> Coins {
        self.amount
    }

    /// Returns the free-text reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
