//! Typed per-kind contract metadata.
//!
//! Each contract carries a metadata blob whose shape is fixed by its
//! kind. The blob is the only contract field a fulfilment collaborator
//! may rewrite, used to record progress or submission.

use super::{ContractKind, Participant, ParticipantId};
use serde::{Deserialize, Serialize};

/// How an XP-service contract is fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpMode {
    /// The worker drains banked experience in one transfer.
    InstantDrain,
    /// The worker accumulates experience over a grind session.
    Grind,
}

/// Kind-specific contract payload, serialized as tagged JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContractMetadata {
    /// Bounty on a designated target.
    BountyHunt {
        /// The participant whose reachability drives pause/resume and
        /// whose elimination fulfils the contract.
        target: Participant,
        /// Whether the contractor's identity is hidden from the target.
        anonymous: bool,
    },
    /// Item delivery task.
    ItemGathering {
        /// Canonical name of the requested item.
        material: String,
        /// Quantity requested.
        amount: u32,
        /// Set by the fulfilment collaborator once delivery is recorded.
        submitted: bool,
    },
    /// Experience banking task.
    XpService {
        /// Experience points requested.
        points: u32,
        /// Fulfilment mode.
        mode: XpMode,
    },
}

impl ContractMetadata {
    /// Returns the contract kind this payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> ContractKind {
        match self {
            Self::BountyHunt { .. } => ContractKind::BountyHunt,
            Self::ItemGathering { .. } => ContractKind::ItemGathering,
            Self::XpService { .. } => ContractKind::XpService,
        }
    }

    /// Returns the tracked target when this is a bounty payload.
    #[must_use]
    pub const fn bounty_target(&self) -> Option<&Participant> {
        match self {
            Self::BountyHunt { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Returns the tracked target's identity when this is a bounty
    /// payload.
    #[must_use]
    pub const fn bounty_target_id(&self) -> Option<ParticipantId> {
        match self.bounty_target() {
            Some(target) => Some(target.id()),
            None => None,
        }
    }
}
