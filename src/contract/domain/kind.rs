//! The closed set of contract kinds offered by the board.

use super::ParseContractKindError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task kind of a contract.
///
/// Fulfilment mechanics live outside the engine; the kind only selects
/// the governing [`KindPolicy`](crate::config::KindPolicy) and the shape
/// of the metadata blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    /// Eliminate a designated target; liveness-tracked.
    BountyHunt,
    /// Gather and deliver a quantity of a named item.
    ItemGathering,
    /// Bank a quantity of experience points for the contractor.
    XpService,
}

impl ContractKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BountyHunt => "bounty_hunt",
            Self::ItemGathering => "item_gathering",
            Self::XpService => "xp_service",
        }
    }

    /// Returns `true` for the liveness-tracked variant.
    #[must_use]
    pub const fn is_liveness_tracked(self) -> bool {
        matches!(self, Self::BountyHunt)
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for ContractKind {
    type Error = ParseContractKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "bounty_hunt" => Ok(Self::BountyHunt),
            "item_gathering" => Ok(Self::ItemGathering),
            "xp_service" => Ok(Self::XpService),
            _ => Err(ParseContractKindError(value.to_owned())),
        }
    }
}
