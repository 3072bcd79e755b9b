//! Contract status state machine.

use super::ParseContractStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contract lifecycle status.
///
/// `Completed`, `Cancelled`, and `Expired` are terminal: a contract in
/// any of those states is removed from the live cache and survives only
/// as a durable historical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Posted, awaiting a worker.
    Open,
    /// A worker accepted; work in progress.
    Accepted,
    /// Tracking suspended while the designated target is unreachable.
    Paused,
    /// Work done, reward paid.
    Completed,
    /// Cancelled by the contractor.
    Cancelled,
    /// Passed its expiration timestamp.
    Expired,
}

impl ContractStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Accepted => "accepted",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    /// Returns `true` if this is a terminal status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired)
    }

    /// Returns `true` while the contract occupies the live cache.
    ///
    /// Paused counts as fully active: it holds a contractor-limit slot
    /// and remains eligible for cancellation and expiration.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Open | Self::Accepted | Self::Paused)
    }

    /// Returns `true` when the state machine permits moving to `to`.
    ///
    /// Pausing is defined only after acceptance; `Open` never pauses.
    /// Completion is reachable from both `Accepted` and `Paused` because
    /// the fulfilment signal may arrive while tracking is suspended.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Open, Self::Accepted | Self::Cancelled | Self::Expired)
                | (
                    Self::Accepted,
                    Self::Paused | Self::Completed | Self::Cancelled | Self::Expired,
                )
                | (
                    Self::Paused,
                    Self::Accepted | Self::Completed | Self::Cancelled | Self::Expired,
                )
        )
    }

    /// Returns `true` when a contract in status `self` must carry a
    /// worker, per the worker-presence invariant.
    #[must_use]
    pub const fn requires_worker(self) -> bool {
        matches!(self, Self::Accepted | Self::Paused | Self::Completed)
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for ContractStatus {
    type Error = ParseContractStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "accepted" => Ok(Self::Accepted),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            _ => Err(ParseContractStatusError(value.to_owned())),
        }
    }
}
