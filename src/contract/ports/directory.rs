//! Target reachability port for the liveness tracker.

use crate::contract::domain::ParticipantId;
use async_trait::async_trait;

/// Resolves whether a participant is currently reachable in the live
/// environment.
#[async_trait]
pub trait TargetDirectory: Send + Sync {
    /// Returns `true` when the participant can currently be reached.
    async fn is_reachable(&self, participant: ParticipantId) -> bool;
}
