//! Notifier adapter that discards every notification.

use crate::contract::domain::{Coins, Contract, ParticipantId};
use crate::contract::ports::BoardNotifier;

/// [`BoardNotifier`] that does nothing, for embedders without a
/// presentation layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl NoopNotifier {
    /// Creates the no-op notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl BoardNotifier for NoopNotifier {
    fn contract_created(&self, _contract: &Contract) {}

    fn contract_accepted(&self, _contract: &Contract) {}

    fn contract_cancelled(&self, _contract: &Contract) {}

    fn contract_completed(&self, _contract: &Contract) {}

    fn contract_paused(&self, _contract: &Contract) {}

    fn contract_resumed(&self, _contract: &Contract) {}

    fn contract_expired(&self, _contract: &Contract) {}

    fn tracking_refreshed(&self, _worker: ParticipantId, _contract: &Contract, _reachable: bool) {}

    fn refunds_collected(&self, _recipient: ParticipantId, _total: Coins, _entries: usize) {}
}
