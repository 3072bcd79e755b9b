//! Outbound notification port.
//!
//! One method per lifecycle transition, carrying enough contract data
//! for message templating. Formatting and delivery are external
//! concerns; implementations must be fast and must not block the
//! coordinator.

use crate::contract::domain::{Coins, Contract, ParticipantId};

/// Sink for per-transition notifications.
pub trait BoardNotifier: Send + Sync {
    /// A contract was created and is open for workers.
    fn contract_created(&self, contract: &Contract);

    /// A worker accepted the contract.
    fn contract_accepted(&self, contract: &Contract);

    /// The contractor cancelled the contract; the net reward went to
    /// their mailbox.
    fn contract_cancelled(&self, contract: &Contract);

    /// The contract was fulfilled and the worker paid.
    fn contract_completed(&self, contract: &Contract);

    /// Tracking paused because the target became unreachable. Emitted
    /// once per transition, not per probe.
    fn contract_paused(&self, contract: &Contract);

    /// Tracking resumed because the target became reachable again.
    fn contract_resumed(&self, contract: &Contract);

    /// The contract lapsed; the net reward went to the contractor's
    /// mailbox.
    fn contract_expired(&self, contract: &Contract);

    /// Presentational refresh from a probe tick that changed nothing.
    fn tracking_refreshed(&self, worker: ParticipantId, contract: &Contract, reachable: bool);

    /// A recipient collected their pending refunds.
    fn refunds_collected(&self, recipient: ParticipantId, total: Coins, entries: usize);
}
