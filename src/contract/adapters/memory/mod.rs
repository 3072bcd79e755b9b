//! In-memory adapters for tests and embedded use.

mod ledger;
mod notifier;
mod store;

pub use ledger::InMemoryLedger;
pub use notifier::NoopNotifier;
pub use store::InMemoryContractStore;
