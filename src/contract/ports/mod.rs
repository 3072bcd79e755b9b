//! Port contracts for infrastructure the contract board depends on.

mod directory;
mod ledger;
mod notifier;
mod store;

pub use directory::TargetDirectory;
pub use ledger::{EscrowLedger, LedgerError, LedgerResult};
pub use notifier::BoardNotifier;
pub use store::{ContractStore, ContractStoreError, ContractStoreResult};
