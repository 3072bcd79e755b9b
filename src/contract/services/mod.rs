//! Orchestration services for the contract board.

mod board;
mod error;
mod gateway;
mod mailbox;
mod stats;
mod sweeper;
mod tracker;

pub use board::{BoardResult, ContractBoard};
pub use error::ContractBoardError;
pub use gateway::StorageGateway;
pub use mailbox::Mailbox;
pub use stats::StatsLedger;
pub use sweeper::ExpirationSweeper;
pub use tracker::LivenessTracker;
