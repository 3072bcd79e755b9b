//! Contract Board: an escrow-backed marketplace of time-bounded task
//! contracts between participants sharing a live environment.
//!
//! A contractor posts a task with a reward; a worker accepts and fulfils
//! it; payment, taxation, and refunds flow through an escrow model.
//! Contracts expire on a schedule, and the liveness-tracked variant
//! pauses and resumes with the reachability of its designated target.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure lifecycle and economics logic with no
//!   infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage, the escrow
//!   ledger, notifications, and target reachability
//! - **Adapters**: Concrete implementations of ports (in-memory, SQLite)
//! - **Services**: The lifecycle engine, the serialized persistence
//!   gateway, the expiration sweeper, the liveness tracker, the refund
//!   mailbox, and the stats ledger
//!
//! # Modules
//!
//! - [`contract`]: Contract lifecycle engine and its collaborators
//! - [`config`]: Typed board configuration

pub mod config;
pub mod contract;
