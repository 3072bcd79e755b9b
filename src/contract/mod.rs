//! Contract lifecycle management for the board.
//!
//! Implements the full lifecycle of escrow-backed task contracts:
//! creation with tax escrow, acceptance, cancellation with refund,
//! completion with payout, timed expiration, and liveness-driven
//! pause/resume for tracked contracts. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
