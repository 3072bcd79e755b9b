//! SQLite adapter for the contract store, built on Diesel.

mod models;
mod pool;
mod schema;
mod store;

pub use store::SqliteContractStore;
