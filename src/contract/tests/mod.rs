//! Unit tests for the contract module.

mod domain_tests;
mod gateway_tests;
mod support;
mod tracker_tests;
