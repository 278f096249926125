//! Shared test utilities for rigcert crates.
//!
//! This crate provides common test helpers to reduce boilerplate across test modules:
//!
//! - [`ManualClock`] - A clock tests advance by hand
//! - [`fixed_generator`] / [`seeded_generator`] - Deterministic number generators
//! - [`sample_form`] / [`sample_certificate`] - Valid fixture records
//! - [`test_issuance_config`] - Default issuance configuration for tests
//! - [`TestDir`] - Managed temporary directory with file helpers
//! - [`strategies`] - Proptest strategies for domain types

#![deny(unsafe_code)]
// Test utilities are allowed to use unwrap for simplicity
#![cfg_attr(test, allow(clippy::disallowed_methods))]

mod clock;
pub use clock::ManualClock;

mod fixtures;
pub use fixtures::{
    fixed_clock, fixed_generator, fixed_instant, sample_certificate, sample_form, seeded_generator,
};

mod config;
pub use config::{TEST_PUBLIC_HOST, test_issuance_config};

mod test_dir;
pub use test_dir::TestDir;

pub mod strategies;
