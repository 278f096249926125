//! Test configuration helpers.
//!
//! Provides sensible default configurations for tests, centralizing
//! magic values that would otherwise be scattered across test modules.

// Test utilities are expected to panic on failure - that's their purpose
#![allow(clippy::expect_used)]

use rigcert_types::{
    Collection, StrategyKind,
    config::{GeneratorConfig, IssuanceConfig},
};

/// Public host used by test configurations.
pub const TEST_PUBLIC_HOST: &str = "certs.example.test";

/// Returns an issuance configuration suitable for tests.
///
/// - `public_host`: [`TEST_PUBLIC_HOST`] (an `https://` verification URL)
/// - `collection`: test
/// - `generator.strategy`: `strategy`
///
/// # Panics
///
/// Never in practice; the values always pass validation.
#[must_use]
pub fn test_issuance_config(strategy: StrategyKind) -> IssuanceConfig {
    IssuanceConfig::builder()
        .public_host(TEST_PUBLIC_HOST)
        .collection(Collection::Test)
        .generator(
            GeneratorConfig::builder().strategy(strategy).build().expect("valid generator config"),
        )
        .build()
        .expect("valid issuance config")
}
