//! Certificate number engine, record types, and configuration for rigcert.
//!
//! This crate provides the foundational pieces every other rigcert crate
//! builds on:
//! - Certificate number generation, validation, and parsing
//! - Certificate form and record types with form validation
//! - Issuance and generator configuration
//! - The shared error code catalog

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod generator;
pub mod number;
pub mod types;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::ErrorCode;
pub use generator::{
    CertificateNumberGenerator, Clock, FixedClock, Strategy, StrategyKind, SystemClock, WallClock,
};
pub use number::{
    CertificateNumber, ParsedCertificateNumber, Scheme, TimestampFields, is_valid, parse,
};
pub use types::{Certificate, CertificateForm, Collection};
