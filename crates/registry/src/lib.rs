//! Certificate issuance and lookup for rigcert.
//!
//! This crate wires the number engine in `rigcert-types` to storage:
//! - [`CertificateStore`]: the storage seam, with an in-memory implementation
//! - [`Issuer`]: validates a form, numbers it, and stores the certificate
//! - [`SvgQrEncoder`]: renders verification URLs as QR data URIs
//! - [`find_certificate`]: public lookup across the production and test
//!   collections

#![deny(unsafe_code)]

pub mod error;
pub mod issuance;
pub mod lookup;
pub mod qr;
pub mod store;

pub use error::{BoxError, RegistryError, StoreError};
pub use issuance::{Issuer, QrEncoder};
pub use lookup::{FoundCertificate, find_certificate};
pub use qr::SvgQrEncoder;
pub use store::{CertificateStore, InMemoryStore};
