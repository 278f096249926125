//! Error types for certificate storage and issuance.
//!
//! Each variant maps to an [`ErrorCode`] so callers can decide on retries
//! without matching on variants.

use rigcert_types::{
    ErrorCode, config::ConfigError, types::Collection, validation::ValidationError,
};
use snafu::{Location, Snafu};

/// Boxed error returned by capabilities plugged into the registry.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from a [`CertificateStore`](crate::store::CertificateStore).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    /// A certificate with this id already exists. Certificates are never
    /// overwritten.
    #[snafu(display("certificate {id} already exists in {collection}"))]
    AlreadyExists {
        /// Collection written to.
        collection: Collection,
        /// Conflicting certificate id.
        id: String,
    },

    /// The backend failed.
    #[snafu(display("certificate store failed: {message}"))]
    Backend {
        /// Error description.
        message: String,
    },
}

impl StoreError {
    /// Returns the machine-readable error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::AlreadyExists { .. } => ErrorCode::DuplicateCertificate,
            Self::Backend { .. } => ErrorCode::Storage,
        }
    }
}

/// Errors returned by [`Issuer`](crate::issuance::Issuer).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RegistryError {
    /// The submitted form failed validation.
    #[snafu(display("invalid certificate form: {source}"))]
    InvalidForm {
        /// The first violated constraint.
        source: ValidationError,
    },

    /// The issuance configuration is invalid.
    #[snafu(display("invalid issuance config: {source}"))]
    Config {
        /// Underlying configuration error.
        source: ConfigError,
    },

    /// The configured host does not form a valid verification URL.
    #[snafu(display("invalid verification base URL {base:?}: {source}"))]
    InvalidBaseUrl {
        /// Base URL that failed to parse.
        base: String,
        /// Parse failure.
        source: url::ParseError,
    },

    /// Every attempt produced a number that was already issued.
    #[snafu(display("certificate number {number} already issued after {attempts} attempts"))]
    Duplicate {
        /// Last number tried.
        number: String,
        /// Attempts made.
        attempts: u32,
    },

    /// The QR encoder failed or returned something other than an image URI.
    #[snafu(display("QR encoding failed at {location}: {message}"))]
    QrEncoding {
        /// Error description.
        message: String,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// The sequential counter for the year no longer fits four digits.
    #[snafu(display("sequential numbers for {year} exhausted at counter {counter}"))]
    SequenceExhausted {
        /// Issue year.
        year: i32,
        /// Counter allocated by the store.
        counter: u32,
    },

    /// The certificate store failed.
    #[snafu(display("storage error at {location}: {source}"))]
    Storage {
        /// Underlying store error.
        source: StoreError,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },
}

impl RegistryError {
    /// Returns the machine-readable error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidForm { .. } => ErrorCode::InvalidForm,
            Self::Config { .. } => ErrorCode::InvalidConfig,
            Self::InvalidBaseUrl { .. } => ErrorCode::InvalidBaseUrl,
            Self::Duplicate { .. } => ErrorCode::DuplicateCertificate,
            Self::QrEncoding { .. } => ErrorCode::QrEncoding,
            Self::SequenceExhausted { .. } => ErrorCode::SequenceExhausted,
            Self::Storage { source, .. } => source.code(),
        }
    }

    /// Whether this error is retryable.
    ///
    /// Delegates to [`ErrorCode::is_retryable`].
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    /// Suggested recovery action for this error.
    #[must_use]
    pub const fn suggested_action(&self) -> &'static str {
        self.code().suggested_action()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_codes() {
        let dup = StoreError::AlreadyExists {
            collection: Collection::Production,
            id: "IADC-2025-0001".to_string(),
        };
        assert_eq!(dup.code(), ErrorCode::DuplicateCertificate);
        assert_eq!(
            dup.to_string(),
            "certificate IADC-2025-0001 already exists in iadc_certificates"
        );

        let backend = StoreError::Backend { message: "disk full".to_string() };
        assert_eq!(backend.code(), ErrorCode::Storage);
    }

    #[test]
    fn test_storage_error_inherits_store_code() {
        let err = RegistryError::Storage {
            source: StoreError::Backend { message: "timeout".to_string() },
            location: Location::new("test.rs", 1, 1),
        };
        assert_eq!(err.code(), ErrorCode::Storage);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_form_is_not_retryable() {
        let err = RegistryError::InvalidForm {
            source: ValidationError {
                field: "traineeName".to_string(),
                constraint: "must be at least 2 characters, got 1".to_string(),
            },
        };
        assert_eq!(err.code(), ErrorCode::InvalidForm);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("traineeName"), "got: {err}");
    }

    #[test]
    fn test_sequence_exhausted_action() {
        let err = RegistryError::SequenceExhausted { year: 2025, counter: 10_000 };
        assert_eq!(err.code(), ErrorCode::SequenceExhausted);
        assert!(err.suggested_action().contains("timestamp"));
    }
}
