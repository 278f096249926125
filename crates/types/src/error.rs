//! Error codes shared across rigcert crates.
//!
//! The number engine itself never fails. Errors arise only in the layers
//! around it (form validation, configuration, issuance, storage); each of
//! their variants maps to an [`ErrorCode`] with a stable numeric identifier,
//! a retryability classification, and a suggested recovery action.

use core::fmt;

/// Machine-readable error codes.
///
/// | Range     | Domain     | Examples                                  |
/// |-----------|------------|-------------------------------------------|
/// | 1000–1099 | Input      | Invalid form, invalid configuration       |
/// | 2000–2099 | Issuance   | Duplicate number, QR encoding, sequence   |
/// | 3000–3099 | Storage    | Backend failure                           |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // --- Input errors (1000–1099) ---
    /// A certificate form field failed validation.
    InvalidForm = 1000,
    /// A configuration value is out of range.
    InvalidConfig = 1001,
    /// The public host does not form a usable verification URL.
    InvalidBaseUrl = 1002,

    // --- Issuance errors (2000–2099) ---
    /// A certificate with the generated number already exists.
    DuplicateCertificate = 2000,
    /// The QR encoder failed or returned something other than an image URI.
    QrEncoding = 2001,
    /// The sequential counter for the year no longer fits four digits.
    SequenceExhausted = 2002,

    // --- Storage errors (3000–3099) ---
    /// The certificate store failed.
    Storage = 3000,
}

impl ErrorCode {
    /// Returns the numeric code value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Converts a numeric code to an `ErrorCode`, returning `None` for unknown values.
    #[must_use]
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1000 => Some(Self::InvalidForm),
            1001 => Some(Self::InvalidConfig),
            1002 => Some(Self::InvalidBaseUrl),
            2000 => Some(Self::DuplicateCertificate),
            2001 => Some(Self::QrEncoding),
            2002 => Some(Self::SequenceExhausted),
            3000 => Some(Self::Storage),
            _ => None,
        }
    }

    /// Whether this error is retryable.
    ///
    /// A duplicate timestamp or hash-based number is retryable because the
    /// next attempt draws a fresh random suffix.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::DuplicateCertificate | Self::QrEncoding | Self::Storage)
    }

    /// Suggested recovery action for this error code.
    #[must_use]
    pub const fn suggested_action(self) -> &'static str {
        match self {
            Self::InvalidForm => "Correct the reported form field and resubmit.",
            Self::InvalidConfig => "Fix the reported configuration value and restart.",
            Self::InvalidBaseUrl => {
                "Set public_host to a bare host[:port] such as certs.example.com or localhost:3000."
            },
            Self::DuplicateCertificate => {
                "Retry issuance. Sequential numbering requires a unique counter per year."
            },
            Self::QrEncoding => "Retry issuance. Check the QR encoder if the failure persists.",
            Self::SequenceExhausted => {
                "The year has used all 9999 sequential numbers. Switch to the timestamp strategy."
            },
            Self::Storage => "Retry with backoff. Check the certificate store's availability.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}
