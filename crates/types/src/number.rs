//! Certificate number schemes: shape validation and field decoding.
//!
//! Four schemes are recognized. Only the first three are ever decoded:
//!
//! ```text
//! alphanumeric timestamp   YYMMDDHH-MMSSXX   250B0K0E-0U0M7Q   (base 36, XX random)
//! legacy numeric timestamp YYYYMMDD-HHMMSS   20251120-143022   (decimal)
//! sequential               IADC-YYYY-NNNN    IADC-2025-0042
//! hash-based               8HEX-6ALNUM       1F3A09BC-K2Q9ZD
//! ```
//!
//! # Overlapping shapes
//!
//! The character classes overlap: every legacy numeric value and every
//! hash-based value also has the alphanumeric-timestamp shape. [`is_valid`]
//! does not care which scheme matched. [`parse`] tries the decodable schemes
//! in a fixed order and only accepts a timestamp decode whose fields form a
//! real calendar moment, so `20251120-143022` falls through the base-36
//! reading (month `25` is 77) and decodes as a legacy numeric timestamp.
//! A value whose issuer used a different scheme can still decode as a
//! timestamp by coincidence; the decode reports shape, not provenance.
//!
//! Legacy values from 2000-2009 are the common case of this. Their base-36
//! reading has a month of `0`-`9` and often a real calendar moment, so
//! `20010305-101500` decodes as the alphanumeric timestamp
//! 2020-01-03 05:36:41 rather than the legacy 2001-03-05 10:15:00. Callers
//! that know a value is legacy should decode it with the legacy scheme in
//! mind instead of relying on [`parse`] precedence.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Digits of the base-36 alphabet, in value order.
pub(crate) const BASE36_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Literal prefix of sequential certificate numbers.
pub const SEQUENTIAL_PREFIX: &str = "IADC";

/// Century added to the two-digit year of alphanumeric timestamps.
const CENTURY: i32 = 2000;

/// A certificate number as issued and stored.
///
/// The wrapper does not enforce a shape: lookups accept arbitrary
/// caller-supplied strings, and an unrecognized value is simply "not found".
/// Use [`CertificateNumber::is_valid`] to check the shape.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct CertificateNumber(String);

impl CertificateNumber {
    /// Wraps a raw string without validating it.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the textual value.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper, returning the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns `true` if the value has the shape of any recognized scheme.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_valid(&self.0)
    }

    /// Decodes the value. See [`parse`].
    #[must_use]
    pub fn parse(&self) -> ParsedCertificateNumber {
        parse(&self.0)
    }
}

impl fmt::Display for CertificateNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CertificateNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for CertificateNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CertificateNumber {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<CertificateNumber> for String {
    fn from(number: CertificateNumber) -> Self {
        number.0
    }
}

/// A recognized certificate number scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Scheme {
    /// `[0-9A-Z]{8}-[0-9A-Z]{6}`, produced by the timestamp strategy.
    AlphanumericTimestamp,
    /// `\d{8}-\d{6}`, no longer generated but still accepted.
    NumericTimestamp,
    /// `IADC-\d{4}-\d{4}`, produced by the sequential strategy.
    Sequential,
    /// `[0-9A-F]{8}-[0-9A-F]{6}`.
    HashBased,
}

impl Scheme {
    /// All schemes, in parse precedence order (hash-based last, never decoded).
    pub const ALL: [Scheme; 4] =
        [Self::AlphanumericTimestamp, Self::NumericTimestamp, Self::Sequential, Self::HashBased];

    /// Returns `true` if `candidate` has exactly this scheme's shape.
    #[must_use]
    pub fn matches(self, candidate: &str) -> bool {
        match self {
            Self::AlphanumericTimestamp => grouped(candidate, 8, 6, is_base36_char),
            Self::NumericTimestamp => grouped(candidate, 8, 6, is_decimal_char),
            Self::Sequential => sequential_body(candidate)
                .is_some_and(|body| grouped(body, 4, 4, is_decimal_char)),
            Self::HashBased => grouped(candidate, 8, 6, is_hex_char),
        }
    }

    /// Returns the kebab-case name used in parsed output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlphanumericTimestamp => "alphanumeric-timestamp",
            Self::NumericTimestamp => "numeric-timestamp",
            Self::Sequential => "sequential",
            Self::HashBased => "hash-based",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns `true` if `candidate` matches the shape of at least one scheme.
///
/// Validation is a pure shape check; it never fails and does not report
/// which scheme matched.
#[must_use]
pub fn is_valid(candidate: &str) -> bool {
    Scheme::ALL.iter().any(|scheme| scheme.matches(candidate))
}

/// Calendar fields decoded from a timestamp-scheme certificate number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimestampFields {
    /// Full year (e.g. 2025).
    pub year: i32,
    /// Month, 1-12.
    pub month: u32,
    /// Day of month, 1-31.
    pub day: u32,
    /// Hour, 0-23.
    pub hours: u32,
    /// Minute, 0-59.
    pub minutes: u32,
    /// Second, 0-59.
    pub seconds: u32,
    /// The wall-clock moment the fields describe, without a time zone.
    #[schemars(with = "String")]
    pub date: NaiveDateTime,
}

impl TimestampFields {
    /// Builds the fields if they describe a real calendar moment.
    fn new(year: i32, month: u32, day: u32, hours: u32, minutes: u32, seconds: u32) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hours, minutes, seconds)?;
        Some(Self { year, month, day, hours, minutes, seconds, date })
    }
}

/// Structured decode of a certificate number.
///
/// Serializes with a kebab-case `type` tag, e.g.
/// `{"type":"sequential","year":2025,"sequence":1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ParsedCertificateNumber {
    /// Decoded from the base-36 timestamp scheme. The random suffix is dropped.
    AlphanumericTimestamp(TimestampFields),
    /// Decoded from the legacy decimal timestamp scheme.
    NumericTimestamp(TimestampFields),
    /// Decoded from the `IADC-YYYY-NNNN` scheme.
    Sequential {
        /// Issue year.
        year: i32,
        /// Counter value within the year.
        sequence: u32,
    },
    /// No decodable scheme matched. The hash-based scheme is never decoded.
    Unknown {
        /// The input, unchanged.
        original: String,
    },
}

impl ParsedCertificateNumber {
    /// Returns the scheme that produced this decode, or `None` for unknown.
    #[must_use]
    pub fn scheme(&self) -> Option<Scheme> {
        match self {
            Self::AlphanumericTimestamp(_) => Some(Scheme::AlphanumericTimestamp),
            Self::NumericTimestamp(_) => Some(Scheme::NumericTimestamp),
            Self::Sequential { .. } => Some(Scheme::Sequential),
            Self::Unknown { .. } => None,
        }
    }

    /// Returns the decoded moment for timestamp schemes.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDateTime> {
        match self {
            Self::AlphanumericTimestamp(fields) | Self::NumericTimestamp(fields) => {
                Some(fields.date)
            },
            Self::Sequential { .. } | Self::Unknown { .. } => None,
        }
    }

    /// Returns `true` if nothing could be decoded.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }
}

/// Decodes a certificate number into its encoded fields.
///
/// Tries the alphanumeric timestamp, legacy numeric timestamp, and sequential
/// schemes in that order and returns the first successful decode. Anything
/// else yields [`ParsedCertificateNumber::Unknown`]; the hash-based scheme is
/// never attempted. Never fails.
#[must_use]
pub fn parse(candidate: &str) -> ParsedCertificateNumber {
    if let Some(fields) = decode_alphanumeric_timestamp(candidate) {
        return ParsedCertificateNumber::AlphanumericTimestamp(fields);
    }
    if let Some(fields) = decode_numeric_timestamp(candidate) {
        return ParsedCertificateNumber::NumericTimestamp(fields);
    }
    if let Some((year, sequence)) = decode_sequential(candidate) {
        return ParsedCertificateNumber::Sequential { year, sequence };
    }
    ParsedCertificateNumber::Unknown { original: candidate.to_string() }
}

fn decode_alphanumeric_timestamp(candidate: &str) -> Option<TimestampFields> {
    if !Scheme::AlphanumericTimestamp.matches(candidate) {
        return None;
    }
    let (head, tail) = candidate.split_once('-')?;
    let year = CENTURY + i32::try_from(decimal(&head[0..2])?).ok()?;
    let month = base36(&head[2..4])?;
    let day = base36(&head[4..6])?;
    let hours = base36(&head[6..8])?;
    let minutes = base36(&tail[0..2])?;
    // Seconds and the random suffix share the last segment; only the
    // first two characters are seconds.
    let seconds = base36(&tail[2..4])?;
    TimestampFields::new(year, month, day, hours, minutes, seconds)
}

fn decode_numeric_timestamp(candidate: &str) -> Option<TimestampFields> {
    if !Scheme::NumericTimestamp.matches(candidate) {
        return None;
    }
    let (head, tail) = candidate.split_once('-')?;
    let year = i32::try_from(decimal(&head[0..4])?).ok()?;
    TimestampFields::new(
        year,
        decimal(&head[4..6])?,
        decimal(&head[6..8])?,
        decimal(&tail[0..2])?,
        decimal(&tail[2..4])?,
        decimal(&tail[4..6])?,
    )
}

fn decode_sequential(candidate: &str) -> Option<(i32, u32)> {
    if !Scheme::Sequential.matches(candidate) {
        return None;
    }
    let (year, sequence) = sequential_body(candidate)?.split_once('-')?;
    Some((i32::try_from(decimal(year)?).ok()?, decimal(sequence)?))
}

/// Encodes `value` in upper-case base 36, left-padded with `0` to `width`.
///
/// Values wider than `width` are not truncated.
pub(crate) fn encode_base36(mut value: u32, width: usize) -> String {
    let mut digits = Vec::with_capacity(width.max(2));
    loop {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
        if value == 0 {
            break;
        }
    }
    while digits.len() < width {
        digits.push(b'0');
    }
    digits.iter().rev().map(|&b| char::from(b)).collect()
}

/// Returns the `YYYY-NNNN` part of an `IADC-YYYY-NNNN` candidate.
fn sequential_body(candidate: &str) -> Option<&str> {
    candidate.strip_prefix(SEQUENTIAL_PREFIX)?.strip_prefix('-')
}

/// Checks a `head-tail` shape where both groups use one character class.
fn grouped(candidate: &str, head_len: usize, tail_len: usize, class: fn(u8) -> bool) -> bool {
    match candidate.split_once('-') {
        Some((head, tail)) => {
            head.len() == head_len
                && tail.len() == tail_len
                && head.bytes().all(class)
                && tail.bytes().all(class)
        },
        None => false,
    }
}

fn base36(field: &str) -> Option<u32> {
    u32::from_str_radix(field, 36).ok()
}

fn decimal(field: &str) -> Option<u32> {
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

fn is_base36_char(b: u8) -> bool {
    b.is_ascii_digit() || b.is_ascii_uppercase()
}

fn is_decimal_char(b: u8) -> bool {
    b.is_ascii_digit()
}

fn is_hex_char(b: u8) -> bool {
    b.is_ascii_digit() || (b'A'..=b'F').contains(&b)
}
