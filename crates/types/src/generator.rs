//! Certificate number generation.
//!
//! Produces numbers in one of three issuing schemes, selected by [`Strategy`]:
//!
//! ```text
//! timestamp    YYMMDDHH-MMSSXX   base-36 wall-clock fields + 2 random chars
//! sequential   IADC-YYYY-NNNN    caller-supplied counter, 4-digit padded
//! hash-based   HHHHHHHH-SSSSSS   32-bit rolling hash (hex) + 6-char random seed
//! ```
//!
//! # Timestamp Ordering
//!
//! Every timestamp field has a fixed width and base-36 digits sort in value
//! order (`0-9` before `A-Z`), so numbers generated at increasing seconds sort
//! lexicographically in the same order. The random suffix only breaks ties
//! within a second. Two numbers generated in the same second collide with
//! probability 1/1296.
//!
//! # Capabilities
//!
//! The generator never reads ambient state. The current moment comes from a
//! [`Clock`] and randomness from any [`rand::RngCore`], both supplied at
//! construction. Tests pin both with [`FixedClock`] and a seeded `StdRng`.
//!
//! # Thread Safety
//!
//! The random source sits behind a `parking_lot::Mutex`, locked only while
//! drawing characters. A generator can be shared across threads by reference.
//!
//! # Security Considerations
//!
//! Certificate numbers are designed for uniqueness and ordering, not secrecy.
//! The timestamp is predictable and the random suffix is short; do not use a
//! certificate number as a credential.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeZone, Timelike, Utc};
use parking_lot::Mutex;
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::number::{BASE36_ALPHABET, CertificateNumber, SEQUENTIAL_PREFIX, encode_base36};

/// Length of the random suffix appended to timestamp numbers.
const TIMESTAMP_SUFFIX_LEN: usize = 2;

/// Length of the random seed in hash-based numbers.
const HASH_SEED_LEN: usize = 6;

/// Input mixed into hash-based numbers when the caller supplies none.
const DEFAULT_HASH_INPUT: &str = "cert";

/// Source of the current moment.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Reads the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Creates a clock that always reports `instant`.
    #[must_use]
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Creates a clock frozen at the given UTC calendar moment.
    ///
    /// Returns `None` if the fields do not describe a real moment.
    #[must_use]
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, second).single().map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Time zone used to render the calendar fields of timestamp numbers.
///
/// Defaults to [`WallClock::Utc`], so a number does not depend on the
/// issuing host's zone setting. Numbers issued by a system that read
/// host-local fields decode to that host's local time; select
/// [`WallClock::Local`] to keep producing numbers in that convention.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum WallClock {
    /// Coordinated Universal Time.
    #[default]
    Utc,
    /// The host's local time zone.
    Local,
}

impl WallClock {
    /// Converts an instant to calendar fields in this zone.
    #[must_use]
    pub fn to_wall_time(self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::Utc => instant.naive_utc(),
            Self::Local => instant.with_timezone(&Local).naive_local(),
        }
    }
}

/// Which issuing scheme to generate, without its per-call inputs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Base-36 wall-clock fields with a random suffix.
    #[default]
    Timestamp,
    /// `IADC-YYYY-NNNN` from an external counter.
    Sequential,
    /// Rolling hash of caller data, time, and a random seed.
    HashBased,
}

/// A generation request: the scheme plus the inputs it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Strategy {
    /// `YYMMDDHH-MMSSXX`.
    #[default]
    Timestamp,
    /// `IADC-<year>-<counter:04>`.
    ///
    /// The caller guarantees the counter is unique within the year. Counters
    /// above 9999 produce five or more digits, which no scheme accepts.
    Sequential {
        /// Counter value.
        counter: u32,
        /// Issue year; the clock's current year when `None`.
        year: Option<i32>,
    },
    /// `HHHHHHHH-SSSSSS`.
    HashBased {
        /// Data mixed into the hash, e.g. a trainee identifier.
        data: Option<String>,
    },
}

impl Strategy {
    /// Returns the scheme this request generates.
    #[must_use]
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Timestamp => StrategyKind::Timestamp,
            Self::Sequential { .. } => StrategyKind::Sequential,
            Self::HashBased { .. } => StrategyKind::HashBased,
        }
    }
}

/// Generates certificate numbers from an injected clock and random source.
///
/// # Example
///
/// ```
/// # use rigcert_types::generator::{CertificateNumberGenerator, FixedClock};
/// # use rand::{SeedableRng, rngs::StdRng};
/// let clock = FixedClock::at(2025, 11, 20, 14, 30, 22).unwrap();
/// let generator = CertificateNumberGenerator::new(clock, StdRng::seed_from_u64(7));
///
/// let number = generator.generate_timestamp();
/// assert!(number.as_str().starts_with("250B0K0E-0U0M"));
/// assert!(number.is_valid());
///
/// assert_eq!(generator.generate_sequential(42, None).as_str(), "IADC-2025-0042");
/// ```
pub struct CertificateNumberGenerator<C = SystemClock, R = StdRng> {
    clock: C,
    rng: Mutex<R>,
    wall_clock: WallClock,
}

impl CertificateNumberGenerator {
    /// Creates a generator backed by the system clock and an OS-seeded RNG.
    #[must_use]
    pub fn system() -> Self {
        Self::new(SystemClock, StdRng::from_os_rng())
    }
}

impl<C: Clock, R: RngCore> CertificateNumberGenerator<C, R> {
    /// Creates a generator rendering timestamps in UTC.
    pub fn new(clock: C, rng: R) -> Self {
        Self { clock, rng: Mutex::new(rng), wall_clock: WallClock::Utc }
    }

    /// Sets the zone timestamp numbers are rendered in.
    #[must_use]
    pub fn with_wall_clock(mut self, wall_clock: WallClock) -> Self {
        self.wall_clock = wall_clock;
        self
    }

    /// Returns the zone timestamp numbers are rendered in.
    pub fn wall_clock(&self) -> WallClock {
        self.wall_clock
    }

    /// Returns the current calendar year in the configured zone.
    pub fn current_year(&self) -> i32 {
        self.wall_clock.to_wall_time(self.clock.now()).year()
    }

    /// Generates a number for `strategy`.
    pub fn generate(&self, strategy: &Strategy) -> CertificateNumber {
        match strategy {
            Strategy::Timestamp => self.generate_timestamp(),
            Strategy::Sequential { counter, year } => self.generate_sequential(*counter, *year),
            Strategy::HashBased { data } => self.generate_hash_based(data.as_deref()),
        }
    }

    /// Generates a `YYMMDDHH-MMSSXX` number from the current moment.
    pub fn generate_timestamp(&self) -> CertificateNumber {
        let now = self.wall_clock.to_wall_time(self.clock.now());
        let suffix = self.random_chars(TIMESTAMP_SUFFIX_LEN);
        CertificateNumber::new(format!(
            "{:02}{}{}{}-{}{}{}",
            now.year().rem_euclid(100),
            encode_base36(now.month(), 2),
            encode_base36(now.day(), 2),
            encode_base36(now.hour(), 2),
            encode_base36(now.minute(), 2),
            encode_base36(now.second(), 2),
            suffix,
        ))
    }

    /// Generates `IADC-<year>-<counter:04>`.
    pub fn generate_sequential(&self, counter: u32, year: Option<i32>) -> CertificateNumber {
        let year = year.unwrap_or_else(|| self.current_year());
        CertificateNumber::new(format!("{SEQUENTIAL_PREFIX}-{year}-{counter:04}"))
    }

    /// Generates a hash-based number mixing `data` with time and randomness.
    ///
    /// Absent or empty data hashes as `"cert"`.
    pub fn generate_hash_based(&self, data: Option<&str>) -> CertificateNumber {
        let millis = self.clock.now().timestamp_millis();
        let seed = self.random_chars(HASH_SEED_LEN).to_ascii_lowercase();
        let data = data.filter(|d| !d.is_empty()).unwrap_or(DEFAULT_HASH_INPUT);
        let hash = rolling_hash(&format!("{data}-{millis}-{seed}"));
        CertificateNumber::new(format!(
            "{:08X}-{:0>width$}",
            hash.unsigned_abs(),
            seed.to_ascii_uppercase(),
            width = HASH_SEED_LEN,
        ))
    }

    /// Draws `len` characters uniformly from `0-9A-Z`.
    fn random_chars(&self, len: usize) -> String {
        let mut rng = self.rng.lock();
        (0..len)
            .map(|_| char::from(BASE36_ALPHABET[rng.random_range(0..BASE36_ALPHABET.len())]))
            .collect()
    }
}

impl<C, R> std::fmt::Debug for CertificateNumberGenerator<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateNumberGenerator")
            .field("wall_clock", &self.wall_clock)
            .finish_non_exhaustive()
    }
}

/// 32-bit rolling hash: `h = h * 31 + unit` over UTF-16 code units, wrapping.
///
/// The multiply is computed as `(h << 5) - h`.
#[must_use]
pub fn rolling_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(i32::from(unit))
    })
}
