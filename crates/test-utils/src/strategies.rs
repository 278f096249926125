//! Proptest strategies for rigcert domain types.
//!
//! Reusable generators for property-based testing across crates. Strategies
//! produce well-formed values while exploring edge cases through random
//! variation.
//!
//! # Usage
//!
//! ```no_run
//! use proptest::prelude::*;
//! use rigcert_test_utils::strategies;
//!
//! proptest! {
//!     #[test]
//!     fn my_property(form in strategies::arb_form()) {
//!         // test invariant with a randomly generated valid form
//!     }
//! }
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rigcert_types::{CertificateForm, StrategyKind, WallClock};

/// 2000-01-01T00:00:00Z.
const FIRST_ENCODABLE_SECOND: i64 = 946_684_800;

/// 2100-01-01T00:00:00Z, exclusive.
const END_OF_ENCODABLE_RANGE: i64 = 4_102_444_800;

/// Generates an instant in 2000-2099, the range a two-digit year round-trips.
pub fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (FIRST_ENCODABLE_SECOND..END_OF_ENCODABLE_RANGE).prop_map(|secs| {
        Utc.timestamp_opt(secs, 0)
            .single()
            .unwrap_or_else(|| DateTime::<Utc>::from(std::time::UNIX_EPOCH))
    })
}

/// Generates a sequential counter that fits four digits, 1-9,999.
pub fn arb_counter() -> impl Strategy<Value = u32> {
    1u32..=9_999
}

/// Generates a four-digit issue year, 1,000-9,999.
pub fn arb_year() -> impl Strategy<Value = i32> {
    1_000i32..=9_999
}

/// Generates optional hash input: absent, empty, ASCII, or arbitrary Unicode.
pub fn arb_hash_input() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[A-Z]{2}-[0-9]{3,6}".prop_map(Some),
        ".{0,40}".prop_map(Some),
    ]
}

/// Generates a number strategy kind.
pub fn arb_strategy_kind() -> impl Strategy<Value = StrategyKind> {
    prop_oneof![
        Just(StrategyKind::Timestamp),
        Just(StrategyKind::Sequential),
        Just(StrategyKind::HashBased),
    ]
}

/// Generates a wall clock setting.
pub fn arb_wall_clock() -> impl Strategy<Value = WallClock> {
    prop_oneof![Just(WallClock::Utc), Just(WallClock::Local)]
}

/// Generates a candidate string close to, or exactly in, one of the number
/// shapes, mixed with arbitrary text.
pub fn arb_candidate() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9A-Z]{8}-[0-9A-Z]{6}",
        "[0-9]{8}-[0-9]{6}",
        "IADC-[0-9]{4}-[0-9]{4}",
        "[0-9A-F]{8}-[0-9A-Z]{6}",
        "[0-9A-Za-z]{7,9}-[0-9A-Za-z]{5,7}",
        ".{0,24}",
    ]
}

/// Generates a person's name of two capitalized words.
fn arb_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,11} [A-Z][a-z]{1,11}"
}

/// Generates a form that passes validation.
///
/// Optional fields are present about half the time; an expiration date,
/// when present, falls 1 to 3,650 days after completion.
pub fn arb_form() -> impl Strategy<Value = CertificateForm> {
    (
        "[A-Z]{2}-[0-9]{3,6}", // id_number
        arb_name(),            // trainee_name
        "[A-Z][a-z]{2,15}( [A-Z][a-z]{2,15}){0,3}", // course_name
        proptest::option::of("[A-Z][a-z]{2,15}"),   // supplement_name
        arb_instant(),
        proptest::option::of(1i64..=3_650), // days until expiration
        "[A-Z][a-z]{2,12} [A-Z][a-z]{2,12}", // training_provider
        proptest::option::of("[0-9]{3}-[0-9]{3}-[0-9]{4}"), // telephone
        arb_name(),                         // instructor_name
    )
        .prop_map(
            |(
                id_number,
                trainee_name,
                course_name,
                supplement_name,
                completion_date,
                expires_in_days,
                training_provider,
                telephone,
                instructor_name,
            )| CertificateForm {
                id_number,
                trainee_name,
                course_name,
                supplement_name,
                completion_date,
                expiration_date: expires_in_days.map(|days| completion_date + Duration::days(days)),
                training_provider,
                telephone,
                instructor_name,
            },
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::Datelike;
    use rigcert_types::validation::validate_certificate_form;

    use super::*;

    proptest! {
        #[test]
        fn prop_arb_instant_stays_in_two_digit_year_range(instant in arb_instant()) {
            prop_assert!((2000..=2099).contains(&instant.year()));
        }

        #[test]
        fn prop_arb_form_is_valid(form in arb_form()) {
            let result = validate_certificate_form(&form);
            prop_assert!(result.is_ok(), "{:?}", result);
        }
    }
}
