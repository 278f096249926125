//! Ready-made forms, certificates, and deterministic generators.
//!
//! Every fixture is pinned to [`fixed_instant`], 2025-11-20 14:30:22 UTC,
//! which encodes to the timestamp prefix `250B0K0E-0U0M`.

// Test utilities are expected to panic on failure - that's their purpose
#![allow(clippy::expect_used)]

use chrono::{DateTime, TimeZone, Utc};
use rand::{SeedableRng, rngs::StdRng};
use rigcert_types::{
    Certificate, CertificateForm, CertificateNumber, CertificateNumberGenerator, Clock, FixedClock,
};

/// Returns 2025-11-20 14:30:22 UTC.
///
/// # Panics
///
/// Never in practice; the literal date is valid.
#[must_use]
pub fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 20, 14, 30, 22).single().expect("valid fixture instant")
}

/// Returns a clock pinned to [`fixed_instant`].
#[must_use]
pub fn fixed_clock() -> FixedClock {
    FixedClock::new(fixed_instant())
}

/// Returns a generator reading [`fixed_instant`] with an RNG seeded by `seed`.
///
/// Equal seeds give equal sequences of numbers.
#[must_use]
pub fn fixed_generator(seed: u64) -> CertificateNumberGenerator<FixedClock> {
    seeded_generator(fixed_clock(), seed)
}

/// Returns a generator over `clock` with an RNG seeded by `seed`.
#[must_use]
pub fn seeded_generator<C: Clock>(clock: C, seed: u64) -> CertificateNumberGenerator<C> {
    CertificateNumberGenerator::new(clock, StdRng::seed_from_u64(seed))
}

/// Returns a form that passes validation.
///
/// # Panics
///
/// Never in practice; the literal dates are valid.
#[must_use]
pub fn sample_form() -> CertificateForm {
    CertificateForm::builder()
        .id_number("TX-48213")
        .trainee_name("Jane Doe")
        .course_name("Drilling Operations, Supervisor, Surface")
        .completion_date(fixed_instant())
        .expiration_date(
            Utc.with_ymd_and_hms(2027, 11, 20, 0, 0, 0).single().expect("valid fixture date"),
        )
        .training_provider("Eagle Well Control")
        .telephone("(281) 555-0134")
        .instructor_name("Sam Rivera")
        .build()
}

/// Returns a stored certificate with id `id` built from [`sample_form`].
///
/// The id is used verbatim and need not be a valid certificate number.
#[must_use]
pub fn sample_certificate(id: &str) -> Certificate {
    let number = CertificateNumber::new(id);
    Certificate {
        id: number.clone(),
        certificate_number: number,
        details: sample_form(),
        verification_url: format!("https://certs.example.test/search?id={id}"),
        qr_code_data_uri: None,
    }
}
