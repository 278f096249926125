//! End-to-end issuance tests: form in, stored certificate out.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rigcert_registry::{
    BoxError, CertificateStore, InMemoryStore, Issuer, RegistryError, StoreError,
    find_certificate,
};
use rigcert_test_utils::{
    ManualClock, fixed_generator, fixed_instant, sample_certificate, sample_form,
    seeded_generator, strategies, test_issuance_config,
};
use rigcert_types::{
    Certificate, Collection, ErrorCode, FixedClock, ParsedCertificateNumber, Scheme,
    StrategyKind, is_valid,
};

fn issuer(strategy: StrategyKind) -> Issuer<InMemoryStore, FixedClock> {
    Issuer::new(InMemoryStore::new(), fixed_generator(11), test_issuance_config(strategy)).unwrap()
}

fn png_encoder(url: &str) -> Result<String, BoxError> {
    Ok(format!("data:image/png;base64,{}", url.len()))
}

// =========================================================================
// Strategies
// =========================================================================

#[test]
fn test_issue_timestamp_certificate() {
    let issuer = issuer(StrategyKind::Timestamp);
    let certificate = issuer.issue(sample_form()).unwrap();

    let number = certificate.certificate_number.as_str();
    assert_eq!(certificate.id, certificate.certificate_number);
    assert!(number.starts_with("250B0K0E-0U0M"), "got {number}");
    assert!(Scheme::AlphanumericTimestamp.matches(number));
    assert_eq!(
        certificate.verification_url,
        format!("https://certs.example.test/search?id={number}")
    );
    assert_eq!(certificate.details, sample_form());
    assert!(certificate.qr_code_data_uri.is_none());
}

#[test]
fn test_issue_sequential_allocates_counters() {
    let issuer = issuer(StrategyKind::Sequential);
    let first = issuer.issue(sample_form()).unwrap();
    let second = issuer.issue(sample_form()).unwrap();

    assert_eq!(first.certificate_number.as_str(), "IADC-2025-0001");
    assert_eq!(second.certificate_number.as_str(), "IADC-2025-0002");
    assert_eq!(
        second.certificate_number.parse(),
        ParsedCertificateNumber::Sequential { year: 2025, sequence: 2 }
    );
}

#[test]
fn test_issue_sequential_year_follows_clock() {
    let new_years_eve = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
    let clock = Arc::new(ManualClock::new(new_years_eve));
    let issuer = Issuer::new(
        InMemoryStore::new(),
        seeded_generator(Arc::clone(&clock), 3),
        test_issuance_config(StrategyKind::Sequential),
    )
    .unwrap();

    let last_of_2025 = issuer.issue(sample_form()).unwrap();
    assert_eq!(last_of_2025.certificate_number.as_str(), "IADC-2025-0001");

    clock.advance(Duration::seconds(1));
    let first_of_2026 = issuer.issue(sample_form()).unwrap();
    assert_eq!(first_of_2026.certificate_number.as_str(), "IADC-2026-0001");
}

#[test]
fn test_issue_hash_based_certificate() {
    let issuer = issuer(StrategyKind::HashBased);
    let certificate = issuer.issue(sample_form()).unwrap();
    let number = certificate.certificate_number.as_str();
    assert!(is_valid(number), "got {number}");
    assert_eq!(number.len(), 15);
    let (hash, seed) = number.split_once('-').expect("dash separator");
    assert!(hash.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)), "got {number}");
    assert!(seed.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()), "got {number}");
}

// =========================================================================
// Failure paths
// =========================================================================

#[test]
fn test_invalid_form_consumes_no_sequence() {
    let issuer = issuer(StrategyKind::Sequential);
    let mut form = sample_form();
    form.expiration_date = Some(form.completion_date - Duration::days(1));

    let err = issuer.issue(form).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidForm);
    assert!(issuer.store().is_empty(Collection::Test));

    let certificate = issuer.issue(sample_form()).unwrap();
    assert_eq!(certificate.certificate_number.as_str(), "IADC-2025-0001");
}

#[test]
fn test_sequence_exhausted_after_9999() {
    let store = InMemoryStore::new();
    for _ in 0..9_999 {
        store.next_sequence(2025).unwrap();
    }
    let issuer =
        Issuer::new(store, fixed_generator(1), test_issuance_config(StrategyKind::Sequential))
            .unwrap();

    let err = issuer.issue(sample_form()).unwrap_err();
    assert!(
        matches!(err, RegistryError::SequenceExhausted { year: 2025, counter: 10_000 }),
        "got: {err:?}"
    );
    assert!(!err.is_retryable());
}

#[test]
fn test_duplicate_sequential_number_is_skipped() {
    let store = InMemoryStore::new();
    store.insert(Collection::Test, sample_certificate("IADC-2025-0001")).unwrap();
    let issuer =
        Issuer::new(store, fixed_generator(1), test_issuance_config(StrategyKind::Sequential))
            .unwrap();

    let certificate = issuer.issue(sample_form()).unwrap();
    assert_eq!(certificate.certificate_number.as_str(), "IADC-2025-0002");
}

#[test]
fn test_duplicate_reported_after_max_attempts() {
    // A twin generator with the same seed and clock predicts every number
    // the issuer will try.
    let twin = fixed_generator(5);
    let store = InMemoryStore::new();
    for _ in 0..rigcert_registry::issuance::MAX_ISSUE_ATTEMPTS {
        let number = twin.generate_timestamp();
        // The twin may repeat itself; one stored copy is enough.
        store.insert(Collection::Test, sample_certificate(number.as_str())).ok();
    }
    let issuer =
        Issuer::new(store, fixed_generator(5), test_issuance_config(StrategyKind::Timestamp))
            .unwrap();

    let err = issuer.issue(sample_form()).unwrap_err();
    assert!(matches!(err, RegistryError::Duplicate { attempts: 3, .. }), "got: {err:?}");
    assert!(err.is_retryable());
}

#[test]
fn test_qr_encoder_output_is_stored() {
    let issuer = issuer(StrategyKind::Timestamp).with_qr_encoder(png_encoder);
    let certificate = issuer.issue(sample_form()).unwrap();
    assert!(certificate.qr_code_data_uri.as_deref().unwrap().starts_with("data:image/png"));

    let stored =
        issuer.store().get(Collection::Test, certificate.key()).unwrap().expect("stored");
    assert_eq!(stored, certificate);
}

#[test]
fn test_qr_encoder_non_image_uri_is_rejected() {
    let issuer = issuer(StrategyKind::Timestamp)
        .with_qr_encoder(|_: &str| -> Result<String, BoxError> { Ok("<svg/>".to_string()) });
    let err = issuer.issue(sample_form()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::QrEncoding);
    assert!(issuer.store().is_empty(Collection::Test), "nothing stored on QR failure");
}

#[test]
fn test_qr_encoder_failure_is_reported() {
    let issuer = issuer(StrategyKind::Timestamp)
        .with_qr_encoder(|_: &str| -> Result<String, BoxError> { Err("encoder offline".into()) });
    let err = issuer.issue(sample_form()).unwrap_err();
    assert!(err.to_string().contains("encoder offline"), "got: {err}");
}

/// A store whose writes always fail.
struct ReadOnlyStore;

impl CertificateStore for ReadOnlyStore {
    fn insert(&self, _: Collection, _: Certificate) -> Result<(), StoreError> {
        Err(StoreError::Backend { message: "read-only replica".to_string() })
    }

    fn get(&self, _: Collection, _: &str) -> Result<Option<Certificate>, StoreError> {
        Ok(None)
    }

    fn list(&self, _: Collection) -> Result<Vec<Certificate>, StoreError> {
        Ok(Vec::new())
    }

    fn next_sequence(&self, _: i32) -> Result<u32, StoreError> {
        Ok(1)
    }
}

#[test]
fn test_storage_failure_is_reported() {
    let issuer = Issuer::new(
        ReadOnlyStore,
        fixed_generator(1),
        test_issuance_config(StrategyKind::Timestamp),
    )
    .unwrap();
    let err = issuer.issue(sample_form()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Storage);
    assert!(err.to_string().contains("read-only replica"), "got: {err}");
}

// =========================================================================
// Issue then find
// =========================================================================

#[test]
fn test_issued_certificate_is_found_by_number() {
    let store = Arc::new(InMemoryStore::new());
    let issuer = Issuer::new(
        Arc::clone(&store),
        fixed_generator(9),
        test_issuance_config(StrategyKind::Timestamp),
    )
    .unwrap();
    let certificate = issuer.issue(sample_form()).unwrap();

    let found = find_certificate(store.as_ref(), certificate.key()).expect("found");
    assert_eq!(found.collection, Collection::Test);
    assert_eq!(found.certificate, certificate);
    assert_eq!(found.certificate.details.completion_date, fixed_instant());
}

#[test]
fn test_from_config_attaches_svg_qr_encoder() {
    let issuer =
        Issuer::from_config(InMemoryStore::new(), test_issuance_config(StrategyKind::Timestamp))
            .unwrap();
    let certificate = issuer.issue(sample_form()).unwrap();
    assert!(is_valid(certificate.certificate_number.as_str()));

    let qr = certificate.qr_code_data_uri.as_deref().expect("QR image attached");
    assert!(qr.starts_with("data:image/svg+xml;base64,"), "got {qr}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_issued_numbers_validate(
        form in strategies::arb_form(),
        kind in strategies::arb_strategy_kind(),
        seed in any::<u64>(),
    ) {
        let issuer = Issuer::new(
            InMemoryStore::new(),
            fixed_generator(seed),
            test_issuance_config(kind),
        )
        .unwrap();
        let certificate = issuer.issue(form.clone()).unwrap();
        prop_assert!(is_valid(certificate.certificate_number.as_str()));
        prop_assert_eq!(certificate.details, form);
    }
}
