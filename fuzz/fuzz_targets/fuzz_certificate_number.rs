//! Fuzz target for certificate number validation and decoding.
//!
//! Tests that `is_valid` and `parse` never panic on arbitrary strings, that
//! a decoded number always validates, and that generated numbers always
//! validate and decode back to the clock's fields.

#![no_main]

use chrono::{DateTime, Datelike, Timelike};
use libfuzzer_sys::fuzz_target;
use rand::{SeedableRng, rngs::StdRng};
use rigcert_types::{
    CertificateNumberGenerator, FixedClock, ParsedCertificateNumber, Strategy, is_valid, parse,
};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let selector = data[0] % 2;
    let payload = &data[1..];

    match selector {
        // Validate and decode arbitrary strings; must never panic
        0 => fuzz_decode_arbitrary(payload),
        // Generate from fuzzed inputs, then validate and decode
        _ => fuzz_generate(payload),
    }
});

fn fuzz_decode_arbitrary(data: &[u8]) {
    let Ok(candidate) = std::str::from_utf8(data) else {
        return;
    };

    let valid = is_valid(candidate);
    let parsed = parse(candidate);
    if !parsed.is_unknown() {
        assert!(valid, "decoded but invalid: {candidate:?}");
    }
    if let ParsedCertificateNumber::Unknown { original } = &parsed {
        assert_eq!(original, candidate);
    }
}

fn fuzz_generate(data: &[u8]) {
    if data.len() < 8 {
        return;
    }
    let mut seconds = [0u8; 8];
    seconds.copy_from_slice(&data[..8]);
    // 2000-01-01 to 2099-12-31, the range a two-digit year round-trips.
    let secs = 946_684_800 + (u64::from_le_bytes(seconds) % 3_155_760_000) as i64;
    let Some(instant) = DateTime::from_timestamp(secs, 0) else {
        return;
    };

    let generator = CertificateNumberGenerator::new(
        FixedClock::new(instant),
        StdRng::seed_from_u64(u64::from(data[0])),
    );

    let timestamp = generator.generate(&Strategy::Timestamp);
    assert!(is_valid(timestamp.as_str()), "generated invalid: {timestamp}");
    match parse(timestamp.as_str()) {
        ParsedCertificateNumber::AlphanumericTimestamp(fields) => {
            assert_eq!(fields.year, instant.year());
            assert_eq!(fields.month, instant.month());
            assert_eq!(fields.day, instant.day());
            assert_eq!(fields.hours, instant.hour());
            assert_eq!(fields.minutes, instant.minute());
            assert_eq!(fields.seconds, instant.second());
        },
        other => panic!("timestamp {timestamp} decoded as {other:?}"),
    }

    let hash_input = String::from_utf8_lossy(&data[8..]);
    let hashed = generator.generate(&Strategy::HashBased { data: Some(hash_input.into_owned()) });
    assert!(is_valid(hashed.as_str()), "generated invalid: {hashed}");
}
