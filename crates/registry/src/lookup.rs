//! Public certificate lookup.
//!
//! The id a visitor types or scans is passed to the store exactly as given.
//! It is not validated against the number schemes first, so records issued
//! under an older numbering scheme stay reachable.

use rigcert_types::{Certificate, Collection};
use tracing::{debug, warn};

use crate::store::CertificateStore;

/// A certificate together with the collection it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundCertificate {
    /// The stored record.
    pub certificate: Certificate,
    /// Collection the record came from.
    pub collection: Collection,
}

/// Looks up a certificate by id, production collection first, then test.
///
/// Returns `None` for an empty id or when no collection holds the id. A
/// collection whose backend fails is logged and skipped, so a failing test
/// collection never hides a production record and vice versa.
pub fn find_certificate<S>(store: &S, id: &str) -> Option<FoundCertificate>
where
    S: CertificateStore + ?Sized,
{
    if id.is_empty() {
        return None;
    }

    for collection in Collection::LOOKUP_ORDER {
        match store.get(collection, id) {
            Ok(Some(certificate)) => {
                debug!(certificate_id = %id, collection = %collection, "Found certificate");
                return Some(FoundCertificate { certificate, collection });
            },
            Ok(None) => {},
            Err(e) => {
                warn!(
                    error = %e,
                    certificate_id = %id,
                    collection = %collection,
                    "Certificate lookup failed, trying next collection"
                );
            },
        }
    }

    debug!(certificate_id = %id, "Certificate not found");
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use rigcert_test_utils::sample_certificate;

    use super::*;
    use crate::store::InMemoryStore;

    #[test]
    fn test_empty_id_is_not_found() {
        let store = InMemoryStore::new();
        store.insert(Collection::Production, sample_certificate("IADC-2025-0001")).unwrap();
        assert!(find_certificate(&store, "").is_none());
    }

    #[test]
    fn test_production_wins_over_test() {
        let store = InMemoryStore::new();
        let mut in_test = sample_certificate("IADC-2025-0001");
        in_test.details.trainee_name = "Test Trainee".to_string();
        store.insert(Collection::Test, in_test).unwrap();
        store.insert(Collection::Production, sample_certificate("IADC-2025-0001")).unwrap();

        let found = find_certificate(&store, "IADC-2025-0001").unwrap();
        assert_eq!(found.collection, Collection::Production);
        assert_ne!(found.certificate.details.trainee_name, "Test Trainee");
    }

    #[test]
    fn test_falls_back_to_test_collection() {
        let store = InMemoryStore::new();
        store.insert(Collection::Test, sample_certificate("IADC-2025-0007")).unwrap();

        let found = find_certificate(&store, "IADC-2025-0007").unwrap();
        assert_eq!(found.collection, Collection::Test);
    }

    #[test]
    fn test_non_scheme_ids_are_looked_up_verbatim() {
        let store = InMemoryStore::new();
        store.insert(Collection::Production, sample_certificate("legacy-42")).unwrap();

        assert!(find_certificate(&store, "legacy-42").is_some());
        assert!(find_certificate(&store, "LEGACY-42").is_none());
    }
}
