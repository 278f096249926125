//! Certificate storage.
//!
//! Provides the [`CertificateStore`] trait the issuer and lookup run
//! against, plus an in-memory implementation for tests and the CLI.
//!
//! Certificates are write-once: `insert` rejects an id that already exists
//! in the target collection and nothing updates or deletes a record.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use parking_lot::{Mutex, RwLock};
use rigcert_types::{Certificate, Collection};

use crate::error::StoreError;

/// Backend holding issued certificates, keyed by certificate number.
pub trait CertificateStore: Send + Sync {
    /// Inserts a certificate under its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if the id is already present in
    /// `collection`, or [`StoreError::Backend`] if the backend fails.
    fn insert(&self, collection: Collection, certificate: Certificate) -> Result<(), StoreError>;

    /// Returns the certificate stored under `id`, if any.
    ///
    /// The id is used as given, without trimming or case folding.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    fn get(&self, collection: Collection, id: &str) -> Result<Option<Certificate>, StoreError>;

    /// Returns every certificate in `collection`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    fn list(&self, collection: Collection) -> Result<Vec<Certificate>, StoreError>;

    /// Allocates the next sequential counter for `year`, starting at 1.
    ///
    /// Counters are shared across collections and never reused.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    fn next_sequence(&self, year: i32) -> Result<u32, StoreError>;
}

impl<S: CertificateStore + ?Sized> CertificateStore for Arc<S> {
    fn insert(&self, collection: Collection, certificate: Certificate) -> Result<(), StoreError> {
        (**self).insert(collection, certificate)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Certificate>, StoreError> {
        (**self).get(collection, id)
    }

    fn list(&self, collection: Collection) -> Result<Vec<Certificate>, StoreError> {
        (**self).list(collection)
    }

    fn next_sequence(&self, year: i32) -> Result<u32, StoreError> {
        (**self).next_sequence(year)
    }
}

/// In-memory certificate store.
///
/// Collections live behind a `parking_lot::RwLock` so lookups run
/// concurrently; sequence counters sit behind their own mutex so allocating
/// a number never blocks readers.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Certificate>>>,
    sequences: Mutex<HashMap<i32, u32>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of certificates in `collection`.
    pub fn len(&self, collection: Collection) -> usize {
        self.collections.read().get(&collection).map_or(0, BTreeMap::len)
    }

    /// Returns true if `collection` holds no certificates.
    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

impl CertificateStore for InMemoryStore {
    fn insert(&self, collection: Collection, certificate: Certificate) -> Result<(), StoreError> {
        let mut collections = self.collections.write();
        let records = collections.entry(collection).or_default();
        let id = certificate.key().to_string();
        if records.contains_key(&id) {
            return Err(StoreError::AlreadyExists { collection, id });
        }
        records.insert(id, certificate);
        Ok(())
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Certificate>, StoreError> {
        Ok(self.collections.read().get(&collection).and_then(|records| records.get(id)).cloned())
    }

    fn list(&self, collection: Collection) -> Result<Vec<Certificate>, StoreError> {
        Ok(self
            .collections
            .read()
            .get(&collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    fn next_sequence(&self, year: i32) -> Result<u32, StoreError> {
        let mut sequences = self.sequences.lock();
        let counter = sequences.entry(year).or_insert(0);
        *counter = counter.checked_add(1).ok_or_else(|| StoreError::Backend {
            message: format!("sequence counter for {year} overflowed"),
        })?;
        Ok(*counter)
    }
}
