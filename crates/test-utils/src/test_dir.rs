//! Temporary directories for tests that read files.
//!
//! [`TestDir`] wraps [`tempfile::TempDir`] with helpers for dropping config
//! and form files into place.

// Test utilities are expected to panic on failure - that's their purpose
#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A managed temporary directory for tests.
///
/// The directory is removed when this struct is dropped.
///
/// # Example
///
/// ```
/// use rigcert_test_utils::TestDir;
///
/// let dir = TestDir::new();
/// let path = dir.write("rigcert.toml", "[issuance]\npublic_host = \"certs.example.test\"\n");
/// assert!(path.exists());
/// ```
pub struct TestDir {
    inner: TempDir,
}

impl TestDir {
    /// Creates a new temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let inner = TempDir::new().expect("failed to create temp directory");
        Self { inner }
    }

    /// Returns the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Joins a relative path to the temporary directory.
    #[must_use]
    pub fn join<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.inner.path().join(path)
    }

    /// Writes `contents` to `name` inside the directory and returns its path.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write<P: AsRef<Path>>(&self, name: P, contents: &str) -> PathBuf {
        let path = self.join(name);
        std::fs::write(&path, contents).expect("failed to write test file");
        path
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}
