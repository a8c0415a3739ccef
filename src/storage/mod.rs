//! Persistence of third-party integration secrets
//!
//! Session logic only sees the [`CredentialStore`] trait. Two backends exist:
//!
//! - [`FileCredentialStore`] - a single JSON file, overwritten on every save
//! - [`InMemoryCredentialStore`] - a per-email map that lives as long as the process

pub mod file;
pub mod memory;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use file::FileCredentialStore;
pub use memory::InMemoryCredentialStore;

use crate::models::AppError;
use crate::settings::{StorageBackend, StorageSettings};

/// Persisted record `{email, secret_a, secret_b}`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub email: String,
    pub secret_a: String,
    pub secret_b: String,
}

impl fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("email", &self.email)
            .field("secret_a", &"[redacted]")
            .field("secret_b", &"[redacted]")
            .finish()
    }
}

/// Storage capability for integration secrets
pub trait CredentialStore: Send + Sync {
    /// Persist the secrets for `email`, replacing whatever was stored before
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the backend cannot be written
    fn save(&self, email: &str, secret_a: &str, secret_b: &str) -> Result<(), AppError>;

    /// Look up the secrets stored for `email`
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the backend cannot be read
    fn load(&self, email: &str) -> Result<Option<StoredCredentials>, AppError>;
}

/// Build the store selected in settings
#[must_use]
pub fn from_settings(settings: &StorageSettings) -> Arc<dyn CredentialStore> {
    match settings.backend {
        StorageBackend::File => Arc::new(FileCredentialStore::new(&settings.credentials_file)),
        StorageBackend::Memory => Arc::new(InMemoryCredentialStore::default()),
    }
}
