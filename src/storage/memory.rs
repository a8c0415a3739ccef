use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::{CredentialStore, StoredCredentials};
use crate::models::AppError;
use crate::utils::logging::LoggingHelper;

/// Process-local store keyed by email
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: Mutex<HashMap<String, StoredCredentials>>,
}

impl InMemoryCredentialStore {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn save(&self, email: &str, secret_a: &str, secret_b: &str) -> Result<(), AppError> {
        let record = StoredCredentials {
            email: email.to_string(),
            secret_a: secret_a.to_string(),
            secret_b: secret_b.to_string(),
        };
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(email.to_string(), record);

        LoggingHelper::log_credentials_saved(email);
        Ok(())
    }

    fn load(&self, email: &str) -> Result<Option<StoredCredentials>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(email)
            .cloned())
    }
}
