use std::fs;
use std::path::PathBuf;

use super::{CredentialStore, StoredCredentials};
use crate::models::AppError;
use crate::utils::logging::LoggingHelper;

/// Flat-file store holding a single record
///
/// Every save overwrites the file, whoever the email belongs to. `load` only
/// returns the record when its email matches the one asked for.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_record(&self) -> Result<Option<StoredCredentials>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let record = serde_json::from_str(&contents).map_err(|e| {
            AppError::Storage(format!("{} is not a valid record: {e}", self.path.display()))
        })?;
        Ok(Some(record))
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, email: &str, secret_a: &str, secret_b: &str) -> Result<(), AppError> {
        let record = StoredCredentials {
            email: email.to_string(),
            secret_a: secret_a.to_string(),
            secret_b: secret_b.to_string(),
        };
        let json = serde_json::to_string(&record)
            .map_err(|e| AppError::Storage(format!("failed to serialize record: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)?;

        LoggingHelper::log_credentials_saved(email);
        Ok(())
    }

    fn load(&self, email: &str) -> Result<Option<StoredCredentials>, AppError> {
        Ok(self.read_record()?.filter(|record| record.email == email))
    }
}
