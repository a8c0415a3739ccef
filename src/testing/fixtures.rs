//! Test fixtures providing pre-built test objects

use std::path::Path;

use chrono::{Duration, Utc};
use serde_json::json;

use super::constants::{
    TEST_CLIENT_ID, TEST_CLIENT_SECRET, TEST_EMAIL, TEST_REDIRECT_URI, TEST_SCOPES, TEST_SUBJECT,
    TEST_USER_NAME,
};
use crate::models::UserProfile;
use crate::oauth::{ClientConfig, Credential};
use crate::session::SessionContext;
use crate::settings::{LoginflowSettings, StorageBackend};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Client configuration pointing at the real Google endpoints
    ///
    /// # Panics
    ///
    /// Panics if the fixture values are rejected, which would be a bug in the fixture
    #[must_use]
    pub fn client_config() -> ClientConfig {
        Self::client_config_for("https://accounts.google.com")
    }

    /// Client configuration whose endpoints live under `base_url`
    ///
    /// # Panics
    ///
    /// Panics if `base_url` is not an http(s) URL
    #[must_use]
    pub fn client_config_for(base_url: &str) -> ClientConfig {
        ClientConfig::new(
            TEST_CLIENT_ID,
            TEST_CLIENT_SECRET,
            &format!("{base_url}/o/oauth2/auth"),
            &format!("{base_url}/token"),
            TEST_REDIRECT_URI,
            TEST_SCOPES.iter().copied(),
        )
        .expect("fixture client configuration is valid")
    }

    /// `client_secrets.json` body in the provider's `web` layout
    #[must_use]
    pub fn client_secrets_json(base_url: &str) -> serde_json::Value {
        json!({
            "web": {
                "client_id": TEST_CLIENT_ID,
                "client_secret": TEST_CLIENT_SECRET,
                "auth_uri": format!("{base_url}/o/oauth2/auth"),
                "token_uri": format!("{base_url}/token"),
                "redirect_uris": [TEST_REDIRECT_URI]
            }
        })
    }

    /// Write a client secrets file into `dir` and return its path
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written
    #[must_use]
    pub fn write_client_secrets(dir: &Path, base_url: &str) -> String {
        let path = dir.join("client_secrets.json");
        std::fs::write(&path, Self::client_secrets_json(base_url).to_string())
            .expect("write client secrets fixture");
        path.to_string_lossy().into_owned()
    }

    /// Settings wired to a mock provider at `base_url`, storing credentials in `dir`
    #[must_use]
    pub fn settings_for(dir: &Path, base_url: &str) -> LoginflowSettings {
        let mut settings = LoginflowSettings::default();
        settings.oauth.client_secrets_file = Self::write_client_secrets(dir, base_url);
        settings.oauth.userinfo_endpoint = format!("{base_url}/userinfo");
        settings.storage.backend = StorageBackend::File;
        settings.storage.credentials_file = dir
            .join("user_credentials.json")
            .to_string_lossy()
            .into_owned();
        settings.chat.api_base_url = base_url.to_string();
        settings.chat.api_key = Some("test-key".to_string());
        settings.chat.api_key_env = None;
        settings
    }

    /// Credential as returned by a successful exchange
    #[must_use]
    pub fn credential() -> Credential {
        Credential {
            access_token: "test_access_token".to_string(),
            refresh_token: Some("test_refresh_token".to_string()),
            id_token: Some("test_id_token".to_string()),
            token_type: "Bearer".to_string(),
            token_uri: "https://accounts.google.com/token".to_string(),
            client_id: TEST_CLIENT_ID.to_string(),
            client_secret: TEST_CLIENT_SECRET.to_string(),
            scopes: TEST_SCOPES.iter().map(ToString::to_string).collect(),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        }
    }

    /// Userinfo claims for the default test user
    #[must_use]
    pub fn userinfo_claims(email: &str) -> serde_json::Value {
        json!({
            "sub": TEST_SUBJECT,
            "email": email,
            "email_verified": true,
            "name": TEST_USER_NAME,
            "picture": "https://example.com/avatar.png"
        })
    }

    /// # Panics
    ///
    /// Panics if the fixture claims are rejected
    #[must_use]
    pub fn profile() -> UserProfile {
        Self::profile_for(TEST_EMAIL)
    }

    /// # Panics
    ///
    /// Panics if `email` is empty
    #[must_use]
    pub fn profile_for(email: &str) -> UserProfile {
        UserProfile::from_claims(Self::userinfo_claims(email)).expect("fixture claims are valid")
    }

    /// Fresh session without PKCE
    #[must_use]
    pub fn session_context() -> SessionContext {
        SessionContext::new(Self::client_config(), false)
    }
}
