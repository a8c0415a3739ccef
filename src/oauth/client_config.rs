//! Static OAuth client configuration
//!
//! The client ID, secret and provider endpoints come from the client secrets
//! JSON file as downloaded from the provider console:
//!
//! ```json
//! { "web": { "client_id": "...", "client_secret": "...",
//!            "auth_uri": "...", "token_uri": "...",
//!            "redirect_uris": ["http://localhost:8501"] } }
//! ```
//!
//! An `installed` object is accepted in place of `web`. Redirect URI and scopes
//! come from the application settings.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::models::AppError;
use crate::settings::OAuthSettings;
use crate::utils::logging::LoggingHelper;

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    web: Option<ClientSecretsEntry>,
    installed: Option<ClientSecretsEntry>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsEntry {
    client_id: Option<String>,
    client_secret: Option<String>,
    auth_uri: Option<String>,
    token_uri: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

/// Validated, immutable OAuth client configuration
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
    redirect_uri: String,
    scopes: Vec<String>,
}

impl ClientConfig {
    /// Build a configuration, validating every field
    ///
    /// Scopes keep their first-seen order; duplicates are dropped.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if:
    /// - Client ID or secret is empty
    /// - An endpoint or the redirect URI is not an absolute http(s) URL
    /// - No scope is requested, or a scope is empty or contains whitespace
    pub fn new<I, S>(
        client_id: &str,
        client_secret: &str,
        auth_uri: &str,
        token_uri: &str,
        redirect_uri: &str,
        scopes: I,
    ) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client_id = require_non_empty("client_id", client_id)?;
        let client_secret = require_non_empty("client_secret", client_secret)?;
        let auth_uri = require_http_url("auth_uri", auth_uri)?;
        let token_uri = require_http_url("token_uri", token_uri)?;
        let redirect_uri = require_http_url("redirect_uri", redirect_uri)?;

        let mut unique_scopes: Vec<String> = Vec::new();
        for scope in scopes {
            let scope: String = scope.into();
            let scope = scope.trim().to_string();
            if scope.is_empty() || scope.contains(char::is_whitespace) {
                return Err(AppError::Configuration(format!(
                    "invalid scope identifier: {scope:?}"
                )));
            }
            if !unique_scopes.contains(&scope) {
                unique_scopes.push(scope);
            }
        }
        if unique_scopes.is_empty() {
            return Err(AppError::Configuration(
                "at least one scope must be requested".to_string(),
            ));
        }

        Ok(Self {
            client_id,
            client_secret,
            auth_uri,
            token_uri,
            redirect_uri,
            scopes: unique_scopes,
        })
    }

    /// Parse a client secrets JSON document
    ///
    /// When `redirect_uri` is `None` or empty, the first `redirect_uris` entry of
    /// the document is used.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if the document is not valid JSON, has
    /// neither a `web` nor an `installed` section, or fails validation
    pub fn from_json(
        json: &str,
        redirect_uri: Option<&str>,
        scopes: &[String],
    ) -> Result<Self, AppError> {
        let file: ClientSecretsFile = serde_json::from_str(json)
            .map_err(|e| AppError::Configuration(format!("invalid client secrets JSON: {e}")))?;

        let entry = file.web.or(file.installed).ok_or_else(|| {
            AppError::Configuration(
                "client secrets must contain a \"web\" or \"installed\" section".to_string(),
            )
        })?;

        let redirect_uri = match redirect_uri.filter(|uri| !uri.trim().is_empty()) {
            Some(uri) => uri.to_string(),
            None => entry.redirect_uris.first().cloned().ok_or_else(|| {
                AppError::Configuration("no redirect URI configured".to_string())
            })?,
        };

        Self::new(
            entry.client_id.as_deref().unwrap_or_default(),
            entry.client_secret.as_deref().unwrap_or_default(),
            entry.auth_uri.as_deref().unwrap_or_default(),
            entry.token_uri.as_deref().unwrap_or_default(),
            &redirect_uri,
            scopes.iter().cloned(),
        )
    }

    /// Load the client secrets file from disk
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if the file is missing, unreadable or invalid
    pub fn load(path: &Path, redirect_uri: &str, scopes: &[String]) -> Result<Self, AppError> {
        if !path.exists() {
            return Err(AppError::Configuration(format!(
                "Missing {}. Ensure the client secrets file is in place.",
                path.display()
            )));
        }
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_json(&json, Some(redirect_uri), scopes)?;

        LoggingHelper::log_client_config_loaded(
            &path.display().to_string(),
            &config.client_id,
            config.scopes.len(),
        );
        Ok(config)
    }

    /// Load the client configuration named by the OAuth settings
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::load`]
    pub fn from_settings(settings: &OAuthSettings) -> Result<Self, AppError> {
        Self::load(
            Path::new(&settings.client_secrets_file),
            &settings.redirect_uri,
            &settings.scopes,
        )
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    #[must_use]
    pub fn auth_uri(&self) -> &str {
        &self.auth_uri
    }

    #[must_use]
    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Scopes joined for the `scope` request parameter
    #[must_use]
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Configuration(format!("{field} is missing")));
    }
    Ok(value.to_string())
}

fn require_http_url(field: &str, value: &str) -> Result<String, AppError> {
    let value = require_non_empty(field, value)?;
    let parsed = url::Url::parse(&value)
        .map_err(|e| AppError::Configuration(format!("{field} is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::Configuration(format!(
            "{field} must use http or https"
        )));
    }
    Ok(value)
}
