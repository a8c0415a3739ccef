//! Userinfo lookup for an authenticated credential

use log::debug;
use reqwest::StatusCode;

use crate::models::{AppError, UserProfile};
use crate::oauth::Credential;
use crate::utils::logging::LoggingHelper;

/// Resolves the identity behind a credential through the userinfo endpoint
#[derive(Clone)]
pub struct ProfileFetcher {
    http_client: reqwest::Client,
    userinfo_endpoint: String,
}

impl ProfileFetcher {
    #[must_use]
    pub fn new(http_client: reqwest::Client, userinfo_endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            userinfo_endpoint: userinfo_endpoint.into(),
        }
    }

    /// GET the userinfo endpoint with the access token as bearer credential
    ///
    /// A stale or revoked token is reported like any other failure; no refresh
    /// is attempted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ProfileFetch` if the request fails, the status is not
    /// 200, or the body is not a JSON object with an `email` claim
    pub async fn fetch_profile(&self, credential: &Credential) -> Result<UserProfile, AppError> {
        let response = self
            .http_client
            .get(&self.userinfo_endpoint)
            .bearer_auth(&credential.access_token)
            .send()
            .await
            .map_err(|e| AppError::ProfileFetch(format!("userinfo request failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!("Userinfo endpoint answered with status {status}");
            return Err(AppError::ProfileFetch(format!("HTTP {}", status.as_u16())));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::ProfileFetch(format!("invalid userinfo body: {e}")))?;

        let profile = UserProfile::from_claims(body)?;
        LoggingHelper::log_profile_fetched(&profile.email);
        Ok(profile)
    }
}
