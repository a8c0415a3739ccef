//! OAuth provider service
//!
//! The session state machine talks to the identity provider only through the
//! [`OAuthService`] trait, so the transitions can be driven by a mock in tests.

use async_trait::async_trait;

use crate::models::{AppError, UserProfile};
use crate::oauth::token::exchange_authorization_code;
use crate::oauth::{ClientConfig, Credential, ProfileFetcher};
use crate::settings::OAuthSettings;

/// Provider operations used by the login flow
#[async_trait]
pub trait OAuthService: Send + Sync {
    /// Exchange an authorization code for a credential
    ///
    /// # Errors
    ///
    /// Returns `AppError::AuthExchange` on network failure, an invalid or
    /// reused code, or a redirect URI mismatch
    async fn exchange_code(
        &self,
        config: &ClientConfig,
        code: &str,
        redirect_uri: &str,
        code_verifier: Option<&str>,
    ) -> Result<Credential, AppError>;

    /// Fetch the identity claims for a credential
    ///
    /// # Errors
    ///
    /// Returns `AppError::ProfileFetch` on any non-200 answer or malformed body
    async fn fetch_profile(&self, credential: &Credential) -> Result<UserProfile, AppError>;
}

/// HTTP implementation backed by `reqwest`
#[derive(Clone)]
pub struct OAuthServiceImpl {
    http_client: reqwest::Client,
    profile_fetcher: ProfileFetcher,
}

impl OAuthServiceImpl {
    /// Create a new OAuth service for the given userinfo endpoint
    #[must_use]
    pub fn new(userinfo_endpoint: &str) -> Self {
        let http_client = reqwest::Client::new();
        Self {
            profile_fetcher: ProfileFetcher::new(http_client.clone(), userinfo_endpoint),
            http_client,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &OAuthSettings) -> Self {
        Self::new(&settings.userinfo_endpoint)
    }
}

#[async_trait]
impl OAuthService for OAuthServiceImpl {
    async fn exchange_code(
        &self,
        config: &ClientConfig,
        code: &str,
        redirect_uri: &str,
        code_verifier: Option<&str>,
    ) -> Result<Credential, AppError> {
        exchange_authorization_code(&self.http_client, config, code, redirect_uri, code_verifier)
            .await
    }

    async fn fetch_profile(&self, credential: &Credential) -> Result<UserProfile, AppError> {
        self.profile_fetcher.fetch_profile(credential).await
    }
}
