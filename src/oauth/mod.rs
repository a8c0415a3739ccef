//! OAuth2 authorization-code flow
//!
//! This module provides the client configuration, authorization URL
//! construction, code exchange and userinfo lookup. It has no knowledge of
//! browser sessions; see [`crate::session`] for the state machine that drives it.

pub mod authorization;
pub mod client_config;
pub mod profile;
pub mod service;
pub mod token;

pub use authorization::{build_authorization_request, AuthorizationRequest};
pub use client_config::ClientConfig;
pub use profile::ProfileFetcher;
pub use service::{OAuthService, OAuthServiceImpl};
pub use token::Credential;

use serde::Deserialize;

/// Query parameters delivered by the provider redirect
#[derive(Deserialize, Debug, Default)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl OAuthCallback {
    /// Whether the request carries anything from the provider
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        self.code.is_some() || self.error.is_some()
    }
}
