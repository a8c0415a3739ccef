//! Authorization request construction

use crate::models::AppError;
use crate::oauth::ClientConfig;
use crate::utils::crypto::{generate_csrf_token, PkcePair};
use crate::utils::logging::LoggingHelper;

/// An issued authorization request and the secrets needed to complete it
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub code_verifier: Option<String>,
}

/// Build the provider authorization URL
///
/// Carries the client ID, redirect URI, requested scopes, `response_type=code`,
/// `prompt=consent`, `access_type=offline`, a fresh CSRF `state`, and with
/// `use_pkce` an S256 code challenge.
///
/// # Errors
///
/// Returns `AppError::Configuration` if the authorization endpoint cannot be parsed
pub fn build_authorization_request(
    config: &ClientConfig,
    use_pkce: bool,
) -> Result<AuthorizationRequest, AppError> {
    let mut url = url::Url::parse(config.auth_uri())
        .map_err(|e| AppError::Configuration(format!("auth_uri is not a valid URL: {e}")))?;

    let state = generate_csrf_token();
    let scopes = config.scope_param();
    let pkce = use_pkce.then(PkcePair::generate);

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", config.client_id())
            .append_pair("redirect_uri", config.redirect_uri())
            .append_pair("scope", &scopes)
            .append_pair("state", &state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");

        if let Some(pkce) = &pkce {
            query
                .append_pair("code_challenge", &pkce.challenge)
                .append_pair("code_challenge_method", "S256");
        }
    }

    LoggingHelper::log_authorization_url_built(&scopes, pkce.is_some());

    Ok(AuthorizationRequest {
        url: url.to_string(),
        state,
        code_verifier: pkce.map(|pkce| pkce.verifier),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto::pkce_challenge;
    use std::collections::HashMap;

    fn config() -> ClientConfig {
        ClientConfig::new(
            "client-123",
            "secret",
            "https://accounts.example.com/o/oauth2/auth?hd=example.com",
            "https://oauth2.example.com/token",
            "http://localhost:8501",
            ["openid", "email"],
        )
        .unwrap()
    }

    fn query_map(url: &str) -> HashMap<String, String> {
        url::Url::parse(url)
            .unwrap()
            .query_pairs()
            .into_owned()
            .collect()
    }

    #[test]
    fn test_request_parameters() {
        let request = build_authorization_request(&config(), false).unwrap();
        let params = query_map(&request.url);

        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["redirect_uri"], "http://localhost:8501");
        assert_eq!(params["scope"], "openid email");
        assert_eq!(params["prompt"], "consent");
        assert_eq!(params["state"], request.state);
        // Existing query parameters of the endpoint are preserved
        assert_eq!(params["hd"], "example.com");
        assert!(!params.contains_key("code_challenge"));
        assert!(request.code_verifier.is_none());
    }

    #[test]
    fn test_pkce_challenge_matches_verifier() {
        let request = build_authorization_request(&config(), true).unwrap();
        let params = query_map(&request.url);
        let verifier = request.code_verifier.unwrap();

        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["code_challenge"], pkce_challenge(&verifier));
    }

    #[test]
    fn test_each_request_gets_a_new_state() {
        let first = build_authorization_request(&config(), false).unwrap();
        let second = build_authorization_request(&config(), false).unwrap();
        assert_ne!(first.state, second.state);
    }
}
