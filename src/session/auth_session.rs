//! Authorization-code grant state machine
//!
//! ```text
//! NoCredentials --begin_authorization--> AwaitingCode --exchange_code ok--> Authenticated
//!       ^                                     |
//!       +-------- exchange_code failure ------+
//! ```
//!
//! A session holds at most one [`Credential`]. Once `Authenticated`, further
//! exchanges are refused, so a code is never sent to the provider twice from
//! the same session.

use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::models::{AppError, UserProfile};
use crate::oauth::{build_authorization_request, ClientConfig, Credential, OAuthService};

/// How long an issued login link is handed out again before a fresh one is built
pub const PENDING_AUTHORIZATION_TTL_MINUTES: i64 = 10;

/// Secrets recorded when an authorization URL is issued
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub url: String,
    pub state: String,
    pub code_verifier: Option<String>,
    pub issued_at: DateTime<Utc>,
}

impl PendingAuthorization {
    #[must_use]
    pub fn is_stale(&self) -> bool {
        Utc::now() - self.issued_at > Duration::minutes(PENDING_AUTHORIZATION_TTL_MINUTES)
    }
}

#[derive(Debug, Clone)]
pub enum AuthState {
    NoCredentials,
    AwaitingCode(PendingAuthorization),
    Authenticated(Credential),
}

impl AuthState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoCredentials => "NoCredentials",
            Self::AwaitingCode(_) => "AwaitingCode",
            Self::Authenticated(_) => "Authenticated",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    state: AuthState,
    use_pkce: bool,
}

impl AuthSession {
    #[must_use]
    pub fn new(use_pkce: bool) -> Self {
        Self {
            state: AuthState::NoCredentials,
            use_pkce,
        }
    }

    #[must_use]
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub fn credential(&self) -> Option<&Credential> {
        match &self.state {
            AuthState::Authenticated(credential) => Some(credential),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    /// Issue an authorization URL and record the pending authorization
    ///
    /// Re-issuing from `AwaitingCode` replaces the pending state.
    ///
    /// # Errors
    ///
    /// - `AppError::AlreadyAuthenticated` if the session already holds a credential
    /// - `AppError::Configuration` if the authorization endpoint is malformed
    pub fn begin_authorization(&mut self, config: &ClientConfig) -> Result<String, AppError> {
        if self.is_authenticated() {
            return Err(AppError::AlreadyAuthenticated);
        }

        let request = build_authorization_request(config, self.use_pkce)?;
        self.state = AuthState::AwaitingCode(PendingAuthorization {
            url: request.url.clone(),
            state: request.state,
            code_verifier: request.code_verifier,
            issued_at: Utc::now(),
        });
        Ok(request.url)
    }

    /// Login link for the session
    ///
    /// While a fresh authorization is pending its URL is handed out again, so
    /// every rendered link stays valid until one of them completes.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_authorization`]
    pub fn authorization_url(&mut self, config: &ClientConfig) -> Result<String, AppError> {
        if let AuthState::AwaitingCode(pending) = &self.state {
            if !pending.is_stale() {
                return Ok(pending.url.clone());
            }
            debug!("Pending authorization expired; issuing a new one");
        }
        self.begin_authorization(config)
    }

    /// Exchange an authorization code for the session's credential
    ///
    /// `received_state` is the `state` parameter of the redirect, if any. A
    /// redirect without one is accepted; one that does not match the pending
    /// authorization is rejected before contacting the provider.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AuthExchange` if the session already holds a
    /// credential, the state does not match, or the provider exchange fails.
    /// Except for the first case the session is left in `NoCredentials`.
    pub async fn exchange_code(
        &mut self,
        service: &dyn OAuthService,
        config: &ClientConfig,
        code: &str,
        redirect_uri: &str,
        received_state: Option<&str>,
    ) -> Result<&Credential, AppError> {
        if self.is_authenticated() {
            return Err(AppError::AuthExchange(
                "authorization code already exchanged for this session".to_string(),
            ));
        }

        let pending = match std::mem::replace(&mut self.state, AuthState::NoCredentials) {
            AuthState::AwaitingCode(pending) => Some(pending),
            _ => None,
        };

        if let Some(received) = received_state {
            match &pending {
                Some(pending) if pending.state == received => {}
                Some(_) => {
                    return Err(AppError::AuthExchange(
                        "state parameter does not match the pending authorization".to_string(),
                    ))
                }
                None => {
                    return Err(AppError::AuthExchange(
                        "no authorization is pending for this session".to_string(),
                    ))
                }
            }
        }

        let code_verifier = pending.as_ref().and_then(|p| p.code_verifier.as_deref());
        let credential = service
            .exchange_code(config, code, redirect_uri, code_verifier)
            .await?;

        debug!(
            "Code exchanged; session moves from {} to Authenticated",
            if pending.is_some() { "AwaitingCode" } else { "NoCredentials" }
        );
        self.state = AuthState::Authenticated(credential);
        self.credential().ok_or(AppError::NotAuthenticated)
    }

    /// Resolve the identity behind the session's credential
    ///
    /// The credential is left untouched whatever the outcome.
    ///
    /// # Errors
    ///
    /// - `AppError::NotAuthenticated` without a credential
    /// - `AppError::ProfileFetch` from the provider lookup
    pub async fn fetch_profile(&self, service: &dyn OAuthService) -> Result<UserProfile, AppError> {
        let credential = self.credential().ok_or(AppError::NotAuthenticated)?;
        service.fetch_profile(credential).await
    }

    /// Drop any pending authorization or credential
    pub fn reset(&mut self) {
        self.state = AuthState::NoCredentials;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock::MockOAuthService, TestFixtures};

    fn state_param(url: &str) -> String {
        url::Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[test]
    fn test_new_session_has_no_credentials() {
        let session = AuthSession::new(true);
        assert_eq!(session.state().name(), "NoCredentials");
        assert!(session.credential().is_none());
    }

    #[test]
    fn test_begin_authorization_moves_to_awaiting_code() {
        let mut session = AuthSession::new(true);
        let url = session
            .begin_authorization(&TestFixtures::client_config())
            .unwrap();

        match session.state() {
            AuthState::AwaitingCode(pending) => {
                assert_eq!(pending.state, state_param(&url));
                assert!(pending.code_verifier.is_some());
            }
            other => panic!("unexpected state {}", other.name()),
        }
    }

    #[test]
    fn test_begin_authorization_without_pkce_records_no_verifier() {
        let mut session = AuthSession::new(false);
        session
            .begin_authorization(&TestFixtures::client_config())
            .unwrap();
        assert!(matches!(
            session.state(),
            AuthState::AwaitingCode(PendingAuthorization { code_verifier: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_exchange_success_authenticates() {
        let config = TestFixtures::client_config();
        let service = MockOAuthService::new("user@example.com");
        let mut session = AuthSession::new(true);
        let url = session.begin_authorization(&config).unwrap();
        let state = state_param(&url);

        let credential = session
            .exchange_code(
                &service,
                &config,
                "XYZ",
                config.redirect_uri(),
                Some(state.as_str()),
            )
            .await
            .unwrap();
        assert_eq!(credential.access_token, "access-XYZ");
        assert!(session.is_authenticated());

        // The verifier issued with the URL was sent along
        assert_eq!(service.received_verifiers().len(), 1);
        assert!(service.received_verifiers()[0].is_some());
    }

    #[tokio::test]
    async fn test_exchange_failure_returns_to_no_credentials() {
        let config = TestFixtures::client_config();
        let service = MockOAuthService::new("user@example.com");
        let mut session = AuthSession::new(true);
        session.begin_authorization(&config).unwrap();

        let err = session
            .exchange_code(
                &service,
                &config,
                MockOAuthService::INVALID_CODE,
                config.redirect_uri(),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthExchange(_)));
        assert_eq!(session.state().name(), "NoCredentials");
    }

    #[tokio::test]
    async fn test_state_mismatch_is_rejected_without_calling_provider() {
        let config = TestFixtures::client_config();
        let service = MockOAuthService::new("user@example.com");
        let mut session = AuthSession::new(true);
        session.begin_authorization(&config).unwrap();

        let err = session
            .exchange_code(&service, &config, "XYZ", config.redirect_uri(), Some("forged"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthExchange(_)));
        assert_eq!(service.exchange_calls(), 0);
        assert_eq!(session.state().name(), "NoCredentials");
    }

    #[tokio::test]
    async fn test_second_exchange_refused_once_authenticated() {
        let config = TestFixtures::client_config();
        let service = MockOAuthService::new("user@example.com");
        let mut session = AuthSession::new(false);

        session
            .exchange_code(&service, &config, "XYZ", config.redirect_uri(), None)
            .await
            .unwrap();
        let err = session
            .exchange_code(&service, &config, "XYZ", config.redirect_uri(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AuthExchange(_)));
        assert_eq!(service.exchange_calls(), 1);
        // The first credential survives
        assert_eq!(session.credential().unwrap().access_token, "access-XYZ");
    }

    #[tokio::test]
    async fn test_failed_profile_fetch_keeps_credential() {
        let config = TestFixtures::client_config();
        let service = MockOAuthService::failing_profile();
        let mut session = AuthSession::new(false);
        session
            .exchange_code(&service, &config, "XYZ", config.redirect_uri(), None)
            .await
            .unwrap();
        let before = session.credential().cloned();

        let err = session.fetch_profile(&service).await.unwrap_err();
        assert!(matches!(err, AppError::ProfileFetch(_)));
        assert_eq!(session.credential().cloned(), before);
    }

    #[test]
    fn test_authorization_url_reuses_pending_link() {
        let config = TestFixtures::client_config();
        let mut session = AuthSession::new(true);

        let first = session.authorization_url(&config).unwrap();
        let second = session.authorization_url(&config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_authorization_url_replaces_stale_link() {
        let config = TestFixtures::client_config();
        let mut session = AuthSession::new(true);
        let first = session.authorization_url(&config).unwrap();

        if let AuthState::AwaitingCode(pending) = &mut session.state {
            pending.issued_at =
                Utc::now() - Duration::minutes(PENDING_AUTHORIZATION_TTL_MINUTES + 1);
        }
        let second = session.authorization_url(&config).unwrap();
        assert_ne!(state_param(&first), state_param(&second));
    }

    #[test]
    fn test_begin_authorization_refused_when_authenticated() {
        let mut session = AuthSession::new(false);
        session.state = AuthState::Authenticated(TestFixtures::credential());
        assert!(matches!(
            session.begin_authorization(&TestFixtures::client_config()),
            Err(AppError::AlreadyAuthenticated)
        ));
    }
}
