//! Per-browser-session context
//!
//! Everything one browser session knows lives in a [`SessionContext`]: the
//! client configuration loaded at bootstrap, the [`AuthSession`] state machine,
//! the resolved profile, the integration secrets and the chat transcript.
//! Handlers pass it explicitly to every operation; nothing is process-global.

use uuid::Uuid;

use super::auth_session::AuthSession;
use crate::chat::{ChatMessage, ChatService};
use crate::models::{AppError, UserProfile};
use crate::oauth::{ClientConfig, Credential, OAuthService};
use crate::settings::OAuthSettings;
use crate::storage::CredentialStore;
use crate::utils::logging::LoggingHelper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// User-visible message shown once on the next page render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Integration secrets held for the session once saved or recalled
#[derive(Clone, PartialEq, Eq)]
pub struct IntegrationSecrets {
    pub secret_a: String,
    pub secret_b: String,
}

impl std::fmt::Debug for IntegrationSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("IntegrationSecrets([redacted])")
    }
}

#[derive(Debug)]
pub struct SessionContext {
    id: Uuid,
    config: ClientConfig,
    auth: AuthSession,
    profile: Option<UserProfile>,
    integration: Option<IntegrationSecrets>,
    transcript: Vec<ChatMessage>,
    notices: Vec<Notice>,
}

impl SessionContext {
    #[must_use]
    pub fn new(config: ClientConfig, use_pkce: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            auth: AuthSession::new(use_pkce),
            profile: None,
            integration: None,
            transcript: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Start a session: load the static client configuration
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if the client secrets are missing or
    /// invalid; the session cannot start
    pub fn bootstrap(settings: &OAuthSettings) -> Result<Self, AppError> {
        let config = ClientConfig::from_settings(settings)?;
        let context = Self::new(config, settings.use_pkce);
        LoggingHelper::log_session_started(&context.id.to_string());
        Ok(context)
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    #[must_use]
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Email recorded for the session, once the profile is known
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.profile.as_ref().map(|profile| profile.email.as_str())
    }

    #[must_use]
    pub fn has_integration(&self) -> bool {
        self.integration.is_some()
    }

    /// The provider-reported lifetime of the session's credential has passed
    #[must_use]
    pub fn credential_expired(&self) -> bool {
        self.auth.credential().is_some_and(Credential::is_expired)
    }

    #[must_use]
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Drain the notices for rendering
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Issue the login link for this session
    ///
    /// # Errors
    ///
    /// See [`AuthSession::authorization_url`]
    pub fn authorization_url(&mut self) -> Result<String, AppError> {
        self.auth.authorization_url(&self.config)
    }

    /// Complete the provider redirect: exchange the code, then resolve the profile
    ///
    /// A failed profile lookup after a successful exchange still leaves the
    /// session authenticated; the error is returned so it can be shown.
    ///
    /// # Errors
    ///
    /// - `AppError::AuthExchange` if the exchange fails
    /// - `AppError::ProfileFetch` / `AppError::Storage` from [`Self::load_profile`]
    pub async fn complete_login(
        &mut self,
        oauth: &dyn OAuthService,
        store: &dyn CredentialStore,
        code: &str,
        received_state: Option<&str>,
    ) -> Result<&UserProfile, AppError> {
        let redirect_uri = self.config.redirect_uri().to_string();
        self.auth
            .exchange_code(oauth, &self.config, code, &redirect_uri, received_state)
            .await?;
        self.load_profile(oauth, store).await
    }

    /// Fetch the profile for the session's credential and record the email
    ///
    /// Previously saved integration secrets for that email are recalled from
    /// the store.
    ///
    /// # Errors
    ///
    /// - `AppError::NotAuthenticated` without a credential
    /// - `AppError::ProfileFetch` if the provider lookup fails; the credential
    ///   and any previous profile are left unchanged
    /// - `AppError::Storage` if the store cannot be read; the profile is still
    ///   recorded
    pub async fn load_profile(
        &mut self,
        oauth: &dyn OAuthService,
        store: &dyn CredentialStore,
    ) -> Result<&UserProfile, AppError> {
        let profile = self.auth.fetch_profile(oauth).await?;
        let recalled = if self.integration.is_none() {
            store.load(&profile.email)
        } else {
            Ok(None)
        };
        self.profile = Some(profile);

        if let Some(stored) = recalled? {
            self.integration = Some(IntegrationSecrets {
                secret_a: stored.secret_a,
                secret_b: stored.secret_b,
            });
            self.push_notice(Notice::info("Your credentials are already saved."));
        }

        self.profile.as_ref().ok_or(AppError::NotAuthenticated)
    }

    /// Validate and persist the integration secrets for the session's email
    ///
    /// # Errors
    ///
    /// - `AppError::NotAuthenticated` before the profile is known
    /// - `AppError::InvalidInput` if either value is blank; the store is not called
    /// - `AppError::Storage` if the store fails
    pub fn save_integration_secrets(
        &mut self,
        store: &dyn CredentialStore,
        secret_a: &str,
        secret_b: &str,
    ) -> Result<(), AppError> {
        let email = self.email().ok_or(AppError::NotAuthenticated)?.to_string();

        let secret_a = secret_a.trim();
        let secret_b = secret_b.trim();
        if secret_a.is_empty() || secret_b.is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter both the integration secret and the page ID.".to_string(),
            ));
        }

        store.save(&email, secret_a, secret_b)?;
        self.integration = Some(IntegrationSecrets {
            secret_a: secret_a.to_string(),
            secret_b: secret_b.to_string(),
        });
        Ok(())
    }

    /// Send one user message and record the exchange
    ///
    /// The transcript only grows when the completion succeeds.
    ///
    /// # Errors
    ///
    /// - `AppError::NotAuthenticated` before login and saved secrets
    /// - `AppError::InvalidInput` for a blank message
    /// - `AppError::ChatCompletion` if the external call fails
    pub async fn send_chat_message(
        &mut self,
        chat: &dyn ChatService,
        message: &str,
    ) -> Result<&str, AppError> {
        if self.email().is_none() || !self.has_integration() {
            return Err(AppError::NotAuthenticated);
        }
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::InvalidInput("Type a message first.".to_string()));
        }

        let mut request = self.transcript.clone();
        request.push(ChatMessage::user(message));
        let reply = chat.complete(&request).await?;

        request.push(ChatMessage::assistant(reply));
        self.transcript = request;
        Ok(self
            .transcript
            .last()
            .map_or("", |reply| reply.content.as_str()))
    }

    /// The provider redirected back with an error instead of a code
    pub fn handle_provider_error(&mut self, error: &str, description: Option<&str>) {
        self.auth.reset();
        let message = match description {
            Some(description) => format!("Login was not completed: {error} ({description})"),
            None => format!("Login was not completed: {error}"),
        };
        self.push_notice(Notice::error(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock::{MockChatService, MockCredentialStore, MockOAuthService};
    use crate::testing::TestFixtures;

    async fn logged_in(store: &MockCredentialStore) -> SessionContext {
        let oauth = MockOAuthService::new("user@example.com");
        let mut context = TestFixtures::session_context();
        context.authorization_url().unwrap();
        context
            .complete_login(&oauth, store, "XYZ", None)
            .await
            .unwrap();
        context
    }

    #[tokio::test]
    async fn test_complete_login_records_email() {
        let store = MockCredentialStore::default();
        let context = logged_in(&store).await;

        assert!(context.auth().is_authenticated());
        assert_eq!(context.email(), Some("user@example.com"));
        assert!(!context.has_integration());
    }

    #[tokio::test]
    async fn test_profile_failure_after_exchange_stays_authenticated() {
        let oauth = MockOAuthService::failing_profile();
        let store = MockCredentialStore::default();
        let mut context = TestFixtures::session_context();

        let err = context
            .complete_login(&oauth, &store, "XYZ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProfileFetch(_)));
        assert!(context.auth().is_authenticated());
        assert!(context.email().is_none());
    }

    #[tokio::test]
    async fn test_saved_secrets_are_recalled_on_login() {
        let store = MockCredentialStore::default();
        store.save("user@example.com", "saved-a", "saved-b").unwrap();

        let mut context = logged_in(&store).await;
        assert!(context.has_integration());
        assert_eq!(
            context.take_notices(),
            vec![Notice::info("Your credentials are already saved.")]
        );
    }

    #[tokio::test]
    async fn test_blank_secrets_never_reach_the_store() {
        let store = MockCredentialStore::default();
        let mut context = logged_in(&store).await;

        for (a, b) in [("", "page"), ("secret", ""), ("   ", "page")] {
            let err = context.save_integration_secrets(&store, a, b).unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
        assert_eq!(store.save_calls(), 0);
        assert!(!context.has_integration());
    }

    #[tokio::test]
    async fn test_save_secrets_requires_profile() {
        let store = MockCredentialStore::default();
        let mut context = TestFixtures::session_context();

        let err = context
            .save_integration_secrets(&store, "a", "b")
            .unwrap_err();
        assert!(matches!(err, AppError::NotAuthenticated));
        assert_eq!(store.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_save_secrets_persists_for_email() {
        let store = MockCredentialStore::default();
        let mut context = logged_in(&store).await;

        context
            .save_integration_secrets(&store, " secret ", "page")
            .unwrap();
        assert!(context.has_integration());
        let stored = store.load("user@example.com").unwrap().unwrap();
        assert_eq!(stored.secret_a, "secret");
        assert_eq!(stored.secret_b, "page");
    }

    #[tokio::test]
    async fn test_chat_appends_both_turns() {
        let store = MockCredentialStore::default();
        let chat = MockChatService::echo();
        let mut context = logged_in(&store).await;
        context.save_integration_secrets(&store, "a", "b").unwrap();

        let reply = context.send_chat_message(&chat, "hello").await.unwrap();
        assert_eq!(reply, "echo: hello");
        assert_eq!(
            context.transcript(),
            [ChatMessage::user("hello"), ChatMessage::assistant("echo: hello")]
        );

        context.send_chat_message(&chat, "again").await.unwrap();
        // The whole transcript is sent each turn
        assert_eq!(chat.last_request_len(), 3);
    }

    #[tokio::test]
    async fn test_chat_failure_leaves_transcript_unchanged() {
        let store = MockCredentialStore::default();
        let chat = MockChatService::failing();
        let mut context = logged_in(&store).await;
        context.save_integration_secrets(&store, "a", "b").unwrap();

        let err = context.send_chat_message(&chat, "hello").await.unwrap_err();
        assert!(matches!(err, AppError::ChatCompletion(_)));
        assert!(context.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_chat_requires_saved_secrets() {
        let store = MockCredentialStore::default();
        let chat = MockChatService::echo();
        let mut context = logged_in(&store).await;

        let err = context.send_chat_message(&chat, "hello").await.unwrap_err();
        assert!(matches!(err, AppError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_form_open() {
        let oauth = MockOAuthService::new("user@example.com");
        let store = MockCredentialStore::default();
        let mut context = TestFixtures::session_context();
        context
            .complete_login(&oauth, &store, "XYZ", None)
            .await
            .unwrap();

        let failing = MockCredentialStore::failing();
        let err = context
            .save_integration_secrets(&failing, "secret", "page")
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(failing.save_calls(), 1);
        assert!(!context.has_integration());
    }

    #[tokio::test]
    async fn test_unreadable_store_still_records_profile() {
        let oauth = MockOAuthService::new("user@example.com");
        let store = MockCredentialStore::failing();
        let mut context = TestFixtures::session_context();

        let err = context
            .complete_login(&oauth, &store, "XYZ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(context.auth().is_authenticated());
        assert_eq!(context.email(), Some("user@example.com"));
        assert!(!context.has_integration());
        assert_eq!(oauth.profile_calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_credential_is_reported() {
        let store = MockCredentialStore::default();
        let mut context = TestFixtures::session_context();
        assert!(!context.credential_expired());

        context
            .complete_login(&MockOAuthService::with_expired_tokens(), &store, "XYZ", None)
            .await
            .unwrap();
        assert!(context.credential_expired());

        let fresh = logged_in(&store).await;
        assert!(!fresh.credential_expired());
    }

    #[test]
    fn test_provider_error_resets_and_notifies() {
        let mut context = TestFixtures::session_context();
        context.authorization_url().unwrap();

        context.handle_provider_error("access_denied", None);
        assert_eq!(context.auth().state().name(), "NoCredentials");

        let notices = context.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(notices[0].message.contains("access_denied"));
        assert!(context.take_notices().is_empty());
    }
}
