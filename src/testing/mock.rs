//! Mock objects and fake implementations for testing
//!
//! Each mock records how it was called so tests can assert on side effects
//! (for example that a rejected form never reached the store).

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::fixtures::TestFixtures;
use crate::chat::{ChatMessage, ChatRole, ChatService};
use crate::models::{AppError, UserProfile};
use crate::oauth::{ClientConfig, Credential, OAuthService};
use crate::storage::memory::InMemoryCredentialStore;
use crate::storage::{CredentialStore, StoredCredentials};

/// Provider fake: every code exchanges once, for a credential named after it
#[derive(Debug, Default)]
pub struct MockOAuthService {
    email: String,
    fail_profile: bool,
    expired_tokens: bool,
    used_codes: Mutex<HashSet<String>>,
    verifiers: Mutex<Vec<Option<String>>>,
    exchange_calls: AtomicUsize,
    profile_calls: AtomicUsize,
}

impl MockOAuthService {
    /// Code the provider always rejects
    pub const INVALID_CODE: &'static str = "invalid-code";

    #[must_use]
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            ..Self::default()
        }
    }

    /// Exchanges succeed but the userinfo lookup answers 401
    #[must_use]
    pub fn failing_profile() -> Self {
        Self {
            fail_profile: true,
            ..Self::new("user@example.com")
        }
    }

    /// Exchanges hand out credentials whose lifetime has already passed
    #[must_use]
    pub fn with_expired_tokens() -> Self {
        Self {
            expired_tokens: true,
            ..Self::new("user@example.com")
        }
    }

    #[must_use]
    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    /// PKCE verifiers received, one entry per exchange call
    #[must_use]
    pub fn received_verifiers(&self) -> Vec<Option<String>> {
        self.verifiers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl OAuthService for MockOAuthService {
    async fn exchange_code(
        &self,
        config: &ClientConfig,
        code: &str,
        _redirect_uri: &str,
        code_verifier: Option<&str>,
    ) -> Result<Credential, AppError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        self.verifiers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(code_verifier.map(ToString::to_string));

        if code.is_empty() || code == Self::INVALID_CODE {
            return Err(AppError::AuthExchange("HTTP 400: invalid_grant".to_string()));
        }
        let first_use = self
            .used_codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(code.to_string());
        if !first_use {
            return Err(AppError::AuthExchange(
                "HTTP 400: invalid_grant (Code was already redeemed.)".to_string(),
            ));
        }

        Ok(Credential {
            access_token: format!("access-{code}"),
            token_uri: config.token_uri().to_string(),
            client_id: config.client_id().to_string(),
            client_secret: config.client_secret().to_string(),
            scopes: config.scopes().to_vec(),
            expires_at: Some(if self.expired_tokens {
                Utc::now() - Duration::minutes(5)
            } else {
                Utc::now() + Duration::hours(1)
            }),
            ..TestFixtures::credential()
        })
    }

    async fn fetch_profile(&self, _credential: &Credential) -> Result<UserProfile, AppError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_profile {
            return Err(AppError::ProfileFetch("HTTP 401".to_string()));
        }
        Ok(TestFixtures::profile_for(&self.email))
    }
}

/// In-memory store that counts writes and can be told to fail
#[derive(Debug, Default)]
pub struct MockCredentialStore {
    inner: InMemoryCredentialStore,
    save_calls: AtomicUsize,
    fail: bool,
}

impl MockCredentialStore {
    /// Every operation returns a storage error
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }
}

impl CredentialStore for MockCredentialStore {
    fn save(&self, email: &str, secret_a: &str, secret_b: &str) -> Result<(), AppError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Storage("disk full".to_string()));
        }
        self.inner.save(email, secret_a, secret_b)
    }

    fn load(&self, email: &str) -> Result<Option<StoredCredentials>, AppError> {
        if self.fail {
            return Err(AppError::Storage("disk unreadable".to_string()));
        }
        self.inner.load(email)
    }
}

/// Chat fake answering `echo: <last user message>`
#[derive(Debug, Default)]
pub struct MockChatService {
    fail: bool,
    last_request_len: AtomicUsize,
}

impl MockChatService {
    #[must_use]
    pub fn echo() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Transcript length of the most recent request
    #[must_use]
    pub fn last_request_len(&self) -> usize {
        self.last_request_len.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatService for MockChatService {
    async fn complete(&self, transcript: &[ChatMessage]) -> Result<String, AppError> {
        self.last_request_len.store(transcript.len(), Ordering::SeqCst);
        if self.fail {
            return Err(AppError::ChatCompletion("HTTP 500".to_string()));
        }
        let last_user = transcript
            .iter()
            .rev()
            .find(|message| message.role == ChatRole::User)
            .map_or("", |message| message.content.as_str());
        Ok(format!("echo: {last_user}"))
    }
}
