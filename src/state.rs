use std::sync::Arc;

use crate::chat::{ChatCompletionClient, ChatService};
use crate::oauth::{OAuthService, OAuthServiceImpl};
use crate::session::{CookieFactory, SessionStore};
use crate::settings::LoginflowSettings;
use crate::storage::{self, CredentialStore};

/// Shared application state handed to every handler
///
/// Collaborators sit behind traits so tests can swap in mocks.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<LoginflowSettings>,
    pub sessions: SessionStore,
    pub oauth: Arc<dyn OAuthService>,
    pub credentials: Arc<dyn CredentialStore>,
    pub chat: Arc<dyn ChatService>,
    pub cookies: CookieFactory,
}

impl AppState {
    #[must_use]
    pub fn new(
        settings: LoginflowSettings,
        oauth: Arc<dyn OAuthService>,
        credentials: Arc<dyn CredentialStore>,
        chat: Arc<dyn ChatService>,
    ) -> Self {
        let cookies = CookieFactory::new(settings.cookies.secure);
        let sessions = SessionStore::with_idle_timeout(settings.session.idle_timeout());
        Self {
            settings: Arc::new(settings),
            sessions,
            oauth,
            credentials,
            chat,
            cookies,
        }
    }

    /// Wire the production collaborators from settings
    #[must_use]
    pub fn from_settings(settings: LoginflowSettings) -> Self {
        let oauth = Arc::new(OAuthServiceImpl::from_settings(&settings.oauth));
        let credentials = storage::from_settings(&settings.storage);
        let chat = Arc::new(ChatCompletionClient::from_settings(&settings.chat));
        Self::new(settings, oauth, credentials, chat)
    }
}
