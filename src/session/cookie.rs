use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;
use uuid::Uuid;

/// Name of the cookie carrying the session identifier
pub const COOKIE_NAME: &str = "loginflow_session";

/// Options for cookie creation
pub struct CookieOptions {
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age: Option<Duration>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age: None,
        }
    }
}

/// Builds the session cookie and reads it back from requests
///
/// The cookie holds only an opaque session id; all session data stays on the
/// server.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieFactory {
    cookie_secure: bool,
}

impl CookieFactory {
    #[must_use]
    pub fn new(cookie_secure: bool) -> Self {
        Self { cookie_secure }
    }

    #[must_use]
    pub fn create_cookie(
        &self,
        name: &str,
        value: String,
        options: CookieOptions,
    ) -> Cookie<'static> {
        let mut builder = Cookie::build(name.to_owned(), value)
            .http_only(options.http_only)
            .secure(self.cookie_secure)
            .same_site(options.same_site)
            .path(options.path);
        if let Some(max_age) = options.max_age {
            builder = builder.max_age(max_age);
        }
        builder.finish()
    }

    /// Browser-session cookie pointing at the server-side session
    #[must_use]
    pub fn create_session_cookie(&self, session_id: Uuid) -> Cookie<'static> {
        self.create_cookie(COOKIE_NAME, session_id.to_string(), CookieOptions::default())
    }

    /// Expired cookie to clear the session on sign out
    #[must_use]
    pub fn create_expired_cookie(&self) -> Cookie<'static> {
        self.create_cookie(
            COOKIE_NAME,
            String::new(),
            CookieOptions {
                max_age: Some(Duration::seconds(-1)),
                ..Default::default()
            },
        )
    }

    /// Session id carried by the request, if the cookie is present and well formed
    #[must_use]
    pub fn session_id_from_request(req: &HttpRequest) -> Option<Uuid> {
        let cookie = req.cookie(COOKIE_NAME)?;
        match Uuid::parse_str(cookie.value()) {
            Ok(id) => Some(id),
            Err(_) => {
                log::debug!("Ignoring malformed session cookie");
                None
            }
        }
    }
}
