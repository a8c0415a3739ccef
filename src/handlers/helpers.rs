// Session lookup shared by the handlers
use actix_web::cookie::Cookie;
use actix_web::HttpRequest;
use log::debug;

use crate::models::AppError;
use crate::session::{CookieFactory, SessionContext, SharedSession};
use crate::state::AppState;

/// Session addressed by the request cookie, if it is still known
#[must_use]
pub fn existing_session(req: &HttpRequest, state: &AppState) -> Option<SharedSession> {
    let id = CookieFactory::session_id_from_request(req)?;
    let session = state.sessions.get(&id);
    if session.is_none() {
        debug!("Session cookie {id} does not match a live session");
    }
    session
}

/// Session for the request, bootstrapping a new one when needed
///
/// A new session comes with the cookie that must be set on the response.
///
/// # Errors
///
/// Returns `AppError::Configuration` if the client configuration cannot be
/// loaded; no session is created
pub fn resolve_session(
    req: &HttpRequest,
    state: &AppState,
) -> Result<(SharedSession, Option<Cookie<'static>>), AppError> {
    if let Some(session) = existing_session(req, state) {
        return Ok((session, None));
    }

    let context = SessionContext::bootstrap(&state.settings.oauth)?;
    let cookie = state.cookies.create_session_cookie(context.id());
    Ok((state.sessions.insert(context), Some(cookie)))
}
