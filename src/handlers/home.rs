// Landing page and provider redirect
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error, info};

use super::helpers::{existing_session, resolve_session};
use super::pages;
use crate::models::AppError;
use crate::oauth::OAuthCallback;
use crate::session::{Notice, SessionContext};
use crate::state::AppState;
use crate::utils::logging::LoggingHelper;
use crate::utils::response_builder::ResponseBuilder;

/// Render the screen for the session's state
///
/// When the request is the provider redirect (`code` or `error` present), the
/// redirect is processed first and the browser is sent back to `/` so the
/// code never stays in the address bar.
pub async fn home(
    req: HttpRequest,
    query: web::Query<OAuthCallback>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let (session, cookie) = match resolve_session(&req, &state) {
        Ok(resolved) => resolved,
        Err(err) => {
            error!("Unable to start session: {err}");
            return ResponseBuilder::fatal_html(pages::fatal_page(&err));
        }
    };
    let mut context = session.lock().await;

    let callback = query.into_inner();
    if callback.is_redirect() {
        handle_redirect(&mut context, &state, callback).await;
        return ResponseBuilder::redirect_with_cookie("/", cookie);
    }

    match render(&mut context) {
        Ok(body) => ResponseBuilder::html(body, cookie),
        Err(err) => {
            error!("Unable to build the authorization URL: {err}");
            ResponseBuilder::fatal_html(pages::fatal_page(&err))
        }
    }
}

/// Retry the profile lookup for an authenticated session
pub async fn refresh_profile(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let Some(session) = existing_session(&req, &state) else {
        return ResponseBuilder::redirect("/", None);
    };
    let mut context = session.lock().await;

    if let Some(err) = context
        .load_profile(state.oauth.as_ref(), state.credentials.as_ref())
        .await
        .err()
    {
        LoggingHelper::log_interaction_error(&context.id().to_string(), "profile", &err);
        context.push_notice(Notice::error(err.to_string()));
    }
    ResponseBuilder::redirect("/", None)
}

async fn handle_redirect(context: &mut SessionContext, state: &AppState, callback: OAuthCallback) {
    let session_id = context.id().to_string();

    // A reload of the redirect URL after login carries a spent code
    if context.auth().is_authenticated() {
        debug!("Session {session_id} is already logged in; ignoring redirect");
        return;
    }

    if let Some(error) = callback.error.as_deref() {
        info!("Provider returned an error for session {session_id}: {error}");
        context.handle_provider_error(error, callback.error_description.as_deref());
        return;
    }

    let Some(code) = callback.code.as_deref() else {
        return;
    };

    match context
        .complete_login(
            state.oauth.as_ref(),
            state.credentials.as_ref(),
            code,
            callback.state.as_deref(),
        )
        .await
        .map(|profile| profile.email.clone())
    {
        Ok(email) => info!("Session {session_id} logged in as {email}"),
        Err(err) => {
            LoggingHelper::log_interaction_error(&session_id, "login", &err);
            context.push_notice(Notice::error(err.to_string()));
        }
    }
}

fn render(context: &mut SessionContext) -> Result<String, AppError> {
    if !context.auth().is_authenticated() {
        let url = context.authorization_url()?;
        return Ok(pages::login_page(&url, &context.take_notices()));
    }

    if context.credential_expired() {
        context.push_notice(Notice::info(
            "Your Google sign-in has expired. Sign out and log in again to renew it.",
        ));
    }
    let notices = context.take_notices();
    Ok(match context.profile() {
        None => pages::profile_unavailable_page(&notices),
        Some(profile) if context.has_integration() => {
            pages::chat_page(profile, context.transcript(), &notices)
        }
        Some(profile) => pages::integration_page(profile, &notices),
    })
}
