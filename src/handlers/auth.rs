// Sign out
use actix_web::{web, HttpRequest, HttpResponse};
use log::info;

use crate::session::CookieFactory;
use crate::state::AppState;
use crate::utils::response_builder::ResponseBuilder;

/// Drop the server-side session and clear the cookie
pub async fn sign_out(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Some(id) = CookieFactory::session_id_from_request(&req) {
        if state.sessions.remove(&id).is_some() {
            info!("Session {id} signed out");
        }
    }
    ResponseBuilder::redirect_with_cookie("/", Some(state.cookies.create_expired_cookie()))
}
