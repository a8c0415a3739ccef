// Integration secrets form
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::helpers::existing_session;
use crate::models::AppError;
use crate::session::Notice;
use crate::state::AppState;
use crate::utils::logging::LoggingHelper;
use crate::utils::response_builder::ResponseBuilder;

#[derive(Deserialize, Debug)]
pub struct IntegrationForm {
    #[serde(default)]
    pub secret_a: String,
    #[serde(default)]
    pub secret_b: String,
}

/// Save the integration secrets for the logged-in email
pub async fn save_integration(
    req: HttpRequest,
    form: web::Form<IntegrationForm>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let Some(session) = existing_session(&req, &state) else {
        return ResponseBuilder::redirect("/", None);
    };
    let mut context = session.lock().await;

    let saved = context.save_integration_secrets(
        state.credentials.as_ref(),
        &form.secret_a,
        &form.secret_b,
    );
    match saved {
        Ok(()) => context.push_notice(Notice::success("Credentials saved successfully!")),
        Err(err @ AppError::InvalidInput(_)) => {
            context.push_notice(Notice::error(err.to_string()));
        }
        Err(err) => {
            let session_id = context.id().to_string();
            LoggingHelper::log_interaction_error(&session_id, "save_integration", &err);
            context.push_notice(Notice::error(err.to_string()));
        }
    }
    ResponseBuilder::redirect("/", None)
}
