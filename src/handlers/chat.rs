// Chat screen submissions
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::helpers::existing_session;
use crate::session::Notice;
use crate::state::AppState;
use crate::utils::logging::LoggingHelper;
use crate::utils::response_builder::ResponseBuilder;

#[derive(Deserialize, Debug)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

/// Send one chat message; the reply shows up on the next render
pub async fn send_message(
    req: HttpRequest,
    form: web::Form<ChatForm>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let Some(session) = existing_session(&req, &state) else {
        return ResponseBuilder::redirect("/", None);
    };
    let mut context = session.lock().await;

    if let Some(err) = context
        .send_chat_message(state.chat.as_ref(), &form.message)
        .await
        .err()
    {
        LoggingHelper::log_interaction_error(&context.id().to_string(), "chat", &err);
        context.push_notice(Notice::error(err.to_string()));
    }
    ResponseBuilder::redirect("/", None)
}
