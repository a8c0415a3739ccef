// Centralized logging for the login flow
use log::{debug, error, info, warn};

use crate::models::AppError;

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log a successfully loaded client configuration
    pub fn log_client_config_loaded(path: &str, client_id: &str, scope_count: usize) {
        info!(
            "🔧 Loaded OAuth client configuration from {path} \
             (client_id={}, {scope_count} scopes)",
            Self::mask(client_id)
        );
    }

    /// Log a new browser session
    pub fn log_session_started(session_id: &str) {
        debug!("New session {session_id} bootstrapped");
    }

    /// Log authorization URL construction
    pub fn log_authorization_url_built(scopes: &str, pkce: bool) {
        info!("🔍 Built authorization URL with scopes: {scopes} (pkce={pkce})");
    }

    /// Log token exchange start
    pub fn log_token_exchange_start(token_uri: &str) {
        info!("🔄 Exchanging authorization code for tokens at {token_uri}");
    }

    /// Log token exchange summary
    pub fn log_token_exchange_summary(
        refresh_token: bool,
        id_token: bool,
        token_type: &str,
        scope: &str,
    ) {
        info!(
            "🔍 Token exchange summary: refresh_token={}, id_token={}, \
             token_type={token_type}, scope={scope}",
            if refresh_token { "present" } else { "missing" },
            if id_token { "present" } else { "missing" },
        );
    }

    /// Log the shape of a token endpoint response; the body is never written
    pub fn log_token_response(status: u16, response_text: &str) {
        debug!("{}", Self::token_response_summary(status, response_text));
    }

    #[must_use]
    pub fn token_response_summary(status: u16, response_text: &str) -> String {
        format!(
            "Token response: status {status}, {} bytes",
            response_text.len()
        )
    }

    /// Log profile fetch success
    pub fn log_profile_fetched(email: &str) {
        info!("👤 Fetched profile for {email}");
    }

    /// Log integration secrets persisted
    pub fn log_credentials_saved(email: &str) {
        info!("💾 Stored integration credentials for {email}");
    }

    /// Log chat completion round trip
    pub fn log_chat_completion(model: &str, transcript_len: usize, reply_len: usize) {
        debug!(
            "💬 Chat completion with {model}: {transcript_len} transcript messages, \
             {reply_len} reply chars"
        );
    }

    /// Log an error caught at the interaction boundary
    ///
    /// Configuration problems need an operator, so they go out at error level.
    pub fn log_interaction_error(session_id: &str, action: &str, err: &AppError) {
        if err.is_fatal() {
            error!(
                "Session {session_id}: {action} failed ({}): {err}",
                err.kind()
            );
        } else {
            warn!(
                "Session {session_id}: {action} failed ({}): {err}",
                err.kind()
            );
        }
    }

    /// Keep the first few characters of an identifier for log lines
    #[must_use]
    pub fn mask(value: &str) -> String {
        let visible: String = value.chars().take(6).collect();
        if visible.len() < value.len() {
            format!("{visible}…")
        } else {
            visible
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(LoggingHelper::mask("1234567890.apps"), "123456…");
        assert_eq!(LoggingHelper::mask("abc"), "abc");
    }

    #[test]
    fn test_token_response_summary_omits_body() {
        let body = r#"{"access_token":"ya29.secret","refresh_token":"1//refresh"}"#;
        let summary = LoggingHelper::token_response_summary(200, body);

        assert_eq!(summary, format!("Token response: status 200, {} bytes", body.len()));
        assert!(!summary.contains("ya29.secret"));
        assert!(!summary.contains("1//refresh"));
    }
}
