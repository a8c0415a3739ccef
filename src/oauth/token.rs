//! Authorization code → token exchange

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::AppError;
use crate::oauth::ClientConfig;
use crate::utils::logging::LoggingHelper;

/// Token material obtained from a successful code exchange
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub token_type: String,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Whether the provider-reported lifetime has passed.
    /// Nothing refreshes an expired credential; callers only report it.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= Utc::now())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("id_token", &self.id_token.as_ref().map(|_| "[redacted]"))
            .field("token_type", &self.token_type)
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("scopes", &self.scopes)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    id_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Exchange an authorization code at the configured token endpoint
///
/// # Errors
///
/// Returns `AppError::AuthExchange` if:
/// - The code is empty
/// - The HTTP request fails
/// - The provider rejects the code (expired, reused, redirect URI mismatch)
/// - The response does not contain an access token
pub async fn exchange_authorization_code(
    http_client: &reqwest::Client,
    config: &ClientConfig,
    code: &str,
    redirect_uri: &str,
    code_verifier: Option<&str>,
) -> Result<Credential, AppError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::AuthExchange("authorization code is empty".to_string()));
    }

    let mut params = vec![
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("client_id", config.client_id()),
        ("client_secret", config.client_secret()),
    ];
    if let Some(verifier) = code_verifier {
        params.push(("code_verifier", verifier));
    }

    LoggingHelper::log_token_exchange_start(config.token_uri());
    let response = http_client
        .post(config.token_uri())
        .form(&params)
        .send()
        .await
        .map_err(|e| AppError::AuthExchange(format!("token request failed: {e}")))?;

    let status = response.status();
    let response_text = response
        .text()
        .await
        .map_err(|e| AppError::AuthExchange(format!("failed to read token response: {e}")))?;
    LoggingHelper::log_token_response(status.as_u16(), &response_text);

    if !status.is_success() {
        return Err(AppError::AuthExchange(describe_token_error(
            status.as_u16(),
            &response_text,
        )));
    }

    let token_response: TokenResponse = serde_json::from_str(&response_text)
        .map_err(|e| AppError::AuthExchange(format!("invalid token response: {e}")))?;
    if token_response.access_token.is_empty() {
        return Err(AppError::AuthExchange(
            "token response has an empty access_token".to_string(),
        ));
    }

    let scopes = token_response.scope.as_deref().map_or_else(
        || config.scopes().to_vec(),
        |scope| scope.split_whitespace().map(str::to_string).collect(),
    );
    let token_type = token_response
        .token_type
        .unwrap_or_else(|| "Bearer".to_string());

    LoggingHelper::log_token_exchange_summary(
        token_response.refresh_token.is_some(),
        token_response.id_token.is_some(),
        &token_type,
        &scopes.join(" "),
    );

    let expires_at = token_response
        .expires_in
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(chrono::Duration::try_seconds)
        .map(|lifetime| Utc::now() + lifetime);

    Ok(Credential {
        access_token: token_response.access_token,
        refresh_token: token_response.refresh_token,
        id_token: token_response.id_token,
        token_type,
        token_uri: config.token_uri().to_string(),
        client_id: config.client_id().to_string(),
        client_secret: config.client_secret().to_string(),
        scopes,
        expires_at,
    })
}

fn describe_token_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(TokenErrorResponse {
            error,
            error_description: Some(description),
        }) => format!("HTTP {status}: {error} ({description})"),
        Ok(TokenErrorResponse { error, .. }) => format!("HTTP {status}: {error}"),
        Err(_) => format!("HTTP {status}"),
    }
}
