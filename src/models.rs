use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod auth;

pub use auth::AppError;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Identity claims returned by the provider's userinfo endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub sub: Option<String>,
    /// Every claim as returned by the provider, including the ones above
    pub claims: Map<String, Value>,
}

impl UserProfile {
    /// Build a profile from a userinfo JSON body
    ///
    /// # Errors
    ///
    /// Returns `AppError::ProfileFetch` if the body is not a JSON object or has
    /// no string `email` claim
    pub fn from_claims(body: Value) -> Result<Self, AppError> {
        let Value::Object(claims) = body else {
            return Err(AppError::ProfileFetch(
                "userinfo response is not a JSON object".to_string(),
            ));
        };

        let email = claims
            .get("email")
            .and_then(Value::as_str)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| {
                AppError::ProfileFetch("userinfo response has no email claim".to_string())
            })?
            .to_string();

        let string_claim = |key: &str| claims.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            email,
            name: string_claim("name"),
            picture: string_claim("picture"),
            sub: string_claim("sub"),
            claims,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_from_full_claims() {
        let profile = UserProfile::from_claims(json!({
            "sub": "1234567890",
            "email": "user@example.com",
            "email_verified": true,
            "name": "Test User",
            "picture": "https://example.com/p.png"
        }))
        .unwrap();

        assert_eq!(profile.email, "user@example.com");
        assert_eq!(profile.name.as_deref(), Some("Test User"));
        assert_eq!(profile.sub.as_deref(), Some("1234567890"));
        assert_eq!(profile.claims["email_verified"], json!(true));
    }

    #[test]
    fn test_profile_requires_email() {
        let result = UserProfile::from_claims(json!({"sub": "123"}));
        assert!(matches!(result, Err(AppError::ProfileFetch(_))));

        let result = UserProfile::from_claims(json!({"email": 42}));
        assert!(matches!(result, Err(AppError::ProfileFetch(_))));
    }

    #[test]
    fn test_profile_rejects_non_object_body() {
        let result = UserProfile::from_claims(json!(["user@example.com"]));
        assert!(matches!(result, Err(AppError::ProfileFetch(_))));
    }
}
