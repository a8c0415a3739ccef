// End-to-end authorization-code flow against a mock provider
use loginflow::models::AppError;
use loginflow::oauth::{ClientConfig, OAuthServiceImpl};
use loginflow::session::{AuthSession, AuthState};
use loginflow::testing::constants::{TEST_CLIENT_ID, TEST_REDIRECT_URI, TEST_SCOPES};
use loginflow::testing::TestFixtures;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn query_values(url: &str, key: &str) -> Vec<String> {
    Url::parse(url)
        .expect("authorization URL parses")
        .query_pairs()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .collect()
}

fn token_body(access_token: &str) -> serde_json::Value {
    json!({
        "access_token": access_token,
        "refresh_token": "1//refresh-token",
        "id_token": "header.payload.signature",
        "token_type": "Bearer",
        "expires_in": 3599,
        "scope": TEST_SCOPES.join(" ")
    })
}

async fn mount_userinfo(server: &MockServer, access_token: &str, status: u16) {
    let response = if status == 200 {
        ResponseTemplate::new(200).set_body_json(TestFixtures::userinfo_claims("user@example.com"))
    } else {
        ResponseTemplate::new(status).set_body_json(json!({"error": "invalid_token"}))
    };
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("authorization", format!("Bearer {access_token}").as_str()))
        .respond_with(response)
        .mount(server)
        .await;
}

fn service_for(server: &MockServer) -> OAuthServiceImpl {
    OAuthServiceImpl::new(&format!("{}/userinfo", server.uri()))
}

#[test]
fn test_authorization_url_requests_offline_consent() {
    let config = TestFixtures::client_config();
    let mut session = AuthSession::new(true);
    let url = session.begin_authorization(&config).unwrap();

    assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
    assert_eq!(query_values(&url, "response_type"), ["code"]);
    assert_eq!(query_values(&url, "client_id"), [TEST_CLIENT_ID]);
    assert_eq!(query_values(&url, "redirect_uri"), [TEST_REDIRECT_URI]);
    assert_eq!(query_values(&url, "prompt"), ["consent"]);
    assert_eq!(query_values(&url, "access_type"), ["offline"]);
    assert_eq!(query_values(&url, "code_challenge_method"), ["S256"]);
    assert_eq!(query_values(&url, "state").len(), 1);
}

#[test]
fn test_each_scope_appears_exactly_once() {
    let config = ClientConfig::new(
        TEST_CLIENT_ID,
        "secret",
        "https://accounts.google.com/o/oauth2/auth",
        "https://oauth2.googleapis.com/token",
        TEST_REDIRECT_URI,
        ["openid", "email", "openid", "profile", "email"],
    )
    .unwrap();
    let url = AuthSession::new(false).begin_authorization(&config).unwrap();

    let scope = query_values(&url, "scope").pop().unwrap();
    let scopes: Vec<&str> = scope.split(' ').collect();
    assert_eq!(scopes, ["openid", "email", "profile"]);
}

#[tokio::test]
async fn test_login_with_code_resolves_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=XYZ"))
        .and(body_string_contains("code_verifier="))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("ya29.token")))
        .expect(1)
        .mount(&server)
        .await;
    mount_userinfo(&server, "ya29.token", 200).await;

    let config = TestFixtures::client_config_for(&server.uri());
    let service = service_for(&server);
    let mut session = AuthSession::new(true);
    let url = session.begin_authorization(&config).unwrap();
    let state = query_values(&url, "state").pop().unwrap();

    let credential = session
        .exchange_code(&service, &config, "XYZ", config.redirect_uri(), Some(state.as_str()))
        .await
        .unwrap();
    assert_eq!(credential.access_token, "ya29.token");
    assert_eq!(credential.refresh_token.as_deref(), Some("1//refresh-token"));
    assert_eq!(credential.scopes, TEST_SCOPES);
    assert!(!credential.is_expired());
    assert!(matches!(session.state(), AuthState::Authenticated(_)));

    let profile = session.fetch_profile(&service).await.unwrap();
    assert_eq!(profile.email, "user@example.com");
    assert_eq!(profile.claims["email_verified"], json!(true));
}

#[tokio::test]
async fn test_reused_code_is_rejected_by_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("ya29.first")))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Bad Request"
        })))
        .mount(&server)
        .await;

    let config = TestFixtures::client_config_for(&server.uri());
    let service = service_for(&server);

    let mut first = AuthSession::new(false);
    first
        .exchange_code(&service, &config, "XYZ", config.redirect_uri(), None)
        .await
        .unwrap();

    // A second session replaying the same code
    let mut second = AuthSession::new(false);
    let err = second
        .exchange_code(&service, &config, "XYZ", config.redirect_uri(), None)
        .await
        .unwrap_err();

    match err {
        AppError::AuthExchange(message) => {
            assert_eq!(message, "HTTP 400: invalid_grant (Bad Request)");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(second.state(), AuthState::NoCredentials));
    assert!(first.is_authenticated());
}

#[tokio::test]
async fn test_unauthorized_userinfo_keeps_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("ya29.revoked")))
        .mount(&server)
        .await;
    mount_userinfo(&server, "ya29.revoked", 401).await;

    let config = TestFixtures::client_config_for(&server.uri());
    let service = service_for(&server);
    let mut session = AuthSession::new(false);
    session
        .exchange_code(&service, &config, "XYZ", config.redirect_uri(), None)
        .await
        .unwrap();
    let before = session.credential().cloned();

    let err = session.fetch_profile(&service).await.unwrap_err();
    assert!(matches!(err, AppError::ProfileFetch(ref message) if message == "HTTP 401"));
    assert_eq!(session.credential().cloned(), before);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_token_endpoint_failure_returns_to_no_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = TestFixtures::client_config_for(&server.uri());
    let service = service_for(&server);
    let mut session = AuthSession::new(true);
    session.begin_authorization(&config).unwrap();

    let err = session
        .exchange_code(&service, &config, "XYZ", config.redirect_uri(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AuthExchange(ref message) if message == "HTTP 500"));
    assert!(matches!(session.state(), AuthState::NoCredentials));
}
