//! Unified testing utilities for Loginflow
//!
//! - [`fixtures`] - Pre-built test data (client configuration, credentials, profiles, settings)
//! - [`mock`] - Fake implementations of the OAuth, storage and chat seams
//!
//! ## Usage
//!
//! ```rust
//! use loginflow::testing::{mock::MockOAuthService, TestFixtures};
//!
//! let mut context = TestFixtures::session_context();
//! let oauth = MockOAuthService::new("user@example.com");
//! ```

pub mod fixtures;
pub mod mock;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;

/// Common test constants
pub mod constants {
    /// Default test email address
    pub const TEST_EMAIL: &str = "user@example.com";

    /// Default test user name
    pub const TEST_USER_NAME: &str = "Test User";

    /// Default test subject identifier
    pub const TEST_SUBJECT: &str = "123456789";

    pub const TEST_CLIENT_ID: &str = "test-client-id.apps.googleusercontent.com";
    pub const TEST_CLIENT_SECRET: &str = "test-client-secret";
    pub const TEST_REDIRECT_URI: &str = "http://localhost:8501";

    /// Scopes requested by the demo
    pub const TEST_SCOPES: &[&str] = &[
        "https://www.googleapis.com/auth/userinfo.email",
        "https://www.googleapis.com/auth/userinfo.profile",
        "openid",
    ];
}
