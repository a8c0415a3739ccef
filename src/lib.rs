#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the loginflow application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod chat;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod session;
pub mod settings;
pub mod state;
pub mod storage;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use handlers::configure_services;
pub use models::{AppError, UserProfile};
pub use oauth::{ClientConfig, Credential};
pub use session::{AuthSession, SessionContext};
pub use settings::LoginflowSettings;
pub use state::AppState;
