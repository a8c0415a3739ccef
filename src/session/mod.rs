//! Session Management Module
//!
//! - [`auth_session`] - authorization-code grant state machine
//! - [`context`] - everything one browser session knows
//! - [`store`] - server-side registry of sessions
//! - [`cookie`] - session cookie handling

pub mod auth_session;
pub mod context;
pub mod cookie;
pub mod store;

pub use auth_session::{AuthSession, AuthState, PendingAuthorization};
pub use context::{Notice, NoticeLevel, SessionContext};
pub use cookie::{CookieFactory, CookieOptions, COOKIE_NAME};
pub use store::{SessionStore, SharedSession};
