// HTTP request handlers for the login flow
pub mod auth;
pub mod chat;
pub mod helpers;
pub mod home;
pub mod integration;
pub mod pages;
pub mod static_files;

use actix_web::web;

// Re-export the main handler functions
pub use auth::sign_out;
pub use chat::send_message;
pub use home::{home, refresh_profile};
pub use integration::save_integration;
pub use static_files::health;

/// Register every route of the application
pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home))
        .route("/profile", web::get().to(refresh_profile))
        .route("/integration", web::post().to(save_integration))
        .route("/chat", web::post().to(send_message))
        .route("/sign_out", web::get().to(sign_out))
        .route("/ping", web::get().to(health));
}
