#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::warn;
use loginflow::{configure_services, AppState, LoginflowSettings};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = LoginflowSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    // Sessions bootstrap the client configuration themselves; a missing file
    // only shows up once a browser connects
    if !Path::new(&settings.oauth.client_secrets_file).exists() {
        warn!(
            "Client secrets file {} not found; every session will fail to start",
            settings.oauth.client_secrets_file
        );
    }

    start_server(settings).await
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(settings: LoginflowSettings) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let state = web::Data::new(AppState::from_settings(settings));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &LoginflowSettings) {
    println!("Starting Loginflow {} on http://{bind_address}", loginflow::VERSION);
    println!();
    println!("Endpoints:");
    println!("  GET  /             - Login, profile, integration and chat screens");
    println!("  GET  /profile      - Retry the profile lookup");
    println!("  POST /integration  - Save integration credentials");
    println!("  POST /chat         - Send a chat message");
    println!("  GET  /sign_out     - Clear session");
    println!("  GET  /ping         - Health check");
    println!();
    println!("Redirect URI registered with the provider:");
    println!("  {}", settings.oauth.redirect_uri);
    println!("Credential storage: {:?}", settings.storage.backend);
}
