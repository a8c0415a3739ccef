use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoginflowSettings {
    pub application: ApplicationSettings,
    pub oauth: OAuthSettings,
    pub storage: StorageSettings,
    pub chat: ChatSettings,
    pub session: SessionSettings,
    pub cookies: CookieSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    /// Client secrets JSON as downloaded from the provider console
    pub client_secrets_file: String,
    /// Loopback URL the provider redirects back to. Falls back to the first
    /// `redirect_uris` entry of the client secrets file when empty.
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub userinfo_endpoint: String,
    pub use_pkce: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub credentials_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub api_base_url: String,

    // Direct value (can be overridden by the environment variable below)
    pub api_key: Option<String>,
    pub api_key_env: Option<String>,

    pub model: String,
    pub system_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Sessions untouched for this long are forgotten
    pub idle_timeout_minutes: u64,
}

impl SessionSettings {
    #[must_use]
    pub fn idle_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.idle_timeout_minutes.saturating_mul(60))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_secrets_file: "credentials/client_secrets.json".to_string(),
            redirect_uri: "http://localhost:8501".to_string(),
            scopes: vec![
                "https://www.googleapis.com/auth/userinfo.profile".to_string(),
                "https://www.googleapis.com/auth/userinfo.email".to_string(),
                "openid".to_string(),
            ],
            userinfo_endpoint: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
            use_pkce: true,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            credentials_file: "user_credentials.json".to_string(),
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            model: "gpt-3.5-turbo".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: 60,
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        // The demo runs on a plain-http loopback address
        Self { secure: false }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoginflowSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Logger initialization fails
    /// - Settings file cannot be read or parsed
    pub fn load() -> Result<Self> {
        Self::load_env_file();

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        Self::init_logging(&settings.logging)?;
        Ok(settings)
    }

    /// Initialize `env_logger` with the configured level as the default filter
    fn init_logging(logging: &LoggingSettings) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(logging.level.as_str()),
        )
        .try_init()
        .context("Failed to initialize logger")
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `LOGINFLOW_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    fn load_base_settings() -> Result<Self> {
        let mut settings = Self::default();

        let default_config_path = PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_toml_file(&default_config_path)?;
            println!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(secrets_dir) = std::env::var("LOGINFLOW_SECRETS_DIR") {
            let secrets_path = Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::from_toml_file(&secrets_path)?;
                println!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                println!(
                    "ℹ LOGINFLOW_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse a settings file; missing sections and fields keep their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let toml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        basic_toml::from_str(&toml_content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_oauth_env_overrides(&mut settings.oauth);
        Self::apply_storage_env_overrides(&mut settings.storage);
        Self::apply_chat_env_overrides(&mut settings.chat);

        if let Ok(timeout_str) = std::env::var("SESSION_IDLE_TIMEOUT_MINUTES") {
            if let Ok(minutes) = timeout_str.parse::<u64>() {
                settings.session.idle_timeout_minutes = minutes;
            }
        }

        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                settings.cookies.secure = cookie_secure;
            }
        }
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            settings.logging.level = log_level;
        }
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
    }

    fn apply_oauth_env_overrides(oauth_settings: &mut OAuthSettings) {
        Self::apply_string_env_override(
            "CLIENT_SECRETS_FILE",
            &mut oauth_settings.client_secrets_file,
        );
        Self::apply_string_env_override("REDIRECT_URI", &mut oauth_settings.redirect_uri);
        Self::apply_string_env_override(
            "USERINFO_ENDPOINT",
            &mut oauth_settings.userinfo_endpoint,
        );
    }

    fn apply_storage_env_overrides(storage_settings: &mut StorageSettings) {
        Self::apply_string_env_override(
            "CREDENTIALS_FILE",
            &mut storage_settings.credentials_file,
        );
        match std::env::var("STORAGE_BACKEND").as_deref() {
            Ok("file") => storage_settings.backend = StorageBackend::File,
            Ok("memory") => storage_settings.backend = StorageBackend::Memory,
            Ok(other) => log::warn!("Ignoring unknown STORAGE_BACKEND value: {other}"),
            Err(_) => {}
        }
    }

    fn apply_chat_env_overrides(chat_settings: &mut ChatSettings) {
        Self::apply_string_env_override("CHAT_API_BASE_URL", &mut chat_settings.api_base_url);
        Self::apply_string_env_override("CHAT_MODEL", &mut chat_settings.model);
    }

    /// Helper function to apply non-empty string environment variable overrides
    fn apply_string_env_override(env_var: &str, target: &mut String) {
        if let Ok(value) = std::env::var(env_var) {
            if !value.is_empty() {
                *target = value;
            }
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }
}

impl ChatSettings {
    /// Get the API key, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(env_var) = &self.api_key_env {
            if let Ok(value) = std::env::var(env_var) {
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
        self.api_key.clone().filter(|key| !key.is_empty())
    }
}
