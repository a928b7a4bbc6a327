use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
    /// Base URL of the guest-facing site, used to build `{public_url}/event/{slug}`.
    pub public_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    /// Users whose case-folded email equals this are admins.
    pub admin_email: Option<String>,
}

impl AuthConfig {
    /// The single admin predicate: explicit flag or configured admin email.
    pub fn is_admin(&self, email: &str, flag: bool) -> bool {
        flag || self
            .admin_email
            .as_deref()
            .is_some_and(|admin| admin.trim().eq_ignore_ascii_case(email.trim()))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    /// Hard ceiling for a single upload, in bytes.
    pub max_upload_size: u64,
    /// Videos strictly larger than this are transcoded after upload.
    pub transcode_threshold: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranscoderConfig {
    pub ffmpeg_bin: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CardConfig {
    pub font_path: Option<PathBuf>,
}

/// Defaults for the persisted SMTP settings row, applied only when the row is
/// first created.
#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: Option<String>,
    pub from_email: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub card: CardConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("server.public_url", "http://localhost:3000")?
            .set_default("auth.token_ttl_days", 30)?
            .set_default("storage.upload_dir", "./uploads")?
            .set_default("storage.max_upload_size", 200 * MIB)?
            .set_default("storage.transcode_threshold", 80 * MIB)?
            .set_default("transcoder.ffmpeg_bin", "ffmpeg")?
            .set_default("transcoder.timeout_secs", 600)?
            .set_default("mail.smtp_host", "smtp.hostinger.com")?
            .set_default("mail.smtp_port", 465)?
            .set_default("mail.smtp_user", "")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., SNAPVAULT__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("SNAPVAULT").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Public guest page for an event.
    pub fn guest_url(&self, slug: &str) -> String {
        format!(
            "{}/event/{}",
            self.server.public_url.trim_end_matches('/'),
            slug
        )
    }
}
