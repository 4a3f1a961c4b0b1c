//! Configuration loading with layered overrides.
//!
//! Config is loaded in order (each layer overrides the previous):
//! 1. Default values
//! 2. Config file (TOML)
//! 3. Environment variables
//! 4. CLI arguments
//!
//! The JWT secret is never read from config files; it must come from the
//! environment or a CLI argument.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Config shared between request handlers.
pub type SharedConfig = Arc<Config>;

/// Gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub acl: Acl,
    #[serde(default)]
    pub session: Session,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed to read responses cross-site. Empty disables CORS.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Session token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auth {
    /// HS256 secret shared with the portal API.
    /// Must be provided via environment variable or CLI - never from config file.
    #[serde(default)]
    pub jwt_secret: String,

    /// Token expiry in days.
    #[serde(default = "default_token_expiry_days")]
    pub token_expiry_days: u32,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_days: default_token_expiry_days(),
        }
    }
}

fn default_token_expiry_days() -> u32 {
    1
}

/// Ability policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acl {
    /// Role slug that is granted `manage:all`.
    #[serde(default = "default_super_admin_slug")]
    pub super_admin_slug: String,

    /// Subjects every restricted role may read regardless of its rules.
    #[serde(default = "default_baseline_subjects")]
    pub baseline_subjects: Vec<String>,

    /// Where a signed-in admin landing on `/` is sent.
    #[serde(default = "default_home_route")]
    pub home_route: String,
}

impl Default for Acl {
    fn default() -> Self {
        Self {
            super_admin_slug: default_super_admin_slug(),
            baseline_subjects: default_baseline_subjects(),
            home_route: default_home_route(),
        }
    }
}

fn default_super_admin_slug() -> String {
    "super_admin".to_string()
}

fn default_baseline_subjects() -> Vec<String> {
    vec!["home".to_string(), "acl-page".to_string()]
}

fn default_home_route() -> String {
    "/home".to_string()
}

/// Session profile storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Directory for stored admin profiles. Profiles are kept in memory when unset.
    #[serde(default)]
    pub store_dir: Option<PathBuf>,
}

/// CLI values layered over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides<'a> {
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub jwt_secret: Option<&'a str>,
    pub store_dir: Option<&'a Path>,
}

/// Builder for loading configuration with customizable options.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix (e.g., "KOLIWADA" -> KOLIWADA_HOST, KOLIWADA_PORT)
    pub env_prefix: String,
    /// Name of the JWT secret environment variable (without prefix)
    pub jwt_secret_env: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            env_prefix: "KOLIWADA".to_string(),
            jwt_secret_env: "JWT_SECRET".to_string(),
        }
    }
}

impl ConfigLoader {
    /// Create a new config loader with the given environment prefix.
    pub fn new(env_prefix: impl Into<String>) -> Self {
        Self {
            env_prefix: env_prefix.into(),
            ..Default::default()
        }
    }

    /// Load configuration from file, environment, and CLI arguments.
    pub fn load(&self, config_path: Option<&Path>, cli: Overrides<'_>) -> crate::Result<Config> {
        let mut config: Config = match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::Configuration(format!("Failed to read config file: {e}"))
                })?;
                toml::from_str(&content)
                    .map_err(|e| Error::Configuration(format!("Failed to parse config: {e}")))?
            }
            None => Config::default(),
        };

        // A secret committed to a config file is ignored.
        if !config.auth.jwt_secret.is_empty() {
            tracing::warn!("ignoring auth.jwt_secret from config file");
        }
        config.auth.jwt_secret = String::new();

        let prefix = &self.env_prefix;
        let env = |name: &str| std::env::var(format!("{prefix}_{name}")).ok();

        if let Some(host) = env("HOST") {
            config.server.host = host;
        }
        if let Some(port) = env("PORT")
            && let Ok(p) = port.parse()
        {
            config.server.port = p;
        }
        if let Some(origins) = env("CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(dir) = env("STORE_DIR") {
            config.session.store_dir = Some(PathBuf::from(dir));
        }
        if let Some(slug) = env("SUPER_ADMIN_SLUG") {
            config.acl.super_admin_slug = slug;
        }
        if let Some(secret) = env(self.jwt_secret_env.as_str()) {
            config.auth.jwt_secret = secret;
        }

        if let Some(host) = cli.host {
            config.server.host = host.to_string();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(dir) = cli.store_dir {
            config.session.store_dir = Some(dir.to_path_buf());
        }
        if let Some(secret) = cli.jwt_secret {
            config.auth.jwt_secret = secret.to_string();
        }

        if config.auth.jwt_secret.is_empty() {
            return Err(Error::Configuration(format!(
                "{}_{} must be set via environment variable or --jwt-secret flag",
                prefix, self.jwt_secret_env
            )));
        }
        if config.acl.super_admin_slug.trim().is_empty() {
            return Err(Error::Configuration(
                "acl.super_admin_slug must not be empty".to_string(),
            ));
        }

        Ok(config)
    }
}
