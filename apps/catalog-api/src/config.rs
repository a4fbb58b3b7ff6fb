//! Configuration for Catalog API

use axum_helpers::JwtConfig;
use core_config::{app_info, env_or_default, server::ServerConfig, AppInfo, ConfigError, FromEnv};
use database::mongodb::MongoConfig;
use domain_catalog::AuthPolicy;
use std::path::PathBuf;

pub use core_config::Environment;

/// Media store settings
#[derive(Clone, Debug)]
pub struct MediaConfig {
    /// Directory the image files are written to
    pub root: PathBuf,
    /// Maximum accepted image payload size in bytes
    pub max_upload_bytes: usize,
}

impl FromEnv for MediaConfig {
    /// MEDIA_ROOT defaults to "media"; MAX_UPLOAD_BYTES defaults to 2 MiB.
    fn from_env() -> Result<Self, ConfigError> {
        let root = PathBuf::from(env_or_default("MEDIA_ROOT", "media"));
        let max_upload_bytes = env_or_default("MAX_UPLOAD_BYTES", "2097152")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "MAX_UPLOAD_BYTES".to_string(),
                details: format!("{e}"),
            })?;

        Ok(Self {
            root,
            max_upload_bytes,
        })
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub jwt: JwtConfig,
    pub media: MediaConfig,
    pub auth_policy: AuthPolicy,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;
        let media = MediaConfig::from_env()?;

        let auth_policy = AuthPolicy {
            protect_delete: env_flag("PROTECT_DELETE"),
        };

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            jwt,
            media,
            auth_policy,
        })
    }
}

/// Boolean env flag: "true" or "1" (case-insensitive) enables it
fn env_flag(key: &str) -> bool {
    let value = env_or_default(key, "false");
    value.eq_ignore_ascii_case("true") || value == "1"
}
