//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database location, bind address, JWT secrets, token lifetimes and the
//! upload directory. Values come from `AEGIS_*` environment variables, with an
//! optional `.env` file read first.

use serde::Deserialize;
use std::path::PathBuf;
use tracing::warn;

pub const ENV_PREFIX: &str = "AEGIS_";
pub const DEFAULT_JWT_SECRET: &str = "your-super-secret-key-change-in-production";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_access_token_expire_minutes")]
    pub access_token_expire_minutes: i64,
    #[serde(default = "default_refresh_token_expire_days")]
    pub refresh_token_expire_days: i64,
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_database_url() -> String {
    "aegis.db".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_access_token_expire_minutes() -> i64 {
    15
}

fn default_refresh_token_expire_days() -> i64 {
    7
}

fn default_app_name() -> String {
    "AEGIS Platform".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_max_file_size() -> usize {
    storage::models::DEFAULT_MAX_FILE_SIZE
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            bind_address: default_bind_address(),
            jwt_secret: default_jwt_secret(),
            access_token_expire_minutes: default_access_token_expire_minutes(),
            refresh_token_expire_days: default_refresh_token_expire_days(),
            app_name: default_app_name(),
            debug: false,
            upload_dir: default_upload_dir(),
            max_file_size: default_max_file_size(),
            cors_origins: default_cors_origins(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn load() -> Result<Self, envy::Error> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        let config = envy::prefixed(ENV_PREFIX).from_env::<Config>()?;
        if config.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("AEGIS_JWT_SECRET is not set, using the built-in development secret");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_environment_yields_defaults() {
        let config: Config = envy::prefixed(ENV_PREFIX)
            .from_iter(Vec::<(String, String)>::new())
            .unwrap();
        assert_eq!(config.database_url, "aegis.db");
        assert_eq!(config.access_token_expire_minutes, 15);
        assert_eq!(config.refresh_token_expire_days, 7);
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
        assert!(!config.debug);
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        let vars = vec![
            ("AEGIS_DATABASE_URL".to_string(), ":memory:".to_string()),
            ("AEGIS_DEBUG".to_string(), "true".to_string()),
            (
                "AEGIS_CORS_ORIGINS".to_string(),
                "http://a.test,http://b.test".to_string(),
            ),
            ("AEGIS_BCRYPT_COST".to_string(), "4".to_string()),
        ];
        let config: Config = envy::prefixed(ENV_PREFIX).from_iter(vars).unwrap();
        assert_eq!(config.database_url, ":memory:");
        assert!(config.debug);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.bcrypt_cost, 4);
    }
}
