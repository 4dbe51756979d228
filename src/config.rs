use std::collections::BTreeMap;
use std::env;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub diagnostics: DiagnosticsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub frontend_domain: Option<String>,
    pub max_upload_bytes: usize,
}

#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    /// When false the connection is still encrypted but the server
    /// certificate and hostname are not checked.
    pub tls_verify: bool,
    pub timeout_secs: u64,
}

#[derive(Clone, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: Option<String>,
    pub upload_folder: String,
    pub presign_ttl_secs: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Default, Deserialize)]
pub struct DiagnosticsConfig {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
}

// Secrets stay out of `{:?}` output.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls_verify", &self.tls_verify)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("upload_folder", &self.upload_folder)
            .field("presign_ttl_secs", &self.presign_ttl_secs)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for DiagnosticsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticsConfig")
            .field("enabled", &self.token.is_some())
            .finish()
    }
}

/// Longest lifetime S3 accepts for a presigned URL (7 days).
pub const MAX_PRESIGN_TTL_SECS: u32 = 604_800;

/// Variables reported by [`Config::presence`], in response order.
pub const PRESENCE_KEYS: &[&str] = &[
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_REGION",
    "S3_BUCKET_NAME",
    "DB_USER",
    "DB_PASSWORD",
    "DB_NAME",
    "DB_HOST",
    "DB_PORT",
    "FRONTEND_DOMAIN",
];

impl Config {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    /// Empty values are treated the same as absent ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        Ok(Self {
            server: ServerConfig {
                port: parse_or(&get, "PORT", 8000)?,
                host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                cors_allowed_origins: parse_origins(
                    get("ALLOWED_ORIGINS")
                        .unwrap_or_else(|| "http://localhost:3000,http://127.0.0.1:3000".to_string()),
                )?,
                frontend_domain: get("FRONTEND_DOMAIN"),
                max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", 50 * 1024 * 1024)?,
            },
            database: DatabaseConfig {
                user: require("DB_USER")?,
                password: require("DB_PASSWORD")?,
                name: require("DB_NAME")?,
                host: require("DB_HOST")?,
                port: parse("DB_PORT", require("DB_PORT")?)?,
                tls_verify: parse_or(&get, "DB_TLS_VERIFY", true)?,
                timeout_secs: parse_or(&get, "DB_TIMEOUT_SECS", 10)?,
            },
            storage: StorageConfig {
                bucket: require("S3_BUCKET_NAME")?,
                region: require("AWS_REGION")?,
                access_key_id: require("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
                endpoint: get("S3_ENDPOINT"),
                upload_folder: get("UPLOAD_FOLDER")
                    .map(|f| f.trim_matches('/').to_string())
                    .unwrap_or_else(|| "images".to_string()),
                presign_ttl_secs: within(
                    "PRESIGN_TTL_SECS",
                    parse_or(&get, "PRESIGN_TTL_SECS", 3600)?,
                    1..=MAX_PRESIGN_TTL_SECS,
                )?,
                timeout_secs: parse_or(&get, "STORE_TIMEOUT_SECS", 30)?,
            },
            diagnostics: DiagnosticsConfig {
                token: get("DIAGNOSTICS_TOKEN"),
            },
            logging: LoggingConfig {
                dir: get("LOG_DIR").map(PathBuf::from),
            },
        })
    }

    /// Which configuration values are set. Never includes the values.
    pub fn presence(&self) -> BTreeMap<&'static str, bool> {
        let storage = &self.storage;
        let database = &self.database;
        PRESENCE_KEYS
            .iter()
            .copied()
            .zip([
                !storage.access_key_id.is_empty(),
                !storage.secret_access_key.is_empty(),
                !storage.region.is_empty(),
                !storage.bucket.is_empty(),
                !database.user.is_empty(),
                !database.password.is_empty(),
                !database.name.is_empty(),
                !database.host.is_empty(),
                database.port != 0,
                self.server.frontend_domain.is_some(),
            ])
            .collect()
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn within<T>(key: &'static str, value: T, range: RangeInclusive<T>) -> Result<T, ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        return Ok(value);
    }
    Err(ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: format!("must be between {} and {}", range.start(), range.end()),
    })
}

/// Comma-separated origins. A wildcard cannot be combined with credentialed
/// CORS, so it is refused here rather than when the layer is built.
fn parse_origins(value: String) -> Result<Vec<String>, ConfigError> {
    let origins: Vec<String> = value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if origins.iter().any(|origin| origin.contains('*')) {
        return Err(ConfigError::Invalid {
            key: "ALLOWED_ORIGINS",
            value,
            reason: "wildcard origins are not allowed with credentials".to_string(),
        });
    }

    Ok(origins)
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => parse(key, value),
        None => Ok(default),
    }
}
