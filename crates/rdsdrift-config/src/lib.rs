//! Configuration for rdsdrift.
//!
//! TOML config file, `RDSDRIFT_*` environment overrides, named live
//! connections and their password resolution (env + keyring + plaintext),
//! and translation to `rdsdrift_core::AuditorConfig`. The CLI layers its
//! flags on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rdsdrift_api::AwsCliConfig;
use rdsdrift_core::{AuditorConfig, CacheConfig, ConnectionDescriptor, DEFAULT_CONCURRENCY};

/// Keyring service name under which connection passwords are stored.
pub const KEYRING_SERVICE: &str = "rdsdrift";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown connection '{name}'")]
    UnknownConnection { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// How to invoke the AWS command line.
    #[serde(default)]
    pub aws: AwsSettings,

    /// Named live database connections.
    #[serde(default)]
    pub connections: BTreeMap<String, Connection>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Cache entry lifetime, humantime syntax (`1h`, `30m`, `0s`).
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Override of the platform cache directory.
    pub cache_dir: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            cache_ttl: default_cache_ttl(),
            concurrency: default_concurrency(),
            cache_dir: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_cache_ttl() -> String {
    "1h".into()
}
fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AwsSettings {
    /// The `aws` executable.
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments placed before `rds ...`, for wrappers such as
    /// `aws-vault exec prod -- aws`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub program_args: Vec<String>,

    pub region: Option<String>,

    pub profile: Option<String>,

    /// Seconds allowed per `aws` invocation.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            program_args: Vec::new(),
            region: None,
            profile: None,
            timeout: default_timeout(),
        }
    }
}

fn default_program() -> String {
    "aws".into()
}
fn default_timeout() -> u64 {
    60
}

/// A named live connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Connection {
    /// PostgreSQL URL, usually without a password.
    pub url: String,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Plaintext password. Prefer the keyring or `password_env`.
    pub password: Option<String>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "rdsdrift", "rdsdrift")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "rdsdrift", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// The default cache directory.
pub fn default_cache_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".cache", "rdsdrift"]),
        |dirs| dirs.cache_dir().join("settings"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file + environment.
///
/// Environment keys use `__` between levels, e.g.
/// `RDSDRIFT_DEFAULTS__CACHE_TTL=10m` or `RDSDRIFT_AWS__REGION=eu-west-1`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RDSDRIFT_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Validation and translation ──────────────────────────────────────

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        self.defaults.cache_ttl()?;
        if self.defaults.concurrency == 0 {
            return Err(ConfigError::Validation {
                field: "defaults.concurrency".into(),
                reason: "must be at least 1".into(),
            });
        }
        for (name, conn) in &self.connections {
            if !conn.url.contains("://") {
                return Err(ConfigError::Validation {
                    field: format!("connections.{name}.url"),
                    reason: format!("expected a postgres:// URL, got '{}'", conn.url),
                });
            }
        }
        Ok(())
    }

    /// Build the core configuration from file values alone.
    pub fn auditor_config(&self) -> Result<AuditorConfig, ConfigError> {
        Ok(AuditorConfig {
            aws: self.aws.cli_config(),
            cache: CacheConfig {
                dir: self.defaults.cache_dir.clone().unwrap_or_else(default_cache_dir),
                ttl: self.defaults.cache_ttl()?,
                enabled: true,
            },
            concurrency: self.defaults.concurrency,
        })
    }

    /// Turn `live:` arguments into a connection: a configured name, or
    /// anything containing `://` taken as a URL.
    pub fn resolve_connection(&self, name_or_url: &str) -> Result<ConnectionDescriptor, ConfigError> {
        if name_or_url.contains("://") {
            return Ok(ConnectionDescriptor::from_url(SecretString::from(name_or_url.to_owned())));
        }
        let conn = self
            .connections
            .get(name_or_url)
            .ok_or_else(|| ConfigError::UnknownConnection {
                name: name_or_url.into(),
            })?;

        let url = match resolve_password(conn, name_or_url) {
            Some(password) => rdsdrift_api::postgres::with_password(&conn.url, password.expose_secret())
                .map_err(|e| ConfigError::Validation {
                    field: format!("connections.{name_or_url}.url"),
                    reason: e.to_string(),
                })?,
            None => conn.url.clone(),
        };
        Ok(ConnectionDescriptor::named(name_or_url, SecretString::from(url)))
    }

    /// A copy safe to display: plaintext passwords masked, URL passwords
    /// redacted.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut shown = self.clone();
        for conn in shown.connections.values_mut() {
            if conn.password.is_some() {
                conn.password = Some("****".into());
            }
            conn.url = rdsdrift_api::redact_url(&conn.url);
        }
        shown
    }
}

impl Defaults {
    pub fn cache_ttl(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(&self.cache_ttl).map_err(|e| ConfigError::Validation {
            field: "defaults.cache_ttl".into(),
            reason: e.to_string(),
        })
    }
}

impl AwsSettings {
    pub fn cli_config(&self) -> AwsCliConfig {
        let mut command = vec![self.program.clone()];
        command.extend(self.program_args.iter().cloned());
        AwsCliConfig {
            command,
            region: self.region.clone(),
            profile: self.profile.clone(),
            timeout: Duration::from_secs(self.timeout),
            ..AwsCliConfig::default()
        }
    }
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(connection: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{connection}/password"))
}

/// Resolve a connection password: `password_env` → system keyring →
/// plaintext. `None` means the URL is used as written.
pub fn resolve_password(conn: &Connection, name: &str) -> Option<SecretString> {
    // 1. Connection's password_env → env var lookup
    if let Some(ref env_name) = conn.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(name) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    conn.password.clone().map(SecretString::from)
}

/// Store a connection password in the system keyring.
pub fn store_password(connection: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(connection)?.set_password(password.expose_secret())?;
    Ok(())
}
