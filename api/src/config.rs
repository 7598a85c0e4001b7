//! Startup settings.
//!
//! Read once from `conf/app.toml` (or the file named by `BLOG_CONFIG`), with
//! `BLOG_`-prefixed environment variables layered on top. File keys are
//! case-insensitive: `JWT_SECRET` and `jwt_secret` name the same setting, and
//! `BLOG_APP__JWT_SECRET` overrides either.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use figment::{
    providers::{Env, Format, Toml},
    value::{Dict, Map, Value},
    Figment, Metadata, Profile, Provider,
};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "conf/app.toml";
pub const CONFIG_PATH_ENV: &str = "BLOG_CONFIG";
pub const ENV_PREFIX: &str = "BLOG_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {0} does not exist")]
    NotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(inner: figment::Error) -> Self {
        ConfigError::Invalid(Box::new(inner))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Debug,
    Release,
}

impl RunMode {
    pub fn default_log_level(self) -> &'static str {
        match self {
            RunMode::Debug => "debug",
            RunMode::Release => "info",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub run_mode: RunMode,
    pub server: ServerSettings,
    pub app: AppSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Seconds.
    #[serde(default = "default_timeout")]
    pub read_timeout: u64,
    /// Seconds.
    #[serde(default = "default_timeout")]
    pub write_timeout: u64,
}

impl ServerSettings {
    /// Upper bound for handling a single request, reading and writing included.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout.saturating_add(self.write_timeout))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_log_prefix")]
    pub file_prefix: String,
    /// Falls back to the run mode's level when unset.
    #[serde(default)]
    pub level: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file_prefix: default_log_prefix(),
            level: None,
        }
    }
}

fn default_http_port() -> u16 {
    8000
}

fn default_timeout() -> u64 {
    60
}

fn default_jwt_secret() -> String {
    "!@)*#)!@U#@*!@!)".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_table_prefix() -> String {
    "blog_".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("runtime/logs")
}

fn default_log_prefix() -> String {
    "log".to_string()
}

/// Lowercases every key of the wrapped provider so ini-style upper-case
/// files line up with the lowercased keys `Env` produces.
pub struct LowercaseKeys<P>(pub P);

impl<P: Provider> Provider for LowercaseKeys<P> {
    fn metadata(&self) -> Metadata {
        self.0.metadata()
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Ok(self
            .0
            .data()?
            .into_iter()
            .map(|(profile, dict)| (profile, lowercase_dict(dict)))
            .collect())
    }

    fn profile(&self) -> Option<Profile> {
        self.0.profile()
    }
}

fn lowercase_dict(dict: Dict) -> Dict {
    dict.into_iter()
        .map(|(key, value)| (key.to_lowercase(), lowercase_value(value)))
        .collect()
}

fn lowercase_value(value: Value) -> Value {
    match value {
        Value::Dict(tag, dict) => Value::Dict(tag, lowercase_dict(dict)),
        Value::Array(tag, items) => {
            Value::Array(tag, items.into_iter().map(lowercase_value).collect())
        }
        other => other,
    }
}

impl Settings {
    /// Resolves the config path from `BLOG_CONFIG`, falling back to
    /// [`DEFAULT_CONFIG_PATH`], and loads it.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        Self::from_figment(
            Figment::new()
                .merge(LowercaseKeys(Toml::file_exact(path)))
                .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    pub fn log_level(&self) -> &str {
        self.log
            .level
            .as_deref()
            .unwrap_or_else(|| self.run_mode.default_log_level())
    }
}
