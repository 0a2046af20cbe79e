//! Application configuration.
//!
//! Read, later sources winning, from:
//!   ~/.config/nachbarn/config.toml
//!   the file named by `NACHBARN_CONFIG`
//!   `NACHBARN_*` environment variables (`__` separates nested keys)

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{NachbarnError, NachbarnResult};

const ENV_PREFIX: &str = "NACHBARN";
const CONFIG_PATH_VAR: &str = "NACHBARN_CONFIG";

static DEFAULT_BIND: &str = "127.0.0.1:8501";
static DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
static DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_session_ttl_hours() -> u64 {
    12
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

/// Where activity rows are kept.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sheets,
    Memory,
}

/// OAuth client and refresh token used to call the Sheets API.
#[derive(Deserialize, Clone)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        GoogleConfig {
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            token_uri: default_token_uri(),
            api_base: default_api_base(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct AppConfig {
    /// Shared secret that unlocks the calendar.
    #[serde(default)]
    pub app_password: String,

    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default)]
    pub backend: Backend,

    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,

    #[serde(default)]
    pub sheet_id: String,

    #[serde(default)]
    pub worksheet_name: String,

    #[serde(default)]
    pub google: GoogleConfig,
}

impl AppConfig {
    pub fn config_path() -> NachbarnResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| NachbarnError::Config("Could not determine config directory".into()))?
            .join("nachbarn");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> NachbarnResult<Self> {
        let mut builder = Config::builder();

        if let Ok(path) = Self::config_path() {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Ok(explicit) = std::env::var(CONFIG_PATH_VAR) {
            builder = builder.add_source(File::from(PathBuf::from(explicit)).required(true));
        }

        builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| NachbarnError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| NachbarnError::Config(e.to_string()))
    }

    pub fn from_toml_str(contents: &str) -> NachbarnResult<Self> {
        Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()
            .map_err(|e| NachbarnError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| NachbarnError::Config(e.to_string()))
    }

    /// Check that everything the chosen backend needs is present.
    pub fn validate(&self) -> NachbarnResult<()> {
        if self.app_password.trim().is_empty() {
            return Err(NachbarnError::Config("app_password is missing".into()));
        }

        if self.backend == Backend::Sheets {
            let required = [
                ("sheet_id", &self.sheet_id),
                ("worksheet_name", &self.worksheet_name),
                ("google.client_id", &self.google.client_id),
                ("google.client_secret", &self.google.client_secret),
                ("google.refresh_token", &self.google.refresh_token),
            ];

            let missing: Vec<&str> = required
                .iter()
                .filter(|(_, value)| value.trim().is_empty())
                .map(|(key, _)| *key)
                .collect();

            if !missing.is_empty() {
                return Err(NachbarnError::Config(format!(
                    "missing settings for the sheets backend: {}",
                    missing.join(", ")
                )));
            }
        }

        Ok(())
    }
}
