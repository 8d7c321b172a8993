use std::collections::HashMap;
use std::env::{self, VarError};
use std::fmt;

use formats::{ApiConfig, MapboxConfig, PublicConfig, DEFAULT_BASE_URL};

pub const TOKEN_VAR: &str = "MAPBOX_ACCESS_TOKEN";
pub const APP_URL_VAR: &str = "PUBLIC_APP_URL";

#[derive(Debug)]
pub enum ConfigError {
    NotUnicode(&'static str),
    Lookup(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotUnicode(key) => write!(f, "{key} is not valid unicode"),
            ConfigError::Lookup(msg) => write!(f, "config lookup failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Source of deployment settings, read on every relay request.
pub trait EnvSource: Send + Sync {
    fn get(&self, key: &'static str) -> Result<Option<String>, ConfigError>;
}

pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &'static str) -> Result<Option<String>, ConfigError> {
        match env::var(key) {
            Ok(v) => Ok(Some(v)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(key)),
        }
    }
}

/// Fixed settings; used by tests and for embedding the server.
#[derive(Default)]
pub struct StaticEnv(pub HashMap<&'static str, String>);

impl StaticEnv {
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.0.insert(key, value.into());
        self
    }
}

impl EnvSource for StaticEnv {
    fn get(&self, key: &'static str) -> Result<Option<String>, ConfigError> {
        Ok(self.0.get(key).cloned())
    }
}

/// Builds the public configuration. An unset or blank token is reported as
/// `null`; a missing app URL falls back to the local default.
pub fn public_config(env: &dyn EnvSource) -> Result<PublicConfig, ConfigError> {
    let access_token = env.get(TOKEN_VAR)?.filter(|t| !t.trim().is_empty());
    let base_url = env
        .get(APP_URL_VAR)?
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    Ok(PublicConfig {
        mapbox: MapboxConfig { access_token },
        api: ApiConfig { base_url },
    })
}
