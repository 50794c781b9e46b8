use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Worker pool size used when none is configured
pub const DEFAULT_WORKERS: usize = 3;

/// HTTP port for the liveness endpoint when neither `BIND_ADDRESS` nor `PORT`
/// is set
pub const DEFAULT_PORT: u16 = 8080;

/// Instance configuration, built once at startup and passed to every
/// component that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Core API, without trailing slash
    pub core_api_url: String,

    pub core_api_key: String,

    /// Location code of this instance; doubles as its identity towards Core
    pub location: String,

    /// Number of concurrent probe workers per phase
    pub workers: usize,

    /// Address the liveness endpoint binds to
    pub bind_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core_api_url: String::new(),
            core_api_key: String::new(),
            location: String::new(),
            workers: DEFAULT_WORKERS,
            bind_address: format!("0.0.0.0:{DEFAULT_PORT}"),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
            writeln!(f, "  {label}: {value}")
        };

        let masked_key = if self.core_api_key.is_empty() { "<unset>" } else { "********" };

        writeln!(f, "Current Instance Configuration:")?;
        write_indented(f, "Core API URL", &self.core_api_url)?;
        write_indented(f, "Core API Key", &masked_key)?;
        write_indented(f, "Location", &self.location)?;
        write_indented(f, "Workers", &self.workers)?;
        write_indented(f, "Bind Address", &self.bind_address)?;

        Ok(())
    }
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// A `.env` file in the working directory is honoured when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        config.apply_env(|key| env::var(key).ok());
        config
    }

    /// Read an optional TOML file, then let the environment override it.
    pub fn load(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let Some(path) = optional_path else {
            return Ok(Self::from_env());
        };

        let mut config = Self::from_file(path.as_ref())?;
        dotenvy::dotenv().ok();
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &path::Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        Ok(toml::from_str(&raw)?)
    }

    /// Overlay values from a variable lookup; empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = get("WEBGUARD_CORE_API_URL") {
            self.core_api_url = url;
        }
        if let Some(key) = get("WEBGUARD_CORE_API_KEY") {
            self.core_api_key = key;
        }
        if let Some(location) = get("WEBGUARD_LOCATION") {
            self.location = location;
        }
        if let Some(workers) = get("QUEUE_DEFAULT_WORKERS") {
            // Unparseable values keep whatever was configured before
            if let Ok(workers) = workers.trim().parse::<i64>() {
                self.workers = usize::try_from(workers.max(1)).unwrap_or(DEFAULT_WORKERS);
            }
        }
        if let Some(address) = get("BIND_ADDRESS") {
            self.bind_address = address;
        } else if let Some(port) = get("PORT") {
            self.bind_address = format!("0.0.0.0:{}", port.trim());
        }
    }

    /// Address to hand to the HTTP listener.
    ///
    /// A bare `:PORT` binds every interface.
    pub fn listen_address(&self) -> String {
        let address = self.bind_address.trim();
        match address.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{port}"),
            None => address.to_string(),
        }
    }

    /// Worker pool size, never less than one
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}
