//! Configuration loading.
//!
//! Resolution order:
//! 1. Explicit path (command-line flag)
//! 2. `HURINA_CONFIG` environment variable
//! 3. Compiled defaults
//!
//! Every key is optional in the file; absent keys take their default.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::columns::ColumnAliases;
use crate::entry::TimeInput;
use crate::{Error, Result};

pub const CONFIG_ENV_VAR: &str = "HURINA_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sheet file backing the row store
    pub store_path: PathBuf,
    /// Lifetime of the cached normalized snapshot; 0 disables caching
    pub cache_ttl_secs: u64,
    /// Offset applied to UTC to get local "now" for the entry form
    pub utc_offset_hours: i32,
    pub time_input: TimeInput,
    /// Listen address of the web server
    pub bind_addr: String,
    pub columns: ColumnAliases,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("hurina_db.bin.gz"),
            cache_ttl_secs: 30,
            utc_offset_hours: 2,
            time_input: TimeInput::Minute,
            bind_addr: "127.0.0.1:3000".to_string(),
            columns: ColumnAliases::default(),
        }
    }
}

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| Error::Config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file; failures are logged before returning
    pub fn from_file(path: &Path) -> Result<Self> {
        let result = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))
            .and_then(|text| Self::from_toml_str(&text));
        if let Err(e) = &result {
            warn!("unusable config {}: {}", path.display(), e);
        }
        result
    }

    /// Load from `cli_path`, else from `$HURINA_CONFIG`, else defaults
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_path {
            info!("loading config from {}", path.display());
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            info!("loading config from ${} = {}", CONFIG_ENV_VAR, path);
            return Self::from_file(Path::new(&path));
        }
        info!("no config file given, using defaults");
        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        for field in crate::columns::Field::REQUIRED {
            if self.columns.aliases(field).is_empty() {
                return Err(Error::Config(format!(
                    "columns.{} needs at least one column name",
                    field.name()
                )));
            }
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(Error::Config(format!(
                "utc_offset_hours {} out of range",
                self.utc_offset_hours
            )));
        }
        Ok(())
    }
}
