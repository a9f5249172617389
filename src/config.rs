use std::fs;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_TOP_RESULTS, Library, MAX_TOP_RESULTS, Organism, default_libraries};
use crate::enrichr::DEFAULT_TIMEOUT_SECS;
use crate::error::OraError;

pub const DEFAULT_CONFIG_FILE: &str = "kira-ora.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub databases: Option<Vec<String>>,
    #[serde(default)]
    pub organism: Option<Organism>,
    #[serde(default)]
    pub top: Option<usize>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub enrichr_url: Option<String>,
}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub databases: Option<Vec<String>>,
    pub organism: Option<Organism>,
    pub top: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub libraries: Vec<Library>,
    pub organism: Organism,
    pub top: usize,
    pub timeout: Duration,
    pub enrichr_url: String,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// An explicit path must exist; the default `kira-ora.json` is optional.
    pub fn load(path: Option<&Utf8Path>) -> Result<Config, OraError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.as_std_path().exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| OraError::ConfigRead(config_path.clone()))?;
        serde_json::from_str(&content).map_err(|err| OraError::ConfigParse(err.to_string()))
    }

    pub fn resolve(
        path: Option<&Utf8Path>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, OraError> {
        let config = Self::load(path)?;
        Self::resolve_config(config, overrides)
    }

    pub fn resolve_config(
        config: Config,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, OraError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let libraries = match overrides.databases.or(config.databases) {
            Some(names) if names.is_empty() => {
                return Err(OraError::ConfigParse(
                    "databases must list at least one library".to_string(),
                ));
            }
            Some(names) => names
                .iter()
                .map(|name| name.parse())
                .collect::<Result<Vec<Library>, OraError>>()?,
            None => default_libraries(),
        };

        let organism = overrides.organism.or(config.organism).unwrap_or_default();

        let top = overrides.top.or(config.top).unwrap_or(DEFAULT_TOP_RESULTS);
        if !(1..=MAX_TOP_RESULTS).contains(&top) {
            return Err(OraError::ConfigParse(format!(
                "top must be between 1 and {MAX_TOP_RESULTS}, got {top}"
            )));
        }

        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let enrichr_url = config
            .enrichr_url
            .unwrap_or_else(|| organism.enrichr_url().to_string());

        Ok(ResolvedConfig {
            schema_version,
            libraries,
            organism,
            top,
            timeout,
            enrichr_url,
        })
    }
}
