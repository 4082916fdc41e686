use serde::Deserialize;
use serde_json::Value;
use std::{env, fs, path::PathBuf};
use thiserror::Error;

use crate::prisma_fmt::DEFAULT_BINARY;

const CONFIG_NAMESPACE: &str = "prisma-lsp";
const CONFIG_FILENAME: &str = "prisma-lsp.toml";
/// Section name clients use for this server's settings.
pub const SETTINGS_SECTION: &str = "prismaLanguageServer";
const BIN_PATH_KEY: &str = "prismaFmtBinPath";

/// Settings read from `prisma-lsp.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct PrismaLspConfig {
    #[serde(default, alias = "prismaFmtBinPath")]
    pub prisma_fmt_bin_path: Option<PathBuf>,
}

/// Settings pushed by the client.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrismaSettings {
    #[serde(default)]
    pub prisma_fmt_bin_path: String,
}

impl PrismaSettings {
    /// Accepts settings nested under `prismaLanguageServer`, or a bare object
    /// carrying `prismaFmtBinPath`. Anything else is not ours.
    pub fn from_value(value: &Value) -> Option<Self> {
        let section = match value.get(SETTINGS_SECTION) {
            Some(section) => section,
            None if value.get(BIN_PATH_KEY).is_some() => value,
            None => return None,
        };
        match serde_json::from_value(section.clone()) {
            Ok(settings) => Some(settings),
            Err(err) => {
                log::warn!("ignoring malformed settings {}: {}", section, err);
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBinary {
    pub path: PathBuf,
    /// Set when a configured path had to be ignored.
    pub warning: Option<String>,
}

/// Client setting first, then the config file, then `prisma-fmt` on `PATH`.
pub fn resolve_prisma_fmt_path(settings: &PrismaSettings, config: &PrismaLspConfig) -> ResolvedBinary {
    let mut warning = None;
    if let Some(configured) = normalize_field(Some(&settings.prisma_fmt_bin_path)) {
        let path = PathBuf::from(configured);
        if path.exists() {
            return ResolvedBinary { path, warning };
        }
        warning = Some(format!(
            "Path to prisma-fmt binary ({}) does not exist. Using default prisma-fmt binary path instead.",
            path.display()
        ));
    }
    let path = config
        .prisma_fmt_bin_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY));
    ResolvedBinary { path, warning }
}

fn normalize_field(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[derive(Debug, Clone)]
pub struct ConfigLoadResult {
    pub config: PrismaLspConfig,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to determine configuration directory via XDG environment variables")]
    MissingConfigDir,
    #[error("failed to read config file at {path:?}: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config file at {path:?}: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
        path: PathBuf,
    },
}

pub fn load_config() -> Result<Option<ConfigLoadResult>, ConfigError> {
    let path = match resolve_config_path() {
        Ok(path) => path,
        Err(ConfigError::MissingConfigDir) => return Ok(None),
        Err(err) => return Err(err),
    };

    if !path.exists() {
        return Ok(None);
    }

    let config_text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        source,
        path: path.clone(),
    })?;
    let config = parse_config(&config_text).map_err(|source| ConfigError::Parse {
        source,
        path: path.clone(),
    })?;

    Ok(Some(ConfigLoadResult { config, path }))
}

pub fn parse_config(text: &str) -> Result<PrismaLspConfig, toml::de::Error> {
    toml::from_str(text)
}

pub fn resolve_config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_home_dir()?
        .join(CONFIG_NAMESPACE)
        .join(CONFIG_FILENAME))
}

fn config_home_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(dir));
    }

    #[cfg(windows)]
    if let Some(dir) = env::var_os("APPDATA") {
        return Ok(PathBuf::from(dir));
    }

    if let Some(home) = env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".config"));
    }

    Err(ConfigError::MissingConfigDir)
}
