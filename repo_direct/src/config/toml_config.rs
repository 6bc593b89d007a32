//! module for handling file-based (TOML) configuration for repo_direct.

use crate::util;
use std::fs;

use super::{ConfigResult, Deserialize, LogFormat, LogLevel};

#[derive(Debug, thiserror::Error)]
pub enum TomlConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize)]
pub(crate) struct TomlConfig {
    #[serde(default)]
    pub core: CoreConfig,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CoreConfig {
    pub log_level: Option<LogLevel>,
    pub log_format: Option<LogFormat>,
    pub rpc_laddr: Option<String>,
    pub bdr_api_url: Option<String>,
    pub bdr_api_token: Option<String>,
    pub folder_api_url: Option<String>,
    pub library_parent_folder_id: Option<String>,
    pub rights_choices: Option<Vec<String>>,
    pub xml_dsids: Option<Vec<String>>,
    pub request_timeout: Option<u64>,
    pub sentry_dsn: Option<String>,
}

/// Read the TOML configuration file, if present in the `config` sub-directory under the
/// root directory.
pub(super) fn read_config(root_dir: &str) -> ConfigResult<Option<TomlConfig>> {
    let Some(config_file) = util::get_toml_config_file(root_dir, "config") else {
        return Ok(None);
    };

    if !config_file.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(config_file).map_err(TomlConfigError::from)?;
    let config = toml::from_str::<TomlConfig>(&contents).map_err(TomlConfigError::from)?;

    Ok(Some(config))
}
