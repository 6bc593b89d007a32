//! Configuration for repo_direct - using the CLI (clap), env (clap), and configuration file (toml).

mod clap_config;
mod toml_config;

use clap::{parser::ValueSource, ArgMatches, ValueEnum};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("toml config error")]
    TomlConfig(#[from] toml_config::TomlConfigError),

    #[error("set the {0} application setting")]
    Missing(&'static str),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Root directory holding `config/config.toml`
    pub root_dir: String,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// RPC listen address
    pub rpc_laddr: String,

    /// Base URL of the BDR private items API
    pub bdr_api_url: Option<String>,

    /// Bearer token for the BDR items API
    pub bdr_api_token: Option<String>,

    /// Base URL of the public folder API
    pub folder_api_url: Option<String>,

    /// Folder whose children are offered as collections
    pub library_parent_folder_id: Option<String>,

    /// Identities offered on the rights form, the administrative identity last
    pub rights_choices: Vec<String>,

    /// Datastreams edited as XML rather than replaced as files
    pub xml_dsids: Vec<String>,

    /// Timeout in seconds for requests to the storage API
    pub request_timeout: u64,

    /// Sentry DSN
    pub sentry_dsn: Option<String>,
}

impl Config {
    pub fn new() -> ConfigResult<Self> {
        Self::from_matches(clap_config::get_matches())
    }

    fn from_matches(matches: ArgMatches) -> ConfigResult<Self> {
        let mut config: Config = matches.clone().into();
        config.normalize();
        config.merge_toml_core_config(matches)?;
        config.normalize();

        config.bdr_api_url()?;
        config.folder_api_url()?;
        config.library_parent_folder_id()?;

        Ok(config)
    }

    pub fn bdr_api_url(&self) -> ConfigResult<&str> {
        Self::required(&self.bdr_api_url, "BDR_API_URL")
    }

    pub fn folder_api_url(&self) -> ConfigResult<&str> {
        Self::required(&self.folder_api_url, "FOLDER_API_PUBLIC")
    }

    pub fn library_parent_folder_id(&self) -> ConfigResult<&str> {
        Self::required(&self.library_parent_folder_id, "LIBRARY_PARENT_FOLDER_ID")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    fn required<'a>(value: &'a Option<String>, name: &'static str) -> ConfigResult<&'a str> {
        value.as_deref().ok_or(ConfigError::Missing(name))
    }

    fn was_supplied_by_user(key: &str, matches: &ArgMatches) -> bool {
        !matches!(matches.value_source(key), Some(ValueSource::DefaultValue) | None)
    }

    /// The order of priority is (in decreasing order):
    /// cli -> env -> toml -> default
    ///
    /// As such, here we will check if a field with a default value was
    /// supplied by the user. If so, do nothing. If not, if the TOML config
    /// has a value for the same field, use that instead.
    ///
    /// Secondly, if a value for an optional type has not been set, and the TOML config again has a
    /// value for it, then set it.
    fn merge_toml_core_config(&mut self, matches: ArgMatches) -> ConfigResult<()> {
        let Some(toml_config) = toml_config::read_config(&self.root_dir)? else {
            return Ok(());
        };
        let core = toml_config.core;

        if let (false, Some(log_level)) = (
            Self::was_supplied_by_user("log-level", &matches),
            core.log_level,
        ) {
            self.log_level = log_level;
        }

        if let (false, Some(log_format)) = (
            Self::was_supplied_by_user("log-format", &matches),
            core.log_format,
        ) {
            self.log_format = log_format;
        }

        if let (false, Some(rpc_laddr)) = (
            Self::was_supplied_by_user("rpc-laddr", &matches),
            core.rpc_laddr,
        ) {
            self.rpc_laddr = rpc_laddr;
        }

        if self.bdr_api_url.is_none() {
            self.bdr_api_url = core.bdr_api_url;
        }

        if self.bdr_api_token.is_none() {
            self.bdr_api_token = core.bdr_api_token;
        }

        if self.folder_api_url.is_none() {
            self.folder_api_url = core.folder_api_url;
        }

        if self.library_parent_folder_id.is_none() {
            self.library_parent_folder_id = core.library_parent_folder_id;
        }

        if let (false, Some(rights_choices)) = (
            Self::was_supplied_by_user("rights-choices", &matches) && !self.rights_choices.is_empty(),
            core.rights_choices,
        ) {
            self.rights_choices = rights_choices;
        }

        if let (false, Some(xml_dsids)) = (
            Self::was_supplied_by_user("xml-dsids", &matches) && !self.xml_dsids.is_empty(),
            core.xml_dsids,
        ) {
            self.xml_dsids = xml_dsids;
        }

        if let (false, Some(request_timeout)) = (
            Self::was_supplied_by_user("request-timeout", &matches),
            core.request_timeout,
        ) {
            self.request_timeout = request_timeout;
        }

        if self.sentry_dsn.is_none() {
            self.sentry_dsn = core.sentry_dsn;
        }

        Ok(())
    }

    /// Blank strings from the cli, env or TOML count as unset. Runs before the TOML
    /// merge so a blank value does not hide the file's value, and again after it.
    fn normalize(&mut self) {
        for value in [
            &mut self.bdr_api_url,
            &mut self.bdr_api_token,
            &mut self.folder_api_url,
            &mut self.library_parent_folder_id,
            &mut self.sentry_dsn,
        ] {
            *value = value
                .take()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
        }

        self.rights_choices = normalize_list(std::mem::take(&mut self.rights_choices));
        self.xml_dsids = normalize_list(std::mem::take(&mut self.xml_dsids));
    }
}

fn normalize_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// To convert from an ArgMatches into the main `Config` entity.
// `clap` does not provide an automated way to do so in builder mode.
#[allow(clippy::unwrap_used)]
impl From<ArgMatches> for Config {
    fn from(am: ArgMatches) -> Self {
        let many = |key: &str| {
            am.get_many::<String>(key)
                .map(|values| values.cloned().collect::<Vec<_>>())
                .unwrap_or_default()
        };

        Config {
            root_dir: am.get_one::<String>("root-dir").unwrap().clone(),
            log_level: *am.get_one::<LogLevel>("log-level").unwrap(),
            log_format: *am.get_one::<LogFormat>("log-format").unwrap(),
            rpc_laddr: am.get_one::<String>("rpc-laddr").unwrap().clone(),
            bdr_api_url: am.get_one::<String>("bdr-api-url").cloned(),
            bdr_api_token: am.get_one::<String>("bdr-api-token").cloned(),
            folder_api_url: am.get_one::<String>("folder-api-url").cloned(),
            library_parent_folder_id: am.get_one::<String>("library-parent-folder-id").cloned(),
            rights_choices: many("rights-choices"),
            xml_dsids: many("xml-dsids"),
            request_timeout: *am.get_one::<u64>("request-timeout").unwrap(),
            sentry_dsn: am.get_one::<String>("sentry-dsn").cloned(),
        }
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Deserialize, ValueEnum)]
#[clap(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    #[serde(rename = "DEBUG")]
    Debug,
    #[serde(rename = "INFO")]
    Info,
    #[serde(rename = "ERROR")]
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Deserialize)]
#[clap(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogFormat {
    #[serde(rename = "PRETTY")]
    Pretty,
    #[serde(rename = "JSON")]
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn matches(args: &[&str]) -> ArgMatches {
        clap_config::command()
            .try_get_matches_from(std::iter::once("repo_direct").chain(args.iter().copied()))
            .unwrap()
    }

    fn write_toml(dir: &tempfile::TempDir, contents: &str) {
        let config_dir = dir.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("config.toml"), contents).unwrap();
    }

    #[test]
    fn test_cli_only() {
        let dir = tempfile::tempdir().unwrap();
        let root_dir = dir.path().to_str().unwrap();

        let config = Config::from_matches(matches(&[
            "--root-dir",
            root_dir,
            "--bdr-api-url",
            "http://bdr.test/api/items/",
            "--folder-api-url",
            "http://bdr.test/api/folders/",
            "--library-parent-folder-id",
            "1",
        ]))
        .unwrap();

        assert_eq!(config.bdr_api_url().unwrap(), "http://bdr.test/api/items/");
        assert_eq!(config.library_parent_folder_id().unwrap(), "1");
        assert_eq!(
            config.rights_choices.last().map(String::as_str),
            Some("BROWN:DEPARTMENT:LIBRARY:REPOSITORY")
        );
        assert!(config.xml_dsids.contains(&"MODS".to_string()));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_toml_fills_in_unset_values() {
        let dir = tempfile::tempdir().unwrap();
        write_toml(
            &dir,
            r#"
[core]
log_format = "JSON"
rpc_laddr = "127.0.0.1:9999"
bdr_api_url = "http://toml.test/items/"
folder_api_url = "http://toml.test/folders/"
library_parent_folder_id = "42"
rights_choices = ["PUBLIC", "ADMIN"]
"#,
        );

        let config = Config::from_matches(matches(&[
            "--root-dir",
            dir.path().to_str().unwrap(),
            "--rpc-laddr",
            "127.0.0.1:7000",
        ]))
        .unwrap();

        assert_eq!(config.rpc_laddr, "127.0.0.1:7000");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.bdr_api_url().unwrap(), "http://toml.test/items/");
        assert_eq!(config.library_parent_folder_id().unwrap(), "42");
        assert_eq!(config.rights_choices, vec!["PUBLIC", "ADMIN"]);
    }

    #[test]
    fn test_missing_required_setting() {
        let dir = tempfile::tempdir().unwrap();

        let err = Config::from_matches(matches(&[
            "--root-dir",
            dir.path().to_str().unwrap(),
            "--bdr-api-url",
            "http://bdr.test/api/items/",
            "--library-parent-folder-id",
            "1",
        ]))
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "set the FOLDER_API_PUBLIC application setting"
        );
    }

    #[test]
    fn test_blank_cli_value_falls_back_to_toml() {
        let dir = tempfile::tempdir().unwrap();
        write_toml(
            &dir,
            r#"
[core]
bdr_api_url = "http://toml.test/items/"
folder_api_url = "  "
rights_choices = ["PUBLIC", "ADMIN"]
"#,
        );

        let config = Config::from_matches(matches(&[
            "--root-dir",
            dir.path().to_str().unwrap(),
            "--bdr-api-url",
            "  ",
            "--folder-api-url",
            "http://cli.test/folders/",
            "--library-parent-folder-id",
            "1",
            "--rights-choices",
            " ",
        ]))
        .unwrap();

        assert_eq!(config.bdr_api_url().unwrap(), "http://toml.test/items/");
        assert_eq!(config.folder_api_url().unwrap(), "http://cli.test/folders/");
        assert_eq!(config.rights_choices, vec!["PUBLIC", "ADMIN"]);
    }

    #[test]
    fn test_blank_toml_value_is_unset() {
        let dir = tempfile::tempdir().unwrap();
        write_toml(
            &dir,
            r#"
[core]
bdr_api_url = "http://toml.test/items/"
folder_api_url = "http://toml.test/folders/"
library_parent_folder_id = " "
"#,
        );

        let err = Config::from_matches(matches(&["--root-dir", dir.path().to_str().unwrap()]))
            .unwrap_err();

        assert!(matches!(err, ConfigError::Missing("LIBRARY_PARENT_FOLDER_ID")));
    }

    #[test]
    fn test_blank_settings_are_unset() {
        let dir = tempfile::tempdir().unwrap();

        let err = Config::from_matches(matches(&[
            "--root-dir",
            dir.path().to_str().unwrap(),
            "--bdr-api-url",
            "  ",
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::Missing("BDR_API_URL")));
    }
}
