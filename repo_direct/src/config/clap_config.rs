use clap::{crate_version, Arg, ArgMatches, Command};

use super::{LogFormat, LogLevel};

/// Low-level `clap` object which provides with `value_source` which
/// indicates whether an option was set by the user (cli/env) or by the
/// default value.
///
/// This also encapsulates the core configuration that is supported for the cli, env,
/// and TOML (file-based) configuration.
pub(super) fn get_matches() -> ArgMatches {
    command().get_matches()
}

pub(super) fn command() -> Command {
    Command::new("repo_direct")
        .about("Staff editor for BDR repository objects")
        .version(crate_version!()) // pick the version from `Cargo.toml`
        .arg(
            Arg::new("root-dir")
                .help("Root directory holding config/config.toml")
                .short('r')
                .long("root-dir")
                .value_name("ROOT_DIR")
                .env("ROOT_DIR")
                .value_parser(clap::value_parser!(String))
                .default_value("~/.repo_direct"),
        )
        .arg(
            Arg::new("log-level")
                .help("Log level")
                .long("log-level")
                .value_name("LOG_LEVEL")
                .env("LOG_LEVEL")
                .value_parser(clap::builder::EnumValueParser::<LogLevel>::new())
                .default_value("INFO"),
        )
        .arg(
            Arg::new("log-format")
                .help("Log format")
                .long("log-format")
                .value_name("LOG_FORMAT")
                .env("LOG_FORMAT")
                .value_parser(clap::builder::EnumValueParser::<LogFormat>::new())
                .default_value("PRETTY"),
        )
        .arg(
            Arg::new("rpc-laddr")
                .help("RPC listen address")
                .long("rpc-laddr")
                .value_name("RPC_LADDR")
                .env("RPC_LADDR")
                .value_parser(clap::value_parser!(String))
                .default_value("0.0.0.0:8080"),
        )
        .arg(
            Arg::new("bdr-api-url")
                .help("Base URL of the BDR private items API")
                .long("bdr-api-url")
                .value_name("BDR_API_URL")
                .env("BDR_API_URL")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("bdr-api-token")
                .help("Bearer token for the BDR items API")
                .long("bdr-api-token")
                .value_name("BDR_API_TOKEN")
                .env("BDR_API_TOKEN")
                .hide_env_values(true)
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("folder-api-url")
                .help("Base URL of the public folder API")
                .long("folder-api-url")
                .value_name("FOLDER_API_PUBLIC")
                .env("FOLDER_API_PUBLIC")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("library-parent-folder-id")
                .help("Folder whose children are offered as collections")
                .long("library-parent-folder-id")
                .value_name("LIBRARY_PARENT_FOLDER_ID")
                .env("LIBRARY_PARENT_FOLDER_ID")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("rights-choices")
                .help("Identities offered on the rights form, the administrative identity last")
                .long("rights-choices")
                .value_name("DEFAULT_RIGHTS_CHOICES")
                .env("DEFAULT_RIGHTS_CHOICES")
                .value_parser(clap::value_parser!(String))
                .value_delimiter(',')
                .default_values([
                    "BDR_PUBLIC",
                    "BROWN:COMMUNITY:ALL",
                    "BROWN:DEPARTMENT:LIBRARY:REPOSITORY",
                ]),
        )
        .arg(
            Arg::new("xml-dsids")
                .help("Datastreams edited as XML rather than replaced as files")
                .long("xml-dsids")
                .value_name("XML_DSIDS")
                .env("XML_DSIDS")
                .value_parser(clap::value_parser!(String))
                .value_delimiter(',')
                .default_values(["MODS", "rightsMetadata", "irMetadata", "RELS-EXT", "RELS-INT", "DC"]),
        )
        .arg(
            Arg::new("request-timeout")
                .help("Timeout in seconds for requests to the storage API")
                .long("request-timeout")
                .value_name("REQUEST_TIMEOUT")
                .env("REQUEST_TIMEOUT")
                .value_parser(clap::value_parser!(u64))
                .default_value("30"),
        )
        .arg(
            Arg::new("sentry-dsn")
                .help("Sentry DSN")
                .long("sentry-dsn")
                .value_name("SENTRY_DSN")
                .env("SENTRY_DSN")
                .value_parser(clap::value_parser!(String)),
        )
}
