#![warn(clippy::unwrap_used, clippy::expect_used)]

mod config;
mod errors;
mod forms;
mod rpc;
mod util;

use bdr_api::{BdrClient, BdrClientConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat, LogLevel};
use crate::errors::Result;
use crate::rpc::{EditorSettings, RouteState};

fn init_tracing(log_level: LogLevel, log_format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(log_level.as_filter())?;
    let builder = fmt().with_env_filter(filter);

    match log_format {
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.json().flatten_event(true).finish())?
        }
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish())?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::new()?;

    let _guard = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(
                    std::env::var("ENV_NAME")
                        .unwrap_or("dev".to_string())
                        .into(),
                ),
                ..Default::default()
            },
        ))
    });

    init_tracing(config.log_level, config.log_format)?;

    let client = Arc::new(BdrClient::new(BdrClientConfig {
        items_url: config.bdr_api_url()?.to_string(),
        folders_url: config.folder_api_url()?.to_string(),
        token: config.bdr_api_token.clone(),
        timeout: Some(config.request_timeout()),
    })?);

    let state = RouteState::new(
        Arc::clone(&client) as _,
        client,
        EditorSettings {
            rights_choices: config.rights_choices.clone(),
            xml_dsids: config.xml_dsids.clone(),
            library_parent_folder_id: config.library_parent_folder_id()?.to_string(),
        },
    );

    info!(
        rpc_laddr = %config.rpc_laddr,
        version = env!("CARGO_PKG_VERSION"),
        "starting repo_direct"
    );

    rpc::create_rpc_server(config.rpc_laddr.clone(), state)?.await?;

    info!("server stopped");
    Ok(())
}
