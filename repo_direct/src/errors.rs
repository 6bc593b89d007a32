use crate::config::ConfigError;

mod code;
pub mod http;
pub mod logger;
pub mod reason;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    #[error("failed to create storage api client")]
    BdrApi(#[from] bdr_api::BdrApiError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("tracing parse error")]
    TracingParse(#[from] tracing_subscriber::filter::ParseError),

    #[error("error setting tracing global subscriber")]
    TracingSetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),
}
