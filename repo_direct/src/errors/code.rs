use actix_web::http::StatusCode;
use derive_more::Display;

#[derive(Debug, Display, PartialEq)]
pub enum ErrorCode {
    #[display(fmt = "invalid-argument")]
    InvalidArgument,

    #[display(fmt = "payload-too-large")]
    PayloadTooLarge,

    #[display(fmt = "not-found")]
    NotFound,

    #[display(fmt = "upstream-error")]
    UpstreamError,

    #[display(fmt = "unavailable")]
    Unavailable,

    #[display(fmt = "internal")]
    Internal,
}

impl ErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
