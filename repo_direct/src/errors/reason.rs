use derive_more::Display;

use crate::errors::code::ErrorCode;

#[derive(Debug, Display, PartialEq)]
pub enum ReasonCode {
    #[display(fmt = "form/invalid")]
    FormInvalid,

    #[display(fmt = "form/payload-too-large")]
    FormPayloadTooLarge,

    #[display(fmt = "object/not-found")]
    ObjectNotFound,

    #[display(fmt = "datastream/not-found")]
    DatastreamNotFound,

    #[display(fmt = "upstream/failed")]
    UpstreamFailed,

    #[display(fmt = "upstream/unavailable")]
    UpstreamUnavailable,

    #[display(fmt = "internal")]
    Internal,
}

impl ReasonCode {
    pub fn code(&self) -> ErrorCode {
        match self {
            ReasonCode::FormInvalid => ErrorCode::InvalidArgument,
            ReasonCode::FormPayloadTooLarge => ErrorCode::PayloadTooLarge,
            ReasonCode::ObjectNotFound => ErrorCode::NotFound,
            ReasonCode::DatastreamNotFound => ErrorCode::NotFound,
            ReasonCode::UpstreamFailed => ErrorCode::UpstreamError,
            ReasonCode::UpstreamUnavailable => ErrorCode::Unavailable,
            ReasonCode::Internal => ErrorCode::Internal,
        }
    }

    pub fn from_bdr_api_error(err: &bdr_api::BdrApiError) -> Self {
        match err {
            e if e.is_unavailable() => ReasonCode::UpstreamUnavailable,
            bdr_api::BdrApiError::Request(_) => ReasonCode::UpstreamFailed,
            bdr_api::BdrApiError::Status { .. } => ReasonCode::UpstreamFailed,
            bdr_api::BdrApiError::Rights(_) => ReasonCode::Internal,
        }
    }
}
