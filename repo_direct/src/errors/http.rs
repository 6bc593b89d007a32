use actix_web::{
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use serde::Serialize;
use std::{error::Error, fmt::Display};

use super::reason::ReasonCode;
use crate::forms::FormErrors;

#[derive(Debug)]
pub struct HTTPError {
    pub reason: ReasonCode,
    source: Option<Box<dyn Error>>,
}

#[derive(Serialize)]
pub struct ErrorOutput {
    error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    code: String,
    reason: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FormErrors>,
}

impl HTTPError {
    pub fn new(reason: ReasonCode, source: Option<Box<dyn std::error::Error>>) -> HTTPError {
        HTTPError { reason, source }
    }

    /// Upstream and internal details stay in the logs, only the reason is returned.
    fn message(&self) -> String {
        match (&self.reason, &self.source) {
            (
                ReasonCode::UpstreamFailed | ReasonCode::UpstreamUnavailable | ReasonCode::Internal,
                _,
            )
            | (_, None) => self.reason.to_string(),
            (_, Some(source)) => source.to_string(),
        }
    }
}

impl Display for HTTPError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.reason.code(), self.reason)
    }
}

impl std::error::Error for HTTPError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref())
    }
}

impl actix_web::error::ResponseError for HTTPError {
    fn error_response(&self) -> HttpResponse {
        let error = ErrorOutput {
            error: ErrorDetail {
                code: self.reason.code().to_string(),
                reason: self.reason.to_string(),
                message: self.message(),
                fields: self
                    .source
                    .as_ref()
                    .and_then(|e| e.downcast_ref::<FormErrors>())
                    .cloned(),
            },
        };

        match serde_json::to_string(&error) {
            Ok(body) => HttpResponse::build(self.status_code())
                .insert_header(ContentType::json())
                .body(body),
            Err(_) => HttpResponse::build(self.status_code()).finish(),
        }
    }

    fn status_code(&self) -> StatusCode {
        self.reason.code().status_code()
    }
}

impl From<bdr_api::BdrApiError> for HTTPError {
    fn from(err: bdr_api::BdrApiError) -> Self {
        let reason = ReasonCode::from_bdr_api_error(&err);
        HTTPError::new(reason, Some(Box::new(err)))
    }
}

impl From<FormErrors> for HTTPError {
    fn from(err: FormErrors) -> Self {
        HTTPError::new(ReasonCode::FormInvalid, Some(Box::new(err)))
    }
}
