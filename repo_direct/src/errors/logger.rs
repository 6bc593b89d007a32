use super::http::HTTPError;
use super::reason::ReasonCode;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use tracing::{error, warn};

/// Logs failed requests with their full error chain. Internal errors also go to
/// Sentry when it is configured.
pub struct TracingMiddleware;

impl<S, B> Transform<S, ServiceRequest> for TracingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TracingMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TracingMiddlewareService { service }))
    }
}

pub struct TracingMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TracingMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().to_string();
        let path = req.path().to_string();

        let fut = self.service.call(req);

        Box::pin(async move {
            match fut.await {
                Ok(res) => {
                    if let Some(err) = res.response().error() {
                        if let Some(err) = err.as_error::<HTTPError>() {
                            let output = error_chain(err);
                            if err.reason == ReasonCode::Internal {
                                let mut e = sentry::event_from_error(err);
                                // Reverse the errors (Sentry seems to have a bug)
                                e.exception.values.reverse();
                                sentry::capture_event(e);
                                error!(%method, %path, "Error: {output}");
                            } else {
                                warn!(%method, %path, "Error: {output}");
                            }
                        } else {
                            error!(%method, %path, "Error: {err:?}");
                        }
                    }

                    Ok(res)
                }
                Err(err) => {
                    error!(%method, %path, "Error occurred: {}", err);
                    Err(err)
                }
            }
        })
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut output = format!("{err}");
    let mut error = err;
    while let Some(source) = error.source() {
        output = format!("{output}\n  Caused by: {source}");
        error = source;
    }
    output
}
