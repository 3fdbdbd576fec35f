//! Request logging and error envelope finalization.

use crate::api::error::ApiError;
use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Header carrying the request correlation id in both directions.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Logs one line per request inside an `http_request` span.
///
/// The correlation id is taken from the incoming header or generated, attached
/// to the span, and echoed on the response.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let correlation_id = request
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let span = info_span!("http_request", correlation_id = %correlation_id, %method, %path);

    let started = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

    span.in_scope(|| {
        let status = response.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), duration_ms, "http_request");
        } else {
            info!(status = status.as_u16(), duration_ms, "http_request");
        }
    });

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

/// Stamps `path` onto error bodies and turns bare transport errors into JSON.
///
/// Responses carrying an [`ApiError`] extension are re-rendered with the
/// request path. Any other 4xx/5xx without a JSON body (405 from the method
/// router, rejections from third-party extractors, ...) becomes an
/// [`ApiError::Http`] envelope with the same status.
pub async fn error_envelope(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if let Some(error) = response.extensions_mut().remove::<ApiError>() {
        return replace_body(response, &error, &path);
    }

    let status = response.status();
    if (status.is_client_error() || status.is_server_error()) && !is_json(&response) {
        return replace_body(response, &ApiError::from_status(status), &path);
    }
    response
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

fn replace_body(original: Response, error: &ApiError, path: &str) -> Response {
    let mut rendered = error.render(path);
    if let Some(allow) = original.headers().get(header::ALLOW) {
        rendered.headers_mut().insert(header::ALLOW, allow.clone());
    }
    rendered
}
