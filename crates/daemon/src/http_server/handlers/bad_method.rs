use axum::extract::OriginalUri;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::http_server::api::v1::MessageResponse;

/// Fallback for verbs an endpoint doesn't serve. These are reported
///  as bad requests rather than 405s.
pub async fn bad_method_handler(method: Method, OriginalUri(uri): OriginalUri) -> Response {
    tracing::debug!(%method, path = uri.path(), "unsupported method");
    (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse::new(format!(
            "Bad Request, {} is not supported on {}",
            method,
            uri.path()
        ))),
    )
        .into_response()
}
