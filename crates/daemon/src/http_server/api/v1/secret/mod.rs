//! `/v1/secret`: issue a secret, redeem it once.
//!
//! Both endpoints answer with JSON and mark responses as not
//!  cacheable; a redeemed payload must not survive in an
//!  intermediate cache.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

pub mod create;
pub mod get;

pub use create::{CreateRequest, CreateResponse};
pub use get::{GetSecretRequest, GetSecretResponse};

use super::MessageResponse;
use crate::http_server::handlers::bad_method_handler;
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/secret", post(create::handler).fallback(bad_method_handler))
        // the wildcard never matches an empty id, which is still a bad url
        .route(
            "/secret/",
            get(get::handler)
                .head(bad_method_handler)
                .fallback(bad_method_handler),
        )
        // HEAD would otherwise reach the GET handler and burn the secret
        .route(
            "/secret/*id",
            get(get::handler)
                .head(bad_method_handler)
                .fallback(bad_method_handler),
        )
        .with_state(state)
}

/// JSON body plus the headers every secret endpoint sends.
fn respond<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn message(status: StatusCode, message: &str) -> Response {
    respond(status, MessageResponse::new(message))
}
