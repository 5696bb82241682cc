use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::{RelayError, SecretId, ValidationError};

use super::{message, respond};
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    /// The payload to hand over, at most 10000 bytes
    pub secret: String,
    /// Lifetime in seconds: 3600, 86400 or 604800
    pub expiration: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponse {
    /// Redeems the secret exactly once. Anyone holding it can read it.
    pub key: SecretId,
    pub message: String,
}

/// The body is decoded by hand so that any malformed input, whatever
///  its content type, gets the same answer.
///
/// A body over [`MAX_REQUEST_BODY_BYTES`] is never parsed, so it is
///  reported as too long even when its expiration is also invalid.
///  Below that limit the expiration is checked first.
///
/// [`MAX_REQUEST_BODY_BYTES`]: crate::http_server::MAX_REQUEST_BODY_BYTES
pub async fn handler(
    State(state): State<ServiceState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, CreateError> {
    let body = body.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            CreateError::BodyTooLarge
        } else {
            CreateError::Body(e.body_text())
        }
    })?;
    let req: CreateRequest = serde_json::from_slice(&body)?;

    let expiration = req.expiration;
    let key = state.relay().issue(req.secret, expiration).await?;
    tracing::info!(expiration, "secret stored");

    Ok(respond(
        StatusCode::OK,
        CreateResponse {
            key,
            message: "secret stored".to_string(),
        },
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("unreadable request body: {0}")]
    Body(String),
    #[error("request body exceeds the size limit")]
    BodyTooLarge,
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        match self {
            e @ (CreateError::Body(_) | CreateError::Json(_)) => {
                tracing::debug!("CREATE SECRET: {}", e);
                message(StatusCode::BAD_REQUEST, "Unable to parse json")
            }
            CreateError::BodyTooLarge
            | CreateError::Relay(RelayError::Validation(ValidationError::TooLong(_))) => {
                message(StatusCode::BAD_REQUEST, "Message is too long")
            }
            CreateError::Relay(RelayError::Validation(ValidationError::Expiration(_))) => {
                message(StatusCode::BAD_REQUEST, "Invalid expiration specified")
            }
            CreateError::Relay(e) => {
                tracing::error!("CREATE SECRET ERROR: {}", e);
                message(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store secret in database",
                )
            }
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for CreateRequest {
    type Response = CreateResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/v1/secret")?;
        Ok(client.post(full_url).json(&self))
    }
}

#[cfg(test)]
mod tests {
    use common::prelude::{InvalidExpiration, StoreError};

    use super::*;

    #[test]
    fn test_error_statuses() {
        let cases = [
            (CreateError::Body("eof".into()), StatusCode::BAD_REQUEST),
            (CreateError::BodyTooLarge, StatusCode::BAD_REQUEST),
            (
                CreateError::Relay(RelayError::Validation(ValidationError::Expiration(
                    InvalidExpiration(60),
                ))),
                StatusCode::BAD_REQUEST,
            ),
            (
                CreateError::Relay(RelayError::Write(StoreError::Backend("down".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            let response = err.into_response();
            assert_eq!(response.status(), status);
            assert_eq!(response.headers()[axum::http::header::CACHE_CONTROL], "no-store");
        }
    }

    #[test]
    fn test_build_request() {
        let base = Url::parse("http://localhost:1337").unwrap();
        let request = CreateRequest {
            secret: "hunter2".into(),
            expiration: 3600,
        }
        .build_request(&base, &Client::new())
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "http://localhost:1337/v1/secret");
    }
}
