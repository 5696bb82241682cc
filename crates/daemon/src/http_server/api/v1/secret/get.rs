use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::RelayError;

use super::{message, respond};
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

/// Redeem the secret stored under `id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSecretRequest {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSecretResponse {
    pub secret: String,
    pub message: String,
}

/// Everything after `/v1/secret/` is captured so that any malformed
///  id, including ones with extra segments, is a bad url. Also mounted
///  on `/v1/secret/` itself, where the missing id is rejected the same way.
pub async fn handler(
    State(state): State<ServiceState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Response, GetSecretError> {
    let Path(id) = id.map_err(|_| GetSecretError::BadUrl)?;

    let secret = state.relay().redeem(&id).await?;
    tracing::info!("secret redeemed");

    Ok(respond(
        StatusCode::OK,
        GetSecretResponse {
            secret,
            message: "OK".to_string(),
        },
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum GetSecretError {
    #[error("path is not a secret url")]
    BadUrl,
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl IntoResponse for GetSecretError {
    fn into_response(self) -> Response {
        match self {
            GetSecretError::BadUrl | GetSecretError::Relay(RelayError::MalformedId) => {
                message(StatusCode::BAD_REQUEST, "Bad URL")
            }
            GetSecretError::Relay(RelayError::NotFound) => {
                message(StatusCode::NOT_FOUND, "Secret not found")
            }
            GetSecretError::Relay(e) => {
                tracing::error!("GET SECRET ERROR: {}", e);
                message(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unable to receive secret from database",
                )
            }
        }
    }
}

impl ApiRequest for GetSecretRequest {
    type Response = GetSecretResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("/v1/secret/{}", self.id))?;
        Ok(client.get(full_url))
    }
}
