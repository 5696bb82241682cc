mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

/// A typed request against the relay api. Implemented next to the
///  handler that serves it so both sides agree on the shape.
pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError>;
}
