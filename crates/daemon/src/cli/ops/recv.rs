use clap::Args;

use relay_daemon::http_server::api::client::ApiError;
use relay_daemon::http_server::api::v1::secret::GetSecretRequest;

#[derive(Args, Debug, Clone)]
pub struct RecvSecret {
    /// The key printed by `send`, or the full url
    pub key: String,
}

impl RecvSecret {
    /// Accepts either a bare key or any url whose last path segment is the key.
    fn key(&self) -> &str {
        self.key
            .trim()
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecvError {
    #[error("{0}")]
    Api(#[from] ApiError),
}

impl crate::cli::op::ExitCode for RecvError {}

#[async_trait::async_trait]
impl crate::cli::op::Op for RecvSecret {
    type Error = RecvError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx
            .client
            .call(GetSecretRequest {
                id: self.key().to_string(),
            })
            .await?;
        Ok(response.secret)
    }
}
