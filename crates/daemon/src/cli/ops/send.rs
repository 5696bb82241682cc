use std::io::Read;

use clap::Args;

use common::prelude::{Expiration, MAX_SECRET_BYTES};
use relay_daemon::http_server::api::client::ApiError;
use relay_daemon::http_server::api::v1::secret::CreateRequest;

#[derive(Args, Debug, Clone)]
pub struct SendSecret {
    /// Secret to share, read from stdin when omitted
    #[arg(long)]
    pub text: Option<String>,

    /// How long the secret stays readable: 1h, 1d or 1w
    #[arg(long, short, default_value_t = Expiration::OneHour)]
    pub expiration: Expiration,
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("failed to read secret from stdin: {0}")]
    Stdin(#[from] std::io::Error),
    #[error("secret is empty")]
    Empty,
    #[error("secret is {0} bytes, at most {max} are allowed", max = MAX_SECRET_BYTES)]
    TooLong(usize),
    #[error("relay rejected the secret: {0}")]
    Api(#[from] ApiError),
}

impl crate::cli::op::ExitCode for SendError {}

#[async_trait::async_trait]
impl crate::cli::op::Op for SendSecret {
    type Error = SendError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let secret = match &self.text {
            Some(text) => text.clone(),
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf.trim_end_matches('\n').to_string()
            }
        };
        if secret.is_empty() {
            return Err(SendError::Empty);
        }
        // the server checks this too, fail early without a round trip
        if secret.len() > MAX_SECRET_BYTES {
            return Err(SendError::TooLong(secret.len()));
        }

        let response = ctx
            .client
            .call(CreateRequest {
                secret,
                expiration: self.expiration.into(),
            })
            .await?;

        let base = ctx.client.base_url().as_str().trim_end_matches('/');
        Ok(format!(
            "key:     {}\nexpires: {}\nurl:     {}/#/s/{}",
            response.key, self.expiration, base, response.key
        ))
    }
}
