use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("relay at {0} is not ready")]
    NotReady(String),
}

impl crate::cli::op::ExitCode for HealthError {}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let base = ctx.client.base_url();
        let client = ctx.client.http_client();

        let mut lines = vec![format!("Relay ({}):", base)];
        let mut ready = true;

        for check in ["livez", "readyz"] {
            let url = format!("{}/_status/{}", base.as_str().trim_end_matches('/'), check);
            let status = match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => "OK".to_string(),
                Ok(resp) => {
                    ready = false;
                    format!("UNHEALTHY ({})", resp.status())
                }
                Err(_) => {
                    ready = false;
                    "NOT REACHABLE".to_string()
                }
            };
            lines.push(format!("  {:<7} {}", format!("{check}:"), status));
        }

        if !ready {
            eprintln!("{}", lines.join("\n"));
            return Err(HealthError::NotReady(base.to_string()));
        }
        Ok(lines.join("\n"))
    }
}
