pub use clap::Parser;

use url::Url;

#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(about = "Share secrets that can be read exactly once")]
pub struct Args {
    /// Address of a running relay, used by the client commands
    #[arg(
        long,
        global = true,
        env = "RELAY_REMOTE",
        default_value = "http://localhost:1337"
    )]
    pub remote: Url,

    #[command(subcommand)]
    pub command: crate::Command,
}
