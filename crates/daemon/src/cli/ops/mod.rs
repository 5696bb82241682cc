pub mod daemon;
pub mod health;
pub mod recv;
pub mod send;
pub mod version;

pub use daemon::Daemon;
pub use health::Health;
pub use recv::RecvSecret;
pub use send::SendSecret;
pub use version::Version;
