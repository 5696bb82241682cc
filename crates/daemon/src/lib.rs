pub mod http_server;
pub mod process;
pub mod service_config;
pub mod service_state;

// Re-exports for consumers (the CLI, integration tests)
pub use process::{spawn_service, start_service, ShutdownHandle};
pub use service_config::Config as ServiceConfig;
pub use service_state::State as ServiceState;
