// Service modules (daemon functionality)
pub mod database;
pub mod http_server;
pub mod process;
pub mod secret_store;
pub mod service_config;
pub mod service_state;

// App state (configuration, paths)
pub mod state;

// Re-exports for consumers (CLI ops, integration tests)
pub use database::models::SharedSecret;
pub use database::types::DUuid;
pub use database::Database;
pub use process::{spawn_service, start_service, ShutdownHandle};
pub use secret_store::{Clock, SecretStore, StoreError, SystemClock, TtlPolicy};
pub use service_config::Config as ServiceConfig;
pub use service_state::State as ServiceState;
pub use state::{AppConfig, AppState, StateError};
