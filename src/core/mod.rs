/// Core modules containing constants, settings and shared error types
pub mod constants;
pub mod error;
pub mod settings;

// Re-export commonly used items for convenience
pub use error::{ConfigError, LifecycleError, WorkerError};
pub use settings::LandscapeSettings;
