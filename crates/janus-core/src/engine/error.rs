use super::config::ConfigError;
use crate::core::models::grid::GridError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    InvalidGeometry {
        #[from]
        source: GridError,
    },

    #[error("Invalid configuration: {source}")]
    InvalidConfig {
        #[from]
        source: ConfigError,
    },

    #[error("A relaxation run is active; stop it before changing the model")]
    RunActive,

    #[error("No relaxation run is active")]
    NotRunning,

    #[error("Model lock was poisoned by a panic inside a relaxation step")]
    LockPoisoned,

    #[error("Relaxation worker failed: {0}")]
    Worker(String),
}
