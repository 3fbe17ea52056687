//! Error type for the fallible edges of the crate
//!
//! Gameplay results (incompletions, tackles, interceptions) are ordinary enum
//! values returned by the simulation. `SimError` is reserved for bad input at
//! the boundary: unknown names, out-of-range indices, unreadable settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// A value that should be impossible given the closed sets the engine knows
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
