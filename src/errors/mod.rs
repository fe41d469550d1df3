//! Centralized error handling module
//!
//! Structured, typed errors for the panel core. CLI and daemon glue keep
//! using `anyhow` for context chains and convert at the boundary.

pub mod types;

pub use types::{AppError, AppResult};

/// Convert from anyhow::Error to AppError at the library boundary
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
            source: None,
        }
    }
}
