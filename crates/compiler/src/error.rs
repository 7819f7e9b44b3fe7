//! Compiler errors

use apinotes_store::WriteError;
use thiserror::Error;

/// Why compiling a module's notes produced no container
#[derive(Debug, Error)]
pub enum CompileError {
    /// Input text is not a valid notes document
    #[error("Failed to parse API notes: {0}")]
    Parse(#[source] serde_json::Error),

    /// Conversion reported errors to the diagnostic sink
    #[error("API notes conversion failed with {errors} error(s)")]
    Diagnostics {
        /// Number of errors reported
        errors: usize,
    },

    /// Serializing the container failed
    #[error("Failed to write API notes: {0}")]
    Write(#[from] WriteError),
}
