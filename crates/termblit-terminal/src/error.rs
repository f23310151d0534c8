//! Error types for termblit-terminal.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can occur in the rendering core.
///
/// Geometry problems never surface here: out-of-range draws clip or skip,
/// because draw calls arrive with loosely-validated animation-driven
/// coordinates every frame.
#[derive(Debug, Error)]
pub enum RenderError {
    /// IO error from the output sink.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Buffer allocation failed during canvas creation.
    #[error("canvas allocation failed: {0}")]
    Alloc(#[from] TryReserveError),
}
