use thiserror::Error;

use crate::renderer::{FontError, SurfaceError};
use crate::storage::StoreError;

/// Errors that stop the application from starting
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no usable fonts: {0}")]
    Font(#[from] FontError),

    #[error("could not create the drawing surface: {0}")]
    Surface(#[from] SurfaceError),

    #[error("could not start saving drawings: {0}")]
    Store(#[from] StoreError),
}
