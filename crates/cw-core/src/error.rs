use crate::cell::CellId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when manipulating the cell store.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested cell ID does not exist in the world.
    #[error("cell not found: {0}")]
    CellNotFound(CellId),

    /// A cell with the same ID is already stored.
    #[error("cell already exists: {0}")]
    DuplicateCell(CellId),

    /// A cell or constraint violates a physical invariant.
    #[error("validation error: {0}")]
    Validation(String),
}
