use cw_core::CoreError;
use glam::IVec2;

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Conditions that abort a tick.
///
/// Per-cell inconsistencies (missing targets, coincident centers) never show
/// up here; systems skip them and keep going.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The configuration cannot drive a simulation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A broadphase bucket holds more cells than the configured limit.
    #[error("grid bucket {coord} holds {occupancy} cells (limit {limit})")]
    GridCapacity {
        /// Grid coordinate of the overfull bucket.
        coord: IVec2,
        /// Number of cells in the bucket.
        occupancy: usize,
        /// Configured `max_bucket_occupancy`.
        limit: usize,
    },

    /// A store operation failed outside the skip-and-continue paths.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A custom system failed.
    #[error("system error: {0}")]
    SystemError(String),
}
