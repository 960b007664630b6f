use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core and its surrounding layers.
///
/// Every failure is terminal to the operation that raised it and is returned to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Two overlapping particles share the same center, so the line of centers is undefined.
    #[error("degenerate contact: particles {i} and {j} have coincident centers")]
    DegenerateContact { i: usize, j: usize },

    /// A computation produced NaN or infinity.
    #[error("non-finite value: {0}")]
    NonFinite(String),

    /// Rejection sampling gave up after the configured number of attempts.
    #[error("could not place particle {index} without overlap after {attempts} attempts")]
    PlacementInfeasible { index: usize, attempts: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("scenario config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
