/// Convenience result type used across Laminate.
pub type LaminateResult<T> = Result<T, LaminateError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant aborts the whole render: there is no per-layer recovery.
#[derive(thiserror::Error, Debug)]
pub enum LaminateError {
    /// The composition document failed schema checks.
    #[error("validation error: {0}")]
    Validation(String),

    /// An origin or alignment descriptor contained an unknown token.
    #[error("invalid origin: {0}")]
    InvalidOrigin(String),

    /// Gradient geometry received inputs it cannot work with.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// A referenced image or nested composition could not be fetched.
    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),

    /// Nested compositions reference each other in a loop, or nest too deeply.
    #[error("reference cycle: {0}")]
    ReferenceCycle(String),

    /// Low-level resize/blend/position step failed.
    #[error("Could not perform operation: {0}")]
    CompositeOperation(String),

    /// Raster encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LaminateError {
    /// Build a [`LaminateError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LaminateError::InvalidOrigin`] value.
    pub fn invalid_origin(msg: impl Into<String>) -> Self {
        Self::InvalidOrigin(msg.into())
    }

    /// Build a [`LaminateError::UnresolvedReference`] value.
    pub fn unresolved(msg: impl Into<String>) -> Self {
        Self::UnresolvedReference(msg.into())
    }

    /// Build a [`LaminateError::ReferenceCycle`] value.
    pub fn reference_cycle(msg: impl Into<String>) -> Self {
        Self::ReferenceCycle(msg.into())
    }

    /// Build a [`LaminateError::CompositeOperation`] value.
    pub fn composite(msg: impl Into<String>) -> Self {
        Self::CompositeOperation(msg.into())
    }

    /// Build a [`LaminateError::Codec`] value.
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }
}

/// Failures raised by the line calculus behind gradient rasterization.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A point had a non-finite coordinate.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Two lines never meet in exactly one point.
    #[error("lines do not intersect (parallel or identical)")]
    ParallelOrIdenticalLines,

    /// The operation needs a line segment with both start and end set.
    #[error("line needs two points (start and end)")]
    IncompleteLine,

    /// A point expected on a line was too far from it.
    #[error("point is {distance} away from line (tolerance {tolerance})")]
    PointNotOnLine {
        /// Measured vertical (or horizontal, for vertical lines) deviation.
        distance: f64,
        /// Allowed deviation.
        tolerance: f64,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
