//! Error types surfaced by the geometry backend and the contour loader.

/// Failure raised by a geometry-backend operation while the recoverable
/// failure policy is active. Under the aborting policy the backend panics
/// instead of returning these.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum BackendError {
    /// Plane intersection could not produce a planar section.
    #[error("plane intersection failed: {0}")]
    PlaneIntersection(String),
    /// Convex-hull construction failed on degenerate input.
    #[error("convex hull construction failed: {0}")]
    ConvexHull(String),
    /// A Boolean combination could not be evaluated.
    #[error("boolean operation failed: {0}")]
    Boolean(String),
    /// The operation is not defined for this solid representation.
    #[error("operation not defined for this representation: {0}")]
    Unsupported(&'static str),
    /// A contour with fewer than 3 distinct points, or with no area.
    #[error("degenerate contour")]
    DegenerateContour,
}

/// Errors raised while loading contour data from a DXF source.
#[derive(Debug, thiserror::Error)]
pub enum ContourLoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("DXF parse error: {0}")]
    Dxf(#[from] dxf::DxfError),
}
