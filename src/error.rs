use thiserror::Error;

/// Rejected shape construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("point cloud requires at least one vertex")]
    EmptyPointCloud,
    #[error("cuboid minimum exceeds maximum on the {axis} axis")]
    InvertedExtents { axis: char },
}
