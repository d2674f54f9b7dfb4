use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the road-lane annotation model.
#[derive(Debug, Error)]
pub enum RoadLaneError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Errors related to curve fitting and entity geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("insufficient geometry: {found} distinct points, at least {required} required")]
    InsufficientPoints { required: usize, found: usize },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors raised while reading or writing annotation and descriptor files.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("xml error: {0}")]
    Xml(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while rasterizing or saving a label mask.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("invalid mask dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("image error on {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }
}

/// Convenience type alias for results using [`RoadLaneError`].
pub type Result<T> = std::result::Result<T, RoadLaneError>;
