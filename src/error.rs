//! Error types for data loading and tile image decoding.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to read a record source as a whole.
///
/// Individual bad records never produce an error; they are skipped.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is empty")]
    Empty { path: PathBuf },
}

/// Reasons a tile image is unavailable.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("no image file for tile {0}")]
    Missing(usize),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad image signature or undecodable data in {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("tile image is {width}x{height}, expected {expected_width}x{expected_height}")]
    WrongDimensions {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("unsupported bit depth: {0}")]
    UnsupportedDepth(String),
}

impl ImageError {
    /// Missing files are routine; everything else means a broken asset.
    pub fn is_missing(&self) -> bool {
        matches!(self, ImageError::Missing(_))
            || matches!(self, ImageError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Failures of a display/input frontend.
#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("window error: {0}")]
    Window(String),
}
