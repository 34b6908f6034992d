// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a report run.
///
/// Sparse data is never an error: swimmers and events below their
/// observation thresholds are skipped by the renderer instead.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed meet file {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unreadable archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("animation encoding failed for {path}: {source}")]
    Gif {
        path: PathBuf,
        #[source]
        source: gif::EncodingError,
    },

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("chart drawing failed: {0}")]
    Plot(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io { path: path.into(), source }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
