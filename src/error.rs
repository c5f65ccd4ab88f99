//! Error types for loading, importing and exporting sessions
//!
//! Playback never produces these: media start failures are soft and are
//! reported through `PlayOutcome` instead.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewerError>;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Package has no {0} entry")]
    MissingManifest(&'static str),

    #[error("Package manifest names media file {0:?} but the archive has no such entry")]
    MissingMediaEntry(String),

    #[error("Package entry {name} declares {declared} bytes but holds {actual}")]
    CorruptEntry {
        name: String,
        declared: u64,
        actual: u64,
    },

    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    #[error("PDF error in {file}: {reason}")]
    Pdf { file: String, reason: String },

    #[error("Settings error: {0}")]
    Settings(String),
}
