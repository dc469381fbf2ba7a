// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for Vitrine

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Vitrine operations
pub type Result<T> = std::result::Result<T, VitrineError>;

/// Vitrine error types
#[derive(Error, Debug)]
pub enum VitrineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Cannot list {path:?}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed fallback data: {0}")]
    Fallback(String),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
