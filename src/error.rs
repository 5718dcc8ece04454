// src/error.rs

//! Error types for portcheck
//!
//! Per-package lookup failures never surface here; they are absorbed into
//! an `Error` classification on the affected node. This type covers
//! call-level failures only.

use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Failed to construct a component (HTTP client, store, ...)
    #[error("Initialization error: {0}")]
    InitError(String),

    /// Registry request failed at the transport or HTTP level
    #[error("Download error: {0}")]
    DownloadError(String),

    /// Malformed registry response, index file or stored value
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The caller invoked an operation with unusable arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration file or value problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// The run was cancelled through its cancellation token
    #[error("Investigation cancelled")]
    Cancelled,

    /// The run exceeded its configured deadline
    #[error("Investigation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
