//! Error types for CropScan.
//!
//! `AnalysisError` is the pipeline taxonomy: every variant is caught at the
//! `Analyzer` boundary and turned into a fallback result, so callers of
//! `Analyzer::analyze` never see one. The remaining types cover configuration
//! loading and the general library surface.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for CropScan operations.
#[derive(Error, Debug)]
pub enum CropScanError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Analysis pipeline errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures of the analysis pipeline, one variant per stage.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Product label was empty after trimming
    #[error("Product label must not be empty")]
    InvalidLabel,

    /// The image could not be read from disk
    #[error("Failed to read image {path}: {message}")]
    Encoding { path: PathBuf, message: String },

    /// No service credential configured for the remote path
    #[error("Remote analysis not configured: {0}")]
    Configuration(String),

    /// Every attempt was rate-limited or hit a transport fault
    #[error("Remote analysis failed after {attempts} attempts: {last_failure}")]
    TransportExhausted { attempts: u32, last_failure: String },

    /// The service answered with a non-success status
    #[error("Remote analysis HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The response envelope carried no text
    #[error("Remote analysis returned an empty response")]
    EmptyResponse,

    /// The response text held no parsable assessment
    #[error("Remote analysis returned malformed output: {0}")]
    MalformedResponse(String),
}

/// Convenience type alias for CropScan results.
pub type Result<T> = std::result::Result<T, CropScanError>;

/// Convenience type alias for analysis pipeline results.
pub type PipelineResult<T> = std::result::Result<T, AnalysisError>;
