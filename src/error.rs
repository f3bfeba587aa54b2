// error.rs
// Error type for the configuration, batch and export surfaces.
// The packing kernel itself never returns errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse bundle config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to write bundle config: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid packing parameters: {0}")]
    InvalidParams(String),

    /// A `[[wires]]` entry that cannot be expanded into radii.
    #[error("Invalid wire entry #{index}: {reason}")]
    InvalidWire { index: usize, reason: String },

    #[error("Bundle contains no wires with a positive radius")]
    EmptyBundle,

    /// Bad command-line arguments.
    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, BundleError>;
