//! Gesture pipeline error types

use thiserror::Error;

/// Errors surfaced by the gesture pipeline's configuration and host API.
///
/// Gesture recognition itself never fails: contract violations inside a pass
/// are clamped and logged rather than returned.
#[derive(Error, Debug)]
pub enum GestureError {
    /// A configuration value is out of range
    #[error("Invalid gesture config: {0}")]
    InvalidConfig(String),

    /// A configuration document could not be parsed
    #[error("Failed to parse gesture config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A filter handle does not refer to a registered filter
    #[error("Unknown gesture filter: {0}")]
    UnknownFilter(String),
}

/// Result type for gesture pipeline operations
pub type Result<T> = std::result::Result<T, GestureError>;
