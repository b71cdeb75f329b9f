//! Error types for pipeline synthesis

use thiserror::Error;

/// Result type alias for synthesis operations
pub type Result<T> = std::result::Result<T, SynthError>;

/// Errors that can occur while synthesizing a pipeline stack
///
/// All of these are configuration problems surfaced at synthesis time.
/// Nothing is retried and no partial stack is returned.
#[derive(Debug, Error)]
pub enum SynthError {
    /// A required key is absent
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// A key is present but its value cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No SSM parameters were resolved for a region that needs them
    #[error("No resolved parameters for region '{0}'")]
    MissingRegionParams(String),

    /// The deployment region/account pair is unusable
    #[error("Invalid deployment context: {0}")]
    InvalidContext(String),

    /// Input file could not be read
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// YAML input failed to parse or type-check
    #[error("Failed to parse YAML input: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON input failed to parse, or output failed to serialize
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SynthError {
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingConfig(path.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Check if this error comes from the input document itself
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::MissingConfig(_)
                | Self::InvalidConfig(_)
                | Self::MissingRegionParams(_)
                | Self::Yaml(_)
                | Self::Json(_)
        )
    }
}
