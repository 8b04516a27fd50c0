use thiserror::Error;

/// Main error type for the tailwind-theme crate
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A required field is missing, empty or malformed
    #[error("Invalid config shape at `{field}`: {message}")]
    ConfigShape { field: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to evaluate JS config {path}: {message}")]
    JsConfig { path: String, message: String },

    #[error("Failed to write output to {path}: {message}")]
    OutputError { path: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ThemeError {
    pub(crate) fn shape(field: impl Into<String>, message: impl Into<String>) -> Self {
        ThemeError::ConfigShape {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a configuration shape violation
    pub fn is_config_shape(&self) -> bool {
        matches!(self, ThemeError::ConfigShape { .. })
    }
}

pub type Result<T> = std::result::Result<T, ThemeError>;
