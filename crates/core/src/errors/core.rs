use thiserror::Error;

use crate::config::ConfigError;

/// Core error type for the dimark pipeline
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid type reference '{reference}': {message}")]
    InvalidTypeReference { reference: String, message: String },

    #[error("Unsupported input format: {path}")]
    UnsupportedInput { path: String },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error("Codegen error: {message}")]
    Codegen { message: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl CoreError {
    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new invalid type reference error
    pub fn invalid_type_reference(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTypeReference {
            reference: reference.into(),
            message: message.into(),
        }
    }

    /// Create a new lock error
    pub fn lock(resource: impl Into<String>) -> Self {
        Self::LockError {
            resource: resource.into(),
        }
    }

    /// Create a new codegen error
    pub fn codegen(message: impl Into<String>) -> Self {
        Self::Codegen {
            message: message.into(),
        }
    }

    /// Create a new template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Check if the pipeline was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if the error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if the error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
