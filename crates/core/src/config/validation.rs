use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Environment variable error: {message}")]
    EnvironmentError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create an environment error
    pub fn environment_error(message: impl Into<String>) -> Self {
        Self::EnvironmentError {
            message: message.into(),
        }
    }
}

/// Trait for validating configuration values
pub trait ConfigValidator<T: ?Sized> {
    /// Validate a configuration value
    fn validate(&self, value: &T) -> Result<(), ConfigError>;
}

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
    })
}

/// Validates a single C# identifier
pub struct IdentifierValidator {
    pub field: &'static str,
}

impl ConfigValidator<str> for IdentifierValidator {
    fn validate(&self, value: &str) -> Result<(), ConfigError> {
        if !identifier_regex().is_match(value) {
            return Err(ConfigError::invalid_value(
                self.field,
                value,
                "identifier made of letters, digits and '_' not starting with a digit",
            ));
        }
        Ok(())
    }
}

/// Validates a dotted namespace or qualified type name
pub struct QualifiedNameValidator {
    pub field: &'static str,
    pub allow_empty: bool,
}

impl ConfigValidator<str> for QualifiedNameValidator {
    fn validate(&self, value: &str) -> Result<(), ConfigError> {
        if value.is_empty() {
            if self.allow_empty {
                return Ok(());
            }
            return Err(ConfigError::missing_required(
                self.field,
                "A qualified name is required",
            ));
        }

        let valid = value
            .split('.')
            .all(|segment| identifier_regex().is_match(segment));
        if !valid {
            return Err(ConfigError::invalid_value(
                self.field,
                value,
                "dot separated identifiers",
            ));
        }
        Ok(())
    }
}
