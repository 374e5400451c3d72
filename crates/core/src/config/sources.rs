use std::fmt;

/// Where a generator setting came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A `DIMARK_*` environment variable
    EnvVar(String),
    /// A field of the loaded YAML file
    File { path: String, field: String },
    /// The built-in default
    Default(String),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::EnvVar(var) => write!(f, "environment variable {}", var),
            ConfigSource::File { path, field } => write!(f, "'{}' in {}", field, path),
            ConfigSource::Default(value) => write!(f, "default '{}'", value),
        }
    }
}
