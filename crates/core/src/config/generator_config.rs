use crate::config::{
    ConfigError, ConfigSource, ConfigValidator, IdentifierValidator, QualifiedNameValidator,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::Path;

pub const ENV_RUNTIME_NAMESPACE: &str = "DIMARK_RUNTIME_NAMESPACE";
pub const ENV_MARKER_NAMESPACE: &str = "DIMARK_MARKER_NAMESPACE";
pub const ENV_MODULE_INTERFACE: &str = "DIMARK_MODULE_INTERFACE";
pub const ENV_REGISTRATION_TARGET: &str = "DIMARK_REGISTRATION_TARGET";
pub const ENV_DISCOVERY_MARKER: &str = "DIMARK_DISCOVERY_MARKER";
pub const ENV_EMIT_DOCUMENTATION: &str = "DIMARK_EMIT_DOCUMENTATION";

/// Configuration trait for loadable generator settings
pub trait ConfigTrait: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Settings that shape what the generator recognizes and emits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Namespace of the runtime library the generated code calls into
    pub runtime_namespace: String,
    /// Namespace the marker attributes live in
    pub marker_namespace: String,
    /// Fully qualified module contract interface
    pub module_interface: String,
    /// Fully qualified registration target interface
    pub registration_target: String,
    /// Simple name of the module discovery marker attribute
    pub discovery_marker: String,
    /// Copy member documentation onto generated interface members
    pub emit_documentation: bool,
    #[serde(skip)]
    loaded_from: Option<String>,
}

impl GeneratorConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            runtime_namespace: "DiMark".to_string(),
            marker_namespace: "DiMark".to_string(),
            module_interface: "DiMark.IServiceModule".to_string(),
            registration_target: "DiMark.IRegistrationTarget".to_string(),
            discovery_marker: "AutoDiscoverModule".to_string(),
            emit_documentation: true,
            loaded_from: None,
        }
    }

    /// Parse configuration from YAML, missing fields keep their defaults
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&content)?;
        config.loaded_from = Some(path.display().to_string());
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Point the generated code at a different runtime namespace
    pub fn with_runtime_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.module_interface = format!("{}.IServiceModule", namespace);
        self.registration_target = format!("{}.IRegistrationTarget", namespace);
        self.runtime_namespace = namespace;
        self
    }

    /// Recognize marker attributes from a different namespace
    pub fn with_marker_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.marker_namespace = namespace.into();
        self
    }

    /// Enable or disable copying member documentation
    pub fn with_documentation(mut self, emit: bool) -> Self {
        self.emit_documentation = emit;
        self
    }

    /// Fully qualified lifetime enumeration used in registration calls
    pub fn lifetime_enum(&self) -> String {
        format!("{}.ServiceLifetime", self.runtime_namespace)
    }

    /// Fully qualified caller-owned module registry type
    pub fn module_registry(&self) -> String {
        format!("{}.ModuleRegistry", self.runtime_namespace)
    }

    /// Fully qualified discovery marker attribute
    pub fn discovery_attribute(&self) -> String {
        if self.marker_namespace.is_empty() {
            self.discovery_marker.clone()
        } else {
            format!("{}.{}", self.marker_namespace, self.discovery_marker)
        }
    }

    /// File the configuration was read from, if any
    pub fn loaded_from(&self) -> Option<&str> {
        self.loaded_from.as_deref()
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(namespace) = env::var(ENV_RUNTIME_NAMESPACE) {
            *self = std::mem::take(self).with_runtime_namespace(namespace);
        }

        if let Ok(namespace) = env::var(ENV_MARKER_NAMESPACE) {
            self.marker_namespace = namespace;
        }

        if let Ok(interface) = env::var(ENV_MODULE_INTERFACE) {
            self.module_interface = interface;
        }

        if let Ok(target) = env::var(ENV_REGISTRATION_TARGET) {
            self.registration_target = target;
        }

        if let Ok(marker) = env::var(ENV_DISCOVERY_MARKER) {
            self.discovery_marker = marker;
        }

        if let Ok(emit) = env::var(ENV_EMIT_DOCUMENTATION) {
            self.emit_documentation = emit.parse().map_err(|_| {
                ConfigError::invalid_value("emit_documentation", emit, "true or false")
            })?;
        }

        Ok(())
    }

    fn source_of(&self, field: &str, var: &str, default: &str) -> ConfigSource {
        if env::var(var).is_ok() {
            ConfigSource::EnvVar(var.to_string())
        } else if let Some(path) = &self.loaded_from {
            ConfigSource::File {
                path: path.clone(),
                field: field.to_string(),
            }
        } else {
            ConfigSource::Default(default.to_string())
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTrait for GeneratorConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        QualifiedNameValidator {
            field: "runtime_namespace",
            allow_empty: false,
        }
        .validate(&self.runtime_namespace)?;

        QualifiedNameValidator {
            field: "marker_namespace",
            allow_empty: true,
        }
        .validate(&self.marker_namespace)?;

        QualifiedNameValidator {
            field: "module_interface",
            allow_empty: false,
        }
        .validate(&self.module_interface)?;

        QualifiedNameValidator {
            field: "registration_target",
            allow_empty: false,
        }
        .validate(&self.registration_target)?;

        IdentifierValidator {
            field: "discovery_marker",
        }
        .validate(&self.discovery_marker)?;

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();

        sources.insert(
            "runtime_namespace".to_string(),
            self.source_of("runtime_namespace", ENV_RUNTIME_NAMESPACE, "DiMark"),
        );
        sources.insert(
            "marker_namespace".to_string(),
            self.source_of("marker_namespace", ENV_MARKER_NAMESPACE, "DiMark"),
        );
        sources.insert(
            "module_interface".to_string(),
            self.source_of(
                "module_interface",
                ENV_MODULE_INTERFACE,
                "DiMark.IServiceModule",
            ),
        );
        sources.insert(
            "registration_target".to_string(),
            self.source_of(
                "registration_target",
                ENV_REGISTRATION_TARGET,
                "DiMark.IRegistrationTarget",
            ),
        );
        sources.insert(
            "discovery_marker".to_string(),
            self.source_of("discovery_marker", ENV_DISCOVERY_MARKER, "AutoDiscoverModule"),
        );
        sources.insert(
            "emit_documentation".to_string(),
            self.source_of("emit_documentation", ENV_EMIT_DOCUMENTATION, "true"),
        );

        sources
    }
}
