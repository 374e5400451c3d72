//! Marker attributes as a closed set of variants.
//!
//! Attribute names are matched in exactly one place, [`MarkerReader::read`];
//! every later stage works on [`Marker`] values.

use crate::config::GeneratorConfig;
use crate::errors::CoreError;
use crate::lifetime::Lifetime;
use crate::model::{AttributeData, ConstantValue, Location, TypeRef};
use serde::{Deserialize, Serialize};

/// Overrides for the generated module's naming
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingOverride {
    pub module_name: Option<String>,
    pub method_name: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Lifetime(Lifetime),
    RegisterAsSelf {
        key: Option<ConstantValue>,
    },
    RegisterAsService {
        service: TypeRef,
        key: Option<ConstantValue>,
    },
    RegisterAsImplementedInterfaces {
        key: Option<ConstantValue>,
    },
    RegisterAsGeneratedInterface {
        name: Option<String>,
        namespace: Option<String>,
        key: Option<ConstantValue>,
    },
    GenerateInterface {
        name: Option<String>,
        namespace: Option<String>,
    },
    Module,
    NamingOverride(NamingOverride),
    ExcludeFromInterface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Transient,
    Scoped,
    Singleton,
    RegisterAsSelf,
    RegisterAsService,
    RegisterAsImplementedInterfaces,
    RegisterAsGeneratedInterface,
    GenerateInterface,
    Module,
    NamingOverride,
    ExcludeFromInterface,
}

impl MarkerKind {
    /// Only explicit service registrations may be applied more than once
    pub fn is_repeatable(&self) -> bool {
        matches!(self, MarkerKind::RegisterAsService)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MarkerKind::Transient => "Transient",
            MarkerKind::Scoped => "Scoped",
            MarkerKind::Singleton => "Singleton",
            MarkerKind::RegisterAsSelf => "RegisterAsSelf",
            MarkerKind::RegisterAsService => "RegisterAsService",
            MarkerKind::RegisterAsImplementedInterfaces => "RegisterAsImplementedInterfaces",
            MarkerKind::RegisterAsGeneratedInterface => "RegisterAsGeneratedInterface",
            MarkerKind::GenerateInterface => "GenerateInterface",
            MarkerKind::Module => "Module",
            MarkerKind::NamingOverride => "RegistrationModule",
            MarkerKind::ExcludeFromInterface => "ExcludeFromInterface",
        }
    }
}

impl Marker {
    pub fn kind(&self) -> MarkerKind {
        match self {
            Marker::Lifetime(Lifetime::Transient) => MarkerKind::Transient,
            Marker::Lifetime(Lifetime::Scoped) => MarkerKind::Scoped,
            Marker::Lifetime(Lifetime::Singleton) => MarkerKind::Singleton,
            Marker::RegisterAsSelf { .. } => MarkerKind::RegisterAsSelf,
            Marker::RegisterAsService { .. } => MarkerKind::RegisterAsService,
            Marker::RegisterAsImplementedInterfaces { .. } => {
                MarkerKind::RegisterAsImplementedInterfaces
            }
            Marker::RegisterAsGeneratedInterface { .. } => MarkerKind::RegisterAsGeneratedInterface,
            Marker::GenerateInterface { .. } => MarkerKind::GenerateInterface,
            Marker::Module => MarkerKind::Module,
            Marker::NamingOverride(_) => MarkerKind::NamingOverride,
            Marker::ExcludeFromInterface => MarkerKind::ExcludeFromInterface,
        }
    }

    /// Markers that ask for a registration
    pub fn is_registration(&self) -> bool {
        matches!(
            self,
            Marker::RegisterAsSelf { .. }
                | Marker::RegisterAsService { .. }
                | Marker::RegisterAsImplementedInterfaces { .. }
                | Marker::RegisterAsGeneratedInterface { .. }
        )
    }

    /// Markers that ask for an interface to be synthesized
    pub fn requests_interface(&self) -> bool {
        matches!(
            self,
            Marker::RegisterAsGeneratedInterface { .. } | Marker::GenerateInterface { .. }
        )
    }

    /// Markers that only make sense on a constructible, non-abstract type
    pub fn requires_concrete_target(&self) -> bool {
        self.is_registration()
            || matches!(self, Marker::Lifetime(_) | Marker::GenerateInterface { .. })
    }
}

/// A marker applied to a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerOccurrence {
    pub marker: Marker,
    pub location: Option<Location>,
}

impl MarkerOccurrence {
    pub fn new(marker: Marker, location: Option<Location>) -> Self {
        Self { marker, location }
    }
}

/// Converts host attribute applications into markers
pub struct MarkerReader<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> MarkerReader<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Returns `Ok(None)` for attributes that are not markers and an error
    /// for marker attributes with unusable arguments.
    pub fn read(&self, attribute: &AttributeData) -> Result<Option<Marker>, CoreError> {
        let reference = TypeRef::parse(&attribute.name)?;
        let namespace = reference.namespace();
        if !namespace.is_empty() && namespace != self.config.marker_namespace {
            return Ok(None);
        }

        let simple = strip_attribute_suffix(reference.simple_name());
        if simple == strip_attribute_suffix(&self.config.discovery_marker) {
            return Ok(Some(Marker::Module));
        }

        let marker = match simple {
            "Transient" => Marker::Lifetime(Lifetime::Transient),
            "Scoped" => Marker::Lifetime(Lifetime::Scoped),
            "Singleton" => Marker::Lifetime(Lifetime::Singleton),
            "RegisterAsSelf" => Marker::RegisterAsSelf {
                key: key_argument(attribute, Some(0)),
            },
            "RegisterAsService" => {
                // Generic form `RegisterAsService<IFoo>(key)` or
                // `RegisterAsService(typeof(IFoo), key)`.
                let (service, key_position) = match reference.args.first() {
                    Some(service) => (service.clone(), 0),
                    None => {
                        let service = attribute
                            .argument(Some(0), &["ServiceType", "Service"])
                            .and_then(ConstantValue::as_type)
                            .ok_or_else(|| {
                                CoreError::validation(format!(
                                    "{} requires a service type argument",
                                    attribute.name
                                ))
                            })?;
                        (TypeRef::parse(service)?, 1)
                    }
                };
                Marker::RegisterAsService {
                    service,
                    key: key_argument(attribute, Some(key_position)),
                }
            }
            "RegisterAsImplementedInterfaces" => Marker::RegisterAsImplementedInterfaces {
                key: key_argument(attribute, Some(0)),
            },
            "RegisterAsGeneratedInterface" => Marker::RegisterAsGeneratedInterface {
                name: string_argument(attribute, Some(0), &["Name", "InterfaceName"])?,
                namespace: string_argument(attribute, Some(1), &["Namespace", "InterfaceNamespace"])?,
                key: key_argument(attribute, None),
            },
            "GenerateInterface" => Marker::GenerateInterface {
                name: string_argument(attribute, Some(0), &["Name", "InterfaceName"])?,
                namespace: string_argument(attribute, Some(1), &["Namespace", "InterfaceNamespace"])?,
            },
            "RegistrationModule" => Marker::NamingOverride(NamingOverride {
                module_name: string_argument(attribute, Some(0), &["ModuleName"])?,
                method_name: string_argument(attribute, Some(1), &["MethodName"])?,
                namespace: string_argument(attribute, Some(2), &["Namespace"])?,
            }),
            "ExcludeFromInterface" => Marker::ExcludeFromInterface,
            _ => return Ok(None),
        };

        Ok(Some(marker))
    }

    /// Read every marker of an attribute list, skipping malformed ones
    pub fn read_all(&self, attributes: &[AttributeData], owner: &str) -> Vec<MarkerOccurrence> {
        attributes
            .iter()
            .filter_map(|attribute| match self.read(attribute) {
                Ok(marker) => {
                    marker.map(|marker| MarkerOccurrence::new(marker, attribute.location.clone()))
                }
                Err(error) => {
                    tracing::warn!(
                        "Ignoring malformed attribute '{}' on '{}': {}",
                        attribute.name,
                        owner,
                        error
                    );
                    None
                }
            })
            .collect()
    }
}

fn strip_attribute_suffix(name: &str) -> &str {
    match name.strip_suffix("Attribute") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => name,
    }
}

fn key_argument(attribute: &AttributeData, position: Option<usize>) -> Option<ConstantValue> {
    attribute
        .argument(position, &["Key", "ServiceKey"])
        .filter(|value| !value.is_null())
        .cloned()
}

fn string_argument(
    attribute: &AttributeData,
    position: Option<usize>,
    names: &[&str],
) -> Result<Option<String>, CoreError> {
    match attribute.argument(position, names) {
        None | Some(ConstantValue::Null) => Ok(None),
        Some(ConstantValue::String(value)) if value.trim().is_empty() => Ok(None),
        Some(ConstantValue::String(value)) => Ok(Some(value.trim().to_string())),
        Some(other) => Err(CoreError::validation(format!(
            "{} expects a string argument, found {}",
            attribute.name, other
        ))),
    }
}
