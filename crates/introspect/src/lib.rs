use dimark_core::{
    analyze, Analysis, CancellationToken, Compilation, CoreError, GeneratorConfig, OutputKind,
};
use serde::{Deserialize, Serialize};

/// Serializable summary of what the generator would produce for one compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationMap {
    pub assembly: String,
    pub output_kind: OutputKind,
    pub module: ModuleInfo,
    pub registrations: Vec<RegistrationInfo>,
    pub interfaces: Vec<InterfaceInfo>,
    pub modules: Vec<String>,
    pub diagnostics: Vec<DiagnosticInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub name: String,
    pub method: String,
    pub namespace: String,
    /// False when the compilation registers nothing of its own
    pub generated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationInfo {
    pub implementation: String,
    pub service: Option<String>,
    pub lifetime: String,
    pub key: Option<String>,
    pub open_generic: bool,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub implementing_type: String,
    pub members: Vec<String>,
    pub partial: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticInfo {
    pub code: String,
    pub severity: String,
    pub message: String,
    pub location: Option<String>,
}

impl RegistrationMap {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let registrations = analysis
            .records
            .iter()
            .map(|record| RegistrationInfo {
                implementation: record.implementation.to_string(),
                service: record.service.as_ref().map(ToString::to_string),
                lifetime: record.lifetime.to_string(),
                key: record.key.as_ref().map(ToString::to_string),
                open_generic: record.open_generic,
                location: record.location.as_ref().map(ToString::to_string),
            })
            .collect();

        let interfaces = analysis
            .interfaces
            .iter()
            .map(|interface| InterfaceInfo {
                name: interface.full_name(),
                implementing_type: interface.implementing_type.to_string(),
                members: interface.members.iter().map(|m| m.display.clone()).collect(),
                partial: interface.partial_target.is_some(),
            })
            .collect();

        let diagnostics = analysis
            .diagnostics
            .iter()
            .map(|diagnostic| DiagnosticInfo {
                code: diagnostic.code.to_string(),
                severity: diagnostic.severity.to_string(),
                message: diagnostic.message.clone(),
                location: diagnostic.location.as_ref().map(ToString::to_string),
            })
            .collect();

        Self {
            assembly: analysis.assembly_name.clone(),
            output_kind: analysis.output_kind,
            module: ModuleInfo {
                name: analysis.naming.module_name.clone(),
                method: analysis.naming.method_name.clone(),
                namespace: analysis.naming.namespace.clone(),
                generated: analysis.own_module.is_some(),
            },
            registrations,
            interfaces,
            modules: analysis.modules.iter().map(|entry| entry.full_name.clone()).collect(),
            diagnostics,
        }
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String, CoreError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

pub struct MapGenerator {
    config: GeneratorConfig,
}

impl MapGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn generate(&self, compilation: &Compilation) -> Result<RegistrationMap, CoreError> {
        let analysis = analyze(compilation, &self.config, &CancellationToken::new())?;
        Ok(RegistrationMap::from_analysis(&analysis))
    }
}

impl Default for MapGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimark_core::{AssemblyDecl, AttributeData, ConstantValue, NamespaceDecl, TypeDecl};

    fn compilation() -> Compilation {
        Compilation::new(
            AssemblyDecl::new("Shop.Api").with_namespace(
                NamespaceDecl::new("Shop.Api")
                    .with_type(TypeDecl::interface("ICart"))
                    .with_type(
                        TypeDecl::class("Cart")
                            .with_interface("Shop.Api.ICart")
                            .with_attribute(AttributeData::new("Scoped"))
                            .with_attribute(
                                AttributeData::new("RegisterAsService")
                                    .with_arg(ConstantValue::Type("Shop.Api.ICart".into()))
                                    .with_arg(ConstantValue::String("eu".into())),
                            ),
                    ),
            ),
        )
    }

    #[test]
    fn test_map_summarizes_registrations() {
        let map = MapGenerator::default().generate(&compilation()).unwrap();

        assert_eq!(map.assembly, "Shop.Api");
        assert_eq!(map.module.name, "ShopApiModule");
        assert_eq!(map.module.method, "AddShopApi");
        assert_eq!(map.module.namespace, "Shop.Api");
        assert!(map.module.generated);
        assert_eq!(map.registrations.len(), 1);
        let registration = &map.registrations[0];
        assert_eq!(registration.implementation, "Shop.Api.Cart");
        assert_eq!(registration.service.as_deref(), Some("Shop.Api.ICart"));
        assert_eq!(registration.lifetime, "scoped");
        assert!(map.diagnostics.is_empty());
        assert!(map.modules.is_empty());
    }

    #[test]
    fn test_map_serializes_to_json_and_yaml() {
        let map = MapGenerator::default().generate(&compilation()).unwrap();

        let json = map.to_json().unwrap();
        let parsed: RegistrationMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);

        let yaml = map.to_yaml().unwrap();
        assert!(yaml.contains("assembly: Shop.Api"));
    }
}
