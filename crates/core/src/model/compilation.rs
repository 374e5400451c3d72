use crate::errors::CoreError;
use crate::model::{AttributeData, TypeDecl};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Whether the compilation produces a reusable library or an entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    #[default]
    Library,
    Executable,
}

impl OutputKind {
    pub fn is_executable(&self) -> bool {
        matches!(self, OutputKind::Executable)
    }
}

/// A namespace node; `name` may be dotted (`App.Services`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespaceDecl {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub namespaces: Vec<NamespaceDecl>,
}

impl NamespaceDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    pub fn with_type(mut self, ty: TypeDecl) -> Self {
        self.types.push(ty);
        self
    }

    pub fn with_namespace(mut self, namespace: NamespaceDecl) -> Self {
        self.namespaces.push(namespace);
        self
    }
}

/// An assembly: the global namespace's types plus a namespace tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssemblyDecl {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub namespaces: Vec<NamespaceDecl>,
}

impl AssemblyDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    pub fn with_type(mut self, ty: TypeDecl) -> Self {
        self.types.push(ty);
        self
    }

    pub fn with_namespace(mut self, namespace: NamespaceDecl) -> Self {
        self.namespaces.push(namespace);
        self
    }
}

/// Snapshot of one compilation as handed over by the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Compilation {
    pub assembly: AssemblyDecl,
    #[serde(default)]
    pub output_kind: OutputKind,
    /// Assembly-level attributes
    #[serde(default)]
    pub attributes: Vec<AttributeData>,
    #[serde(default)]
    pub references: Vec<AssemblyDecl>,
}

impl Compilation {
    pub fn new(assembly: AssemblyDecl) -> Self {
        Self {
            assembly,
            output_kind: OutputKind::Library,
            attributes: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn executable(mut self) -> Self {
        self.output_kind = OutputKind::Executable;
        self
    }

    pub fn with_reference(mut self, reference: AssemblyDecl) -> Self {
        self.references.push(reference);
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeData) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn assembly_name(&self) -> &str {
        &self.assembly.name
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Load a compilation snapshot, picking the format from the extension
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::from_json(&content)?),
            Some("yaml") | Some("yml") => Ok(Self::from_yaml(&content)?),
            _ => Err(CoreError::UnsupportedInput {
                path: path.display().to_string(),
            }),
        }
    }
}
