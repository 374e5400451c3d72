use crate::model::{AttributeData, Location};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared accessibility of a type or member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    #[default]
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
    Private,
}

impl Accessibility {
    pub fn is_public(&self) -> bool {
        matches!(self, Accessibility::Public)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::Internal => "internal",
            Accessibility::Protected => "protected",
            Accessibility::ProtectedInternal => "protected internal",
            Accessibility::PrivateProtected => "private protected",
            Accessibility::Private => "private",
        }
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Record,
    RecordStruct,
    Interface,
    Enum,
    Delegate,
}

impl TypeKind {
    /// Keyword used when re-declaring the type as `partial`
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Record => "record",
            TypeKind::RecordStruct => "record struct",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Delegate => "delegate",
        }
    }

    /// Kinds that can be instantiated by a container
    pub fn is_constructible(&self) -> bool {
        matches!(
            self,
            TypeKind::Class | TypeKind::Struct | TypeKind::Record | TypeKind::RecordStruct
        )
    }

    pub fn is_class_like(&self) -> bool {
        matches!(self, TypeKind::Class | TypeKind::Record)
    }
}

/// A type declaration fragment in the host's declaration graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_partial: bool,
    #[serde(default)]
    pub type_parameters: Vec<String>,
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeData>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    #[serde(default)]
    pub nested: Vec<TypeDecl>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            accessibility: Accessibility::Public,
            is_abstract: false,
            is_static: false,
            is_partial: false,
            type_parameters: Vec::new(),
            base_type: None,
            interfaces: Vec::new(),
            attributes: Vec::new(),
            members: Vec::new(),
            nested: Vec::new(),
            location: None,
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn with_attribute(mut self, attribute: AttributeData) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base_type = Some(base.into());
        self
    }

    pub fn with_member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_nested(mut self, nested: TypeDecl) -> Self {
        self.nested.push(nested);
        self
    }

    pub fn with_type_parameters(mut self, params: &[&str]) -> Self {
        self.type_parameters = params.iter().map(|param| param.to_string()).collect();
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn partial(mut self) -> Self {
        self.is_partial = true;
        self
    }

    pub fn abstract_(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Method,
    Property,
    Indexer,
    Event,
    Field,
    Constructor,
    StaticConstructor,
    Destructor,
    Operator,
    Conversion,
    PropertyAccessor,
    EventAccessor,
    LocalFunction,
}

impl MemberKind {
    /// Kinds that can appear in a generated interface
    pub fn is_interface_member(&self) -> bool {
        matches!(
            self,
            MemberKind::Method | MemberKind::Property | MemberKind::Indexer | MemberKind::Event
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterModifier {
    Ref,
    Out,
    In,
    Params,
    RefReadonly,
}

impl ParameterModifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            ParameterModifier::Ref => "ref",
            ParameterModifier::Out => "out",
            ParameterModifier::In => "in",
            ParameterModifier::Params => "params",
            ParameterModifier::RefReadonly => "ref readonly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub modifier: Option<ParameterModifier>,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl ParameterDecl {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            modifier: None,
            default_value: None,
        }
    }
}

fn void() -> String {
    "void".to_string()
}

/// A member of a type declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDecl {
    pub name: String,
    pub kind: MemberKind,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_static: bool,
    /// Synthesized by the compiler rather than written in source
    #[serde(default)]
    pub is_implicit: bool,
    #[serde(default)]
    pub is_override: bool,
    /// Return type for methods, value type for properties, indexers and events
    #[serde(default = "void", rename = "type")]
    pub return_type: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    #[serde(default)]
    pub type_parameters: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub getter: Option<Accessibility>,
    #[serde(default)]
    pub setter: Option<Accessibility>,
    #[serde(default)]
    pub init_only: bool,
    #[serde(default)]
    pub attributes: Vec<AttributeData>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub explicit_interface: Option<String>,
}

impl MemberDecl {
    pub fn new(name: impl Into<String>, kind: MemberKind, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            accessibility: Accessibility::Public,
            is_static: false,
            is_implicit: false,
            is_override: false,
            return_type: return_type.into(),
            parameters: Vec::new(),
            type_parameters: Vec::new(),
            constraints: Vec::new(),
            getter: None,
            setter: None,
            init_only: false,
            attributes: Vec::new(),
            documentation: None,
            explicit_interface: None,
        }
    }

    pub fn method(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self::new(name, MemberKind::Method, return_type)
    }

    /// A property with a public getter and, when `settable`, a public setter
    pub fn property(name: impl Into<String>, type_name: impl Into<String>, settable: bool) -> Self {
        let mut member = Self::new(name, MemberKind::Property, type_name);
        member.getter = Some(Accessibility::Public);
        member.setter = settable.then_some(Accessibility::Public);
        member
    }

    pub fn event(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::Event, type_name)
    }

    pub fn with_parameter(mut self, parameter: ParameterDecl) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeData) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn implicit(mut self) -> Self {
        self.is_implicit = true;
        self
    }

    pub fn override_(mut self) -> Self {
        self.is_override = true;
        self
    }
}
