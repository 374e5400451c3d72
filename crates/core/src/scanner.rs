//! Declaration scanner.
//!
//! Walks an assembly's namespace tree and nested types with an explicit
//! worklist, merges partial fragments and attaches the markers found on each
//! type. The cancellation token is checked at every worklist pop.

use crate::cancel::CancellationToken;
use crate::config::GeneratorConfig;
use crate::errors::CoreError;
use crate::markers::{Marker, MarkerKind, MarkerOccurrence, MarkerReader};
use crate::model::{
    Accessibility, AssemblyDecl, Compilation, Location, MemberDecl, NamespaceDecl, OutputKind,
    TypeDecl, TypeKind, TypeRef,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A type that encloses a nested type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainingType {
    pub name: String,
    pub kind: TypeKind,
    pub is_partial: bool,
    pub type_parameters: Vec<String>,
}

/// A member together with its opt-out state
#[derive(Debug, Clone)]
pub struct ScannedMember {
    pub decl: MemberDecl,
    pub excluded: bool,
}

/// One merged type declaration and the markers applied to it
#[derive(Debug, Clone)]
pub struct ScannedType {
    /// Dotted name including namespace and containing types
    pub full_name: String,
    pub namespace: String,
    pub name: String,
    pub containing: Vec<ContainingType>,
    pub assembly: String,
    pub kind: TypeKind,
    pub accessibility: Accessibility,
    /// Public and nested only in public types
    pub effectively_public: bool,
    pub is_abstract: bool,
    pub is_static: bool,
    pub is_partial: bool,
    pub type_parameters: Vec<String>,
    pub base_type: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub members: Vec<ScannedMember>,
    pub markers: Vec<MarkerOccurrence>,
    pub location: Option<Location>,
}

impl ScannedType {
    /// Reference to the type with its own type parameters as arguments
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::generic(
            self.full_name.clone(),
            self.type_parameters
                .iter()
                .map(|param| TypeRef::simple(param.clone()))
                .collect(),
        )
    }

    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty()
    }

    /// Abstract, static and non-constructible types never get registered
    pub fn is_registrable(&self) -> bool {
        self.kind.is_constructible() && !self.is_abstract && !self.is_static
    }

    pub fn has_marker(&self, kind: MarkerKind) -> bool {
        self.markers.iter().any(|occurrence| occurrence.marker.kind() == kind)
    }

    pub fn markers_of(&self, kind: MarkerKind) -> impl Iterator<Item = &MarkerOccurrence> {
        self.markers
            .iter()
            .filter(move |occurrence| occurrence.marker.kind() == kind)
    }

    pub fn has_registration_marker(&self) -> bool {
        self.markers.iter().any(|occurrence| occurrence.marker.is_registration())
    }

    /// Location of the first marker, falling back to the declaration
    pub fn marker_location(&self) -> Option<Location> {
        self.markers
            .iter()
            .find_map(|occurrence| occurrence.location.clone())
            .or_else(|| self.location.clone())
    }
}

impl std::fmt::Display for ScannedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_ref())
    }
}

/// Types of one referenced assembly
#[derive(Debug, Clone)]
pub struct ScannedAssembly {
    pub name: String,
    pub types: Vec<ScannedType>,
}

/// Everything the scanner extracts from one compilation
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub assembly_name: String,
    pub output_kind: OutputKind,
    pub types: Vec<ScannedType>,
    pub references: Vec<ScannedAssembly>,
    /// Assembly-level overrides first, then type-level ones in scan order
    pub naming_overrides: Vec<MarkerOccurrence>,
}

impl ScanResult {
    pub fn marked_types(&self) -> impl Iterator<Item = &ScannedType> {
        self.types.iter().filter(|ty| !ty.markers.is_empty())
    }
}

enum WorkItem<'a> {
    Namespace {
        namespace: String,
        types: &'a [TypeDecl],
        namespaces: &'a [NamespaceDecl],
    },
    Type {
        namespace: String,
        containing: Vec<ContainingType>,
        containers_public: bool,
        decl: &'a TypeDecl,
    },
}

/// Scan the compilation and all of its references
pub fn scan(
    compilation: &Compilation,
    config: &GeneratorConfig,
    cancel: &CancellationToken,
) -> Result<ScanResult, CoreError> {
    let reader = MarkerReader::new(config);
    let assembly_name = compilation.assembly_name().to_string();

    let types = scan_assembly(&compilation.assembly, &reader, cancel)?;
    tracing::debug!(
        "Scanned {} types in assembly '{}'",
        types.len(),
        assembly_name
    );

    let mut references = Vec::new();
    for reference in &compilation.references {
        cancel.check()?;
        if reference.name == assembly_name {
            tracing::debug!("Skipping self reference '{}'", reference.name);
            continue;
        }
        let types = scan_assembly(reference, &reader, cancel)?;
        references.push(ScannedAssembly {
            name: reference.name.clone(),
            types,
        });
    }

    let mut naming_overrides: Vec<MarkerOccurrence> = reader
        .read_all(&compilation.attributes, &assembly_name)
        .into_iter()
        .filter(|occurrence| matches!(occurrence.marker, Marker::NamingOverride(_)))
        .collect();
    for ty in &types {
        naming_overrides.extend(ty.markers_of(MarkerKind::NamingOverride).cloned());
    }

    Ok(ScanResult {
        assembly_name,
        output_kind: compilation.output_kind,
        types,
        references,
        naming_overrides,
    })
}

/// Walk one assembly; partial fragments sharing a full name are merged
pub fn scan_assembly(
    assembly: &AssemblyDecl,
    reader: &MarkerReader<'_>,
    cancel: &CancellationToken,
) -> Result<Vec<ScannedType>, CoreError> {
    let mut scanned: Vec<ScannedType> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut worklist = vec![WorkItem::Namespace {
        namespace: String::new(),
        types: &assembly.types,
        namespaces: &assembly.namespaces,
    }];

    while let Some(item) = worklist.pop() {
        cancel.check()?;

        match item {
            WorkItem::Namespace {
                namespace,
                types,
                namespaces,
            } => {
                // Reverse pushes keep declaration order: types, then child namespaces.
                for child in namespaces.iter().rev() {
                    worklist.push(WorkItem::Namespace {
                        namespace: qualify(&namespace, &child.name),
                        types: &child.types,
                        namespaces: &child.namespaces,
                    });
                }
                for decl in types.iter().rev() {
                    worklist.push(WorkItem::Type {
                        namespace: namespace.clone(),
                        containing: Vec::new(),
                        containers_public: true,
                        decl,
                    });
                }
            }
            WorkItem::Type {
                namespace,
                containing,
                containers_public,
                decl,
            } => {
                let full_name = full_name_of(&namespace, &containing, &decl.name);
                let fragment = build_fragment(
                    &full_name,
                    &namespace,
                    &containing,
                    containers_public,
                    &assembly.name,
                    decl,
                    reader,
                );

                match index.get(&full_name) {
                    Some(&position) => merge_fragment(&mut scanned[position], fragment),
                    None => {
                        index.insert(full_name.clone(), scanned.len());
                        scanned.push(fragment);
                    }
                }

                let mut nested_containing = containing;
                nested_containing.push(ContainingType {
                    name: decl.name.clone(),
                    kind: decl.kind,
                    is_partial: decl.is_partial,
                    type_parameters: decl.type_parameters.clone(),
                });
                let nested_public = containers_public && decl.accessibility.is_public();
                for nested in decl.nested.iter().rev() {
                    worklist.push(WorkItem::Type {
                        namespace: namespace.clone(),
                        containing: nested_containing.clone(),
                        containers_public: nested_public,
                        decl: nested,
                    });
                }
            }
        }
    }

    for ty in &mut scanned {
        collapse_singleton_markers(ty);
    }

    Ok(scanned)
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

fn full_name_of(namespace: &str, containing: &[ContainingType], name: &str) -> String {
    let mut full_name = namespace.to_string();
    for container in containing {
        full_name = qualify(&full_name, &container.name);
    }
    qualify(&full_name, name)
}

fn parse_references(owner: &str, references: &[String]) -> Vec<TypeRef> {
    references
        .iter()
        .filter_map(|reference| match TypeRef::parse(reference) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                tracing::warn!("Ignoring type reference on '{}': {}", owner, error);
                None
            }
        })
        .collect()
}

fn build_fragment(
    full_name: &str,
    namespace: &str,
    containing: &[ContainingType],
    containers_public: bool,
    assembly: &str,
    decl: &TypeDecl,
    reader: &MarkerReader<'_>,
) -> ScannedType {
    let members = decl
        .members
        .iter()
        .map(|member| ScannedMember {
            excluded: reader
                .read_all(&member.attributes, full_name)
                .iter()
                .any(|occurrence| occurrence.marker == Marker::ExcludeFromInterface),
            decl: member.clone(),
        })
        .collect();

    ScannedType {
        full_name: full_name.to_string(),
        namespace: namespace.to_string(),
        name: decl.name.clone(),
        containing: containing.to_vec(),
        assembly: assembly.to_string(),
        kind: decl.kind,
        accessibility: decl.accessibility,
        effectively_public: containers_public && decl.accessibility.is_public(),
        is_abstract: decl.is_abstract || decl.kind == TypeKind::Interface,
        is_static: decl.is_static,
        is_partial: decl.is_partial,
        type_parameters: decl.type_parameters.clone(),
        base_type: decl
            .base_type
            .as_ref()
            .and_then(|base| parse_references(full_name, std::slice::from_ref(base)).pop()),
        interfaces: parse_references(full_name, &decl.interfaces),
        members,
        markers: reader.read_all(&decl.attributes, full_name),
        location: decl.location.clone(),
    }
}

fn merge_fragment(target: &mut ScannedType, fragment: ScannedType) {
    target.is_abstract |= fragment.is_abstract;
    target.is_static |= fragment.is_static;
    target.is_partial |= fragment.is_partial;
    if target.base_type.is_none() {
        target.base_type = fragment.base_type;
    }
    for interface in fragment.interfaces {
        if !target.interfaces.contains(&interface) {
            target.interfaces.push(interface);
        }
    }
    target.members.extend(fragment.members);
    target.markers.extend(fragment.markers);
    if target.location.is_none() {
        target.location = fragment.location;
    }
}

/// Only explicit service registrations repeat; other kinds keep their first
/// occurrence.
fn collapse_singleton_markers(ty: &mut ScannedType) {
    let mut seen: Vec<MarkerKind> = Vec::new();
    let full_name = ty.full_name.clone();
    ty.markers.retain(|occurrence| {
        let kind = occurrence.marker.kind();
        if kind.is_repeatable() {
            return true;
        }
        if seen.contains(&kind) {
            tracing::debug!("Dropping repeated {} marker on '{}'", kind.name(), full_name);
            return false;
        }
        seen.push(kind);
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeData, ConstantValue};

    fn scan_types(assembly: AssemblyDecl) -> Vec<ScannedType> {
        let config = GeneratorConfig::default();
        let reader = MarkerReader::new(&config);
        scan_assembly(&assembly, &reader, &CancellationToken::new()).unwrap()
    }

    #[test]
    fn test_declaration_order_with_nested_types() {
        let assembly = AssemblyDecl::new("App")
            .with_type(TypeDecl::class("Root"))
            .with_namespace(
                NamespaceDecl::new("App.Services")
                    .with_type(
                        TypeDecl::class("Outer").with_nested(TypeDecl::class("Inner")),
                    )
                    .with_type(TypeDecl::class("Second"))
                    .with_namespace(NamespaceDecl::new("Deep").with_type(TypeDecl::class("Leaf"))),
            );

        let names: Vec<String> = scan_types(assembly)
            .into_iter()
            .map(|ty| ty.full_name)
            .collect();
        assert_eq!(
            names,
            vec![
                "Root",
                "App.Services.Outer",
                "App.Services.Outer.Inner",
                "App.Services.Second",
                "App.Services.Deep.Leaf",
            ]
        );
    }

    #[test]
    fn test_nested_type_records_containers() {
        let assembly = AssemblyDecl::new("App").with_namespace(
            NamespaceDecl::new("App").with_type(
                TypeDecl::class("Outer")
                    .with_accessibility(Accessibility::Internal)
                    .with_nested(TypeDecl::class("Inner")),
            ),
        );
        let types = scan_types(assembly);
        let inner = &types[1];
        assert_eq!(inner.namespace, "App");
        assert_eq!(inner.containing.len(), 1);
        assert_eq!(inner.containing[0].name, "Outer");
        assert!(!inner.effectively_public);
    }

    #[test]
    fn test_partial_fragments_merge() {
        let assembly = AssemblyDecl::new("App").with_namespace(
            NamespaceDecl::new("App")
                .with_type(
                    TypeDecl::class("Service")
                        .partial()
                        .with_interface("App.IFirst")
                        .with_attribute(AttributeData::new("Scoped"))
                        .with_member(MemberDecl::method("Run", "void")),
                )
                .with_type(
                    TypeDecl::class("Service")
                        .partial()
                        .with_interface("App.ISecond")
                        .with_interface("App.IFirst")
                        .with_attribute(AttributeData::new("RegisterAsImplementedInterfaces"))
                        .with_member(MemberDecl::method("Stop", "void")),
                ),
        );

        let types = scan_types(assembly);
        assert_eq!(types.len(), 1);
        let service = &types[0];
        assert_eq!(
            service.interfaces,
            vec![TypeRef::simple("App.IFirst"), TypeRef::simple("App.ISecond")]
        );
        assert_eq!(service.members.len(), 2);
        assert_eq!(service.markers.len(), 2);
    }

    #[test]
    fn test_singleton_kinds_collapse_but_services_repeat() {
        let assembly = AssemblyDecl::new("App").with_type(
            TypeDecl::class("Baz")
                .with_attribute(AttributeData::new("RegisterAsSelf"))
                .with_attribute(AttributeData::new("RegisterAsSelf"))
                .with_attribute(
                    AttributeData::new("RegisterAsService")
                        .with_arg(ConstantValue::Type("IBaz".into()))
                        .with_arg(ConstantValue::String("a".into())),
                )
                .with_attribute(
                    AttributeData::new("RegisterAsService")
                        .with_arg(ConstantValue::Type("IBaz".into()))
                        .with_arg(ConstantValue::String("b".into())),
                ),
        );
        let types = scan_types(assembly);
        assert_eq!(types[0].markers_of(MarkerKind::RegisterAsSelf).count(), 1);
        assert_eq!(types[0].markers_of(MarkerKind::RegisterAsService).count(), 2);
    }

    #[test]
    fn test_member_opt_out() {
        let assembly = AssemblyDecl::new("App").with_type(
            TypeDecl::class("Foo").with_member(
                MemberDecl::method("Hidden", "void")
                    .with_attribute(AttributeData::new("ExcludeFromInterface")),
            ),
        );
        let types = scan_types(assembly);
        assert!(types[0].members[0].excluded);
    }

    #[test]
    fn test_self_reference_skipped_and_overrides_ordered() {
        let naming = |name: &str| {
            AttributeData::new("RegistrationModule")
                .with_named("ModuleName", ConstantValue::String(name.into()))
        };
        let compilation = Compilation::new(
            AssemblyDecl::new("App").with_type(TypeDecl::class("Holder").with_attribute(naming("FromType"))),
        )
        .with_attribute(naming("FromAssembly"))
        .with_reference(AssemblyDecl::new("App"))
        .with_reference(AssemblyDecl::new("Lib"));

        let result = scan(&compilation, &GeneratorConfig::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.references.len(), 1);
        assert_eq!(result.references[0].name, "Lib");
        assert_eq!(result.naming_overrides.len(), 2);
        assert!(matches!(
            &result.naming_overrides[0].marker,
            Marker::NamingOverride(naming) if naming.module_name.as_deref() == Some("FromAssembly")
        ));
    }

    #[test]
    fn test_cancelled_scan_returns_error() {
        let token = CancellationToken::new();
        token.cancel();
        let compilation = Compilation::new(AssemblyDecl::new("App").with_type(TypeDecl::class("Foo")));
        let result = scan(&compilation, &GeneratorConfig::default(), &token);
        assert!(matches!(result, Err(CoreError::Cancelled)));
    }
}
