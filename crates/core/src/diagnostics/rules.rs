use super::{Diagnostic, DiagnosticCode};
use crate::cancel::CancellationToken;
use crate::errors::CoreError;
use crate::interface::{resolve_interface_name, InterfaceNameConflict};
use crate::lifetime::{resolve_lifetime, LifetimeDecision};
use crate::markers::{Marker, MarkerOccurrence};
use crate::model::{Location, TypeKind};
use crate::registration::{qualifying_interfaces, DuplicateRegistration};
use crate::scanner::{ScanResult, ScannedType};
use crate::symbols::TypeGraph;

/// Why a type cannot carry registration markers, if it cannot
pub fn invalid_target_reason(ty: &ScannedType) -> Option<&'static str> {
    if ty.is_static {
        return Some("static");
    }
    match ty.kind {
        TypeKind::Interface => Some("an interface"),
        TypeKind::Enum => Some("an enum"),
        TypeKind::Delegate => Some("a delegate"),
        _ if ty.is_abstract => Some("abstract"),
        _ => None,
    }
}

/// Per-type rules, in scan order
pub fn check_types(
    scan: &ScanResult,
    graph: &TypeGraph<'_>,
    cancel: &CancellationToken,
) -> Result<Vec<Diagnostic>, CoreError> {
    let mut diagnostics = Vec::new();

    for ty in scan.marked_types() {
        cancel.check()?;

        if let Some(reason) = invalid_target_reason(ty) {
            if let Some(occurrence) = ty
                .markers
                .iter()
                .find(|occurrence| occurrence.marker.requires_concrete_target())
            {
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::DM0003,
                    vec![
                        occurrence.marker.kind().name().to_string(),
                        ty.to_string(),
                        reason.to_string(),
                    ],
                    occurrence.location.clone().or_else(|| ty.location.clone()),
                ));
            }
            continue;
        }

        if let LifetimeDecision::Indeterminate(lifetimes) = resolve_lifetime(&ty.markers) {
            let names: Vec<&str> = lifetimes.iter().map(|lifetime| lifetime.member_name()).collect();
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::DM0005,
                vec![ty.to_string(), names.join(", ")],
                ty.marker_location(),
            ));
        }

        for occurrence in &ty.markers {
            if let Some(diagnostic) = check_marker(ty, graph, occurrence) {
                diagnostics.push(diagnostic);
            }
        }
    }

    Ok(diagnostics)
}

fn check_marker(
    ty: &ScannedType,
    graph: &TypeGraph<'_>,
    occurrence: &MarkerOccurrence,
) -> Option<Diagnostic> {
    let location = occurrence.location.clone().or_else(|| ty.location.clone());
    match &occurrence.marker {
        Marker::RegisterAsImplementedInterfaces { .. } => qualifying_interfaces(ty, graph)
            .is_empty()
            .then(|| Diagnostic::new(DiagnosticCode::DM0001, vec![ty.to_string()], location)),
        Marker::RegisterAsService { service, .. } => {
            let service = graph.canonicalize(service, &ty.namespace);
            (!graph.is_assignable(ty, &service)).then(|| {
                Diagnostic::new(
                    DiagnosticCode::DM0002,
                    vec![ty.to_string(), service.to_string()],
                    location,
                )
            })
        }
        Marker::RegisterAsGeneratedInterface {
            name, namespace, ..
        } => match resolve_interface_name(ty, name.as_deref(), namespace.as_deref()) {
            Err(conflict) => Some(name_conflict(conflict, location)),
            Ok((name, namespace)) => non_partial_part(ty).map(|part| {
                let interface = if namespace.is_empty() {
                    name
                } else {
                    format!("{}.{}", namespace, name)
                };
                Diagnostic::new(
                    DiagnosticCode::DM0008,
                    vec![ty.to_string(), interface, part],
                    location,
                )
            }),
        },
        Marker::GenerateInterface { name, namespace } => {
            resolve_interface_name(ty, name.as_deref(), namespace.as_deref())
                .err()
                .map(|conflict| name_conflict(conflict, location))
        }
        _ => None,
    }
}

fn name_conflict(conflict: InterfaceNameConflict, location: Option<Location>) -> Diagnostic {
    Diagnostic::new(
        DiagnosticCode::DM0006,
        vec![conflict.type_name, conflict.name, conflict.namespace],
        location,
    )
}

/// Outermost declaration that keeps the generated interface from being
/// attached to the type
fn non_partial_part(ty: &ScannedType) -> Option<String> {
    ty.containing
        .iter()
        .find(|container| !container.is_partial)
        .map(|container| container.name.clone())
        .or_else(|| (!ty.is_partial).then(|| ty.name.clone()))
}

/// One diagnostic when more than one naming override exists, reported at
/// the first ignored override
pub fn naming_diagnostics(overrides: &[MarkerOccurrence]) -> Vec<Diagnostic> {
    let [first, second, ..] = overrides else {
        return Vec::new();
    };
    let used = match &first.marker {
        Marker::NamingOverride(naming) => naming
            .module_name
            .clone()
            .or_else(|| naming.method_name.clone())
            .or_else(|| naming.namespace.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };
    vec![Diagnostic::new(
        DiagnosticCode::DM0007,
        vec![overrides.len().to_string(), used],
        second.location.clone(),
    )]
}

pub fn duplicate_diagnostics(duplicates: &[DuplicateRegistration]) -> Vec<Diagnostic> {
    duplicates
        .iter()
        .map(|duplicate| {
            let record = &duplicate.record;
            Diagnostic::new(
                DiagnosticCode::DM0004,
                vec![
                    record.implementation.to_string(),
                    record.service_or_self().to_string(),
                    record.lifetime.member_name().to_string(),
                    record
                        .key
                        .as_ref()
                        .map(|key| key.to_string())
                        .unwrap_or_else(|| "none".to_string()),
                ],
                duplicate.location.clone(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::markers::NamingOverride;
    use crate::model::{
        AssemblyDecl, AttributeData, Compilation, ConstantValue, Location, NamespaceDecl, TypeDecl,
    };
    use crate::scanner::scan;

    fn codes(namespace: NamespaceDecl) -> Vec<DiagnosticCode> {
        let compilation = Compilation::new(AssemblyDecl::new("App").with_namespace(namespace));
        let token = CancellationToken::new();
        let result = scan(&compilation, &GeneratorConfig::default(), &token).unwrap();
        let graph = TypeGraph::new(&result);
        check_types(&result, &graph, &token)
            .unwrap()
            .into_iter()
            .map(|diagnostic| diagnostic.code)
            .collect()
    }

    #[test]
    fn test_invalid_targets() {
        let found = codes(
            NamespaceDecl::new("App")
                .with_type(
                    TypeDecl::class("Base")
                        .abstract_()
                        .with_attribute(AttributeData::new("RegisterAsSelf")),
                )
                .with_type(
                    TypeDecl::class("Helpers")
                        .static_()
                        .with_attribute(AttributeData::new("Singleton"))
                        .with_attribute(AttributeData::new("Scoped")),
                )
                .with_type(TypeDecl::class("Fine").with_attribute(AttributeData::new("RegisterAsSelf"))),
        );
        assert_eq!(found, vec![DiagnosticCode::DM0003, DiagnosticCode::DM0003]);
    }

    #[test]
    fn test_incompatible_service_and_empty_interfaces() {
        let found = codes(
            NamespaceDecl::new("App")
                .with_type(TypeDecl::interface("IFoo"))
                .with_type(
                    TypeDecl::class("Foo")
                        .with_attribute(
                            AttributeData::new("RegisterAsService")
                                .with_arg(ConstantValue::Type("App.IFoo".into())),
                        )
                        .with_attribute(AttributeData::new("RegisterAsImplementedInterfaces")),
                ),
        );
        assert_eq!(found, vec![DiagnosticCode::DM0002, DiagnosticCode::DM0001]);
    }

    #[test]
    fn test_conflicting_lifetimes_and_interface_names() {
        let found = codes(
            NamespaceDecl::new("App").with_type(
                TypeDecl::class("Foo")
                    .with_attribute(AttributeData::new("Scoped"))
                    .with_attribute(AttributeData::new("Transient"))
                    .with_attribute(
                        AttributeData::new("GenerateInterface")
                            .with_arg(ConstantValue::String("Contracts.IFoo".into()))
                            .with_arg(ConstantValue::String("Other".into())),
                    ),
            ),
        );
        assert_eq!(found, vec![DiagnosticCode::DM0005, DiagnosticCode::DM0006]);
    }

    #[test]
    fn test_generated_interface_requires_partial_declarations() {
        let generated = || AttributeData::new("RegisterAsGeneratedInterface");
        let found = codes(
            NamespaceDecl::new("App")
                .with_type(TypeDecl::class("Plain").with_attribute(generated()))
                .with_type(TypeDecl::class("Fine").partial().with_attribute(generated()))
                .with_type(
                    TypeDecl::class("Outer")
                        .with_nested(TypeDecl::class("Inner").partial().with_attribute(generated())),
                )
                .with_type(TypeDecl::class("Shape").with_attribute(AttributeData::new("GenerateInterface"))),
        );
        assert_eq!(found, vec![DiagnosticCode::DM0008, DiagnosticCode::DM0008]);

        let compilation = Compilation::new(AssemblyDecl::new("App").with_namespace(
            NamespaceDecl::new("App").with_type(
                TypeDecl::class("Outer")
                    .with_nested(TypeDecl::class("Inner").partial().with_attribute(generated())),
            ),
        ));
        let token = CancellationToken::new();
        let result = scan(&compilation, &GeneratorConfig::default(), &token).unwrap();
        let graph = TypeGraph::new(&result);
        let diagnostics = check_types(&result, &graph, &token).unwrap();
        assert_eq!(diagnostics[0].args[1], "App.IInner");
        assert_eq!(diagnostics[0].args[2], "Outer");
        assert!(diagnostics[0].is_error());
    }

    #[test]
    fn test_multiple_naming_overrides() {
        let occurrence = |name: &str, line: u32| {
            MarkerOccurrence::new(
                Marker::NamingOverride(NamingOverride {
                    module_name: Some(name.into()),
                    ..Default::default()
                }),
                Some(Location::new("AssemblyInfo.cs", line, 1)),
            )
        };
        assert!(naming_diagnostics(&[occurrence("Core", 1)]).is_empty());

        let diagnostics = naming_diagnostics(&[occurrence("Core", 1), occurrence("Other", 2)]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::DM0007);
        assert_eq!(diagnostics[0].location.as_ref().map(|location| location.line), Some(2));
        assert!(diagnostics[0].message.contains("'Core'"));
    }
}
