//! Interface synthesis.
//!
//! Derives a generated interface from the public instance members visible on
//! a type. Member order is first encounter (own members, then the base
//! chain) and signatures are deduplicated by their canonical display form.

use crate::model::{Accessibility, MemberKind, ParameterDecl, TypeKind, TypeRef};
use crate::scanner::{ContainingType, ScannedType};
use crate::symbols::{TypeGraph, VisibleMember};
use crate::well_known::{self, WellKnownContract};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const GLOBAL_PREFIX: &str = "global::";
const GLOBAL_NAMESPACE_TOKEN: &str = "<global namespace>";

/// A qualified interface name was given together with an explicit namespace
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("interface name '{name}' already contains a namespace but '{namespace}' was also given for '{type_name}'")]
pub struct InterfaceNameConflict {
    pub type_name: String,
    pub name: String,
    pub namespace: String,
}

/// One member of a generated interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSignature {
    pub kind: MemberKind,
    pub name: String,
    /// Return type, or value type for properties, indexers and events
    pub return_type: String,
    pub type_parameters: Vec<String>,
    pub constraints: Vec<String>,
    pub parameters: Vec<ParameterDecl>,
    /// `get`, `set` or `init` for properties and indexers
    pub accessors: Vec<String>,
    pub documentation: Option<String>,
    /// Canonical form used for deduplication
    pub display: String,
}

/// Where the partial implementing declaration goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialTarget {
    pub namespace: String,
    pub containing: Vec<ContainingType>,
    pub name: String,
    pub kind: TypeKind,
    pub type_parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedInterface {
    pub name: String,
    pub namespace: String,
    pub accessibility: Accessibility,
    pub type_parameters: Vec<String>,
    pub members: Vec<MemberSignature>,
    pub implementing_type: TypeRef,
    /// Set when the implementing type is partial and can list the interface
    pub partial_target: Option<PartialTarget>,
}

impl GeneratedInterface {
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// The interface as a service type, instantiated with the type's own
    /// parameters
    pub fn service_ref(&self) -> TypeRef {
        TypeRef::generic(
            self.full_name(),
            self.type_parameters
                .iter()
                .map(|param| TypeRef::simple(param.clone()))
                .collect(),
        )
    }
}

/// Strip `global::` and map the global namespace token to empty
pub fn normalize_namespace(namespace: &str) -> String {
    let trimmed = namespace.trim();
    if trimmed == GLOBAL_NAMESPACE_TOKEN {
        return String::new();
    }
    trimmed.strip_prefix(GLOBAL_PREFIX).unwrap_or(trimmed).to_string()
}

/// Resolve the interface's simple name and namespace.
///
/// A dotted name carries its own namespace and conflicts with an explicit
/// namespace argument. A bare name takes the explicit namespace or the
/// type's. Without a name the interface is `I<TypeName>`.
pub fn resolve_interface_name(
    ty: &ScannedType,
    name: Option<&str>,
    namespace: Option<&str>,
) -> Result<(String, String), InterfaceNameConflict> {
    let explicit_namespace = namespace.map(normalize_namespace);
    let name = name
        .map(|name| name.trim())
        .map(|name| name.strip_prefix(GLOBAL_PREFIX).unwrap_or(name))
        .filter(|name| !name.is_empty());

    match name {
        Some(qualified) if qualified.contains('.') => {
            if let Some(namespace) = namespace {
                return Err(InterfaceNameConflict {
                    type_name: ty.full_name.clone(),
                    name: qualified.to_string(),
                    namespace: namespace.to_string(),
                });
            }
            let split = qualified.rfind('.').unwrap_or(0);
            Ok((
                qualified[split + 1..].to_string(),
                normalize_namespace(&qualified[..split]),
            ))
        }
        Some(bare) => Ok((
            bare.to_string(),
            explicit_namespace.unwrap_or_else(|| ty.namespace.clone()),
        )),
        None => Ok((
            format!("I{}", ty.name),
            explicit_namespace.unwrap_or_else(|| ty.namespace.clone()),
        )),
    }
}

/// Build the generated interface for `ty`
pub fn synthesize<'a>(
    ty: &'a ScannedType,
    graph: &TypeGraph<'a>,
    name: Option<&str>,
    namespace: Option<&str>,
    emit_documentation: bool,
) -> Result<GeneratedInterface, InterfaceNameConflict> {
    let (name, namespace) = resolve_interface_name(ty, name, namespace)?;

    let contracts: Vec<(&'static WellKnownContract, Vec<String>)> = graph
        .all_interfaces(ty)
        .iter()
        .filter_map(|interface| {
            well_known::contract_for(interface).map(|contract| {
                let args = interface
                    .args
                    .iter()
                    .map(|arg| canonical_ref(graph, arg, &ty.namespace).to_string())
                    .collect();
                (contract, args)
            })
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut members = Vec::new();
    for visible in graph.visible_members(ty) {
        if !is_candidate(&visible, graph, &contracts) {
            continue;
        }
        let Some(signature) = signature_of(&visible, emit_documentation) else {
            continue;
        };
        if seen.insert(signature.display.clone()) {
            members.push(signature);
        }
    }

    tracing::debug!(
        "Synthesized interface '{}' with {} members for '{}'",
        name,
        members.len(),
        ty.full_name
    );

    Ok(GeneratedInterface {
        name,
        namespace,
        accessibility: if ty.effectively_public {
            Accessibility::Public
        } else {
            Accessibility::Internal
        },
        type_parameters: ty.type_parameters.clone(),
        members,
        implementing_type: ty.type_ref(),
        partial_target: partial_target(ty),
    })
}

fn partial_target(ty: &ScannedType) -> Option<PartialTarget> {
    if !ty.is_partial || ty.containing.iter().any(|container| !container.is_partial) {
        return None;
    }
    Some(PartialTarget {
        namespace: ty.namespace.clone(),
        containing: ty.containing.clone(),
        name: ty.name.clone(),
        kind: ty.kind,
        type_parameters: ty.type_parameters.clone(),
    })
}

fn is_candidate(
    visible: &VisibleMember<'_>,
    graph: &TypeGraph<'_>,
    contracts: &[(&WellKnownContract, Vec<String>)],
) -> bool {
    let member = &visible.member.decl;
    if visible.member.excluded
        || member.is_implicit
        || member.is_static
        || member.explicit_interface.is_some()
        || !member.accessibility.is_public()
        || !member.kind.is_interface_member()
    {
        return false;
    }
    if member.kind != MemberKind::Method {
        return true;
    }

    let parameters: Vec<String> = member
        .parameters
        .iter()
        .map(|parameter| {
            canonical_type(
                graph,
                &visible.substitute(&parameter.type_name),
                &visible.declared_in.namespace,
            )
        })
        .collect();
    if well_known::is_object_member(&member.name, &parameters) {
        return false;
    }
    !contracts.iter().any(|(contract, args)| {
        contract
            .members
            .iter()
            .any(|provided| provided.matches(&member.name, &parameters, args))
    })
}

/// Qualify a reference and its type arguments against the declared types
fn canonical_ref(graph: &TypeGraph<'_>, reference: &TypeRef, namespace: &str) -> TypeRef {
    let mut canonical = graph.canonicalize(reference, namespace);
    canonical.args = canonical
        .args
        .iter()
        .map(|arg| canonical_ref(graph, arg, namespace))
        .collect();
    canonical
}

fn canonical_type(graph: &TypeGraph<'_>, type_name: &str, namespace: &str) -> String {
    match TypeRef::parse(type_name) {
        Ok(parsed) => canonical_ref(graph, &parsed, namespace).to_string(),
        Err(_) => type_name.to_string(),
    }
}

fn signature_of(visible: &VisibleMember<'_>, emit_documentation: bool) -> Option<MemberSignature> {
    let member = &visible.member.decl;
    let return_type = visible.substitute(&member.return_type);
    let parameters: Vec<ParameterDecl> = member
        .parameters
        .iter()
        .map(|parameter| ParameterDecl {
            type_name: visible.substitute(&parameter.type_name),
            ..parameter.clone()
        })
        .collect();

    let accessors = match member.kind {
        MemberKind::Property | MemberKind::Indexer => {
            let accessors = public_accessors(member.getter, member.setter, member.init_only);
            if accessors.is_empty() {
                return None;
            }
            accessors
        }
        _ => Vec::new(),
    };

    let display = canonical_display(
        member.kind,
        &member.name,
        &return_type,
        &member.type_parameters,
        &parameters,
        &accessors,
    );

    Some(MemberSignature {
        kind: member.kind,
        name: member.name.clone(),
        return_type,
        type_parameters: member.type_parameters.clone(),
        constraints: member.constraints.clone(),
        parameters,
        accessors,
        documentation: if emit_documentation {
            member.documentation.clone()
        } else {
            None
        },
        display,
    })
}

fn public_accessors(
    getter: Option<Accessibility>,
    setter: Option<Accessibility>,
    init_only: bool,
) -> Vec<String> {
    if getter.is_none() && setter.is_none() {
        return vec!["get".to_string()];
    }
    let mut accessors = Vec::new();
    if getter.map_or(false, |access| access.is_public()) {
        accessors.push("get".to_string());
    }
    if setter.map_or(false, |access| access.is_public()) {
        accessors.push(if init_only { "init" } else { "set" }.to_string());
    }
    accessors
}

fn parameter_list(parameters: &[ParameterDecl]) -> String {
    parameters
        .iter()
        .map(|parameter| match parameter.modifier {
            Some(modifier) => format!(
                "{} {} {}",
                modifier.keyword(),
                parameter.type_name,
                parameter.name
            ),
            None => format!("{} {}", parameter.type_name, parameter.name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn canonical_display(
    kind: MemberKind,
    name: &str,
    return_type: &str,
    type_parameters: &[String],
    parameters: &[ParameterDecl],
    accessors: &[String],
) -> String {
    let accessor_block = accessors
        .iter()
        .map(|accessor| format!("{};", accessor))
        .collect::<Vec<_>>()
        .join(" ");
    match kind {
        MemberKind::Property => format!("{} {} {{ {} }}", return_type, name, accessor_block),
        MemberKind::Indexer => format!(
            "{} this[{}] {{ {} }}",
            return_type,
            parameter_list(parameters),
            accessor_block
        ),
        MemberKind::Event => format!("event {} {}", return_type, name),
        _ => {
            let generics = if type_parameters.is_empty() {
                String::new()
            } else {
                format!("<{}>", type_parameters.join(", "))
            };
            format!(
                "{} {}{}({})",
                return_type,
                name,
                generics,
                parameter_list(parameters)
            )
        }
    }
}
