//! Symbol graph over scanned types.
//!
//! Answers inheritance questions (base chain, transitive interfaces,
//! assignability) with explicit worklists. Unknown types are leaves.

use crate::model::TypeRef;
use crate::scanner::{ScanResult, ScannedMember, ScannedType};
use std::collections::{HashMap, HashSet, VecDeque};

pub const OBJECT_TYPE: &str = "System.Object";

/// A member visible on a type together with the generic substitution that
/// maps its declaring type's parameters into the inspected type
#[derive(Debug, Clone)]
pub struct VisibleMember<'a> {
    pub member: &'a ScannedMember,
    pub declared_in: &'a ScannedType,
    pub params: Vec<String>,
    pub args: Vec<TypeRef>,
}

impl VisibleMember<'_> {
    /// Rewrite a type written in the declaring type's terms
    pub fn substitute(&self, type_name: &str) -> String {
        if self.params.is_empty() {
            return type_name.to_string();
        }
        match TypeRef::parse(type_name) {
            Ok(parsed) => parsed.substitute(&self.params, &self.args).to_string(),
            Err(_) => type_name.to_string(),
        }
    }
}

pub struct TypeGraph<'a> {
    types: HashMap<&'a str, &'a ScannedType>,
}

impl<'a> TypeGraph<'a> {
    /// Index the compilation's types, then its references; the first
    /// declaration of a name wins.
    pub fn new(scan: &'a ScanResult) -> Self {
        let mut types = HashMap::new();
        let all = scan
            .types
            .iter()
            .chain(scan.references.iter().flat_map(|assembly| assembly.types.iter()));
        for ty in all {
            types.entry(ty.full_name.as_str()).or_insert(ty);
        }
        Self { types }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, full_name: &str) -> Option<&'a ScannedType> {
        self.types.get(full_name).copied()
    }

    /// Resolve a reference to its declaration when name and arity agree
    pub fn resolve(&self, reference: &TypeRef) -> Option<&'a ScannedType> {
        self.get(&reference.name)
            .filter(|ty| ty.type_parameters.len() == reference.arity())
    }

    /// Qualify a reference written relative to `namespace` when only the
    /// qualified form is declared.
    pub fn canonicalize(&self, reference: &TypeRef, namespace: &str) -> TypeRef {
        if self.resolve(reference).is_some() || namespace.is_empty() {
            return reference.clone();
        }
        let mut scope = namespace;
        loop {
            let qualified = TypeRef {
                name: format!("{}.{}", scope, reference.name),
                args: reference.args.clone(),
                suffix: reference.suffix.clone(),
            };
            if self.resolve(&qualified).is_some() {
                return qualified;
            }
            match scope.rfind('.') {
                Some(index) => scope = &scope[..index],
                None => return reference.clone(),
            }
        }
    }

    /// Base classes from the direct base upwards, `System.Object` excluded
    pub fn base_chain(&self, ty: &ScannedType) -> Vec<TypeRef> {
        let mut chain = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(ty.full_name.clone());

        let mut next = ty.base_type.clone();
        while let Some(current) = next.take() {
            if current.name == OBJECT_TYPE || !seen.insert(current.name.clone()) {
                break;
            }
            next = self.resolve(&current).and_then(|decl| {
                decl.base_type
                    .as_ref()
                    .map(|base| base.substitute(&decl.type_parameters, &current.args))
            });
            chain.push(current);
        }
        chain
    }

    /// Every interface the type implements, directly, through interface
    /// inheritance or through a base class. First-encounter order.
    pub fn all_interfaces(&self, ty: &ScannedType) -> Vec<TypeRef> {
        let mut result = Vec::new();
        let mut seen: HashSet<TypeRef> = HashSet::new();
        let mut queue: VecDeque<TypeRef> = ty.interfaces.iter().cloned().collect();

        let mut drain = |queue: &mut VecDeque<TypeRef>, result: &mut Vec<TypeRef>| {
            while let Some(interface) = queue.pop_front() {
                if !seen.insert(interface.clone()) {
                    continue;
                }
                if let Some(decl) = self.resolve(&interface) {
                    for inherited in &decl.interfaces {
                        queue.push_back(inherited.substitute(&decl.type_parameters, &interface.args));
                    }
                }
                result.push(interface);
            }
        };

        drain(&mut queue, &mut result);
        for base in self.base_chain(ty) {
            if let Some(decl) = self.resolve(&base) {
                queue.extend(
                    decl.interfaces
                        .iter()
                        .map(|interface| interface.substitute(&decl.type_parameters, &base.args)),
                );
                drain(&mut queue, &mut result);
            }
        }
        result
    }

    /// Whether the type implements an interface with this definition name
    /// and arity
    pub fn implements(&self, ty: &ScannedType, interface: &str, arity: usize) -> bool {
        self.all_interfaces(ty)
            .iter()
            .any(|implemented| implemented.name == interface && implemented.arity() == arity)
    }

    /// Identity, inheritance chain or interface implementation. Unbound
    /// services match any instantiation of the same definition.
    pub fn is_assignable(&self, ty: &ScannedType, service: &TypeRef) -> bool {
        let matches = |candidate: &TypeRef| {
            if service.is_unbound() {
                candidate.same_definition(service)
            } else {
                candidate == service
            }
        };

        if matches(&ty.type_ref()) {
            return true;
        }
        self.base_chain(ty).iter().any(|base| matches(base))
            || self.all_interfaces(ty).iter().any(|interface| matches(interface))
    }

    /// Members declared on the type followed by those of its base chain
    pub fn visible_members(&self, ty: &'a ScannedType) -> Vec<VisibleMember<'a>> {
        let mut members: Vec<VisibleMember<'a>> = ty
            .members
            .iter()
            .map(|member| VisibleMember {
                member,
                declared_in: ty,
                params: Vec::new(),
                args: Vec::new(),
            })
            .collect();

        for base in self.base_chain(ty) {
            if let Some(decl) = self.resolve(&base) {
                members.extend(decl.members.iter().map(|member| VisibleMember {
                    member,
                    declared_in: decl,
                    params: decl.type_parameters.clone(),
                    args: base.args.clone(),
                }));
            }
        }
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::config::GeneratorConfig;
    use crate::model::{AssemblyDecl, Compilation, MemberDecl, NamespaceDecl, TypeDecl};
    use crate::scanner::scan;

    fn scan_of(namespace: NamespaceDecl) -> ScanResult {
        let compilation = Compilation::new(AssemblyDecl::new("App").with_namespace(namespace));
        scan(&compilation, &GeneratorConfig::default(), &CancellationToken::new()).unwrap()
    }

    fn hierarchy() -> ScanResult {
        scan_of(
            NamespaceDecl::new("App")
                .with_type(TypeDecl::interface("IReader").with_type_parameters(&["T"]))
                .with_type(
                    TypeDecl::interface("IStore")
                        .with_type_parameters(&["T"])
                        .with_interface("App.IReader<T>")
                        .with_interface("System.IDisposable"),
                )
                .with_type(
                    TypeDecl::class("StoreBase")
                        .abstract_()
                        .with_type_parameters(&["T"])
                        .with_interface("App.IStore<T>")
                        .with_member(MemberDecl::method("Find", "T")),
                )
                .with_type(TypeDecl::class("UserStore").with_base("App.StoreBase<App.User>"))
                .with_type(TypeDecl::class("User")),
        )
    }

    #[test]
    fn test_transitive_interfaces_through_base() {
        let scan = hierarchy();
        let graph = TypeGraph::new(&scan);
        let store = graph.get("App.UserStore").unwrap();

        let interfaces: Vec<String> = graph
            .all_interfaces(store)
            .iter()
            .map(|interface| interface.to_string())
            .collect();
        assert_eq!(
            interfaces,
            vec![
                "App.IStore<App.User>",
                "App.IReader<App.User>",
                "System.IDisposable"
            ]
        );
        assert!(graph.implements(store, "System.IDisposable", 0));
    }

    #[test]
    fn test_assignability() {
        let scan = hierarchy();
        let graph = TypeGraph::new(&scan);
        let store = graph.get("App.UserStore").unwrap();

        assert!(graph.is_assignable(store, &TypeRef::simple("App.UserStore")));
        assert!(graph.is_assignable(store, &TypeRef::parse("App.StoreBase<App.User>").unwrap()));
        assert!(graph.is_assignable(store, &TypeRef::parse("App.IReader<App.User>").unwrap()));
        assert!(graph.is_assignable(store, &TypeRef::parse("App.IReader<>").unwrap()));
        assert!(!graph.is_assignable(store, &TypeRef::parse("App.IReader<App.StoreBase>").unwrap()));
        assert!(!graph.is_assignable(store, &TypeRef::simple("App.User")));
    }

    #[test]
    fn test_inherited_members_are_substituted() {
        let scan = hierarchy();
        let graph = TypeGraph::new(&scan);
        let store = graph.get("App.UserStore").unwrap();

        let members = graph.visible_members(store);
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].substitute(&members[0].member.decl.return_type), "App.User");
    }

    #[test]
    fn test_inheritance_cycles_terminate() {
        let scan = scan_of(
            NamespaceDecl::new("App")
                .with_type(TypeDecl::class("A").with_base("App.B"))
                .with_type(TypeDecl::class("B").with_base("App.A"))
                .with_type(TypeDecl::interface("IA").with_interface("App.IB"))
                .with_type(TypeDecl::interface("IB").with_interface("App.IA")),
        );
        let graph = TypeGraph::new(&scan);
        assert_eq!(graph.base_chain(graph.get("App.A").unwrap()).len(), 1);
        assert_eq!(graph.all_interfaces(graph.get("App.IA").unwrap()).len(), 2);
    }

    #[test]
    fn test_canonicalize_relative_reference() {
        let scan = hierarchy();
        let graph = TypeGraph::new(&scan);
        let relative = TypeRef::parse("IReader<App.User>").unwrap();
        assert_eq!(
            graph.canonicalize(&relative, "App").to_string(),
            "App.IReader<App.User>"
        );
        let unknown = TypeRef::simple("Missing");
        assert_eq!(graph.canonicalize(&unknown, "App"), unknown);
    }
}
