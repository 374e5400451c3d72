//! Registration candidates and their aggregation into records.

use crate::cancel::CancellationToken;
use crate::errors::CoreError;
use crate::interface::GeneratedInterface;
use crate::lifetime::{lifetime_markers, resolve_lifetime, Lifetime, LifetimeDecision};
use crate::markers::{Marker, MarkerKind};
use crate::model::{ConstantValue, Location, TypeRef};
use crate::scanner::ScannedType;
use crate::symbols::TypeGraph;
use crate::well_known;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A registration requested by one marker, before lifetimes are applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCandidate {
    pub implementation: TypeRef,
    /// `None` registers the implementation as itself
    pub service: Option<TypeRef>,
    pub key: Option<ConstantValue>,
    pub open_generic: bool,
    pub location: Option<Location>,
}

/// A deduplicated registration.
///
/// Two records are the same registration when implementation, service,
/// lifetime and key agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub implementation: TypeRef,
    pub service: Option<TypeRef>,
    pub lifetime: Lifetime,
    pub key: Option<ConstantValue>,
    pub open_generic: bool,
    pub location: Option<Location>,
}

type Identity = (TypeRef, Option<TypeRef>, Lifetime, Option<ConstantValue>);

impl RegistrationRecord {
    pub fn is_self(&self) -> bool {
        self.service.is_none()
    }

    pub fn is_keyed(&self) -> bool {
        self.key.is_some()
    }

    /// Service type, falling back to the implementation for self records
    pub fn service_or_self(&self) -> &TypeRef {
        self.service.as_ref().unwrap_or(&self.implementation)
    }

    fn identity(&self) -> Identity {
        (
            self.implementation.clone(),
            self.service.clone(),
            self.lifetime,
            self.key.clone(),
        )
    }
}

impl std::fmt::Display for RegistrationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} as {} ({})", self.implementation, self.service_or_self(), self.lifetime)?;
        if let Some(key) = &self.key {
            write!(f, " [key {}]", key)?;
        }
        Ok(())
    }
}

/// Lifetime facts for one marked type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifetimeEntry {
    pub type_name: String,
    pub implementation: TypeRef,
    pub decision: LifetimeDecision,
    /// Lifetime marker without any registration or interface-only marker
    pub implicit_self: bool,
    pub open_generic: bool,
    pub location: Option<Location>,
}

/// Resolved lifetimes keyed by implementation type, in scan order
#[derive(Debug, Clone, Default)]
pub struct LifetimeTable {
    entries: Vec<LifetimeEntry>,
    index: HashMap<String, usize>,
}

impl LifetimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build<'a>(types: impl IntoIterator<Item = &'a ScannedType>) -> Self {
        let mut table = Self::new();
        for ty in types {
            table.insert(LifetimeEntry {
                type_name: ty.full_name.clone(),
                implementation: implementation_ref(ty),
                decision: resolve_lifetime(&ty.markers),
                implicit_self: !lifetime_markers(&ty.markers).is_empty()
                    && !ty.has_registration_marker()
                    && !ty.has_marker(MarkerKind::GenerateInterface),
                open_generic: ty.is_generic(),
                location: ty.marker_location(),
            });
        }
        table
    }

    /// Later entries for the same type replace earlier ones
    pub fn insert(&mut self, entry: LifetimeEntry) {
        match self.index.get(&entry.type_name) {
            Some(&position) => self.entries[position] = entry,
            None => {
                self.index.insert(entry.type_name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, type_name: &str) -> Option<&LifetimeEntry> {
        self.index.get(type_name).map(|&position| &self.entries[position])
    }

    /// Types absent from the table are transient; indeterminate types have
    /// no lifetime.
    pub fn lifetime_of(&self, type_name: &str) -> Option<Lifetime> {
        match self.get(type_name) {
            Some(entry) => entry.decision.lifetime(),
            None => Some(Lifetime::Transient),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LifetimeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A candidate whose 4-tuple was already registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRegistration {
    pub record: RegistrationRecord,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub records: Vec<RegistrationRecord>,
    pub duplicates: Vec<DuplicateRegistration>,
}

/// Implementation reference; generic types register as open generics
fn implementation_ref(ty: &ScannedType) -> TypeRef {
    if ty.is_generic() {
        ty.type_ref().to_unbound()
    } else {
        ty.type_ref()
    }
}

fn service_ref(ty: &ScannedType, service: &TypeRef) -> TypeRef {
    if ty.is_generic() && service.is_generic() {
        service.to_unbound()
    } else {
        service.clone()
    }
}

/// Interfaces that `RegisterAsImplementedInterfaces` registers against
pub fn qualifying_interfaces(ty: &ScannedType, graph: &TypeGraph<'_>) -> Vec<TypeRef> {
    graph
        .all_interfaces(ty)
        .into_iter()
        .filter(|interface| !well_known::is_well_known(interface))
        .collect()
}

/// Turn the registration markers of each type into candidates, in marker
/// order. `interfaces` maps a type's full name to its generated interface.
pub fn collect_candidates<'a>(
    types: impl IntoIterator<Item = &'a ScannedType>,
    graph: &TypeGraph<'_>,
    interfaces: &HashMap<String, GeneratedInterface>,
    cancel: &CancellationToken,
) -> Result<Vec<RegistrationCandidate>, CoreError> {
    let mut candidates = Vec::new();

    for ty in types {
        cancel.check()?;
        let implementation = implementation_ref(ty);
        let candidate = |service: Option<TypeRef>, key: &Option<ConstantValue>, location: &Option<Location>| {
            RegistrationCandidate {
                implementation: implementation.clone(),
                service,
                key: key.clone(),
                open_generic: ty.is_generic(),
                location: location.clone().or_else(|| ty.location.clone()),
            }
        };

        for occurrence in &ty.markers {
            let location = &occurrence.location;
            match &occurrence.marker {
                Marker::RegisterAsSelf { key } => candidates.push(candidate(None, key, location)),
                Marker::RegisterAsService { service, key } => {
                    let service = graph.canonicalize(service, &ty.namespace);
                    candidates.push(candidate(Some(service_ref(ty, &service)), key, location));
                }
                Marker::RegisterAsImplementedInterfaces { key } => {
                    let implemented = qualifying_interfaces(ty, graph);
                    if implemented.is_empty() {
                        candidates.push(candidate(None, key, location));
                    }
                    for interface in implemented {
                        candidates.push(candidate(Some(service_ref(ty, &interface)), key, location));
                    }
                }
                Marker::RegisterAsGeneratedInterface { key, .. } => {
                    match interfaces.get(&ty.full_name) {
                        Some(generated) if generated.partial_target.is_some() => candidates.push(
                            candidate(Some(service_ref(ty, &generated.service_ref())), key, location),
                        ),
                        Some(_) => tracing::debug!(
                            "'{}' is not partial, skipping its generated interface registration",
                            ty.full_name
                        ),
                        None => tracing::debug!(
                            "No generated interface for '{}', skipping its registration",
                            ty.full_name
                        ),
                    }
                }
                _ => {}
            }
        }
    }

    Ok(candidates)
}

/// Apply lifetimes and collapse candidates by their 4-tuple. The first
/// candidate wins; later ones are reported as duplicates. Types with only a
/// lifetime marker are then registered as themselves.
pub fn aggregate(candidates: &[RegistrationCandidate], lifetimes: &LifetimeTable) -> Aggregation {
    let mut aggregation = Aggregation::default();
    let mut seen: HashSet<Identity> = HashSet::new();
    let mut with_candidates: HashSet<&str> = HashSet::new();

    let mut insert = |record: RegistrationRecord, aggregation: &mut Aggregation| {
        if seen.insert(record.identity()) {
            aggregation.records.push(record);
        } else {
            tracing::debug!("Duplicate registration {}", record);
            aggregation.duplicates.push(DuplicateRegistration {
                location: record.location.clone(),
                record,
            });
        }
    };

    for candidate in candidates {
        let type_name = candidate.implementation.name.as_str();
        with_candidates.insert(type_name);
        let Some(lifetime) = lifetimes.lifetime_of(type_name) else {
            tracing::debug!("Skipping '{}': lifetime is indeterminate", type_name);
            continue;
        };
        insert(
            RegistrationRecord {
                implementation: candidate.implementation.clone(),
                service: candidate.service.clone(),
                lifetime,
                key: candidate.key.clone(),
                open_generic: candidate.open_generic,
                location: candidate.location.clone(),
            },
            &mut aggregation,
        );
    }

    for entry in lifetimes.iter() {
        if !entry.implicit_self || with_candidates.contains(entry.type_name.as_str()) {
            continue;
        }
        if let Some(lifetime) = entry.decision.lifetime() {
            insert(
                RegistrationRecord {
                    implementation: entry.implementation.clone(),
                    service: None,
                    lifetime,
                    key: None,
                    open_generic: entry.open_generic,
                    location: entry.location.clone(),
                },
                &mut aggregation,
            );
        }
    }

    tracing::debug!(
        "Aggregated {} registrations ({} duplicates)",
        aggregation.records.len(),
        aggregation.duplicates.len()
    );
    aggregation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::model::{AssemblyDecl, AttributeData, Compilation, NamespaceDecl, TypeDecl};
    use crate::scanner::{scan, ScanResult};

    fn scan_of(namespace: NamespaceDecl) -> ScanResult {
        let compilation = Compilation::new(AssemblyDecl::new("App").with_namespace(namespace));
        scan(&compilation, &GeneratorConfig::default(), &CancellationToken::new()).unwrap()
    }

    fn aggregate_scan(scan: &ScanResult) -> Aggregation {
        let graph = TypeGraph::new(scan);
        let marked: Vec<&ScannedType> = scan.marked_types().collect();
        let candidates = collect_candidates(
            marked.iter().copied(),
            &graph,
            &HashMap::new(),
            &CancellationToken::new(),
        )
        .unwrap();
        aggregate(&candidates, &LifetimeTable::build(marked.iter().copied()))
    }

    fn service_names(aggregation: &Aggregation) -> Vec<String> {
        aggregation
            .records
            .iter()
            .map(|record| record.service_or_self().to_string())
            .collect()
    }

    #[test]
    fn test_implemented_interfaces_one_record_each() {
        let scan = scan_of(
            NamespaceDecl::new("App")
                .with_type(TypeDecl::interface("IBar"))
                .with_type(TypeDecl::interface("IBaz"))
                .with_type(
                    TypeDecl::class("Bar")
                        .with_interface("App.IBar")
                        .with_interface("App.IBaz")
                        .with_interface("System.IDisposable")
                        .with_attribute(AttributeData::new("Scoped"))
                        .with_attribute(AttributeData::new("RegisterAsImplementedInterfaces")),
                ),
        );
        let aggregation = aggregate_scan(&scan);
        assert_eq!(service_names(&aggregation), vec!["App.IBar", "App.IBaz"]);
        assert!(aggregation
            .records
            .iter()
            .all(|record| record.lifetime == Lifetime::Scoped));
    }

    #[test]
    fn test_no_qualifying_interfaces_registers_self() {
        let scan = scan_of(
            NamespaceDecl::new("App").with_type(
                TypeDecl::class("Qux")
                    .with_interface("System.IDisposable")
                    .with_attribute(AttributeData::new("RegisterAsImplementedInterfaces")),
            ),
        );
        let aggregation = aggregate_scan(&scan);
        assert_eq!(aggregation.records.len(), 1);
        assert!(aggregation.records[0].is_self());
        assert_eq!(aggregation.records[0].lifetime, Lifetime::Transient);
    }

    #[test]
    fn test_duplicate_tuple_first_wins() {
        let service = || {
            AttributeData::new("RegisterAsService").with_arg(ConstantValue::Type("App.IFoo".into()))
        };
        let scan = scan_of(
            NamespaceDecl::new("App")
                .with_type(TypeDecl::interface("IFoo"))
                .with_type(
                    TypeDecl::class("Foo")
                        .with_interface("App.IFoo")
                        .with_attribute(service())
                        .with_attribute(service()),
                ),
        );
        let aggregation = aggregate_scan(&scan);
        assert_eq!(aggregation.records.len(), 1);
        assert_eq!(aggregation.duplicates.len(), 1);
        assert_eq!(aggregation.duplicates[0].record, aggregation.records[0]);
    }

    #[test]
    fn test_implicit_self_registration() {
        let scan = scan_of(
            NamespaceDecl::new("App")
                .with_type(TypeDecl::class("Clock").with_attribute(AttributeData::new("Singleton")))
                .with_type(
                    TypeDecl::class("Shaped")
                        .with_attribute(AttributeData::new("Singleton"))
                        .with_attribute(AttributeData::new("GenerateInterface")),
                ),
        );
        let aggregation = aggregate_scan(&scan);
        assert_eq!(aggregation.records.len(), 1);
        assert_eq!(aggregation.records[0].implementation.to_string(), "App.Clock");
        assert_eq!(aggregation.records[0].lifetime, Lifetime::Singleton);
    }

    #[test]
    fn test_indeterminate_lifetime_drops_type() {
        let scan = scan_of(
            NamespaceDecl::new("App").with_type(
                TypeDecl::class("Confused")
                    .with_attribute(AttributeData::new("Scoped"))
                    .with_attribute(AttributeData::new("Singleton"))
                    .with_attribute(AttributeData::new("RegisterAsSelf")),
            ),
        );
        let aggregation = aggregate_scan(&scan);
        assert!(aggregation.records.is_empty());
        assert!(aggregation.duplicates.is_empty());
    }

    #[test]
    fn test_open_generic_registration() {
        let scan = scan_of(
            NamespaceDecl::new("App")
                .with_type(TypeDecl::interface("IRepository").with_type_parameters(&["T"]))
                .with_type(
                    TypeDecl::class("Repository")
                        .with_type_parameters(&["T"])
                        .with_interface("App.IRepository<T>")
                        .with_attribute(AttributeData::new("RegisterAsImplementedInterfaces")),
                ),
        );
        let aggregation = aggregate_scan(&scan);
        let record = &aggregation.records[0];
        assert!(record.open_generic);
        assert_eq!(record.implementation.to_string(), "App.Repository<>");
        assert_eq!(record.service_or_self().to_string(), "App.IRepository<>");
    }

    #[test]
    fn test_relative_service_is_qualified() {
        let scan = scan_of(
            NamespaceDecl::new("App")
                .with_type(TypeDecl::interface("IFoo"))
                .with_type(
                    TypeDecl::class("Foo").with_interface("App.IFoo").with_attribute(
                        AttributeData::new("RegisterAsService")
                            .with_arg(ConstantValue::Type("IFoo".into())),
                    ),
                ),
        );
        assert_eq!(service_names(&aggregate_scan(&scan)), vec!["App.IFoo"]);
    }
}
