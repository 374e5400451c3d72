//! Cross-assembly module discovery.

use crate::cancel::CancellationToken;
use crate::config::GeneratorConfig;
use crate::errors::CoreError;
use crate::markers::MarkerKind;
use crate::model::{TypeKind, TypeRef};
use crate::scanner::{ScanResult, ScannedType};
use crate::symbols::TypeGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A module type the aggregation routine instantiates
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub full_name: String,
    pub assembly: String,
}

impl ModuleEntry {
    pub fn new(full_name: impl Into<String>, assembly: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            assembly: assembly.into(),
        }
    }
}

fn is_module(ty: &ScannedType, graph: &TypeGraph<'_>, contract: &TypeRef) -> bool {
    ty.kind == TypeKind::Class
        && !ty.is_abstract
        && !ty.is_static
        && !ty.is_generic()
        && ty.has_marker(MarkerKind::Module)
        && graph.implements(ty, &contract.name, contract.arity())
}

/// Modules declared in the compilation and public modules of its references
pub fn discover_modules(
    scan: &ScanResult,
    graph: &TypeGraph<'_>,
    config: &GeneratorConfig,
    cancel: &CancellationToken,
) -> Result<Vec<ModuleEntry>, CoreError> {
    let contract = TypeRef::parse(&config.module_interface)?;
    let mut found = Vec::new();

    for ty in &scan.types {
        cancel.check()?;
        if is_module(ty, graph, &contract) {
            found.push(ModuleEntry::new(ty.full_name.clone(), scan.assembly_name.clone()));
        }
    }

    for assembly in &scan.references {
        cancel.check()?;
        for ty in &assembly.types {
            cancel.check()?;
            if ty.effectively_public && is_module(ty, graph, &contract) {
                found.push(ModuleEntry::new(ty.full_name.clone(), assembly.name.clone()));
            }
        }
    }

    tracing::debug!("Discovered {} modules", found.len());
    Ok(ordered_entries(found))
}

/// Deduplicate by full name (first occurrence kept) and sort ordinally
pub fn ordered_entries(entries: impl IntoIterator<Item = ModuleEntry>) -> Vec<ModuleEntry> {
    let mut by_name: BTreeMap<String, ModuleEntry> = BTreeMap::new();
    for entry in entries {
        by_name.entry(entry.full_name.clone()).or_insert(entry);
    }
    by_name.into_values().collect()
}
