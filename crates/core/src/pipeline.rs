//! End-to-end analysis of one compilation.
//!
//! Scan, resolve lifetimes, synthesize interfaces, aggregate registrations,
//! resolve naming, discover modules and run the diagnostic rules. The result
//! is a pure function of the compilation and configuration.

use crate::cancel::CancellationToken;
use crate::config::GeneratorConfig;
use crate::diagnostics::rules::invalid_target_reason;
use crate::diagnostics::{check_types, duplicate_diagnostics, naming_diagnostics, Diagnostic};
use crate::errors::CoreError;
use crate::interface::{synthesize, GeneratedInterface};
use crate::markers::Marker;
use crate::model::{Compilation, OutputKind};
use crate::modules::{discover_modules, ordered_entries, ModuleEntry};
use crate::naming::{resolve_naming, ResolvedNaming};
use crate::registration::{aggregate, collect_candidates, LifetimeTable, RegistrationRecord};
use crate::scanner::{scan, ScanResult, ScannedType};
use crate::symbols::TypeGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything the emitter and the reports need
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub assembly_name: String,
    pub output_kind: OutputKind,
    pub naming: ResolvedNaming,
    pub records: Vec<RegistrationRecord>,
    pub interfaces: Vec<GeneratedInterface>,
    /// Discovered modules plus the compilation's own generated module,
    /// ordinally sorted
    pub modules: Vec<ModuleEntry>,
    /// Present when the compilation produces at least one registration
    pub own_module: Option<ModuleEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.is_warning()).count()
    }

    /// Whether the executable aggregation routine has anything to call
    pub fn needs_entry_point(&self) -> bool {
        self.output_kind.is_executable() && !self.modules.is_empty()
    }
}

/// Types whose markers can produce output
fn eligible_types(scan: &ScanResult) -> Vec<&ScannedType> {
    scan.marked_types()
        .filter(|ty| invalid_target_reason(ty).is_none())
        .collect()
}

fn synthesize_interfaces(
    types: &[&ScannedType],
    graph: &TypeGraph<'_>,
    config: &GeneratorConfig,
    cancel: &CancellationToken,
) -> Result<Vec<GeneratedInterface>, CoreError> {
    let mut interfaces = Vec::new();
    for &ty in types {
        cancel.check()?;
        let request = ty.markers.iter().find_map(|occurrence| match &occurrence.marker {
            Marker::RegisterAsGeneratedInterface { name, namespace, .. }
            | Marker::GenerateInterface { name, namespace } => {
                Some((name.as_deref(), namespace.as_deref()))
            }
            _ => None,
        });
        let Some((name, namespace)) = request else {
            continue;
        };
        match synthesize(ty, graph, name, namespace, config.emit_documentation) {
            Ok(interface) => interfaces.push(interface),
            Err(conflict) => tracing::debug!("Skipping interface: {}", conflict),
        }
    }
    Ok(interfaces)
}

pub fn analyze(
    compilation: &Compilation,
    config: &GeneratorConfig,
    cancel: &CancellationToken,
) -> Result<Analysis, CoreError> {
    let scanned = scan(compilation, config, cancel)?;
    let graph = TypeGraph::new(&scanned);
    tracing::debug!("Indexed {} types", graph.len());

    let eligible = eligible_types(&scanned);
    let interfaces = synthesize_interfaces(&eligible, &graph, config, cancel)?;
    let by_type: HashMap<String, GeneratedInterface> = interfaces
        .iter()
        .map(|interface| (interface.implementing_type.name.clone(), interface.clone()))
        .collect();

    let candidates = collect_candidates(eligible.iter().copied(), &graph, &by_type, cancel)?;
    let lifetimes = LifetimeTable::build(eligible.iter().copied());
    let aggregation = aggregate(&candidates, &lifetimes);

    let naming_override = scanned.naming_overrides.iter().find_map(|occurrence| match &occurrence.marker {
        Marker::NamingOverride(naming) => Some(naming),
        _ => None,
    });
    let naming = resolve_naming(&scanned.assembly_name, naming_override);

    let own_module = (!aggregation.records.is_empty())
        .then(|| ModuleEntry::new(naming.module_full_name(), scanned.assembly_name.clone()));
    let discovered = discover_modules(&scanned, &graph, config, cancel)?;
    let modules = ordered_entries(discovered.into_iter().chain(own_module.clone()));

    let mut diagnostics = check_types(&scanned, &graph, cancel)?;
    diagnostics.extend(naming_diagnostics(&scanned.naming_overrides));
    diagnostics.extend(duplicate_diagnostics(&aggregation.duplicates));

    tracing::debug!(
        "Analysis of '{}': {} registrations, {} interfaces, {} modules, {} diagnostics",
        scanned.assembly_name,
        aggregation.records.len(),
        interfaces.len(),
        modules.len(),
        diagnostics.len()
    );

    Ok(Analysis {
        assembly_name: scanned.assembly_name.clone(),
        output_kind: scanned.output_kind,
        naming,
        records: aggregation.records,
        interfaces,
        modules,
        own_module,
        diagnostics,
    })
}
