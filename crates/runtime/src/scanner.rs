//! Run-time fallback for hosts where generated sources are unavailable.
//!
//! The same analysis the generator runs is applied to a compilation
//! snapshot, and the resulting records are replayed against a target.

use crate::collection::RegistrationTarget;
use crate::module::{RecordedModule, ServiceModule};
use crate::registry::ModuleRegistry;
use dimark_core::{analyze, CancellationToken, Compilation, CoreError, GeneratorConfig};

pub struct AssemblyScanner {
    config: GeneratorConfig,
    cancel: CancellationToken,
}

impl AssemblyScanner {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Build the module the generator would emit for `compilation`
    pub fn scan(&self, compilation: &Compilation) -> Result<RecordedModule, CoreError> {
        let analysis = analyze(compilation, &self.config, &self.cancel)?;
        for diagnostic in analysis.diagnostics.iter().filter(|d| d.is_error()) {
            tracing::warn!("{}", diagnostic);
        }
        tracing::debug!(
            "Scanned '{}': {} registrations",
            analysis.assembly_name,
            analysis.records.len()
        );
        Ok(RecordedModule::new(
            analysis.naming.module_full_name(),
            analysis.records,
        ))
    }

    /// Scan and configure `services` directly. Returns the number of records
    /// applied.
    pub fn configure(
        &self,
        compilation: &Compilation,
        services: &mut dyn RegistrationTarget,
    ) -> Result<usize, CoreError> {
        let module = self.scan(compilation)?;
        module.configure(services);
        Ok(module.records().len())
    }

    /// Scan every compilation and add the non-empty modules to `registry`
    pub fn register_all<'a>(
        &self,
        compilations: impl IntoIterator<Item = &'a Compilation>,
        registry: &ModuleRegistry,
    ) -> Result<usize, CoreError> {
        let mut added = 0;
        for compilation in compilations {
            let module = self.scan(compilation)?;
            if !module.is_empty() && registry.register(module)? {
                added += 1;
            }
        }
        Ok(added)
    }
}

impl Default for AssemblyScanner {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}
