use crate::collection::RegistrationTarget;
use crate::module::ServiceModule;
use dimark_core::CoreError;
use std::sync::{Arc, Mutex, MutexGuard};

/// Caller-owned set of modules configured after the discovered ones.
///
/// Modules are kept in registration order and deduplicated by name. All
/// access goes through one lock, so a registry may be shared between threads.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Mutex<Vec<Arc<dyn ServiceModule>>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Arc<dyn ServiceModule>>>, CoreError> {
        self.modules.lock().map_err(|_| CoreError::lock("module_registry"))
    }

    /// Add a module unless one with the same name is registered. Returns
    /// whether it was added.
    pub fn register<M: ServiceModule + 'static>(&self, module: M) -> Result<bool, CoreError> {
        self.register_shared(Arc::new(module))
    }

    pub fn register_shared(&self, module: Arc<dyn ServiceModule>) -> Result<bool, CoreError> {
        let mut modules = self.lock()?;
        if modules.iter().any(|existing| existing.name() == module.name()) {
            tracing::debug!("Module '{}' already registered", module.name());
            return Ok(false);
        }
        modules.push(module);
        Ok(true)
    }

    /// Names in registration order
    pub fn registered_modules(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.lock()?.iter().map(|m| m.name().to_string()).collect())
    }

    pub fn len(&self) -> Result<usize, CoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, CoreError> {
        Ok(self.lock()?.is_empty())
    }

    /// Configure every module in registration order. The lock is released
    /// before any module runs, so modules may register further modules.
    pub fn configure_all(&self, services: &mut dyn RegistrationTarget) -> Result<usize, CoreError> {
        let snapshot: Vec<Arc<dyn ServiceModule>> = self.lock()?.clone();
        for module in &snapshot {
            tracing::debug!("Configuring module '{}'", module.name());
            module.configure(services);
        }
        Ok(snapshot.len())
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.registered_modules().unwrap_or_default())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::ServiceCollection;
    use crate::module::RecordedModule;
    use dimark_core::{Lifetime, RegistrationRecord, TypeRef};
    use std::thread;

    fn module(name: &str, implementation: &str) -> RecordedModule {
        RecordedModule::new(
            name,
            vec![RegistrationRecord {
                implementation: TypeRef::simple(implementation),
                service: None,
                lifetime: Lifetime::Transient,
                key: None,
                open_generic: false,
                location: None,
            }],
        )
    }

    #[test]
    fn test_deduplicates_by_name_and_keeps_order() {
        let registry = ModuleRegistry::new();
        assert!(registry.register(module("B", "App.B")).unwrap());
        assert!(registry.register(module("A", "App.A")).unwrap());
        assert!(!registry.register(module("B", "App.Other")).unwrap());

        assert_eq!(registry.registered_modules().unwrap(), vec!["B", "A"]);

        let mut services = ServiceCollection::new();
        assert_eq!(registry.configure_all(&mut services).unwrap(), 2);
        let implementations: Vec<String> = services
            .iter()
            .map(|d| d.implementation.to_string())
            .collect();
        assert_eq!(implementations, vec!["App.B", "App.A"]);
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(ModuleRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry.register(module(&format!("M{}", i % 4), "App.X")).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len().unwrap(), 4);
    }
}
