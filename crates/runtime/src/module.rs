use crate::collection::RegistrationTarget;
use dimark_core::RegistrationRecord;

/// A unit of registrations, usually one per assembly
pub trait ServiceModule: Send + Sync {
    /// Unique name; the registry deduplicates on it
    fn name(&self) -> &str;

    fn configure(&self, services: &mut dyn RegistrationTarget);
}

/// A module backed by aggregated records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedModule {
    name: String,
    records: Vec<RegistrationRecord>,
}

impl RecordedModule {
    pub fn new(name: impl Into<String>, records: Vec<RegistrationRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn records(&self) -> &[RegistrationRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ServiceModule for RecordedModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&self, services: &mut dyn RegistrationTarget) {
        for record in &self.records {
            services.apply(record);
        }
    }
}
