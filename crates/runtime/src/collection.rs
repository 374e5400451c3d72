use dimark_core::{ConstantValue, Lifetime, RegistrationRecord, TypeRef};
use serde::{Deserialize, Serialize};

/// Receiver of registration calls issued by service modules
pub trait RegistrationTarget {
    /// Register `implementation` as its own service
    fn register_self(
        &mut self,
        implementation: &TypeRef,
        lifetime: Lifetime,
        key: Option<&ConstantValue>,
    );

    /// Register `implementation` under `service`
    fn register_as(
        &mut self,
        service: &TypeRef,
        implementation: &TypeRef,
        lifetime: Lifetime,
        key: Option<&ConstantValue>,
    );

    /// Issue the call matching one aggregated record
    fn apply(&mut self, record: &RegistrationRecord) {
        match &record.service {
            None => self.register_self(&record.implementation, record.lifetime, record.key.as_ref()),
            Some(service) => self.register_as(
                service,
                &record.implementation,
                record.lifetime,
                record.key.as_ref(),
            ),
        }
    }
}

/// One registration as seen by the container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub service: TypeRef,
    pub implementation: TypeRef,
    pub lifetime: Lifetime,
    pub key: Option<ConstantValue>,
}

impl ServiceDescriptor {
    pub fn is_self(&self) -> bool {
        self.service == self.implementation
    }

    pub fn is_keyed(&self) -> bool {
        self.key.is_some()
    }
}

/// Ordered list of descriptors; later registrations never replace earlier ones
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.descriptors.iter()
    }

    /// Descriptors registered for `service`, in registration order
    pub fn for_service<'a>(&'a self, service: &'a TypeRef) -> impl Iterator<Item = &'a ServiceDescriptor> {
        self.descriptors.iter().filter(move |d| &d.service == service)
    }

    fn push(&mut self, descriptor: ServiceDescriptor) {
        tracing::trace!(
            "Registered {} -> {} ({})",
            descriptor.service,
            descriptor.implementation,
            descriptor.lifetime
        );
        self.descriptors.push(descriptor);
    }
}

impl RegistrationTarget for ServiceCollection {
    fn register_self(
        &mut self,
        implementation: &TypeRef,
        lifetime: Lifetime,
        key: Option<&ConstantValue>,
    ) {
        self.push(ServiceDescriptor {
            service: implementation.clone(),
            implementation: implementation.clone(),
            lifetime,
            key: key.cloned(),
        });
    }

    fn register_as(
        &mut self,
        service: &TypeRef,
        implementation: &TypeRef,
        lifetime: Lifetime,
        key: Option<&ConstantValue>,
    ) {
        self.push(ServiceDescriptor {
            service: service.clone(),
            implementation: implementation.clone(),
            lifetime,
            key: key.cloned(),
        });
    }
}
