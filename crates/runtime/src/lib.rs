pub mod collection;
pub mod module;
pub mod registry;
pub mod scanner;

pub use collection::{RegistrationTarget, ServiceCollection, ServiceDescriptor};
pub use module::{RecordedModule, ServiceModule};
pub use registry::ModuleRegistry;
pub use scanner::AssemblyScanner;
