pub mod cancel;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod interface;
pub mod lifetime;
pub mod markers;
pub mod model;
pub mod modules;
pub mod naming;
pub mod pipeline;
pub mod registration;
pub mod scanner;
pub mod symbols;
pub mod well_known;

// Re-export key types for convenience
pub use cancel::CancellationToken;
pub use config::{ConfigError, ConfigSource, ConfigTrait, GeneratorConfig};
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use errors::CoreError;
pub use interface::{GeneratedInterface, MemberSignature};
pub use lifetime::{Lifetime, LifetimeDecision};
pub use markers::{Marker, MarkerKind, MarkerOccurrence, NamingOverride};
pub use model::{
    AssemblyDecl, AttributeData, Compilation, ConstantValue, Location, MemberDecl, NamespaceDecl,
    OutputKind, TypeDecl, TypeRef,
};
pub use modules::ModuleEntry;
pub use naming::ResolvedNaming;
pub use pipeline::{analyze, Analysis};
pub use registration::{RegistrationCandidate, RegistrationRecord};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generator information
pub const GENERATOR_NAME: &str = "dimark";

/// Get generator version
pub fn version() -> &'static str {
    VERSION
}

/// Get generator name
pub fn name() -> &'static str {
    GENERATOR_NAME
}
