//! Declaration graph handed over by the host: assemblies, namespaces,
//! types, members and attribute applications.

pub mod attributes;
pub mod compilation;
pub mod type_ref;
pub mod types;

pub use attributes::*;
pub use compilation::*;
pub use type_ref::TypeRef;
pub use types::*;
