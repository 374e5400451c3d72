use crate::interface::normalize_namespace;
use crate::markers::NamingOverride;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Names of the generated module, its namespace and registration method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedNaming {
    pub module_name: String,
    pub method_name: String,
    pub namespace: String,
}

impl ResolvedNaming {
    pub fn module_full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.module_name.clone()
        } else {
            format!("{}.{}", self.namespace, self.module_name)
        }
    }
}

fn invalid_characters() -> &'static Regex {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    INVALID.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("character class is valid"))
}

/// Replace everything outside `[A-Za-z0-9_]` with `_`; a leading digit gets
/// a `_` prefix.
pub fn sanitize_identifier(value: &str) -> String {
    let sanitized = invalid_characters().replace_all(value, "_");
    match sanitized.chars().next() {
        None => "_".to_string(),
        Some(first) if first.is_ascii_digit() => format!("_{}", sanitized),
        Some(_) => sanitized.into_owned(),
    }
}

/// Assembly name with every dot segment sanitized
pub fn default_namespace(assembly_name: &str) -> String {
    assembly_name
        .split('.')
        .filter(|segment| !segment.trim().is_empty())
        .map(sanitize_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

pub fn resolve_naming(assembly_name: &str, naming: Option<&NamingOverride>) -> ResolvedNaming {
    let naming = naming.cloned().unwrap_or_default();
    let stem = assembly_name.replace('.', "");

    ResolvedNaming {
        module_name: sanitize_identifier(
            &naming
                .module_name
                .unwrap_or_else(|| format!("{}Module", stem)),
        ),
        method_name: sanitize_identifier(
            &naming
                .method_name
                .unwrap_or_else(|| format!("Add{}", stem)),
        ),
        namespace: naming
            .namespace
            .map(|namespace| normalize_namespace(&namespace))
            .unwrap_or_else(|| default_namespace(assembly_name)),
    }
}
