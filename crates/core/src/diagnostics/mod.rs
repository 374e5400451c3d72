//! Diagnostics reported by the generator.
//!
//! Every diagnostic carries a stable code, a severity, the positional
//! arguments it was built from and the location of the offending marker.

pub mod rules;

pub use rules::{check_types, duplicate_diagnostics, naming_diagnostics};

use crate::model::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic codes.
///
/// Format: DM#### in registration order of the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Implemented-interfaces registration without qualifying interfaces
    DM0001,
    /// Service type not assignable from the implementation
    DM0002,
    /// Marker on an abstract, static or non-constructible type
    DM0003,
    /// Duplicate registration
    DM0004,
    /// Conflicting lifetime markers
    DM0005,
    /// Conflicting interface name and namespace
    DM0006,
    /// More than one naming override
    DM0007,
    /// Generated interface registration on a type that is not partial
    DM0008,
}

impl DiagnosticCode {
    pub const ALL: [DiagnosticCode; 8] = [
        DiagnosticCode::DM0001,
        DiagnosticCode::DM0002,
        DiagnosticCode::DM0003,
        DiagnosticCode::DM0004,
        DiagnosticCode::DM0005,
        DiagnosticCode::DM0006,
        DiagnosticCode::DM0007,
        DiagnosticCode::DM0008,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::DM0001 => "DM0001",
            DiagnosticCode::DM0002 => "DM0002",
            DiagnosticCode::DM0003 => "DM0003",
            DiagnosticCode::DM0004 => "DM0004",
            DiagnosticCode::DM0005 => "DM0005",
            DiagnosticCode::DM0006 => "DM0006",
            DiagnosticCode::DM0007 => "DM0007",
            DiagnosticCode::DM0008 => "DM0008",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::DM0001 | DiagnosticCode::DM0004 => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DiagnosticCode::DM0001 => "No interfaces to register",
            DiagnosticCode::DM0002 => "Incompatible service type",
            DiagnosticCode::DM0003 => "Invalid registration target",
            DiagnosticCode::DM0004 => "Duplicate registration",
            DiagnosticCode::DM0005 => "Conflicting lifetimes",
            DiagnosticCode::DM0006 => "Conflicting interface name",
            DiagnosticCode::DM0007 => "Multiple naming overrides",
            DiagnosticCode::DM0008 => "Generated interface target not partial",
        }
    }

    /// Message with positional `{0}`, `{1}`, ... placeholders
    pub fn template(&self) -> &'static str {
        match self {
            DiagnosticCode::DM0001 => {
                "'{0}' is registered as implemented interfaces but implements none; it is registered as itself"
            }
            DiagnosticCode::DM0002 => "'{0}' is not assignable to service type '{1}'",
            DiagnosticCode::DM0003 => "{0} cannot be applied to '{1}' because it is {2}",
            DiagnosticCode::DM0004 => {
                "'{0}' is already registered as '{1}' ({2}, key {3}); the duplicate is ignored"
            }
            DiagnosticCode::DM0005 => {
                "'{0}' has conflicting lifetime markers ({1}); it is not registered"
            }
            DiagnosticCode::DM0006 => {
                "Interface name '{1}' for '{0}' already contains a namespace and conflicts with namespace '{2}'; no interface is generated"
            }
            DiagnosticCode::DM0007 => {
                "{0} naming overrides found; only the first ('{1}') is used"
            }
            DiagnosticCode::DM0008 => {
                "'{0}' is registered as generated interface '{1}' but '{2}' is not partial; the interface is generated without the registration"
            }
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substitute `{n}` placeholders in one pass over the template; unknown
/// positions are left as written and substituted text is never rescanned
pub fn format_message(template: &str, args: &[String]) -> String {
    let mut message = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        message.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
        let arg = if digits > 0 && tail[digits..].starts_with('}') {
            tail[..digits].parse::<usize>().ok().and_then(|index| args.get(index))
        } else {
            None
        };
        match arg {
            Some(arg) => {
                message.push_str(arg);
                rest = &tail[digits + 1..];
            }
            None => {
                message.push('{');
                rest = tail;
            }
        }
    }
    message.push_str(rest);
    message
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    pub args: Vec<String>,
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, args: Vec<String>, location: Option<Location>) -> Self {
        Self {
            code,
            severity: code.severity(),
            message: format_message(code.template(), &args),
            args,
            location,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{}: ", location)?;
        }
        write!(f, "{} {}: {}", self.severity, self.code, self.message)
    }
}
