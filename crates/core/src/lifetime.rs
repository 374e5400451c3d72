use crate::errors::CoreError;
use crate::markers::{Marker, MarkerOccurrence};
use serde::{Deserialize, Serialize};

/// Registration lifetime enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// New instance for every resolution
    #[default]
    Transient,
    /// One instance per container scope
    Scoped,
    /// Single instance shared across the application
    Singleton,
}

impl Lifetime {
    pub const ALL: [Lifetime; 3] = [Lifetime::Transient, Lifetime::Scoped, Lifetime::Singleton];

    /// Check if the lifetime is singleton
    pub fn is_singleton(&self) -> bool {
        matches!(self, Lifetime::Singleton)
    }

    /// Check if the lifetime is transient
    pub fn is_transient(&self) -> bool {
        matches!(self, Lifetime::Transient)
    }

    /// Check if the lifetime is scoped
    pub fn is_scoped(&self) -> bool {
        matches!(self, Lifetime::Scoped)
    }

    /// Get the lifetime name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Transient => "transient",
            Lifetime::Scoped => "scoped",
        }
    }

    /// Member name of the runtime's lifetime enumeration
    pub fn member_name(&self) -> &'static str {
        match self {
            Lifetime::Singleton => "Singleton",
            Lifetime::Transient => "Transient",
            Lifetime::Scoped => "Scoped",
        }
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Lifetime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singleton" => Ok(Lifetime::Singleton),
            "transient" => Ok(Lifetime::Transient),
            "scoped" => Ok(Lifetime::Scoped),
            _ => Err(CoreError::validation(format!("invalid lifetime: {}", s))),
        }
    }
}

/// Outcome of resolving the lifetime markers of one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifetimeDecision {
    Resolved(Lifetime),
    /// More than one distinct lifetime marker; the type is not registered
    Indeterminate(Vec<Lifetime>),
}

impl LifetimeDecision {
    pub fn lifetime(&self) -> Option<Lifetime> {
        match self {
            LifetimeDecision::Resolved(lifetime) => Some(*lifetime),
            LifetimeDecision::Indeterminate(_) => None,
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, LifetimeDecision::Indeterminate(_))
    }
}

/// Distinct lifetime markers in first-occurrence order
pub fn lifetime_markers(markers: &[MarkerOccurrence]) -> Vec<Lifetime> {
    let mut found = Vec::new();
    for occurrence in markers {
        if let Marker::Lifetime(lifetime) = occurrence.marker {
            if !found.contains(&lifetime) {
                found.push(lifetime);
            }
        }
    }
    found
}

/// No lifetime marker means transient, one means that lifetime, more is
/// indeterminate.
pub fn resolve_lifetime(markers: &[MarkerOccurrence]) -> LifetimeDecision {
    let found = lifetime_markers(markers);
    match found.as_slice() {
        [] => LifetimeDecision::Resolved(Lifetime::Transient),
        [single] => LifetimeDecision::Resolved(*single),
        _ => LifetimeDecision::Indeterminate(found),
    }
}
