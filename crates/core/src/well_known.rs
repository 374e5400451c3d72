//! Framework contracts that never become registrations or generated
//! interface members.

use crate::model::TypeRef;

/// Stands for the contract's first type argument in a parameter list
pub const TYPE_ARGUMENT: &str = "T";

/// A member supplied by a well-known contract, identified by name and
/// parameter types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractMember {
    pub name: &'static str,
    pub parameters: &'static [&'static str],
}

impl ContractMember {
    /// Whether a member with these canonical parameter types is the one the
    /// contract provides. `args` are the contract's canonical type arguments.
    pub fn matches(&self, name: &str, parameters: &[String], args: &[String]) -> bool {
        if self.name != name || self.parameters.len() != parameters.len() {
            return false;
        }
        self.parameters
            .iter()
            .zip(parameters)
            .all(|(expected, actual)| match (*expected, args.first()) {
                (TYPE_ARGUMENT, Some(arg)) => normalize_type(arg) == normalize_type(actual),
                (expected, _) => normalize_type(expected) == normalize_type(actual),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellKnownContract {
    pub name: &'static str,
    pub arity: usize,
    pub members: &'static [ContractMember],
}

const fn member(name: &'static str, parameters: &'static [&'static str]) -> ContractMember {
    ContractMember { name, parameters }
}

pub const WELL_KNOWN_CONTRACTS: &[WellKnownContract] = &[
    WellKnownContract {
        name: "System.IDisposable",
        arity: 0,
        members: &[member("Dispose", &[])],
    },
    WellKnownContract {
        name: "System.IAsyncDisposable",
        arity: 0,
        members: &[member("DisposeAsync", &[])],
    },
    WellKnownContract {
        name: "System.IEquatable",
        arity: 1,
        members: &[member("Equals", &[TYPE_ARGUMENT])],
    },
    WellKnownContract {
        name: "System.IComparable",
        arity: 0,
        members: &[member("CompareTo", &["object"])],
    },
    WellKnownContract {
        name: "System.IComparable",
        arity: 1,
        members: &[member("CompareTo", &[TYPE_ARGUMENT])],
    },
    WellKnownContract {
        name: "System.Collections.IEnumerable",
        arity: 0,
        members: &[member("GetEnumerator", &[])],
    },
    WellKnownContract {
        name: "System.Collections.Generic.IEnumerable",
        arity: 1,
        members: &[member("GetEnumerator", &[])],
    },
    WellKnownContract {
        name: "System.Collections.Generic.IAsyncEnumerable",
        arity: 1,
        members: &[member("GetAsyncEnumerator", &["System.Threading.CancellationToken"])],
    },
    WellKnownContract {
        name: "System.Collections.IStructuralEquatable",
        arity: 0,
        members: &[
            member("Equals", &["object", "System.Collections.IEqualityComparer"]),
            member("GetHashCode", &["System.Collections.IEqualityComparer"]),
        ],
    },
    WellKnownContract {
        name: "System.Collections.IStructuralComparable",
        arity: 0,
        members: &[member("CompareTo", &["object", "System.Collections.IComparer"])],
    },
];

/// `System.Object` virtuals a type may override
pub const OBJECT_MEMBERS: &[ContractMember] = &[
    member("ToString", &[]),
    member("GetHashCode", &[]),
    member("Equals", &["object"]),
];

pub fn contract_for(reference: &TypeRef) -> Option<&'static WellKnownContract> {
    WELL_KNOWN_CONTRACTS
        .iter()
        .find(|contract| contract.name == reference.name && contract.arity == reference.arity())
}

pub fn is_well_known(reference: &TypeRef) -> bool {
    contract_for(reference).is_some()
}

/// `parameters` are canonical parameter types
pub fn is_object_member(name: &str, parameters: &[String]) -> bool {
    OBJECT_MEMBERS
        .iter()
        .any(|member| member.matches(name, parameters, &[]))
}

/// Compare form of a type name: no `global::`, no nullable annotation on the
/// outermost type, and keywords for the common `System` aliases
pub fn normalize_type(type_name: &str) -> String {
    let stripped = type_name.trim().replace("global::", "");
    let normalized = match stripped.trim_end_matches('?') {
        "System.Object" => "object",
        "System.String" => "string",
        "System.Int32" => "int",
        "System.Int64" => "long",
        "System.Boolean" => "bool",
        other => other,
    };
    normalized.to_string()
}
