use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Source position reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.file, self.line, self.column)
    }
}

/// A compile-time constant used as an attribute argument or registration key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ConstantValue {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
    Enum { type_name: String, member: String },
    Type(String),
}

impl ConstantValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&str> {
        match self {
            ConstantValue::Type(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConstantValue::Null)
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Null => write!(f, "null"),
            ConstantValue::Bool(value) => write!(f, "{}", value),
            ConstantValue::Int(value) => write!(f, "{}", value),
            ConstantValue::String(value) => write!(f, "\"{}\"", value),
            ConstantValue::Enum { type_name, member } => write!(f, "{}.{}", type_name, member),
            ConstantValue::Type(value) => write!(f, "typeof({})", value),
        }
    }
}

/// One attribute application as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeData {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ConstantValue>,
    #[serde(default)]
    pub named: BTreeMap<String, ConstantValue>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl AttributeData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            named: BTreeMap::new(),
            location: None,
        }
    }

    pub fn with_arg(mut self, value: ConstantValue) -> Self {
        self.args.push(value);
        self
    }

    pub fn with_named(mut self, name: impl Into<String>, value: ConstantValue) -> Self {
        self.named.insert(name.into(), value);
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Look up an argument by position, falling back to named arguments
    /// (matched case-insensitively against any of `names`).
    pub fn argument(&self, position: Option<usize>, names: &[&str]) -> Option<&ConstantValue> {
        let named = self.named.iter().find_map(|(key, value)| {
            names
                .iter()
                .any(|name| key.eq_ignore_ascii_case(name))
                .then_some(value)
        });
        named.or_else(|| position.and_then(|index| self.args.get(index)))
    }
}
