use crate::errors::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const GLOBAL_PREFIX: &str = "global::";

/// A parsed type reference such as `App.IRepository<App.User>`.
///
/// `global::` qualifiers are dropped. Unbound generic arguments
/// (`IRepository<>`) are kept as arguments with an empty name so the arity
/// survives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    pub name: String,
    pub args: Vec<TypeRef>,
    /// Array ranks and nullable markers, e.g. `[]` or `?`
    pub suffix: String,
}

impl TypeRef {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: strip_global(&name.into()).to_string(),
            args: Vec::new(),
            suffix: String::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            args,
            ..Self::simple(name)
        }
    }

    /// An unbound generic reference with `arity` placeholders
    pub fn unbound(name: impl Into<String>, arity: usize) -> Self {
        Self::generic(name, vec![TypeRef::placeholder(); arity])
    }

    fn placeholder() -> Self {
        Self {
            name: String::new(),
            args: Vec::new(),
            suffix: String::new(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let mut parser = Parser { input, pos: 0 };
        let parsed = parser.parse_type(false)?;
        parser.skip_whitespace();
        if parser.pos != input.len() {
            return Err(CoreError::invalid_type_reference(
                input,
                format!("unexpected '{}'", &input[parser.pos..]),
            ));
        }
        Ok(parsed)
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn is_generic(&self) -> bool {
        !self.args.is_empty()
    }

    /// True for `Foo<>`-style references whose arguments are all unbound
    pub fn is_unbound(&self) -> bool {
        !self.args.is_empty() && self.args.iter().all(|arg| arg.name.is_empty())
    }

    /// Simple name without namespace or generic arguments
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Namespace (or containing type path) part of the name
    pub fn namespace(&self) -> &str {
        match self.name.rfind('.') {
            Some(index) => &self.name[..index],
            None => "",
        }
    }

    /// Same generic definition: equal name and arity
    pub fn same_definition(&self, other: &TypeRef) -> bool {
        self.name == other.name && self.arity() == other.arity()
    }

    /// The unbound form of this reference (`Foo<T>` becomes `Foo<>`)
    pub fn to_unbound(&self) -> TypeRef {
        TypeRef::unbound(self.name.clone(), self.arity())
    }

    /// Replace type parameters by the given arguments
    pub fn substitute(&self, params: &[String], args: &[TypeRef]) -> TypeRef {
        if self.args.is_empty() {
            if let Some(index) = params.iter().position(|param| *param == self.name) {
                if let Some(arg) = args.get(index) {
                    let mut replaced = arg.clone();
                    replaced.suffix.push_str(&self.suffix);
                    return replaced;
                }
            }
            return self.clone();
        }

        TypeRef {
            name: self.name.clone(),
            args: self
                .args
                .iter()
                .map(|arg| arg.substitute(params, args))
                .collect(),
            suffix: self.suffix.clone(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            if self.is_unbound() {
                write!(f, "<{}>", ",".repeat(self.args.len() - 1))?;
            } else {
                let args: Vec<String> = self.args.iter().map(|arg| arg.to_string()).collect();
                write!(f, "<{}>", args.join(", "))?;
            }
        }
        write!(f, "{}", self.suffix)
    }
}

impl Serialize for TypeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TypeRef::parse(&raw).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn strip_global(name: &str) -> &str {
    name.strip_prefix(GLOBAL_PREFIX).unwrap_or(name)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let next = self.peek()?;
        self.pos += next.len_utf8();
        Some(next)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&self, message: impl Into<String>) -> CoreError {
        CoreError::invalid_type_reference(self.input, message)
    }

    fn parse_type(&mut self, allow_unbound: bool) -> Result<TypeRef, CoreError> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(next) = self.peek() {
            if next.is_alphanumeric() || next == '_' || next == '.' || next == ':' || next == '@' {
                self.bump();
            } else {
                break;
            }
        }
        let name = strip_global(&self.input[start..self.pos]).to_string();

        if name.is_empty() {
            if allow_unbound {
                return Ok(TypeRef::placeholder());
            }
            return Err(self.error("expected a type name"));
        }
        if name.contains(':') {
            return Err(self.error(format!("unsupported qualifier in '{}'", name)));
        }

        self.skip_whitespace();
        let mut args = Vec::new();
        if self.peek() == Some('<') {
            self.bump();
            loop {
                args.push(self.parse_type(true)?);
                self.skip_whitespace();
                match self.bump() {
                    Some(',') => continue,
                    Some('>') => break,
                    _ => return Err(self.error("unterminated generic argument list")),
                }
            }

            let unbound = args.iter().filter(|arg| arg.name.is_empty()).count();
            if unbound != 0 && unbound != args.len() {
                return Err(self.error("cannot mix bound and unbound generic arguments"));
            }
        }

        let mut suffix = String::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('?') => {
                    self.bump();
                    suffix.push('?');
                }
                Some('[') => {
                    self.bump();
                    suffix.push('[');
                    loop {
                        match self.bump() {
                            Some(']') => break,
                            Some(',') => suffix.push(','),
                            Some(c) if c.is_whitespace() => {}
                            _ => return Err(self.error("unterminated array rank")),
                        }
                    }
                    suffix.push(']');
                }
                _ => break,
            }
        }

        Ok(TypeRef { name, args, suffix })
    }
}
