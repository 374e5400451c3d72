//! C# rendering helpers: qualified type names, literals, member lines.

use dimark_core::interface::MemberSignature;
use dimark_core::model::{MemberKind, ParameterDecl};
use dimark_core::{ConstantValue, TypeRef};

const GLOBAL_PREFIX: &str = "global::";

/// Built-in type keywords that are never qualified
pub const TYPE_KEYWORDS: &[&str] = &[
    "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "nint",
    "nuint", "long", "ulong", "short", "ushort", "object", "string", "void", "dynamic",
];

pub fn is_type_keyword(name: &str) -> bool {
    TYPE_KEYWORDS.contains(&name)
}

/// Render a reference with `global::` on every dotted name
pub fn qualify(reference: &TypeRef) -> String {
    let mut rendered = String::new();
    if reference.name.contains('.') && !is_type_keyword(&reference.name) {
        rendered.push_str(GLOBAL_PREFIX);
    }
    rendered.push_str(&reference.name);

    if !reference.args.is_empty() {
        if reference.is_unbound() {
            rendered.push('<');
            rendered.push_str(&",".repeat(reference.args.len() - 1));
            rendered.push('>');
        } else {
            let args: Vec<String> = reference.args.iter().map(qualify).collect();
            rendered.push('<');
            rendered.push_str(&args.join(", "));
            rendered.push('>');
        }
    }
    rendered.push_str(&reference.suffix);
    rendered
}

/// Qualify a type written as text; text that does not parse is kept as is
pub fn qualify_str(type_name: &str) -> String {
    match TypeRef::parse(type_name) {
        Ok(reference) => qualify(&reference),
        Err(_) => type_name.to_string(),
    }
}

/// Qualified name of a dotted name without generic arguments
pub fn qualify_name(name: &str) -> String {
    if name.contains('.') {
        format!("{}{}", GLOBAL_PREFIX, name)
    } else {
        name.to_string()
    }
}

pub fn typeof_expr(reference: &TypeRef) -> String {
    format!("typeof({})", qualify(reference))
}

pub fn escape_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\0' => escaped.push_str("\\0"),
            other => escaped.push(other),
        }
    }
    escaped.push('"');
    escaped
}

/// Registration key as a C# constant expression
pub fn key_literal(key: &ConstantValue) -> String {
    match key {
        ConstantValue::Null => "null".to_string(),
        ConstantValue::Bool(value) => value.to_string(),
        ConstantValue::Int(value) => value.to_string(),
        ConstantValue::String(value) => escape_string(value),
        ConstantValue::Enum { type_name, member } => {
            format!("{}.{}", qualify_str(type_name), member)
        }
        ConstantValue::Type(type_name) => format!("typeof({})", qualify_str(type_name)),
    }
}

/// `<T, U>` or nothing
pub fn type_parameter_list(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", params.join(", "))
    }
}

fn parameter(parameter: &ParameterDecl) -> String {
    let mut rendered = String::new();
    if let Some(modifier) = parameter.modifier {
        rendered.push_str(modifier.keyword());
        rendered.push(' ');
    }
    rendered.push_str(&qualify_str(&parameter.type_name));
    rendered.push(' ');
    rendered.push_str(&parameter.name);
    if let Some(default) = &parameter.default_value {
        rendered.push_str(" = ");
        rendered.push_str(default);
    }
    rendered
}

fn parameter_list(parameters: &[ParameterDecl]) -> String {
    parameters.iter().map(parameter).collect::<Vec<_>>().join(", ")
}

fn constraint_clauses(constraints: &[String]) -> String {
    constraints
        .iter()
        .map(|constraint| format!(" where {}", constraint))
        .collect()
}

/// One interface member declaration, without indentation
pub fn member_declaration(member: &MemberSignature) -> String {
    let ty = qualify_str(&member.return_type);
    let accessors = member
        .accessors
        .iter()
        .map(|accessor| format!("{};", accessor))
        .collect::<Vec<_>>()
        .join(" ");

    match member.kind {
        MemberKind::Property => format!("{} {} {{ {} }}", ty, member.name, accessors),
        MemberKind::Indexer => format!(
            "{} this[{}] {{ {} }}",
            ty,
            parameter_list(&member.parameters),
            accessors
        ),
        MemberKind::Event => format!("event {} {};", ty, member.name),
        _ => format!(
            "{} {}{}({}){};",
            ty,
            member.name,
            type_parameter_list(&member.type_parameters),
            parameter_list(&member.parameters),
            constraint_clauses(&member.constraints)
        ),
    }
}

/// XML documentation lines; plain text is wrapped in `<summary>`
pub fn doc_comment(documentation: &str) -> Vec<String> {
    let trimmed = documentation.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with('<') {
        return trimmed
            .lines()
            .map(|line| format!("/// {}", line.trim()))
            .collect();
    }
    let mut lines = vec!["/// <summary>".to_string()];
    lines.extend(trimmed.lines().map(|line| format!("/// {}", line.trim())));
    lines.push("/// </summary>".to_string());
    lines
}

/// Indent every non-empty line by `level` times four spaces
pub fn indent(text: &str, level: usize) -> String {
    let pad = "    ".repeat(level);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
