use dimark_core::CoreError;
use serde::Serialize;
use tinytemplate::TinyTemplate;

/// Render one template with unescaped output; bodies are pre-rendered C#
pub fn render_template<C: Serialize>(
    name: &str,
    template: &str,
    context: &C,
) -> Result<String, CoreError> {
    let mut engine = TinyTemplate::new();
    engine.set_default_formatter(&tinytemplate::format_unescaped);
    engine
        .add_template(name, template)
        .map_err(|e| CoreError::template(format!("invalid template '{}': {}", name, e)))?;
    engine
        .render(name, context)
        .map_err(|e| CoreError::template(format!("failed to render '{}': {}", name, e)))
}

#[derive(Serialize)]
pub struct FileContext<'a> {
    pub generator: &'a str,
    pub version: &'a str,
    pub body: String,
}

pub static FILE_TEMPLATE: &str = r#"// <auto-generated>
//     Generated by {generator} {version}. Changes to this file will be lost.
// </auto-generated>
#nullable enable

{body}
"#;

#[derive(Serialize)]
pub struct NamespaceContext<'a> {
    pub namespace: &'a str,
    pub body: String,
}

pub static NAMESPACE_TEMPLATE: &str = r#"namespace {namespace}
\{
{body}
}"#;

#[derive(Serialize)]
pub struct InterfaceContext<'a> {
    pub accessibility: &'a str,
    pub name: &'a str,
    pub type_parameters: String,
    pub members: String,
}

pub static INTERFACE_TEMPLATE: &str = r#"{accessibility} partial interface {name}{type_parameters}
\{
{members}
}"#;

#[derive(Serialize)]
pub struct PartialContext<'a> {
    pub keyword: &'a str,
    pub name: &'a str,
    pub type_parameters: String,
    pub base_list: String,
    pub body: String,
}

pub static PARTIAL_TEMPLATE: &str = r#"partial {keyword} {name}{type_parameters}{base_list}
\{
{body}
}"#;

#[derive(Serialize)]
pub struct ModuleContext<'a> {
    pub assembly: &'a str,
    pub discovery_attribute: String,
    pub module_name: &'a str,
    pub module_interface: String,
    pub registration_target: String,
    pub registrations: String,
}

pub static MODULE_TEMPLATE: &str = r#"/// <summary>
/// Registrations generated for assembly {assembly}.
/// </summary>
[{discovery_attribute}]
public sealed class {module_name} : {module_interface}
\{
    public void Configure({registration_target} services)
    \{
{registrations}
    }
}"#;

#[derive(Serialize)]
pub struct ExtensionsContext<'a> {
    pub class_name: String,
    pub method_name: &'a str,
    pub registration_target: String,
    pub parameters: String,
    pub body: String,
}

pub static EXTENSIONS_TEMPLATE: &str = r#"public static class {class_name}
\{
    public static {registration_target} {method_name}(this {registration_target} services{parameters})
    \{
{body}
        return services;
    }
}"#;
