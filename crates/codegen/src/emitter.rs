//! Renders an analysis into C# declaration units.
//!
//! Units are rendered completely or not at all: every template is rendered
//! before a [`GeneratedSource`] is created.

use crate::csharp::{
    doc_comment, indent, key_literal, member_declaration, qualify, qualify_name,
    type_parameter_list, typeof_expr,
};
use crate::templates::{
    render_template, ExtensionsContext, FileContext, InterfaceContext, ModuleContext,
    NamespaceContext, PartialContext, EXTENSIONS_TEMPLATE, FILE_TEMPLATE, INTERFACE_TEMPLATE,
    MODULE_TEMPLATE, NAMESPACE_TEMPLATE, PARTIAL_TEMPLATE,
};
use dimark_core::interface::{GeneratedInterface, PartialTarget};
use dimark_core::{Analysis, CoreError, GeneratorConfig, RegistrationRecord};
use serde::Serialize;

/// One compilable declaration unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedSource {
    pub file_name: String,
    pub content: String,
}

pub struct SourceEmitter<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> SourceEmitter<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Interface units in analysis order, then the module unit
    pub fn emit(&self, analysis: &Analysis) -> Result<Vec<GeneratedSource>, CoreError> {
        let mut sources = Vec::new();
        for interface in &analysis.interfaces {
            sources.push(self.emit_interface(interface)?);
        }
        if let Some(module) = self.emit_module(analysis)? {
            sources.push(module);
        }
        tracing::debug!("Emitted {} units for '{}'", sources.len(), analysis.assembly_name);
        Ok(sources)
    }

    pub fn emit_interface(&self, interface: &GeneratedInterface) -> Result<GeneratedSource, CoreError> {
        let members = interface
            .members
            .iter()
            .map(|member| {
                let mut lines: Vec<String> = member
                    .documentation
                    .as_deref()
                    .map(doc_comment)
                    .unwrap_or_default();
                lines.push(member_declaration(member));
                lines.join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let declaration = render_template(
            "interface",
            INTERFACE_TEMPLATE,
            &InterfaceContext {
                accessibility: interface.accessibility.keyword(),
                name: &interface.name,
                type_parameters: type_parameter_list(&interface.type_parameters),
                members: indent(&members, 1),
            },
        )?;

        let mut blocks = vec![self.in_namespace(&interface.namespace, declaration)?];
        if let Some(target) = &interface.partial_target {
            let partial = self.partial_declaration(target, interface)?;
            blocks.push(self.in_namespace(&target.namespace, partial)?);
        }

        let file_name = if interface.namespace.is_empty() {
            format!("{}.g.cs", interface.name)
        } else {
            format!("{}.{}.g.cs", interface.namespace, interface.name)
        };
        Ok(GeneratedSource {
            file_name,
            content: self.file(blocks.join("\n\n"))?,
        })
    }

    /// The implementing type re-declared as partial and listing the
    /// interface, wrapped in its containing types
    fn partial_declaration(
        &self,
        target: &PartialTarget,
        interface: &GeneratedInterface,
    ) -> Result<String, CoreError> {
        let mut declaration = render_template(
            "partial",
            PARTIAL_TEMPLATE,
            &PartialContext {
                keyword: target.kind.keyword(),
                name: &target.name,
                type_parameters: type_parameter_list(&target.type_parameters),
                base_list: format!(" : {}", qualify(&interface.service_ref())),
                body: String::new(),
            },
        )?;

        for container in target.containing.iter().rev() {
            declaration = render_template(
                "partial",
                PARTIAL_TEMPLATE,
                &PartialContext {
                    keyword: container.kind.keyword(),
                    name: &container.name,
                    type_parameters: type_parameter_list(&container.type_parameters),
                    base_list: String::new(),
                    body: indent(&declaration, 1),
                },
            )?;
        }
        Ok(declaration)
    }

    /// The module unit, or `None` when there is nothing to register or call
    pub fn emit_module(&self, analysis: &Analysis) -> Result<Option<GeneratedSource>, CoreError> {
        let has_records = !analysis.records.is_empty();
        let entry_point = analysis.needs_entry_point();
        if !has_records && !entry_point {
            return Ok(None);
        }

        let naming = &analysis.naming;
        let target = qualify_name(&self.config.registration_target);
        let mut blocks = Vec::new();

        if has_records {
            let registrations = analysis
                .records
                .iter()
                .map(|record| self.registration_call(record))
                .collect::<Vec<_>>()
                .join("\n");
            blocks.push(render_template(
                "module",
                MODULE_TEMPLATE,
                &ModuleContext {
                    assembly: &analysis.assembly_name,
                    discovery_attribute: qualify_name(&self.config.discovery_attribute()),
                    module_name: &naming.module_name,
                    module_interface: qualify_name(&self.config.module_interface),
                    registration_target: target.clone(),
                    registrations: indent(&registrations, 2),
                },
            )?);
        }

        let (parameters, calls) = if entry_point {
            let mut calls: Vec<String> = analysis
                .modules
                .iter()
                .map(|entry| format!("new {}().Configure(services);", qualify_name(&entry.full_name)))
                .collect();
            calls.push("registry?.ConfigureAll(services);".to_string());
            (
                format!(", {}? registry = null", qualify_name(&self.config.module_registry())),
                calls,
            )
        } else {
            (String::new(), vec![format!("new {}().Configure(services);", naming.module_name)])
        };

        blocks.push(render_template(
            "extensions",
            EXTENSIONS_TEMPLATE,
            &ExtensionsContext {
                class_name: format!("{}Extensions", naming.module_name),
                method_name: &naming.method_name,
                registration_target: target,
                parameters,
                body: indent(&calls.join("\n"), 2),
            },
        )?);

        let body = self.in_namespace(&naming.namespace, blocks.join("\n\n"))?;
        Ok(Some(GeneratedSource {
            file_name: format!("{}.g.cs", naming.module_name),
            content: self.file(body)?,
        }))
    }

    /// `RegisterSelf` or `RegisterAs` call for one record
    pub fn registration_call(&self, record: &RegistrationRecord) -> String {
        let lifetime = format!(
            "{}.{}",
            qualify_name(&self.config.lifetime_enum()),
            record.lifetime.member_name()
        );
        let key = record
            .key
            .as_ref()
            .map(|key| format!(", {}", key_literal(key)))
            .unwrap_or_default();

        match &record.service {
            None => format!(
                "services.RegisterSelf({}, {}{});",
                typeof_expr(&record.implementation),
                lifetime,
                key
            ),
            Some(service) => format!(
                "services.RegisterAs({}, {}, {}{});",
                typeof_expr(service),
                typeof_expr(&record.implementation),
                lifetime,
                key
            ),
        }
    }

    fn in_namespace(&self, namespace: &str, body: String) -> Result<String, CoreError> {
        if namespace.is_empty() {
            return Ok(body);
        }
        render_template(
            "namespace",
            NAMESPACE_TEMPLATE,
            &NamespaceContext {
                namespace,
                body: indent(&body, 1),
            },
        )
    }

    fn file(&self, body: String) -> Result<String, CoreError> {
        render_template(
            "file",
            FILE_TEMPLATE,
            &FileContext {
                generator: dimark_core::name(),
                version: dimark_core::version(),
                body,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimark_core::{ConstantValue, Lifetime, TypeRef};

    fn record(implementation: &str, service: Option<&str>, key: Option<ConstantValue>) -> RegistrationRecord {
        RegistrationRecord {
            implementation: TypeRef::parse(implementation).unwrap(),
            service: service.map(|service| TypeRef::parse(service).unwrap()),
            lifetime: Lifetime::Scoped,
            key,
            open_generic: false,
            location: None,
        }
    }

    #[test]
    fn test_registration_calls() {
        let config = GeneratorConfig::default();
        let emitter = SourceEmitter::new(&config);
        assert_eq!(
            emitter.registration_call(&record("App.Foo", None, None)),
            "services.RegisterSelf(typeof(global::App.Foo), global::DiMark.ServiceLifetime.Scoped);"
        );
        assert_eq!(
            emitter.registration_call(&record(
                "App.Repo<>",
                Some("App.IRepo<>"),
                Some(ConstantValue::String("main".into()))
            )),
            "services.RegisterAs(typeof(global::App.IRepo<>), typeof(global::App.Repo<>), global::DiMark.ServiceLifetime.Scoped, \"main\");"
        );
    }

    #[test]
    fn test_runtime_namespace_follows_config() {
        let config = GeneratorConfig::default().with_runtime_namespace("Acme.Di");
        let emitter = SourceEmitter::new(&config);
        assert!(emitter
            .registration_call(&record("App.Foo", None, None))
            .contains("global::Acme.Di.ServiceLifetime.Scoped"));
    }
}
