use dimark_codegen::{CodeGenerator, GeneratedOutput};
use dimark_core::model::MemberDecl;
use dimark_core::{
    AssemblyDecl, AttributeData, CancellationToken, Compilation, ConstantValue, CoreError,
    NamespaceDecl, TypeDecl,
};
use tempfile::TempDir;

fn generate(compilation: &Compilation) -> GeneratedOutput {
    CodeGenerator::default()
        .generate(compilation, &CancellationToken::new())
        .unwrap()
}

fn library(namespace: NamespaceDecl) -> Compilation {
    Compilation::new(AssemblyDecl::new("App").with_namespace(namespace))
}

#[test]
fn test_module_unit_for_self_registration() {
    let output = generate(&library(
        NamespaceDecl::new("App").with_type(TypeDecl::class("Foo").with_attribute(AttributeData::new("RegisterAsSelf"))),
    ));

    assert_eq!(output.sources.len(), 1);
    let unit = output.source("AppModule.g.cs").unwrap();
    assert!(unit.content.starts_with("// <auto-generated>"));
    assert!(unit.content.contains("namespace App\n{"));
    assert!(unit.content.contains("    [global::DiMark.AutoDiscoverModule]"));
    assert!(unit
        .content
        .contains("    public sealed class AppModule : global::DiMark.IServiceModule"));
    assert!(unit.content.contains(
        "            services.RegisterSelf(typeof(global::App.Foo), global::DiMark.ServiceLifetime.Transient);"
    ));
    assert!(unit.content.contains(
        "public static global::DiMark.IRegistrationTarget AddApp(this global::DiMark.IRegistrationTarget services)"
    ));
    assert!(unit.content.contains("new AppModule().Configure(services);"));
    assert!(!unit.content.contains("registry"));
}

#[test]
fn test_keyed_service_calls() {
    let keyed = |key: &str| {
        AttributeData::new("RegisterAsService")
            .with_arg(ConstantValue::Type("App.IBaz".into()))
            .with_arg(ConstantValue::String(key.into()))
    };
    let output = generate(&library(
        NamespaceDecl::new("App")
            .with_type(TypeDecl::interface("IBaz"))
            .with_type(
                TypeDecl::class("Baz")
                    .with_interface("App.IBaz")
                    .with_attribute(AttributeData::new("Singleton"))
                    .with_attribute(keyed("a"))
                    .with_attribute(keyed("b")),
            ),
    ));

    let content = &output.source("AppModule.g.cs").unwrap().content;
    let first = content
        .find("services.RegisterAs(typeof(global::App.IBaz), typeof(global::App.Baz), global::DiMark.ServiceLifetime.Singleton, \"a\");")
        .unwrap();
    let second = content
        .find("services.RegisterAs(typeof(global::App.IBaz), typeof(global::App.Baz), global::DiMark.ServiceLifetime.Singleton, \"b\");")
        .unwrap();
    assert!(first < second);
}

#[test]
fn test_open_generic_uses_unbound_typeof() {
    let output = generate(&library(
        NamespaceDecl::new("App")
            .with_type(TypeDecl::interface("IRepo").with_type_parameters(&["T"]))
            .with_type(
                TypeDecl::class("Repo")
                    .with_type_parameters(&["T"])
                    .with_interface("App.IRepo<T>")
                    .with_attribute(AttributeData::new("Scoped"))
                    .with_attribute(AttributeData::new("RegisterAsImplementedInterfaces")),
            ),
    ));

    let content = &output.source("AppModule.g.cs").unwrap().content;
    assert!(content.contains(
        "services.RegisterAs(typeof(global::App.IRepo<>), typeof(global::App.Repo<>), global::DiMark.ServiceLifetime.Scoped);"
    ));
}

#[test]
fn test_generated_interface_unit() {
    let output = generate(&library(
        NamespaceDecl::new("App").with_type(
            TypeDecl::class("Clock")
                .partial()
                .with_attribute(AttributeData::new("Singleton"))
                .with_attribute(AttributeData::new("RegisterAsGeneratedInterface"))
                .with_member(MemberDecl::method("Now", "System.DateTime").with_documentation("Current time."))
                .with_member(MemberDecl::method("ToString", "string").override_()),
        ),
    ));

    let names: Vec<&str> = output.sources.iter().map(|s| s.file_name.as_str()).collect();
    assert_eq!(names, vec!["App.IClock.g.cs", "AppModule.g.cs"]);

    let unit = &output.source("App.IClock.g.cs").unwrap().content;
    assert!(unit.contains("    public partial interface IClock\n    {"));
    assert!(unit.contains("        /// <summary>\n        /// Current time.\n        /// </summary>\n        global::System.DateTime Now();"));
    assert!(!unit.contains("ToString"));
    assert!(unit.contains("    partial class Clock : global::App.IClock"));

    let module = &output.source("AppModule.g.cs").unwrap().content;
    assert!(module.contains(
        "services.RegisterAs(typeof(global::App.IClock), typeof(global::App.Clock), global::DiMark.ServiceLifetime.Singleton);"
    ));
}

#[test]
fn test_nested_partial_is_wrapped_in_containers() {
    let output = generate(&library(
        NamespaceDecl::new("App").with_type(
            TypeDecl::class("Outer").partial().with_nested(
                TypeDecl::class("Inner")
                    .partial()
                    .with_attribute(AttributeData::new("RegisterAsGeneratedInterface"))
                    .with_member(MemberDecl::method("Run", "void")),
            ),
        ),
    ));

    let unit = &output.source("App.IInner.g.cs").unwrap().content;
    assert!(unit.contains("    partial class Outer\n    {\n        partial class Inner : global::App.IInner"));
}

#[test]
fn test_non_partial_type_gets_interface_only() {
    let output = generate(&library(
        NamespaceDecl::new("App").with_type(
            TypeDecl::class("Clock")
                .with_attribute(AttributeData::new("RegisterAsGeneratedInterface"))
                .with_member(MemberDecl::method("Now", "System.DateTime")),
        ),
    ));

    let unit = &output.source("App.IClock.g.cs").unwrap().content;
    assert!(unit.contains("public partial interface IClock"));
    assert!(!unit.contains("partial class Clock"));
    assert!(output.source("AppModule.g.cs").is_none());
    assert!(output.analysis.has_errors());
}

#[test]
fn test_executable_entry_point_calls_modules_in_order() {
    let module = |name: &str| {
        TypeDecl::class(name)
            .with_interface("DiMark.IServiceModule")
            .with_attribute(AttributeData::new("AutoDiscoverModule"))
    };
    let compilation = Compilation::new(
        AssemblyDecl::new("Z").with_namespace(
            NamespaceDecl::new("Z").with_type(
                TypeDecl::class("Service").with_attribute(AttributeData::new("RegisterAsSelf")),
            ),
        ),
    )
    .with_attribute(
        AttributeData::new("RegistrationModule").with_named("ModuleName", ConstantValue::String("ModuleB".into())),
    )
    .with_reference(AssemblyDecl::new("X.Y").with_namespace(NamespaceDecl::new("X.Y").with_type(module("ModuleA"))))
    .executable();

    let output = generate(&compilation);
    let content = &output.source("ModuleB.g.cs").unwrap().content;
    assert!(content.contains("this global::DiMark.IRegistrationTarget services, global::DiMark.ModuleRegistry? registry = null)"));

    let first = content.find("new global::X.Y.ModuleA().Configure(services);").unwrap();
    let second = content.find("new global::Z.ModuleB().Configure(services);").unwrap();
    let registry = content.find("registry?.ConfigureAll(services);").unwrap();
    assert!(first < second && second < registry);
}

#[test]
fn test_executable_without_own_records_still_aggregates() {
    let compilation = Compilation::new(AssemblyDecl::new("Host"))
        .with_reference(AssemblyDecl::new("Lib").with_namespace(
            NamespaceDecl::new("Lib").with_type(
                TypeDecl::class("LibModule")
                    .with_interface("DiMark.IServiceModule")
                    .with_attribute(AttributeData::new("AutoDiscoverModule")),
            ),
        ))
        .executable();

    let output = generate(&compilation);
    assert_eq!(output.sources.len(), 1);
    let content = &output.sources[0].content;
    assert_eq!(output.sources[0].file_name, "HostModule.g.cs");
    assert!(!content.contains("sealed class"));
    assert!(content.contains("new global::Lib.LibModule().Configure(services);"));
}

#[test]
fn test_nothing_marked_emits_nothing() {
    let output = generate(&library(NamespaceDecl::new("App").with_type(TypeDecl::class("Plain"))));
    assert!(output.sources.is_empty());
}

#[test]
fn test_generation_is_idempotent() {
    let compilation = library(
        NamespaceDecl::new("App")
            .with_type(TypeDecl::interface("IFoo"))
            .with_type(
                TypeDecl::class("Foo")
                    .partial()
                    .with_interface("App.IFoo")
                    .with_attribute(AttributeData::new("RegisterAsImplementedInterfaces"))
                    .with_attribute(AttributeData::new("RegisterAsGeneratedInterface"))
                    .with_member(MemberDecl::method("Run", "void")),
            ),
    );
    let first = generate(&compilation);
    let second = generate(&compilation);
    assert_eq!(first.sources, second.sources);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_cancelled_generation_has_no_output() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = CodeGenerator::default().generate(
        &library(NamespaceDecl::new("App").with_type(TypeDecl::class("Foo").with_attribute(AttributeData::new("RegisterAsSelf")))),
        &cancel,
    );
    assert!(matches!(result, Err(CoreError::Cancelled)));
}

#[test]
fn test_write_skips_unchanged_and_prunes_stale() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("Gone.g.cs"), "// stale").unwrap();

    let generator = CodeGenerator::default();
    let output = generate(&library(
        NamespaceDecl::new("App").with_type(TypeDecl::class("Foo").with_attribute(AttributeData::new("RegisterAsSelf"))),
    ));

    let first = generator.write(&output, dir.path()).unwrap();
    assert_eq!(first.written, vec![dir.path().join("AppModule.g.cs")]);
    assert_eq!(first.removed, vec![dir.path().join("Gone.g.cs")]);

    let second = generator.write(&output, dir.path()).unwrap();
    assert!(second.written.is_empty());
    assert_eq!(second.unchanged, 1);
    assert!(second.removed.is_empty());
}
