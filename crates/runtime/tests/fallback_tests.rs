use dimark_codegen::CodeGenerator;
use dimark_core::model::MemberDecl;
use dimark_core::{
    AssemblyDecl, AttributeData, CancellationToken, Compilation, ConstantValue, Lifetime,
    NamespaceDecl, TypeDecl, TypeRef,
};
use dimark_runtime::{AssemblyScanner, ModuleRegistry, ServiceCollection, ServiceModule};

fn shop() -> Compilation {
    Compilation::new(
        AssemblyDecl::new("Shop").with_namespace(
            NamespaceDecl::new("Shop")
                .with_type(TypeDecl::interface("ICart"))
                .with_type(TypeDecl::interface("IRepo").with_type_parameters(&["T"]))
                .with_type(
                    TypeDecl::class("Cart")
                        .with_interface("Shop.ICart")
                        .with_attribute(AttributeData::new("Scoped"))
                        .with_attribute(AttributeData::new("RegisterAsImplementedInterfaces"))
                        .with_attribute(
                            AttributeData::new("RegisterAsService")
                                .with_arg(ConstantValue::Type("Shop.ICart".into()))
                                .with_arg(ConstantValue::String("eu".into())),
                        ),
                )
                .with_type(
                    TypeDecl::class("Repo")
                        .with_type_parameters(&["T"])
                        .with_interface("Shop.IRepo<T>")
                        .with_attribute(AttributeData::new("RegisterAsImplementedInterfaces")),
                )
                .with_type(
                    TypeDecl::class("Clock")
                        .partial()
                        .with_attribute(AttributeData::new("Singleton"))
                        .with_attribute(AttributeData::new("RegisterAsGeneratedInterface"))
                        .with_member(MemberDecl::method("Now", "System.DateTime")),
                ),
        ),
    )
}

#[test]
fn test_fallback_matches_generator_records() {
    let generated = CodeGenerator::default()
        .generate(&shop(), &CancellationToken::new())
        .unwrap();
    let module = AssemblyScanner::default().scan(&shop()).unwrap();

    assert_eq!(module.name(), "Shop.ShopModule");
    assert_eq!(module.records(), generated.analysis.records.as_slice());
}

#[test]
fn test_fallback_configures_collection() {
    let mut services = ServiceCollection::new();
    let applied = AssemblyScanner::default().configure(&shop(), &mut services).unwrap();

    assert_eq!(applied, services.len());
    let cart = TypeRef::simple("Shop.ICart");
    let carts: Vec<_> = services.for_service(&cart).collect();
    assert_eq!(carts.len(), 2);
    assert!(carts.iter().all(|d| d.lifetime == Lifetime::Scoped));
    assert_eq!(carts[0].key, None);
    assert_eq!(carts[1].key, Some(ConstantValue::String("eu".into())));

    let clock = TypeRef::simple("Shop.IClock");
    assert_eq!(services.for_service(&clock).count(), 1);
}

#[test]
fn test_register_all_skips_empty_and_duplicate_modules() {
    let empty = Compilation::new(
        AssemblyDecl::new("Empty").with_namespace(NamespaceDecl::new("Empty").with_type(TypeDecl::class("Plain"))),
    );
    let registry = ModuleRegistry::new();
    let added = AssemblyScanner::default()
        .register_all([&shop(), &empty, &shop()], &registry)
        .unwrap();

    assert_eq!(added, 1);
    assert_eq!(registry.registered_modules().unwrap(), vec!["Shop.ShopModule"]);
}
