use nova_core::TypeIndex;
use nova_types::{
    instantiate_as_supertype, is_subclass, ClassDef, ClassKind, LayeredEnv, SymbolType, TypeEnv,
    TypeStore,
};
use pretty_assertions::assert_eq;

#[test]
fn minimal_jdk_interfaces_are_subtypes_of_object() {
    let env = TypeStore::with_minimal_jdk();

    let object = SymbolType::object();
    let list_string = SymbolType::parameterized("java.util.List", vec![SymbolType::string()]);
    assert!(object.is_compatible(&list_string, &env));
    assert!(object.is_compatible(&SymbolType::class("java.lang.Cloneable"), &env));
    assert!(is_subclass(&env, "java.util.function.UnaryOperator", "java.util.function.Function"));
}

#[test]
fn map_entry_is_a_member_of_map() {
    let env = TypeStore::with_minimal_jdk();
    let map = env.class("java.util.Map").unwrap();
    assert_eq!(map.member_class("Entry"), Some("java.util.Map$Entry"));
    assert!(env.package_classes("java.util").contains(&"Map$Entry".to_string()));
}

#[test]
fn hash_map_as_map_keeps_arguments() {
    let env = TypeStore::with_minimal_jdk();
    let args = vec![SymbolType::string(), SymbolType::class("java.lang.Integer")];
    let hash_map = SymbolType::parameterized("java.util.HashMap", args.clone());
    assert_eq!(
        instantiate_as_supertype(&env, &hash_map, "java.util.Map"),
        Some(SymbolType::parameterized("java.util.Map", args))
    );
}

#[test]
fn layered_env_prefers_first_layer() {
    let mut source = TypeStore::new();
    let mut shadow = ClassDef::new("java.lang.Runnable", ClassKind::Class);
    shadow.is_abstract = true;
    source.insert(shadow);
    source.insert(ClassDef::new("p.Local", ClassKind::Class));

    let env = LayeredEnv::new()
        .with_layer(source)
        .with_layer(TypeStore::with_minimal_jdk());

    assert!(!env.class("java.lang.Runnable").unwrap().is_interface());
    assert!(env.class("java.lang.String").is_ok());
    assert!(env.class_exists("p.Local"));
    assert_eq!(env.package_classes("p"), vec!["Local"]);
    assert!(env.class("p.Missing").is_err());
}
