use indoc::indoc;

use crate::{CapabilitySurface, Contract, ContractKind, JType, MethodDecl, Visibility};

#[test]
fn interface_builder_defaults() {
    let foo = Contract::interface("com.acme.Foo").method(MethodDecl::new("foo", vec![], JType::Void));
    assert!(foo.is_interface());
    assert!(foo.is_abstract);
    assert!(foo.is_public());
    assert!(foo.constructors.is_empty());
    assert_eq!(foo.internal_name(), "com/acme/Foo");
    assert_eq!(foo.package(), "com.acme");
}

#[test]
fn class_has_default_constructor() {
    let base = Contract::class("com.acme.Base");
    assert_eq!(base.kind, ContractKind::Class);
    assert!(!base.is_abstract);
    assert_eq!(base.find_constructor(&[]), Some(&[][..]));
    assert_eq!(base.find_constructor(&[JType::Int]), None);
}

#[test]
fn constructor_lookup_is_exact() {
    let base = Contract::class("com.acme.Base").constructors(vec![
        vec![JType::Int],
        vec![JType::object("java.lang.String"), JType::Long],
    ]);
    assert!(base.find_constructor(&[]).is_none());
    assert!(base.find_constructor(&[JType::Int]).is_some());
    assert!(base.find_constructor(&[JType::Long]).is_none());
    assert!(
        base.find_constructor(&[JType::object("java.lang.String"), JType::Long])
            .is_some()
    );
}

#[test]
fn surface_partitions_contracts() {
    let surface: CapabilitySurface = [
        Contract::interface("a.A"),
        Contract::class("a.Base"),
        Contract::interface("a.B"),
    ]
    .into_iter()
    .collect();

    assert_eq!(surface.len(), 3);
    assert_eq!(surface.interfaces().count(), 2);
    assert_eq!(surface.base().map(|c| c.name.as_str()), Some("a.Base"));
    assert_eq!(surface.names().collect::<Vec<_>>(), vec!["a.A", "a.Base", "a.B"]);
}

#[test]
fn surface_from_json() {
    let json = indoc! {r#"
        [
            {
                "name": "com.acme.Calculator",
                "kind": "interface",
                "methods": [
                    { "name": "add", "params": ["int", "double"], "returns": "int" }
                ]
            },
            {
                "name": "com.acme.Base",
                "kind": "class",
                "visibility": "package",
                "constructors": [["java.lang.String"]],
                "methods": [
                    { "name": "close", "final": true }
                ]
            }
        ]
    "#};
    let surface = CapabilitySurface::from_json(json).unwrap();
    assert_eq!(surface.len(), 2);

    let calc = &surface.contracts()[0];
    assert_eq!(calc.methods[0].key(), "add(ID)I");
    assert!(!calc.is_abstract);

    let base = surface.base().unwrap();
    assert_eq!(base.visibility, Visibility::Package);
    assert!(base.methods[0].is_final);
    assert_eq!(base.constructors, vec![vec![JType::object("java.lang.String")]]);
}

#[test]
fn surface_json_rejects_bad_types() {
    let json = r#"[{"name": "a.A", "kind": "interface", "methods": [{"name": "f", "params": ["in t"]}]}]"#;
    assert!(CapabilitySurface::from_json(json).is_err());
}
