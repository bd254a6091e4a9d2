use interpose_classfile::access;
use interpose_core::{CapabilitySurface, Contract, JType, Visibility};

use crate::error::ProxyError;
use crate::request::{Placement, validate};
use crate::test_utils::{counter, greeter, service, string, surface};

#[test]
fn public_surface_is_public_final() {
    let placement = validate(&surface(vec![greeter(), counter()]), &[]).unwrap();
    assert_eq!(
        placement,
        Placement {
            package: None,
            access: access::PUBLIC | access::FINAL,
        }
    );
}

#[test]
fn package_private_contract_pins_package() {
    let hidden = Contract::interface("com.acme.internal.Hidden").with_visibility(Visibility::Package);
    let placement = validate(&surface(vec![greeter(), hidden]), &[]).unwrap();
    assert_eq!(placement.package.as_deref(), Some("com.acme.internal"));
    assert_eq!(placement.access, access::FINAL);
}

#[test]
fn non_public_contracts_must_share_package() {
    let first = Contract::interface("com.acme.a.First").with_visibility(Visibility::Package);
    let second = Contract::interface("com.acme.b.Second").with_visibility(Visibility::Protected);
    let same = Contract::interface("com.acme.a.Same").with_visibility(Visibility::Package);

    assert!(validate(&surface(vec![first.clone(), same]), &[]).is_ok());
    assert_eq!(
        validate(&surface(vec![first, greeter(), second]), &[]).unwrap_err(),
        ProxyError::MixedPackages {
            first: "com.acme.a.First".to_owned(),
            second: "com.acme.b.Second".to_owned(),
        }
    );
}

#[test]
fn empty_surface() {
    assert_eq!(
        validate(&CapabilitySurface::default(), &[]).unwrap_err(),
        ProxyError::EmptySurface
    );
}

#[test]
fn duplicate_contract() {
    assert_eq!(
        validate(&surface(vec![greeter(), counter(), greeter()]), &[]).unwrap_err(),
        ProxyError::DuplicateContract("com.acme.Greeter".to_owned())
    );
}

#[test]
fn two_base_contracts() {
    let other = Contract::class("com.acme.Other");
    assert_eq!(
        validate(&surface(vec![service(), greeter(), other]), &[]).unwrap_err(),
        ProxyError::MultipleBaseContracts {
            first: "com.acme.Service".to_owned(),
            second: "com.acme.Other".to_owned(),
        }
    );
}

#[test]
fn base_must_be_extensible() {
    let sealed = service().with_final(true);
    let private = service().with_visibility(Visibility::Private);
    let expected = ProxyError::BaseNotExtensible("com.acme.Service".to_owned());

    assert_eq!(validate(&surface(vec![sealed]), &[]).unwrap_err(), expected);
    assert_eq!(validate(&surface(vec![private]), &[]).unwrap_err(), expected);
}

#[test]
fn abstract_base_rejected() {
    let base = service().with_abstract(true);
    assert_eq!(
        validate(&surface(vec![base]), &[]).unwrap_err(),
        ProxyError::AbstractBase("com.acme.Service".to_owned())
    );
}

#[test]
fn constructor_args_select_base_constructor() {
    let surface = surface(vec![service()]);

    assert!(validate(&surface, &[]).is_ok());
    assert!(validate(&surface, &[string(), JType::Long]).is_ok());

    let err = validate(&surface, &[JType::Long, string()]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "'com.acme.Service' has no constructor taking (long, java.lang.String)"
    );
}

#[test]
fn constructor_args_need_a_base() {
    assert_eq!(
        validate(&surface(vec![greeter()]), &[JType::Int]).unwrap_err(),
        ProxyError::UnexpectedConstructorArgs
    );
}

#[test]
fn contract_limit() {
    let contracts = (0..65536)
        .map(|i| Contract::interface(format!("com.acme.C{i}")))
        .collect();
    assert_eq!(
        validate(&surface(contracts), &[]).unwrap_err(),
        ProxyError::TooManyContracts(65536)
    );
}
