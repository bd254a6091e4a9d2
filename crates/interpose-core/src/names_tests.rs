use crate::names::*;

#[test]
fn package_and_simple_name() {
    assert_eq!(package_of("com.acme.Foo"), "com.acme");
    assert_eq!(simple_name("com.acme.Foo"), "Foo");
    assert_eq!(package_of("Foo"), "");
    assert_eq!(simple_name("Foo"), "Foo");
    assert_eq!(simple_name("com.acme.Outer$Inner"), "Outer$Inner");
}

#[test]
fn internal_binary_conversion() {
    assert_eq!(internal_name("com.acme.Outer$Inner"), "com/acme/Outer$Inner");
    assert_eq!(binary_name("java/util/List"), "java.util.List");
}

#[test]
fn qualify_unnamed_package() {
    assert_eq!(qualify("", "$Proxy0"), "$Proxy0");
    assert_eq!(qualify("dev.interpose.proxy", "$Proxy0"), "dev.interpose.proxy.$Proxy0");
}

#[test]
fn binary_name_validation() {
    assert!(is_valid_binary_name("java.lang.String"));
    assert!(is_valid_binary_name("$Proxy12"));
    assert!(is_valid_binary_name("a.b_c.D$E"));
    assert!(!is_valid_binary_name(""));
    assert!(!is_valid_binary_name("java..lang"));
    assert!(!is_valid_binary_name("java.lang."));
    assert!(!is_valid_binary_name("1abc"));
    assert!(!is_valid_binary_name("java/lang/String"));
}
