//! Shared fixtures for generator tests.

use interpose_core::{CapabilitySurface, Contract, JType, MethodDecl};

pub fn string() -> JType {
    JType::object("java.lang.String")
}

/// `interface FooContract { void foo(); }`
pub fn foo_contract() -> Contract {
    Contract::interface("com.acme.FooContract").method(MethodDecl::new("foo", vec![], JType::Void))
}

/// `interface ContractA { int add(int, double); }`
pub fn calculator() -> Contract {
    Contract::interface("com.acme.ContractA").method(MethodDecl::new(
        "add",
        vec![JType::Int, JType::Double],
        JType::Int,
    ))
}

/// `class Base { Base(String, long); String greet(String) throws IOException; final void close(); }`
pub fn base_class() -> Contract {
    Contract::class("com.acme.Base")
        .constructors(vec![vec![], vec![string(), JType::Long]])
        .method(
            MethodDecl::new("greet", vec![string()], string()).throws("java.io.IOException"),
        )
        .method(MethodDecl::new("close", vec![], JType::Void).with_final(true))
}

pub fn surface(contracts: Vec<Contract>) -> CapabilitySurface {
    CapabilitySurface::new(contracts)
}
