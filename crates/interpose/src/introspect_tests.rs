use interpose_classfile::{ClassFile, access};
use interpose_gen::emit::ClassWriter;
use interpose_gen::{RuntimeBindings, generate_bytes};

use crate::error::ProxyError;
use crate::introspect::{get_interceptor, is_generated_artifact, is_generated_instance};
use crate::test_utils::{FakeClass, FakeInstance, greeter, surface};

fn generated_class(bindings: &RuntimeBindings) -> FakeClass {
    FakeClass {
        name: "dev/interpose/proxy/$Proxy0".to_owned(),
        interfaces: vec!["com/acme/Greeter".to_owned(), bindings.dispatcher()],
        annotations: vec![bindings.marker_descriptor()],
    }
}

fn plain_class() -> FakeClass {
    FakeClass {
        name: "com/acme/Plain".to_owned(),
        interfaces: vec!["com/acme/Greeter".to_owned()],
        annotations: Vec::new(),
    }
}

#[test]
fn class_needs_marker_and_dispatcher() {
    let bindings = RuntimeBindings::default();
    assert!(is_generated_artifact(&generated_class(&bindings), &bindings));
    assert!(!is_generated_artifact(&plain_class(), &bindings));

    let unmarked = FakeClass {
        annotations: Vec::new(),
        ..generated_class(&bindings)
    };
    assert!(!is_generated_artifact(&unmarked, &bindings));

    let impostor = FakeClass {
        interfaces: vec!["com/acme/Greeter".to_owned()],
        ..generated_class(&bindings)
    };
    assert!(!is_generated_artifact(&impostor, &bindings));
}

#[test]
fn bindings_decide_the_marker() {
    let bindings = RuntimeBindings::default();
    let other = RuntimeBindings::new("org.example.rt");
    assert!(!is_generated_artifact(&generated_class(&bindings), &other));
}

#[test]
fn interceptor_of_generated_instance() {
    let bindings = RuntimeBindings::default();
    let instance = FakeInstance {
        class: generated_class(&bindings),
        fields: vec![("interceptor".to_owned(), "audit".to_owned())],
    };

    assert!(is_generated_instance(&instance, &bindings));
    assert_eq!(get_interceptor(&instance, &bindings).unwrap(), "audit");
}

#[test]
fn interceptor_of_plain_instance() {
    let bindings = RuntimeBindings::default();
    let instance = FakeInstance {
        class: plain_class(),
        fields: vec![("interceptor".to_owned(), "look-alike".to_owned())],
    };

    assert!(!is_generated_instance(&instance, &bindings));
    assert_eq!(
        get_interceptor(&instance, &bindings).unwrap_err(),
        ProxyError::NotAnArtifact("com.acme.Plain".to_owned())
    );
}

#[test]
fn parsed_class_files() {
    let bindings = RuntimeBindings::default();
    let bytes = generate_bytes(
        "com.acme.$Proxy9",
        access::PUBLIC | access::FINAL,
        &surface(vec![greeter()]),
    )
    .unwrap();
    assert!(is_generated_artifact(&ClassFile::parse(&bytes).unwrap(), &bindings));

    let writer = ClassWriter::new(
        access::PUBLIC | access::SUPER,
        "com/acme/Plain",
        "java/lang/Object",
        &[],
    )
    .unwrap();
    let plain = ClassFile::parse(&writer.to_bytes().unwrap()).unwrap();
    assert!(!is_generated_artifact(&plain, &bindings));
}
