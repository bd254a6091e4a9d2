use interpose_classfile::{ClassFile, Instruction, Operand, access};
use interpose_core::{Contract, JType, MethodDecl};

use crate::assemble::{ArtifactSpec, GeneratedArtifact, SOURCE_FILE, generate, generate_bytes};
use crate::context::{GenerationContext, RuntimeBindings};
use crate::error::GenerationError;
use crate::test_utils::{base_class, calculator, foo_contract, string, surface};

const NAME: &str = "com.acme.$Proxy0";

fn build(spec: &ArtifactSpec<'_>) -> (GeneratedArtifact, ClassFile) {
    let artifact = generate(spec, &GenerationContext::default()).unwrap();
    let class = ClassFile::parse(&artifact.bytes).unwrap();
    (artifact, class)
}

fn code_of(class: &ClassFile, name: &str, descriptor: &str) -> Vec<Instruction> {
    let method = class
        .method(name, descriptor)
        .unwrap_or_else(|| panic!("missing method {name}{descriptor}"));
    class.code(method).unwrap().unwrap().instructions().unwrap()
}

fn mnemonics(insns: &[Instruction]) -> Vec<&'static str> {
    insns.iter().map(Instruction::mnemonic).collect()
}

/// Rendered constant operands (`owner.name:desc`, class names, strings).
fn references(class: &ClassFile, insns: &[Instruction]) -> Vec<String> {
    insns
        .iter()
        .filter_map(Instruction::cp_index)
        .map(|i| class.pool.describe(i))
        .collect()
}

#[test]
fn interface_surface_implements_exactly_requested_interfaces() {
    let s = surface(vec![foo_contract(), calculator()]);
    let (artifact, class) = build(&ArtifactSpec::new(NAME, &s));

    assert_eq!(class.this_name().unwrap(), "com/acme/$Proxy0");
    assert_eq!(class.super_name().unwrap(), Some("java/lang/Object"));
    assert_eq!(
        class.interface_names().unwrap(),
        vec![
            "com/acme/FooContract",
            "com/acme/ContractA",
            "dev/interpose/runtime/Dispatcher",
        ]
    );
    assert_eq!(
        artifact.interfaces,
        vec![
            "com.acme.FooContract",
            "com.acme.ContractA",
            "dev.interpose.runtime.Dispatcher",
        ]
    );
    assert_eq!(class.access, access::PUBLIC | access::FINAL | access::SUPER);
    assert_eq!(artifact.base, None);
}

#[test]
fn class_layout() {
    let s = surface(vec![calculator()]);
    let (_, class) = build(&ArtifactSpec::new(NAME, &s));

    let mut out = String::new();
    for (section, members) in [("fields", &class.fields), ("methods", &class.methods)] {
        out.push_str(&format!("[{section}]\n"));
        for member in members {
            out.push_str(&format!(
                "{:#06x} {} {}\n",
                member.access,
                class.member_name(member).unwrap(),
                class.member_descriptor(member).unwrap()
            ));
        }
    }

    insta::assert_snapshot!(out, @r"
    [fields]
    0x001a m0 Ldev/interpose/runtime/MemberDescriptor;
    0x001a m1 Ldev/interpose/runtime/MemberDescriptor;
    0x001a m2 Ldev/interpose/runtime/MemberDescriptor;
    0x001a m3 Ldev/interpose/runtime/MemberDescriptor;
    0x0012 interceptor Ldev/interpose/runtime/Interceptor;
    0x0042 h3 Ljava/lang/invoke/MethodHandle;
    [methods]
    0x0008 <clinit> ()V
    0x0001 <init> (Ldev/interpose/runtime/Interceptor;)V
    0x0011 equals (Ljava/lang/Object;)Z
    0x0011 hashCode ()I
    0x0011 toString ()Ljava/lang/String;
    0x0011 add (ID)I
    0x0011 dispatch (Ljava/lang/Object;Ldev/interpose/runtime/MemberDescriptor;[Ljava/lang/Object;)Ljava/lang/Object;
    0x0012 invokeTarget3 (Ljava/lang/Object;[Ljava/lang/Object;)Ljava/lang/Object;
    ");
}

#[test]
fn base_constructor_arguments_are_forwarded() {
    let s = surface(vec![base_class(), foo_contract()]);
    let spec = ArtifactSpec::new(NAME, &s).base_constructor(vec![string(), JType::Long]);
    let (artifact, class) = build(&spec);

    assert_eq!(artifact.base.as_deref(), Some("com.acme.Base"));
    assert_eq!(class.super_name().unwrap(), Some("com/acme/Base"));

    let insns = code_of(
        &class,
        "<init>",
        "(Ldev/interpose/runtime/Interceptor;Ljava/lang/String;J)V",
    );
    assert_eq!(
        mnemonics(&insns),
        vec![
            "aload_1",
            "ldc",
            "invokestatic",
            "pop",
            "aload_0",
            "aload_2",
            "lload_3",
            "invokespecial",
            "aload_0",
            "aload_1",
            "putfield",
            "return",
        ]
    );
    let refs = references(&class, &insns);
    assert!(refs.contains(&"java/util/Objects.requireNonNull:(Ljava/lang/Object;Ljava/lang/String;)Ljava/lang/Object;".to_owned()));
    assert!(refs.contains(&"com/acme/Base.<init>:(Ljava/lang/String;J)V".to_owned()));
    assert_eq!(
        refs.last().map(String::as_str),
        Some("com/acme/$Proxy0.interceptor:Ldev/interpose/runtime/Interceptor;")
    );
}

#[test]
fn base_constructor_must_exist() {
    let s = surface(vec![base_class()]);
    let spec = ArtifactSpec::new(NAME, &s).base_constructor(vec![JType::Int]);

    let err = generate(&spec, &GenerationContext::default()).unwrap_err();

    assert_eq!(
        err,
        GenerationError::InvalidSurface("'com.acme.Base' has no constructor taking (int)".into())
    );
}

#[test]
fn constructor_arguments_need_a_base() {
    let s = surface(vec![foo_contract()]);
    let spec = ArtifactSpec::new(NAME, &s).base_constructor(vec![JType::Int]);

    let err = generate(&spec, &GenerationContext::default()).unwrap_err();

    assert!(matches!(err, GenerationError::InvalidSurface(_)));
}

#[test]
fn shared_member_is_generated_once_for_first_contract() {
    let f = || MethodDecl::new("f", vec![], JType::Int);
    let s = surface(vec![
        Contract::interface("com.acme.A").method(f()),
        Contract::interface("com.acme.B").method(f()),
    ]);
    let (artifact, class) = build(&ArtifactSpec::new(NAME, &s));

    let owners: Vec<_> = artifact
        .members
        .iter()
        .filter(|m| m.key() == "f()I")
        .map(|m| m.declaring.as_str())
        .collect();
    assert_eq!(owners, vec!["com.acme.A"]);
    assert_eq!(class.methods_named("f").count(), 1);
}

#[test]
fn void_member_forwards_empty_array_and_discards_result() {
    let s = surface(vec![foo_contract()]);
    let (_, class) = build(&ArtifactSpec::new(NAME, &s));

    let insns = code_of(&class, "foo", "()V");
    assert_eq!(
        mnemonics(&insns),
        vec![
            "aload_0",
            "getfield",
            "aload_0",
            "getstatic",
            "iconst_0",
            "anewarray",
            "invokeinterface",
            "pop",
            "return",
            "athrow",
            "astore_1",
            "new",
            "dup",
            "aload_1",
            "invokespecial",
            "athrow",
        ]
    );
    let refs = references(&class, &insns);
    assert_eq!(refs[1], "com/acme/$Proxy0.m3:Ldev/interpose/runtime/MemberDescriptor;");
    assert_eq!(
        refs[3],
        "dev/interpose/runtime/Interceptor.intercept:(Ljava/lang/Object;Ldev/interpose/runtime/MemberDescriptor;[Ljava/lang/Object;)Ljava/lang/Object;"
    );
    assert!(matches!(insns[6].operand, Operand::InvokeInterface { count: 4, .. }));
}

#[test]
fn primitive_member_boxes_arguments_and_unboxes_result() {
    let s = surface(vec![calculator()]);
    let (_, class) = build(&ArtifactSpec::new(NAME, &s));

    let insns = code_of(&class, "add", "(ID)I");
    let names = mnemonics(&insns);
    let result = names.iter().position(|n| *n == "invokeinterface").unwrap();
    assert_eq!(
        &names[4..result],
        &[
            "iconst_2",
            "anewarray",
            "dup",
            "iconst_0",
            "iload_1",
            "invokestatic",
            "aastore",
            "dup",
            "iconst_1",
            "dload_2",
            "invokestatic",
            "aastore",
        ]
    );
    assert_eq!(
        &names[result + 1..result + 11],
        &[
            "dup",
            "ifnonnull",
            "new",
            "dup",
            "ldc",
            "invokespecial",
            "athrow",
            "checkcast",
            "invokevirtual",
            "ireturn",
        ]
    );

    let refs = references(&class, &insns);
    for expected in [
        "java/lang/Integer.valueOf:(I)Ljava/lang/Integer;",
        "java/lang/Double.valueOf:(D)Ljava/lang/Double;",
        "\"missing value\"",
        "java/lang/Integer.intValue:()I",
        "java/lang/reflect/UndeclaredThrowableException.<init>:(Ljava/lang/Throwable;)V",
    ] {
        assert!(refs.iter().any(|r| r == expected), "missing {expected}");
    }

    // Wrapping handler stores the cause after the three parameter slots.
    assert!(insns.iter().any(|i| i.mnemonic() == "astore" && i.operand == Operand::Local(4)));
}

#[test]
fn forwarding_handlers_rethrow_declared_and_unchecked() {
    let s = surface(vec![base_class()]);
    let (_, class) = build(&ArtifactSpec::new(NAME, &s));

    let method = class
        .method("greet", "(Ljava/lang/String;)Ljava/lang/String;")
        .unwrap();
    assert_eq!(
        class.declared_exceptions(method).unwrap(),
        vec!["java/io/IOException"]
    );
    let code = class.code(method).unwrap().unwrap();
    let caught: Vec<_> = code
        .exception_table
        .iter()
        .map(|e| class.pool.class_name(e.catch_type).unwrap())
        .collect();
    assert_eq!(
        caught,
        vec![
            "java/io/IOException",
            "java/lang/RuntimeException",
            "java/lang/Error",
            "java/lang/Throwable",
        ]
    );
    assert_eq!(method.access, access::PUBLIC | access::FINAL);
    assert!(!code.stack_map(&class.pool).unwrap().is_empty());
}

#[test]
fn final_base_members_are_not_overridden() {
    let s = surface(vec![base_class()]);
    let (_, class) = build(&ArtifactSpec::new(NAME, &s));

    assert!(class.method("close", "()V").is_none());
    assert!(class.method("greet", "(Ljava/lang/String;)Ljava/lang/String;").is_some());
}

#[test]
fn dispatch_switches_over_sorted_ids() {
    let s = surface(vec![base_class(), foo_contract(), calculator()]);
    let (artifact, class) = build(&ArtifactSpec::new(NAME, &s));

    let insns = code_of(
        &class,
        "dispatch",
        "(Ljava/lang/Object;Ldev/interpose/runtime/MemberDescriptor;[Ljava/lang/Object;)Ljava/lang/Object;",
    );
    let Operand::LookupSwitch { pairs, .. } = &insns[2].operand else {
        panic!("expected lookupswitch, got {:?}", insns[2]);
    };
    let keys: Vec<i32> = pairs.iter().map(|(k, _)| *k).collect();
    let mut expected: Vec<i32> = artifact.members.iter().map(|m| m.dispatch_id).collect();
    expected.sort();
    assert_eq!(keys, expected);

    let refs = references(&class, &insns);
    assert!(!refs.contains(&"java/lang/Object.hashCode:()I".to_owned()));
    assert!(refs.contains(&"com/acme/Base.hashCode:()I".to_owned()));
    assert!(refs.contains(&"com/acme/Base.greet:(Ljava/lang/String;)Ljava/lang/String;".to_owned()));
    assert!(refs.contains(&"com/acme/$Proxy0.invokeTarget4:(Ljava/lang/Object;[Ljava/lang/Object;)Ljava/lang/Object;".to_owned()));
    assert!(refs.contains(&"java/lang/IllegalArgumentException".to_owned()));
    assert!(refs.contains(&"\"unknown dispatch id\"".to_owned()));

    let method = class
        .method(
            "dispatch",
            "(Ljava/lang/Object;Ldev/interpose/runtime/MemberDescriptor;[Ljava/lang/Object;)Ljava/lang/Object;",
        )
        .unwrap();
    assert_eq!(
        class.declared_exceptions(method).unwrap(),
        vec!["java/lang/Throwable"]
    );
}

#[test]
fn interface_members_bind_call_targets_lazily() {
    let s = surface(vec![calculator()]);
    let (artifact, class) = build(&ArtifactSpec::new(NAME, &s));

    let add = artifact.members.iter().find(|m| m.key() == "add(ID)I").unwrap();
    assert_eq!(add.slot, 3);

    let field = class.field("h3").unwrap();
    assert_eq!(field.access, access::PRIVATE | access::VOLATILE);
    assert_eq!(
        class.member_descriptor(field).unwrap(),
        "Ljava/lang/invoke/MethodHandle;"
    );
    assert!(class.field("h0").is_none());

    let helper = class
        .method(
            "invokeTarget3",
            "(Ljava/lang/Object;[Ljava/lang/Object;)Ljava/lang/Object;",
        )
        .unwrap();
    assert_eq!(helper.access, access::PRIVATE | access::FINAL);
    let code = class.code(helper).unwrap().unwrap();
    let insns = code.instructions().unwrap();
    let names = mnemonics(&insns);
    assert!(names.contains(&"monitorenter"));
    assert_eq!(names.iter().filter(|n| **n == "monitorexit").count(), 2);
    let refs = references(&class, &insns);
    for expected in [
        "java/lang/invoke/MethodHandles.lookup:()Ljava/lang/invoke/MethodHandles$Lookup;",
        "java/lang/invoke/MethodHandles$Lookup.findVirtual:(Ljava/lang/Class;Ljava/lang/String;Ljava/lang/invoke/MethodType;)Ljava/lang/invoke/MethodHandle;",
        "java/lang/invoke/MethodHandle.bindTo:(Ljava/lang/Object;)Ljava/lang/invoke/MethodHandle;",
        "java/lang/invoke/MethodHandle.invokeExact:(ID)I",
        "java/lang/Integer.TYPE:Ljava/lang/Class;",
        "java/lang/Double.TYPE:Ljava/lang/Class;",
    ] {
        assert!(refs.iter().any(|r| r == expected), "missing {expected}");
    }
    assert_eq!(code.exception_table.len(), 2);
    assert!(code.exception_table.iter().all(|e| e.catch_type == 0));
    assert_eq!(code.max_locals, 5);
}

#[test]
fn static_initializer_resolves_every_descriptor() {
    let s = surface(vec![foo_contract(), calculator()]);
    let (artifact, class) = build(&ArtifactSpec::new(NAME, &s));

    let method = class.method("<clinit>", "()V").unwrap();
    assert_eq!(method.access, access::STATIC);
    let code = class.code(method).unwrap().unwrap();
    let refs = references(&class, &code.instructions().unwrap());

    let factory = "dev/interpose/runtime/MemberDescriptor.of:(Ljava/lang/reflect/Method;I)Ldev/interpose/runtime/MemberDescriptor;";
    assert_eq!(
        refs.iter().filter(|r| *r == factory).count(),
        artifact.members.len()
    );
    assert!(refs.contains(&"\"java.lang.Object\"".to_owned()));
    assert!(refs.contains(&"\"com.acme.ContractA\"".to_owned()));
    for (slot, _) in artifact.members.iter().enumerate() {
        let field = class.field(&format!("m{slot}")).unwrap();
        assert_eq!(field.access, access::PRIVATE | access::STATIC | access::FINAL);
    }

    let caught: Vec<_> = code
        .exception_table
        .iter()
        .map(|e| class.pool.class_name(e.catch_type).unwrap())
        .collect();
    assert_eq!(
        caught,
        vec!["java/lang/NoSuchMethodException", "java/lang/ClassNotFoundException"]
    );
}

#[test]
fn artifact_is_marked_and_recognized() {
    let s = surface(vec![foo_contract()]);
    let (_, class) = build(&ArtifactSpec::new(NAME, &s));
    let bindings = RuntimeBindings::default();

    assert_eq!(class.source_file().unwrap(), Some(SOURCE_FILE));
    assert_eq!(
        class.annotation_types().unwrap(),
        vec!["Ldev/interpose/runtime/Generated;"]
    );
    assert!(class
        .interface_names()
        .unwrap()
        .contains(&bindings.dispatcher().as_str()));
    assert_eq!((class.major_version, class.minor_version), (52, 0));
}

#[test]
fn custom_runtime_package_is_linked() {
    let s = surface(vec![foo_contract()]);
    let ctx = GenerationContext::new().with_bindings(RuntimeBindings::new("org.example.rt"));
    let artifact = generate(&ArtifactSpec::new(NAME, &s), &ctx).unwrap();
    let class = ClassFile::parse(&artifact.bytes).unwrap();

    assert!(class.interface_names().unwrap().contains(&"org/example/rt/Dispatcher"));
    assert!(class.field("interceptor").is_some_and(|f| {
        class.member_descriptor(f).unwrap() == "Lorg/example/rt/Interceptor;"
    }));
}

#[test]
fn package_private_access_is_kept() {
    let s = surface(vec![foo_contract()]);
    let bytes = generate_bytes(NAME, access::FINAL, &s).unwrap();
    let class = ClassFile::parse(&bytes).unwrap();

    assert_eq!(class.access, access::FINAL | access::SUPER);
}

#[test]
fn two_bases_fail_before_emission() {
    let s = surface(vec![base_class(), Contract::class("com.acme.Other")]);

    let err = generate(&ArtifactSpec::new(NAME, &s), &GenerationContext::default()).unwrap_err();

    assert!(matches!(err, GenerationError::InvalidSurface(_)));
}

#[test]
fn invalid_class_name_is_rejected() {
    let s = surface(vec![foo_contract()]);

    let err = generate(&ArtifactSpec::new("com..Bad", &s), &GenerationContext::default()).unwrap_err();

    assert_eq!(
        err,
        GenerationError::InvalidSurface("invalid class name 'com..Bad'".into())
    );
}

#[test]
fn collision_aborts_generation() {
    let s = surface(vec![foo_contract()]);
    let ctx = GenerationContext::new().with_hasher(|_| 7);

    let err = generate(&ArtifactSpec::new(NAME, &s), &ctx).unwrap_err();

    assert!(matches!(err, GenerationError::DispatchIdCollision { id: 7, .. }));
}

#[test]
fn every_method_has_code_and_frames_where_needed() {
    let s = surface(vec![base_class(), foo_contract(), calculator()]);
    let spec = ArtifactSpec::new(NAME, &s).base_constructor(vec![string(), JType::Long]);
    let (_, class) = build(&spec);

    for method in &class.methods {
        let name = class.member_name(method).unwrap();
        let code = class.code(method).unwrap().unwrap();
        let insns = code.instructions().unwrap();
        let branches = insns.iter().any(|i| !i.targets().is_empty());
        let frames = code.stack_map(&class.pool).unwrap();
        if branches || !code.exception_table.is_empty() {
            assert!(!frames.is_empty(), "{name} has no frames");
        }
    }
}
