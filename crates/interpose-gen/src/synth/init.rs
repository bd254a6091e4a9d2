//! Class and instance initializers.

use interpose_classfile::access;
use interpose_core::{JType, MemberSig, Visibility};

use super::ClassShape;
use super::boxing::{self, CLASS};
use crate::emit::{ClassWriter, CodeBuilder, InvokeKind, MethodRef};
use crate::error::Result;

const FOR_NAME: &str = "(Ljava/lang/String;)Ljava/lang/Class;";
const GET_METHOD: &str = "(Ljava/lang/String;[Ljava/lang/Class;)Ljava/lang/reflect/Method;";

/// `Class.forName(declaring)`.
pub(super) fn push_declaring_class(body: &mut CodeBuilder, declaring: &str) {
    body.ldc_string(declaring)
        .invoke(InvokeKind::Static, MethodRef::new(CLASS, "forName", FOR_NAME));
}

/// Handler body: rethrow the caught reflection failure as the linkage
/// error `error`, keeping its message.
fn rethrow_as(body: &mut CodeBuilder, error: &str) {
    body.astore(0)
        .new_object(error)
        .dup()
        .aload(0)
        .invoke(
            InvokeKind::Virtual,
            MethodRef::new("java/lang/Throwable", "getMessage", "()Ljava/lang/String;"),
        )
        .invoke(
            InvokeKind::Special,
            MethodRef::new(error, "<init>", "(Ljava/lang/String;)V"),
        )
        .athrow();
}

/// `<clinit>`: fill every descriptor slot with
/// `MemberDescriptor.of(Class.forName(declaring).getMethod(name, params), id)`.
pub(super) fn static_initializer(shape: &ClassShape<'_>, w: &mut ClassWriter) -> Result<()> {
    let mut body = CodeBuilder::new();
    if shape.plan.members.is_empty() {
        body.ret(None);
        return w.add_method(access::STATIC, "<clinit>", "()V", Some(&body), &[]);
    }

    let start = body.new_label();
    let end = body.new_label();
    let no_method = body.new_label();
    let no_class = body.new_label();
    let factory = MethodRef::new(
        shape.bindings.member_descriptor(),
        "of",
        shape.bindings.descriptor_factory_descriptor(),
    );

    body.mark(start);
    for member in &shape.plan.members {
        let MemberSig { name, params, .. } = &member.sig;
        push_declaring_class(&mut body, &member.declaring);
        body.ldc_string(name.as_str());
        boxing::push_class_array(&mut body, params);
        let lookup = if member.visibility == Visibility::Public {
            "getMethod"
        } else {
            "getDeclaredMethod"
        };
        body.invoke(InvokeKind::Virtual, MethodRef::new(CLASS, lookup, GET_METHOD))
            .iconst(member.dispatch_id)
            .invoke(InvokeKind::Static, factory.clone())
            .putstatic(shape.descriptor_field(member));
    }
    body.mark(end).ret(None);

    body.mark(no_method);
    rethrow_as(&mut body, "java/lang/NoSuchMethodError");
    body.mark(no_class);
    rethrow_as(&mut body, "java/lang/NoClassDefFoundError");

    body.handler(start, end, no_method, Some("java/lang/NoSuchMethodException"))
        .handler(start, end, no_class, Some("java/lang/ClassNotFoundException"));

    w.add_method(access::STATIC, "<clinit>", "()V", Some(&body), &[])
}

/// `<init>(Interceptor, baseArgs...)`: reject a null interceptor, forward
/// the base arguments to the superclass constructor, store the interceptor.
pub(super) fn constructor(shape: &ClassShape<'_>, w: &mut ClassWriter) -> Result<()> {
    let interceptor = JType::object(interpose_core::names::binary_name(
        &shape.bindings.interceptor(),
    ));
    let mut params = vec![interceptor];
    params.extend(shape.base_constructor.iter().cloned());
    let descriptor = MemberSig::new("<init>", params, JType::Void).descriptor();
    let super_descriptor =
        MemberSig::new("<init>", shape.base_constructor.to_vec(), JType::Void).descriptor();

    let mut body = CodeBuilder::new();
    body.aload(1)
        .ldc_string("interceptor")
        .invoke(
            InvokeKind::Static,
            MethodRef::new(
                "java/util/Objects",
                "requireNonNull",
                "(Ljava/lang/Object;Ljava/lang/String;)Ljava/lang/Object;",
            ),
        )
        .pop()
        .aload(0);
    boxing::load_params(&mut body, shape.base_constructor, 2);
    body.invoke(
        InvokeKind::Special,
        MethodRef::new(shape.super_name, "<init>", super_descriptor),
    )
    .aload(0)
    .aload(1)
    .putfield(shape.interceptor_field())
    .ret(None);

    w.add_method(access::PUBLIC, "<init>", &descriptor, Some(&body), &[])
}
