//! Forwarding methods: every planned member routes through the interceptor.

use interpose_classfile::access;

use super::boxing;
use super::{ClassShape, exception_names};
use crate::emit::{ClassWriter, CodeBuilder, InvokeKind, JumpKind, Kind, MethodRef};
use crate::error::Result;
use crate::plan::PlannedMember;

const UNDECLARED: &str = "java/lang/reflect/UndeclaredThrowableException";

/// `public final R name(P...)`:
/// `return (R) interceptor.intercept(this, m<i>, new Object[] { p... })`,
/// rethrowing declared and unchecked exceptions and wrapping the rest.
pub(super) fn forwarding_method(
    shape: &ClassShape<'_>,
    member: &PlannedMember,
    w: &mut ClassWriter,
) -> Result<()> {
    let sig = &member.sig;
    let exceptions = exception_names(member);
    let mut body = CodeBuilder::new();
    let start = body.new_label();
    let end = body.new_label();
    let rethrow = body.new_label();
    let wrap = body.new_label();

    body.mark(start)
        .aload(0)
        .getfield(shape.interceptor_field())
        .aload(0)
        .getstatic(shape.descriptor_field(member));
    boxing::pack_args(&mut body, &sig.params, 1);
    body.invoke(
        InvokeKind::Interface,
        MethodRef::new(
            shape.bindings.interceptor(),
            "intercept",
            shape.bindings.call_descriptor(),
        )
        .on_interface(),
    );
    body.mark(end);

    match Kind::of(&sig.ret) {
        None => {
            body.pop().ret(None);
        }
        Some(Kind::Ref) => {
            boxing::unbox_value(&mut body, &sig.ret);
            body.ret(Some(Kind::Ref));
        }
        Some(kind) => {
            let present = body.new_label();
            body.dup().jump(JumpKind::IfNonNull, present);
            body.throw_new("java/lang/NullPointerException", "missing value");
            body.mark(present);
            boxing::unbox_value(&mut body, &sig.ret);
            body.ret(Some(kind));
        }
    }

    body.mark(rethrow).athrow();

    let cause = 1 + sig.param_slots();
    body.mark(wrap)
        .astore(cause)
        .new_object(UNDECLARED)
        .dup()
        .aload(cause)
        .invoke(
            InvokeKind::Special,
            MethodRef::new(UNDECLARED, "<init>", "(Ljava/lang/Throwable;)V"),
        )
        .athrow();

    for exception in &exceptions {
        body.handler(start, end, rethrow, Some(exception));
    }
    body.handler(start, end, rethrow, Some("java/lang/RuntimeException"))
        .handler(start, end, rethrow, Some("java/lang/Error"))
        .handler(start, end, wrap, Some("java/lang/Throwable"));

    w.add_method(
        access::PUBLIC | access::FINAL,
        &sig.name,
        &sig.descriptor(),
        Some(&body),
        &exceptions,
    )
}
