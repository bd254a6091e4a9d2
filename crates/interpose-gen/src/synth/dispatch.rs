//! The central `dispatch` routine and the per-member call-target helpers.

use interpose_classfile::access;

use super::boxing::{self, CLASS, OBJECT};
use super::init::push_declaring_class;
use super::{ClassShape, METHOD_HANDLE};
use crate::emit::{ClassWriter, CodeBuilder, InvokeKind, JumpKind, Kind, MethodRef};
use crate::error::Result;
use crate::plan::{MemberOrigin, PlannedMember};

const LOOKUP: &str = "java/lang/invoke/MethodHandles$Lookup";
const METHOD_TYPE: &str = "java/lang/invoke/MethodType";
const TARGET_DESCRIPTOR: &str = "(Ljava/lang/Object;[Ljava/lang/Object;)Ljava/lang/Object;";

fn throws_throwable() -> Vec<String> {
    vec!["java/lang/Throwable".to_owned()]
}

/// `public final Object dispatch(Object receiver, MemberDescriptor member,
/// Object[] args) throws Throwable`
///
/// Switches on `member.dispatchId()`. Universal and base members become
/// super calls; interface members go through `invokeTarget<i>`.
pub(super) fn dispatch_method(shape: &ClassShape<'_>, w: &mut ClassWriter) -> Result<()> {
    let mut body = CodeBuilder::new();
    let unknown = body.new_label();

    let mut cases: Vec<(&PlannedMember, _)> = shape
        .plan
        .members
        .iter()
        .map(|m| (m, body.new_label()))
        .collect();
    cases.sort_by_key(|(m, _)| m.dispatch_id);

    body.aload(2).invoke(
        InvokeKind::Virtual,
        MethodRef::new(shape.bindings.member_descriptor(), "dispatchId", "()I"),
    );
    body.lookupswitch(
        unknown,
        cases.iter().map(|(m, l)| (m.dispatch_id, *l)).collect(),
    );

    for (member, label) in &cases {
        body.mark(*label);
        match (member.origin, member.target_method()) {
            (MemberOrigin::Interface, Some(helper)) => {
                body.aload(0).aload(1).aload(3).invoke(
                    InvokeKind::Special,
                    MethodRef::new(shape.this_name, helper, TARGET_DESCRIPTOR),
                );
            }
            _ => {
                body.aload(0);
                boxing::unpack_args(&mut body, &member.sig.params, 3);
                body.invoke(
                    InvokeKind::Special,
                    MethodRef::new(shape.super_name, member.sig.name.as_str(), member.sig.descriptor()),
                );
                boxing::box_result(&mut body, &member.sig.ret);
            }
        }
        body.ret(Some(Kind::Ref));
    }

    body.mark(unknown)
        .throw_new("java/lang/IllegalArgumentException", "unknown dispatch id");

    w.add_method(
        access::PUBLIC | access::FINAL,
        "dispatch",
        &shape.bindings.call_descriptor(),
        Some(&body),
        &throws_throwable(),
    )
}

/// `private final Object invokeTarget<i>(Object receiver, Object[] args)`
///
/// Binds `h<i>` on first use under the instance monitor (double-checked,
/// the field is volatile), then calls it with `invokeExact`.
pub(super) fn target_method(
    shape: &ClassShape<'_>,
    member: &PlannedMember,
    w: &mut ClassWriter,
) -> Result<()> {
    let (Some(name), Some(field)) = (member.target_method(), shape.target_field(member)) else {
        return Ok(());
    };
    let sig = &member.sig;

    // Locals: 0 this, 1 receiver, 2 args, 3 monitor, 4 pending throwable.
    let mut body = CodeBuilder::new();
    let ready = body.new_label();
    let locked = body.new_label();
    let unlock = body.new_label();
    let unlocked = body.new_label();
    let failed = body.new_label();
    let released = body.new_label();

    body.aload(0)
        .getfield(field.clone())
        .jump(JumpKind::IfNonNull, ready)
        .aload(0)
        .dup()
        .astore(3)
        .monitorenter();

    body.mark(locked)
        .aload(0)
        .getfield(field.clone())
        .jump(JumpKind::IfNonNull, unlock)
        .aload(0)
        .invoke(
            InvokeKind::Static,
            MethodRef::new(
                "java/lang/invoke/MethodHandles",
                "lookup",
                format!("()L{LOOKUP};"),
            ),
        );
    push_declaring_class(&mut body, &member.declaring);
    body.ldc_string(sig.name.as_str());
    boxing::push_class(&mut body, &sig.ret);
    boxing::push_class_array(&mut body, &sig.params);
    body.invoke(
        InvokeKind::Static,
        MethodRef::new(
            METHOD_TYPE,
            "methodType",
            format!("(L{CLASS};[L{CLASS};)L{METHOD_TYPE};"),
        ),
    )
    .invoke(
        InvokeKind::Virtual,
        MethodRef::new(
            LOOKUP,
            "findVirtual",
            format!("(L{CLASS};Ljava/lang/String;L{METHOD_TYPE};)L{METHOD_HANDLE};"),
        ),
    )
    .aload(1)
    .invoke(
        InvokeKind::Virtual,
        MethodRef::new(
            METHOD_HANDLE,
            "bindTo",
            format!("(L{OBJECT};)L{METHOD_HANDLE};"),
        ),
    )
    .putfield(field.clone());

    body.mark(unlock).aload(3).monitorexit();
    body.mark(unlocked).goto(ready);

    body.mark(failed).astore(4).aload(3).monitorexit();
    body.mark(released).aload(4).athrow();

    body.mark(ready).aload(0).getfield(field);
    boxing::unpack_args(&mut body, &sig.params, 2);
    body.invoke(
        InvokeKind::Virtual,
        MethodRef::new(METHOD_HANDLE, "invokeExact", sig.descriptor()),
    );
    boxing::box_result(&mut body, &sig.ret);
    body.ret(Some(Kind::Ref));

    body.handler(locked, unlocked, failed, None)
        .handler(failed, released, failed, None);

    w.add_method(
        access::PRIVATE | access::FINAL,
        &name,
        TARGET_DESCRIPTOR,
        Some(&body),
        &throws_throwable(),
    )
}
