//! Dispatcher synthesis: fields and method bodies of a generated class.
//!
//! Every planned member gets a descriptor slot (`m<i>`) and a forwarding
//! method. Interface members also get a call-target slot (`h<i>`) and an
//! `invokeTarget<i>` helper used by `dispatch`.

mod boxing;
mod dispatch;
mod forward;
mod init;

use interpose_classfile::access;
use interpose_core::JType;

use crate::context::RuntimeBindings;
use crate::emit::{ClassWriter, FieldRef};
use crate::error::Result;
use crate::plan::{DispatchPlan, PlannedMember};

pub use boxing::{box_result, box_value, pack_args, push_class, push_class_array, unbox_value, unpack_args};

pub const INTERCEPTOR_FIELD: &str = "interceptor";
pub const METHOD_HANDLE: &str = "java/lang/invoke/MethodHandle";

/// Everything synthesis needs to know about the class being generated.
#[derive(Clone, Copy, Debug)]
pub struct ClassShape<'a> {
    /// Internal name of the generated class.
    pub this_name: &'a str,
    /// Internal name of the direct superclass.
    pub super_name: &'a str,
    pub plan: &'a DispatchPlan<'a>,
    pub bindings: &'a RuntimeBindings,
    /// Parameters of the superclass constructor to forward to.
    pub base_constructor: &'a [JType],
}

impl ClassShape<'_> {
    pub(crate) fn descriptor_field(&self, member: &PlannedMember) -> FieldRef {
        FieldRef::new(
            self.this_name,
            member.descriptor_field(),
            format!("L{};", self.bindings.member_descriptor()),
        )
    }

    pub(crate) fn interceptor_field(&self) -> FieldRef {
        FieldRef::new(
            self.this_name,
            INTERCEPTOR_FIELD,
            format!("L{};", self.bindings.interceptor()),
        )
    }

    /// Call-target slot; `None` for members dispatched as super calls.
    pub(crate) fn target_field(&self, member: &PlannedMember) -> Option<FieldRef> {
        let name = member.target_field()?;
        Some(FieldRef::new(self.this_name, name, format!("L{METHOD_HANDLE};")))
    }
}

/// Binary names to internal names, for `Exceptions` attributes and handlers.
pub(crate) fn exception_names(member: &PlannedMember) -> Vec<String> {
    member
        .exceptions
        .iter()
        .map(|e| interpose_core::names::internal_name(e))
        .collect()
}

/// Add fields and methods for `shape` to `w`.
pub fn synthesize(shape: &ClassShape<'_>, w: &mut ClassWriter) -> Result<()> {
    let members = &shape.plan.members;

    for member in members {
        let field = shape.descriptor_field(member);
        w.add_field(
            access::PRIVATE | access::STATIC | access::FINAL,
            &field.name,
            &field.descriptor,
        )?;
    }
    let interceptor = shape.interceptor_field();
    w.add_field(access::PRIVATE | access::FINAL, &interceptor.name, &interceptor.descriptor)?;
    for field in members.iter().filter_map(|m| shape.target_field(m)) {
        w.add_field(access::PRIVATE | access::VOLATILE, &field.name, &field.descriptor)?;
    }

    init::static_initializer(shape, w)?;
    init::constructor(shape, w)?;
    for member in members {
        tracing::trace!(member = %member.key(), slot = member.slot, "synthesizing forwarder");
        forward::forwarding_method(shape, member, w)?;
    }
    dispatch::dispatch_method(shape, w)?;
    for member in shape.plan.interface_members() {
        dispatch::target_method(shape, member, w)?;
    }
    Ok(())
}
