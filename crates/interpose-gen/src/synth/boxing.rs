//! Value conversions between the typed method world and `Object[]`.

use interpose_core::JType;

use crate::emit::{CodeBuilder, FieldRef, InvokeKind, Kind, MethodRef};

pub const OBJECT: &str = "java/lang/Object";
pub const CLASS: &str = "java/lang/Class";

/// Push the `Class` object for `ty`: `Integer.TYPE` and friends for
/// primitives (`Void.TYPE` for void), a class literal otherwise.
pub fn push_class(body: &mut CodeBuilder, ty: &JType) {
    match ty.internal_name() {
        Some(name) => {
            body.ldc_class(name);
        }
        None => {
            let owner = ty.wrapper().unwrap_or("java/lang/Void");
            body.getstatic(FieldRef::new(owner, "TYPE", "Ljava/lang/Class;"));
        }
    }
}

/// Push a `Class[]` holding the parameter classes.
pub fn push_class_array(body: &mut CodeBuilder, params: &[JType]) {
    body.iconst(params.len() as i32).anewarray(CLASS);
    for (j, param) in params.iter().enumerate() {
        body.dup().iconst(j as i32);
        push_class(body, param);
        body.aastore();
    }
}

/// Box the value on top of the stack if it is a primitive.
pub fn box_value(body: &mut CodeBuilder, ty: &JType) {
    if let Some(wrapper) = ty.wrapper() {
        body.invoke(
            InvokeKind::Static,
            MethodRef::new(wrapper, "valueOf", format!("({})L{wrapper};", ty.descriptor())),
        );
    }
}

/// Box a result for an `Object` return: `null` for void.
pub fn box_result(body: &mut CodeBuilder, ty: &JType) {
    if ty.is_void() {
        body.aconst_null();
    } else {
        box_value(body, ty);
    }
}

/// Convert the `Object` on top of the stack to `ty`: cast, then unwrap
/// primitives through their `xxxValue()` accessor.
pub fn unbox_value(body: &mut CodeBuilder, ty: &JType) {
    match (ty.wrapper(), ty.unbox_method()) {
        (Some(wrapper), Some(accessor)) => {
            body.checkcast(wrapper).invoke(
                InvokeKind::Virtual,
                MethodRef::new(wrapper, accessor, format!("(){}", ty.descriptor())),
            );
        }
        _ => {
            if let Some(name) = ty.internal_name()
                && name != OBJECT
            {
                body.checkcast(name);
            }
        }
    }
}

/// Build an `Object[]` from the parameters stored from local `first` on.
/// Zero parameters still produce an empty array.
pub fn pack_args(body: &mut CodeBuilder, params: &[JType], first: u16) {
    body.iconst(params.len() as i32).anewarray(OBJECT);
    let mut slot = first;
    for (j, param) in params.iter().enumerate() {
        let Some(kind) = Kind::of(param) else {
            continue;
        };
        body.dup().iconst(j as i32).load(kind, slot);
        box_value(body, param);
        body.aastore();
        slot += kind.slots();
    }
}

/// Push every element of the `Object[]` in local `array`, converted to the
/// parameter types.
pub fn unpack_args(body: &mut CodeBuilder, params: &[JType], array: u16) {
    for (j, param) in params.iter().enumerate() {
        body.aload(array).iconst(j as i32).aaload();
        unbox_value(body, param);
    }
}

/// Load the parameters stored from local `first` on, in order.
pub fn load_params(body: &mut CodeBuilder, params: &[JType], first: u16) {
    let mut slot = first;
    for param in params {
        if let Some(kind) = Kind::of(param) {
            body.load(kind, slot);
            slot += kind.slots();
        }
    }
}
