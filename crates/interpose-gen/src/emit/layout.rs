//! Bytecode layout: encoding selection, label resolution, byte emission.
//!
//! Every instruction's size depends only on its operands and (for switches)
//! its own offset, so a single forward pass fixes all offsets.

use interpose_classfile::{ByteWriter, opcodes};
use interpose_core::JType;

use super::code::{CodeBuilder, Insn, InvokeKind, JumpKind, Kind, Label};
use super::constant_pool::ConstantPoolBuilder;
use crate::error::{GenerationError, Result};

const MAX_CODE_LENGTH: usize = 65535;

/// Encoded method body.
#[derive(Debug)]
pub struct Layout {
    pub code: Vec<u8>,
    /// Offset of every instruction, followed by the code length.
    pub offsets: Vec<u32>,
    /// Resolved constant pool operand per instruction (0 when unused).
    pub cp: Vec<u16>,
}

impl Layout {
    pub fn offset_of(&self, body: &CodeBuilder, label: Label) -> u32 {
        body.position(label).map_or(0, |i| self.offsets[i])
    }
}

pub(crate) fn invalid(method: &str, reason: impl Into<String>) -> GenerationError {
    GenerationError::InvalidCode {
        method: method.to_owned(),
        reason: reason.into(),
    }
}

/// Every label an instruction or handler refers to must be bound.
/// Jump targets must name a real instruction; a handler end may also be
/// the end of the code.
fn check_labels(body: &CodeBuilder, method: &str) -> Result<()> {
    let len = body.insns.len();
    let bound = |label: Label| body.position(label);
    for (i, insn) in body.insns.iter().enumerate() {
        for target in insn.targets() {
            match bound(target) {
                Some(p) if p < len => {}
                Some(_) => return Err(invalid(method, format!("jump at {i} targets the end of code"))),
                None => return Err(invalid(method, format!("jump at {i} targets an unbound label"))),
            }
        }
    }
    for h in &body.handlers {
        let (Some(start), Some(end), Some(handler)) = (bound(h.start), bound(h.end), bound(h.handler))
        else {
            return Err(invalid(method, "exception handler uses an unbound label"));
        };
        if start >= end || handler >= len {
            return Err(invalid(method, "empty or dangling exception handler range"));
        }
    }
    Ok(())
}

fn resolve_cp(insn: &Insn, pool: &mut ConstantPoolBuilder) -> Result<u16> {
    Ok(match insn {
        Insn::Iconst(v) if i16::try_from(*v).is_err() => pool.integer(*v)?,
        Insn::LdcString(s) => pool.string(s)?,
        Insn::LdcClass(c) | Insn::New(c) | Insn::ANewArray(c) | Insn::CheckCast(c) => pool.class(c)?,
        Insn::GetStatic(f) | Insn::PutStatic(f) | Insn::GetField(f) | Insn::PutField(f) => {
            pool.field_ref(&f.owner, &f.name, &f.descriptor)?
        }
        Insn::Invoke(_, m) => pool.method_ref(&m.owner, &m.name, &m.descriptor, m.interface)?,
        _ => 0,
    })
}

fn local_size(index: u16) -> u32 {
    match index {
        0..=3 => 1,
        4..=255 => 2,
        _ => 4,
    }
}

fn switch_padding(offset: u32) -> u32 {
    (4 - (offset + 1) % 4) % 4
}

fn size_of(insn: &Insn, cp: u16, offset: u32) -> u32 {
    match insn {
        Insn::Iconst(v) => match *v {
            -1..=5 => 1,
            -128..=127 => 2,
            -32768..=32767 => 3,
            _ if cp <= 255 => 2,
            _ => 3,
        },
        Insn::LdcString(_) | Insn::LdcClass(_) => {
            if cp <= 255 {
                2
            } else {
                3
            }
        }
        Insn::Load(_, i) | Insn::Store(_, i) => local_size(*i),
        Insn::AconstNull
        | Insn::AaLoad
        | Insn::AaStore
        | Insn::Pop
        | Insn::Dup
        | Insn::Return(_)
        | Insn::AThrow
        | Insn::MonitorEnter
        | Insn::MonitorExit => 1,
        Insn::Invoke(InvokeKind::Interface, _) => 5,
        Insn::GetStatic(_)
        | Insn::PutStatic(_)
        | Insn::GetField(_)
        | Insn::PutField(_)
        | Insn::Invoke(..)
        | Insn::New(_)
        | Insn::ANewArray(_)
        | Insn::CheckCast(_)
        | Insn::Jump(..) => 3,
        Insn::LookupSwitch { cases, .. } => 1 + switch_padding(offset) + 8 + 8 * cases.len() as u32,
    }
}

fn kind_index(kind: Kind) -> u8 {
    match kind {
        Kind::Int => 0,
        Kind::Long => 1,
        Kind::Float => 2,
        Kind::Double => 3,
        Kind::Ref => 4,
    }
}

fn write_local(w: &mut ByteWriter, long_form: u8, short_base: u8, kind: Kind, index: u16) {
    let k = kind_index(kind);
    match index {
        0..=3 => {
            w.u8(short_base + 4 * k + index as u8);
        }
        4..=255 => {
            w.u8(long_form + k).u8(index as u8);
        }
        _ => {
            w.u8(opcodes::WIDE).u8(long_form + k).u16(index);
        }
    }
}

fn interface_arg_count(descriptor: &str, method: &str) -> Result<u8> {
    let (params, _) = JType::parse_method_descriptor(descriptor)
        .map_err(|e| invalid(method, e.to_string()))?;
    let slots: u16 = 1 + params.iter().map(JType::slots).sum::<u16>();
    u8::try_from(slots).map_err(|_| invalid(method, "too many interface call arguments"))
}

/// Lay out and encode a method body. Constants the body refers to are
/// interned into `pool`.
pub fn layout(body: &CodeBuilder, pool: &mut ConstantPoolBuilder, method: &str) -> Result<Layout> {
    check_labels(body, method)?;

    let cp = body
        .insns
        .iter()
        .map(|insn| resolve_cp(insn, pool))
        .collect::<Result<Vec<_>>>()?;

    let mut offsets = Vec::with_capacity(body.insns.len() + 1);
    let mut offset: u64 = 0;
    for (insn, &index) in body.insns.iter().zip(&cp) {
        offsets.push(offset as u32);
        offset += size_of(insn, index, offset as u32) as u64;
        if offset > MAX_CODE_LENGTH as u64 {
            return Err(GenerationError::CodeTooLarge {
                method: method.to_owned(),
                size: offset as usize,
            });
        }
    }
    offsets.push(offset as u32);

    let target = |label: Label| body.position(label).map_or(0, |i| offsets[i]);
    let mut w = ByteWriter::with_capacity(offset as usize);
    for (i, insn) in body.insns.iter().enumerate() {
        let at = offsets[i];
        let index = cp[i];
        match insn {
            Insn::AconstNull => {
                w.u8(opcodes::ACONST_NULL);
            }
            Insn::Iconst(v) => match *v {
                -1..=5 => {
                    w.u8((opcodes::ICONST_0 as i32 + *v) as u8);
                }
                -128..=127 => {
                    w.u8(opcodes::BIPUSH).u8(*v as i8 as u8);
                }
                -32768..=32767 => {
                    w.u8(opcodes::SIPUSH).i16(*v as i16);
                }
                _ if index <= 255 => {
                    w.u8(opcodes::LDC).u8(index as u8);
                }
                _ => {
                    w.u8(opcodes::LDC_W).u16(index);
                }
            },
            Insn::LdcString(_) | Insn::LdcClass(_) => {
                if index <= 255 {
                    w.u8(opcodes::LDC).u8(index as u8);
                } else {
                    w.u8(opcodes::LDC_W).u16(index);
                }
            }
            Insn::Load(kind, local) => write_local(&mut w, opcodes::ILOAD, opcodes::ILOAD_0, *kind, *local),
            Insn::Store(kind, local) => write_local(&mut w, opcodes::ISTORE, opcodes::ISTORE_0, *kind, *local),
            Insn::AaLoad => {
                w.u8(opcodes::AALOAD);
            }
            Insn::AaStore => {
                w.u8(opcodes::AASTORE);
            }
            Insn::Pop => {
                w.u8(opcodes::POP);
            }
            Insn::Dup => {
                w.u8(opcodes::DUP);
            }
            Insn::Return(kind) => {
                w.u8(match kind {
                    None => opcodes::RETURN,
                    Some(k) => opcodes::IRETURN + kind_index(*k),
                });
            }
            Insn::GetStatic(_) => {
                w.u8(opcodes::GETSTATIC).u16(index);
            }
            Insn::PutStatic(_) => {
                w.u8(opcodes::PUTSTATIC).u16(index);
            }
            Insn::GetField(_) => {
                w.u8(opcodes::GETFIELD).u16(index);
            }
            Insn::PutField(_) => {
                w.u8(opcodes::PUTFIELD).u16(index);
            }
            Insn::Invoke(kind, m) => {
                let opcode = match kind {
                    InvokeKind::Virtual => opcodes::INVOKEVIRTUAL,
                    InvokeKind::Special => opcodes::INVOKESPECIAL,
                    InvokeKind::Static => opcodes::INVOKESTATIC,
                    InvokeKind::Interface => opcodes::INVOKEINTERFACE,
                };
                w.u8(opcode).u16(index);
                if *kind == InvokeKind::Interface {
                    w.u8(interface_arg_count(&m.descriptor, method)?).u8(0);
                }
            }
            Insn::New(_) => {
                w.u8(opcodes::NEW).u16(index);
            }
            Insn::ANewArray(_) => {
                w.u8(opcodes::ANEWARRAY).u16(index);
            }
            Insn::CheckCast(_) => {
                w.u8(opcodes::CHECKCAST).u16(index);
            }
            Insn::AThrow => {
                w.u8(opcodes::ATHROW);
            }
            Insn::MonitorEnter => {
                w.u8(opcodes::MONITORENTER);
            }
            Insn::MonitorExit => {
                w.u8(opcodes::MONITOREXIT);
            }
            Insn::Jump(kind, label) => {
                let rel = target(*label) as i64 - at as i64;
                let rel = i16::try_from(rel).map_err(|_| GenerationError::BranchOutOfRange {
                    method: method.to_owned(),
                    offset: at,
                })?;
                let opcode = match kind {
                    JumpKind::Goto => opcodes::GOTO,
                    JumpKind::IfNull => opcodes::IFNULL,
                    JumpKind::IfNonNull => opcodes::IFNONNULL,
                };
                w.u8(opcode).i16(rel);
            }
            Insn::LookupSwitch { default, cases } => {
                let mut sorted = cases.clone();
                sorted.sort_by_key(|(key, _)| *key);
                if sorted.windows(2).any(|p| p[0].0 == p[1].0) {
                    return Err(invalid(method, format!("duplicate switch key at offset {at}")));
                }
                w.u8(opcodes::LOOKUPSWITCH);
                for _ in 0..switch_padding(at) {
                    w.u8(0);
                }
                w.i32((target(*default) as i64 - at as i64) as i32)
                    .i32(sorted.len() as i32);
                for (key, label) in sorted {
                    w.i32(key).i32((target(label) as i64 - at as i64) as i32);
                }
            }
        }
    }

    Ok(Layout {
        code: w.into_bytes(),
        offsets,
        cp,
    })
}
