//! Stack map frame computation.
//!
//! A forward dataflow pass over the symbolic body infers the verifier's view
//! of locals and stack at every instruction, then frames are emitted where
//! the verifier needs them: jump targets, handler entries, and instructions
//! following an unconditional transfer.

use std::collections::BTreeSet;

use interpose_classfile::{StackMapFrame, VerificationType};
use interpose_core::JType;

use super::code::{CodeBuilder, Insn, InvokeKind, JumpKind, Kind};
use super::constant_pool::ConstantPoolBuilder;
use super::layout::{Layout, invalid};
use crate::error::Result;

const OBJECT: &str = "java/lang/Object";
const THROWABLE: &str = "java/lang/Throwable";

/// What the frame computation needs to know about the method itself.
#[derive(Clone, Copy, Debug)]
pub struct MethodShape<'a> {
    /// Internal name of the class being generated.
    pub this_class: &'a str,
    pub name: &'a str,
    pub descriptor: &'a str,
    pub is_static: bool,
}

/// Result of frame computation.
#[derive(Debug, Default)]
pub struct FrameInfo {
    pub max_stack: u16,
    pub max_locals: u16,
    pub frames: Vec<StackMapFrame>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Ty {
    Top,
    Int,
    Float,
    Long,
    Double,
    Null,
    UninitThis,
    /// Result of the `new` at `offset`, not yet constructed.
    Uninit { offset: u32, class: String },
    Object(String),
}

impl Ty {
    fn of(ty: &JType) -> Option<Self> {
        Some(match ty {
            JType::Void => return None,
            JType::Long => Self::Long,
            JType::Float => Self::Float,
            JType::Double => Self::Double,
            JType::Object(_) | JType::Array(_) => Self::Object(ty.internal_name()?),
            _ => Self::Int,
        })
    }

    fn object(name: &str) -> Self {
        Self::Object(name.to_owned())
    }

    fn is_wide(&self) -> bool {
        matches!(self, Self::Long | Self::Double)
    }

    fn slots(&self) -> u16 {
        if self.is_wide() { 2 } else { 1 }
    }

    fn is_reference(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::UninitThis | Self::Uninit { .. } | Self::Object(_)
        )
    }

    fn fits(&self, kind: Kind) -> bool {
        match kind {
            Kind::Int => *self == Self::Int,
            Kind::Long => *self == Self::Long,
            Kind::Float => *self == Self::Float,
            Kind::Double => *self == Self::Double,
            Kind::Ref => self.is_reference(),
        }
    }

    fn merge(&self, other: &Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a.clone(),
            (Self::Null, o @ Self::Object(_)) | (o @ Self::Object(_), Self::Null) => o.clone(),
            (Self::Object(_), Self::Object(_)) => Self::object(OBJECT),
            _ => Self::Top,
        }
    }

    fn to_verification(&self, pool: &mut ConstantPoolBuilder) -> Result<VerificationType> {
        Ok(match self {
            Self::Top => VerificationType::Top,
            Self::Int => VerificationType::Integer,
            Self::Float => VerificationType::Float,
            Self::Long => VerificationType::Long,
            Self::Double => VerificationType::Double,
            Self::Null => VerificationType::Null,
            Self::UninitThis => VerificationType::UninitializedThis,
            Self::Uninit { offset, .. } => VerificationType::Uninitialized(*offset as u16),
            Self::Object(name) => VerificationType::Object(pool.class(name)?),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct State {
    /// One entry per slot; the upper half of a long/double is `Top`.
    locals: Vec<Ty>,
    stack: Vec<Ty>,
}

impl State {
    fn stack_slots(&self) -> u16 {
        self.stack.iter().map(Ty::slots).sum()
    }

    /// Merge `incoming` into `self`, reporting whether anything changed.
    fn merge(&mut self, incoming: &State, method: &str, at: u32) -> Result<bool> {
        if self.stack.len() != incoming.stack.len() {
            return Err(invalid(
                method,
                format!("stack height mismatch at offset {at}"),
            ));
        }
        let mut changed = false;
        for (slot, other) in self.stack.iter_mut().zip(&incoming.stack) {
            let merged = slot.merge(other);
            if merged == Ty::Top {
                return Err(invalid(
                    method,
                    format!("incompatible stack values at offset {at}"),
                ));
            }
            if merged != *slot {
                *slot = merged;
                changed = true;
            }
        }
        let len = self.locals.len().max(incoming.locals.len());
        self.locals.resize(len, Ty::Top);
        for (i, slot) in self.locals.iter_mut().enumerate() {
            let other = incoming.locals.get(i).unwrap_or(&Ty::Top);
            let merged = slot.merge(other);
            if merged != *slot {
                *slot = merged;
                changed = true;
            }
        }
        Ok(changed)
    }
}

struct Interpreter<'a> {
    shape: &'a MethodShape<'a>,
}

impl Interpreter<'_> {
    fn err(&self, at: u32, what: &str) -> crate::error::GenerationError {
        invalid(self.shape.name, format!("{what} at offset {at}"))
    }

    fn pop(&self, state: &mut State, at: u32) -> Result<Ty> {
        state
            .stack
            .pop()
            .ok_or_else(|| self.err(at, "operand stack underflow"))
    }

    fn pop_kind(&self, state: &mut State, kind: Kind, at: u32) -> Result<Ty> {
        let value = self.pop(state, at)?;
        if !value.fits(kind) {
            return Err(self.err(at, "operand type mismatch"));
        }
        Ok(value)
    }

    fn parse_field(&self, descriptor: &str, at: u32) -> Result<Ty> {
        JType::from_descriptor(descriptor)
            .ok()
            .and_then(|t| Ty::of(&t))
            .ok_or_else(|| self.err(at, "bad field descriptor"))
    }

    fn parse_method(&self, descriptor: &str, at: u32) -> Result<(Vec<JType>, JType)> {
        JType::parse_method_descriptor(descriptor).map_err(|_| self.err(at, "bad method descriptor"))
    }

    fn step(&self, insn: &Insn, input: &State, at: u32) -> Result<State> {
        let mut s = input.clone();
        match insn {
            Insn::AconstNull => s.stack.push(Ty::Null),
            Insn::Iconst(_) => s.stack.push(Ty::Int),
            Insn::LdcString(_) => s.stack.push(Ty::object("java/lang/String")),
            Insn::LdcClass(_) => s.stack.push(Ty::object("java/lang/Class")),
            Insn::Load(kind, index) => {
                let value = s
                    .locals
                    .get(*index as usize)
                    .cloned()
                    .ok_or_else(|| self.err(at, "load from undefined local"))?;
                if !value.fits(*kind) {
                    return Err(self.err(at, "load type mismatch"));
                }
                s.stack.push(value);
            }
            Insn::Store(kind, index) => {
                let value = self.pop_kind(&mut s, *kind, at)?;
                let i = *index as usize;
                let end = i + kind.slots() as usize;
                if s.locals.len() < end {
                    s.locals.resize(end, Ty::Top);
                }
                if i > 0 && s.locals[i - 1].is_wide() {
                    s.locals[i - 1] = Ty::Top;
                }
                if kind.slots() == 2 {
                    s.locals[i + 1] = Ty::Top;
                } else if s.locals.get(i).is_some_and(Ty::is_wide) && i + 1 < s.locals.len() {
                    s.locals[i + 1] = Ty::Top;
                }
                s.locals[i] = value;
            }
            Insn::AaLoad => {
                self.pop_kind(&mut s, Kind::Int, at)?;
                let array = self.pop_kind(&mut s, Kind::Ref, at)?;
                let element = match &array {
                    Ty::Null => Ty::Null,
                    Ty::Object(name) => match name.strip_prefix('[') {
                        Some(inner) if inner.starts_with('[') => Ty::object(inner),
                        Some(inner) => inner
                            .strip_prefix('L')
                            .and_then(|n| n.strip_suffix(';'))
                            .map(Ty::object)
                            .ok_or_else(|| self.err(at, "aaload on a primitive array"))?,
                        None => return Err(self.err(at, "aaload on a non-array")),
                    },
                    _ => return Err(self.err(at, "aaload on a non-array")),
                };
                s.stack.push(element);
            }
            Insn::AaStore => {
                self.pop_kind(&mut s, Kind::Ref, at)?;
                self.pop_kind(&mut s, Kind::Int, at)?;
                self.pop_kind(&mut s, Kind::Ref, at)?;
            }
            Insn::Pop => {
                if self.pop(&mut s, at)?.is_wide() {
                    return Err(self.err(at, "pop of a two-slot value"));
                }
            }
            Insn::Dup => {
                let top = s
                    .stack
                    .last()
                    .cloned()
                    .ok_or_else(|| self.err(at, "operand stack underflow"))?;
                if top.is_wide() {
                    return Err(self.err(at, "dup of a two-slot value"));
                }
                s.stack.push(top);
            }
            Insn::Return(kind) => {
                if let Some(kind) = kind {
                    self.pop_kind(&mut s, *kind, at)?;
                }
            }
            Insn::GetStatic(f) => s.stack.push(self.parse_field(&f.descriptor, at)?),
            Insn::PutStatic(_) => {
                self.pop(&mut s, at)?;
            }
            Insn::GetField(f) => {
                self.pop_kind(&mut s, Kind::Ref, at)?;
                s.stack.push(self.parse_field(&f.descriptor, at)?);
            }
            Insn::PutField(_) => {
                self.pop(&mut s, at)?;
                self.pop_kind(&mut s, Kind::Ref, at)?;
            }
            Insn::Invoke(kind, m) => {
                let (params, ret) = self.parse_method(&m.descriptor, at)?;
                for param in params.iter().rev() {
                    let expected = Kind::of(param).ok_or_else(|| self.err(at, "void parameter"))?;
                    self.pop_kind(&mut s, expected, at)?;
                }
                if *kind != InvokeKind::Static {
                    let receiver = self.pop_kind(&mut s, Kind::Ref, at)?;
                    if *kind == InvokeKind::Special && m.name == "<init>" {
                        let constructed = match &receiver {
                            Ty::UninitThis => Ty::object(self.shape.this_class),
                            Ty::Uninit { class, .. } => Ty::object(class),
                            _ => return Err(self.err(at, "constructor call on an initialized value")),
                        };
                        for slot in s.locals.iter_mut().chain(s.stack.iter_mut()) {
                            if *slot == receiver {
                                *slot = constructed.clone();
                            }
                        }
                    }
                }
                if let Some(ty) = Ty::of(&ret) {
                    s.stack.push(ty);
                }
            }
            Insn::New(class) => s.stack.push(Ty::Uninit {
                offset: at,
                class: class.clone(),
            }),
            Insn::ANewArray(element) => {
                self.pop_kind(&mut s, Kind::Int, at)?;
                let array = if element.starts_with('[') {
                    format!("[{element}")
                } else {
                    format!("[L{element};")
                };
                s.stack.push(Ty::Object(array));
            }
            Insn::CheckCast(class) => {
                self.pop_kind(&mut s, Kind::Ref, at)?;
                s.stack.push(Ty::object(class));
            }
            Insn::AThrow | Insn::MonitorEnter | Insn::MonitorExit => {
                self.pop_kind(&mut s, Kind::Ref, at)?;
            }
            Insn::Jump(JumpKind::Goto, _) => {}
            Insn::Jump(_, _) => {
                self.pop_kind(&mut s, Kind::Ref, at)?;
            }
            Insn::LookupSwitch { .. } => {
                self.pop_kind(&mut s, Kind::Int, at)?;
            }
        }
        Ok(s)
    }
}

fn entry_state(shape: &MethodShape<'_>) -> Result<State> {
    let (params, _) = JType::parse_method_descriptor(shape.descriptor)
        .map_err(|e| invalid(shape.name, e.to_string()))?;
    let mut locals = Vec::new();
    if !shape.is_static {
        locals.push(if shape.name == "<init>" {
            Ty::UninitThis
        } else {
            Ty::object(shape.this_class)
        });
    }
    for param in &params {
        let ty = Ty::of(param).ok_or_else(|| invalid(shape.name, "void parameter"))?;
        let wide = ty.is_wide();
        locals.push(ty);
        if wide {
            locals.push(Ty::Top);
        }
    }
    Ok(State {
        locals,
        stack: Vec::new(),
    })
}

fn max_locals(body: &CodeBuilder, entry: &State) -> u16 {
    body.insns
        .iter()
        .filter_map(|insn| match insn {
            Insn::Load(kind, i) | Insn::Store(kind, i) => Some(i + kind.slots()),
            _ => None,
        })
        .fold(entry.locals.len() as u16, u16::max)
}

fn compact(slots: &[Ty], pool: &mut ConstantPoolBuilder) -> Result<Vec<VerificationType>> {
    let converted = slots
        .iter()
        .map(|t| t.to_verification(pool))
        .collect::<Result<Vec<_>>>()?;
    Ok(VerificationType::compact_locals(&converted))
}

/// Infer frames and operand limits for a laid-out body.
pub fn compute_frames(
    body: &CodeBuilder,
    layout: &Layout,
    pool: &mut ConstantPoolBuilder,
    shape: &MethodShape<'_>,
) -> Result<FrameInfo> {
    let n = body.insns.len();
    let entry = entry_state(shape)?;
    let max_locals = max_locals(body, &entry);
    if n == 0 {
        return Err(invalid(shape.name, "empty method body"));
    }

    // Resolved exception ranges: (start, end, handler, caught type).
    let mut ranges = Vec::with_capacity(body.handlers.len());
    for h in &body.handlers {
        let (Some(start), Some(end), Some(handler)) = (
            body.position(h.start),
            body.position(h.end),
            body.position(h.handler),
        ) else {
            return Err(invalid(shape.name, "exception handler uses an unbound label"));
        };
        let caught = h.catch.as_deref().unwrap_or(THROWABLE);
        ranges.push((start, end, handler, caught));
    }
    let catch_type = |handler: usize| -> Ty {
        let mut types = ranges
            .iter()
            .filter(|r| r.2 == handler)
            .map(|r| r.3);
        match types.next() {
            Some(first) if types.all(|t| t == first) => Ty::object(first),
            _ => Ty::object(THROWABLE),
        }
    };

    let interp = Interpreter { shape };
    let mut states: Vec<Option<State>> = vec![None; n];
    let mut queued = vec![false; n];
    let mut worklist = vec![0usize];
    let mut max_stack = 0u16;
    states[0] = Some(entry.clone());
    queued[0] = true;

    let flow = |target: usize,
                incoming: &State,
                states: &mut [Option<State>],
                worklist: &mut Vec<usize>,
                queued: &mut [bool]|
     -> Result<()> {
        let changed = if let Some(existing) = &mut states[target] {
            existing.merge(incoming, shape.name, layout.offsets[target])?
        } else {
            states[target] = Some(incoming.clone());
            true
        };
        if changed && !queued[target] {
            queued[target] = true;
            worklist.push(target);
        }
        Ok(())
    };

    while let Some(i) = worklist.pop() {
        queued[i] = false;
        let Some(input) = states[i].clone() else {
            continue;
        };
        let insn = &body.insns[i];
        let at = layout.offsets[i];
        let output = interp.step(insn, &input, at)?;
        max_stack = max_stack.max(input.stack_slots()).max(output.stack_slots());

        for &(start, end, handler, _) in &ranges {
            if (start..end).contains(&i) {
                let caught = vec![catch_type(handler)];
                max_stack = max_stack.max(1);
                for locals in [&input.locals, &output.locals] {
                    let state = State {
                        locals: locals.clone(),
                        stack: caught.clone(),
                    };
                    flow(handler, &state, &mut states, &mut worklist, &mut queued)?;
                }
            }
        }

        for target in insn.targets() {
            if let Some(t) = body.position(target) {
                flow(t, &output, &mut states, &mut worklist, &mut queued)?;
            }
        }
        if !insn.is_unconditional() {
            if i + 1 >= n {
                return Err(invalid(shape.name, "control falls off the end of the code"));
            }
            flow(i + 1, &output, &mut states, &mut worklist, &mut queued)?;
        }
    }

    if let Some(i) = states.iter().position(Option::is_none) {
        return Err(invalid(
            shape.name,
            format!("unreachable instruction at offset {}", layout.offsets[i]),
        ));
    }

    let mut needs_frame = BTreeSet::new();
    for (i, insn) in body.insns.iter().enumerate() {
        needs_frame.extend(insn.targets().into_iter().filter_map(|l| body.position(l)));
        if insn.is_unconditional() && i + 1 < n {
            needs_frame.insert(i + 1);
        }
    }
    needs_frame.extend(ranges.iter().map(|r| r.2));

    let mut frames = Vec::with_capacity(needs_frame.len());
    let mut prev_locals = compact(&entry.locals, pool)?;
    let mut prev_offset: Option<u32> = None;
    for i in needs_frame {
        let Some(state) = &states[i] else {
            continue;
        };
        let offset = layout.offsets[i];
        let delta = match prev_offset {
            None => offset,
            Some(p) => offset - p - 1,
        };
        let locals = compact(&state.locals, pool)?;
        let stack = state
            .stack
            .iter()
            .map(|t| t.to_verification(pool))
            .collect::<Result<Vec<_>>>()?;
        frames.push(StackMapFrame::compress(&prev_locals, &locals, &stack, delta as u16));
        prev_locals = locals;
        prev_offset = Some(offset);
    }

    Ok(FrameInfo {
        max_stack,
        max_locals,
        frames,
    })
}
