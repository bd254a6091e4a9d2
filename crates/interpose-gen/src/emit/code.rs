//! Symbolic method bodies.
//!
//! Synthesis builds a [`CodeBuilder`] out of [`Insn`]s with symbolic labels
//! and symbolic constant references. Layout later picks encodings, resolves
//! labels to offsets and computes frames, so nothing here deals with bytes.

use interpose_core::JType;

/// A jump target. Bound to a position with [`CodeBuilder::mark`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Label(pub(crate) usize);

/// Value category of a load, store or return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// `int` and everything narrower.
    Int,
    Long,
    Float,
    Double,
    Ref,
}

impl Kind {
    /// Category of a non-void type.
    pub fn of(ty: &JType) -> Option<Self> {
        Some(match ty {
            JType::Void => return None,
            JType::Long => Self::Long,
            JType::Float => Self::Float,
            JType::Double => Self::Double,
            JType::Object(_) | JType::Array(_) => Self::Ref,
            _ => Self::Int,
        })
    }

    pub fn slots(self) -> u16 {
        match self {
            Self::Long | Self::Double => 2,
            _ => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

impl FieldRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
    /// Owner is an interface (`InterfaceMethodref`).
    pub interface: bool,
}

impl MethodRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
            interface: false,
        }
    }

    pub fn on_interface(mut self) -> Self {
        self.interface = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvokeKind {
    Virtual,
    Special,
    Static,
    Interface,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpKind {
    Goto,
    IfNull,
    IfNonNull,
}

/// One symbolic instruction. Class names are internal names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Insn {
    AconstNull,
    /// Integer constant; the narrowest encoding is chosen at layout.
    Iconst(i32),
    LdcString(String),
    LdcClass(String),
    Load(Kind, u16),
    Store(Kind, u16),
    AaLoad,
    AaStore,
    Pop,
    Dup,
    /// `None` is a void return.
    Return(Option<Kind>),
    GetStatic(FieldRef),
    PutStatic(FieldRef),
    GetField(FieldRef),
    PutField(FieldRef),
    Invoke(InvokeKind, MethodRef),
    New(String),
    ANewArray(String),
    CheckCast(String),
    AThrow,
    MonitorEnter,
    MonitorExit,
    Jump(JumpKind, Label),
    LookupSwitch {
        default: Label,
        /// Sorted by key before encoding.
        cases: Vec<(i32, Label)>,
    },
}

impl Insn {
    /// Control never falls through to the next instruction.
    pub fn is_unconditional(&self) -> bool {
        matches!(
            self,
            Self::Return(_) | Self::AThrow | Self::Jump(JumpKind::Goto, _) | Self::LookupSwitch { .. }
        )
    }

    /// Explicit jump targets.
    pub fn targets(&self) -> Vec<Label> {
        match self {
            Self::Jump(_, l) => vec![*l],
            Self::LookupSwitch { default, cases } => std::iter::once(*default)
                .chain(cases.iter().map(|(_, l)| *l))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Exception table entry over labels. `catch` is an internal name, `None`
/// catches everything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Handler {
    pub start: Label,
    pub end: Label,
    pub handler: Label,
    pub catch: Option<String>,
}

/// Accumulates the body of one method.
#[derive(Clone, Debug, Default)]
pub struct CodeBuilder {
    pub(crate) insns: Vec<Insn>,
    /// Instruction index each label is bound to.
    pub(crate) labels: Vec<Option<usize>>,
    pub(crate) handlers: Vec<Handler>,
}

impl CodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.insns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insns.is_empty()
    }

    pub fn insns(&self) -> &[Insn] {
        &self.insns
    }

    pub fn new_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Bind `label` to the next instruction pushed.
    pub fn mark(&mut self, label: Label) -> &mut Self {
        self.labels[label.0] = Some(self.insns.len());
        self
    }

    /// Instruction index a label is bound to.
    pub fn position(&self, label: Label) -> Option<usize> {
        self.labels.get(label.0).copied().flatten()
    }

    pub fn push(&mut self, insn: Insn) -> &mut Self {
        self.insns.push(insn);
        self
    }

    pub fn handler(&mut self, start: Label, end: Label, handler: Label, catch: Option<&str>) -> &mut Self {
        self.handlers.push(Handler {
            start,
            end,
            handler,
            catch: catch.map(str::to_owned),
        });
        self
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    pub fn aconst_null(&mut self) -> &mut Self {
        self.push(Insn::AconstNull)
    }

    pub fn iconst(&mut self, value: i32) -> &mut Self {
        self.push(Insn::Iconst(value))
    }

    pub fn ldc_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.push(Insn::LdcString(value.into()))
    }

    pub fn ldc_class(&mut self, internal_name: impl Into<String>) -> &mut Self {
        self.push(Insn::LdcClass(internal_name.into()))
    }

    pub fn load(&mut self, kind: Kind, index: u16) -> &mut Self {
        self.push(Insn::Load(kind, index))
    }

    pub fn aload(&mut self, index: u16) -> &mut Self {
        self.load(Kind::Ref, index)
    }

    pub fn store(&mut self, kind: Kind, index: u16) -> &mut Self {
        self.push(Insn::Store(kind, index))
    }

    pub fn astore(&mut self, index: u16) -> &mut Self {
        self.store(Kind::Ref, index)
    }

    pub fn aaload(&mut self) -> &mut Self {
        self.push(Insn::AaLoad)
    }

    pub fn aastore(&mut self) -> &mut Self {
        self.push(Insn::AaStore)
    }

    pub fn pop(&mut self) -> &mut Self {
        self.push(Insn::Pop)
    }

    pub fn dup(&mut self) -> &mut Self {
        self.push(Insn::Dup)
    }

    pub fn ret(&mut self, kind: Option<Kind>) -> &mut Self {
        self.push(Insn::Return(kind))
    }

    pub fn getstatic(&mut self, field: FieldRef) -> &mut Self {
        self.push(Insn::GetStatic(field))
    }

    pub fn putstatic(&mut self, field: FieldRef) -> &mut Self {
        self.push(Insn::PutStatic(field))
    }

    pub fn getfield(&mut self, field: FieldRef) -> &mut Self {
        self.push(Insn::GetField(field))
    }

    pub fn putfield(&mut self, field: FieldRef) -> &mut Self {
        self.push(Insn::PutField(field))
    }

    pub fn invoke(&mut self, kind: InvokeKind, method: MethodRef) -> &mut Self {
        self.push(Insn::Invoke(kind, method))
    }

    pub fn new_object(&mut self, class: impl Into<String>) -> &mut Self {
        self.push(Insn::New(class.into()))
    }

    pub fn anewarray(&mut self, element: impl Into<String>) -> &mut Self {
        self.push(Insn::ANewArray(element.into()))
    }

    pub fn checkcast(&mut self, class: impl Into<String>) -> &mut Self {
        self.push(Insn::CheckCast(class.into()))
    }

    pub fn athrow(&mut self) -> &mut Self {
        self.push(Insn::AThrow)
    }

    pub fn monitorenter(&mut self) -> &mut Self {
        self.push(Insn::MonitorEnter)
    }

    pub fn monitorexit(&mut self) -> &mut Self {
        self.push(Insn::MonitorExit)
    }

    pub fn jump(&mut self, kind: JumpKind, target: Label) -> &mut Self {
        self.push(Insn::Jump(kind, target))
    }

    pub fn goto(&mut self, target: Label) -> &mut Self {
        self.jump(JumpKind::Goto, target)
    }

    pub fn lookupswitch(&mut self, default: Label, cases: Vec<(i32, Label)>) -> &mut Self {
        self.push(Insn::LookupSwitch { default, cases })
    }

    /// `new C; dup; ldc msg; invokespecial C.<init>(String); athrow`.
    pub fn throw_new(&mut self, class: &str, message: &str) -> &mut Self {
        self.new_object(class)
            .dup()
            .ldc_string(message)
            .invoke(
                InvokeKind::Special,
                MethodRef::new(class, "<init>", "(Ljava/lang/String;)V"),
            )
            .athrow()
    }
}
