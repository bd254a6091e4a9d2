//! `StackMapTable` frames (JVMS 4.7.4).
//!
//! Frames are stored delta-encoded: the first frame's `offset_delta` is its
//! bytecode offset, every later frame's is `offset - previous_offset - 1`.

use crate::bytes::{ByteReader, ByteWriter};
use crate::error::{ClassFileError, Result};

/// Type of one local variable or operand stack entry as seen by the verifier.
///
/// `Long` and `Double` stand for both slots they occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VerificationType {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    /// Constant pool index of a `Class` entry.
    Object(u16),
    /// Bytecode offset of the `new` that created the value.
    Uninitialized(u16),
}

impl VerificationType {
    pub fn is_wide(&self) -> bool {
        matches!(self, Self::Long | Self::Double)
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Object(_) | Self::UninitializedThis | Self::Uninitialized(_)
        )
    }

    pub fn write(&self, w: &mut ByteWriter) {
        match self {
            Self::Top => w.u8(0),
            Self::Integer => w.u8(1),
            Self::Float => w.u8(2),
            Self::Double => w.u8(3),
            Self::Long => w.u8(4),
            Self::Null => w.u8(5),
            Self::UninitializedThis => w.u8(6),
            Self::Object(class) => w.u8(7).u16(*class),
            Self::Uninitialized(offset) => w.u8(8).u16(*offset),
        };
    }

    pub fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(match r.u8()? {
            0 => Self::Top,
            1 => Self::Integer,
            2 => Self::Float,
            3 => Self::Double,
            4 => Self::Long,
            5 => Self::Null,
            6 => Self::UninitializedThis,
            7 => Self::Object(r.u16()?),
            8 => Self::Uninitialized(r.u16()?),
            other => return Err(ClassFileError::UnknownVerificationType(other)),
        })
    }

    /// Convert a slot-per-entry locals array into frame form.
    ///
    /// A long/double and the `Top` in its upper slot collapse to one entry, and
    /// trailing `Top` entries are dropped.
    pub fn compact_locals(slots: &[VerificationType]) -> Vec<VerificationType> {
        let mut out = Vec::with_capacity(slots.len());
        let mut i = 0;
        while i < slots.len() {
            let ty = slots[i];
            out.push(ty);
            i += if ty.is_wide() { 2 } else { 1 };
        }
        while out.last() == Some(&VerificationType::Top) {
            out.pop();
        }
        out
    }
}

/// One decoded stack map frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackMapFrame {
    Same {
        offset_delta: u16,
    },
    SameLocals1StackItem {
        offset_delta: u16,
        stack: VerificationType,
    },
    Chop {
        offset_delta: u16,
        /// Number of trailing locals removed (1..=3).
        k: u8,
    },
    Append {
        offset_delta: u16,
        locals: Vec<VerificationType>,
    },
    Full {
        offset_delta: u16,
        locals: Vec<VerificationType>,
        stack: Vec<VerificationType>,
    },
}

impl StackMapFrame {
    /// Pick the most compact encoding for a frame, given the previous frame's
    /// locals (both in frame form).
    pub fn compress(
        prev_locals: &[VerificationType],
        locals: &[VerificationType],
        stack: &[VerificationType],
        offset_delta: u16,
    ) -> Self {
        if locals == prev_locals {
            match stack {
                [] => return Self::Same { offset_delta },
                [item] => {
                    return Self::SameLocals1StackItem {
                        offset_delta,
                        stack: *item,
                    };
                }
                _ => {}
            }
        }
        if stack.is_empty() {
            if locals.len() < prev_locals.len()
                && prev_locals.len() - locals.len() <= 3
                && prev_locals.starts_with(locals)
            {
                return Self::Chop {
                    offset_delta,
                    k: (prev_locals.len() - locals.len()) as u8,
                };
            }
            if locals.len() > prev_locals.len()
                && locals.len() - prev_locals.len() <= 3
                && locals.starts_with(prev_locals)
            {
                return Self::Append {
                    offset_delta,
                    locals: locals[prev_locals.len()..].to_vec(),
                };
            }
        }
        Self::Full {
            offset_delta,
            locals: locals.to_vec(),
            stack: stack.to_vec(),
        }
    }

    pub fn offset_delta(&self) -> u16 {
        match self {
            Self::Same { offset_delta }
            | Self::SameLocals1StackItem { offset_delta, .. }
            | Self::Chop { offset_delta, .. }
            | Self::Append { offset_delta, .. }
            | Self::Full { offset_delta, .. } => *offset_delta,
        }
    }

    pub fn write(&self, w: &mut ByteWriter) {
        match self {
            Self::Same { offset_delta } => {
                if *offset_delta <= 63 {
                    w.u8(*offset_delta as u8);
                } else {
                    w.u8(251).u16(*offset_delta);
                }
            }
            Self::SameLocals1StackItem {
                offset_delta,
                stack,
            } => {
                if *offset_delta <= 63 {
                    w.u8(64 + *offset_delta as u8);
                } else {
                    w.u8(247).u16(*offset_delta);
                }
                stack.write(w);
            }
            Self::Chop { offset_delta, k } => {
                w.u8(251 - k).u16(*offset_delta);
            }
            Self::Append {
                offset_delta,
                locals,
            } => {
                w.u8(251 + locals.len() as u8).u16(*offset_delta);
                for ty in locals {
                    ty.write(w);
                }
            }
            Self::Full {
                offset_delta,
                locals,
                stack,
            } => {
                w.u8(255).u16(*offset_delta).u16(locals.len() as u16);
                for ty in locals {
                    ty.write(w);
                }
                w.u16(stack.len() as u16);
                for ty in stack {
                    ty.write(w);
                }
            }
        }
    }

    pub fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        let frame_type = r.u8()?;
        Ok(match frame_type {
            0..=63 => Self::Same {
                offset_delta: frame_type as u16,
            },
            64..=127 => Self::SameLocals1StackItem {
                offset_delta: (frame_type - 64) as u16,
                stack: VerificationType::read(r)?,
            },
            247 => Self::SameLocals1StackItem {
                offset_delta: r.u16()?,
                stack: VerificationType::read(r)?,
            },
            248..=250 => Self::Chop {
                offset_delta: r.u16()?,
                k: 251 - frame_type,
            },
            251 => Self::Same {
                offset_delta: r.u16()?,
            },
            252..=254 => {
                let offset_delta = r.u16()?;
                let locals = (0..frame_type - 251)
                    .map(|_| VerificationType::read(r))
                    .collect::<Result<_>>()?;
                Self::Append {
                    offset_delta,
                    locals,
                }
            }
            255 => {
                let offset_delta = r.u16()?;
                let n_locals = r.u16()?;
                let locals = (0..n_locals)
                    .map(|_| VerificationType::read(r))
                    .collect::<Result<_>>()?;
                let n_stack = r.u16()?;
                let stack = (0..n_stack)
                    .map(|_| VerificationType::read(r))
                    .collect::<Result<_>>()?;
                Self::Full {
                    offset_delta,
                    locals,
                    stack,
                }
            }
            reserved => return Err(ClassFileError::ReservedFrameType(reserved)),
        })
    }
}

/// Decode a whole `StackMapTable` attribute body.
pub fn read_table(info: &[u8]) -> Result<Vec<StackMapFrame>> {
    let mut r = ByteReader::new(info);
    let count = r.u16()?;
    let frames = (0..count)
        .map(|_| StackMapFrame::read(&mut r))
        .collect::<Result<Vec<_>>>()?;
    if !r.is_empty() {
        return Err(ClassFileError::MalformedAttribute("StackMapTable"));
    }
    Ok(frames)
}

/// Absolute bytecode offsets of decoded frames.
pub fn absolute_offsets(frames: &[StackMapFrame]) -> Vec<u32> {
    let mut out = Vec::with_capacity(frames.len());
    let mut prev: Option<u32> = None;
    for frame in frames {
        let delta = frame.offset_delta() as u32;
        let offset = match prev {
            None => delta,
            Some(p) => p + delta + 1,
        };
        out.push(offset);
        prev = Some(offset);
    }
    out
}
