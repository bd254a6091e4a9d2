//! Bytecode decoding.
//!
//! Branch operands are resolved to absolute offsets so callers never deal
//! with relative jumps.

use crate::bytes::ByteReader;
use crate::error::{ClassFileError, Result};
use crate::opcodes::{self, OperandShape};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    None,
    Local(u16),
    Int(i32),
    Cp(u16),
    Iinc { index: u16, delta: i16 },
    Branch(u32),
    TableSwitch { default: u32, low: i32, targets: Vec<u32> },
    LookupSwitch { default: u32, pairs: Vec<(i32, u32)> },
    InvokeInterface { index: u16, count: u8 },
    NewArray(u8),
    MultiANewArray { index: u16, dims: u8 },
}

/// One decoded instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub offset: u32,
    pub opcode: u8,
    /// Whether the instruction carried a `wide` prefix.
    pub wide: bool,
    pub operand: Operand,
}

impl Instruction {
    pub fn mnemonic(&self) -> &'static str {
        opcodes::mnemonic(self.opcode).unwrap_or("?")
    }

    /// Constant pool index referenced by the instruction, if any.
    pub fn cp_index(&self) -> Option<u16> {
        match self.operand {
            Operand::Cp(i)
            | Operand::InvokeInterface { index: i, .. }
            | Operand::MultiANewArray { index: i, .. } => Some(i),
            _ => None,
        }
    }

    /// All explicit jump targets (branches and switch arms).
    pub fn targets(&self) -> Vec<u32> {
        match &self.operand {
            Operand::Branch(t) => vec![*t],
            Operand::TableSwitch {
                default, targets, ..
            } => std::iter::once(*default)
                .chain(targets.iter().copied())
                .collect(),
            Operand::LookupSwitch { default, pairs } => std::iter::once(*default)
                .chain(pairs.iter().map(|(_, t)| *t))
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn branch_target(offset: u32, rel: i32) -> u32 {
    (offset as i64 + rel as i64) as u32
}

/// Decode a method's `code` array.
pub fn decode(code: &[u8]) -> Result<Vec<Instruction>> {
    let mut r = ByteReader::new(code);
    let mut out = Vec::new();
    while !r.is_empty() {
        let offset = r.position() as u32;
        let mut opcode = r.u8()?;
        let mut wide = false;
        if opcodes::mnemonic(opcode).is_none() {
            return Err(ClassFileError::UnknownOpcode {
                opcode,
                offset: offset as usize,
            });
        }
        if opcode == opcodes::WIDE {
            wide = true;
            opcode = r.u8()?;
        }
        let operand = match opcodes::operand_shape(opcode) {
            OperandShape::None | OperandShape::Wide => Operand::None,
            OperandShape::Local if wide => Operand::Local(r.u16()?),
            OperandShape::Local => Operand::Local(r.u8()? as u16),
            OperandShape::Byte => Operand::Int(r.i8()? as i32),
            OperandShape::Short => Operand::Int(r.i16()? as i32),
            OperandShape::Cp8 => Operand::Cp(r.u8()? as u16),
            OperandShape::Cp16 => Operand::Cp(r.u16()?),
            OperandShape::Iinc if wide => Operand::Iinc {
                index: r.u16()?,
                delta: r.i16()?,
            },
            OperandShape::Iinc => Operand::Iinc {
                index: r.u8()? as u16,
                delta: r.i8()? as i16,
            },
            OperandShape::Branch16 => Operand::Branch(branch_target(offset, r.i16()? as i32)),
            OperandShape::Branch32 => Operand::Branch(branch_target(offset, r.i32()?)),
            OperandShape::TableSwitch => {
                skip_switch_padding(&mut r)?;
                let default = branch_target(offset, r.i32()?);
                let low = r.i32()?;
                let high = r.i32()?;
                if high < low {
                    return Err(ClassFileError::MalformedAttribute("Code"));
                }
                let targets = (low..=high)
                    .map(|_| r.i32().map(|rel| branch_target(offset, rel)))
                    .collect::<Result<_>>()?;
                Operand::TableSwitch {
                    default,
                    low,
                    targets,
                }
            }
            OperandShape::LookupSwitch => {
                skip_switch_padding(&mut r)?;
                let default = branch_target(offset, r.i32()?);
                let npairs = r.i32()?;
                if npairs < 0 {
                    return Err(ClassFileError::MalformedAttribute("Code"));
                }
                let pairs = (0..npairs)
                    .map(|_| -> Result<(i32, u32)> {
                        let key = r.i32()?;
                        Ok((key, branch_target(offset, r.i32()?)))
                    })
                    .collect::<Result<_>>()?;
                Operand::LookupSwitch { default, pairs }
            }
            OperandShape::InvokeInterface => {
                let index = r.u16()?;
                let count = r.u8()?;
                r.skip(1)?;
                Operand::InvokeInterface { index, count }
            }
            OperandShape::InvokeDynamic => {
                let index = r.u16()?;
                r.skip(2)?;
                Operand::Cp(index)
            }
            OperandShape::NewArray => Operand::NewArray(r.u8()?),
            OperandShape::MultiANewArray => Operand::MultiANewArray {
                index: r.u16()?,
                dims: r.u8()?,
            },
        };
        out.push(Instruction {
            offset,
            opcode,
            wide,
            operand,
        });
    }
    Ok(out)
}

/// Switch operands start at the next multiple of four from the code start.
fn skip_switch_padding(r: &mut ByteReader<'_>) -> Result<()> {
    let pad = (4 - r.position() % 4) % 4;
    r.skip(pad)
}
