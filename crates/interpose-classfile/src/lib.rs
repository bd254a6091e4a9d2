//! JVM class file format for interpose.
//!
//! This crate contains:
//! - Format constants (magic, versions, access flags, opcodes)
//! - Constant pool entries and the big-endian byte codec
//! - Stack map frames (shared by the emitter and the reader)
//! - A class file reader and a javap-style disassembler

pub mod access;
pub mod bytes;
pub mod class;
pub mod constant;
pub mod dump;
pub mod error;
pub mod frame;
pub mod instructions;
pub mod opcodes;

pub use bytes::{ByteReader, ByteWriter};
pub use class::{
    AttributeInfo, ClassFile, CodeAttribute, ExceptionTableEntry, MemberInfo, attr,
};
pub use constant::{Constant, ConstantPool};
pub use dump::dump;
pub use error::ClassFileError;
pub use frame::{StackMapFrame, VerificationType};
pub use instructions::{Instruction, Operand, decode};

/// `0xCAFEBABE`.
pub const MAGIC: u32 = 0xCAFE_BABE;

/// Java 8 class files: the oldest version that requires stack map frames.
pub const MAJOR_VERSION: u16 = 52;
pub const MINOR_VERSION: u16 = 0;

#[cfg(test)]
mod instructions_tests;
