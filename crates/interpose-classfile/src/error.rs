//! Class file parsing errors.

/// Errors produced while reading a class file.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClassFileError {
    #[error("invalid magic: expected 0xCAFEBABE, found {0:#010X}")]
    InvalidMagic(u32),

    #[error("unexpected end of input at offset {offset} (needed {needed} more bytes)")]
    Truncated { offset: usize, needed: usize },

    #[error("{0} trailing bytes after class file")]
    TrailingBytes(usize),

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { tag: u8, index: u16 },

    #[error("invalid constant pool index {0}")]
    BadConstantIndex(u16),

    #[error("constant pool index {index} is not a {expected}")]
    ConstantKind { index: u16, expected: &'static str },

    #[error("malformed modified UTF-8 string")]
    BadUtf8,

    #[error("unknown verification type tag {0}")]
    UnknownVerificationType(u8),

    #[error("reserved stack map frame type {0}")]
    ReservedFrameType(u8),

    #[error("unknown opcode {opcode:#04x} at offset {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },

    #[error("malformed {0} attribute")]
    MalformedAttribute(&'static str),
}

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
