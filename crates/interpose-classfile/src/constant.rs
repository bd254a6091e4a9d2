//! Constant pool entries (JVMS 4.4).

use crate::bytes::{ByteReader, ByteWriter, decode_modified_utf8, encode_modified_utf8};
use crate::error::{ClassFileError, Result};

pub mod tag {
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELDREF: u8 = 9;
    pub const METHODREF: u8 = 10;
    pub const INTERFACE_METHODREF: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const DYNAMIC: u8 = 17;
    pub const INVOKE_DYNAMIC: u8 = 18;
    pub const MODULE: u8 = 19;
    pub const PACKAGE: u8 = 20;
}

/// One constant pool entry. Indexes refer to other entries in the same pool.
///
/// Floating point values are stored as raw bits so entries can be hashed
/// and deduplicated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(u16),
    String(u16),
    Fieldref { class: u16, name_and_type: u16 },
    Methodref { class: u16, name_and_type: u16 },
    InterfaceMethodref { class: u16, name_and_type: u16 },
    NameAndType { name: u16, descriptor: u16 },
    MethodHandle { kind: u8, reference: u16 },
    MethodType(u16),
    Dynamic { bootstrap: u16, name_and_type: u16 },
    InvokeDynamic { bootstrap: u16, name_and_type: u16 },
    Module(u16),
    Package(u16),
}

impl Constant {
    pub fn tag(&self) -> u8 {
        match self {
            Self::Utf8(_) => tag::UTF8,
            Self::Integer(_) => tag::INTEGER,
            Self::Float(_) => tag::FLOAT,
            Self::Long(_) => tag::LONG,
            Self::Double(_) => tag::DOUBLE,
            Self::Class(_) => tag::CLASS,
            Self::String(_) => tag::STRING,
            Self::Fieldref { .. } => tag::FIELDREF,
            Self::Methodref { .. } => tag::METHODREF,
            Self::InterfaceMethodref { .. } => tag::INTERFACE_METHODREF,
            Self::NameAndType { .. } => tag::NAME_AND_TYPE,
            Self::MethodHandle { .. } => tag::METHOD_HANDLE,
            Self::MethodType(_) => tag::METHOD_TYPE,
            Self::Dynamic { .. } => tag::DYNAMIC,
            Self::InvokeDynamic { .. } => tag::INVOKE_DYNAMIC,
            Self::Module(_) => tag::MODULE,
            Self::Package(_) => tag::PACKAGE,
        }
    }

    /// Long and double entries occupy two pool slots.
    pub fn is_wide(&self) -> bool {
        matches!(self, Self::Long(_) | Self::Double(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Utf8(_) => "Utf8",
            Self::Integer(_) => "Integer",
            Self::Float(_) => "Float",
            Self::Long(_) => "Long",
            Self::Double(_) => "Double",
            Self::Class(_) => "Class",
            Self::String(_) => "String",
            Self::Fieldref { .. } => "Fieldref",
            Self::Methodref { .. } => "Methodref",
            Self::InterfaceMethodref { .. } => "InterfaceMethodref",
            Self::NameAndType { .. } => "NameAndType",
            Self::MethodHandle { .. } => "MethodHandle",
            Self::MethodType(_) => "MethodType",
            Self::Dynamic { .. } => "Dynamic",
            Self::InvokeDynamic { .. } => "InvokeDynamic",
            Self::Module(_) => "Module",
            Self::Package(_) => "Package",
        }
    }

    pub fn write(&self, w: &mut ByteWriter) {
        w.u8(self.tag());
        match self {
            Self::Utf8(s) => {
                let bytes = encode_modified_utf8(s);
                w.u16(bytes.len() as u16).bytes(&bytes);
            }
            Self::Integer(v) => {
                w.i32(*v);
            }
            Self::Float(bits) => {
                w.u32(*bits);
            }
            Self::Long(v) => {
                w.u32(((*v as u64) >> 32) as u32).u32(*v as u32);
            }
            Self::Double(bits) => {
                w.u32((bits >> 32) as u32).u32(*bits as u32);
            }
            Self::Class(i)
            | Self::String(i)
            | Self::MethodType(i)
            | Self::Module(i)
            | Self::Package(i) => {
                w.u16(*i);
            }
            Self::Fieldref {
                class,
                name_and_type,
            }
            | Self::Methodref {
                class,
                name_and_type,
            }
            | Self::InterfaceMethodref {
                class,
                name_and_type,
            } => {
                w.u16(*class).u16(*name_and_type);
            }
            Self::NameAndType { name, descriptor } => {
                w.u16(*name).u16(*descriptor);
            }
            Self::MethodHandle { kind, reference } => {
                w.u8(*kind).u16(*reference);
            }
            Self::Dynamic {
                bootstrap,
                name_and_type,
            }
            | Self::InvokeDynamic {
                bootstrap,
                name_and_type,
            } => {
                w.u16(*bootstrap).u16(*name_and_type);
            }
        }
    }

    /// Read one entry; `index` is only used for error reporting.
    pub fn read(r: &mut ByteReader<'_>, index: u16) -> Result<Self> {
        let kind = r.u8()?;
        Ok(match kind {
            tag::UTF8 => {
                let len = r.u16()? as usize;
                Self::Utf8(decode_modified_utf8(r.take(len)?)?)
            }
            tag::INTEGER => Self::Integer(r.i32()?),
            tag::FLOAT => Self::Float(r.u32()?),
            tag::LONG => Self::Long(r.u64()? as i64),
            tag::DOUBLE => Self::Double(r.u64()?),
            tag::CLASS => Self::Class(r.u16()?),
            tag::STRING => Self::String(r.u16()?),
            tag::FIELDREF => Self::Fieldref {
                class: r.u16()?,
                name_and_type: r.u16()?,
            },
            tag::METHODREF => Self::Methodref {
                class: r.u16()?,
                name_and_type: r.u16()?,
            },
            tag::INTERFACE_METHODREF => Self::InterfaceMethodref {
                class: r.u16()?,
                name_and_type: r.u16()?,
            },
            tag::NAME_AND_TYPE => Self::NameAndType {
                name: r.u16()?,
                descriptor: r.u16()?,
            },
            tag::METHOD_HANDLE => Self::MethodHandle {
                kind: r.u8()?,
                reference: r.u16()?,
            },
            tag::METHOD_TYPE => Self::MethodType(r.u16()?),
            tag::DYNAMIC => Self::Dynamic {
                bootstrap: r.u16()?,
                name_and_type: r.u16()?,
            },
            tag::INVOKE_DYNAMIC => Self::InvokeDynamic {
                bootstrap: r.u16()?,
                name_and_type: r.u16()?,
            },
            tag::MODULE => Self::Module(r.u16()?),
            tag::PACKAGE => Self::Package(r.u16()?),
            other => return Err(ClassFileError::UnknownConstantTag { tag: other, index }),
        })
    }
}

/// A resolved field or method reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberRef<'a> {
    pub class: &'a str,
    pub name: &'a str,
    pub descriptor: &'a str,
    pub interface: bool,
}

/// A parsed constant pool, indexed from 1.
///
/// Slot 0 and the slot after each long/double entry are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstantPool {
    entries: Vec<Option<Constant>>,
}

impl ConstantPool {
    pub fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        let count = r.u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(None);
        let mut index = 1u16;
        while index < count {
            let constant = Constant::read(r, index)?;
            let wide = constant.is_wide();
            entries.push(Some(constant));
            index += 1;
            if wide {
                entries.push(None);
                index += 1;
            }
        }
        Ok(Self { entries })
    }

    /// The `constant_pool_count` value (one more than the last usable index).
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, index: u16) -> Result<&Constant> {
        self.entries
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(ClassFileError::BadConstantIndex(index))
    }

    /// Occupied entries with their indexes.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (i as u16, c)))
    }

    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Utf8(s) => Ok(s),
            _ => Err(ClassFileError::ConstantKind {
                index,
                expected: "Utf8",
            }),
        }
    }

    /// Internal name referenced by a `Class` entry.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Class(name) => self.utf8(*name),
            _ => Err(ClassFileError::ConstantKind {
                index,
                expected: "Class",
            }),
        }
    }

    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            Constant::NameAndType { name, descriptor } => {
                Ok((self.utf8(*name)?, self.utf8(*descriptor)?))
            }
            _ => Err(ClassFileError::ConstantKind {
                index,
                expected: "NameAndType",
            }),
        }
    }

    /// Resolve a `Fieldref`, `Methodref` or `InterfaceMethodref`.
    pub fn member_ref(&self, index: u16) -> Result<MemberRef<'_>> {
        let (class, nat, interface) = match self.get(index)? {
            Constant::Fieldref {
                class,
                name_and_type,
            }
            | Constant::Methodref {
                class,
                name_and_type,
            } => (*class, *name_and_type, false),
            Constant::InterfaceMethodref {
                class,
                name_and_type,
            } => (*class, *name_and_type, true),
            _ => {
                return Err(ClassFileError::ConstantKind {
                    index,
                    expected: "member reference",
                });
            }
        };
        let (name, descriptor) = self.name_and_type(nat)?;
        Ok(MemberRef {
            class: self.class_name(class)?,
            name,
            descriptor,
            interface,
        })
    }

    /// Short human-readable rendering used by the disassembler.
    pub fn describe(&self, index: u16) -> String {
        let Ok(constant) = self.get(index) else {
            return format!("<bad #{index}>");
        };
        match constant {
            Constant::Utf8(s) => s.clone(),
            Constant::Integer(v) => v.to_string(),
            Constant::Float(bits) => format!("{}f", f32::from_bits(*bits)),
            Constant::Long(v) => format!("{v}l"),
            Constant::Double(bits) => format!("{}d", f64::from_bits(*bits)),
            Constant::Class(_) => self.class_name(index).unwrap_or("?").to_owned(),
            Constant::String(s) => format!("{:?}", self.utf8(*s).unwrap_or("?")),
            Constant::Fieldref { .. }
            | Constant::Methodref { .. }
            | Constant::InterfaceMethodref { .. } => match self.member_ref(index) {
                Ok(m) => format!("{}.{}:{}", m.class, m.name, m.descriptor),
                Err(_) => "?".to_owned(),
            },
            Constant::NameAndType { .. } => match self.name_and_type(index) {
                Ok((name, desc)) => format!("{name}:{desc}"),
                Err(_) => "?".to_owned(),
            },
            Constant::MethodType(d) => self.utf8(*d).unwrap_or("?").to_owned(),
            other => other.kind_name().to_owned(),
        }
    }
}
