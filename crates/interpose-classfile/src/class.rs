//! Class file reader (JVMS 4.1).
//!
//! Attributes stay as raw bytes on their owner; the typed accessors below
//! decode the few this workspace cares about on demand.

use crate::bytes::ByteReader;
use crate::constant::ConstantPool;
use crate::error::{ClassFileError, Result};
use crate::frame::{self, StackMapFrame};
use crate::instructions::{self, Instruction};
use crate::{MAGIC, access};

/// Attribute names used by the reader and the emitter.
pub mod attr {
    pub const CODE: &str = "Code";
    pub const STACK_MAP_TABLE: &str = "StackMapTable";
    pub const EXCEPTIONS: &str = "Exceptions";
    pub const SOURCE_FILE: &str = "SourceFile";
    pub const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name_index: u16,
    pub info: Vec<u8>,
}

impl AttributeInfo {
    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        let name_index = r.u16()?;
        let len = r.u32()? as usize;
        Ok(Self {
            name_index,
            info: r.take(len)?.to_vec(),
        })
    }

    fn read_all(r: &mut ByteReader<'_>) -> Result<Vec<Self>> {
        let count = r.u16()?;
        (0..count).map(|_| Self::read(r)).collect()
    }
}

/// A field or method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberInfo {
    pub access: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<AttributeInfo>,
}

impl MemberInfo {
    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            access: r.u16()?,
            name_index: r.u16()?,
            descriptor_index: r.u16()?,
            attributes: AttributeInfo::read_all(r)?,
        })
    }

    pub fn is_static(&self) -> bool {
        self.access & access::STATIC != 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// `Class` index, or 0 for a catch-all.
    pub catch_type: u16,
}

/// Decoded `Code` attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Vec<AttributeInfo>,
}

impl CodeAttribute {
    pub fn parse(info: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(info);
        let max_stack = r.u16()?;
        let max_locals = r.u16()?;
        let code_len = r.u32()? as usize;
        let code = r.take(code_len)?.to_vec();
        let handlers = r.u16()?;
        let exception_table = (0..handlers)
            .map(|_| -> Result<ExceptionTableEntry> {
                Ok(ExceptionTableEntry {
                    start_pc: r.u16()?,
                    end_pc: r.u16()?,
                    handler_pc: r.u16()?,
                    catch_type: r.u16()?,
                })
            })
            .collect::<Result<_>>()?;
        let attributes = AttributeInfo::read_all(&mut r)?;
        if !r.is_empty() {
            return Err(ClassFileError::MalformedAttribute(attr::CODE));
        }
        Ok(Self {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    pub fn instructions(&self) -> Result<Vec<Instruction>> {
        instructions::decode(&self.code)
    }

    /// Decoded `StackMapTable`, empty when the attribute is absent.
    pub fn stack_map(&self, pool: &ConstantPool) -> Result<Vec<StackMapFrame>> {
        match find_attribute(&self.attributes, pool, attr::STACK_MAP_TABLE)? {
            Some(a) => frame::read_table(&a.info),
            None => Ok(Vec::new()),
        }
    }
}

/// A parsed class file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub pool: ConstantPool,
    pub access: u16,
    pub this_class: u16,
    /// 0 only for `java.lang.Object`.
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<MemberInfo>,
    pub methods: Vec<MemberInfo>,
    pub attributes: Vec<AttributeInfo>,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(bytes);
        let magic = r.u32()?;
        if magic != MAGIC {
            return Err(ClassFileError::InvalidMagic(magic));
        }
        let minor_version = r.u16()?;
        let major_version = r.u16()?;
        let pool = ConstantPool::read(&mut r)?;
        let access = r.u16()?;
        let this_class = r.u16()?;
        let super_class = r.u16()?;
        let interface_count = r.u16()?;
        let interfaces = (0..interface_count)
            .map(|_| r.u16())
            .collect::<Result<_>>()?;
        let field_count = r.u16()?;
        let fields = (0..field_count)
            .map(|_| MemberInfo::read(&mut r))
            .collect::<Result<_>>()?;
        let method_count = r.u16()?;
        let methods = (0..method_count)
            .map(|_| MemberInfo::read(&mut r))
            .collect::<Result<_>>()?;
        let attributes = AttributeInfo::read_all(&mut r)?;
        if !r.is_empty() {
            return Err(ClassFileError::TrailingBytes(r.remaining()));
        }

        let class = Self {
            minor_version,
            major_version,
            pool,
            access,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        };
        class.this_name()?;
        Ok(class)
    }

    /// Internal name of this class.
    pub fn this_name(&self) -> Result<&str> {
        self.pool.class_name(self.this_class)
    }

    pub fn super_name(&self) -> Result<Option<&str>> {
        if self.super_class == 0 {
            return Ok(None);
        }
        self.pool.class_name(self.super_class).map(Some)
    }

    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|&i| self.pool.class_name(i))
            .collect()
    }

    pub fn member_name(&self, member: &MemberInfo) -> Result<&str> {
        self.pool.utf8(member.name_index)
    }

    pub fn member_descriptor(&self, member: &MemberInfo) -> Result<&str> {
        self.pool.utf8(member.descriptor_index)
    }

    pub fn field(&self, name: &str) -> Option<&MemberInfo> {
        self.fields
            .iter()
            .find(|f| self.member_name(f).is_ok_and(|n| n == name))
    }

    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MemberInfo> {
        self.methods.iter().find(|m| {
            self.member_name(m).is_ok_and(|n| n == name)
                && self.member_descriptor(m).is_ok_and(|d| d == descriptor)
        })
    }

    /// Methods with the given name, any descriptor.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MemberInfo> {
        self.methods
            .iter()
            .filter(move |m| self.member_name(m).is_ok_and(|n| n == name))
    }

    pub fn attribute<'a>(
        &self,
        attributes: &'a [AttributeInfo],
        name: &str,
    ) -> Result<Option<&'a AttributeInfo>> {
        find_attribute(attributes, &self.pool, name)
    }

    pub fn code(&self, method: &MemberInfo) -> Result<Option<CodeAttribute>> {
        self.attribute(&method.attributes, attr::CODE)?
            .map(|a| CodeAttribute::parse(&a.info))
            .transpose()
    }

    /// Internal names listed in a method's `Exceptions` attribute.
    pub fn declared_exceptions(&self, method: &MemberInfo) -> Result<Vec<&str>> {
        let Some(a) = self.attribute(&method.attributes, attr::EXCEPTIONS)? else {
            return Ok(Vec::new());
        };
        let mut r = ByteReader::new(&a.info);
        let count = r.u16()?;
        (0..count)
            .map(|_| self.pool.class_name(r.u16()?))
            .collect()
    }

    pub fn source_file(&self) -> Result<Option<&str>> {
        let Some(a) = self.attribute(&self.attributes, attr::SOURCE_FILE)? else {
            return Ok(None);
        };
        let mut r = ByteReader::new(&a.info);
        self.pool.utf8(r.u16()?).map(Some)
    }

    /// Type descriptors of the runtime-visible annotations on the class.
    pub fn annotation_types(&self) -> Result<Vec<&str>> {
        let Some(a) = self.attribute(&self.attributes, attr::RUNTIME_VISIBLE_ANNOTATIONS)? else {
            return Ok(Vec::new());
        };
        let mut r = ByteReader::new(&a.info);
        let count = r.u16()?;
        let mut out = Vec::with_capacity(count as usize);
        for _ in 0..count {
            out.push(self.pool.utf8(r.u16()?)?);
            let pairs = r.u16()?;
            for _ in 0..pairs {
                r.u16()?;
                skip_element_value(&mut r)?;
            }
        }
        if !r.is_empty() {
            return Err(ClassFileError::MalformedAttribute(
                attr::RUNTIME_VISIBLE_ANNOTATIONS,
            ));
        }
        Ok(out)
    }
}

fn find_attribute<'a>(
    attributes: &'a [AttributeInfo],
    pool: &ConstantPool,
    name: &str,
) -> Result<Option<&'a AttributeInfo>> {
    for a in attributes {
        if pool.utf8(a.name_index)? == name {
            return Ok(Some(a));
        }
    }
    Ok(None)
}

fn skip_element_value(r: &mut ByteReader<'_>) -> Result<()> {
    match r.u8()? {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' | b'c' => r.skip(2),
        b'e' => r.skip(4),
        b'@' => {
            r.u16()?;
            let pairs = r.u16()?;
            for _ in 0..pairs {
                r.u16()?;
                skip_element_value(r)?;
            }
            Ok(())
        }
        b'[' => {
            let count = r.u16()?;
            for _ in 0..count {
                skip_element_value(r)?;
            }
            Ok(())
        }
        _ => Err(ClassFileError::MalformedAttribute(
            attr::RUNTIME_VISIBLE_ANNOTATIONS,
        )),
    }
}
