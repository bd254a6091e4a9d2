//! Constant pool builder with deduplication.

use indexmap::IndexMap;

use interpose_classfile::{ByteWriter, Constant};

use crate::error::{GenerationError, Result};

/// Builds the constant pool, handing out stable 1-based indexes.
///
/// Structurally equal entries are stored once.
#[derive(Debug)]
pub struct ConstantPoolBuilder {
    entries: IndexMap<Constant, u16>,
    /// Next free index; doubles as `constant_pool_count`.
    next: u32,
}

impl Default for ConstantPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPoolBuilder {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            next: 1,
        }
    }

    pub fn add(&mut self, constant: Constant) -> Result<u16> {
        if let Some(&index) = self.entries.get(&constant) {
            return Ok(index);
        }
        let width = if constant.is_wide() { 2 } else { 1 };
        if self.next + width > u16::MAX as u32 {
            return Err(GenerationError::TooManyConstants(
                (self.next + width) as usize,
            ));
        }
        let index = self.next as u16;
        self.next += width;
        self.entries.insert(constant, index);
        Ok(index)
    }

    pub fn utf8(&mut self, value: &str) -> Result<u16> {
        self.add(Constant::Utf8(value.to_owned()))
    }

    pub fn integer(&mut self, value: i32) -> Result<u16> {
        self.add(Constant::Integer(value))
    }

    /// `Class` entry for an internal name (or array descriptor).
    pub fn class(&mut self, internal_name: &str) -> Result<u16> {
        let name = self.utf8(internal_name)?;
        self.add(Constant::Class(name))
    }

    pub fn string(&mut self, value: &str) -> Result<u16> {
        let utf8 = self.utf8(value)?;
        self.add(Constant::String(utf8))
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16> {
        let name = self.utf8(name)?;
        let descriptor = self.utf8(descriptor)?;
        self.add(Constant::NameAndType { name, descriptor })
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<u16> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.add(Constant::Fieldref {
            class,
            name_and_type,
        })
    }

    pub fn method_ref(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
        interface: bool,
    ) -> Result<u16> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.add(if interface {
            Constant::InterfaceMethodref {
                class,
                name_and_type,
            }
        } else {
            Constant::Methodref {
                class,
                name_and_type,
            }
        })
    }

    /// Internal name behind a `Class` index handed out by this builder.
    pub fn class_name(&self, index: u16) -> Option<&str> {
        let name = self.entries.iter().find_map(|(c, &i)| match c {
            Constant::Class(name) if i == index => Some(*name),
            _ => None,
        })?;
        self.entries.iter().find_map(|(c, &i)| match c {
            Constant::Utf8(s) if i == name => Some(s.as_str()),
            _ => None,
        })
    }

    /// The `constant_pool_count` field value.
    pub fn count(&self) -> u16 {
        self.next as u16
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn write(&self, w: &mut ByteWriter) {
        w.u16(self.count());
        for constant in self.entries.keys() {
            constant.write(w);
        }
    }
}
