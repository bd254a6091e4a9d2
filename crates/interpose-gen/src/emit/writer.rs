//! Class file writer.

use interpose_classfile::{ByteWriter, MAGIC, MAJOR_VERSION, MINOR_VERSION, access, attr};

use super::code::CodeBuilder;
use super::constant_pool::ConstantPoolBuilder;
use super::frames::{self, MethodShape};
use super::layout;
use crate::error::{GenerationError, Result};

#[derive(Debug)]
struct Attribute {
    name_index: u16,
    info: Vec<u8>,
}

impl Attribute {
    fn write(&self, w: &mut ByteWriter) {
        w.u16(self.name_index)
            .u32(self.info.len() as u32)
            .bytes(&self.info);
    }
}

#[derive(Debug)]
struct Member {
    access: u16,
    name_index: u16,
    descriptor_index: u16,
    attributes: Vec<Attribute>,
}

impl Member {
    fn write(&self, w: &mut ByteWriter) {
        w.u16(self.access)
            .u16(self.name_index)
            .u16(self.descriptor_index)
            .u16(self.attributes.len() as u16);
        for a in &self.attributes {
            a.write(w);
        }
    }
}

fn check_count(what: &'static str, count: usize) -> Result<u16> {
    u16::try_from(count).map_err(|_| GenerationError::TooMany { what, count })
}

/// Accumulates one class and serializes it (version 52.0).
#[derive(Debug)]
pub struct ClassWriter {
    pool: ConstantPoolBuilder,
    access: u16,
    this_name: String,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    annotations: Vec<u16>,
    source_file: Option<u16>,
}

impl ClassWriter {
    /// All names are internal names.
    pub fn new(access: u16, this_name: &str, super_name: &str, interfaces: &[String]) -> Result<Self> {
        let mut pool = ConstantPoolBuilder::new();
        let this_class = pool.class(this_name)?;
        let super_class = pool.class(super_name)?;
        let interfaces = interfaces
            .iter()
            .map(|i| pool.class(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            pool,
            access,
            this_name: this_name.to_owned(),
            this_class,
            super_class,
            interfaces,
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            source_file: None,
        })
    }

    pub fn this_name(&self) -> &str {
        &self.this_name
    }

    pub fn pool(&self) -> &ConstantPoolBuilder {
        &self.pool
    }

    pub fn add_field(&mut self, access: u16, name: &str, descriptor: &str) -> Result<()> {
        let name_index = self.pool.utf8(name)?;
        let descriptor_index = self.pool.utf8(descriptor)?;
        self.fields.push(Member {
            access,
            name_index,
            descriptor_index,
            attributes: Vec::new(),
        });
        Ok(())
    }

    /// Add a method. `body` is `None` only for abstract or native methods;
    /// `exceptions` are internal names for the `Exceptions` attribute.
    pub fn add_method(
        &mut self,
        access: u16,
        name: &str,
        descriptor: &str,
        body: Option<&CodeBuilder>,
        exceptions: &[String],
    ) -> Result<()> {
        let name_index = self.pool.utf8(name)?;
        let descriptor_index = self.pool.utf8(descriptor)?;
        let mut attributes = Vec::new();

        if let Some(body) = body {
            let this_name = self.this_name.clone();
            let shape = MethodShape {
                this_class: &this_name,
                name,
                descriptor,
                is_static: access & access::STATIC != 0,
            };
            attributes.push(self.code_attribute(body, &shape)?);
        }

        if !exceptions.is_empty() {
            let mut w = ByteWriter::new();
            w.u16(check_count("declared exceptions", exceptions.len())?);
            for e in exceptions {
                w.u16(self.pool.class(e)?);
            }
            attributes.push(Attribute {
                name_index: self.pool.utf8(attr::EXCEPTIONS)?,
                info: w.into_bytes(),
            });
        }

        self.methods.push(Member {
            access,
            name_index,
            descriptor_index,
            attributes,
        });
        Ok(())
    }

    fn code_attribute(&mut self, body: &CodeBuilder, shape: &MethodShape<'_>) -> Result<Attribute> {
        let laid_out = layout::layout(body, &mut self.pool, shape.name)?;
        let info = frames::compute_frames(body, &laid_out, &mut self.pool, shape)?;

        let mut w = ByteWriter::with_capacity(laid_out.code.len() + 32);
        w.u16(info.max_stack)
            .u16(info.max_locals)
            .u32(laid_out.code.len() as u32)
            .bytes(&laid_out.code);

        w.u16(check_count("exception handlers", body.handlers().len())?);
        for h in body.handlers() {
            let catch_type = match &h.catch {
                Some(class) => self.pool.class(class)?,
                None => 0,
            };
            w.u16(laid_out.offset_of(body, h.start) as u16)
                .u16(laid_out.offset_of(body, h.end) as u16)
                .u16(laid_out.offset_of(body, h.handler) as u16)
                .u16(catch_type);
        }

        if info.frames.is_empty() {
            w.u16(0);
        } else {
            let mut table = ByteWriter::new();
            table.u16(check_count("stack map frames", info.frames.len())?);
            for frame in &info.frames {
                frame.write(&mut table);
            }
            let stack_map = Attribute {
                name_index: self.pool.utf8(attr::STACK_MAP_TABLE)?,
                info: table.into_bytes(),
            };
            w.u16(1);
            stack_map.write(&mut w);
        }

        Ok(Attribute {
            name_index: self.pool.utf8(attr::CODE)?,
            info: w.into_bytes(),
        })
    }

    pub fn set_source_file(&mut self, name: &str) -> Result<()> {
        self.source_file = Some(self.pool.utf8(name)?);
        Ok(())
    }

    /// Attach a runtime-visible annotation without elements.
    pub fn add_annotation(&mut self, descriptor: &str) -> Result<()> {
        let index = self.pool.utf8(descriptor)?;
        self.annotations.push(index);
        Ok(())
    }

    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        let mut attributes = Vec::new();
        if let Some(index) = self.source_file {
            let mut w = ByteWriter::new();
            w.u16(index);
            attributes.push(Attribute {
                name_index: self.pool.utf8(attr::SOURCE_FILE)?,
                info: w.into_bytes(),
            });
        }
        if !self.annotations.is_empty() {
            let mut w = ByteWriter::new();
            w.u16(self.annotations.len() as u16);
            for index in &self.annotations {
                w.u16(*index).u16(0);
            }
            attributes.push(Attribute {
                name_index: self.pool.utf8(attr::RUNTIME_VISIBLE_ANNOTATIONS)?,
                info: w.into_bytes(),
            });
        }

        let interfaces = check_count("interfaces", self.interfaces.len())?;
        let fields = check_count("fields", self.fields.len())?;
        let methods = check_count("methods", self.methods.len())?;

        let mut w = ByteWriter::with_capacity(1024);
        w.u32(MAGIC).u16(MINOR_VERSION).u16(MAJOR_VERSION);
        self.pool.write(&mut w);
        w.u16(self.access)
            .u16(self.this_class)
            .u16(self.super_class)
            .u16(interfaces);
        for i in &self.interfaces {
            w.u16(*i);
        }
        w.u16(fields);
        for f in &self.fields {
            f.write(&mut w);
        }
        w.u16(methods);
        for m in &self.methods {
            m.write(&mut w);
        }
        w.u16(attributes.len() as u16);
        for a in &attributes {
            a.write(&mut w);
        }
        Ok(w.into_bytes())
    }
}
