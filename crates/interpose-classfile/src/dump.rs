//! Human-readable class file dump, in the spirit of `javap -c -v`.

use std::fmt::Write as _;

use interpose_core::Colors;

use crate::access::{self, FlagTarget};
use crate::class::{ClassFile, CodeAttribute, MemberInfo};
use crate::constant::ConstantPool;
use crate::error::Result;
use crate::frame::{self, StackMapFrame, VerificationType};
use crate::instructions::{Instruction, Operand};

/// Generate a human-readable dump of a parsed class.
pub fn dump(class: &ClassFile, colors: Colors) -> Result<String> {
    let mut out = String::new();
    let ctx = DumpContext {
        pool: &class.pool,
        colors,
    };

    dump_header(&mut out, class, &ctx)?;
    dump_fields(&mut out, class, &ctx)?;
    dump_methods(&mut out, class, &ctx)?;

    Ok(out)
}

struct DumpContext<'a> {
    pool: &'a ConstantPool,
    colors: Colors,
}

impl DumpContext<'_> {
    fn flags(&self, flags: u16, target: FlagTarget) -> String {
        let words = access::keywords(flags, target);
        if words.is_empty() {
            String::new()
        } else {
            format!("{} ", words.join(" "))
        }
    }

    fn cp_ref(&self, index: u16) -> String {
        let c = &self.colors;
        format!(
            "{}#{index}{} {}// {}{}",
            c.dim,
            c.reset,
            c.dim,
            self.pool.describe(index),
            c.reset
        )
    }

    fn verification_type(&self, ty: &VerificationType) -> String {
        match ty {
            VerificationType::Top => "top".into(),
            VerificationType::Integer => "int".into(),
            VerificationType::Float => "float".into(),
            VerificationType::Double => "double".into(),
            VerificationType::Long => "long".into(),
            VerificationType::Null => "null".into(),
            VerificationType::UninitializedThis => "uninitialized_this".into(),
            VerificationType::Object(i) => self.pool.class_name(*i).unwrap_or("?").to_owned(),
            VerificationType::Uninitialized(offset) => format!("uninitialized({offset})"),
        }
    }

    fn type_list(&self, types: &[VerificationType]) -> String {
        let parts: Vec<String> = types.iter().map(|t| self.verification_type(t)).collect();
        format!("[{}]", parts.join(", "))
    }
}

fn dump_header(out: &mut String, class: &ClassFile, ctx: &DumpContext<'_>) -> Result<()> {
    let c = &ctx.colors;
    let keyword = if class.access & access::INTERFACE != 0 {
        ""
    } else {
        "class "
    };
    write!(
        out,
        "{}{keyword}{}{}{}",
        ctx.flags(class.access, FlagTarget::Class),
        c.blue,
        class.this_name()?,
        c.reset
    )
    .unwrap();
    if let Some(super_name) = class.super_name()? {
        write!(out, " extends {super_name}").unwrap();
    }
    let interfaces = class.interface_names()?;
    if !interfaces.is_empty() {
        write!(out, " implements {}", interfaces.join(", ")).unwrap();
    }
    writeln!(out).unwrap();
    writeln!(
        out,
        "  {}version {}.{}, constants {}{}",
        c.dim,
        class.major_version,
        class.minor_version,
        class.pool.count(),
        c.reset
    )
    .unwrap();
    if let Some(source) = class.source_file()? {
        writeln!(out, "  source: {}{source}{}", c.green, c.reset).unwrap();
    }
    for annotation in class.annotation_types()? {
        writeln!(out, "  @{annotation}").unwrap();
    }
    Ok(())
}

fn dump_fields(out: &mut String, class: &ClassFile, ctx: &DumpContext<'_>) -> Result<()> {
    if class.fields.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n{}[fields]{}", ctx.colors.blue, ctx.colors.reset).unwrap();
    for field in &class.fields {
        writeln!(
            out,
            "  {}{}{}{}: {}",
            ctx.flags(field.access, FlagTarget::Field),
            ctx.colors.blue,
            class.member_name(field)?,
            ctx.colors.reset,
            class.member_descriptor(field)?
        )
        .unwrap();
    }
    Ok(())
}

fn dump_methods(out: &mut String, class: &ClassFile, ctx: &DumpContext<'_>) -> Result<()> {
    writeln!(out, "\n{}[methods]{}", ctx.colors.blue, ctx.colors.reset).unwrap();
    for (i, method) in class.methods.iter().enumerate() {
        if i > 0 {
            writeln!(out).unwrap();
        }
        dump_method(out, class, method, ctx)?;
    }
    Ok(())
}

fn dump_method(
    out: &mut String,
    class: &ClassFile,
    method: &MemberInfo,
    ctx: &DumpContext<'_>,
) -> Result<()> {
    let c = &ctx.colors;
    writeln!(
        out,
        "  {}{}{}{}{}",
        ctx.flags(method.access, FlagTarget::Method),
        c.blue,
        class.member_name(method)?,
        c.reset,
        class.member_descriptor(method)?
    )
    .unwrap();

    let throws = class.declared_exceptions(method)?;
    if !throws.is_empty() {
        writeln!(out, "    throws {}", throws.join(", ")).unwrap();
    }

    let Some(code) = class.code(method)? else {
        return Ok(());
    };
    writeln!(
        out,
        "    {}stack={}, locals={}{}",
        c.dim, code.max_stack, code.max_locals, c.reset
    )
    .unwrap();

    let instructions = code.instructions()?;
    let width = code.code.len().to_string().len();
    for insn in &instructions {
        writeln!(
            out,
            "    {}{:>width$}{}: {}",
            c.dim,
            insn.offset,
            c.reset,
            format_instruction(insn, ctx)
        )
        .unwrap();
    }

    dump_exception_table(out, &code, ctx);
    dump_frames(out, &code, ctx)?;
    Ok(())
}

fn format_instruction(insn: &Instruction, ctx: &DumpContext<'_>) -> String {
    let c = &ctx.colors;
    let name = format!("{}{}{}", c.blue, insn.mnemonic(), c.reset);
    match &insn.operand {
        Operand::None => name,
        Operand::Local(i) => format!("{name} {i}"),
        Operand::Int(v) => format!("{name} {}{v}{}", c.green, c.reset),
        Operand::Cp(i) => format!("{name} {}", ctx.cp_ref(*i)),
        Operand::Iinc { index, delta } => format!("{name} {index}, {delta}"),
        Operand::Branch(target) => format!("{name} {}{target}{}", c.yellow, c.reset),
        Operand::TableSwitch {
            default,
            low,
            targets,
        } => {
            let mut s = format!("{name} {{");
            for (i, target) in targets.iter().enumerate() {
                write!(s, " {}: {}{target}{};", *low + i as i32, c.yellow, c.reset).unwrap();
            }
            write!(s, " default: {}{default}{} }}", c.yellow, c.reset).unwrap();
            s
        }
        Operand::LookupSwitch { default, pairs } => {
            let mut s = format!("{name} {{");
            for (key, target) in pairs {
                write!(s, " {key}: {}{target}{};", c.yellow, c.reset).unwrap();
            }
            write!(s, " default: {}{default}{} }}", c.yellow, c.reset).unwrap();
            s
        }
        Operand::InvokeInterface { index, count } => {
            format!("{name} {}, {count}", ctx.cp_ref(*index))
        }
        Operand::NewArray(atype) => format!("{name} {atype}"),
        Operand::MultiANewArray { index, dims } => {
            format!("{name} {}, {dims}", ctx.cp_ref(*index))
        }
    }
}

fn dump_exception_table(out: &mut String, code: &CodeAttribute, ctx: &DumpContext<'_>) {
    if code.exception_table.is_empty() {
        return;
    }
    writeln!(out, "    exceptions:").unwrap();
    for entry in &code.exception_table {
        let catch = if entry.catch_type == 0 {
            "any".to_owned()
        } else {
            ctx.pool
                .class_name(entry.catch_type)
                .unwrap_or("?")
                .to_owned()
        };
        writeln!(
            out,
            "      {} {} -> {}{}{} {catch}",
            entry.start_pc, entry.end_pc, ctx.colors.yellow, entry.handler_pc, ctx.colors.reset
        )
        .unwrap();
    }
}

fn dump_frames(out: &mut String, code: &CodeAttribute, ctx: &DumpContext<'_>) -> Result<()> {
    let frames = code.stack_map(ctx.pool)?;
    if frames.is_empty() {
        return Ok(());
    }
    writeln!(out, "    frames:").unwrap();
    let offsets = frame::absolute_offsets(&frames);
    for (frame, offset) in frames.iter().zip(offsets) {
        let text = match frame {
            StackMapFrame::Same { .. } => "same".to_owned(),
            StackMapFrame::SameLocals1StackItem { stack, .. } => {
                format!("same_locals_1_stack_item {}", ctx.type_list(&[*stack]))
            }
            StackMapFrame::Chop { k, .. } => format!("chop {k}"),
            StackMapFrame::Append { locals, .. } => format!("append {}", ctx.type_list(locals)),
            StackMapFrame::Full { locals, stack, .. } => format!(
                "full locals={} stack={}",
                ctx.type_list(locals),
                ctx.type_list(stack)
            ),
        };
        writeln!(
            out,
            "      {}{offset}{}: {text}",
            ctx.colors.yellow, ctx.colors.reset
        )
        .unwrap();
    }
    Ok(())
}
