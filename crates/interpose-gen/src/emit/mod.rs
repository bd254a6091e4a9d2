//! Binary emission: symbolic method bodies to version 52.0 class files.
//!
//! - `code`: symbolic instructions, labels, exception handlers
//! - `constant_pool`: deduplicating pool builder
//! - `layout`: encoding selection and label resolution
//! - `frames`: stack map inference
//! - `writer`: class file serialization

pub mod code;
pub mod constant_pool;
pub mod frames;
pub mod layout;
pub mod writer;

pub use code::{CodeBuilder, FieldRef, Handler, Insn, InvokeKind, JumpKind, Kind, Label, MethodRef};
pub use constant_pool::ConstantPoolBuilder;
pub use frames::{FrameInfo, MethodShape, compute_frames};
pub use layout::{Layout, layout};
pub use writer::ClassWriter;

#[cfg(test)]
mod layout_tests;
