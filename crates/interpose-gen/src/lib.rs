#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Interception proxy class generator.
//!
//! Pipeline: `plan` (member collection and dispatch ids) → `synth` (method
//! bodies for forwarding, dispatch and lazy call targets) → `emit` (constant
//! pool, layout, stack map frames, class file bytes). `assemble` drives the
//! three stages for one artifact.

pub mod assemble;
pub mod context;
pub mod emit;
pub mod error;
pub mod plan;
pub mod synth;

pub use assemble::{ArtifactSpec, GeneratedArtifact, generate, generate_bytes};
pub use context::{DispatchHasher, GenerationContext, RuntimeBindings};
pub use error::{GenerationError, Result};
pub use plan::{DispatchPlan, MemberOrigin, PlannedMember, collect_dispatch_plan, dispatch_id};

#[cfg(test)]
mod assemble_tests;
#[cfg(test)]
mod test_utils;
