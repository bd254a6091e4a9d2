//! Artifact assembly: plan, synthesize, emit.

use interpose_classfile::access;
use interpose_core::{CapabilitySurface, JType, names};

use crate::context::GenerationContext;
use crate::emit::ClassWriter;
use crate::error::{GenerationError, Result};
use crate::plan::{PlannedMember, collect_dispatch_plan};
use crate::synth::{self, ClassShape};

/// `SourceFile` value stamped on every artifact.
pub const SOURCE_FILE: &str = "<generated>";

const JAVA_LANG_OBJECT: &str = "java/lang/Object";

/// What to generate: class name, access flags, surface, and the base
/// constructor to forward to.
#[derive(Clone, Debug)]
pub struct ArtifactSpec<'s> {
    /// Binary name of the generated class.
    pub name: String,
    pub surface: &'s CapabilitySurface,
    /// Class access flags; `ACC_SUPER` is always added.
    pub access: u16,
    pub base_constructor: Vec<JType>,
}

impl<'s> ArtifactSpec<'s> {
    /// A `public final` artifact using the no-argument base constructor.
    pub fn new(name: impl Into<String>, surface: &'s CapabilitySurface) -> Self {
        Self {
            name: name.into(),
            surface,
            access: access::PUBLIC | access::FINAL,
            base_constructor: Vec::new(),
        }
    }

    pub fn access(mut self, flags: u16) -> Self {
        self.access = flags;
        self
    }

    pub fn base_constructor(mut self, params: Vec<JType>) -> Self {
        self.base_constructor = params;
        self
    }
}

/// A generated class and the plan it was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Binary name.
    pub name: String,
    pub access: u16,
    /// Binary name of the base class, if the surface had one.
    pub base: Option<String>,
    /// Binary names of the implemented interfaces, dispatcher last.
    pub interfaces: Vec<String>,
    pub members: Vec<PlannedMember>,
    pub bytes: Vec<u8>,
}

impl GeneratedArtifact {
    /// Internal name, as used in class files.
    pub fn internal_name(&self) -> String {
        names::internal_name(&self.name)
    }
}

/// Generate one artifact. Nothing is returned unless every stage succeeds.
pub fn generate(spec: &ArtifactSpec<'_>, ctx: &GenerationContext) -> Result<GeneratedArtifact> {
    if !names::is_valid_binary_name(&spec.name) {
        return Err(GenerationError::InvalidSurface(format!(
            "invalid class name '{}'",
            spec.name
        )));
    }
    tracing::debug!(name = %spec.name, contracts = spec.surface.len(), "generating artifact");

    let plan = collect_dispatch_plan(spec.surface, ctx)?;

    let super_name = match plan.base {
        Some(base) => {
            if base.find_constructor(&spec.base_constructor).is_none() {
                return Err(GenerationError::InvalidSurface(format!(
                    "'{}' has no constructor taking ({})",
                    base.name,
                    join_types(&spec.base_constructor)
                )));
            }
            base.internal_name()
        }
        None if !spec.base_constructor.is_empty() => {
            return Err(GenerationError::InvalidSurface(
                "constructor arguments given without a base contract".to_owned(),
            ));
        }
        None => JAVA_LANG_OBJECT.to_owned(),
    };

    let bindings = &ctx.bindings;
    let mut interfaces: Vec<String> = spec.surface.interfaces().map(|c| c.internal_name()).collect();
    interfaces.push(bindings.dispatcher());

    let this_name = names::internal_name(&spec.name);
    let mut writer = ClassWriter::new(spec.access | access::SUPER, &this_name, &super_name, &interfaces)?;
    let shape = ClassShape {
        this_name: &this_name,
        super_name: &super_name,
        plan: &plan,
        bindings,
        base_constructor: &spec.base_constructor,
    };
    synth::synthesize(&shape, &mut writer)?;
    writer.set_source_file(SOURCE_FILE)?;
    writer.add_annotation(&bindings.marker_descriptor())?;
    let constants = writer.pool().count();
    let bytes = writer.to_bytes()?;

    tracing::debug!(
        name = %spec.name,
        members = plan.members.len(),
        constants,
        size = bytes.len(),
        "generated artifact"
    );

    Ok(GeneratedArtifact {
        name: spec.name.clone(),
        access: spec.access,
        base: plan.base.map(|b| b.name.clone()),
        interfaces: interfaces.iter().map(|i| names::binary_name(i)).collect(),
        members: plan.members,
        bytes,
    })
}

/// Class file bytes only, with the default context.
pub fn generate_bytes(name: &str, access: u16, surface: &CapabilitySurface) -> Result<Vec<u8>> {
    let spec = ArtifactSpec::new(name, surface).access(access);
    generate(&spec, &GenerationContext::default()).map(|a| a.bytes)
}

fn join_types(types: &[JType]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
