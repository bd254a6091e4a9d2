//! Recognizing generated artifacts and their instances.

use interpose_classfile::ClassFile;
use interpose_core::names;
use interpose_gen::RuntimeBindings;
use interpose_gen::synth::INTERCEPTOR_FIELD;

use crate::error::{ProxyError, Result};
use crate::host::{HostClass, HostInstance};

/// Marked with the provenance annotation and implementing the dispatcher.
pub fn is_generated_artifact(class: &impl HostClass, bindings: &RuntimeBindings) -> bool {
    let marker = bindings.marker_descriptor();
    let dispatcher = bindings.dispatcher();
    class.annotation_types().contains(&marker) && class.interfaces().contains(&dispatcher)
}

pub fn is_generated_instance(instance: &impl HostInstance, bindings: &RuntimeBindings) -> bool {
    is_generated_artifact(&instance.class(), bindings)
}

/// The interceptor an artifact instance was constructed with.
pub fn get_interceptor<I: HostInstance>(instance: &I, bindings: &RuntimeBindings) -> Result<I::Ref> {
    let class = instance.class();
    let not_an_artifact = || ProxyError::NotAnArtifact(names::binary_name(&class.name()));
    if !is_generated_artifact(&class, bindings) {
        return Err(not_an_artifact());
    }
    instance
        .reference_field(INTERCEPTOR_FIELD)
        .ok_or_else(not_an_artifact)
}

/// Parsed class files answer the class-level questions directly; malformed
/// constant references read as absent.
impl HostClass for ClassFile {
    fn name(&self) -> String {
        self.this_name().unwrap_or_default().to_owned()
    }

    fn interfaces(&self) -> Vec<String> {
        self.interface_names()
            .map(|names| names.into_iter().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    fn annotation_types(&self) -> Vec<String> {
        ClassFile::annotation_types(self)
            .map(|types| types.into_iter().map(str::to_owned).collect())
            .unwrap_or_default()
    }
}
