//! The host VM seam.
//!
//! The generator produces bytes; everything that needs a live JVM (defining
//! classes, reading fields of instances) goes through these traits.

use crate::error::LoadError;

/// A class loader on the host VM.
///
/// The identity cache holds loaders weakly: an artifact stays cached only as
/// long as someone else keeps its loader alive.
pub trait Loader: Send + Sync {
    /// Define a class from its binary name and class file bytes.
    fn define_class(&self, name: &str, bytes: &[u8]) -> Result<(), LoadError>;
}

/// Class-level metadata of a loaded class.
pub trait HostClass {
    /// Internal name (`com/acme/Foo`).
    fn name(&self) -> String;

    /// Internal names of the directly implemented interfaces.
    fn interfaces(&self) -> Vec<String>;

    /// Field descriptors of the runtime-visible annotations.
    fn annotation_types(&self) -> Vec<String>;
}

/// A live object on the host VM.
pub trait HostInstance {
    type Class: HostClass;
    /// Host reference type, e.g. a JNI global ref.
    type Ref;

    fn class(&self) -> Self::Class;

    /// Read a reference-typed instance field declared by the runtime class.
    fn reference_field(&self, name: &str) -> Option<Self::Ref>;
}
