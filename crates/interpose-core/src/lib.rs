#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for interpose.
//!
//! Three layers:
//! - **Types**: JVM field types with descriptor and source-style renderings
//! - **Members**: method signatures and declarations, keyed by structural identity
//! - **Surfaces**: the ordered contract list a generated class must satisfy

pub mod colors;
pub mod member;
pub mod names;
pub mod surface;
pub mod types;

pub use colors::Colors;
pub use member::{MemberSig, MethodDecl, Visibility};
pub use surface::{CapabilitySurface, Contract, ContractKind};
pub use types::{JType, TypeParseError};

#[cfg(test)]
mod names_tests;
#[cfg(test)]
mod surface_tests;
