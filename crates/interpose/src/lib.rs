//! Interception proxies for the JVM.
//!
//! A [`Proxies`] facade validates a capability surface, names the artifact,
//! and hands generation to the [`IdentityCache`], which guarantees at most one
//! generation per (loader, surface, constructor arguments). The class bytes
//! come from `interpose-gen`; defining them is the job of the host [`Loader`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use interpose::{LoadError, Loader, Proxies};
//! use interpose_core::{CapabilitySurface, Contract, JType, MethodDecl};
//!
//! struct Discard;
//!
//! impl Loader for Discard {
//!     fn define_class(&self, _name: &str, _bytes: &[u8]) -> Result<(), LoadError> {
//!         Ok(())
//!     }
//! }
//!
//! let surface = CapabilitySurface::new(vec![
//!     Contract::interface("com.acme.Greeter")
//!         .method(MethodDecl::new("greet", vec![], JType::Void)),
//! ]);
//! let loader: Arc<dyn Loader> = Arc::new(Discard);
//! let proxies = Proxies::default();
//! let first = proxies.get_or_create(&loader, &surface, &[]).unwrap();
//! let second = proxies.get_or_create(&loader, &surface, &[]).unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod cache;
pub mod config;
pub mod dump;
pub mod error;
pub mod host;
pub mod introspect;
pub mod proxies;
pub mod request;

pub use cache::{ArtifactHandle, IdentityCache};
pub use config::ProxiesConfig;
pub use dump::DumpConfig;
pub use error::{LoadError, ProxyError, Result};
pub use host::{HostClass, HostInstance, Loader};
pub use introspect::{get_interceptor, is_generated_artifact, is_generated_instance};
pub use proxies::{ArtifactFactory, Assembler, Proxies};
pub use request::{Placement, validate};

#[cfg(test)]
mod cache_tests;
#[cfg(test)]
mod introspect_tests;
#[cfg(test)]
mod request_tests;
#[cfg(test)]
mod test_utils;
