//! Host doubles and fixtures for facade tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use interpose_core::{CapabilitySurface, Contract, JType, MethodDecl};
use interpose_gen::{ArtifactSpec, GeneratedArtifact};
use parking_lot::Mutex;

use crate::error::{LoadError, ProxyError, Result};
use crate::host::{HostClass, HostInstance, Loader};
use crate::proxies::ArtifactFactory;

/// Records every class it is asked to define; optionally refuses all of them.
#[derive(Default)]
pub struct RecordingLoader {
    pub defined: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail: bool,
}

impl RecordingLoader {
    pub fn shared() -> Arc<dyn Loader> {
        Arc::new(Self::default())
    }

    pub fn names(&self) -> Vec<String> {
        self.defined.lock().iter().map(|(name, _)| name.clone()).collect()
    }
}

impl Loader for RecordingLoader {
    fn define_class(&self, name: &str, bytes: &[u8]) -> Result<(), LoadError> {
        if self.fail {
            return Err(LoadError::Linkage(format!("refusing {name}")));
        }
        self.defined.lock().push((name.to_owned(), bytes.to_vec()));
        Ok(())
    }
}

/// Counts calls and returns a bytes-free artifact; never touches the loader.
#[derive(Default)]
pub struct SpyFactory {
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
    pub fail_first: bool,
}

impl SpyFactory {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ArtifactFactory for SpyFactory {
    fn create(&self, _loader: &dyn Loader, spec: &ArtifactSpec<'_>) -> Result<GeneratedArtifact> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.fail_first && call == 0 {
            return Err(ProxyError::Load {
                name: spec.name.clone(),
                source: LoadError::Format("spy".to_owned()),
            });
        }
        let mut artifact = artifact(&spec.name);
        artifact.access = spec.access;
        Ok(artifact)
    }
}

pub fn artifact(name: &str) -> GeneratedArtifact {
    GeneratedArtifact {
        name: name.to_owned(),
        access: 0,
        base: None,
        interfaces: Vec::new(),
        members: Vec::new(),
        bytes: Vec::new(),
    }
}

#[derive(Clone, Debug, Default)]
pub struct FakeClass {
    pub name: String,
    pub interfaces: Vec<String>,
    pub annotations: Vec<String>,
}

impl HostClass for FakeClass {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn interfaces(&self) -> Vec<String> {
        self.interfaces.clone()
    }

    fn annotation_types(&self) -> Vec<String> {
        self.annotations.clone()
    }
}

/// An object whose reference fields are plain strings.
#[derive(Clone, Debug, Default)]
pub struct FakeInstance {
    pub class: FakeClass,
    pub fields: Vec<(String, String)>,
}

impl HostInstance for FakeInstance {
    type Class = FakeClass;
    type Ref = String;

    fn class(&self) -> FakeClass {
        self.class.clone()
    }

    fn reference_field(&self, name: &str) -> Option<String> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.clone())
    }
}

pub fn string() -> JType {
    JType::object("java.lang.String")
}

/// `interface Greeter { String greet(String); }`
pub fn greeter() -> Contract {
    Contract::interface("com.acme.Greeter").method(MethodDecl::new("greet", vec![string()], string()))
}

/// `interface Counter { int next(); }`
pub fn counter() -> Contract {
    Contract::interface("com.acme.Counter").method(MethodDecl::new("next", vec![], JType::Int))
}

/// `class Service { Service(); Service(String, long); void stop(); }`
pub fn service() -> Contract {
    Contract::class("com.acme.Service")
        .constructors(vec![vec![], vec![string(), JType::Long]])
        .method(MethodDecl::new("stop", vec![], JType::Void))
}

pub fn surface(contracts: Vec<Contract>) -> CapabilitySurface {
    CapabilitySurface::new(contracts)
}
