//! The proxy facade.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use interpose_core::{CapabilitySurface, JType, names};
use interpose_gen::{ArtifactSpec, GeneratedArtifact, GenerationContext};

use crate::cache::{ArtifactHandle, IdentityCache};
use crate::config::ProxiesConfig;
use crate::dump::DumpConfig;
use crate::error::{ProxyError, Result};
use crate::host::{HostClass, HostInstance, Loader};
use crate::introspect;
use crate::request::{Placement, validate};

/// Suffix of the next artifact name, shared by every facade in the process.
static NEXT_ARTIFACT: AtomicU64 = AtomicU64::new(0);

/// Turns a validated request into a defined artifact.
///
/// Called by the cache on a miss, at most once per key at a time.
pub trait ArtifactFactory: Send + Sync {
    fn create(&self, loader: &dyn Loader, spec: &ArtifactSpec<'_>) -> Result<GeneratedArtifact>;
}

/// Default factory: generate, optionally dump, define.
#[derive(Clone, Debug, Default)]
pub struct Assembler {
    context: GenerationContext,
    dump: DumpConfig,
}

impl Assembler {
    pub fn new(context: GenerationContext, dump: DumpConfig) -> Self {
        Self { context, dump }
    }
}

impl ArtifactFactory for Assembler {
    fn create(&self, loader: &dyn Loader, spec: &ArtifactSpec<'_>) -> Result<GeneratedArtifact> {
        let artifact = interpose_gen::generate(spec, &self.context)?;
        self.dump.write(&artifact);
        loader
            .define_class(&artifact.name, &artifact.bytes)
            .map_err(|source| ProxyError::Load {
                name: artifact.name.clone(),
                source,
            })?;
        tracing::debug!(name = %artifact.name, "artifact defined");
        Ok(artifact)
    }
}

/// Validating, caching front door for proxy generation.
pub struct Proxies<F = Assembler> {
    config: ProxiesConfig,
    cache: IdentityCache,
    factory: F,
}

impl Default for Proxies {
    fn default() -> Self {
        Self::new(ProxiesConfig::default())
    }
}

impl Proxies {
    pub fn new(config: ProxiesConfig) -> Self {
        let factory = Assembler::new(config.context.clone(), config.dump.clone());
        Self::with_factory(config, factory)
    }
}

impl<F: ArtifactFactory> Proxies<F> {
    pub fn with_factory(config: ProxiesConfig, factory: F) -> Self {
        Self {
            config,
            cache: IdentityCache::new(),
            factory,
        }
    }

    pub fn config(&self) -> &ProxiesConfig {
        &self.config
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The artifact implementing `surface` in `loader`, generated on first use.
    ///
    /// `ctor_args` selects the base constructor the artifact forwards to; it
    /// is part of the cache key.
    pub fn get_or_create(
        &self,
        loader: &Arc<dyn Loader>,
        surface: &CapabilitySurface,
        ctor_args: &[JType],
    ) -> Result<ArtifactHandle> {
        let placement = validate(surface, ctor_args)?;
        self.cache.get_or_create(loader, surface, ctor_args, || {
            let spec = ArtifactSpec::new(self.next_name(&placement), surface)
                .access(placement.access)
                .base_constructor(ctor_args.to_vec());
            let artifact = self.factory.create(loader.as_ref(), &spec)?;
            Ok(Arc::new(artifact))
        })
    }

    /// `<package>.<prefix><n>`, with `n` drawn from a process-wide counter.
    pub fn next_name(&self, placement: &Placement) -> String {
        let id = NEXT_ARTIFACT.fetch_add(1, Ordering::Relaxed);
        let package = placement.package.as_deref().unwrap_or(&self.config.package);
        names::qualify(package, &format!("{}{id}", self.config.prefix))
    }

    pub fn is_generated_artifact(&self, class: &impl HostClass) -> bool {
        introspect::is_generated_artifact(class, &self.config.context.bindings)
    }

    pub fn is_generated_instance(&self, instance: &impl HostInstance) -> bool {
        introspect::is_generated_instance(instance, &self.config.context.bindings)
    }

    pub fn get_interceptor<I: HostInstance>(&self, instance: &I) -> Result<I::Ref> {
        introspect::get_interceptor(instance, &self.config.context.bindings)
    }
}
