//! Facade configuration.

use interpose_gen::GenerationContext;

use crate::dump::DumpConfig;

pub const DEFAULT_PACKAGE: &str = "dev.interpose.proxy";
pub const DEFAULT_PREFIX: &str = "$Proxy";

/// Settings of a [`Proxies`](crate::Proxies) facade.
#[derive(Clone, Debug)]
pub struct ProxiesConfig {
    /// Package of artifacts whose contracts are all public.
    pub package: String,
    /// Simple-name prefix; a process-wide counter is appended.
    pub prefix: String,
    pub dump: DumpConfig,
    pub context: GenerationContext,
}

impl Default for ProxiesConfig {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_owned(),
            prefix: DEFAULT_PREFIX.to_owned(),
            dump: DumpConfig::default(),
            context: GenerationContext::default(),
        }
    }
}

impl ProxiesConfig {
    /// Defaults, with the dump settings read from the environment.
    pub fn from_env() -> Self {
        Self {
            dump: DumpConfig::from_env(),
            ..Self::default()
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_dump(mut self, dump: DumpConfig) -> Self {
        self.dump = dump;
        self
    }

    pub fn with_context(mut self, context: GenerationContext) -> Self {
        self.context = context;
        self
    }
}
