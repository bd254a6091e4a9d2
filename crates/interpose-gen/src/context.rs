//! Generation configuration, passed explicitly through every stage.

use interpose_core::names;

/// Maps a member key (`name(descriptor)`) to its dispatch id.
pub type DispatchHasher = fn(&str) -> i32;

/// Names of the runtime types generated classes link against.
///
/// All four live in one package of the runtime library:
/// - `Interceptor`: `Object intercept(Object, MemberDescriptor, Object[]) throws Throwable`
/// - `MemberDescriptor`: `static of(Method, int)` and `int dispatchId()`
/// - `Dispatcher`: `Object dispatch(Object, MemberDescriptor, Object[]) throws Throwable`
/// - `Generated`: runtime-visible marker annotation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeBindings {
    /// Internal package prefix, e.g. `dev/interpose/runtime`.
    package: String,
}

impl Default for RuntimeBindings {
    fn default() -> Self {
        Self::new("dev.interpose.runtime")
    }
}

impl RuntimeBindings {
    /// `package` is a binary package name (`dev.interpose.runtime`).
    pub fn new(package: &str) -> Self {
        Self {
            package: names::internal_name(package),
        }
    }

    fn qualify(&self, simple: &str) -> String {
        if self.package.is_empty() {
            simple.to_owned()
        } else {
            format!("{}/{simple}", self.package)
        }
    }

    pub fn interceptor(&self) -> String {
        self.qualify("Interceptor")
    }

    pub fn member_descriptor(&self) -> String {
        self.qualify("MemberDescriptor")
    }

    pub fn dispatcher(&self) -> String {
        self.qualify("Dispatcher")
    }

    /// Field descriptor of the marker annotation type.
    pub fn marker_descriptor(&self) -> String {
        format!("L{};", self.qualify("Generated"))
    }

    /// `(Object, MemberDescriptor, Object[]) -> Object`, shared by
    /// `Interceptor.intercept` and `Dispatcher.dispatch`.
    pub fn call_descriptor(&self) -> String {
        format!(
            "(Ljava/lang/Object;L{};[Ljava/lang/Object;)Ljava/lang/Object;",
            self.member_descriptor()
        )
    }

    pub fn descriptor_factory_descriptor(&self) -> String {
        format!("(Ljava/lang/reflect/Method;I)L{};", self.member_descriptor())
    }
}

/// Explicit per-generation configuration.
///
/// Nothing here is mutated during generation, so one context can serve any
/// number of concurrent generations.
#[derive(Clone, Debug)]
pub struct GenerationContext {
    pub bindings: RuntimeBindings,
    pub hasher: DispatchHasher,
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self {
            bindings: RuntimeBindings::default(),
            hasher: crate::plan::dispatch_id,
        }
    }
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(mut self, bindings: RuntimeBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Replace the dispatch id hash (tests use this to force collisions).
    pub fn with_hasher(mut self, hasher: DispatchHasher) -> Self {
        self.hasher = hasher;
        self
    }
}
