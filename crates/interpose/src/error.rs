//! Facade errors.

use interpose_gen::GenerationError;

/// Failure reported by a host loader while defining a class.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("class '{0}' is already defined")]
    Duplicate(String),

    #[error("class format error: {0}")]
    Format(String),

    #[error("linkage error: {0}")]
    Linkage(String),
}

/// Errors returned by the proxy facade.
///
/// Request validation errors are reported before any generation work starts.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    #[error("capability surface is empty")]
    EmptySurface,

    #[error("contract '{0}' is listed more than once")]
    DuplicateContract(String),

    #[error("more than one base contract: '{first}' and '{second}'")]
    MultipleBaseContracts { first: String, second: String },

    #[error("base contract '{0}' is final or private and cannot be extended")]
    BaseNotExtensible(String),

    #[error("base contract '{0}' is abstract")]
    AbstractBase(String),

    #[error("'{base}' has no constructor taking ({args})")]
    NoMatchingConstructor { base: String, args: String },

    #[error("constructor arguments given but the surface has no base contract")]
    UnexpectedConstructorArgs,

    #[error("too many contracts: {0} (max 65535)")]
    TooManyContracts(usize),

    #[error("non-public contracts from different packages: '{first}' and '{second}'")]
    MixedPackages { first: String, second: String },

    #[error("not a generated artifact: '{0}'")]
    NotAnArtifact(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("failed to define '{name}': {source}")]
    Load {
        name: String,
        #[source]
        source: LoadError,
    },
}

pub type Result<T, E = ProxyError> = std::result::Result<T, E>;
