pub mod dump;
pub mod generate;
pub mod plan;
pub mod surface_loader;


use std::path::PathBuf;

use interpose::ProxyError;
use interpose_classfile::ClassFileError;
use interpose_core::TypeParseError;
use interpose_gen::GenerationError;

/// Everything a command can fail with; printed as `error: ...`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid surface in '{}': {source}", path.display())]
    Surface {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid constructor argument type '{text}': {source}")]
    CtorArg {
        text: String,
        source: TypeParseError,
    },

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("malformed class file: {0}")]
    ClassFile(#[from] ClassFileError),
}
