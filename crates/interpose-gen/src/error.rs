//! Generation errors.

/// Errors that abort generation of an artifact.
///
/// Generation never returns a partial artifact: any of these leaves nothing
/// behind for a cache to install.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid capability surface: {0}")]
    InvalidSurface(String),

    #[error("dispatch id collision: '{first}' and '{second}' both hash to {id}")]
    DispatchIdCollision {
        first: String,
        second: String,
        id: i32,
    },

    #[error("too many constant pool entries: {0} (max 65535)")]
    TooManyConstants(usize),

    #[error("too many {what}: {count} (max 65535)")]
    TooMany { what: &'static str, count: usize },

    #[error("code of {method} is {size} bytes (max 65535)")]
    CodeTooLarge { method: String, size: usize },

    #[error("branch in {method} at offset {offset} does not fit in 16 bits")]
    BranchOutOfRange { method: String, offset: u32 },

    #[error("invalid code in {method}: {reason}")]
    InvalidCode { method: String, reason: String },
}

pub type Result<T, E = GenerationError> = std::result::Result<T, E>;
