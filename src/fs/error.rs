use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(&'static str),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// An on-disk record violates a layout invariant.
    #[error("corrupt disk image: {0}")]
    Corrupt(String),

    #[error("disk image i/o: {0}")]
    Io(#[from] std::io::Error),
}

impl FsError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        FsError::InvalidInput(msg.into())
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        FsError::NotFound(what.into())
    }
}

pub type Result<T> = std::result::Result<T, FsError>;
