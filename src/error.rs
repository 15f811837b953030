use thiserror::Error;

pub type Result<T> = std::result::Result<T, MiphyError>;

/// Coarse classification used by callers (and the CLI exit code) to tell
/// bad input apart from API misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Runtime,
    Io,
}

#[derive(Debug, Error)]
pub enum MiphyError {
    #[error("could not parse tree: {0}")]
    Parse(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Runtime(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("coordinate store error: {0}")]
    Store(String),
}

impl MiphyError {
    pub fn validation(msg: impl Into<String>) -> Self {
        MiphyError::Validation(msg.into())
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        MiphyError::Runtime(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        MiphyError::Parse(msg.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MiphyError::Parse(_) | MiphyError::Validation(_) => ErrorCategory::Validation,
            MiphyError::Runtime(_) => ErrorCategory::Runtime,
            MiphyError::Io(_) | MiphyError::Store(_) => ErrorCategory::Io,
        }
    }
}

impl From<bincode::Error> for MiphyError {
    fn from(err: bincode::Error) -> Self {
        MiphyError::Store(err.to_string())
    }
}
