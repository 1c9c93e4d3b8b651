//! Error types for the audio module

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a module operation.
///
/// `IllegalArgument` means the request itself is wrong and can be corrected
/// by the client. `IllegalState` means the request is well formed but
/// conflicts with the module's current state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),
}

impl ModuleError {
    pub fn illegal_argument(msg: impl Into<String>) -> Self {
        ModuleError::IllegalArgument(msg.into())
    }

    pub fn illegal_state(msg: impl Into<String>) -> Self {
        ModuleError::IllegalState(msg.into())
    }

    pub fn is_illegal_argument(&self) -> bool {
        matches!(self, ModuleError::IllegalArgument(_))
    }

    pub fn is_illegal_state(&self) -> bool {
        matches!(self, ModuleError::IllegalState(_))
    }

    /// Exception code name as reported to hosts
    pub fn code(&self) -> &'static str {
        match self {
            ModuleError::IllegalArgument(_) => "ILLEGAL_ARGUMENT",
            ModuleError::IllegalState(_) => "ILLEGAL_STATE",
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for module operations
pub type ModuleResult<T> = std::result::Result<T, ModuleError>;
