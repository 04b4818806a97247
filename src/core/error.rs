//! Error types for the logging pipeline
//!
//! Only programming errors against the logging API (undefined levels,
//! invalid configuration, popping an empty handler stack) are meant to reach
//! application code. Delivery failures are absorbed by the [`Logger`].
//!
//! [`Logger`]: crate::core::Logger

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Numeric level that has no canonical name
    #[error("Level {0} is not defined, use one of: 100, 200, 250, 300, 400, 500, 550, 600")]
    UndefinedLevel(u16),

    /// Level name that does not parse
    #[error("Invalid log level: '{0}'")]
    InvalidLevelName(String),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Tried to remove a handler from a logger that has none
    #[error("Tried to remove a handler from an empty handler stack")]
    EmptyHandlerStack,

    /// File handler error with path
    #[error("File handler error for '{path}': {message}")]
    FileHandlerError { path: String, message: String },

    /// File lock error
    #[error("Failed to acquire file lock on '{path}'")]
    FileLockError { path: String },

    /// Transport rejected or failed a delivery
    #[error("Transport error ({transport}): {message}")]
    TransportError { transport: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file handler error
    pub fn file_handler(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileHandlerError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file lock error
    pub fn file_lock(path: impl Into<String>) -> Self {
        LoggerError::FileLockError { path: path.into() }
    }

    /// Create a transport error
    pub fn transport(transport: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::TransportError {
            transport: transport.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// True for errors that signal misuse of the logging API itself
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            LoggerError::UndefinedLevel(_)
                | LoggerError::InvalidLevelName(_)
                | LoggerError::InvalidConfiguration { .. }
                | LoggerError::EmptyHandlerStack
        )
    }
}
