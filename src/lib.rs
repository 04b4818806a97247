//! # Rust Log Pipeline
//!
//! A structured logging pipeline: records flow from a [`Logger`] through
//! processors and level-filtered handlers to their sinks.
//!
//! ## Features
//!
//! - **Structured records**: level, message, context, channel, timestamp and
//!   processor-filled extra data
//! - **Pluggable formatters**: line, JSON, logfmt and browser-console rows
//! - **Handlers**: console, file, socket, buffering, in-memory and a
//!   size-guarded browser console bridge
//! - **Thread safe**: a `Logger` is `Send + Sync`; shared delivery state is
//!   lock-protected
//!
//! ## Example
//!
//! ```
//! use rust_log_pipeline::prelude::*;
//! use rust_log_pipeline::handlers::TestHandler;
//!
//! let handler = TestHandler::new().with_level(LogLevel::Info);
//! let logger = Logger::builder()
//!     .channel("app")
//!     .handler(handler.clone())
//!     .build();
//!
//! logger.debug("not handled");
//! logger.warning("disk low");
//!
//! assert!(handler.has_warning("disk low"));
//! assert!(!handler.has_debug("not handled"));
//! ```

pub mod core;
pub mod formatters;
pub mod handlers;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        ContextGuard, FieldValue, Formatted, LogContext, LogLevel, Logger, LoggerBuilder,
        LoggerContext, LoggerError, LoggerMetrics, Processor, Record, Result, ThreadProcessor,
    };
    pub use crate::formatters::{
        ChromeFormatter, Formatter, JsonFormatter, LineFormatter, LogfmtFormatter, TimestampFormat,
    };
    #[cfg(feature = "console")]
    pub use crate::handlers::ConsoleHandler;
    pub use crate::handlers::{ChromeHandler, FileHandler, Handler, ProcessingHandler};
}

pub use crate::core::{
    encode_fallback_count, ContextGuard, FieldValue, Formatted, LogContext, LogLevel, Logger,
    LoggerBuilder, LoggerContext, LoggerError, LoggerMetrics, Processor, Record, Result,
    ThreadProcessor,
};
