//! Core logger types and traits

pub mod error;
pub mod log_context;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod processor;
pub mod record;

pub use error::{LoggerError, Result};
pub use log_context::{encode_fallback_count, ContextGuard, FieldValue, LogContext, LoggerContext};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use processor::{Processor, ThreadProcessor};
pub use record::{Formatted, Record};
