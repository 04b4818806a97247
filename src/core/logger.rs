//! Main logger implementation

use super::{
    error::{LoggerError, Result},
    log_context::LogContext,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    processor::Processor,
    record::Record,
};
use crate::handlers::Handler;
use parking_lot::RwLock;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// A named channel dispatching records to an ordered stack of handlers
///
/// Handlers run in registration order. A handler that handles a record and
/// does not bubble stops the record from reaching later handlers.
///
/// # Example
///
/// ```
/// use rust_log_pipeline::handlers::TestHandler;
/// use rust_log_pipeline::{LogContext, Logger};
///
/// let handler = TestHandler::new();
/// let mut logger = Logger::new("billing");
/// logger.add_handler(Box::new(handler.clone()));
///
/// logger.warning_with_context(
///     "invoice overdue",
///     LogContext::new().with_field("invoice", 42),
/// );
/// assert!(handler.has_warning("invoice overdue"));
/// ```
pub struct Logger {
    channel: String,
    handlers: RwLock<Vec<Box<dyn Handler>>>,
    processors: Vec<Box<dyn Processor>>,
    /// Metrics for observability (dropped count, total logged, etc.)
    metrics: Arc<LoggerMetrics>,
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl Logger {
    #[must_use]
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            handlers: RwLock::new(Vec::new()),
            processors: Vec::new(),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn add_handler(&mut self, handler: Box<dyn Handler>) {
        self.handlers.write().push(handler);
    }

    /// Remove the most recently registered handler
    ///
    /// # Errors
    ///
    /// `LoggerError::EmptyHandlerStack` when no handler is registered
    pub fn remove_handler(&mut self) -> Result<Box<dyn Handler>> {
        self.handlers
            .write()
            .pop()
            .ok_or(LoggerError::EmptyHandlerStack)
    }

    pub fn handlers_len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Add a processor run on every record before any handler sees it
    pub fn add_processor(&mut self, processor: Box<dyn Processor>) {
        self.processors.push(processor);
    }

    /// Whether any registered handler would accept a record at `level`
    pub fn is_handling(&self, level: LogLevel) -> bool {
        self.handlers
            .read()
            .iter()
            .any(|handler| handler.is_handling(level))
    }

    /// Build a record stamped with this logger's channel
    pub fn record(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        context: LogContext,
    ) -> Record {
        Record::new(level, message, self.channel.as_str()).with_context(context)
    }

    /// Log a message; returns whether any handler handled it
    pub fn log(&self, level: LogLevel, message: impl Into<String>) -> bool {
        self.log_with_context(level, message, LogContext::new())
    }

    /// Log with structured context fields
    pub fn log_with_context(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        context: LogContext,
    ) -> bool {
        if !self.is_handling(level) {
            return false;
        }

        let record = self.record(level, message, context);
        self.dispatch(self.process(record))
    }

    /// Log with the source location recorded in `extra`, used by the macros
    pub fn log_with_location(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        file: &str,
        line: u32,
    ) -> bool {
        if !self.is_handling(level) {
            return false;
        }

        let record = Record::new(level, message, self.channel.as_str()).with_location(file, line);
        self.dispatch(self.process(record))
    }

    /// Dispatch a batch of records to every handler's `handle_batch`
    ///
    /// Logger processors run once per record. Bubbling does not apply to
    /// batches: every handler receives the whole batch.
    pub fn log_batch(&self, records: &[Record]) {
        if records.is_empty() {
            return;
        }

        let processed: Vec<Record> = records
            .iter()
            .map(|record| self.process(record.unformatted()))
            .collect();

        let mut handlers = self.handlers.write();
        let mut has_error = false;

        for (idx, handler) in handlers.iter_mut().enumerate() {
            let result = catch_unwind(AssertUnwindSafe(|| handler.handle_batch(&processed)));

            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Handler #{} ({}) failed on batch: {}",
                        idx,
                        handler.name(),
                        e
                    );
                    has_error = true;
                }
                Err(panic_info) => {
                    self.metrics.record_panic();
                    eprintln!(
                        "[LOGGER CRITICAL] Handler #{} panicked on batch: {}. \
                         Other handlers continue to function.",
                        idx,
                        panic_message(panic_info.as_ref())
                    );
                    has_error = true;
                }
            }
        }

        self.metrics.record_batch();
        if has_error {
            self.metrics.record_dropped();
        }
    }

    fn process(&self, record: Record) -> Record {
        self.processors
            .iter()
            .fold(record, |record, processor| processor.process(record))
    }

    /// Hand a record to the handlers with per-handler panic isolation
    fn dispatch(&self, record: Record) -> bool {
        let mut handlers = self.handlers.write();
        let mut handled = false;
        let mut has_error = false;

        for (idx, handler) in handlers.iter_mut().enumerate() {
            let result = catch_unwind(AssertUnwindSafe(|| handler.handle(&record)));

            match result {
                Ok(Ok(true)) => {
                    handled = true;
                    if !handler.bubble() {
                        break;
                    }
                }
                Ok(Ok(false)) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Handler #{} ({}) failed: {}",
                        idx,
                        handler.name(),
                        e
                    );
                    has_error = true;
                }
                Err(panic_info) => {
                    self.metrics.record_panic();
                    eprintln!(
                        "[LOGGER CRITICAL] Handler #{} panicked: {}. \
                         Other handlers continue to function.",
                        idx,
                        panic_message(panic_info.as_ref())
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            self.metrics.record_dropped();
        } else if handled {
            self.metrics.record_logged();
        } else {
            self.metrics.record_unhandled();
        }

        handled
    }

    /// Get the logger metrics for detailed observability
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Flush every handler
    ///
    /// All handlers are flushed even if one fails; the first error is
    /// returned.
    pub fn flush(&self) -> Result<()> {
        let mut handlers = self.handlers.write();
        let mut first_error = None;

        for handler in handlers.iter_mut() {
            if let Err(e) = handler.flush() {
                eprintln!("[LOGGER ERROR] Handler {} flush failed: {}", handler.name(), e);
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) -> bool {
        self.log(LogLevel::Debug, message)
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) -> bool {
        self.log(LogLevel::Info, message)
    }

    #[inline]
    pub fn notice(&self, message: impl Into<String>) -> bool {
        self.log(LogLevel::Notice, message)
    }

    #[inline]
    pub fn warning(&self, message: impl Into<String>) -> bool {
        self.log(LogLevel::Warning, message)
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) -> bool {
        self.log(LogLevel::Error, message)
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>) -> bool {
        self.log(LogLevel::Critical, message)
    }

    #[inline]
    pub fn alert(&self, message: impl Into<String>) -> bool {
        self.log(LogLevel::Alert, message)
    }

    #[inline]
    pub fn emergency(&self, message: impl Into<String>) -> bool {
        self.log(LogLevel::Emergency, message)
    }

    /// Helper for structured info logging
    pub fn info_with_context(&self, message: impl Into<String>, context: LogContext) -> bool {
        self.log_with_context(LogLevel::Info, message, context)
    }

    /// Helper for structured warning logging
    pub fn warning_with_context(&self, message: impl Into<String>, context: LogContext) -> bool {
        self.log_with_context(LogLevel::Warning, message, context)
    }

    /// Helper for structured error logging
    pub fn error_with_context(&self, message: impl Into<String>, context: LogContext) -> bool {
        self.log_with_context(LogLevel::Error, message, context)
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_log_pipeline::handlers::TestHandler;
    /// use rust_log_pipeline::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .channel("worker")
    ///     .handler(TestHandler::new())
    ///     .processor(ThreadProcessor)
    ///     .build();
    ///
    /// assert_eq!(logger.channel(), "worker");
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }

        // Report any dropped logs
        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger '{}' shutting down with {} dropped logs (drop rate: {:.2}%)",
                self.channel,
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Builder for constructing Logger with a fluent API
pub struct LoggerBuilder {
    channel: String,
    handlers: Vec<Box<dyn Handler>>,
    processors: Vec<Box<dyn Processor>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            channel: "app".to_string(),
            handlers: Vec::new(),
            processors: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Add a handler; handlers run in the order they are added
    #[must_use = "builder methods return a new value"]
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn processor<P: Processor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let mut logger = Logger::new(self.channel);
        for handler in self.handlers {
            logger.add_handler(handler);
        }
        for processor in self.processors {
            logger.add_processor(processor);
        }
        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
