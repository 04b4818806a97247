//! Handler implementations
//!
//! A [`Handler`] consumes records, singly or in batches, and delivers them
//! to one sink. Most handlers are built on [`ProcessingHandler`], which takes
//! care of level filtering, processors and formatting so that the concrete
//! type only writes already-formatted records.

pub mod buffer;
pub mod chrome;
#[cfg(feature = "console")]
pub mod console;
pub mod overflow;
#[cfg(feature = "network")]
pub mod socket;
pub mod state;
pub mod stream;
pub mod testing;

pub use buffer::{BufferHandler, BufferOverflow};
pub use chrome::{ChromeHandler, ChromeHandlerConfig, ChromePayload, ChromeTransport, HeaderCollector};
#[cfg(feature = "console")]
pub use console::ConsoleHandler;
pub use overflow::OverflowGuard;
#[cfg(feature = "network")]
pub use socket::SocketHandler;
pub use state::{DeliveryRegistry, DeliverySlot, DeliveryState};
pub use stream::FileHandler;
pub use testing::TestHandler;

use crate::core::{LogLevel, Processor, Record, Result};
use crate::formatters::Formatter;
use std::sync::Arc;

pub trait Handler: Send + Sync {
    /// Whether a record at `level` would be accepted
    fn is_handling(&self, level: LogLevel) -> bool;

    /// Handle one record
    ///
    /// Returns `Ok(false)` without side effects when the record is below the
    /// handler's level, `Ok(true)` once it has been processed and delivered.
    fn handle(&mut self, record: &Record) -> Result<bool>;

    /// Handle an ordered batch of records
    fn handle_batch(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            self.handle(record)?;
        }
        Ok(())
    }

    /// Whether records this handler handled continue to later handlers
    fn bubble(&self) -> bool {
        true
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

/// Level, bubbling, formatter and processors shared by processing handlers
///
/// Clones share the formatter and processors.
#[derive(Clone)]
pub struct HandlerCore {
    level: LogLevel,
    bubble: bool,
    formatter: Arc<dyn Formatter>,
    processors: Vec<Arc<dyn Processor>>,
}

impl HandlerCore {
    pub fn new(level: LogLevel, formatter: Box<dyn Formatter>) -> Self {
        Self {
            level,
            bubble: true,
            formatter: Arc::from(formatter),
            processors: Vec::new(),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    pub fn bubble(&self) -> bool {
        self.bubble
    }

    pub fn set_bubble(&mut self, bubble: bool) {
        self.bubble = bubble;
    }

    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    pub fn set_formatter(&mut self, formatter: Box<dyn Formatter>) {
        self.formatter = Arc::from(formatter);
    }

    pub fn push_processor(&mut self, processor: Box<dyn Processor>) {
        self.processors.push(Arc::from(processor));
    }

    #[inline]
    pub fn is_handling(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    /// Run this handler's processors on a fresh copy of `record`
    pub fn process(&self, record: &Record) -> Record {
        self.processors
            .iter()
            .fold(record.unformatted(), |record, processor| processor.process(record))
    }

    /// Process and format one record
    pub fn prepare(&self, record: &Record) -> Record {
        let record = self.process(record);
        record.set_formatted(self.formatter.format(&record));
        record
    }

    /// Filter, process and format a batch with a single `format_batch` call
    pub fn prepare_batch(&self, records: &[Record]) -> Vec<Record> {
        let accepted: Vec<Record> = records
            .iter()
            .filter(|record| self.is_handling(record.level()))
            .map(|record| self.process(record))
            .collect();

        if accepted.is_empty() {
            return accepted;
        }

        for (record, formatted) in accepted.iter().zip(self.formatter.format_batch(&accepted)) {
            record.set_formatted(formatted);
        }
        accepted
    }
}

/// Handlers that write processed, formatted records
///
/// Implementors get [`Handler`] for free: records below the level are
/// rejected, the rest go through the handler's processors and formatter and
/// reach [`ProcessingHandler::write`] with `formatted` populated.
pub trait ProcessingHandler: Send + Sync {
    fn core(&self) -> &HandlerCore;

    fn core_mut(&mut self) -> &mut HandlerCore;

    fn write(&mut self, record: &Record) -> Result<()>;

    /// Write an already filtered, non-empty batch
    fn write_batch(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }

    fn flush_output(&mut self) -> Result<()> {
        Ok(())
    }

    fn handler_name(&self) -> &str;

    #[must_use]
    fn with_level(mut self, level: LogLevel) -> Self
    where
        Self: Sized,
    {
        self.core_mut().set_level(level);
        self
    }

    #[must_use]
    fn with_bubble(mut self, bubble: bool) -> Self
    where
        Self: Sized,
    {
        self.core_mut().set_bubble(bubble);
        self
    }

    #[must_use]
    fn with_formatter<F: Formatter + 'static>(mut self, formatter: F) -> Self
    where
        Self: Sized,
    {
        self.core_mut().set_formatter(Box::new(formatter));
        self
    }

    #[must_use]
    fn with_processor<P: Processor + 'static>(mut self, processor: P) -> Self
    where
        Self: Sized,
    {
        self.core_mut().push_processor(Box::new(processor));
        self
    }
}

impl<T: ProcessingHandler> Handler for T {
    fn is_handling(&self, level: LogLevel) -> bool {
        self.core().is_handling(level)
    }

    fn handle(&mut self, record: &Record) -> Result<bool> {
        if !self.core().is_handling(record.level()) {
            return Ok(false);
        }

        let record = self.core().prepare(record);
        self.write(&record)?;
        Ok(true)
    }

    fn handle_batch(&mut self, records: &[Record]) -> Result<()> {
        let prepared = self.core().prepare_batch(records);
        if prepared.is_empty() {
            return Ok(());
        }
        self.write_batch(&prepared)
    }

    fn bubble(&self) -> bool {
        self.core().bubble()
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_output()
    }

    fn name(&self) -> &str {
        self.handler_name()
    }
}
