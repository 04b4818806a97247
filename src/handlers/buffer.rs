//! Buffering wrapper handler

use super::Handler;
use crate::core::{LogLevel, Record, Result};
use std::collections::VecDeque;

/// What happens when a bounded buffer is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferOverflow {
    /// Hand the buffered records to the inner handler, then keep buffering
    #[default]
    Flush,
    /// Discard the oldest buffered record
    DropOldest,
}

/// Collects records and delivers them to the wrapped handler in one batch
///
/// Records are passed on with a single `handle_batch` call when the buffer
/// is flushed, either explicitly or when the handler is dropped.
///
/// # Example
///
/// ```
/// use rust_log_pipeline::handlers::{BufferHandler, Handler, TestHandler};
/// use rust_log_pipeline::{LogLevel, Record};
///
/// let inner = TestHandler::new();
/// let mut buffer = BufferHandler::new(Box::new(inner.clone()));
///
/// buffer.handle(&Record::new(LogLevel::Info, "queued", "app"))?;
/// assert!(!inner.has_records());
///
/// buffer.flush()?;
/// assert!(inner.has_info("queued"));
/// # Ok::<(), rust_log_pipeline::LoggerError>(())
/// ```
pub struct BufferHandler {
    inner: Box<dyn Handler>,
    buffer: VecDeque<Record>,
    level: LogLevel,
    bubble: bool,
    buffer_limit: usize,
    overflow: BufferOverflow,
    dropped: u64,
}

impl BufferHandler {
    /// Unbounded buffer in front of `inner`
    pub fn new(inner: Box<dyn Handler>) -> Self {
        Self {
            inner,
            buffer: VecDeque::new(),
            level: LogLevel::Debug,
            bubble: true,
            buffer_limit: 0,
            overflow: BufferOverflow::default(),
            dropped: 0,
        }
    }

    /// Bound the buffer to `limit` records (0 means unbounded)
    #[must_use]
    pub fn with_limit(mut self, limit: usize, overflow: BufferOverflow) -> Self {
        self.buffer_limit = limit;
        self.overflow = overflow;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_bubble(mut self, bubble: bool) -> Self {
        self.bubble = bubble;
        self
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Records discarded because the buffer was full or the inner handler
    /// rejected a flushed batch
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Deliver buffered records without flushing the inner handler
    ///
    /// If the inner handler fails, the batch is counted in [`dropped`].
    ///
    /// [`dropped`]: BufferHandler::dropped
    pub fn flush_buffer(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let records: Vec<Record> = self.buffer.drain(..).collect();
        let result = self.inner.handle_batch(&records);
        if result.is_err() {
            self.dropped += records.len() as u64;
        }
        result
    }

    /// Discard buffered records without delivering them
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    fn make_room(&mut self) -> Result<()> {
        if self.buffer_limit == 0 || self.buffer.len() < self.buffer_limit {
            return Ok(());
        }

        match self.overflow {
            BufferOverflow::Flush => self.flush_buffer(),
            BufferOverflow::DropOldest => {
                self.buffer.pop_front();
                self.dropped += 1;
                Ok(())
            }
        }
    }
}

impl Handler for BufferHandler {
    fn is_handling(&self, level: LogLevel) -> bool {
        level >= self.level && self.inner.is_handling(level)
    }

    fn handle(&mut self, record: &Record) -> Result<bool> {
        if !self.is_handling(record.level()) {
            return Ok(false);
        }

        if let Err(e) = self.make_room() {
            eprintln!(
                "[LOGGER ERROR] Buffered records lost while making room ({} dropped so far): {}",
                self.dropped, e
            );
        }
        self.buffer.push_back(record.unformatted());
        Ok(true)
    }

    fn handle_batch(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            self.handle(record)?;
        }
        Ok(())
    }

    fn bubble(&self) -> bool {
        self.bubble
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_buffer()?;
        self.inner.flush()
    }

    fn name(&self) -> &str {
        "buffer"
    }
}

impl Drop for BufferHandler {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush buffered records: {}", e);
        }
    }
}
