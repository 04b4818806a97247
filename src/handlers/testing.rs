//! In-memory handler for asserting on log output in tests

use super::{HandlerCore, ProcessingHandler};
use crate::core::{LogLevel, Record, Result};
use crate::formatters::LineFormatter;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Captured {
    records: Vec<Record>,
    batches: u64,
}

/// Handler that keeps every handled record in memory
///
/// Clones share the captured records, so a test keeps one clone and gives
/// the other to the logger.
#[derive(Clone)]
pub struct TestHandler {
    core: HandlerCore,
    captured: Arc<Mutex<Captured>>,
}

macro_rules! level_assertions {
    ($($has:ident, $has_containing:ident => $level:expr;)*) => {
        $(
            pub fn $has(&self, message: &str) -> bool {
                self.has(($level), message)
            }

            pub fn $has_containing(&self, needle: &str) -> bool {
                self.has_containing(($level), needle)
            }
        )*
    };
}

impl TestHandler {
    pub fn new() -> Self {
        Self {
            core: HandlerCore::new(LogLevel::Debug, Box::new(LineFormatter::new())),
            captured: Arc::new(Mutex::new(Captured::default())),
        }
    }

    /// Snapshot of the handled records, formatted, in handling order
    pub fn records(&self) -> Vec<Record> {
        self.captured.lock().records.clone()
    }

    pub fn has_records(&self) -> bool {
        !self.captured.lock().records.is_empty()
    }

    pub fn has_records_at(&self, level: LogLevel) -> bool {
        self.captured
            .lock()
            .records
            .iter()
            .any(|record| record.level() == level)
    }

    /// A record at `level` with exactly this message was handled
    pub fn has(&self, level: LogLevel, message: &str) -> bool {
        self.captured
            .lock()
            .records
            .iter()
            .any(|record| record.level() == level && record.message() == message)
    }

    pub fn has_containing(&self, level: LogLevel, needle: &str) -> bool {
        self.captured
            .lock()
            .records
            .iter()
            .any(|record| record.level() == level && record.message().contains(needle))
    }

    level_assertions! {
        has_debug, has_debug_containing => LogLevel::Debug;
        has_info, has_info_containing => LogLevel::Info;
        has_notice, has_notice_containing => LogLevel::Notice;
        has_warning, has_warning_containing => LogLevel::Warning;
        has_error, has_error_containing => LogLevel::Error;
        has_critical, has_critical_containing => LogLevel::Critical;
        has_alert, has_alert_containing => LogLevel::Alert;
        has_emergency, has_emergency_containing => LogLevel::Emergency;
    }

    /// Number of `handle_batch` deliveries received
    pub fn batch_count(&self) -> u64 {
        self.captured.lock().batches
    }

    pub fn clear(&self) {
        let mut captured = self.captured.lock();
        captured.records.clear();
        captured.batches = 0;
    }
}

impl Default for TestHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingHandler for TestHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn write(&mut self, record: &Record) -> Result<()> {
        self.captured.lock().records.push(record.clone());
        Ok(())
    }

    fn write_batch(&mut self, records: &[Record]) -> Result<()> {
        let mut captured = self.captured.lock();
        captured.records.extend_from_slice(records);
        captured.batches += 1;
        Ok(())
    }

    fn handler_name(&self) -> &str {
        "test"
    }
}
