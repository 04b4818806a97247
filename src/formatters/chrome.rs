//! Row formatter for the in-browser console bridge

use super::Formatter;
use crate::core::{Formatted, LogLevel, Record};
use serde_json::{json, Map, Value};

/// Placeholder used when a record carries no source location
pub const UNKNOWN_BACKTRACE: &str = "unknown";

/// Formats records as `[label, log, backtrace, type]` rows
///
/// - `label` is the record's channel
/// - `log` is the bare message, or `{"message", "context"?, "extra"?}` when
///   the record carries context or extra fields
/// - `backtrace` is `"<file> : <line>"` when `extra` holds both keys, which
///   are then left out of the emitted extra; otherwise `"unknown"`
/// - `type` is the console method the browser extension calls
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeFormatter;

impl ChromeFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Console method for a level
    pub fn console_type(level: LogLevel) -> &'static str {
        match level {
            LogLevel::Debug => "log",
            LogLevel::Info | LogLevel::Notice => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical | LogLevel::Alert | LogLevel::Emergency => "error",
        }
    }

    fn location(record: &Record) -> Option<String> {
        let extra = record.extra();
        match (extra.get("file"), extra.get("line")) {
            (Some(file), Some(line)) => Some(format!("{} : {}", file, line)),
            _ => None,
        }
    }

    pub fn row(&self, record: &Record) -> Value {
        let backtrace = Self::location(record);

        let extra: Map<String, Value> = record
            .extra()
            .fields()
            .iter()
            .filter(|(key, _)| backtrace.is_none() || !matches!(key.as_str(), "file" | "line"))
            .map(|(key, value)| (key.clone(), value.to_json_value()))
            .collect();

        let log = if record.context().is_empty() && extra.is_empty() {
            Value::String(record.message().to_string())
        } else {
            let mut message = Map::new();
            message.insert("message".into(), Value::String(record.message().to_string()));
            if !record.context().is_empty() {
                message.insert("context".into(), record.context().to_json_value());
            }
            if !extra.is_empty() {
                message.insert("extra".into(), Value::Object(extra));
            }
            Value::Object(message)
        };

        json!([
            record.channel(),
            log,
            backtrace.unwrap_or_else(|| UNKNOWN_BACKTRACE.to_string()),
            Self::console_type(record.level()),
        ])
    }
}

impl Formatter for ChromeFormatter {
    fn format(&self, record: &Record) -> Formatted {
        Formatted::Structured(self.row(record))
    }
}
