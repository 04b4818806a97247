//! Log record structure

use super::log_context::{FieldValue, LogContext};
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

/// Output of a formatter for one record
#[derive(Debug, Clone, PartialEq)]
pub enum Formatted {
    /// Line-oriented output (console, files, sockets)
    Text(String),
    /// Structured output (JSON documents, console-bridge rows)
    Structured(serde_json::Value),
}

impl Formatted {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Formatted::Text(s) => Some(s),
            Formatted::Structured(_) => None,
        }
    }

    /// Render as a single string regardless of shape
    pub fn to_text(&self) -> String {
        match self {
            Formatted::Text(s) => s.clone(),
            Formatted::Structured(v) => v.to_string(),
        }
    }

    pub fn into_json(self) -> serde_json::Value {
        match self {
            Formatted::Text(s) => serde_json::Value::String(s),
            Formatted::Structured(v) => v,
        }
    }
}

/// One structured log event
///
/// A record is built and enriched as an owned value (constructor, builder
/// methods, processors). Once handed out by reference it only changes
/// through the one-time [`Record::set_formatted`].
#[derive(Debug, Clone)]
pub struct Record {
    level: LogLevel,
    message: String,
    context: LogContext,
    channel: String,
    datetime: DateTime<Utc>,
    extra: LogContext,
    formatted: OnceCell<Formatted>,
}

impl Record {
    pub fn new(level: LogLevel, message: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            context: LogContext::new(),
            channel: channel.into(),
            datetime: Utc::now(),
            extra: LogContext::new(),
            formatted: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: LogContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_extra<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.extra.add_field(key, value);
        self
    }

    /// Attach the source location to `extra` as `file` and `line`
    #[must_use]
    pub fn with_location(self, file: &str, line: u32) -> Self {
        self.with_extra("file", file).with_extra("line", line)
    }

    #[must_use]
    pub fn with_datetime(mut self, datetime: DateTime<Utc>) -> Self {
        self.datetime = datetime;
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn level_name(&self) -> &'static str {
        self.level.to_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &LogContext {
        &self.context
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn datetime(&self) -> &DateTime<Utc> {
        &self.datetime
    }

    pub fn extra(&self) -> &LogContext {
        &self.extra
    }

    /// Mutable access to `extra`, for processors working on an owned record
    pub fn extra_mut(&mut self) -> &mut LogContext {
        &mut self.extra
    }

    pub fn formatted(&self) -> Option<&Formatted> {
        self.formatted.get()
    }

    /// Store the formatter output
    ///
    /// Only the first call wins; returns `false` if the slot was already set.
    pub fn set_formatted(&self, formatted: Formatted) -> bool {
        self.formatted.set(formatted).is_ok()
    }

    /// Copy of this record with an empty `formatted` slot
    ///
    /// Each handler formats its own copy so that handlers with different
    /// formatters never observe each other's output.
    pub fn unformatted(&self) -> Self {
        Self {
            formatted: OnceCell::new(),
            ..self.clone()
        }
    }
}
