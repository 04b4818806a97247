//! Human-readable single-line formatter

use super::{escape_line_breaks, Formatter, TimestampFormat};
use crate::core::{Formatted, LogContext, Record};

/// Formats records as `[timestamp] channel.LEVEL: message {context} {extra}`
///
/// # Example
///
/// ```
/// use rust_log_pipeline::formatters::{Formatter, LineFormatter};
/// use rust_log_pipeline::{LogLevel, Record};
///
/// let line = LineFormatter::new().format(&Record::new(LogLevel::Info, "ready", "app"));
/// assert!(line.to_text().contains("app.INFO: ready"));
/// ```
#[derive(Debug, Clone)]
pub struct LineFormatter {
    timestamp_format: TimestampFormat,
    include_context: bool,
    include_extra: bool,
    trailing_newline: bool,
}

impl LineFormatter {
    pub fn new() -> Self {
        Self {
            timestamp_format: TimestampFormat::default(),
            include_context: true,
            include_extra: true,
            trailing_newline: false,
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Set a custom timestamp format using a strftime-compatible format string
    ///
    /// A pattern chrono cannot render falls back to ISO 8601; use
    /// [`TimestampFormat::custom`] to reject it up front.
    #[must_use]
    pub fn with_custom_timestamp(mut self, format_str: &str) -> Self {
        self.timestamp_format = TimestampFormat::Custom(format_str.to_string());
        self
    }

    #[must_use]
    pub fn with_context(mut self, include: bool) -> Self {
        self.include_context = include;
        self
    }

    #[must_use]
    pub fn with_extra(mut self, include: bool) -> Self {
        self.include_extra = include;
        self
    }

    /// Terminate every line with `\n`, for stream sinks
    #[must_use]
    pub fn with_trailing_newline(mut self, newline: bool) -> Self {
        self.trailing_newline = newline;
        self
    }

    fn render_map(map: &LogContext) -> String {
        map.to_json_value().to_string()
    }
}

impl Default for LineFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for LineFormatter {
    fn format(&self, record: &Record) -> Formatted {
        let mut output = format!(
            "[{}] {}.{}: {}",
            self.timestamp_format.format(record.datetime()),
            escape_line_breaks(record.channel()),
            record.level_name(),
            escape_line_breaks(record.message())
        );

        if self.include_context && !record.context().is_empty() {
            output.push(' ');
            output.push_str(&Self::render_map(record.context()));
        }
        if self.include_extra && !record.extra().is_empty() {
            output.push(' ');
            output.push_str(&Self::render_map(record.extra()));
        }
        if self.trailing_newline {
            output.push('\n');
        }

        Formatted::Text(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogContext, LogLevel};

    #[test]
    fn test_basic_line() {
        let record = Record::new(LogLevel::Warning, "disk low", "storage");
        let line = LineFormatter::new().format(&record).to_text();

        assert!(line.starts_with('['));
        assert!(line.ends_with("storage.WARNING: disk low"));
    }

    #[test]
    fn test_line_with_context_and_extra() {
        let record = Record::new(LogLevel::Info, "User logged in", "auth")
            .with_context(LogContext::new().with_field("user_id", 123))
            .with_extra("host", "web-1");

        let line = LineFormatter::new().format(&record).to_text();
        assert!(line.contains(r#"{"user_id":123}"#));
        assert!(line.contains(r#"{"host":"web-1"}"#));

        let line = LineFormatter::new()
            .with_context(false)
            .with_extra(false)
            .format(&record)
            .to_text();
        assert!(!line.contains("user_id"));
        assert!(!line.contains("web-1"));
    }

    #[test]
    fn test_trailing_newline_and_custom_timestamp() {
        let record = Record::new(LogLevel::Error, "boom", "app");
        let line = LineFormatter::new()
            .with_custom_timestamp("%Y")
            .with_trailing_newline(true)
            .format(&record)
            .to_text();

        assert!(line.ends_with("app.ERROR: boom\n"));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn test_invalid_custom_timestamp_does_not_panic() {
        let record = Record::new(LogLevel::Info, "tick", "app");
        let line = LineFormatter::new()
            .with_custom_timestamp("%Q")
            .format(&record)
            .to_text();

        assert!(line.starts_with('['));
        assert!(line.ends_with("app.INFO: tick"));
    }

    #[test]
    fn test_message_cannot_inject_lines() {
        let record = Record::new(LogLevel::Info, "ok\n[2025-01-01] app.ERROR: forged", "app");
        let line = LineFormatter::new()
            .with_trailing_newline(true)
            .format(&record)
            .to_text();

        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.contains("ok\\n[2025-01-01] app.ERROR: forged"));
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let record = Record::new(LogLevel::Notice, "same", "app")
            .with_context(LogContext::new().with_field("b", 2).with_field("a", 1));
        let formatter = LineFormatter::new();

        assert_eq!(formatter.format(&record), formatter.format(&record));
    }
}
