//! Logfmt formatter (key=value pairs)

use super::{escape_line_breaks, Formatter, TimestampFormat};
use crate::core::{FieldValue, Formatted, Record};

/// Formats records as `timestamp=… channel=… level=WARNING message="…" key=value`
///
/// Compatible with log aggregation tools that ingest logfmt.
#[derive(Debug, Clone, Default)]
pub struct LogfmtFormatter {
    timestamp_format: TimestampFormat,
    trailing_newline: bool,
}

impl LogfmtFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_trailing_newline(mut self, newline: bool) -> Self {
        self.trailing_newline = newline;
        self
    }

    /// Keep only characters that are safe in a logfmt key
    fn escape_key(key: &str) -> String {
        key.chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || *c == '.')
            .collect()
    }

    /// Quote the value if it contains spaces, quotes, `=` or line breaks
    fn escape_value(value: &str) -> String {
        if value.is_empty() || value.contains([' ', '"', '=', '\n', '\r', '\t']) {
            Self::quote(value)
        } else {
            value.to_string()
        }
    }

    fn quote(value: &str) -> String {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\"", escape_line_breaks(&escaped))
    }

    fn render_value(value: &FieldValue) -> String {
        match value {
            FieldValue::String(s) | FieldValue::Debug(s) => Self::quote(s),
            FieldValue::Json(v) => Self::escape_value(&v.to_string()),
            other => other.to_string(),
        }
    }
}

impl Formatter for LogfmtFormatter {
    fn format(&self, record: &Record) -> Formatted {
        let mut parts = vec![
            format!(
                "timestamp={}",
                Self::escape_value(&self.timestamp_format.format(record.datetime()))
            ),
            format!("channel={}", Self::escape_value(record.channel())),
            format!("level={}", record.level_name()),
            format!("message={}", Self::quote(record.message())),
        ];

        for (key, value) in record.context().fields() {
            parts.push(format!("{}={}", Self::escape_key(key), Self::render_value(value)));
        }
        for (key, value) in record.extra().fields() {
            parts.push(format!(
                "extra.{}={}",
                Self::escape_key(key),
                Self::render_value(value)
            ));
        }

        let mut line = parts.join(" ");
        if self.trailing_newline {
            line.push('\n');
        }
        Formatted::Text(line)
    }
}
