//! JSON formatter for structured sinks

use super::{Formatter, TimestampFormat};
use crate::core::{Formatted, Record};

/// Formats each record as one JSON object
///
/// Output shape:
/// `{"datetime":…,"channel":…,"level":300,"level_name":"WARNING","message":…,"context":{…},"extra":{…}}`.
/// With [`JsonFormatter::lines`] the object is rendered as a newline-terminated
/// string (JSONL), ready for file or socket sinks.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    timestamp_format: TimestampFormat,
    lines: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one JSON document per line instead of a structured value
    pub fn lines() -> Self {
        Self {
            lines: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn to_json_value(&self, record: &Record) -> serde_json::Value {
        let mut json_obj = serde_json::Map::new();

        json_obj.insert(
            "datetime".to_string(),
            self.timestamp_format.to_json_value(record.datetime()),
        );
        json_obj.insert(
            "channel".to_string(),
            serde_json::Value::String(record.channel().to_string()),
        );
        json_obj.insert("level".to_string(), record.level().value().into());
        json_obj.insert(
            "level_name".to_string(),
            serde_json::Value::String(record.level_name().to_string()),
        );
        json_obj.insert(
            "message".to_string(),
            serde_json::Value::String(record.message().to_string()),
        );
        json_obj.insert("context".to_string(), record.context().to_json_value());
        json_obj.insert("extra".to_string(), record.extra().to_json_value());

        serde_json::Value::Object(json_obj)
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record) -> Formatted {
        let value = self.to_json_value(record);
        if self.lines {
            Formatted::Text(format!("{}\n", value))
        } else {
            Formatted::Structured(value)
        }
    }
}
