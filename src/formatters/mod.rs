//! Formatter implementations
//!
//! A formatter turns records into the representation one kind of sink
//! expects. Formatting is pure: the same record always yields the same
//! output, and values that cannot be encoded degrade to strings instead of
//! failing.

pub mod chrome;
pub mod json;
pub mod line;
pub mod logfmt;
pub mod timestamp;

pub use chrome::ChromeFormatter;
pub use json::JsonFormatter;
pub use line::LineFormatter;
pub use logfmt::LogfmtFormatter;
pub use timestamp::TimestampFormat;

use crate::core::{Formatted, Record};

/// Escape line breaks and tabs so one record cannot fake further entries
/// in a line-oriented sink
pub(crate) fn escape_line_breaks(text: &str) -> String {
    text.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

pub trait Formatter: Send + Sync {
    fn format(&self, record: &Record) -> Formatted;

    fn format_batch(&self, records: &[Record]) -> Vec<Formatted> {
        records.iter().map(|record| self.format(record)).collect()
    }
}

impl<F: Formatter + ?Sized> Formatter for Box<F> {
    fn format(&self, record: &Record) -> Formatted {
        (**self).format(record)
    }

    fn format_batch(&self, records: &[Record]) -> Vec<Formatted> {
        (**self).format_batch(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_line_breaks() {
        assert_eq!(escape_line_breaks("a\nb\r\nc\td"), "a\\nb\\r\\nc\\td");
        assert_eq!(escape_line_breaks("plain"), "plain");
    }
}
