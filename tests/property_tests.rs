//! Property-based tests for rust_log_pipeline using proptest

use proptest::prelude::*;
use rust_log_pipeline::handlers::{ChromePayload, DeliveryState, HeaderCollector};
use rust_log_pipeline::prelude::*;
use std::sync::Arc;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(LogLevel::ALL.to_vec())
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string and numeric conversions roundtrip correctly
    #[test]
    fn test_log_level_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);

        let lowercase: LogLevel = level.to_str().to_lowercase().parse().unwrap();
        prop_assert_eq!(level, lowercase);

        prop_assert_eq!(LogLevel::from_value(level.value()).unwrap(), level);
    }

    /// Test that LogLevel ordering follows the numeric values
    #[test]
    fn test_log_level_ordering(level1 in any_level(), level2 in any_level()) {
        prop_assert_eq!(level1 <= level2, level1.value() <= level2.value());
        prop_assert_eq!(level1 < level2, level1.value() < level2.value());
    }

    /// Undefined numeric levels are rejected
    #[test]
    fn test_undefined_level_values(value in any::<u16>()) {
        let defined = LogLevel::ALL.iter().any(|level| level.value() == value);
        prop_assert_eq!(LogLevel::from_value(value).is_ok(), defined);
    }
}

// ============================================================================
// Record and Formatter Tests
// ============================================================================

proptest! {
    /// Records keep the message verbatim; line formatters never emit raw breaks
    #[test]
    fn test_line_output_has_no_raw_breaks(message in ".*") {
        let record = Record::new(LogLevel::Info, message.clone(), "app");
        prop_assert_eq!(record.message(), message.as_str());

        for line in [
            LineFormatter::new().format(&record).to_text(),
            LogfmtFormatter::new().format(&record).to_text(),
        ] {
            prop_assert!(!line.contains('\n'));
            prop_assert!(!line.contains('\r'));
            prop_assert!(!line.contains('\t'));
        }
    }

    /// Formatting the same record twice yields identical output
    #[test]
    fn test_formatting_is_deterministic(
        level in any_level(),
        message in "[a-zA-Z0-9 ]{0,64}",
        key in "[a-z]{1,8}",
        number in any::<i64>(),
        float in any::<f64>(),
    ) {
        let record = Record::new(level, message, "app")
            .with_context(LogContext::new().with_field(key, number).with_field("ratio", float));

        let line = LineFormatter::new();
        let json = JsonFormatter::new();
        let logfmt = LogfmtFormatter::new();
        let chrome = ChromeFormatter::new();

        prop_assert_eq!(line.format(&record), line.format(&record));
        prop_assert_eq!(json.format(&record), json.format(&record));
        prop_assert_eq!(logfmt.format(&record), logfmt.format(&record));
        prop_assert_eq!(chrome.format(&record), chrome.format(&record));
    }

    /// format_batch matches formatting each record on its own
    #[test]
    fn test_batch_matches_single(messages in prop::collection::vec("[a-z]{0,16}", 0..20)) {
        let records: Vec<Record> = messages
            .into_iter()
            .map(|message| Record::new(LogLevel::Notice, message, "batch"))
            .collect();
        let formatter = JsonFormatter::new();

        let single: Vec<Formatted> = records.iter().map(|r| formatter.format(r)).collect();
        prop_assert_eq!(formatter.format_batch(&records), single);
    }
}

// ============================================================================
// Handler Tests
// ============================================================================

proptest! {
    /// Records below the handler level are rejected without side effects
    #[test]
    fn test_below_level_has_no_effect(min in any_level(), level in any_level()) {
        let headers = HeaderCollector::new();
        let state = Arc::new(DeliveryState::<ChromePayload>::new());
        let mut handler = ChromeHandler::with_state(Arc::new(headers.clone()), Arc::clone(&state))
            .with_level(min);

        let handled = handler.handle(&Record::new(level, "sample", "app")).unwrap();

        prop_assert_eq!(handled, level >= min);
        prop_assert_eq!(state.with_payload(ChromePayload::len), usize::from(handled));
        prop_assert_eq!(headers.send_count(), u64::from(handled));
    }

    /// Row count never decreases and freezes once the guard fires
    #[test]
    fn test_row_count_monotonic(sizes in prop::collection::vec(0usize..600, 1..60)) {
        let headers = HeaderCollector::new();
        let state = Arc::new(DeliveryState::<ChromePayload>::new());
        let mut handler = ChromeHandler::with_state(Arc::new(headers.clone()), Arc::clone(&state))
            .with_size_limit(4096);

        let mut previous = 0;
        for size in sizes {
            let was_overflowed = state.is_overflowed();
            let sends_before = headers.send_count();

            handler.handle(&Record::new(LogLevel::Info, "m".repeat(size), "app")).unwrap();

            let rows = state.with_payload(ChromePayload::len);
            prop_assert!(rows >= previous);
            if was_overflowed {
                prop_assert_eq!(rows, previous);
                prop_assert_eq!(headers.send_count(), sends_before);
            }
            previous = rows;
        }
    }
}
