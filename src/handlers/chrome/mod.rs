//! Console bridge handler
//!
//! Sends records to the browser's developer console through a single
//! response header (the ChromeLogger protocol). Every handler instance adds
//! its rows to one process-wide payload and re-sends the whole payload after
//! each call, because the header is replaced, not appended. The header has a
//! hard size limit, so delivery goes through an [`OverflowGuard`].

pub mod payload;
pub mod transport;

pub use payload::{ChromePayload, COLUMNS, PROTOCOL_VERSION};
pub use transport::{accepts_user_agent, ChromeTransport, HeaderCollector, HEADER_NAME};

use super::overflow::{Admission, OverflowGuard, DEFAULT_SIZE_LIMIT};
use super::state::{DeliveryRegistry, DeliverySlot, DeliveryState};
use super::{HandlerCore, ProcessingHandler};
use crate::core::{LogLevel, LoggerError, Record, Result};
use crate::formatters::ChromeFormatter;
use serde::Deserialize;
use std::sync::Arc;

/// Message of the row that replaces the last entry once the limit is hit
pub const OVERFLOW_MESSAGE: &str = "Incomplete logs, chrome header size limit reached";

/// Channel of the overflow warning row
pub const OVERFLOW_CHANNEL: &str = "pipeline";

/// Declarative handler settings
///
/// Unknown keys are rejected so that a misspelt property fails loudly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChromeHandlerConfig {
    pub level: LogLevel,
    pub bubble: bool,
    /// Encoded-size ceiling in bytes
    pub size_limit: usize,
}

impl Default for ChromeHandlerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
            bubble: true,
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

impl ChromeHandlerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| LoggerError::config("ChromeHandler", err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.size_limit == 0 {
            return Err(LoggerError::config(
                "ChromeHandler",
                "size_limit must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Handler writing rows into the `X-ChromeLogger-Data` response header
///
/// # Example
///
/// ```
/// use rust_log_pipeline::handlers::{ChromeHandler, DeliveryState, HeaderCollector};
/// use rust_log_pipeline::{LogLevel, Logger};
/// use std::sync::Arc;
///
/// let headers = HeaderCollector::new().with_request_uri("/orders");
/// let state = Arc::new(DeliveryState::new());
///
/// let mut logger = Logger::new("orders");
/// logger.add_handler(Box::new(ChromeHandler::with_state(
///     Arc::new(headers.clone()),
///     state,
/// )));
/// logger.warning("disk low");
///
/// assert!(headers.header("X-ChromeLogger-Data").is_some());
/// ```
pub struct ChromeHandler {
    core: HandlerCore,
    transport: Arc<dyn ChromeTransport>,
    state: Arc<DeliveryState<ChromePayload>>,
    guard: OverflowGuard,
}

impl ChromeHandler {
    /// Handler sharing the process-wide state of all `ChromeHandler`s
    pub fn new(transport: Arc<dyn ChromeTransport>) -> Self {
        Self::with_state(
            transport,
            DeliveryRegistry::global().state_for::<ChromeHandler, ChromePayload>(),
        )
    }

    /// Handler using an explicitly provided shared state
    pub fn with_state(
        transport: Arc<dyn ChromeTransport>,
        state: Arc<DeliveryState<ChromePayload>>,
    ) -> Self {
        Self {
            core: HandlerCore::new(LogLevel::Debug, Box::new(ChromeFormatter::new())),
            transport,
            state,
            guard: OverflowGuard::default(),
        }
    }

    pub fn from_config(
        config: &ChromeHandlerConfig,
        transport: Arc<dyn ChromeTransport>,
        state: Arc<DeliveryState<ChromePayload>>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_state(transport, state)
            .with_level(config.level)
            .with_bubble(config.bubble)
            .with_size_limit(config.size_limit))
    }

    #[must_use]
    pub fn with_size_limit(mut self, limit: usize) -> Self {
        self.guard = OverflowGuard::new(limit);
        self
    }

    pub fn state(&self) -> &Arc<DeliveryState<ChromePayload>> {
        &self.state
    }

    pub fn size_limit(&self) -> usize {
        self.guard.limit()
    }

    fn overflow_row(&self) -> serde_json::Value {
        let warning = Record::new(LogLevel::Warning, OVERFLOW_MESSAGE, OVERFLOW_CHANNEL);
        self.core.formatter().format(&warning).into_json()
    }

    fn initialize(&self, slot: &mut DeliverySlot<ChromePayload>) {
        slot.transport_enabled = self.transport.accepts_headers();
        slot.payload
            .set_request_uri(self.transport.request_uri().unwrap_or_default());
        slot.initialized = true;
    }

    /// Encode, guard and transmit the accumulated payload
    ///
    /// Runs with the state lock held by the caller.
    fn send(&self, slot: &mut DeliverySlot<ChromePayload>) {
        if slot.overflowed {
            return;
        }
        if !slot.initialized {
            self.initialize(slot);
        }

        let admission = self.guard.admit(slot, ChromePayload::encode, |payload| {
            payload.replace_last(self.overflow_row())
        });
        if let Admission::Truncated(_) = admission {
            eprintln!(
                "[LOGGER WARNING] Console header reached {} bytes, further records are not sent",
                self.guard.limit()
            );
        }

        if let Some(data) = admission.data() {
            self.transmit(slot.transport_enabled, data);
        }
    }

    fn transmit(&self, transport_enabled: bool, data: &str) {
        if !transport_enabled || self.transport.headers_sent() {
            self.state.record_suppressed();
            return;
        }

        match self.transport.send_header(HEADER_NAME, data) {
            Ok(()) => self.state.record_transmission(),
            Err(e) => {
                self.state.record_suppressed();
                eprintln!("[LOGGER ERROR] Failed to send console header: {}", e);
            }
        }
    }

    /// Row for a record, formatting it here if no formatted value is set
    fn row_of(&self, record: &Record) -> serde_json::Value {
        match record.formatted() {
            Some(formatted) => formatted.clone().into_json(),
            None => self.core.formatter().format(record).into_json(),
        }
    }
}

impl ProcessingHandler for ChromeHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn write(&mut self, record: &Record) -> Result<()> {
        let mut slot = self.state.lock();
        if slot.overflowed {
            return Ok(());
        }

        slot.payload.push(self.row_of(record));
        self.send(&mut slot);
        Ok(())
    }

    fn write_batch(&mut self, records: &[Record]) -> Result<()> {
        let mut slot = self.state.lock();
        if slot.overflowed {
            return Ok(());
        }

        slot.payload
            .extend(records.iter().map(|record| self.row_of(record)));
        self.send(&mut slot);
        Ok(())
    }

    fn handler_name(&self) -> &str {
        "chrome"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::Handler;
    use serde_json::json;

    fn handler(headers: &HeaderCollector) -> ChromeHandler {
        ChromeHandler::with_state(Arc::new(headers.clone()), Arc::new(DeliveryState::new()))
    }

    #[test]
    fn test_handle_sends_full_payload() {
        let headers = HeaderCollector::new().with_request_uri("/orders/7");
        let mut handler = handler(&headers);

        assert!(handler
            .handle(&Record::new(LogLevel::Info, "first", "app"))
            .unwrap());
        assert!(handler
            .handle(&Record::new(LogLevel::Error, "second", "app"))
            .unwrap());

        let header = headers.header(HEADER_NAME).unwrap();
        let decoded = ChromePayload::decode(&header).unwrap();
        assert_eq!(decoded["version"], "4.0");
        assert_eq!(decoded["request_uri"], "/orders/7");
        assert_eq!(
            decoded["rows"],
            json!([
                ["app", "first", "unknown", "info"],
                ["app", "second", "unknown", "error"]
            ])
        );
        assert_eq!(headers.send_count(), 2);
    }

    #[test]
    fn test_multiline_message_sent_verbatim() {
        let headers = HeaderCollector::new();
        let mut handler = handler(&headers);

        handler
            .handle(&Record::new(LogLevel::Info, "line1\nline2", "app"))
            .unwrap();

        let decoded = ChromePayload::decode(&headers.header(HEADER_NAME).unwrap()).unwrap();
        assert_eq!(decoded["rows"][0][1], "line1\nline2");
    }

    #[test]
    fn test_unformatted_record_gets_a_row() {
        let headers = HeaderCollector::new();
        let mut handler = handler(&headers);

        handler
            .write(&Record::new(LogLevel::Notice, "raw", "app"))
            .unwrap();

        let rows = handler.state().with_payload(|payload| payload.rows().to_vec());
        assert_eq!(rows, vec![json!(["app", "raw", "unknown", "info"])]);
    }

    #[test]
    fn test_below_level_is_ignored() {
        let headers = HeaderCollector::new();
        let mut handler = handler(&headers).with_level(LogLevel::Error);

        assert!(!handler
            .handle(&Record::new(LogLevel::Warning, "disk low", "app"))
            .unwrap());
        assert!(!handler.state().is_initialized());
        assert_eq!(headers.send_count(), 0);
    }

    #[test]
    fn test_batch_sends_once() {
        let headers = HeaderCollector::new();
        let mut handler = handler(&headers).with_level(LogLevel::Info);

        handler
            .handle_batch(&[
                Record::new(LogLevel::Debug, "skipped", "app"),
                Record::new(LogLevel::Info, "a", "app"),
                Record::new(LogLevel::Warning, "b", "app"),
            ])
            .unwrap();

        assert_eq!(headers.send_count(), 1);
        assert_eq!(handler.state().with_payload(ChromePayload::len), 2);
    }

    #[test]
    fn test_committed_headers_suppress_transmission() {
        let headers = HeaderCollector::new();
        headers.commit();
        let mut handler = handler(&headers);

        assert!(handler
            .handle(&Record::new(LogLevel::Info, "late", "app"))
            .unwrap());
        assert_eq!(headers.send_count(), 0);
        assert_eq!(handler.state().suppressed_transmissions(), 1);
        assert_eq!(handler.state().with_payload(ChromePayload::len), 1);
    }

    #[test]
    fn test_config_rejects_unknown_property() {
        let err = ChromeHandlerConfig::from_json(r#"{"level":"INFO","send_headers":false}"#)
            .unwrap_err();
        assert!(err.is_programming_error());
        assert!(err.to_string().contains("send_headers"));
    }

    #[test]
    fn test_config_applies_settings() {
        let config =
            ChromeHandlerConfig::from_json(r#"{"level":"ERROR","bubble":false,"size_limit":1024}"#)
                .unwrap();
        let handler = ChromeHandler::from_config(
            &config,
            Arc::new(HeaderCollector::new()),
            Arc::new(DeliveryState::new()),
        )
        .unwrap();

        assert_eq!(handler.size_limit(), 1024);
        assert!(!handler.is_handling(LogLevel::Warning));
        assert!(!Handler::bubble(&handler));
    }

    #[test]
    fn test_zero_limit_is_invalid() {
        let config = ChromeHandlerConfig {
            size_limit: 0,
            ..ChromeHandlerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
