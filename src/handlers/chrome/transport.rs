//! Delivery channel of the console bridge
//!
//! How a header actually reaches the browser belongs to the host
//! application. It plugs in through [`ChromeTransport`]; the crate ships
//! [`HeaderCollector`], which keeps headers in memory for the host to copy
//! onto its response.

use crate::core::Result;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Header carrying the encoded payload
pub const HEADER_NAME: &str = "X-ChromeLogger-Data";

static CHROME_USER_AGENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bChrome/\d+[\.\d+]*\b").expect("user agent pattern is a valid regex")
});

/// Whether the client can receive console bridge headers
///
/// Clients that do not identify themselves are given the benefit of the
/// doubt.
pub fn accepts_user_agent(user_agent: Option<&str>) -> bool {
    user_agent.map_or(true, |ua| CHROME_USER_AGENT.is_match(ua))
}

pub trait ChromeTransport: Send + Sync {
    /// User agent of the consumer, if known
    fn user_agent(&self) -> Option<String>;

    /// URI of the request the payload belongs to, if known
    fn request_uri(&self) -> Option<String>;

    /// Whether the response headers are already committed
    fn headers_sent(&self) -> bool {
        false
    }

    /// Set (or replace) a response header
    fn send_header(&self, name: &str, value: &str) -> Result<()>;

    /// Capability negotiation, run once per process by the handler
    fn accepts_headers(&self) -> bool {
        accepts_user_agent(self.user_agent().as_deref())
    }
}

#[derive(Debug, Default)]
struct CollectorInner {
    user_agent: Option<String>,
    request_uri: Option<String>,
    committed: bool,
    headers: BTreeMap<String, String>,
    sends: u64,
}

/// In-memory transport
///
/// Clones share the same header map, so the host keeps one clone and hands
/// another to the handler.
///
/// # Example
///
/// ```
/// use rust_log_pipeline::handlers::{ChromeTransport, HeaderCollector};
///
/// let collector = HeaderCollector::new()
///     .with_user_agent("Mozilla/5.0 Chrome/120.0.0.0 Safari/537.36")
///     .with_request_uri("/checkout");
///
/// assert!(collector.accepts_headers());
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeaderCollector {
    inner: Arc<Mutex<CollectorInner>>,
}

impl HeaderCollector {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Self {
        self.inner.lock().user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn with_request_uri(self, uri: impl Into<String>) -> Self {
        self.inner.lock().request_uri = Some(uri.into());
        self
    }

    /// Mark the response as committed; later headers are ignored
    pub fn commit(&self) {
        self.inner.lock().committed = true;
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.inner.lock().headers.get(name).cloned()
    }

    pub fn headers(&self) -> BTreeMap<String, String> {
        self.inner.lock().headers.clone()
    }

    /// Number of accepted `send_header` calls
    pub fn send_count(&self) -> u64 {
        self.inner.lock().sends
    }
}

impl ChromeTransport for HeaderCollector {
    fn user_agent(&self) -> Option<String> {
        self.inner.lock().user_agent.clone()
    }

    fn request_uri(&self) -> Option<String> {
        self.inner.lock().request_uri.clone()
    }

    fn headers_sent(&self) -> bool {
        self.inner.lock().committed
    }

    fn send_header(&self, name: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.headers.insert(name.to_string(), value.to_string());
        inner.sends += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_detection() {
        assert!(accepts_user_agent(None));
        assert!(accepts_user_agent(Some(
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120.0.6099.71 Safari/537.36"
        )));
        assert!(accepts_user_agent(Some("Chrome/9")));
        assert!(!accepts_user_agent(Some("Mozilla/5.0 Firefox/121.0")));
        assert!(!accepts_user_agent(Some("Chrome/")));
    }

    #[test]
    fn test_collector_replaces_header() {
        let collector = HeaderCollector::new();
        collector.send_header(HEADER_NAME, "a").unwrap();
        collector.send_header(HEADER_NAME, "b").unwrap();

        assert_eq!(collector.header(HEADER_NAME).as_deref(), Some("b"));
        assert_eq!(collector.send_count(), 2);
        assert_eq!(collector.headers().len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let collector = HeaderCollector::new().with_request_uri("/a");
        let handle = collector.clone();
        handle.commit();

        assert!(collector.headers_sent());
        assert_eq!(collector.request_uri().as_deref(), Some("/a"));
    }
}
