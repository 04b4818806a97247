//! Wire payload of the console bridge header

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::Value;

/// Protocol version understood by the browser extension
pub const PROTOCOL_VERSION: &str = "4.0";

/// Column order of every row
pub const COLUMNS: [&str; 4] = ["label", "log", "backtrace", "type"];

/// Accumulated header payload
///
/// Serialized as
/// `{"version":"4.0","columns":["label","log","backtrace","type"],"rows":[…],"request_uri":"…"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChromePayload {
    version: &'static str,
    columns: [&'static str; 4],
    rows: Vec<Value>,
    request_uri: String,
}

impl Default for ChromePayload {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            columns: COLUMNS,
            rows: Vec::new(),
            request_uri: String::new(),
        }
    }
}

impl ChromePayload {
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub(crate) fn set_request_uri(&mut self, uri: String) {
        self.request_uri = uri;
    }

    pub(crate) fn push(&mut self, row: Value) {
        self.rows.push(row);
    }

    pub(crate) fn extend(&mut self, rows: impl IntoIterator<Item = Value>) {
        self.rows.extend(rows);
    }

    /// Replace the most recent row, or add one if there is none yet
    pub(crate) fn replace_last(&mut self, row: Value) {
        match self.rows.last_mut() {
            Some(last) => *last = row,
            None => self.rows.push(row),
        }
    }

    /// JSON document, degrading to a row-less document if a row cannot be encoded
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            eprintln!("[LOGGER ERROR] Failed to encode console payload: {}", err);
            let fallback = ChromePayload {
                rows: Vec::new(),
                ..self.clone()
            };
            serde_json::to_string(&fallback).unwrap_or_default()
        })
    }

    /// Header value: base64 over the UTF-8 JSON document
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_json().as_bytes())
    }

    /// Decode a header value produced by [`ChromePayload::encode`]
    pub fn decode(data: &str) -> crate::core::Result<Value> {
        let bytes = STANDARD
            .decode(data)
            .map_err(|err| crate::core::LoggerError::other(format!("invalid base64: {}", err)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_payload_shape() {
        let payload = ChromePayload::default();
        let value: Value = serde_json::from_str(&payload.to_json()).unwrap();

        assert_eq!(
            value,
            json!({
                "version": "4.0",
                "columns": ["label", "log", "backtrace", "type"],
                "rows": [],
                "request_uri": ""
            })
        );
    }

    #[test]
    fn test_encode_decode() {
        let mut payload = ChromePayload::default();
        payload.set_request_uri("/orders?id=ü".into());
        payload.push(json!(["app", "hello", "unknown", "info"]));

        let decoded = ChromePayload::decode(&payload.encode()).unwrap();
        assert_eq!(decoded["rows"][0][1], "hello");
        assert_eq!(decoded["request_uri"], "/orders?id=ü");
    }

    #[test]
    fn test_encoded_size_reflects_base64_expansion() {
        let payload = ChromePayload::default();
        let json_len = payload.to_json().len();
        assert_eq!(payload.encode().len(), json_len.div_ceil(3) * 4);
    }

    #[test]
    fn test_replace_last() {
        let mut payload = ChromePayload::default();
        payload.replace_last(json!(1));
        assert_eq!(payload.len(), 1);

        payload.extend([json!(2), json!(3)]);
        payload.replace_last(json!(4));
        assert_eq!(payload.rows(), &[json!(1), json!(2), json!(4)]);
    }
}
