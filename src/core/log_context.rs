//! Structured logging context for key-value fields
//!
//! This module provides:
//! - `FieldValue`: a single structured value with best-effort JSON encoding
//! - `LogContext`: caller-supplied fields attached to one record
//! - `LoggerContext`: persistent fields merged into every record's `extra`
//! - `ContextGuard`: RAII guard for scoped persistent fields

use super::processor::Processor;
use super::record::Record;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static ENCODE_FALLBACKS: AtomicU64 = AtomicU64::new(0);

/// Number of values that could not be encoded structurally and were replaced
/// by a string representation, process-wide.
pub fn encode_fallback_count() -> u64 {
    ENCODE_FALLBACKS.load(Ordering::Relaxed)
}

pub(crate) fn record_fallback() {
    ENCODE_FALLBACKS.fetch_add(1, Ordering::Relaxed);
}

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    /// Arbitrary JSON-compatible data
    Json(serde_json::Value),
    /// `Debug` rendering of a value that has no structured form
    Debug(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
            FieldValue::Json(v) => write!(f, "{}", v),
            FieldValue::Debug(s) => write!(f, "{}", s),
        }
    }
}

impl FieldValue {
    /// Capture any serializable value
    ///
    /// Values whose `Serialize` impl fails are kept as a placeholder string
    /// naming the type, so a single bad field never aborts a record.
    pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => FieldValue::Json(json),
            Err(err) => {
                record_fallback();
                FieldValue::Debug(format!(
                    "[unserializable {}: {}]",
                    std::any::type_name::<T>(),
                    err
                ))
            }
        }
    }

    /// Capture a value through its `Debug` impl
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        FieldValue::Debug(format!("{:?}", value))
    }

    /// Strict JSON conversion, fails for values JSON cannot represent
    pub fn try_to_json_value(&self) -> Result<serde_json::Value, String> {
        match self {
            FieldValue::String(s) => Ok(serde_json::Value::String(s.clone())),
            FieldValue::Int(i) => Ok(serde_json::Value::Number((*i).into())),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| format!("non-finite float {}", f)),
            FieldValue::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            FieldValue::Null => Ok(serde_json::Value::Null),
            FieldValue::Json(v) => Ok(v.clone()),
            FieldValue::Debug(s) => Ok(serde_json::Value::String(s.clone())),
        }
    }

    /// Convert to serde_json::Value for JSON serialization
    ///
    /// Falls back to the display string when strict conversion fails.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        self.try_to_json_value().unwrap_or_else(|_| {
            record_fallback();
            serde_json::Value::String(self.to_string())
        })
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(i: u64) -> Self {
        i64::try_from(i)
            .map(FieldValue::Int)
            .unwrap_or_else(|_| FieldValue::Json(serde_json::Value::Number(i.into())))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        FieldValue::Json(v)
    }
}

/// Context for structured logging with key-value fields
///
/// Keys are kept sorted so that formatting a record is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogContext {
    fields: BTreeMap<String, FieldValue>,
}

impl LogContext {
    /// Create a new empty log context
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Add a field to the context
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a field to the context (mutable version)
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    /// Get all fields
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Check if context has any fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Format fields as key=value pairs
    pub fn format_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Best-effort JSON object of all fields
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json_value()))
                .collect(),
        )
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for LogContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Logger-level persistent context
///
/// `LoggerContext` stores fields that are merged into the `extra` map of
/// every record it processes, such as service name, version or request id.
/// Register it on a logger with `Logger::add_processor`.
///
/// Thread-safe: clones share the same fields.
///
/// # Example
///
/// ```
/// use rust_log_pipeline::core::LoggerContext;
///
/// let ctx = LoggerContext::new();
/// ctx.set("service", "api-gateway");
/// ctx.set("version", "1.2.3");
///
/// let fields = ctx.get_fields();
/// assert_eq!(fields.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct LoggerContext {
    fields: Arc<RwLock<BTreeMap<String, FieldValue>>>,
}

impl LoggerContext {
    /// Create a new empty logger context
    pub fn new() -> Self {
        Self {
            fields: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Set a field in the context
    ///
    /// If the field already exists, it will be overwritten.
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.write().insert(key.into(), value.into());
    }

    /// Set a field that is removed again when the returned guard drops
    #[must_use = "the field is removed as soon as the guard is dropped"]
    pub fn scoped<K, V>(&self, key: K, value: V) -> ContextGuard
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        self.set(key.clone(), value);
        ContextGuard::new(Arc::clone(&self.fields), key)
    }

    /// Remove a field from the context
    pub fn remove(&self, key: &str) {
        self.fields.write().remove(key);
    }

    /// Clear all fields from the context
    pub fn clear(&self) {
        self.fields.write().clear();
    }

    /// Get a clone of all fields
    pub fn get_fields(&self) -> BTreeMap<String, FieldValue> {
        self.fields.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    /// Merge context fields into a LogContext
    ///
    /// Fields already present in the target take priority.
    pub fn merge_into(&self, log_context: &mut LogContext) {
        let fields = self.fields.read();
        for (key, value) in fields.iter() {
            if !log_context.fields.contains_key(key) {
                log_context.fields.insert(key.clone(), value.clone());
            }
        }
    }
}

impl Default for LoggerContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for LoggerContext {
    fn process(&self, mut record: Record) -> Record {
        self.merge_into(record.extra_mut());
        record
    }
}

/// RAII guard for scoped context fields
///
/// When dropped, removes its field from the logger context.
pub struct ContextGuard {
    context: Arc<RwLock<BTreeMap<String, FieldValue>>>,
    key: String,
}

impl ContextGuard {
    fn new(context: Arc<RwLock<BTreeMap<String, FieldValue>>>, key: String) -> Self {
        Self { context, key }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.context.write().remove(&self.key);
    }
}
