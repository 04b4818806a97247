//! Size guard for delivery channels with a hard capacity
//!
//! Before every transmission the whole accumulated payload is encoded and
//! measured in its wire form. Within the threshold it goes out unchanged.
//! Above it, the most recently appended entry is replaced by a truncation
//! warning, the payload is encoded again and sent, and the state latches
//! `overflowed` so the channel stays silent for the rest of the process.

use super::state::DeliverySlot;

/// Encoded-size ceiling applied before transmission (240 KiB)
///
/// The consumer's own hard limit is 256 KiB; the difference is headroom.
pub const DEFAULT_SIZE_LIMIT: usize = 240 * 1024;

/// Outcome of a guarded delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Payload fits, transmit as-is
    Within(String),
    /// Limit reached; last entry replaced, transmit this final payload
    Truncated(String),
    /// Guard fired earlier; nothing to transmit
    Latched,
}

impl Admission {
    /// Encoded data to transmit, if any
    pub fn data(&self) -> Option<&str> {
        match self {
            Admission::Within(data) | Admission::Truncated(data) => Some(data),
            Admission::Latched => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverflowGuard {
    limit: usize,
}

impl OverflowGuard {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Check the encoded payload against the limit
    ///
    /// `encode` renders the payload in wire form; `truncate` replaces its
    /// last entry with the truncation warning. Measurement is always on the
    /// encoded length.
    pub fn admit<P>(
        &self,
        slot: &mut DeliverySlot<P>,
        encode: impl Fn(&P) -> String,
        truncate: impl FnOnce(&mut P),
    ) -> Admission {
        if slot.overflowed {
            return Admission::Latched;
        }

        let data = encode(&slot.payload);
        if data.len() <= self.limit {
            return Admission::Within(data);
        }

        truncate(&mut slot.payload);
        slot.overflowed = true;
        Admission::Truncated(encode(&slot.payload))
    }
}

impl Default for OverflowGuard {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::ptr_arg)]
    fn encode(rows: &Vec<String>) -> String {
        rows.concat()
    }

    fn truncate(rows: &mut Vec<String>) {
        if let Some(last) = rows.last_mut() {
            *last = "!".to_string();
        }
    }

    #[test]
    fn test_within_limit_passes_unchanged() {
        let guard = OverflowGuard::new(10);
        let mut slot = DeliverySlot {
            payload: vec!["abc".to_string(), "def".to_string()],
            ..DeliverySlot::default()
        };

        assert_eq!(
            guard.admit(&mut slot, encode, truncate),
            Admission::Within("abcdef".into())
        );
        assert!(!slot.overflowed);
    }

    #[test]
    fn test_limit_is_inclusive() {
        let guard = OverflowGuard::new(6);
        let mut slot = DeliverySlot {
            payload: vec!["abcdef".to_string()],
            ..DeliverySlot::default()
        };

        assert!(matches!(guard.admit(&mut slot, encode, truncate), Admission::Within(_)));
    }

    #[test]
    fn test_over_limit_replaces_only_last_entry_and_latches() {
        let guard = OverflowGuard::new(5);
        let mut slot = DeliverySlot {
            payload: vec!["abc".to_string(), "defghi".to_string()],
            ..DeliverySlot::default()
        };

        assert_eq!(
            guard.admit(&mut slot, encode, truncate),
            Admission::Truncated("abc!".into())
        );
        assert!(slot.overflowed);
        assert_eq!(slot.payload, vec!["abc".to_string(), "!".to_string()]);

        assert_eq!(guard.admit(&mut slot, encode, truncate), Admission::Latched);
        assert_eq!(Admission::Latched.data(), None);
    }

    #[test]
    fn test_default_limit() {
        assert_eq!(OverflowGuard::default().limit(), 245_760);
    }
}
