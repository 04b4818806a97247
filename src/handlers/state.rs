//! Process-wide delivery state shared by handler type
//!
//! Some sinks have limits that belong to the delivery channel rather than to
//! any one handler instance: a response header can only grow so large no
//! matter how many loggers write into it. Such handlers keep their
//! accumulated payload and latches in a [`DeliveryState`] that every
//! instance of the same handler type shares.
//!
//! The sharing is explicit. [`DeliveryRegistry::global`] hands out one state
//! per `(handler type, payload type)` pair for the life of the process, and
//! handlers also accept an injected state so tests and hosts can isolate
//! them.

use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Mutable part of a delivery state, only reachable under its lock
#[derive(Debug, Default)]
pub struct DeliverySlot<P> {
    /// One-time setup (capability negotiation) has run
    pub initialized: bool,
    /// The size guard fired; nothing is appended or transmitted any more
    pub overflowed: bool,
    /// The consumer accepts this delivery channel
    pub transport_enabled: bool,
    /// Sink-specific accumulated payload
    pub payload: P,
}

/// Shared, lock-protected delivery state for one handler type
///
/// The lock must be held across the whole append, encode, size check and
/// transmit sequence so that concurrent callers cannot jointly exceed a
/// limit or interleave their rows.
#[derive(Debug)]
pub struct DeliveryState<P> {
    slot: Mutex<DeliverySlot<P>>,
    transmissions: AtomicU64,
    suppressed: AtomicU64,
}

impl<P: Default> DeliveryState<P> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(DeliverySlot::default()),
            transmissions: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
        }
    }

    /// Drop all accumulated data and latches
    ///
    /// Never called by the pipeline itself. Meant for tests and for hosts
    /// that reuse one process for several independent responses.
    pub fn reset(&self) {
        *self.slot.lock() = DeliverySlot::default();
        self.transmissions.store(0, Ordering::Relaxed);
        self.suppressed.store(0, Ordering::Relaxed);
    }
}

impl<P> DeliveryState<P> {
    pub fn lock(&self) -> MutexGuard<'_, DeliverySlot<P>> {
        self.slot.lock()
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.lock().initialized
    }

    pub fn is_overflowed(&self) -> bool {
        self.slot.lock().overflowed
    }

    pub fn transport_enabled(&self) -> bool {
        self.slot.lock().transport_enabled
    }

    /// Read the payload under the lock
    pub fn with_payload<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&self.slot.lock().payload)
    }

    /// Number of payloads handed to the transport
    pub fn transmissions(&self) -> u64 {
        self.transmissions.load(Ordering::Relaxed)
    }

    /// Number of delivery attempts the transport did not accept
    pub fn suppressed_transmissions(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    pub(crate) fn record_transmission(&self) {
        self.transmissions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }
}

impl<P: Default> Default for DeliveryState<P> {
    fn default() -> Self {
        Self::new()
    }
}

type StateMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Registry of delivery states keyed by handler type
#[derive(Default)]
pub struct DeliveryRegistry {
    states: Mutex<StateMap>,
}

static GLOBAL_REGISTRY: Lazy<DeliveryRegistry> = Lazy::new(DeliveryRegistry::new);

impl DeliveryRegistry {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static DeliveryRegistry {
        &GLOBAL_REGISTRY
    }

    /// State shared by every `H` accumulating a `P`, created on first use
    pub fn state_for<H, P>(&self) -> Arc<DeliveryState<P>>
    where
        H: 'static,
        P: Default + Send + 'static,
    {
        let key = TypeId::of::<(H, P)>();
        let mut states = self.states.lock();
        let entry = states
            .entry(key)
            .or_insert_with(|| Arc::new(DeliveryState::<P>::new()) as Arc<dyn Any + Send + Sync>);

        match Arc::clone(entry).downcast::<DeliveryState<P>>() {
            Ok(state) => state,
            // Unreachable: the key encodes the stored type
            Err(_) => {
                let state = Arc::new(DeliveryState::<P>::new());
                *entry = Arc::clone(&state) as Arc<dyn Any + Send + Sync>;
                state
            }
        }
    }

    pub fn len(&self) -> usize {
        self.states.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FirstHandler;
    struct SecondHandler;

    #[test]
    fn test_same_type_shares_state() {
        let registry = DeliveryRegistry::new();
        let a = registry.state_for::<FirstHandler, Vec<u32>>();
        let b = registry.state_for::<FirstHandler, Vec<u32>>();

        a.lock().payload.push(7);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.with_payload(|rows| rows.clone()), vec![7]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_different_types_are_isolated() {
        let registry = DeliveryRegistry::new();
        let a = registry.state_for::<FirstHandler, Vec<u32>>();
        let b = registry.state_for::<SecondHandler, Vec<u32>>();

        a.lock().overflowed = true;
        assert!(!b.is_overflowed());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_reset_clears_latches_and_counters() {
        let state = DeliveryState::<Vec<u32>>::new();
        {
            let mut slot = state.lock();
            slot.initialized = true;
            slot.overflowed = true;
            slot.payload.push(1);
        }
        state.record_transmission();

        state.reset();

        assert!(!state.is_initialized());
        assert!(!state.is_overflowed());
        assert_eq!(state.transmissions(), 0);
        assert!(state.with_payload(Vec::is_empty));
    }
}
