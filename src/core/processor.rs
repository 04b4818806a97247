//! Record processors
//!
//! Processors enrich a record's `extra` map before handlers see it. They run
//! on an owned record, so a record is complete by the time it is shared.

use super::record::Record;
use std::cell::RefCell;

pub trait Processor: Send + Sync {
    fn process(&self, record: Record) -> Record;
}

impl<F> Processor for F
where
    F: Fn(Record) -> Record + Send + Sync,
{
    fn process(&self, record: Record) -> Record {
        self(record)
    }
}

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

fn current_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Adds `thread_id` and, when the thread is named, `thread_name` to `extra`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadProcessor;

impl Processor for ThreadProcessor {
    fn process(&self, mut record: Record) -> Record {
        let extra = record.extra_mut();
        extra.add_field("thread_id", current_thread_id());
        if let Some(name) = current_thread_name() {
            extra.add_field("thread_name", name);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FieldValue, LogLevel};

    #[test]
    fn test_closure_processor() {
        let processor = |record: Record| record.with_extra("host", "web-1");
        let record = processor.process(Record::new(LogLevel::Info, "hi", "app"));
        assert_eq!(record.extra().get("host"), Some(&FieldValue::from("web-1")));
    }

    #[test]
    fn test_thread_processor_named_thread() {
        let handle = std::thread::Builder::new()
            .name("worker-7".into())
            .spawn(|| ThreadProcessor.process(Record::new(LogLevel::Info, "hi", "app")))
            .unwrap();
        let record = handle.join().unwrap();

        assert!(record.extra().get("thread_id").is_some());
        assert_eq!(
            record.extra().get("thread_name"),
            Some(&FieldValue::from("worker-7"))
        );
    }
}
