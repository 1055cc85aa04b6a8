//! Time-ordered log collection.
//!
//! Logs are kept newest first. Streams are mostly in order, so the insertion
//! position is found by scanning from the front.

use crate::models::{Log, LogDto};
use crate::storage::ResourceRegistry;
use crate::time::ParseError;

/// Inserts `item` keeping `items` non-increasing by `key`.
///
/// The item goes before the first element whose key is smaller, or at the
/// end if there is none; items with equal keys keep arrival order.
///
/// # Example
///
/// ```
/// use shared::storage::insert_sorted_desc;
///
/// let mut times = vec![30, 20, 10];
/// insert_sorted_desc(&mut times, 25, |t| *t);
/// insert_sorted_desc(&mut times, 5, |t| *t);
/// assert_eq!(times, vec![30, 25, 20, 10, 5]);
/// ```
pub fn insert_sorted_desc<T, K, F>(items: &mut Vec<T>, item: T, key: F)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let new_key = key(&item);
    let position = items
        .iter()
        .position(|existing| key(existing) < new_key)
        .unwrap_or(items.len());
    items.insert(position, item);
}

/// Log collection ordered by `time_ns` descending.
#[derive(Debug, Default)]
pub struct LogStore {
    logs: Vec<Log>,
}

impl LogStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps and inserts one log record, registering its resource.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the record's timestamp is malformed; the
    /// store is left untouched.
    pub fn add_log(&mut self, dto: LogDto, registry: &mut ResourceRegistry) -> Result<(), ParseError> {
        let log = Log::try_from(dto)?;
        registry.add(&log.resource);
        self.insert(log);
        Ok(())
    }

    /// Inserts an already-mapped log at its time position.
    pub fn insert(&mut self, log: Log) {
        insert_sorted_desc(&mut self.logs, log, |l| l.time_ns);
    }

    /// All logs, newest first.
    #[must_use]
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Number of stored logs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.logs.len()
    }

    /// Returns true if no log is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Logs of one resource, newest first.
    #[must_use]
    pub fn by_resource(&self, resource_key: &str) -> Vec<&Log> {
        self.logs
            .iter()
            .filter(|log| log.resource.key() == resource_key)
            .collect()
    }

    /// Logs correlated with one trace, newest first.
    #[must_use]
    pub fn by_trace(&self, trace_id: &str) -> Vec<&Log> {
        self.logs
            .iter()
            .filter(|log| log.trace_id.as_deref() == Some(trace_id))
            .collect()
    }

    /// Logs correlated with one span, newest first.
    #[must_use]
    pub fn by_span(&self, trace_id: &str, span_id: &str) -> Vec<&Log> {
        self.logs
            .iter()
            .filter(|log| log.belongs_to_span(trace_id, span_id))
            .collect()
    }
}
