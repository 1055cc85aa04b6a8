//! In-memory collections maintained by the ingestion core.
//!
//! Every store is a plain owned structure mutated through `&mut self`; one
//! record is applied to completion before the next. Hosts that read while
//! ingesting share the stores behind a lock (see [`crate::ingest::Telemetry`]).

pub mod log_store;
pub mod metric_store;
pub mod resource_store;
pub mod trace_store;

pub use log_store::{insert_sorted_desc, LogStore};
pub use metric_store::{MetricStore, MetricUpsert, DEFAULT_MAX_DATA_POINTS};
pub use resource_store::ResourceRegistry;
pub use trace_store::{SpanInsert, SpanNode, TraceStore};
