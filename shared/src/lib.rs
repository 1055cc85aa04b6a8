//! OTel Inspect Shared Library
//!
//! The ingestion core of OTel Inspect: it takes an unordered stream of
//! spans, logs and metrics and maintains queryable in-memory views of them.
//!
//! # Modules
//!
//! - [`identity`] - Composite keys for resources, spans and metric series
//! - [`time`] - Timestamp normalization and number formatting
//! - [`models`] - Wire DTOs and normalized records
//! - [`storage`] - Trace tree assembler, log collection, metric engine, resource registry
//! - [`projection`] - Chart, table and trace timeline projections
//! - [`filter`] - Attribute filters over records
//! - [`ingest`] - The [`Telemetry`](ingest::Telemetry) hub that routes records
//! - [`config`] - Retention configuration
//!
//! # Example
//!
//! ```
//! use shared::ingest::{Ingested, Telemetry};
//!
//! let mut telemetry = Telemetry::default();
//! let line = r#"{"topic": "traces", "payload": {
//!     "name": "GET /", "trace_id": "t1", "span_id": "s1",
//!     "start_time_unix_nano": "1000", "end_time_unix_nano": "3000"
//! }}"#;
//!
//! assert_eq!(telemetry.ingest_json(line).unwrap(), Ingested::Span);
//! assert_eq!(telemetry.traces().roots()[0].duration_ns, 2000);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod filter;
pub mod identity;
pub mod ingest;
pub mod models;
pub mod projection;
pub mod storage;
pub mod time;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
