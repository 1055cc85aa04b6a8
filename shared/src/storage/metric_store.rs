//! Metric series aggregation.
//!
//! Incoming samples are merged into running series keyed by
//! `name|unit|type|resource`. Each series keeps its points ascending by time
//! and bounded by a sliding retention window.

use crate::config::RetentionConfig;
use crate::models::{DataPoint, Metric, MetricDto};
use crate::storage::ResourceRegistry;
use crate::time::ParseError;
use std::collections::HashMap;

/// Default number of points retained per series.
pub const DEFAULT_MAX_DATA_POINTS: usize = 1000;

/// Outcome of upserting a metric sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUpsert {
    /// A new series was created.
    Created,
    /// Points were merged into an existing series.
    Merged,
    /// The sample had no data and was dropped.
    Ignored,
}

/// Metric aggregation engine.
#[derive(Debug)]
pub struct MetricStore {
    metrics: Vec<Metric>,
    positions: HashMap<String, usize>,
    max_data_points: usize,
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricStore {
    /// Creates an empty store with the default retention window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_data_points(DEFAULT_MAX_DATA_POINTS)
    }

    /// Creates an empty store keeping at most `max_data_points` per series.
    /// A zero limit is raised to one.
    #[must_use]
    pub fn with_max_data_points(max_data_points: usize) -> Self {
        Self {
            metrics: Vec::new(),
            positions: HashMap::new(),
            max_data_points: max_data_points.max(1),
        }
    }

    /// Creates an empty store from a retention configuration.
    #[must_use]
    pub fn from_config(config: &RetentionConfig) -> Self {
        Self::with_max_data_points(config.max_data_points)
    }

    /// Retention window per series.
    #[must_use]
    pub fn max_data_points(&self) -> usize {
        self.max_data_points
    }

    /// Maps and upserts one metric sample, registering its resource.
    ///
    /// Samples without `data` are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if any point carries a malformed timestamp;
    /// the store is left untouched.
    pub fn add_metric(
        &mut self,
        dto: MetricDto,
        registry: &mut ResourceRegistry,
    ) -> Result<MetricUpsert, ParseError> {
        let name = dto.name.clone();
        let Some(metric) = dto.into_metric()? else {
            tracing::debug!(name = %name, "Ignored metric without data");
            return Ok(MetricUpsert::Ignored);
        };
        registry.add(&metric.resource);
        Ok(self.upsert(metric))
    }

    /// Merges an already-mapped metric into the store.
    ///
    /// An existing series takes the new description, gains the new points,
    /// is re-sorted by time and trimmed to the retention window.
    pub fn upsert(&mut self, mut metric: Metric) -> MetricUpsert {
        if let Some(&position) = self.positions.get(&metric.key) {
            let existing = &mut self.metrics[position];
            existing.description = metric.description;
            existing.data_points.append(&mut metric.data_points);
            sort_and_trim(&mut existing.data_points, self.max_data_points, &existing.key);
            return MetricUpsert::Merged;
        }

        sort_and_trim(&mut metric.data_points, self.max_data_points, &metric.key);
        self.positions.insert(metric.key.clone(), self.metrics.len());
        self.metrics.push(metric);
        MetricUpsert::Created
    }

    /// All series in first-seen order.
    #[must_use]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Looks up a series by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Metric> {
        self.positions.get(key).map(|&i| &self.metrics[i])
    }

    /// Number of series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns true if no series exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Total number of retained points across every series.
    #[must_use]
    pub fn data_point_count(&self) -> usize {
        self.metrics.iter().map(|m| m.data_points.len()).sum()
    }
}

fn sort_and_trim(points: &mut Vec<DataPoint>, max: usize, key: &str) {
    points.sort_by_key(DataPoint::time_ns);
    if points.len() > max {
        let excess = points.len() - max;
        tracing::debug!(key = %key, dropped = excess, "Trimmed metric points to retention window");
        points.drain(..excess);
    }
}
