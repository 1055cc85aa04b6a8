//! Span tree assembly.
//!
//! Spans arrive one at a time and in any order. The store keeps a flat index
//! of every span, a root list of spans currently shown as top level, and a
//! waiting list of orphans keyed by the parent they name. A span whose
//! parent has not arrived yet is listed as a root until the parent shows up,
//! at which point it is moved under that parent.
//!
//! Every indexed span is reachable either from the root list or from exactly
//! one parent's `children`, never both.

use crate::models::{Span, SpanDto};
use crate::storage::ResourceRegistry;
use crate::time::ParseError;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Outcome of inserting a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanInsert {
    /// The span was new and has been linked.
    Inserted,
    /// A span with the same key was already indexed; nothing changed.
    Duplicate,
}

/// A span with its resolved subtree, for nested rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SpanNode<'a> {
    /// The span itself.
    pub span: &'a Span,
    /// Child subtrees in arrival order.
    pub children: Vec<SpanNode<'a>>,
}

/// Trace tree assembler.
///
/// # Example
///
/// ```
/// use shared::models::SpanDto;
/// use shared::storage::{ResourceRegistry, TraceStore};
///
/// let span = |id: &str, parent: Option<&str>| -> SpanDto {
///     serde_json::from_value(serde_json::json!({
///         "name": id,
///         "trace_id": "t1",
///         "span_id": id,
///         "parent_span_id": parent,
///         "start_time_unix_nano": "1",
///         "end_time_unix_nano": "2",
///     }))
///     .unwrap()
/// };
///
/// let mut store = TraceStore::new();
/// let mut registry = ResourceRegistry::new();
///
/// // Child first: shown as a root until its parent arrives.
/// store.add_span(span("c", Some("p")), &mut registry).unwrap();
/// assert_eq!(store.roots().len(), 1);
///
/// store.add_span(span("p", None), &mut registry).unwrap();
/// let roots = store.roots();
/// assert_eq!(roots.len(), 1);
/// assert_eq!(roots[0].span_id, "p");
/// assert_eq!(roots[0].children, vec!["t1-c".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct TraceStore {
    index: HashMap<String, Span>,
    roots: Vec<String>,
    orphans: HashMap<String, Vec<String>>,
}

impl TraceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps and inserts one span, registering its resource.
    ///
    /// Duplicate keys are detected before mapping, so a re-delivered span is
    /// a no-op even if its payload differs.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the span's timestamps are malformed; the
    /// store is left untouched.
    pub fn add_span(
        &mut self,
        dto: SpanDto,
        registry: &mut ResourceRegistry,
    ) -> Result<SpanInsert, ParseError> {
        let key = dto.key();
        if self.index.contains_key(&key) {
            tracing::debug!(key = %key, "Dropped duplicate span");
            return Ok(SpanInsert::Duplicate);
        }

        let span = Span::try_from(dto)?;
        registry.add(&span.resource);
        Ok(self.insert(span))
    }

    /// Inserts an already-mapped span and resolves its linkage.
    pub fn insert(&mut self, mut span: Span) -> SpanInsert {
        let key = span.key();
        if self.index.contains_key(&key) {
            tracing::debug!(key = %key, "Dropped duplicate span");
            return SpanInsert::Duplicate;
        }

        if let Some(adopted) = self.orphans.remove(&key) {
            tracing::debug!(key = %key, count = adopted.len(), "Adopted orphaned spans");
            self.roots.retain(|root| !adopted.contains(root));
            span.children.extend(adopted);
        }

        let parent_key = span.parent_key();
        self.index.insert(key.clone(), span);

        match parent_key {
            None => self.roots.push(key),
            Some(parent_key) => {
                if let Some(parent) = self.index.get_mut(&parent_key) {
                    parent.children.push(key);
                } else {
                    tracing::debug!(key = %key, parent = %parent_key, "Parent not seen yet, holding span as orphan");
                    self.roots.push(key.clone());
                    self.orphans.entry(parent_key).or_default().push(key);
                }
            }
        }

        SpanInsert::Inserted
    }

    /// Number of indexed spans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if no span has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Looks up a span by its `trace_id-span_id` key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Span> {
        self.index.get(key)
    }

    /// Returns true if the key is indexed.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys of the root list, in append order across all traces.
    #[must_use]
    pub fn root_keys(&self) -> &[String] {
        &self.roots
    }

    /// Spans currently displayed as top level: true roots plus orphans.
    #[must_use]
    pub fn roots(&self) -> Vec<&Span> {
        self.roots.iter().filter_map(|k| self.index.get(k)).collect()
    }

    /// Root-list spans of one trace.
    #[must_use]
    pub fn roots_for_trace(&self, trace_id: &str) -> Vec<&Span> {
        self.roots()
            .into_iter()
            .filter(|span| span.trace_id == trace_id)
            .collect()
    }

    /// Root-list spans emitted by one resource. Nested spans are not
    /// considered.
    #[must_use]
    pub fn spans_for_resource(&self, resource_key: &str) -> Vec<&Span> {
        self.roots()
            .into_iter()
            .filter(|span| span.resource.key() == resource_key)
            .collect()
    }

    /// Every indexed span, in no particular order.
    pub fn flat_spans(&self) -> impl Iterator<Item = &Span> {
        self.index.values()
    }

    /// Every indexed span of one trace, wherever it sits in the tree.
    #[must_use]
    pub fn spans_for_trace(&self, trace_id: &str) -> Vec<&Span> {
        self.index
            .values()
            .filter(|span| span.trace_id == trace_id)
            .collect()
    }

    /// Direct children of a span, in arrival order.
    #[must_use]
    pub fn children(&self, span: &Span) -> Vec<&Span> {
        span.children
            .iter()
            .filter_map(|k| self.index.get(k))
            .collect()
    }

    /// Orphan waiting lists, keyed by the missing parent's span key.
    #[must_use]
    pub fn orphans(&self) -> &HashMap<String, Vec<String>> {
        &self.orphans
    }

    /// Keys of parents that are named by some span but were never seen.
    #[must_use]
    pub fn pending_parents(&self) -> Vec<&str> {
        let mut pending: Vec<&str> = self.orphans.keys().map(String::as_str).collect();
        pending.sort_unstable();
        pending
    }

    /// Resolves the subtree under `key`.
    ///
    /// A span already on the current path is not expanded again, so a cyclic
    /// parent chain cannot recurse forever.
    #[must_use]
    pub fn tree(&self, key: &str) -> Option<SpanNode<'_>> {
        let mut visited = HashSet::new();
        self.build_node(key, &mut visited)
    }

    /// Resolves the subtree of every given root.
    #[must_use]
    pub fn trees<'a>(&'a self, roots: &[&'a Span]) -> Vec<SpanNode<'a>> {
        roots
            .iter()
            .filter_map(|root| self.tree(&root.key()))
            .collect()
    }

    fn build_node<'a>(&'a self, key: &str, visited: &mut HashSet<String>) -> Option<SpanNode<'a>> {
        let span = self.index.get(key)?;
        if !visited.insert(key.to_string()) {
            return None;
        }
        let children = span
            .children
            .iter()
            .filter_map(|child| self.build_node(child, visited))
            .collect();
        visited.remove(key);
        Some(SpanNode { span, children })
    }
}
