//! Composite identity keys.
//!
//! Every collection in the core indexes its records by one of these keys, so
//! they must be deterministic and total: the same logical record always maps
//! to the same key.

/// Separator between the four resource identity fields.
pub const RESOURCE_KEY_SEPARATOR: char = '|';

/// Separator between trace id and span id. Ids are lowercase hex in practice,
/// so a dash never appears inside either half.
pub const SPAN_KEY_SEPARATOR: char = '-';

/// Derives the resource key `namespace|name|version|instance`.
///
/// Two distinct processes reporting identical namespace, name, version and
/// instance id are indistinguishable.
///
/// # Example
///
/// ```
/// use shared::identity::resource_key;
///
/// let key = resource_key("shop", "checkout", "1.2.0", "a1b2c3d4");
/// assert_eq!(key, "shop|checkout|1.2.0|a1b2c3d4");
/// ```
#[must_use]
pub fn resource_key(namespace: &str, name: &str, version: &str, instance_id: &str) -> String {
    let mut key = String::with_capacity(
        namespace.len() + name.len() + version.len() + instance_id.len() + 3,
    );
    for (i, part) in [namespace, name, version, instance_id].iter().enumerate() {
        if i > 0 {
            key.push(RESOURCE_KEY_SEPARATOR);
        }
        key.push_str(part);
    }
    key
}

/// Derives the span key `trace_id-span_id`.
///
/// # Example
///
/// ```
/// use shared::identity::span_key;
///
/// assert_eq!(span_key("4bf92f35", "00f067aa"), "4bf92f35-00f067aa");
/// ```
#[must_use]
pub fn span_key(trace_id: &str, span_id: &str) -> String {
    format!("{trace_id}{SPAN_KEY_SEPARATOR}{span_id}")
}

/// Derives the metric series key `name|unit|type|resource_key`.
#[must_use]
pub fn metric_key(name: &str, unit: &str, metric_type: &str, resource_key: &str) -> String {
    format!("{name}|{unit}|{metric_type}|{resource_key}")
}
