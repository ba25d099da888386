//! Table property filtering
//!
//! Removes properties that the catalog manages itself or that change on every
//! write, so that two otherwise identical tables compare equal.

use std::collections::BTreeMap;

/// Property keys that never take part in comparisons or generated DDL
pub const NONDETERMINISTIC_PROPERTIES: &[&str] = &[
    "CreateTime",
    "transient_lastDdlTime",
    "grantTime",
    "lastUpdateTime",
    "last_modified_by",
    "last_modified_time",
    "Owner:",
    "totalNumberFiles",
    "maxFileSize",
    "minFileSize",
];

/// Property that marks a Hive ACID table
pub const TRANSACTIONAL_PROPERTY: &str = "transactional";

/// Property the catalog stamps on Hive tables at creation
pub const LAST_DDL_TIME_PROPERTY: &str = "transient_lastDdlTime";

/// Whether a key is managed by the catalog rather than the user
pub fn is_nondeterministic(key: &str) -> bool {
    NONDETERMINISTIC_PROPERTIES.contains(&key)
}

/// Drop catalog-managed keys; matching is exact on the key name
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use catalog_ddl::properties::filter_properties;
///
/// let props = BTreeMap::from([
///     ("CreateTime".to_string(), "123".to_string()),
///     ("prop1".to_string(), "value1".to_string()),
/// ]);
/// let filtered = filter_properties(&props);
/// assert_eq!(filtered.len(), 1);
/// assert_eq!(filtered["prop1"], "value1");
/// ```
pub fn filter_properties(properties: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    properties
        .iter()
        .filter(|(key, _)| !is_nondeterministic(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Whether the properties declare a transactional table
pub fn is_transactional(properties: &BTreeMap<String, String>) -> bool {
    properties
        .get(TRANSACTIONAL_PROPERTY)
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}
