//! Table and view descriptions as stored by a catalog

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DdlError, Result};
use crate::format::is_hive_provider;
use crate::properties::is_transactional;
use crate::sql::sanitize::quote_identifier;
use crate::types::Column;

/// Namespace-qualified table name
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableIdentifier {
    pub namespace: Option<String>,
    pub name: String,
}

impl TableIdentifier {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Fill in the namespace if the identifier has none
    pub fn qualified(&self, current_namespace: &str) -> Self {
        Self {
            namespace: Some(
                self.namespace
                    .clone()
                    .unwrap_or_else(|| current_namespace.to_string()),
            ),
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}.{}", quote_identifier(ns), quote_identifier(&self.name)),
            None => write!(f, "{}", quote_identifier(&self.name)),
        }
    }
}

/// Kind of catalog entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableKind {
    ManagedTable,
    ExternalTable,
    View,
}

/// Sort order of a bucket sort column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortColumn {
    pub name: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortColumn {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Hash bucketing of data files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BucketSpec {
    pub num_buckets: u32,
    pub bucket_column_names: Vec<String>,
    #[serde(default)]
    pub sort_columns: Vec<SortColumn>,
}

impl BucketSpec {
    pub fn new(num_buckets: u32, bucket_column_names: Vec<String>) -> Self {
        Self {
            num_buckets,
            bucket_column_names,
            sort_columns: Vec::new(),
        }
    }

    pub fn sorted_by(mut self, sort_columns: Vec<SortColumn>) -> Self {
        self.sort_columns = sort_columns;
        self
    }
}

/// `ROW FORMAT DELIMITED` terminators
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowFormatDelimiters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_items: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_keys: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_defined_as: Option<String>,
}

impl RowFormatDelimiters {
    pub fn is_empty(&self) -> bool {
        self.field.is_none()
            && self.collection_items.is_none()
            && self.map_keys.is_none()
            && self.lines.is_none()
            && self.null_defined_as.is_none()
    }
}

/// Physical storage of a table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serde: Option<String>,
    /// Serde properties of Hive tables, options of data source tables
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Only meaningful when `serde` is not set
    #[serde(default)]
    pub delimiters: RowFormatDelimiters,
}

/// Output column of a view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewColumn {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ViewColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Stored query of a view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewDefinition {
    pub query: String,
    #[serde(default)]
    pub column_aliases: Vec<ViewColumn>,
}

impl ViewDefinition {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            column_aliases: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: Vec<ViewColumn>) -> Self {
        self.column_aliases = aliases;
        self
    }
}

/// Statistics gathered by the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableStatistics {
    pub size_in_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

/// Everything a catalog knows about a table or view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableDescription {
    pub identifier: TableIdentifier,
    pub kind: TableKind,
    /// Ordered columns, partition columns included
    pub schema: Vec<Column>,
    #[serde(default)]
    pub partition_column_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_spec: Option<BucketSpec>,
    #[serde(default)]
    pub storage: StorageFormat,
    /// `hive` (or absent) for legacy serde tables, else a data source name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewDefinition>,
    pub create_time: DateTime<Utc>,
    pub last_access_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<TableStatistics>,
    #[serde(default)]
    pub ignored_properties: BTreeMap<String, String>,
    /// Legacy features that were loaded but have no DDL form
    #[serde(default)]
    pub unsupported_features: Vec<String>,
    #[serde(default)]
    pub tracks_partitions_in_catalog: bool,
}

impl TableDescription {
    /// Create a description with the given columns and everything else empty
    pub fn new(identifier: TableIdentifier, kind: TableKind, schema: Vec<Column>) -> Self {
        let now = Utc::now();
        Self {
            identifier,
            kind,
            schema,
            partition_column_names: Vec::new(),
            bucket_spec: None,
            storage: StorageFormat::default(),
            provider: None,
            comment: None,
            properties: BTreeMap::new(),
            view: None,
            create_time: now,
            last_access_time: now,
            stats: None,
            ignored_properties: BTreeMap::new(),
            unsupported_features: Vec::new(),
            tracks_partitions_in_catalog: false,
        }
    }

    /// Create a view description
    pub fn view(identifier: TableIdentifier, definition: ViewDefinition) -> Self {
        let mut table = Self::new(identifier, TableKind::View, Vec::new());
        table.view = Some(definition);
        table
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_partition_columns(mut self, names: Vec<String>) -> Self {
        self.partition_column_names = names;
        self
    }

    pub fn with_bucket_spec(mut self, spec: BucketSpec) -> Self {
        self.bucket_spec = Some(spec);
        self
    }

    pub fn with_storage(mut self, storage: StorageFormat) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn is_view(&self) -> bool {
        self.kind == TableKind::View
    }

    pub fn is_external(&self) -> bool {
        self.kind == TableKind::ExternalTable
    }

    /// Whether this table uses the legacy Hive serde convention
    pub fn is_hive_table(&self) -> bool {
        !self.is_view() && is_hive_provider(self.provider.as_deref())
    }

    pub fn is_transactional(&self) -> bool {
        is_transactional(&self.properties)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.schema.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn is_partition_column(&self, name: &str) -> bool {
        self.partition_column_names
            .iter()
            .any(|p| p.eq_ignore_ascii_case(name))
    }

    /// Columns that are not partition columns, in schema order
    pub fn data_columns(&self) -> Vec<&Column> {
        self.schema
            .iter()
            .filter(|c| !self.is_partition_column(&c.name))
            .collect()
    }

    /// Partition columns in partitioning order
    pub fn partition_columns(&self) -> Result<Vec<&Column>> {
        self.partition_column_names
            .iter()
            .map(|name| {
                self.column(name).ok_or_else(|| {
                    DdlError::validation(format!(
                        "partition column '{}' of {} is not in the schema",
                        name, self.identifier
                    ))
                })
            })
            .collect()
    }

    /// Check the structural invariants of a table
    ///
    /// Views are not checked: their partition columns refer to the query
    /// output, which is not known here.
    pub fn validate(&self) -> Result<()> {
        if self.is_view() {
            return Ok(());
        }

        let mut seen = std::collections::HashSet::new();
        for col in &self.schema {
            if !seen.insert(col.name.to_lowercase()) {
                return Err(DdlError::validation(format!(
                    "duplicate column '{}' in {}",
                    col.name, self.identifier
                )));
            }
        }

        self.partition_columns()?;

        if let Some(spec) = &self.bucket_spec {
            if spec.num_buckets == 0 {
                return Err(DdlError::validation(format!(
                    "number of buckets of {} must be greater than 0",
                    self.identifier
                )));
            }
            let names = spec
                .bucket_column_names
                .iter()
                .chain(spec.sort_columns.iter().map(|s| &s.name));
            for name in names {
                if self.column(name).is_none() {
                    return Err(DdlError::validation(format!(
                        "bucket column '{}' of {} is not in the schema",
                        name, self.identifier
                    )));
                }
            }
        }

        Ok(())
    }
}
