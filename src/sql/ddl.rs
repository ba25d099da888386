//! DDL generation for stored table descriptions
//!
//! Produces `CREATE TABLE` / `CREATE VIEW` statements that recreate an
//! equivalent catalog entry when executed. Two dialects are supported:
//!
//! - [`Dialect::Native`]: `USING <provider>` with `OPTIONS`, partition columns
//!   inline and named again in `PARTITIONED BY`.
//! - [`Dialect::SerdeCompatible`]: the legacy Hive form with `ROW FORMAT`,
//!   `STORED AS INPUTFORMAT ... OUTPUTFORMAT ...` and partition columns
//!   declared only in `PARTITIONED BY`.
//!
//! Anything that cannot be expressed faithfully is rejected; no text is
//! returned alongside an error.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DdlConfig;
use crate::error::{DdlError, Result};
use crate::format::to_provider_tag;
use crate::properties::filter_properties;
use crate::sql::sanitize::{quote_identifier, quote_string, quote_table_identifier};
use crate::table::{BucketSpec, RowFormatDelimiters, TableDescription, TableKind};
use crate::types::Column;

/// Textual convention used for storage details
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `USING <provider>` data source syntax
    Native,
    /// Hive `ROW FORMAT` / `STORED AS` syntax (`SHOW CREATE TABLE ... AS SERDE`)
    SerdeCompatible,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Native => write!(f, "native"),
            Dialect::SerdeCompatible => write!(f, "serde-compatible"),
        }
    }
}

/// Generate DDL with the default configuration
pub fn generate(table: &TableDescription, dialect: Dialect) -> Result<String> {
    DdlGenerator::new(&DdlConfig::default()).generate(table, dialect)
}

/// DDL generator for stored table descriptions
pub struct DdlGenerator<'a> {
    config: &'a DdlConfig,
}

impl<'a> DdlGenerator<'a> {
    /// Create a new DDL generator with the given configuration
    pub fn new(config: &'a DdlConfig) -> Self {
        Self { config }
    }

    /// Generate the statement that recreates `table` in `dialect`
    pub fn generate(&self, table: &TableDescription, dialect: Dialect) -> Result<String> {
        let result = self.check_supported(table).and_then(|()| {
            match (table.kind, dialect) {
                (TableKind::View, _) => self.view_ddl(table),
                (_, Dialect::Native) => self.native_table_ddl(table),
                (_, Dialect::SerdeCompatible) => self.serde_table_ddl(table),
            }
        });

        match &result {
            Ok(ddl) => debug!(table = %table.identifier, %dialect, ddl = %ddl, "generated DDL"),
            Err(e) => warn!(table = %table.identifier, %dialect, error = %e, "cannot generate DDL"),
        }

        result
    }

    /// Reject constructs that no dialect can reproduce
    fn check_supported(&self, table: &TableDescription) -> Result<()> {
        let ident = self.qualified_name(table);

        if table.is_transactional() {
            return Err(DdlError::unsupported(format!(
                "transactional table not supported: {} is a transactional Hive table",
                ident
            )));
        }

        if table.is_view() && !table.partition_column_names.is_empty() {
            return Err(DdlError::unsupported(format!(
                "partitioned view not supported: {}",
                ident
            )));
        }

        if !table.unsupported_features.is_empty() {
            return Err(DdlError::unsupported(format!(
                "{} uses features with no DDL form: {}",
                ident,
                table.unsupported_features.join(", ")
            )));
        }

        Ok(())
    }

    // =========================================================================
    // Views
    // =========================================================================

    fn view_ddl(&self, table: &TableDescription) -> Result<String> {
        let ident = self.qualified_name(table);
        let view = table.view.as_ref().ok_or_else(|| {
            DdlError::validation(format!("view {} has no stored query", ident))
        })?;

        let mut ddl = format!("CREATE VIEW {}", ident);
        if !view.column_aliases.is_empty() {
            let aliases: Vec<String> = view
                .column_aliases
                .iter()
                .map(|alias| match &alias.comment {
                    Some(comment) => format!(
                        "{} COMMENT {}",
                        quote_identifier(&alias.name),
                        quote_string(comment)
                    ),
                    None => quote_identifier(&alias.name),
                })
                .collect();
            ddl.push_str(&format!(" ({})", aliases.join(", ")));
        }

        let mut clauses = Vec::new();
        clauses.extend(comment_clause(table));
        clauses.extend(properties_clause("TBLPROPERTIES", &filter_properties(&table.properties)));
        clauses.push(format!("AS {}", view.query));

        Ok(join_clauses(ddl, clauses))
    }

    // =========================================================================
    // Native dialect
    // =========================================================================

    fn native_table_ddl(&self, table: &TableDescription) -> Result<String> {
        table.validate()?;

        let provider = self.native_provider(table)?;
        let columns: Vec<&Column> = table.schema.iter().collect();

        let mut clauses = vec![format!("USING {}", provider)];
        clauses.extend(properties_clause("OPTIONS", &table.storage.properties));

        if !table.partition_column_names.is_empty() {
            let names: Vec<String> = table
                .partition_columns()?
                .iter()
                .map(|c| quote_identifier(&c.name))
                .collect();
            clauses.push(format!("PARTITIONED BY ({})", names.join(", ")));
        }

        clauses.extend(table.bucket_spec.as_ref().map(bucket_clause));
        clauses.extend(location_clause(table));
        clauses.extend(comment_clause(table));
        clauses.extend(properties_clause("TBLPROPERTIES", &filter_properties(&table.properties)));

        Ok(join_clauses(self.table_header("CREATE TABLE", table, &columns), clauses))
    }

    /// Provider to put after `USING`, translating Hive storage if needed
    fn native_provider(&self, table: &TableDescription) -> Result<String> {
        let storage = &table.storage;

        if !table.is_hive_table() {
            if !storage.delimiters.is_empty() {
                return Err(DdlError::unsupported(format!(
                    "row format delimiters of {} cannot be expressed with USING {}",
                    self.qualified_name(table),
                    table.provider.as_deref().unwrap_or_default()
                )));
            }
            return Ok(table.provider.clone().unwrap_or_default());
        }

        to_provider_tag(
            storage.input_format.as_deref(),
            storage.output_format.as_deref(),
            storage.serde.as_deref(),
        )
        .map(str::to_string)
        .ok_or_else(|| {
            DdlError::unsupported(format!(
                "unsupported serde configuration for {} (input format: {}, output format: {}, serde: {}); use the {} dialect instead",
                self.qualified_name(table),
                storage.input_format.as_deref().unwrap_or("none"),
                storage.output_format.as_deref().unwrap_or("none"),
                storage.serde.as_deref().unwrap_or("none"),
                Dialect::SerdeCompatible
            ))
        })
    }

    // =========================================================================
    // Serde-compatible dialect
    // =========================================================================

    fn serde_table_ddl(&self, table: &TableDescription) -> Result<String> {
        if !table.is_hive_table() {
            return Err(DdlError::dialect_mismatch(format!(
                "cannot express non-legacy provider '{}' of {} in compatibility dialect; use the {} dialect instead",
                table.provider.as_deref().unwrap_or_default(),
                self.qualified_name(table),
                Dialect::Native
            )));
        }

        table.validate()?;

        let partition_columns = table.partition_columns()?;
        let keyword = if table.is_external() {
            "CREATE EXTERNAL TABLE"
        } else {
            "CREATE TABLE"
        };

        let mut clauses = Vec::new();
        clauses.extend(comment_clause(table));

        if !partition_columns.is_empty() {
            let defs: Vec<String> = partition_columns.iter().map(|c| c.to_ddl()).collect();
            clauses.push(format!("PARTITIONED BY ({})", defs.join(", ")));
        }

        clauses.extend(table.bucket_spec.as_ref().map(bucket_clause));
        clauses.extend(self.row_format_clauses(table)?);
        clauses.extend(self.stored_as_clause(table)?);
        clauses.extend(location_clause(table));
        clauses.extend(properties_clause("TBLPROPERTIES", &filter_properties(&table.properties)));

        let columns = table.data_columns();
        Ok(join_clauses(self.table_header(keyword, table, &columns), clauses))
    }

    fn row_format_clauses(&self, table: &TableDescription) -> Result<Vec<String>> {
        let storage = &table.storage;

        if let Some(serde) = &storage.serde {
            let mut clauses = vec![format!("ROW FORMAT SERDE {}", quote_string(serde))];
            clauses.extend(properties_clause("WITH SERDEPROPERTIES", &storage.properties));
            return Ok(clauses);
        }

        if !storage.properties.is_empty() {
            return Err(DdlError::unsupported(format!(
                "serde properties of {} require a serde class",
                self.qualified_name(table)
            )));
        }

        Ok(delimited_clause(&storage.delimiters).into_iter().collect())
    }

    fn stored_as_clause(&self, table: &TableDescription) -> Result<Option<String>> {
        let storage = &table.storage;
        match (&storage.input_format, &storage.output_format) {
            (Some(input), Some(output)) => Ok(Some(format!(
                "STORED AS INPUTFORMAT {} OUTPUTFORMAT {}",
                quote_string(input),
                quote_string(output)
            ))),
            (None, None) => Ok(None),
            _ => Err(DdlError::unsupported(format!(
                "{} declares only one of input format and output format",
                self.qualified_name(table)
            ))),
        }
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    fn qualified_name(&self, table: &TableDescription) -> String {
        quote_table_identifier(&table.identifier, &self.config.current_namespace)
    }

    fn table_header(&self, keyword: &str, table: &TableDescription, columns: &[&Column]) -> String {
        let ident = self.qualified_name(table);
        if columns.is_empty() {
            return format!("{} {}", keyword, ident);
        }
        let defs: Vec<String> = columns.iter().map(|c| c.to_ddl()).collect();
        format!("{} {} ({})", keyword, ident, defs.join(", "))
    }
}

fn join_clauses(header: String, clauses: Vec<String>) -> String {
    let mut ddl = header;
    for clause in clauses {
        ddl.push('\n');
        ddl.push_str(&clause);
    }
    ddl
}

fn bucket_clause(spec: &BucketSpec) -> String {
    let columns: Vec<String> = spec
        .bucket_column_names
        .iter()
        .map(|name| quote_identifier(name))
        .collect();
    let mut clause = format!("CLUSTERED BY ({})", columns.join(", "));

    if !spec.sort_columns.is_empty() {
        let sorts: Vec<String> = spec
            .sort_columns
            .iter()
            .map(|s| format!("{} {}", quote_identifier(&s.name), s.direction))
            .collect();
        clause.push_str(&format!(" SORTED BY ({})", sorts.join(", ")));
    }

    clause.push_str(&format!(" INTO {} BUCKETS", spec.num_buckets));
    clause
}

fn delimited_clause(delimiters: &RowFormatDelimiters) -> Option<String> {
    if delimiters.is_empty() {
        return None;
    }

    let parts = [
        ("FIELDS TERMINATED BY", &delimiters.field),
        ("COLLECTION ITEMS TERMINATED BY", &delimiters.collection_items),
        ("MAP KEYS TERMINATED BY", &delimiters.map_keys),
        ("LINES TERMINATED BY", &delimiters.lines),
        ("NULL DEFINED AS", &delimiters.null_defined_as),
    ];

    let mut clause = "ROW FORMAT DELIMITED".to_string();
    for (keyword, value) in parts {
        if let Some(value) = value {
            clause.push_str(&format!(" {} {}", keyword, quote_string(value)));
        }
    }
    Some(clause)
}

fn location_clause(table: &TableDescription) -> Option<String> {
    if !table.is_external() {
        return None;
    }
    table
        .storage
        .location
        .as_ref()
        .map(|location| format!("LOCATION {}", quote_string(location)))
}

fn comment_clause(table: &TableDescription) -> Option<String> {
    table
        .comment
        .as_ref()
        .map(|comment| format!("COMMENT {}", quote_string(comment)))
}

fn properties_clause(keyword: &str, properties: &BTreeMap<String, String>) -> Option<String> {
    if properties.is_empty() {
        return None;
    }
    let pairs: Vec<String> = properties
        .iter()
        .map(|(k, v)| format!("{} = {}", quote_string(k), quote_string(v)))
        .collect();
    Some(format!("{} ({})", keyword, pairs.join(", ")))
}
