//! Catalog access and DDL execution
//!
//! The generator only needs to look tables up; round trips additionally need
//! to drop a table and run the generated statement. Those seams are the
//! [`Catalog`] and [`DdlExecutor`] traits. [`InMemoryCatalog`] implements both
//! for the statement subset understood by [`crate::sql::parser`].

use std::collections::BTreeMap;

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DdlConfig;
use crate::error::{DdlError, Result};
use crate::format::{DEFAULT_HIVE_FORMAT, HIVE_PROVIDER, format_names, is_hive_provider, to_triple};
use crate::properties::LAST_DDL_TIME_PROPERTY;
use crate::sql::ddl::DdlGenerator;
use crate::sql::parser::{
    CreateTable, CreateView, DropObject, PartitionItem, RowFormat, Statement, StoredAs,
    parse_statement,
};
use crate::sql::sanitize::validate_identifier;
use crate::table::{StorageFormat, TableDescription, TableIdentifier, TableKind, ViewDefinition};
use crate::types::Column;

/// Read and drop access to table descriptions
pub trait Catalog: Send + Sync {
    /// Look up a table or view
    fn get_table(&self, identifier: &TableIdentifier) -> Result<TableDescription>;

    fn table_exists(&self, identifier: &TableIdentifier) -> bool;

    /// Drop a table or view of any kind
    fn drop_table(&self, identifier: &TableIdentifier) -> Result<()>;

    /// Identifiers of every table and view in a namespace, sorted by name
    fn list_tables(&self, namespace: &str) -> Result<Vec<TableIdentifier>>;
}

/// Runs DDL statements against a catalog
pub trait DdlExecutor {
    fn execute(&self, sql: &str) -> Result<StatementResult>;
}

/// Outcome of an executed statement
#[derive(Debug, Clone, PartialEq)]
pub enum StatementResult {
    TableCreated(TableIdentifier),
    ViewCreated(TableIdentifier),
    Dropped(TableIdentifier),
    NamespaceCreated(String),
    NamespaceDropped(String),
    /// `IF [NOT] EXISTS` made the statement a no-op
    Unchanged,
    /// Text produced by `SHOW CREATE TABLE`
    Ddl(String),
}

/// Serialized form of a whole catalog
#[derive(Debug, Serialize, Deserialize)]
struct CatalogSnapshot {
    namespaces: Vec<String>,
    tables: Vec<TableDescription>,
}

type Namespaces = BTreeMap<String, BTreeMap<String, TableDescription>>;

/// Thread-safe in-memory catalog
///
/// Starts with a single empty namespace named after the configured current
/// namespace. Namespace and table names are stored lowercase; column names
/// keep their casing.
///
/// # Example
///
/// ```
/// use catalog_ddl::catalog::{Catalog, DdlExecutor, InMemoryCatalog};
/// use catalog_ddl::table::TableIdentifier;
///
/// let catalog = InMemoryCatalog::default();
/// catalog.execute("CREATE TABLE t1 (a INT) USING parquet").unwrap();
///
/// let table = catalog.get_table(&TableIdentifier::unqualified("t1")).unwrap();
/// assert_eq!(table.provider.as_deref(), Some("parquet"));
/// ```
#[derive(Debug)]
pub struct InMemoryCatalog {
    config: DdlConfig,
    namespaces: RwLock<Namespaces>,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new(DdlConfig::default())
    }
}

impl InMemoryCatalog {
    pub fn new(config: DdlConfig) -> Self {
        let mut namespaces = BTreeMap::new();
        namespaces.insert(config.current_namespace.to_lowercase(), BTreeMap::new());
        Self {
            config,
            namespaces: RwLock::new(namespaces),
        }
    }

    pub fn config(&self) -> &DdlConfig {
        &self.config
    }

    pub fn namespace_exists(&self, namespace: &str) -> bool {
        self.namespaces.read().contains_key(&namespace.to_lowercase())
    }

    pub fn list_namespaces(&self) -> Vec<String> {
        self.namespaces.read().keys().cloned().collect()
    }

    /// Store a description as-is, replacing any entry with the same name
    ///
    /// Used to seed tables whose metadata no statement can produce, such as
    /// unsupported legacy features or statistics.
    pub fn register_table(&self, mut table: TableDescription) -> Result<()> {
        table.identifier = self.resolve(&table.identifier)?;
        table.validate()?;

        let mut namespaces = self.namespaces.write();
        let tables = namespace_mut(&mut namespaces, &table.identifier)?;
        info!(table = %table.identifier, "registered table");
        tables.insert(table.identifier.name.clone(), table);
        Ok(())
    }

    /// Serialize every namespace and table to JSON
    pub fn export_json(&self) -> Result<String> {
        let namespaces = self.namespaces.read();
        let snapshot = CatalogSnapshot {
            namespaces: namespaces.keys().cloned().collect(),
            tables: namespaces
                .values()
                .flat_map(|tables| tables.values().cloned())
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Load a snapshot produced by [`export_json`](Self::export_json)
    ///
    /// Namespaces are created as needed and tables with the same name are
    /// replaced. Returns the number of tables loaded.
    pub fn import_json(&self, json: &str) -> Result<usize> {
        let snapshot: CatalogSnapshot = serde_json::from_str(json)?;

        for namespace in &snapshot.namespaces {
            validate_name(namespace)?;
        }
        for table in &snapshot.tables {
            table.validate()?;
        }

        let mut namespaces = self.namespaces.write();
        for namespace in snapshot.namespaces {
            namespaces.entry(namespace.to_lowercase()).or_default();
        }

        let count = snapshot.tables.len();
        for table in snapshot.tables {
            let identifier = table.identifier.qualified(&self.config.current_namespace);
            let namespace = identifier.namespace.clone().unwrap_or_default();
            namespaces
                .entry(namespace)
                .or_default()
                .insert(identifier.name.clone(), TableDescription { identifier, ..table });
        }

        info!(tables = count, "imported catalog snapshot");
        Ok(count)
    }

    /// Qualify with the current namespace, lowercase and validate
    fn resolve(&self, identifier: &TableIdentifier) -> Result<TableIdentifier> {
        let namespace = identifier
            .namespace
            .as_deref()
            .unwrap_or(&self.config.current_namespace)
            .to_lowercase();
        let name = identifier.name.to_lowercase();
        validate_name(&namespace)?;
        validate_name(&name)?;
        Ok(TableIdentifier::new(namespace, name))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn create_table(&self, statement: CreateTable) -> Result<StatementResult> {
        let identifier = self.resolve(&statement.name)?;

        {
            let namespaces = self.namespaces.read();
            if lookup(&namespaces, &identifier)?.is_some() {
                if statement.if_not_exists {
                    debug!(table = %identifier, "table exists, skipping creation");
                    return Ok(StatementResult::Unchanged);
                }
                return Err(DdlError::already_exists(format!(
                    "table or view {} already exists",
                    identifier
                )));
            }
        }

        let if_not_exists = statement.if_not_exists;
        let table = self.build_table(identifier.clone(), statement)?;
        self.insert_table(table, if_not_exists)
    }

    /// Store a freshly built table unless the name was taken in the meantime
    fn insert_table(&self, table: TableDescription, if_not_exists: bool) -> Result<StatementResult> {
        let identifier = table.identifier.clone();
        let mut namespaces = self.namespaces.write();
        let tables = namespace_mut(&mut namespaces, &identifier)?;
        if tables.contains_key(&identifier.name) {
            if if_not_exists {
                debug!(table = %identifier, "table created concurrently, skipping creation");
                return Ok(StatementResult::Unchanged);
            }
            return Err(DdlError::already_exists(format!(
                "table or view {} already exists",
                identifier
            )));
        }
        info!(
            table = %identifier,
            kind = ?table.kind,
            provider = table.provider.as_deref().unwrap_or_default(),
            "created table"
        );
        tables.insert(identifier.name.clone(), table);
        Ok(StatementResult::TableCreated(identifier))
    }

    fn build_table(
        &self,
        identifier: TableIdentifier,
        statement: CreateTable,
    ) -> Result<TableDescription> {
        let provider = statement.provider.as_deref().map(str::to_lowercase);
        let hive = match provider.as_deref() {
            Some(p) => is_hive_provider(Some(p)),
            None => {
                statement.has_hive_clauses()
                    || self.config.create_hive_table_by_default
                    || is_hive_provider(Some(&self.config.default_provider))
            }
        };

        if !hive && statement.has_hive_clauses() {
            return Err(DdlError::validation(format!(
                "ROW FORMAT and STORED AS cannot be combined with USING {} in {}",
                provider.as_deref().unwrap_or_default(),
                identifier
            )));
        }

        let (schema, partition_column_names) =
            arrange_columns(&identifier, statement.columns, statement.partition_by)?;

        let kind = match (&statement.location, statement.external) {
            (Some(_), _) => TableKind::ExternalTable,
            (None, true) => {
                return Err(DdlError::validation(format!(
                    "external table {} requires a LOCATION",
                    identifier
                )));
            }
            (None, false) => TableKind::ManagedTable,
        };
        let location = statement.location.unwrap_or_else(|| {
            let namespace = identifier.namespace.as_deref().unwrap_or_default();
            self.config.default_table_location(namespace, &identifier.name)
        });

        let mut table = TableDescription::new(identifier.clone(), kind, schema)
            .with_partition_columns(partition_column_names);
        table.bucket_spec = statement.bucket_spec;
        table.comment = statement.comment;
        table.properties = statement.properties;

        if hive {
            table.storage = self.hive_storage(&identifier, statement.row_format, statement.stored_as)?;
            table.storage.properties.extend(statement.options);
            table.provider = Some(HIVE_PROVIDER.to_string());
            table.properties.insert(
                LAST_DDL_TIME_PROPERTY.to_string(),
                Utc::now().timestamp().to_string(),
            );
        } else {
            table.storage.properties = statement.options;
            table.provider = Some(provider.unwrap_or_else(|| self.config.default_provider.clone()));
        }
        table.storage.location = Some(location);

        table.validate()?;
        Ok(table)
    }

    fn hive_storage(
        &self,
        identifier: &TableIdentifier,
        row_format: Option<RowFormat>,
        stored_as: Option<StoredAs>,
    ) -> Result<StorageFormat> {
        let (input_format, output_format, format_serde) = match stored_as {
            Some(StoredAs::InputOutput { input, output }) => (input, output, None),
            Some(StoredAs::Format(name)) => {
                let triple = to_triple(&name).ok_or_else(|| {
                    DdlError::validation(format!(
                        "unknown file format '{}' for {}; expected one of: {}",
                        name,
                        identifier,
                        format_names().collect::<Vec<_>>().join(", ")
                    ))
                })?;
                if triple.serde.is_some() && matches!(row_format, Some(RowFormat::Delimited(_))) {
                    return Err(DdlError::validation(format!(
                        "ROW FORMAT DELIMITED is only compatible with text formats, not '{}' ({})",
                        name, identifier
                    )));
                }
                (
                    triple.input_format.to_string(),
                    triple.output_format.to_string(),
                    triple.serde.map(str::to_string),
                )
            }
            None => {
                let triple = to_triple(DEFAULT_HIVE_FORMAT).ok_or_else(|| {
                    DdlError::validation(format!("default format '{}' is not registered", DEFAULT_HIVE_FORMAT))
                })?;
                (
                    triple.input_format.to_string(),
                    triple.output_format.to_string(),
                    triple.serde.map(str::to_string),
                )
            }
        };

        let mut storage = StorageFormat {
            input_format: Some(input_format),
            output_format: Some(output_format),
            ..Default::default()
        };

        match row_format {
            Some(RowFormat::Serde { class, properties }) => {
                storage.serde = Some(class);
                storage.properties = properties;
            }
            Some(RowFormat::Delimited(delimiters)) => storage.delimiters = delimiters,
            None => {
                storage.serde =
                    Some(format_serde.unwrap_or_else(|| self.config.default_serde.clone()));
            }
        }

        Ok(storage)
    }

    fn create_view(&self, statement: CreateView) -> Result<StatementResult> {
        let identifier = self.resolve(&statement.name)?;

        if statement.or_replace && statement.if_not_exists {
            return Err(DdlError::validation(
                "CREATE VIEW cannot combine OR REPLACE with IF NOT EXISTS",
            ));
        }
        if statement.query.is_empty() {
            return Err(DdlError::validation(format!("view {} has an empty query", identifier)));
        }

        let mut view = TableDescription::view(
            identifier.clone(),
            ViewDefinition::new(statement.query).with_aliases(statement.columns),
        )
        .with_partition_columns(statement.partitioned_on);
        view.comment = statement.comment;
        view.properties = statement.properties;

        let mut namespaces = self.namespaces.write();
        let tables = namespace_mut(&mut namespaces, &identifier)?;

        if let Some(existing) = tables.get(&identifier.name) {
            if statement.if_not_exists {
                debug!(view = %identifier, "view exists, skipping creation");
                return Ok(StatementResult::Unchanged);
            }
            if !statement.or_replace {
                return Err(DdlError::already_exists(format!(
                    "table or view {} already exists",
                    identifier
                )));
            }
            if !existing.is_view() {
                return Err(DdlError::validation(format!(
                    "{} is a table and cannot be replaced by a view",
                    identifier
                )));
            }
        }

        info!(view = %identifier, "created view");
        tables.insert(identifier.name.clone(), view);
        Ok(StatementResult::ViewCreated(identifier))
    }

    fn drop_object(
        &self,
        object: DropObject,
        identifier: &TableIdentifier,
        if_exists: bool,
    ) -> Result<StatementResult> {
        let identifier = self.resolve(identifier)?;
        let mut namespaces = self.namespaces.write();

        let is_view = match lookup(&namespaces, &identifier) {
            Ok(Some(existing)) => existing.is_view(),
            Ok(None) | Err(DdlError::NotFound(_)) if if_exists => {
                return Ok(StatementResult::Unchanged);
            }
            Ok(None) => {
                return Err(DdlError::not_found(format!(
                    "table or view {} not found",
                    identifier
                )));
            }
            Err(e) => return Err(e),
        };

        match (object, is_view) {
            (DropObject::Table, true) => {
                return Err(DdlError::validation(format!(
                    "{} is a view; use DROP VIEW",
                    identifier
                )));
            }
            (DropObject::View, false) => {
                return Err(DdlError::validation(format!(
                    "{} is a table; use DROP TABLE",
                    identifier
                )));
            }
            _ => {}
        }

        namespace_mut(&mut namespaces, &identifier)?.remove(&identifier.name);
        info!(table = %identifier, "dropped");
        Ok(StatementResult::Dropped(identifier))
    }

    fn create_namespace(&self, name: &str, if_not_exists: bool) -> Result<StatementResult> {
        let name = name.to_lowercase();
        validate_name(&name)?;

        let mut namespaces = self.namespaces.write();
        if namespaces.contains_key(&name) {
            if if_not_exists {
                return Ok(StatementResult::Unchanged);
            }
            return Err(DdlError::already_exists(format!("namespace '{}' already exists", name)));
        }

        namespaces.insert(name.clone(), BTreeMap::new());
        info!(namespace = %name, "created namespace");
        Ok(StatementResult::NamespaceCreated(name))
    }

    fn drop_namespace(&self, name: &str, if_exists: bool, cascade: bool) -> Result<StatementResult> {
        let name = name.to_lowercase();
        if name == self.config.current_namespace.to_lowercase() {
            return Err(DdlError::validation(format!(
                "cannot drop the current namespace '{}'",
                name
            )));
        }

        let mut namespaces = self.namespaces.write();
        match namespaces.get(&name) {
            None if if_exists => return Ok(StatementResult::Unchanged),
            None => {
                return Err(DdlError::not_found(format!("namespace '{}' not found", name)));
            }
            Some(tables) if !tables.is_empty() && !cascade => {
                return Err(DdlError::validation(format!(
                    "namespace '{}' is not empty; use CASCADE",
                    name
                )));
            }
            Some(_) => {}
        }

        namespaces.remove(&name);
        info!(namespace = %name, cascade, "dropped namespace");
        Ok(StatementResult::NamespaceDropped(name))
    }
}

impl Catalog for InMemoryCatalog {
    fn get_table(&self, identifier: &TableIdentifier) -> Result<TableDescription> {
        let identifier = self.resolve(identifier)?;
        let namespaces = self.namespaces.read();
        lookup(&namespaces, &identifier)?
            .cloned()
            .ok_or_else(|| DdlError::not_found(format!("table or view {} not found", identifier)))
    }

    fn table_exists(&self, identifier: &TableIdentifier) -> bool {
        self.get_table(identifier).is_ok()
    }

    fn drop_table(&self, identifier: &TableIdentifier) -> Result<()> {
        let identifier = self.resolve(identifier)?;
        let mut namespaces = self.namespaces.write();
        namespace_mut(&mut namespaces, &identifier)?
            .remove(&identifier.name)
            .map(|_| info!(table = %identifier, "dropped"))
            .ok_or_else(|| DdlError::not_found(format!("table or view {} not found", identifier)))
    }

    fn list_tables(&self, namespace: &str) -> Result<Vec<TableIdentifier>> {
        let namespace = namespace.to_lowercase();
        let namespaces = self.namespaces.read();
        let tables = namespaces
            .get(&namespace)
            .ok_or_else(|| DdlError::not_found(format!("namespace '{}' not found", namespace)))?;
        Ok(tables.values().map(|t| t.identifier.clone()).collect())
    }
}

impl DdlExecutor for InMemoryCatalog {
    fn execute(&self, sql: &str) -> Result<StatementResult> {
        debug!(sql = %sql, "executing statement");

        match parse_statement(sql)? {
            Statement::CreateTable(statement) => self.create_table(statement),
            Statement::CreateView(statement) => self.create_view(statement),
            Statement::Drop {
                object,
                name,
                if_exists,
            } => self.drop_object(object, &name, if_exists),
            Statement::CreateNamespace {
                name,
                if_not_exists,
            } => self.create_namespace(&name, if_not_exists),
            Statement::DropNamespace {
                name,
                if_exists,
                cascade,
            } => self.drop_namespace(&name, if_exists, cascade),
            Statement::ShowCreateTable { name, dialect } => {
                let table = self.get_table(&name)?;
                DdlGenerator::new(&self.config)
                    .generate(&table, dialect)
                    .map(StatementResult::Ddl)
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn validate_name(name: &str) -> Result<()> {
    validate_identifier(name).map_err(DdlError::validation)
}

fn lookup<'a>(
    namespaces: &'a Namespaces,
    identifier: &TableIdentifier,
) -> Result<Option<&'a TableDescription>> {
    let namespace = identifier.namespace.as_deref().unwrap_or_default();
    namespaces
        .get(namespace)
        .map(|tables| tables.get(&identifier.name))
        .ok_or_else(|| DdlError::not_found(format!("namespace '{}' not found", namespace)))
}

fn namespace_mut<'a>(
    namespaces: &'a mut Namespaces,
    identifier: &TableIdentifier,
) -> Result<&'a mut BTreeMap<String, TableDescription>> {
    let namespace = identifier.namespace.as_deref().unwrap_or_default();
    namespaces
        .get_mut(namespace)
        .ok_or_else(|| DdlError::not_found(format!("namespace '{}' not found", namespace)))
}

/// Build the schema with partition columns last, in partition order
fn arrange_columns(
    identifier: &TableIdentifier,
    mut columns: Vec<Column>,
    partition_by: Vec<PartitionItem>,
) -> Result<(Vec<Column>, Vec<String>)> {
    let mut partition_columns = Vec::with_capacity(partition_by.len());

    for item in partition_by {
        match item {
            PartitionItem::Reference(name) => {
                let position = columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(&name))
                    .ok_or_else(|| {
                        DdlError::validation(format!(
                            "partition column '{}' of {} is not defined in the table",
                            name, identifier
                        ))
                    })?;
                partition_columns.push(columns.remove(position));
            }
            PartitionItem::Column(column) => partition_columns.push(column),
        }
    }

    let names = partition_columns.iter().map(|c| c.name.clone()).collect();
    columns.extend(partition_columns);
    Ok((columns, names))
}
