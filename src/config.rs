//! Configuration for DDL generation and execution
//!
//! Provides a builder for the settings that the generator, the executor and
//! the commands share. The value is passed explicitly to every call.

use crate::format::DEFAULT_SERDE;

/// Settings shared by the generator, the executor and the commands
#[derive(Debug, Clone, PartialEq)]
pub struct DdlConfig {
    /// Namespace used for identifiers that do not name one (default: "default")
    pub current_namespace: String,
    /// Root under which managed tables are placed
    pub warehouse_location: String,
    /// Whether a bare `CREATE TABLE` (no `USING`, no Hive clause) creates a
    /// legacy Hive table instead of a data source table (default: false)
    pub create_hive_table_by_default: bool,
    /// Provider used for data source tables created without `USING`
    pub default_provider: String,
    /// Serde assigned to Hive tables whose file format does not name one
    pub default_serde: String,
}

impl DdlConfig {
    /// Create a new configuration builder
    pub fn builder() -> DdlConfigBuilder {
        DdlConfigBuilder::new()
    }

    /// Default location of a managed table
    pub fn default_table_location(&self, namespace: &str, name: &str) -> String {
        format!(
            "{}/{}.db/{}",
            self.warehouse_location.trim_end_matches('/'),
            namespace,
            name
        )
    }
}

impl Default for DdlConfig {
    fn default() -> Self {
        DdlConfigBuilder::new().build()
    }
}

/// Builder for DdlConfig
#[derive(Debug)]
pub struct DdlConfigBuilder {
    current_namespace: String,
    warehouse_location: String,
    create_hive_table_by_default: bool,
    default_provider: String,
    default_serde: String,
}

impl DdlConfigBuilder {
    pub fn new() -> Self {
        Self {
            current_namespace: "default".to_string(),
            warehouse_location: "file:/user/hive/warehouse".to_string(),
            create_hive_table_by_default: false,
            default_provider: "parquet".to_string(),
            default_serde: DEFAULT_SERDE.to_string(),
        }
    }

    /// Set the current namespace (default: "default")
    pub fn current_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.current_namespace = namespace.into();
        self
    }

    /// Set the warehouse root (default: "file:/user/hive/warehouse")
    pub fn warehouse_location(mut self, location: impl Into<String>) -> Self {
        self.warehouse_location = location.into();
        self
    }

    /// Create legacy Hive tables for bare `CREATE TABLE` statements
    pub fn create_hive_table_by_default(mut self, enabled: bool) -> Self {
        self.create_hive_table_by_default = enabled;
        self
    }

    /// Set the provider for data source tables (default: "parquet")
    pub fn default_provider(mut self, provider: impl Into<String>) -> Self {
        self.default_provider = provider.into().to_lowercase();
        self
    }

    /// Set the serde used when a Hive file format does not name one
    pub fn default_serde(mut self, serde: impl Into<String>) -> Self {
        self.default_serde = serde.into();
        self
    }

    pub fn build(self) -> DdlConfig {
        DdlConfig {
            current_namespace: self.current_namespace,
            warehouse_location: self.warehouse_location,
            create_hive_table_by_default: self.create_hive_table_by_default,
            default_provider: self.default_provider,
            default_serde: self.default_serde,
        }
    }
}

impl Default for DdlConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
