//! Command entry points
//!
//! `show_create_table` is what a `SHOW CREATE TABLE` command calls.
//! `verify_round_trip` checks that the generated statement really recreates
//! an equivalent table by dropping the table and executing the statement.

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{Catalog, DdlExecutor};
use crate::config::DdlConfig;
use crate::equivalence::{
    differences, differences_after_provider_fill, equivalent, equivalent_after_provider_fill,
};
use crate::error::Result;
use crate::sql::ddl::{DdlGenerator, Dialect};
use crate::sql::parser::parse_statement;
use crate::table::{TableDescription, TableIdentifier};

/// Look a table up and render the statement that recreates it
pub fn show_create_table(
    catalog: &dyn Catalog,
    identifier: &TableIdentifier,
    dialect: Dialect,
    config: &DdlConfig,
) -> Result<String> {
    let table = catalog.get_table(identifier)?;
    DdlGenerator::new(config).generate(&table, dialect)
}

/// Outcome of a drop-and-recreate round trip
#[derive(Debug, Clone, Serialize)]
pub struct RoundTripReport {
    pub ddl: String,
    pub original: TableDescription,
    pub recreated: TableDescription,
    pub equivalent: bool,
    /// Fields that differ after normalization; empty when `equivalent`
    pub differences: Vec<String>,
}

/// Generate DDL for a table, drop it, run the DDL and compare the result
///
/// Generation errors and statements that do not parse are returned before
/// anything is dropped. If executing the generated statement fails, the table
/// stays dropped and the error is returned.
///
/// A legacy table regenerated in the native dialect is compared with
/// [`equivalent_after_provider_fill`], every other case with [`equivalent`].
pub fn verify_round_trip<C>(
    catalog: &C,
    identifier: &TableIdentifier,
    dialect: Dialect,
    config: &DdlConfig,
) -> Result<RoundTripReport>
where
    C: Catalog + DdlExecutor,
{
    let original = catalog.get_table(identifier)?;
    let ddl = DdlGenerator::new(config).generate(&original, dialect)?;
    if let Err(e) = parse_statement(&ddl) {
        warn!(table = %original.identifier, error = %e, ddl = %ddl, "generated DDL does not parse");
        return Err(e);
    }

    catalog.drop_table(&original.identifier)?;
    if let Err(e) = catalog.execute(&ddl) {
        warn!(table = %original.identifier, error = %e, ddl = %ddl, "generated DDL failed to execute");
        return Err(e);
    }
    let recreated = catalog.get_table(&original.identifier)?;

    let (equivalent, differences) = if original.is_hive_table() && dialect == Dialect::Native {
        (
            equivalent_after_provider_fill(&original, &recreated),
            differences_after_provider_fill(&original, &recreated),
        )
    } else {
        (
            equivalent(&original, &recreated),
            differences(&original, &recreated),
        )
    };

    info!(table = %original.identifier, %dialect, equivalent, "verified round trip");

    Ok(RoundTripReport {
        ddl,
        original,
        recreated,
        equivalent,
        differences,
    })
}
