//! SQL utilities for catalog DDL
//!
//! Provides DDL generation, statement parsing and identifier quoting.

pub mod ddl;
pub mod parser;
pub mod sanitize;

pub use ddl::{DdlGenerator, Dialect, generate};
pub use parser::{Statement, parse_statement};
pub use sanitize::{quote_identifier, quote_string, quote_table_identifier, validate_identifier};
