//! Column and data type definitions
//!
//! Data types render themselves as DDL through `Display`; struct field names
//! are always backtick-quoted so their exact spelling survives a round trip.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sql::sanitize::{quote_identifier, quote_string};

/// Column data type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataType {
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal {
        precision: u8,
        scale: u8,
    },
    String,
    Char {
        length: u32,
    },
    Varchar {
        length: u32,
    },
    Binary,
    Date,
    Timestamp,
    TimestampNtz,
    Array {
        element: Box<DataType>,
    },
    Map {
        key: Box<DataType>,
        value: Box<DataType>,
    },
    Struct {
        fields: Vec<StructField>,
    },
}

/// Precision and scale of `DECIMAL` without arguments
pub const DEFAULT_DECIMAL_PRECISION: u8 = 10;
pub const DEFAULT_DECIMAL_SCALE: u8 = 0;

/// Largest precision a decimal may declare
pub const MAX_DECIMAL_PRECISION: u8 = 38;

impl DataType {
    pub fn decimal(precision: u8, scale: u8) -> Self {
        DataType::Decimal { precision, scale }
    }

    pub fn array(element: DataType) -> Self {
        DataType::Array {
            element: Box::new(element),
        }
    }

    pub fn map(key: DataType, value: DataType) -> Self {
        DataType::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn struct_of(fields: Vec<StructField>) -> Self {
        DataType::Struct { fields }
    }

    /// Whether this type nests other types
    pub fn is_nested(&self) -> bool {
        matches!(
            self,
            DataType::Array { .. } | DataType::Map { .. } | DataType::Struct { .. }
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::TinyInt => write!(f, "TINYINT"),
            DataType::SmallInt => write!(f, "SMALLINT"),
            DataType::Int => write!(f, "INT"),
            DataType::BigInt => write!(f, "BIGINT"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Double => write!(f, "DOUBLE"),
            DataType::Decimal { precision, scale } => write!(f, "DECIMAL({},{})", precision, scale),
            DataType::String => write!(f, "STRING"),
            DataType::Char { length } => write!(f, "CHAR({})", length),
            DataType::Varchar { length } => write!(f, "VARCHAR({})", length),
            DataType::Binary => write!(f, "BINARY"),
            DataType::Date => write!(f, "DATE"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::TimestampNtz => write!(f, "TIMESTAMP_NTZ"),
            DataType::Array { element } => write!(f, "ARRAY<{}>", element),
            DataType::Map { key, value } => write!(f, "MAP<{}, {}>", key, value),
            DataType::Struct { fields } => {
                write!(f, "STRUCT<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", quote_identifier(&field.name), field.data_type)?;
                    if let Some(comment) = &field.comment {
                        write!(f, " COMMENT {}", quote_string(comment))?;
                    }
                }
                write!(f, ">")
            }
        }
    }
}

/// Named field of a struct type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl StructField {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Top-level column of a table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    /// Column name, kept with its original casing
    pub name: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Render as `` `name` TYPE [COMMENT '...'] ``
    pub fn to_ddl(&self) -> String {
        match &self.comment {
            Some(comment) => format!(
                "{} {} COMMENT {}",
                quote_identifier(&self.name),
                self.data_type,
                quote_string(comment)
            ),
            None => format!("{} {}", quote_identifier(&self.name), self.data_type),
        }
    }
}
