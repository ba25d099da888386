//! Parser for the DDL subset executed by the reference catalog
//!
//! Covers data source and Hive `CREATE TABLE`, `CREATE VIEW`, `DROP`,
//! namespace statements and `SHOW CREATE TABLE`. View queries are not parsed;
//! the text after `AS` is kept verbatim.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use sqlparser::dialect::MySqlDialect;
use sqlparser::tokenizer::{Location, Token as SqlToken, TokenWithSpan, Tokenizer};

use crate::error::{DdlError, Result};
use crate::sql::ddl::Dialect;
use crate::table::{BucketSpec, RowFormatDelimiters, SortColumn, TableIdentifier, ViewColumn};
use crate::types::{
    Column, DataType, DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE, MAX_DECIMAL_PRECISION,
    StructField,
};

// ============================================================================
// Statements
// ============================================================================

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    CreateView(CreateView),
    Drop {
        object: DropObject,
        name: TableIdentifier,
        if_exists: bool,
    },
    CreateNamespace {
        name: String,
        if_not_exists: bool,
    },
    DropNamespace {
        name: String,
        if_exists: bool,
        cascade: bool,
    },
    ShowCreateTable {
        name: TableIdentifier,
        dialect: Dialect,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropObject {
    Table,
    View,
}

/// Entry of a `PARTITIONED BY` list
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionItem {
    /// Names a column declared in the column list
    Reference(String),
    /// Declares a new column (Hive form)
    Column(Column),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowFormat {
    Serde {
        class: String,
        properties: BTreeMap<String, String>,
    },
    Delimited(RowFormatDelimiters),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoredAs {
    /// `STORED AS <format name>`
    Format(String),
    InputOutput { input: String, output: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTable {
    pub name: TableIdentifier,
    pub external: bool,
    pub if_not_exists: bool,
    pub columns: Vec<Column>,
    pub provider: Option<String>,
    pub options: BTreeMap<String, String>,
    pub partition_by: Vec<PartitionItem>,
    pub bucket_spec: Option<BucketSpec>,
    pub row_format: Option<RowFormat>,
    pub stored_as: Option<StoredAs>,
    pub location: Option<String>,
    pub comment: Option<String>,
    pub properties: BTreeMap<String, String>,
}

impl CreateTable {
    /// Whether any clause that only exists in the Hive grammar was used
    pub fn has_hive_clauses(&self) -> bool {
        self.row_format.is_some() || self.stored_as.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateView {
    pub name: TableIdentifier,
    pub or_replace: bool,
    pub if_not_exists: bool,
    pub columns: Vec<ViewColumn>,
    pub comment: Option<String>,
    pub partitioned_on: Vec<String>,
    pub properties: BTreeMap<String, String>,
    pub query: String,
}

/// Parse a single statement, optionally terminated by `;`
pub fn parse_statement(sql: &str) -> Result<Statement> {
    let mut parser = Parser::new(sql)?;
    let statement = parser.parse_statement()?;
    parser.consume_symbol(';');
    parser.expect_end()?;
    Ok(statement)
}

impl FromStr for DataType {
    type Err = DdlError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = Parser::new(s)?;
        let data_type = parser.parse_data_type()?;
        parser.expect_end()?;
        Ok(data_type)
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Word(String),
    QuotedIdent(String),
    Str(String),
    Number(String),
    Symbol(char),
    /// Any other token; only ever skipped over inside view queries
    Other(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word(w) => write!(f, "'{}'", w),
            TokenKind::QuotedIdent(i) => write!(f, "`{}`", i),
            TokenKind::Str(s) => write!(f, "string '{}'", s),
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Symbol(c) => write!(f, "'{}'", c),
            TokenKind::Other(t) => write!(f, "'{}'", t),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    /// Byte offset of the first character in the source text
    offset: usize,
}

/// Split `sql` into tokens with `sqlparser`'s MySQL tokenizer
///
/// That dialect quotes identifiers with backticks and accepts backslash
/// escapes in string literals. Literals are kept raw by the tokenizer and
/// unescaped by [`unescape_string`], which also understands octal escapes.
/// Comments and whitespace are dropped.
fn tokenize(sql: &str) -> Result<Vec<Token>> {
    let spanned = Tokenizer::new(&MySqlDialect {}, sql)
        .with_unescape(false)
        .tokenize_with_location()
        .map_err(|e| DdlError::parse(e.to_string()))?;

    let mut tokens = Vec::with_capacity(spanned.len());
    for TokenWithSpan { token, span } in spanned {
        let offset = byte_offset(sql, span.start)
            .ok_or_else(|| DdlError::parse(format!("token {} is outside the statement", token)))?;

        let kinds = match token {
            SqlToken::Whitespace(_) | SqlToken::EOF => continue,
            SqlToken::Word(word) => match word.quote_style {
                Some('`') => vec![TokenKind::QuotedIdent(word.value.replace("``", "`"))],
                _ => vec![TokenKind::Word(word.value)],
            },
            SqlToken::SingleQuotedString(s) | SqlToken::DoubleQuotedString(s) => {
                vec![TokenKind::Str(unescape_string(&s, offset)?)]
            }
            SqlToken::Number(n, _) => vec![TokenKind::Number(n)],
            SqlToken::Comma => vec![TokenKind::Symbol(',')],
            SqlToken::Period => vec![TokenKind::Symbol('.')],
            SqlToken::LParen => vec![TokenKind::Symbol('(')],
            SqlToken::RParen => vec![TokenKind::Symbol(')')],
            SqlToken::Lt => vec![TokenKind::Symbol('<')],
            SqlToken::Gt => vec![TokenKind::Symbol('>')],
            SqlToken::Eq => vec![TokenKind::Symbol('=')],
            SqlToken::Colon => vec![TokenKind::Symbol(':')],
            SqlToken::SemiColon => vec![TokenKind::Symbol(';')],
            SqlToken::Minus => vec![TokenKind::Symbol('-')],
            SqlToken::Char(c) => vec![TokenKind::Symbol(c)],
            // Closing angle brackets of nested types arrive as shift
            // operators, an empty STRUCT<> as not-equal.
            SqlToken::ShiftRight => vec![TokenKind::Symbol('>'); 2],
            SqlToken::ShiftLeft => vec![TokenKind::Symbol('<'); 2],
            SqlToken::Neq if sql[offset..].starts_with("<>") => {
                vec![TokenKind::Symbol('<'), TokenKind::Symbol('>')]
            }
            other => vec![TokenKind::Other(other.to_string())],
        };

        for (i, kind) in kinds.into_iter().enumerate() {
            tokens.push(Token {
                kind,
                offset: offset + i,
            });
        }
    }

    Ok(tokens)
}

/// Byte offset of a 1-based line/column location
fn byte_offset(sql: &str, location: Location) -> Option<usize> {
    let line = usize::try_from(location.line).ok()?.checked_sub(1)?;
    let column = usize::try_from(location.column).ok()?.checked_sub(1)?;

    let line_start = match line {
        0 => 0,
        n => sql.match_indices('\n').nth(n - 1)?.0 + 1,
    };
    let rest = &sql[line_start..];
    match rest.char_indices().nth(column) {
        Some((i, _)) => Some(line_start + i),
        None if rest.chars().count() == column => Some(sql.len()),
        None => None,
    }
}

/// Decode the raw text between the quotes of a string literal
///
/// Supports `\n`, `\t`, `\r`, `\b`, octal escapes of up to three digits and
/// doubled quotes. Any other escaped character stands for itself.
fn unescape_string(raw: &str, offset: usize) -> Result<String> {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' || c == '"' {
            if chars.peek() == Some(&c) {
                chars.next();
            }
            value.push(c);
            continue;
        }
        if c != '\\' {
            value.push(c);
            continue;
        }

        let Some(escaped) = chars.next() else {
            value.push(c);
            break;
        };
        match escaped {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'b' => value.push('\u{8}'),
            '0'..='7' => {
                // Up to three octal digits.
                let mut code = escaped.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                let decoded = char::from_u32(code).ok_or_else(|| {
                    DdlError::parse(format!("invalid octal escape at offset {}", offset))
                })?;
                value.push(decoded);
            }
            other => value.push(other),
        }
    }

    Ok(value)
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    sql: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(sql: &'a str) -> Result<Self> {
        Ok(Self {
            sql,
            tokens: tokenize(sql)?,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn next_token(&mut self) -> Option<TokenKind> {
        let token = self.tokens.get(self.pos).map(|t| t.kind.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> DdlError {
        match self.peek() {
            Some(token) => DdlError::parse(format!("expected {}, found {}", expected, token)),
            None => DdlError::parse(format!("expected {}, found end of input", expected)),
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(TokenKind::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn parse_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume a keyword sequence only if all of it is present
    fn parse_keywords(&mut self, keywords: &[&str]) -> bool {
        let matches = keywords.iter().enumerate().all(|(i, keyword)| {
            matches!(
                self.tokens.get(self.pos + i).map(|t| &t.kind),
                Some(TokenKind::Word(w)) if w.eq_ignore_ascii_case(keyword)
            )
        });
        if matches {
            self.pos += keywords.len();
        }
        matches
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.parse_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn expect_keywords(&mut self, keywords: &[&str]) -> Result<()> {
        if self.parse_keywords(keywords) {
            Ok(())
        } else {
            Err(self.unexpected(&keywords.join(" ")))
        }
    }

    fn consume_symbol(&mut self, symbol: char) -> bool {
        if self.peek() == Some(&TokenKind::Symbol(symbol)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<()> {
        if self.consume_symbol(symbol) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", symbol)))
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(DdlError::parse(format!("unexpected {}", token))),
        }
    }

    fn parse_identifier(&mut self) -> Result<String> {
        match self.peek() {
            Some(TokenKind::Word(_)) | Some(TokenKind::QuotedIdent(_)) => {
                match self.next_token() {
                    Some(TokenKind::Word(w)) | Some(TokenKind::QuotedIdent(w)) => Ok(w),
                    _ => Err(self.unexpected("identifier")),
                }
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn parse_table_identifier(&mut self) -> Result<TableIdentifier> {
        let first = self.parse_identifier()?;
        if self.consume_symbol('.') {
            let name = self.parse_identifier()?;
            Ok(TableIdentifier::new(first, name))
        } else {
            Ok(TableIdentifier::unqualified(first))
        }
    }

    /// Identifiers joined by `.`, such as `org.apache.spark.sql.parquet`
    fn parse_dotted_name(&mut self) -> Result<String> {
        let mut name = self.parse_identifier()?;
        while self.consume_symbol('.') {
            name.push('.');
            name.push_str(&self.parse_identifier()?);
        }
        Ok(name)
    }

    fn parse_string(&mut self) -> Result<String> {
        match self.peek() {
            Some(TokenKind::Str(_)) => match self.next_token() {
                Some(TokenKind::Str(s)) => Ok(s),
                _ => Err(self.unexpected("string literal")),
            },
            _ => Err(self.unexpected("string literal")),
        }
    }

    fn parse_number<T: FromStr>(&mut self) -> Result<T> {
        match self.peek() {
            Some(TokenKind::Number(n)) => {
                let value = n
                    .parse::<T>()
                    .map_err(|_| DdlError::parse(format!("number {} is out of range", n)))?;
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.unexpected("number")),
        }
    }

    fn parse_comma_separated<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.expect_symbol('(')?;
        let mut items = vec![item(self)?];
        while self.consume_symbol(',') {
            items.push(item(self)?);
        }
        self.expect_symbol(')')?;
        Ok(items)
    }

    /// `(key = value, ...)`; keys may be strings or dotted names, `=` is optional
    fn parse_property_list(&mut self) -> Result<BTreeMap<String, String>> {
        let pairs = self.parse_comma_separated(|p| {
            let key = match p.peek() {
                Some(TokenKind::Str(_)) => p.parse_string()?,
                _ => p.parse_dotted_name()?,
            };
            p.consume_symbol('=');
            let value = match p.next_token() {
                Some(TokenKind::Str(s)) | Some(TokenKind::Number(s)) | Some(TokenKind::Word(s)) => s,
                _ => return Err(DdlError::parse(format!("missing value for property '{}'", key))),
            };
            Ok((key, value))
        })?;

        let mut properties = BTreeMap::new();
        for (key, value) in pairs {
            if properties.insert(key.clone(), value).is_some() {
                return Err(DdlError::parse(format!("duplicate property key '{}'", key)));
            }
        }
        Ok(properties)
    }

    // ========================================================================
    // Data types
    // ========================================================================

    fn parse_data_type(&mut self) -> Result<DataType> {
        let name = match self.next_token() {
            Some(TokenKind::Word(w)) => w.to_uppercase(),
            Some(other) => return Err(DdlError::parse(format!("expected data type, found {}", other))),
            None => return Err(DdlError::parse("expected data type, found end of input")),
        };

        let data_type = match name.as_str() {
            "BOOLEAN" | "BOOL" => DataType::Boolean,
            "TINYINT" | "BYTE" => DataType::TinyInt,
            "SMALLINT" | "SHORT" => DataType::SmallInt,
            "INT" | "INTEGER" => DataType::Int,
            "BIGINT" | "LONG" => DataType::BigInt,
            "FLOAT" | "REAL" => DataType::Float,
            "DOUBLE" => DataType::Double,
            "DECIMAL" | "DEC" | "NUMERIC" => self.parse_decimal_arguments()?,
            "STRING" => DataType::String,
            "CHAR" => DataType::Char {
                length: self.parse_length()?,
            },
            "VARCHAR" => DataType::Varchar {
                length: self.parse_length()?,
            },
            "BINARY" => DataType::Binary,
            "DATE" => DataType::Date,
            "TIMESTAMP" => DataType::Timestamp,
            "TIMESTAMP_NTZ" => DataType::TimestampNtz,
            "ARRAY" => {
                self.expect_symbol('<')?;
                let element = self.parse_data_type()?;
                self.expect_symbol('>')?;
                DataType::array(element)
            }
            "MAP" => {
                self.expect_symbol('<')?;
                let key = self.parse_data_type()?;
                self.expect_symbol(',')?;
                let value = self.parse_data_type()?;
                self.expect_symbol('>')?;
                DataType::map(key, value)
            }
            "STRUCT" => {
                self.expect_symbol('<')?;
                let mut fields = Vec::new();
                if !self.consume_symbol('>') {
                    loop {
                        fields.push(self.parse_struct_field()?);
                        if !self.consume_symbol(',') {
                            break;
                        }
                    }
                    self.expect_symbol('>')?;
                }
                DataType::struct_of(fields)
            }
            other => return Err(DdlError::parse(format!("unknown data type '{}'", other))),
        };

        Ok(data_type)
    }

    fn parse_decimal_arguments(&mut self) -> Result<DataType> {
        if !self.consume_symbol('(') {
            return Ok(DataType::decimal(DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE));
        }
        let precision: u8 = self.parse_number()?;
        let scale: u8 = if self.consume_symbol(',') {
            self.parse_number()?
        } else {
            0
        };
        self.expect_symbol(')')?;

        if precision == 0 || precision > MAX_DECIMAL_PRECISION || scale > precision {
            return Err(DdlError::parse(format!(
                "invalid decimal precision and scale ({}, {})",
                precision, scale
            )));
        }
        Ok(DataType::decimal(precision, scale))
    }

    fn parse_length(&mut self) -> Result<u32> {
        self.expect_symbol('(')?;
        let length = self.parse_number()?;
        self.expect_symbol(')')?;
        Ok(length)
    }

    fn parse_struct_field(&mut self) -> Result<StructField> {
        let name = self.parse_identifier()?;
        self.consume_symbol(':');
        let mut field = StructField::new(name, self.parse_data_type()?);
        if self.parse_keyword("COMMENT") {
            field.comment = Some(self.parse_string()?);
        }
        Ok(field)
    }

    fn parse_column_definition(&mut self) -> Result<Column> {
        let name = self.parse_identifier()?;
        let mut column = Column::new(name, self.parse_data_type()?);
        if self.parse_keyword("COMMENT") {
            column.comment = Some(self.parse_string()?);
        }
        Ok(column)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_statement(&mut self) -> Result<Statement> {
        if self.parse_keyword("CREATE") {
            let or_replace = self.parse_keywords(&["OR", "REPLACE"]);
            let external = self.parse_keyword("EXTERNAL");

            if self.parse_keyword("TABLE") {
                if or_replace {
                    return Err(DdlError::parse("CREATE OR REPLACE is only supported for views"));
                }
                return self.parse_create_table(external).map(Statement::CreateTable);
            }
            if external {
                return Err(self.unexpected("TABLE"));
            }
            if self.parse_keyword("VIEW") {
                return self.parse_create_view(or_replace).map(Statement::CreateView);
            }
            if self.parse_namespace_keyword() {
                if or_replace {
                    return Err(DdlError::parse("CREATE OR REPLACE is only supported for views"));
                }
                let if_not_exists = self.parse_keywords(&["IF", "NOT", "EXISTS"]);
                let name = self.parse_identifier()?;
                return Ok(Statement::CreateNamespace {
                    name,
                    if_not_exists,
                });
            }
            return Err(self.unexpected("TABLE, VIEW or DATABASE"));
        }

        if self.parse_keyword("DROP") {
            let object = if self.parse_keyword("TABLE") {
                Some(DropObject::Table)
            } else if self.parse_keyword("VIEW") {
                Some(DropObject::View)
            } else {
                None
            };

            if let Some(object) = object {
                let if_exists = self.parse_keywords(&["IF", "EXISTS"]);
                let name = self.parse_table_identifier()?;
                return Ok(Statement::Drop {
                    object,
                    name,
                    if_exists,
                });
            }

            if self.parse_namespace_keyword() {
                let if_exists = self.parse_keywords(&["IF", "EXISTS"]);
                let name = self.parse_identifier()?;
                let cascade = self.parse_keyword("CASCADE");
                if !cascade {
                    self.parse_keyword("RESTRICT");
                }
                return Ok(Statement::DropNamespace {
                    name,
                    if_exists,
                    cascade,
                });
            }
            return Err(self.unexpected("TABLE, VIEW or DATABASE"));
        }

        if self.parse_keywords(&["SHOW", "CREATE", "TABLE"]) {
            let name = self.parse_table_identifier()?;
            let dialect = if self.parse_keywords(&["AS", "SERDE"]) {
                Dialect::SerdeCompatible
            } else {
                Dialect::Native
            };
            return Ok(Statement::ShowCreateTable { name, dialect });
        }

        Err(self.unexpected("CREATE, DROP or SHOW"))
    }

    fn parse_namespace_keyword(&mut self) -> bool {
        self.parse_keyword("DATABASE") || self.parse_keyword("SCHEMA") || self.parse_keyword("NAMESPACE")
    }

    fn parse_create_table(&mut self, external: bool) -> Result<CreateTable> {
        let if_not_exists = self.parse_keywords(&["IF", "NOT", "EXISTS"]);
        let name = self.parse_table_identifier()?;

        let mut table = CreateTable {
            name,
            external,
            if_not_exists,
            ..Default::default()
        };

        if self.peek() == Some(&TokenKind::Symbol('(')) {
            table.columns = self.parse_comma_separated(|p| p.parse_column_definition())?;
        }

        let mut seen: Vec<&'static str> = Vec::new();
        let mut clause = |name: &'static str| -> Result<()> {
            if seen.contains(&name) {
                return Err(DdlError::parse(format!("duplicate {} clause", name)));
            }
            seen.push(name);
            Ok(())
        };

        loop {
            if self.parse_keyword("USING") {
                clause("USING")?;
                table.provider = Some(self.parse_dotted_name()?);
            } else if self.parse_keyword("OPTIONS") {
                clause("OPTIONS")?;
                table.options = self.parse_property_list()?;
            } else if self.parse_keywords(&["PARTITIONED", "BY"]) {
                clause("PARTITIONED BY")?;
                table.partition_by = self.parse_comma_separated(|p| p.parse_partition_item())?;
            } else if self.parse_keywords(&["CLUSTERED", "BY"]) {
                clause("CLUSTERED BY")?;
                table.bucket_spec = Some(self.parse_bucket_spec()?);
            } else if self.parse_keywords(&["ROW", "FORMAT"]) {
                clause("ROW FORMAT")?;
                table.row_format = Some(self.parse_row_format()?);
            } else if self.parse_keywords(&["STORED", "AS"]) {
                clause("STORED AS")?;
                table.stored_as = Some(self.parse_stored_as()?);
            } else if self.parse_keyword("LOCATION") {
                clause("LOCATION")?;
                table.location = Some(self.parse_string()?);
            } else if self.parse_keyword("COMMENT") {
                clause("COMMENT")?;
                table.comment = Some(self.parse_string()?);
            } else if self.parse_keyword("TBLPROPERTIES") {
                clause("TBLPROPERTIES")?;
                table.properties = self.parse_property_list()?;
            } else {
                break;
            }
        }

        Ok(table)
    }

    fn parse_partition_item(&mut self) -> Result<PartitionItem> {
        let name = self.parse_identifier()?;
        match self.peek() {
            Some(TokenKind::Symbol(',')) | Some(TokenKind::Symbol(')')) => {
                Ok(PartitionItem::Reference(name))
            }
            _ => {
                let mut column = Column::new(name, self.parse_data_type()?);
                if self.parse_keyword("COMMENT") {
                    column.comment = Some(self.parse_string()?);
                }
                Ok(PartitionItem::Column(column))
            }
        }
    }

    fn parse_bucket_spec(&mut self) -> Result<BucketSpec> {
        let columns = self.parse_comma_separated(|p| p.parse_identifier())?;

        let sort_columns = if self.parse_keywords(&["SORTED", "BY"]) {
            self.parse_comma_separated(|p| {
                let name = p.parse_identifier()?;
                if p.parse_keyword("DESC") {
                    Ok(SortColumn::desc(name))
                } else {
                    p.parse_keyword("ASC");
                    Ok(SortColumn::asc(name))
                }
            })?
        } else {
            Vec::new()
        };

        self.expect_keyword("INTO")?;
        let num_buckets = self.parse_number()?;
        self.expect_keyword("BUCKETS")?;

        Ok(BucketSpec::new(num_buckets, columns).sorted_by(sort_columns))
    }

    fn parse_row_format(&mut self) -> Result<RowFormat> {
        if self.parse_keyword("SERDE") {
            let class = self.parse_string()?;
            let properties = if self.parse_keywords(&["WITH", "SERDEPROPERTIES"]) {
                self.parse_property_list()?
            } else {
                BTreeMap::new()
            };
            return Ok(RowFormat::Serde { class, properties });
        }

        self.expect_keyword("DELIMITED")?;
        let mut delimiters = RowFormatDelimiters::default();
        loop {
            let slot = if self.parse_keywords(&["FIELDS", "TERMINATED", "BY"]) {
                &mut delimiters.field
            } else if self.parse_keywords(&["COLLECTION", "ITEMS", "TERMINATED", "BY"]) {
                &mut delimiters.collection_items
            } else if self.parse_keywords(&["MAP", "KEYS", "TERMINATED", "BY"]) {
                &mut delimiters.map_keys
            } else if self.parse_keywords(&["LINES", "TERMINATED", "BY"]) {
                &mut delimiters.lines
            } else if self.parse_keywords(&["NULL", "DEFINED", "AS"]) {
                &mut delimiters.null_defined_as
            } else {
                break;
            };
            if slot.is_some() {
                return Err(DdlError::parse("duplicate row format delimiter"));
            }
            *slot = Some(self.parse_string()?);
        }

        if delimiters.is_empty() {
            return Err(self.unexpected("at least one delimiter"));
        }
        Ok(RowFormat::Delimited(delimiters))
    }

    fn parse_stored_as(&mut self) -> Result<StoredAs> {
        if self.parse_keyword("INPUTFORMAT") {
            let input = self.parse_string()?;
            self.expect_keyword("OUTPUTFORMAT")?;
            let output = self.parse_string()?;
            return Ok(StoredAs::InputOutput { input, output });
        }
        Ok(StoredAs::Format(self.parse_identifier()?))
    }

    fn parse_create_view(&mut self, or_replace: bool) -> Result<CreateView> {
        let if_not_exists = self.parse_keywords(&["IF", "NOT", "EXISTS"]);
        let name = self.parse_table_identifier()?;

        let columns = if self.peek() == Some(&TokenKind::Symbol('(')) {
            self.parse_comma_separated(|p| {
                let mut column = ViewColumn::new(p.parse_identifier()?);
                if p.parse_keyword("COMMENT") {
                    column.comment = Some(p.parse_string()?);
                }
                Ok(column)
            })?
        } else {
            Vec::new()
        };

        let mut comment = None;
        let mut partitioned_on = Vec::new();
        let mut properties = BTreeMap::new();
        loop {
            if self.parse_keyword("COMMENT") {
                comment = Some(self.parse_string()?);
            } else if self.parse_keywords(&["PARTITIONED", "ON"]) {
                partitioned_on = self.parse_comma_separated(|p| p.parse_identifier())?;
            } else if self.parse_keyword("TBLPROPERTIES") {
                properties = self.parse_property_list()?;
            } else {
                break;
            }
        }

        self.expect_keyword("AS")?;
        let start = self
            .tokens
            .get(self.pos)
            .map(|t| t.offset)
            .ok_or_else(|| DdlError::parse("view query is missing"))?;
        let query = self.sql[start..].trim().trim_end_matches(';').trim_end().to_string();
        self.pos = self.tokens.len();

        Ok(CreateView {
            name,
            or_replace,
            if_not_exists,
            columns,
            comment,
            partitioned_on,
            properties,
            query,
        })
    }
}
