//! Dialect capabilities and the per-dialect spelling of literals and types.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ast::{SqlType, TypeCode, Value};
use crate::error::TranslateError;
use crate::transpiler::sql;

/// Supported SQL Dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Ansi,
    Postgres,
    MySQL,
    Oracle,
    SqlServer,
    SQLite,
    H2,
}

impl Dialect {
    pub const ALL: [Dialect; 7] = [
        Dialect::Ansi,
        Dialect::Postgres,
        Dialect::MySQL,
        Dialect::Oracle,
        Dialect::SqlServer,
        Dialect::SQLite,
        Dialect::H2,
    ];

    pub fn descriptor(&self) -> DialectDescriptor {
        match self {
            Dialect::Ansi => sql::ansi::descriptor(),
            Dialect::Postgres => sql::postgres::descriptor(),
            Dialect::MySQL => sql::mysql::descriptor(),
            Dialect::Oracle => sql::oracle::descriptor(),
            Dialect::SqlServer => sql::sqlserver::descriptor(),
            Dialect::SQLite => sql::sqlite::descriptor(),
            Dialect::H2 => sql::h2::descriptor(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Ansi => "ansi",
            Dialect::Postgres => "postgres",
            Dialect::MySQL => "mysql",
            Dialect::Oracle => "oracle",
            Dialect::SqlServer => "sqlserver",
            Dialect::SQLite => "sqlite",
            Dialect::H2 => "h2",
        }
    }
}

impl FromStr for Dialect {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ansi" | "standard" => Ok(Dialect::Ansi),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySQL),
            "oracle" => Ok(Dialect::Oracle),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "sqlite" => Ok(Dialect::SQLite),
            "h2" => Ok(Dialect::H2),
            other => Err(TranslateError::Config(format!("unknown dialect '{}'", other))),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a parameter marker is spelled. Indexes are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterMarker {
    /// `?`
    Question,
    /// `$1`
    Dollar,
    /// `:1`
    Colon,
    /// `@p1`
    AtP,
}

impl ParameterMarker {
    pub fn render(&self, index: usize) -> String {
        match self {
            ParameterMarker::Question => "?".to_string(),
            ParameterMarker::Dollar => format!("${}", index),
            ParameterMarker::Colon => format!(":{}", index),
            ParameterMarker::AtP => format!("@p{}", index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitStyle {
    /// `OFFSET n ROWS FETCH FIRST m ROWS ONLY`
    OffsetFetch,
    /// `LIMIT m OFFSET n`
    LimitOffset,
}

/// Rendering of `CASE` expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStrategy {
    Ansi,
    Decode,
    If,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertStyle {
    Merge,
    OnConflict,
    OnDuplicateKey,
    /// Separate update, insert and delete statements.
    None,
}

/// Where a MERGE puts the optimistic-lock restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeLockStyle {
    /// `WHEN MATCHED AND lock THEN UPDATE SET ...`
    MatchedAnd,
    /// `WHEN MATCHED THEN UPDATE SET ... WHERE lock`
    UpdateWhere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanStyle {
    Keyword,
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalStyle {
    /// `DATE '2024-01-31'`
    Keyword,
    /// `CAST('2024-01-31' AS date)`
    Cast,
    /// `'2024-01-31'`
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryStyle {
    /// `X'cafe'`
    HexQuoted,
    /// `'\xcafe'`
    HexEscape,
    /// `0xCAFE`
    HexPrefix,
}

/// Immutable capability description of one target database.
///
/// One descriptor is shared by every translation against that database, so
/// nothing here changes once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialectDescriptor {
    pub name: String,
    pub supports_full_join: bool,
    pub supports_except_all: bool,
    pub supports_null_ordering: bool,
    pub supports_lateral: bool,
    pub supports_derived_column_list: bool,
    pub supports_dml_target_alias: bool,
    pub supports_values_list: bool,
    /// Correlation to an alias more than one query level up.
    pub supports_nested_correlation: bool,
    pub requires_parameter_cast_in_select: bool,
    pub requires_typed_values_parameters: bool,
    pub table_alias_separator: String,
    pub parameter_marker: ParameterMarker,
    pub limit_style: LimitStyle,
    /// Row count put in `LIMIT` when a query only has an offset; `None` when
    /// `OFFSET` may stand alone.
    #[serde(default)]
    pub unbounded_limit: Option<String>,
    /// `OFFSET .. ROWS` and `FETCH` need an `ORDER BY`, and `FETCH` needs an
    /// `OFFSET`.
    #[serde(default)]
    pub offset_fetch_requires_order: bool,
    pub case_strategy: CaseStrategy,
    pub upsert_style: UpsertStyle,
    pub merge_lock_style: MergeLockStyle,
    pub merge_requires_terminator: bool,
    #[serde(default)]
    pub dual_table: Option<String>,
    pub boolean_style: BooleanStyle,
    pub temporal_style: TemporalStyle,
    pub binary_style: BinaryStyle,
    /// Cast type templates overriding [`TypeCode::default_template`].
    #[serde(default)]
    pub type_names: BTreeMap<TypeCode, String>,
}

impl Default for DialectDescriptor {
    fn default() -> Self {
        sql::ansi::descriptor()
    }
}

impl DialectDescriptor {
    /// Type name usable in `CAST(x AS ...)`.
    pub fn cast_type_name(&self, sql_type: &SqlType) -> String {
        let template = self
            .type_names
            .get(&sql_type.code)
            .map(String::as_str)
            .unwrap_or_else(|| sql_type.code.default_template());
        sql_type.apply_template(template)
    }

    pub fn marker(&self, index: usize) -> String {
        self.parameter_marker.render(index)
    }

    /// SQL literal for `value` in this dialect.
    pub fn format_literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => match self.boolean_style {
                BooleanStyle::Keyword => (if *b { "TRUE" } else { "FALSE" }).to_string(),
                BooleanStyle::Numeric => (if *b { "1" } else { "0" }).to_string(),
            },
            Value::Int(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::String(s) => quote_string(s),
            Value::Uuid(u) => quote_string(&u.to_string()),
            Value::Date(d) => self.temporal("DATE", TypeCode::Date, &d.format("%Y-%m-%d").to_string()),
            Value::Time(t) => self.temporal("TIME", TypeCode::Time, &t.format("%H:%M:%S").to_string()),
            Value::Timestamp(ts) => self.temporal(
                "TIMESTAMP",
                TypeCode::Timestamp,
                &ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            ),
            Value::TimestampTz(ts) => self.temporal(
                "TIMESTAMP WITH TIME ZONE",
                TypeCode::TimestampTz,
                &ts.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string(),
            ),
            Value::Bytes(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
                match self.binary_style {
                    BinaryStyle::HexQuoted => format!("X'{}'", hex),
                    BinaryStyle::HexEscape => format!("'\\x{}'", hex),
                    BinaryStyle::HexPrefix => format!("0x{}", hex.to_uppercase()),
                }
            }
        }
    }

    fn temporal(&self, keyword: &str, code: TypeCode, text: &str) -> String {
        match self.temporal_style {
            TemporalStyle::Keyword => format!("{} '{}'", keyword, text),
            TemporalStyle::Cast => format!(
                "CAST('{}' AS {})",
                text,
                self.cast_type_name(&SqlType::new(code))
            ),
            TemporalStyle::Plain => format!("'{}'", text),
        }
    }
}

/// Quote a string literal, doubling embedded quotes.
pub fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
