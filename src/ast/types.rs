use serde::{Deserialize, Serialize};

/// Default length used for character and binary types without an explicit one.
pub const DEFAULT_LENGTH: u32 = 255;
/// Default precision for exact numerics.
pub const DEFAULT_PRECISION: u32 = 19;
/// Default scale for exact numerics.
pub const DEFAULT_SCALE: u32 = 2;

/// Generic SQL type family, independent of any dialect spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCode {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Numeric,
    Char,
    Varchar,
    Clob,
    Varbinary,
    Blob,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Uuid,
    Json,
}

impl TypeCode {
    /// ANSI spelling used when a dialect registers no override.
    pub fn default_template(&self) -> &'static str {
        match self {
            TypeCode::Boolean => "boolean",
            TypeCode::SmallInt => "smallint",
            TypeCode::Integer => "integer",
            TypeCode::BigInt => "bigint",
            TypeCode::Real => "real",
            TypeCode::Double => "double precision",
            TypeCode::Numeric => "numeric($p,$s)",
            TypeCode::Char => "char($l)",
            TypeCode::Varchar => "varchar($l)",
            TypeCode::Clob => "clob",
            TypeCode::Varbinary => "varbinary($l)",
            TypeCode::Blob => "blob",
            TypeCode::Date => "date",
            TypeCode::Time => "time",
            TypeCode::Timestamp => "timestamp",
            TypeCode::TimestampTz => "timestamp with time zone",
            TypeCode::Uuid => "uuid",
            TypeCode::Json => "json",
        }
    }
}

impl std::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        write!(f, "{}", name)
    }
}

/// A SQL type with optional size information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SqlType {
    pub code: TypeCode,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
}

impl SqlType {
    pub fn new(code: TypeCode) -> Self {
        Self {
            code,
            length: None,
            precision: None,
            scale: None,
        }
    }

    pub fn varchar(length: u32) -> Self {
        Self {
            length: Some(length),
            ..Self::new(TypeCode::Varchar)
        }
    }

    pub fn numeric(precision: u32, scale: u32) -> Self {
        Self {
            precision: Some(precision),
            scale: Some(scale),
            ..Self::new(TypeCode::Numeric)
        }
    }

    pub fn integer() -> Self {
        Self::new(TypeCode::Integer)
    }

    pub fn bigint() -> Self {
        Self::new(TypeCode::BigInt)
    }

    pub fn boolean() -> Self {
        Self::new(TypeCode::Boolean)
    }

    /// Substitute `$l`, `$p` and `$s` in a type template.
    pub fn apply_template(&self, template: &str) -> String {
        template
            .replace("$l", &self.length.unwrap_or(DEFAULT_LENGTH).to_string())
            .replace("$p", &self.precision.unwrap_or(DEFAULT_PRECISION).to_string())
            .replace("$s", &self.scale.unwrap_or(DEFAULT_SCALE).to_string())
    }
}

impl From<TypeCode> for SqlType {
    fn from(code: TypeCode) -> Self {
        SqlType::new(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_substitution() {
        assert_eq!(SqlType::varchar(40).apply_template("varchar($l)"), "varchar(40)");
        assert_eq!(
            SqlType::new(TypeCode::Numeric).apply_template("numeric($p,$s)"),
            "numeric(19,2)"
        );
    }

    #[test]
    fn test_type_code_display() {
        assert_eq!(TypeCode::TimestampTz.to_string(), "timestamp_tz");
    }
}
