use crate::ast::TypeCode;
use crate::transpiler::dialect::*;

pub fn descriptor() -> DialectDescriptor {
    let mut d = super::ansi::descriptor();
    d.name = "postgres".to_string();
    // Postgres uses $1, $2, etc.
    d.parameter_marker = ParameterMarker::Dollar;
    d.limit_style = LimitStyle::LimitOffset;
    d.upsert_style = UpsertStyle::OnConflict;
    d.binary_style = BinaryStyle::HexEscape;
    d.type_names.insert(TypeCode::Double, "float8".to_string());
    d.type_names.insert(TypeCode::Varbinary, "bytea".to_string());
    d.type_names.insert(TypeCode::Blob, "bytea".to_string());
    d.type_names.insert(TypeCode::Clob, "text".to_string());
    d.type_names.insert(TypeCode::TimestampTz, "timestamptz".to_string());
    d
}
