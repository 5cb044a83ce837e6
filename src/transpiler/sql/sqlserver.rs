use crate::ast::TypeCode;
use crate::transpiler::dialect::*;

pub fn descriptor() -> DialectDescriptor {
    let mut d = super::ansi::descriptor();
    d.name = "sqlserver".to_string();
    d.supports_except_all = false;
    d.supports_null_ordering = false;
    // CROSS APPLY is not rendered.
    d.supports_lateral = false;
    d.supports_dml_target_alias = false;
    d.parameter_marker = ParameterMarker::AtP;
    d.offset_fetch_requires_order = true;
    d.merge_requires_terminator = true;
    d.boolean_style = BooleanStyle::Numeric;
    d.temporal_style = TemporalStyle::Cast;
    d.binary_style = BinaryStyle::HexPrefix;
    d.type_names.insert(TypeCode::Boolean, "bit".to_string());
    d.type_names.insert(TypeCode::Varchar, "nvarchar($l)".to_string());
    d.type_names.insert(TypeCode::Double, "float".to_string());
    d.type_names.insert(TypeCode::Timestamp, "datetime2".to_string());
    d.type_names.insert(TypeCode::TimestampTz, "datetimeoffset".to_string());
    d.type_names.insert(TypeCode::Uuid, "uniqueidentifier".to_string());
    d.type_names.insert(TypeCode::Clob, "nvarchar(max)".to_string());
    d.type_names.insert(TypeCode::Blob, "varbinary(max)".to_string());
    d
}
