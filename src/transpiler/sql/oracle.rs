use crate::ast::TypeCode;
use crate::transpiler::dialect::*;

pub fn descriptor() -> DialectDescriptor {
    let mut d = super::ansi::descriptor();
    d.name = "oracle".to_string();
    d.supports_except_all = false;
    d.supports_derived_column_list = false;
    d.supports_values_list = false;
    // Pre-12c correlation is limited to one level.
    d.supports_nested_correlation = false;
    // Oracle rejects AS before a table alias.
    d.table_alias_separator = " ".to_string();
    d.parameter_marker = ParameterMarker::Colon;
    d.case_strategy = CaseStrategy::Decode;
    d.merge_lock_style = MergeLockStyle::UpdateWhere;
    d.dual_table = Some("dual".to_string());
    d.boolean_style = BooleanStyle::Numeric;
    d.type_names.insert(TypeCode::Boolean, "number(1,0)".to_string());
    d.type_names.insert(TypeCode::Varchar, "varchar2($l char)".to_string());
    d.type_names.insert(TypeCode::Integer, "number(10,0)".to_string());
    d.type_names.insert(TypeCode::BigInt, "number(19,0)".to_string());
    d.type_names.insert(TypeCode::Numeric, "number($p,$s)".to_string());
    d.type_names.insert(TypeCode::Varbinary, "raw($l)".to_string());
    d.type_names.insert(TypeCode::Double, "binary_double".to_string());
    d.type_names.insert(TypeCode::Uuid, "raw(16)".to_string());
    d
}
