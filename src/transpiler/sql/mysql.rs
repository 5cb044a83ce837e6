use crate::ast::TypeCode;
use crate::transpiler::dialect::*;

pub fn descriptor() -> DialectDescriptor {
    let mut d = super::ansi::descriptor();
    d.name = "mysql".to_string();
    d.supports_full_join = false;
    d.supports_except_all = false;
    d.supports_null_ordering = false;
    d.limit_style = LimitStyle::LimitOffset;
    d.unbounded_limit = Some(u64::MAX.to_string());
    d.case_strategy = CaseStrategy::If;
    d.upsert_style = UpsertStyle::OnDuplicateKey;
    // MySQL casts only to a handful of target types.
    d.type_names.insert(TypeCode::Varchar, "char($l)".to_string());
    d.type_names.insert(TypeCode::Integer, "signed".to_string());
    d.type_names.insert(TypeCode::BigInt, "signed".to_string());
    d.type_names.insert(TypeCode::SmallInt, "signed".to_string());
    d.type_names.insert(TypeCode::Numeric, "decimal($p,$s)".to_string());
    d.type_names.insert(TypeCode::Timestamp, "datetime".to_string());
    d.type_names.insert(TypeCode::Varbinary, "binary($l)".to_string());
    d
}
