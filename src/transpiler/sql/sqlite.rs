use crate::transpiler::dialect::*;

pub fn descriptor() -> DialectDescriptor {
    let mut d = super::ansi::descriptor();
    d.name = "sqlite".to_string();
    d.supports_full_join = false;
    d.supports_except_all = false;
    d.supports_lateral = false;
    d.supports_derived_column_list = false;
    d.supports_dml_target_alias = false;
    d.limit_style = LimitStyle::LimitOffset;
    d.unbounded_limit = Some("-1".to_string());
    d.upsert_style = UpsertStyle::OnConflict;
    d.boolean_style = BooleanStyle::Numeric;
    d.temporal_style = TemporalStyle::Plain;
    d
}
