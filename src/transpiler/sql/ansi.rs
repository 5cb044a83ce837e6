use std::collections::BTreeMap;

use crate::transpiler::dialect::*;

/// Standard SQL; every other preset starts from this one.
pub fn descriptor() -> DialectDescriptor {
    DialectDescriptor {
        name: "ansi".to_string(),
        supports_full_join: true,
        supports_except_all: true,
        supports_null_ordering: true,
        supports_lateral: true,
        supports_derived_column_list: true,
        supports_dml_target_alias: true,
        supports_values_list: true,
        supports_nested_correlation: true,
        requires_parameter_cast_in_select: false,
        requires_typed_values_parameters: false,
        table_alias_separator: " AS ".to_string(),
        parameter_marker: ParameterMarker::Question,
        limit_style: LimitStyle::OffsetFetch,
        unbounded_limit: None,
        offset_fetch_requires_order: false,
        case_strategy: CaseStrategy::Ansi,
        upsert_style: UpsertStyle::Merge,
        merge_lock_style: MergeLockStyle::MatchedAnd,
        merge_requires_terminator: false,
        dual_table: None,
        boolean_style: BooleanStyle::Keyword,
        temporal_style: TemporalStyle::Keyword,
        binary_style: BinaryStyle::HexQuoted,
        type_names: BTreeMap::new(),
    }
}
