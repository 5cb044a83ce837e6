//! Settings file loading.
//!
//! ```toml
//! dialect = "oracle"
//!
//! [options]
//! literal_rendering = "as_param_outside_select"
//!
//! [overrides]
//! supports_full_join = false
//!
//! [overrides.type_names]
//! varchar = "varchar2($l char)"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::TypeCode;
use crate::error::TranslateResult;
use crate::transpiler::TranslateOptions;
use crate::transpiler::dialect::{
    BinaryStyle, BooleanStyle, CaseStrategy, Dialect, DialectDescriptor, LimitStyle, MergeLockStyle,
    ParameterMarker, TemporalStyle, UpsertStyle,
};

/// File name looked up in the working directory and the user config directory.
pub const SETTINGS_FILE: &str = "astsql.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dialect: Dialect,
    pub options: TranslateOptions,
    pub overrides: DialectOverrides,
}

/// Per-field replacements applied on top of a dialect preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectOverrides {
    pub supports_full_join: Option<bool>,
    pub supports_except_all: Option<bool>,
    pub supports_null_ordering: Option<bool>,
    pub supports_lateral: Option<bool>,
    pub supports_derived_column_list: Option<bool>,
    pub supports_dml_target_alias: Option<bool>,
    pub supports_values_list: Option<bool>,
    pub supports_nested_correlation: Option<bool>,
    pub requires_parameter_cast_in_select: Option<bool>,
    pub requires_typed_values_parameters: Option<bool>,
    pub table_alias_separator: Option<String>,
    pub parameter_marker: Option<ParameterMarker>,
    pub limit_style: Option<LimitStyle>,
    pub unbounded_limit: Option<String>,
    pub offset_fetch_requires_order: Option<bool>,
    pub case_strategy: Option<CaseStrategy>,
    pub upsert_style: Option<UpsertStyle>,
    pub merge_lock_style: Option<MergeLockStyle>,
    pub merge_requires_terminator: Option<bool>,
    pub dual_table: Option<String>,
    pub boolean_style: Option<BooleanStyle>,
    pub temporal_style: Option<TemporalStyle>,
    pub binary_style: Option<BinaryStyle>,
    /// Merged into the preset's table, replacing entries with the same code.
    pub type_names: BTreeMap<TypeCode, String>,
}

impl Settings {
    /// Load settings from `path`, or from the first settings file found.
    ///
    /// An explicit path must exist. Without one, `./astsql.toml` and then
    /// `<config dir>/astsql/astsql.toml` are tried; defaults apply when
    /// neither exists.
    pub fn load(path: Option<&Path>) -> TranslateResult<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::discover() {
            Some(found) => Self::from_file(&found),
            None => {
                debug!("no settings file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> TranslateResult<Self> {
        debug!(path = %path.display(), "loading settings");
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> TranslateResult<Self> {
        Ok(toml::from_str(content)?)
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(SETTINGS_FILE);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("astsql").join(SETTINGS_FILE))
            .filter(|path| path.is_file())
    }

    /// Preset of the configured dialect with the overrides applied.
    pub fn descriptor(&self) -> DialectDescriptor {
        let mut descriptor = self.dialect.descriptor();
        self.overrides.apply(&mut descriptor);
        descriptor
    }
}

impl DialectOverrides {
    pub fn apply(&self, d: &mut DialectDescriptor) {
        macro_rules! set {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = &self.$field {
                        d.$field = value.clone();
                    }
                )*
            };
        }
        set!(
            supports_full_join,
            supports_except_all,
            supports_null_ordering,
            supports_lateral,
            supports_derived_column_list,
            supports_dml_target_alias,
            supports_values_list,
            supports_nested_correlation,
            requires_parameter_cast_in_select,
            requires_typed_values_parameters,
            table_alias_separator,
            parameter_marker,
            limit_style,
            offset_fetch_requires_order,
            case_strategy,
            upsert_style,
            merge_lock_style,
            merge_requires_terminator,
            boolean_style,
            temporal_style,
            binary_style,
        );
        if let Some(dual) = &self.dual_table {
            d.dual_table = Some(dual.clone());
        }
        if let Some(limit) = &self.unbounded_limit {
            d.unbounded_limit = Some(limit.clone());
        }
        d.type_names
            .extend(self.type_names.iter().map(|(code, name)| (*code, name.clone())));
    }
}
