use crate::transpiler::dialect::*;

pub fn descriptor() -> DialectDescriptor {
    let mut d = super::ansi::descriptor();
    d.name = "h2".to_string();
    d.supports_full_join = false;
    d.requires_parameter_cast_in_select = true;
    d.requires_typed_values_parameters = true;
    d
}
