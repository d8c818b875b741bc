use k2d_core::{Key2DynError, ScriptModel};
use serde_json::Value;

pub use k2d_convert::convert_script;
pub use k2d_gsl::gslify;
pub use k2d_parser::parse_script_source;

/// Parses Keynote XML into the loosely typed document tree.
pub fn parse_script(source: &str) -> Result<Value, Key2DynError> {
    parse_script_source(source)
}

/// Parses Keynote XML and converts it into the intermediate Script Model.
pub fn convert_script_xml(source: &str) -> Result<ScriptModel, Key2DynError> {
    Ok(convert_script(&parse_script_source(source)?))
}

/// Full pipeline: Keynote XML in, Gomez/Dynatrace GSL XML out.
pub fn transform_script_xml(source: &str) -> Result<String, Key2DynError> {
    gslify(&convert_script_xml(source)?)
}
