//! Curation metadata parsing
//!
//! A curation carries its metadata as `meta.yaml`, `meta.yml` or `meta.txt`.
//! The YAML dialects decode through [`serde_yaml`] into a flat string map;
//! the txt dialect predates YAML metas and gets its own line grammar in
//! [`legacy`]. Parsing never fails with an engine error: undecodable input
//! is an outcome the curator has to hear about, not a fault.

mod legacy;

use crate::types::PropertyMap;
use serde_yaml::Value;
use tracing::debug;

/// What parsing a meta file produced
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MetaOutcome {
    /// Decoded into a flat property map
    Parsed(PropertyMap),
    /// The document was empty
    Empty,
    /// The document could not be decoded
    Malformed,
    /// The file name carries none of the recognized meta extensions
    UnrecognizedName,
}

/// Parse meta file text, picking the dialect from the member name.
pub fn parse_meta_text(member_name: &str, text: &str) -> MetaOutcome {
    if member_name.ends_with(".yml") || member_name.ends_with(".yaml") {
        parse_yaml(text)
    } else if member_name.ends_with(".txt") {
        MetaOutcome::Parsed(legacy::parse(text))
    } else {
        MetaOutcome::UnrecognizedName
    }
}

/// Decode a YAML meta document into a flat property map.
///
/// The document must be a mapping. Scalar values are rendered to strings;
/// nested sequences and mappings (additional applications and the like) are
/// not part of any field check and are dropped from the map.
fn parse_yaml(text: &str) -> MetaOutcome {
    let value: Value = match serde_yaml::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "failed to decode meta YAML");
            return MetaOutcome::Malformed;
        }
    };

    let mapping = match value {
        Value::Null => return MetaOutcome::Empty,
        Value::Mapping(mapping) => mapping,
        _ => return MetaOutcome::Malformed,
    };

    let mut props = PropertyMap::new();
    for (key, value) in mapping {
        let Some(key) = render_scalar(&key) else {
            return MetaOutcome::Malformed;
        };
        if let Some(rendered) = render_scalar(&value) {
            props.insert(key, rendered);
        }
    }
    MetaOutcome::Parsed(props)
}

/// Render a scalar YAML value to its string form; `None` for non-scalars.
///
/// Nulls render as the empty string, which the field rules treat the same as
/// an absent field.
fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}
