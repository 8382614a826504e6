//! The encoding ladder: a [`ConfigValue`] to verified property text.

use revconf_types::ConfigValue;

use crate::decode::{decode, FENCE};
use crate::error::{CodecError, CodecResult};

/// One candidate renderer. A renderer may decline a value kind by returning
/// `None`; verification against [`decode`] decides whether its output is
/// trusted.
type Renderer = fn(&ConfigValue) -> Option<String>;

/// The fixed strategy order. First verified candidate wins.
const LADDER: &[Renderer] = &[natural, structural, fenced, canonical, cast];

/// Encode a value as property text, trying each strategy in order and
/// accepting the first output that decodes back to an equal value.
///
/// [`ConfigValue::Unset`] encodes to the empty absence marker.
pub fn encode(value: &ConfigValue) -> CodecResult<String> {
    if value.is_unset() {
        return Ok(String::new());
    }
    for render in LADDER {
        let Some(text) = render(value) else {
            continue;
        };
        if matches!(decode(&text), Ok(ref back) if back == value) {
            return Ok(text);
        }
    }
    Err(CodecError::Unencodable {
        value: value.clone(),
    })
}

/// Strategy 1: the value's own display form. Scalars only; containers have
/// no single natural literal, and multi-line strings defer to the fence.
fn natural(value: &ConfigValue) -> Option<String> {
    match value {
        ConfigValue::Map(_) => None,
        ConfigValue::Str(s) if s.contains('\n') => None,
        other => Some(other.to_string()),
    }
}

/// Strategy 2: pretty-printed structural form, for containers.
fn structural(value: &ConfigValue) -> Option<String> {
    match value {
        ConfigValue::Map(_) => serde_json::to_string_pretty(value).ok(),
        _ => None,
    }
}

/// Strategy 3: raw text inside the multi-line fence, for strings whose
/// embedded newlines break the single-line forms.
fn fenced(value: &ConfigValue) -> Option<String> {
    match value {
        ConfigValue::Str(s) if s.contains('\n') => Some(format!("{FENCE}{s}{FENCE}")),
        _ => None,
    }
}

/// Strategy 4: canonical quoted form with escapes, for strings whose raw
/// text would decode as something else.
fn canonical(value: &ConfigValue) -> Option<String> {
    match value {
        ConfigValue::Str(s) => serde_json::to_string(s).ok(),
        _ => None,
    }
}

/// Strategy 5: the display form, unconditionally. Last resort.
fn cast(value: &ConfigValue) -> Option<String> {
    Some(value.to_string())
}
