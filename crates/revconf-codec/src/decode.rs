//! The decode grammar: stored property text back to a [`ConfigValue`].
//!
//! Accepted forms, checked in order:
//! - the empty string (the absence marker)
//! - `true` / `false`, exactly
//! - an optionally negated run of ASCII digits
//! - a `"""`-fenced literal whose inner bytes are taken verbatim
//! - a JSON-quoted string
//! - a JSON object with string/integer/boolean/object values
//! - any other text, taken verbatim as a plain string
//!
//! Text that commits to a structured form and then fails to parse is a hard
//! error — a property either decodes fully or poisons the whole reload.

use revconf_types::{ConfigMap, ConfigValue};

use crate::error::{CodecError, CodecResult};

/// Delimiter of the multi-line fenced literal form.
pub(crate) const FENCE: &str = "\"\"\"";

/// Decode stored property text into a configuration value.
pub fn decode(text: &str) -> CodecResult<ConfigValue> {
    if text.is_empty() {
        return Ok(ConfigValue::Unset);
    }
    if text == "true" {
        return Ok(ConfigValue::Bool(true));
    }
    if text == "false" {
        return Ok(ConfigValue::Bool(false));
    }
    if looks_like_int(text) {
        return text
            .parse::<i64>()
            .map(ConfigValue::Int)
            .map_err(|_| undecodable(text, "integer literal out of range"));
    }
    if let Some(rest) = text.strip_prefix(FENCE) {
        let inner = rest
            .strip_suffix(FENCE)
            .ok_or_else(|| undecodable(text, "unterminated fenced literal"))?;
        return Ok(ConfigValue::Str(inner.to_string()));
    }
    if text.starts_with('"') {
        return serde_json::from_str::<String>(text)
            .map(ConfigValue::Str)
            .map_err(|e| undecodable(text, &format!("malformed quoted string: {e}")));
    }
    if text.starts_with('{') {
        let value: ConfigValue = serde_json::from_str(text)
            .map_err(|e| undecodable(text, &format!("malformed mapping literal: {e}")))?;
        return match value {
            ConfigValue::Map(map) => {
                reject_unset_entries(&map, text)?;
                Ok(ConfigValue::Map(map))
            }
            _ => Err(undecodable(text, "mapping literal did not decode to a mapping")),
        };
    }
    // Bare text that matches no structured form is a plain string.
    Ok(ConfigValue::Str(text.to_string()))
}

fn looks_like_int(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// JSON `null` deserializes to `Unset`, which is not a storable kind inside
/// a mapping.
fn reject_unset_entries(map: &ConfigMap, text: &str) -> CodecResult<()> {
    for (key, value) in map {
        match value {
            ConfigValue::Unset => {
                return Err(undecodable(
                    text,
                    &format!("null is not a supported value kind (key {key:?})"),
                ));
            }
            ConfigValue::Map(inner) => reject_unset_entries(inner, text)?,
            _ => {}
        }
    }
    Ok(())
}

fn undecodable(text: &str, reason: &str) -> CodecError {
    CodecError::Undecodable {
        text: text.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_unset() {
        assert_eq!(decode("").unwrap(), ConfigValue::Unset);
    }

    #[test]
    fn booleans_exact() {
        assert_eq!(decode("true").unwrap(), ConfigValue::Bool(true));
        assert_eq!(decode("false").unwrap(), ConfigValue::Bool(false));
        // Only the exact spelling is a boolean.
        assert_eq!(decode("True").unwrap(), ConfigValue::from("True"));
    }

    #[test]
    fn integers() {
        assert_eq!(decode("42").unwrap(), ConfigValue::Int(42));
        assert_eq!(decode("-7").unwrap(), ConfigValue::Int(-7));
        assert_eq!(decode("0").unwrap(), ConfigValue::Int(0));
    }

    #[test]
    fn integer_overflow_is_hard_error() {
        let err = decode("99999999999999999999999").unwrap_err();
        assert!(matches!(err, CodecError::Undecodable { .. }));
    }

    #[test]
    fn plus_sign_is_not_an_integer() {
        assert_eq!(decode("+7").unwrap(), ConfigValue::from("+7"));
    }

    #[test]
    fn bare_text_is_a_string() {
        assert_eq!(decode("hello").unwrap(), ConfigValue::from("hello"));
        assert_eq!(decode("  padded  ").unwrap(), ConfigValue::from("  padded  "));
        assert_eq!(decode("null").unwrap(), ConfigValue::from("null"));
    }

    #[test]
    fn fenced_literal() {
        assert_eq!(
            decode("\"\"\"line one\nline two\"\"\"").unwrap(),
            ConfigValue::from("line one\nline two")
        );
        // Empty fence is the empty string, not Unset.
        assert_eq!(decode("\"\"\"\"\"\"").unwrap(), ConfigValue::from(""));
    }

    #[test]
    fn fenced_inner_quotes_survive() {
        assert_eq!(
            decode("\"\"\"a\n\"\"\"b\"\"\"").unwrap(),
            ConfigValue::from("a\n\"\"\"b")
        );
    }

    #[test]
    fn unterminated_fence_is_hard_error() {
        let err = decode("\"\"\"oops").unwrap_err();
        assert!(matches!(err, CodecError::Undecodable { .. }));
        assert!(decode("\"\"\"\"\"").is_err());
    }

    #[test]
    fn quoted_string() {
        assert_eq!(decode(r#""42""#).unwrap(), ConfigValue::from("42"));
        assert_eq!(decode(r#""""#).unwrap(), ConfigValue::from(""));
        assert_eq!(decode(r#""a\nb""#).unwrap(), ConfigValue::from("a\nb"));
    }

    #[test]
    fn malformed_quoted_string_is_hard_error() {
        assert!(decode("\"unterminated").is_err());
    }

    #[test]
    fn mapping_literal() {
        let decoded = decode(r#"{"branches/x": 2, "trunk": 1}"#).unwrap();
        let map = decoded.as_map().unwrap();
        assert_eq!(map.get("trunk"), Some(&ConfigValue::Int(1)));
        assert_eq!(map.get("branches/x"), Some(&ConfigValue::Int(2)));
    }

    #[test]
    fn nested_mapping_literal() {
        let decoded = decode(r#"{"branches/x": {"version": 1, "frozen": true}}"#).unwrap();
        let outer = decoded.as_map().unwrap();
        let inner = outer.get("branches/x").unwrap().as_map().unwrap();
        assert_eq!(inner.get("version"), Some(&ConfigValue::Int(1)));
        assert_eq!(inner.get("frozen"), Some(&ConfigValue::Bool(true)));
    }

    #[test]
    fn pretty_printed_mapping_decodes() {
        let text = "{\n  \"trunk\": 1\n}";
        let decoded = decode(text).unwrap();
        assert_eq!(
            decoded.as_map().unwrap().get("trunk"),
            Some(&ConfigValue::Int(1))
        );
    }

    #[test]
    fn malformed_mapping_is_hard_error() {
        assert!(decode("{not json").is_err());
        assert!(decode(r#"{"dangling": "#).is_err());
    }

    #[test]
    fn unsupported_kinds_in_mapping_are_hard_errors() {
        assert!(decode(r#"{"pi": 1.5}"#).is_err());
        assert!(decode(r#"{"xs": [1, 2]}"#).is_err());
        assert!(decode(r#"{"gone": null}"#).is_err());
        assert!(decode(r#"{"deep": {"gone": null}}"#).is_err());
    }
}
