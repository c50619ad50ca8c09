//! JSON payload decoding.

use meteorfall_core::Record;
use serde_json::Value;

use super::DecodeError;

/// Decode a JSON array of flat objects into records.
///
/// String fields are kept verbatim; numbers and booleans keep their JSON
/// spelling. Nulls, nested objects and arrays (such as the `geolocation`
/// object in the public dataset) are dropped.
///
/// # Errors
/// Returns [`DecodeError`] when the payload is not JSON, the top level is
/// not an array, or an element is not an object.
///
/// # Examples
/// ```
/// use meteorfall_data::decode_records;
///
/// let payload = br#"[{"name": "Aachen", "mass": "21", "reclat": "50.775000", "fall": null}]"#;
/// let records = decode_records(payload)?;
/// assert_eq!(records[0].name(), Some("Aachen"));
/// assert_eq!(records[0].get("fall"), None);
/// # Ok::<(), meteorfall_data::DecodeError>(())
/// ```
pub fn decode_records(payload: &[u8]) -> Result<Vec<Record>, DecodeError> {
    let value: Value = serde_json::from_slice(payload)?;
    let Value::Array(elements) = value else {
        return Err(DecodeError::NotAnArray {
            found: json_type(&value),
        });
    };
    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| match element {
            Value::Object(fields) => Ok(fields
                .into_iter()
                .filter_map(|(key, value)| scalar_text(value).map(|text| (key, text)))
                .collect::<Record>()),
            other => Err(DecodeError::NotAnObject {
                index,
                found: json_type(&other),
            }),
        })
        .collect()
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
