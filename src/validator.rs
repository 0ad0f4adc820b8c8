//! Shape checks for review API responses

use crate::error::{Error, Result};
use serde_json::Value;
use tracing::error;

/// Key holding the homework list in a response
pub const HOMEWORKS_KEY: &str = "homeworks";
/// Key holding the server timestamp in a response
pub const CURRENT_DATE_KEY: &str = "current_date";

/// Validate a decoded response and return its homework list
///
/// The list may be empty. A `null` value under `homeworks` is treated the
/// same as an absent key.
///
/// # Errors
///
/// - [`Error::Shape`] if the response is not a JSON object
/// - [`Error::MissingField`] if `homeworks` is absent
/// - [`Error::FieldType`] if `homeworks` is not an array
pub fn check_response(response: &Value) -> Result<&[Value]> {
    let Some(object) = response.as_object() else {
        error!(got = json_type(response), "response is not a JSON object");
        return Err(Error::Shape);
    };

    match object.get(HOMEWORKS_KEY) {
        None | Some(Value::Null) => {
            error!(field = HOMEWORKS_KEY, "response has no homework list");
            Err(Error::MissingField {
                field: HOMEWORKS_KEY,
            })
        }
        Some(Value::Array(homeworks)) => Ok(homeworks.as_slice()),
        Some(other) => {
            error!(
                field = HOMEWORKS_KEY,
                got = json_type(other),
                "homework list is not an array"
            );
            Err(Error::FieldType {
                field: HOMEWORKS_KEY,
                expected: "array",
            })
        }
    }
}

/// Server timestamp reported alongside the homework list, if any
pub fn current_date(response: &Value) -> Option<i64> {
    response.get(CURRENT_DATE_KEY).and_then(Value::as_i64)
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
