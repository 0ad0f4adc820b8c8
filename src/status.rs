//! Turns a homework record into the notification text

use crate::error::{Error, Result};
use crate::types::HomeworkStatus;
use crate::validator::json_type;
use serde_json::Value;

/// Sent when the review API answers with a non-success status
pub const SERVICE_UNAVAILABLE: &str = "The homework review service is unavailable!";

/// Notification announcing a status change for `name`
pub fn status_message(name: &str, status: HomeworkStatus) -> String {
    format!(
        "Status of homework \"{name}\" has changed. {}",
        status.verdict()
    )
}

/// Notification sent once the failure streak reaches the escalation threshold
pub fn failure_message(error: &Error) -> String {
    format!("Program failure: {error}")
}

/// Map a single homework record to its notification text
///
/// The status is checked before the name so an unknown status is always
/// reported as such, whatever else is wrong with the record.
///
/// # Errors
///
/// - [`Error::Shape`] if the record is not a JSON object
/// - [`Error::MissingField`] if `status` or `homework_name` is absent
/// - [`Error::FieldType`] if either field is not a string
/// - [`Error::UnknownStatus`] if the status is not in the verdict table
pub fn parse_status(homework: &Value) -> Result<String> {
    let record = homework.as_object().ok_or(Error::Shape)?;

    let status: HomeworkStatus = string_field(record, "status")?.parse()?;
    let name = string_field(record, "homework_name")?;

    Ok(status_message(name, status))
}

fn string_field<'a>(
    record: &'a serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<&'a str> {
    match record.get(field) {
        None | Some(Value::Null) => Err(Error::MissingField { field }),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => {
            tracing::debug!(field, got = json_type(other), "unexpected field type");
            Err(Error::FieldType {
                field,
                expected: "string",
            })
        }
    }
}
