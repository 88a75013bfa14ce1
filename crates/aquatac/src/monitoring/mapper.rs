use serde_json::{Number, Value};

use super::domain::{RawDocument, Reading, ReadingId, WaterSample};

pub(crate) const FIELD_LOCATION: &str = "location";
pub(crate) const FIELD_TEMPERATURE: &str = "temperature";
pub(crate) const FIELD_PH: &str = "ph";
pub(crate) const FIELD_TURBIDITY: &str = "turbidity";
pub(crate) const FIELD_DISSOLVED_OXYGEN: &str = "dissolved_oxygen";
pub(crate) const FIELD_TIMESTAMP: &str = "timestamp";
pub(crate) const FIELD_ID: &str = "id";

/// A stored field holds a value of the wrong type, or a write payload lacks a required field.
/// Write payloads have no reading id yet, so `reading_id` is `None` for them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}: field `{field}` {problem}", subject(.reading_id))]
pub struct MalformedDocument {
    pub reading_id: Option<String>,
    pub field: &'static str,
    pub problem: String,
}

impl MalformedDocument {
    pub(crate) fn new(reading_id: &str, field: &'static str, problem: impl Into<String>) -> Self {
        Self {
            reading_id: Some(reading_id.to_string()),
            field,
            problem: problem.into(),
        }
    }

    pub(crate) fn payload(field: &'static str, problem: impl Into<String>) -> Self {
        Self {
            reading_id: None,
            field,
            problem: problem.into(),
        }
    }
}

fn subject(reading_id: &Option<String>) -> String {
    match reading_id {
        Some(reading_id) => format!("reading {reading_id}"),
        None => "reading payload".to_string(),
    }
}

/// Builds a [`Reading`] from a stored document. The push key becomes the reading id; any
/// `safeForSwimming`/`safeForFishing`/score fields in the document are ignored and re-derived.
pub fn map_document(document: &RawDocument, key: &ReadingId) -> Result<Reading, MalformedDocument> {
    let reading_id = key.as_str();
    let location = string_field(document, reading_id, FIELD_LOCATION)?;
    let sample = WaterSample::new(
        number_field(document, reading_id, FIELD_TEMPERATURE)?,
        number_field(document, reading_id, FIELD_PH)?,
        number_field(document, reading_id, FIELD_TURBIDITY)?,
        number_field(document, reading_id, FIELD_DISSOLVED_OXYGEN)?,
    );
    let timestamp = string_field(document, reading_id, FIELD_TIMESTAMP)?;
    let legacy_id = integer_field(document, reading_id, FIELD_ID)?;

    Ok(Reading::new(
        key.clone(),
        location,
        sample,
        timestamp,
        legacy_id,
    ))
}

/// Absent and non-finite values are left out of the document.
pub(crate) fn insert_number(document: &mut RawDocument, field: &str, value: Option<f64>) {
    if let Some(number) = value.and_then(Number::from_f64) {
        document.insert(field.to_string(), Value::Number(number));
    }
}

fn number_field(
    document: &RawDocument,
    reading_id: &str,
    field: &'static str,
) -> Result<Option<f64>, MalformedDocument> {
    match document.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(number.as_f64()),
        Some(other) => Err(MalformedDocument::new(
            reading_id,
            field,
            format!("expected a number, found {}", type_name(other)),
        )),
    }
}

fn integer_field(
    document: &RawDocument,
    reading_id: &str,
    field: &'static str,
) -> Result<Option<i64>, MalformedDocument> {
    match document.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(value) => Ok(Some(value)),
            None => Err(MalformedDocument::new(
                reading_id,
                field,
                format!("expected an integer, found {number}"),
            )),
        },
        Some(other) => Err(MalformedDocument::new(
            reading_id,
            field,
            format!("expected an integer, found {}", type_name(other)),
        )),
    }
}

fn string_field(
    document: &RawDocument,
    reading_id: &str,
    field: &'static str,
) -> Result<String, MalformedDocument> {
    match document.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(MalformedDocument::new(
            reading_id,
            field,
            format!("expected a string, found {}", type_name(other)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
