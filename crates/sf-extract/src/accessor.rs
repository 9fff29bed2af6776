//! Field extraction by dotted path.

use serde_json::Value;

use crate::record::{Field, FieldValue, Record};

/// The visible fields of a record, in wire order.
///
/// Reserved fields (`type`, `fieldsToNull`) are left out.
pub fn raw_children(record: &Record) -> Vec<&Field> {
    record.fields().iter().filter(|f| !f.is_reserved()).collect()
}

/// Resolve a dotted path (`Account.Owner.Name`) to a string value.
///
/// Each segment must name a visible field of the current record; every
/// segment but the last must hold a related record. Returns `None` when a
/// segment does not match, when an intermediate value is not a record, or
/// when the final value is null.
///
/// Scalars are rendered without JSON quoting. Sub-query rows come back as a
/// JSON array of field maps, a related record as a JSON object.
pub fn value_at(record: &Record, path: &str) -> Option<String> {
    let mut segments = path.split('.').peekable();
    let mut current = record;
    while let Some(segment) = segments.next() {
        let field = current.get(segment)?;
        if segments.peek().is_none() {
            return render(field.value());
        }
        match field.value() {
            FieldValue::Record(child) => current = child,
            _ => return None,
        }
    }
    None
}

fn render(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Null => None,
        FieldValue::Scalar(Value::String(s)) => Some(s.clone()),
        FieldValue::Scalar(other) => Some(other.to_string()),
        FieldValue::Record(_) | FieldValue::Results(_) => Some(value.to_json().to_string()),
    }
}
