//! Tree-shaped records and result pages.
//!
//! A [`Record`] keeps its fields in wire order. The object type travels as a
//! reserved `type` field, the way the partner API nests it in every record;
//! [`crate::accessor`] hides reserved fields from callers.

use serde_json::{Map, Value};

/// Field names the service reserves inside every record.
pub const RESERVED_FIELDS: [&str; 2] = ["type", "fieldsToNull"];

/// Returns true if `name` is a reserved field name.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_FIELDS.contains(&name)
}

/// A record as returned by the service. Read-only once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<Field>,
}

/// A named value inside a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    reserved: bool,
    value: FieldValue,
}

/// The value of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Scalar(Value),
    /// A related record reached through a reference field.
    Record(Box<Record>),
    /// The rows of a sub-query.
    Results(Box<ResultSet>),
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Reserved fields are never visible through the accessor.
    pub fn is_reserved(&self) -> bool {
        self.reserved
    }
}

impl FieldValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Object(map) if is_result_set(map) => ResultSet::from_json(value)
                .map(|rs| FieldValue::Results(Box::new(rs)))
                .unwrap_or(FieldValue::Null),
            Value::Object(_) => Record::from_json(value)
                .map(|r| FieldValue::Record(Box::new(r)))
                .unwrap_or(FieldValue::Null),
            other => FieldValue::Scalar(other.clone()),
        }
    }

    /// The value as JSON, with nested records as maps of their visible
    /// fields and sub-query rows as an array of such maps.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Scalar(v) => v.clone(),
            FieldValue::Record(r) => r.to_json(),
            FieldValue::Results(rs) => Value::Array(
                rs.records
                    .iter()
                    .map(|r| r.as_ref().map(Record::to_json).unwrap_or(Value::Null))
                    .collect(),
            ),
        }
    }
}

fn is_result_set(map: &Map<String, Value>) -> bool {
    map.get("records").is_some_and(Value::is_array)
        && (map.contains_key("totalSize") || map.contains_key("done"))
}

impl Record {
    /// An empty record of the given object type.
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            fields: vec![Field {
                name: "type".to_string(),
                reserved: true,
                value: FieldValue::Scalar(Value::String(object_type.into())),
            }],
        }
    }

    /// Build a record from a REST JSON object. Returns `None` for anything
    /// that is not an object.
    ///
    /// The `attributes` block becomes the reserved `type` field.
    pub fn from_json(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let mut fields = Vec::with_capacity(map.len());
        for (name, value) in map {
            if name == "attributes" {
                if let Some(object_type) = value.get("type").and_then(Value::as_str) {
                    fields.push(Field {
                        name: "type".to_string(),
                        reserved: true,
                        value: FieldValue::Scalar(Value::String(object_type.to_string())),
                    });
                }
                continue;
            }
            fields.push(Field {
                name: name.clone(),
                reserved: false,
                value: FieldValue::from_json(value),
            });
        }
        Some(Self { fields })
    }

    /// Add a scalar field; `Value::Null` adds a null field.
    pub fn with_field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = match value.into() {
            Value::Null => FieldValue::Null,
            other => FieldValue::from_json(&other),
        };
        self.push(name.into(), value)
    }

    /// Add a null field.
    pub fn with_null(self, name: impl Into<String>) -> Self {
        self.push(name.into(), FieldValue::Null)
    }

    /// Add a related record.
    pub fn with_child(self, name: impl Into<String>, child: Record) -> Self {
        self.push(name.into(), FieldValue::Record(Box::new(child)))
    }

    /// Add sub-query rows.
    pub fn with_results(self, name: impl Into<String>, results: ResultSet) -> Self {
        self.push(name.into(), FieldValue::Results(Box::new(results)))
    }

    fn push(mut self, name: String, value: FieldValue) -> Self {
        self.fields.push(Field {
            reserved: false,
            name,
            value,
        });
        self
    }

    /// All fields, reserved ones included, in wire order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// First visible field with the given name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| !f.reserved && f.name == name)
    }

    /// The record id, if the `Id` field was selected.
    pub fn id(&self) -> Option<&str> {
        match self.get("Id")?.value() {
            FieldValue::Scalar(Value::String(id)) => Some(id),
            _ => None,
        }
    }

    /// The object type carried in the reserved `type` field.
    pub fn object_type(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.reserved && f.name == "type")
            .and_then(|f| match &f.value {
                FieldValue::Scalar(Value::String(t)) => Some(t.as_str()),
                _ => None,
            })
    }

    /// Visible fields as a JSON map.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .filter(|f| !f.reserved)
                .map(|f| (f.name.clone(), f.value.to_json()))
                .collect(),
        )
    }
}

/// One page of query results.
///
/// `records` may contain holes (`None`) where a retrieve found nothing for
/// an id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub records: Vec<Option<Record>>,
    /// Size of the whole result as reported by the server.
    pub total_size: usize,
    /// Continuation token for the next page.
    pub cursor: Option<String>,
    /// No further page exists once this is true.
    pub done: bool,
}

impl ResultSet {
    /// A terminal page with no records.
    pub fn empty() -> Self {
        Self {
            done: true,
            ..Self::default()
        }
    }

    /// A terminal page holding every record of the result.
    pub fn complete(records: Vec<Option<Record>>) -> Self {
        Self {
            total_size: records.len(),
            records,
            cursor: None,
            done: true,
        }
    }

    /// Build a page from a REST query response (or a sub-query value).
    pub fn from_json(value: &Value) -> Option<Self> {
        let records = value
            .get("records")?
            .as_array()?
            .iter()
            .map(Record::from_json)
            .collect::<Vec<_>>();
        Some(Self {
            total_size: value
                .get("totalSize")
                .and_then(Value::as_u64)
                .map(|n| n as usize)
                .unwrap_or(records.len()),
            cursor: value
                .get("nextRecordsUrl")
                .and_then(Value::as_str)
                .map(str::to_string),
            done: value.get("done").and_then(Value::as_bool).unwrap_or(true),
            records,
        })
    }

    /// Number of records on this page, holes included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
