//! Write payloads.

use serde_json::{json, Map, Value};

use crate::metadata::{ExternalKeyRef, FieldRef};

/// One record to insert, update or upsert.
///
/// Fields are kept in the order they were set. An external-key field is
/// rendered as a nested reference under its relationship name:
///
/// ```
/// use serde_json::json;
/// use sfx_extract::{FieldRef, Payload};
///
/// let key: FieldRef = "Account:Ext_Id__c/Account".parse().unwrap();
/// let payload = Payload::new("Contact")
///     .set_field("LastName", "Hopper")
///     .set(key, "ACME-1");
/// assert_eq!(
///     payload.to_json(),
///     json!({
///         "attributes": {"type": "Contact"},
///         "LastName": "Hopper",
///         "Account": {"attributes": {"type": "Account"}, "Ext_Id__c": "ACME-1"}
///     })
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    object: String,
    values: Vec<(FieldRef, Value)>,
}

impl Payload {
    pub fn new(object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            values: Vec::new(),
        }
    }

    /// Set a field. A field set twice keeps the last value.
    pub fn set(mut self, field: FieldRef, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.values.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.values.push((field, value)),
        }
        self
    }

    /// Set a plain field by name.
    pub fn set_field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(FieldRef::Plain(name.into()), value)
    }

    /// Clear a plain field on the server.
    pub fn set_null(self, name: impl Into<String>) -> Self {
        self.set(FieldRef::Plain(name.into()), Value::Null)
    }

    /// Set the record id (required for updates).
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.set_field("Id", id.into())
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn id(&self) -> Option<&str> {
        self.values.iter().find_map(|(field, value)| match field {
            FieldRef::Plain(name) if name == "Id" => value.as_str(),
            _ => None,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldRef> {
        self.values.iter().map(|(field, _)| field)
    }

    /// The record as the collection API expects it.
    ///
    /// Plain nulls are sent as JSON nulls, which clears the field. An
    /// external key without a value is left out: there is no record to
    /// link to.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("attributes".to_string(), json!({ "type": self.object }));
        for (field, value) in &self.values {
            match field {
                FieldRef::Plain(name) => {
                    map.insert(name.clone(), value.clone());
                }
                FieldRef::ExternalKey(key) if !value.is_null() => {
                    map.insert(key.relationship.clone(), reference(key, value));
                }
                FieldRef::ExternalKey(_) => {}
            }
        }
        Value::Object(map)
    }
}

fn reference(key: &ExternalKeyRef, value: &Value) -> Value {
    let mut map = Map::new();
    map.insert("attributes".to_string(), json!({ "type": key.target }));
    map.insert(key.id_field.clone(), value.clone());
    Value::Object(map)
}
