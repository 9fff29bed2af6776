//! Field metadata: object descriptions, field classification and
//! external-key expansion of reference fields.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use sfx_rest::{DescribeSObjectResult, FieldDescribe};
use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::transport::SchemaService;
use crate::window::FetchMode;

/// How a field participates in reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// The record id.
    Identifier,
    /// A lookup to other objects.
    Reference {
        targets: Vec<String>,
        relationship: Option<String>,
    },
    Scalar,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub updatable: bool,
    pub calculated: bool,
    /// The field can stand in for the record id when linking records.
    pub id_lookup: bool,
}

impl FieldDescriptor {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar,
            updatable: true,
            calculated: false,
            id_lookup: false,
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Identifier,
            updatable: false,
            id_lookup: true,
            ..Self::scalar(name)
        }
    }

    pub fn reference(
        name: impl Into<String>,
        target: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            kind: FieldKind::Reference {
                targets: vec![target.into()],
                relationship: Some(relationship.into()),
            },
            ..Self::scalar(name)
        }
    }

    pub fn with_id_lookup(mut self, id_lookup: bool) -> Self {
        self.id_lookup = id_lookup;
        self
    }

    pub fn with_updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }

    pub fn with_calculated(mut self, calculated: bool) -> Self {
        self.calculated = calculated;
        self
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == FieldKind::Identifier
    }

    /// Whether the field survives the "updatable only" filter: the id, or
    /// any field that is written directly.
    pub fn is_writable(&self) -> bool {
        self.is_identifier() || (!self.calculated && self.updatable)
    }
}

impl From<&FieldDescribe> for FieldDescriptor {
    fn from(field: &FieldDescribe) -> Self {
        let kind = match field.field_type.as_str() {
            "id" => FieldKind::Identifier,
            "reference" => FieldKind::Reference {
                targets: field.reference_to.clone(),
                relationship: field.relationship_name.clone(),
            },
            _ => FieldKind::Scalar,
        };
        Self {
            name: field.name.clone(),
            kind,
            updatable: field.updateable,
            calculated: field.calculated,
            id_lookup: field.id_lookup,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    pub name: String,
    pub queryable: bool,
    /// Supports getUpdated/getDeleted.
    pub replicateable: bool,
    pub fields: Vec<FieldDescriptor>,
}

impl ObjectDescriptor {
    /// The id field.
    pub fn identifier(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.is_identifier())
    }

    /// Every object has exactly one id field.
    pub fn validate(&self) -> Result<()> {
        match self.fields.iter().filter(|f| f.is_identifier()).count() {
            1 => Ok(()),
            n => Err(Error::new(ErrorKind::InvalidSchema(format!(
                "{} has {} id fields",
                self.name, n
            )))),
        }
    }
}

impl From<DescribeSObjectResult> for ObjectDescriptor {
    fn from(result: DescribeSObjectResult) -> Self {
        Self {
            queryable: result.queryable,
            replicateable: result.is_replicateable(),
            fields: result.fields.iter().map(FieldDescriptor::from).collect(),
            name: result.name,
        }
    }
}

/// A lookup through an external key of the target object, written
/// `Target:IdField/Relationship`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalKeyRef {
    /// Object the reference points to.
    pub target: String,
    /// External id (or id-lookup) field of `target`.
    pub id_field: String,
    /// Relationship name on the referencing object.
    pub relationship: String,
}

impl fmt::Display for ExternalKeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.target, self.id_field, self.relationship)
    }
}

impl FromStr for ExternalKeyRef {
    type Err = Error;

    /// Parses `Type:Field/Relationship`. Without `/` the relationship is
    /// the field name.
    fn from_str(s: &str) -> Result<Self> {
        let (target, rest) = s
            .split_once(':')
            .ok_or_else(|| Error::config(format!("{s}: expected Type:Field/Relationship")))?;
        if target.trim().is_empty() {
            return Err(Error::config(format!("{s}: unable to find object type")));
        }
        let (id_field, relationship) = rest.split_once('/').unwrap_or((rest, rest));
        if id_field.trim().is_empty() || relationship.trim().is_empty() {
            return Err(Error::config(format!("{s}: missing lookup field")));
        }
        Ok(Self {
            target: target.trim().to_string(),
            id_field: id_field.trim().to_string(),
            relationship: relationship.trim().to_string(),
        })
    }
}

/// A field name to write: plain, or an external-key lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldRef {
    Plain(String),
    ExternalKey(ExternalKeyRef),
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Plain(name) => f.write_str(name),
            FieldRef::ExternalKey(key) => key.fmt(f),
        }
    }
}

impl FromStr for FieldRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.contains(':') {
            return s.parse().map(FieldRef::ExternalKey);
        }
        let name = s.trim();
        if name.is_empty() {
            return Err(Error::config("empty field name"));
        }
        Ok(FieldRef::Plain(name.to_string()))
    }
}

impl From<ExternalKeyRef> for FieldRef {
    fn from(key: ExternalKeyRef) -> Self {
        FieldRef::ExternalKey(key)
    }
}

/// Describe `object` and check it can serve a fetch in `mode`.
#[instrument(skip(schema, mode))]
pub async fn describe<S: SchemaService>(
    schema: &S,
    object: &str,
    mode: &FetchMode,
) -> Result<ObjectDescriptor> {
    let descriptor = schema
        .describe_object(object)
        .await
        .map_err(|fault| Error::query(format_args!("describe {object}"), fault))?;

    if !descriptor.queryable {
        return Err(Error::new(ErrorKind::ObjectNotQueryable(object.to_string())));
    }
    if mode.requires_replication() && !descriptor.replicateable {
        return Err(Error::new(ErrorKind::ObjectNotReplicable(object.to_string())));
    }
    descriptor.validate()?;
    Ok(descriptor)
}

/// Field names, optionally limited to the id plus directly writable fields.
pub fn names(fields: &[FieldDescriptor], exclude_non_updatable: bool) -> Vec<String> {
    fields
        .iter()
        .filter(|f| !exclude_non_updatable || f.is_writable())
        .map(|f| f.name.clone())
        .collect()
}

/// Field names plus, after each reference field, one external-key ref per
/// id-lookup field of the referenced object.
///
/// Each referenced object is described at most once per call, and only its
/// own fields are considered; its references are not followed.
#[instrument(skip(schema, fields), fields(count = fields.len()))]
pub async fn expand<S: SchemaService>(
    schema: &S,
    fields: &[FieldDescriptor],
    exclude_non_updatable: bool,
) -> Result<Vec<FieldRef>> {
    let mut visited: HashMap<String, Vec<FieldDescriptor>> = HashMap::new();
    let mut refs = Vec::new();

    for field in fields
        .iter()
        .filter(|f| !exclude_non_updatable || f.is_writable())
    {
        refs.push(FieldRef::Plain(field.name.clone()));

        let FieldKind::Reference {
            targets,
            relationship,
        } = &field.kind
        else {
            continue;
        };
        let target = targets.first().ok_or_else(|| {
            Error::new(ErrorKind::InvalidSchema(format!(
                "reference field {} has no target",
                field.name
            )))
        })?;
        let relationship = relationship.as_deref().ok_or_else(|| {
            Error::new(ErrorKind::InvalidSchema(format!(
                "reference field {} has no relationship name",
                field.name
            )))
        })?;

        if !visited.contains_key(target) {
            let descriptor = schema
                .describe_object(target)
                .await
                .map_err(|fault| Error::query(format_args!("describe {target}"), fault))?;
            debug!(target = %target, fields = descriptor.fields.len(), "Described reference target");
            visited.insert(target.clone(), descriptor.fields);
        }
        let target_fields = visited.get(target).map(Vec::as_slice).unwrap_or_default();

        refs.extend(
            target_fields
                .iter()
                .filter(|f| !exclude_non_updatable || f.is_writable())
                .filter(|f| f.id_lookup && !f.is_identifier())
                .map(|f| {
                    FieldRef::ExternalKey(ExternalKeyRef {
                        target: target.clone(),
                        id_field: f.name.clone(),
                        relationship: relationship.to_string(),
                    })
                }),
        );
    }

    Ok(refs)
}

/// Names of the objects visible to the user.
#[instrument(skip(schema))]
pub async fn list_objects<S: SchemaService>(schema: &S, only_queryable: bool) -> Result<Vec<String>> {
    let objects = schema
        .describe_global()
        .await
        .map_err(|fault| Error::query("describe global", fault))?;
    Ok(objects
        .into_iter()
        .filter(|o| !only_queryable || o.queryable)
        .map(|o| o.name)
        .collect())
}
