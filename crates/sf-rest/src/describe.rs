//! Describe types.
//!
//! Only the attributes the extraction layer reads are modelled; unknown
//! attributes in the response are ignored.

use serde::{Deserialize, Serialize};

/// Result of the describeGlobal operation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DescribeGlobalResult {
    /// Character encoding (e.g., "UTF-8").
    #[serde(default)]
    pub encoding: Option<String>,

    /// Maximum batch size for composite operations.
    #[serde(rename = "maxBatchSize", default)]
    pub max_batch_size: Option<u32>,

    /// Objects visible to the user.
    pub sobjects: Vec<SObjectBasicInfo>,
}

/// Basic information about an SObject from describeGlobal.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SObjectBasicInfo {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub queryable: bool,
    #[serde(default)]
    pub retrieveable: bool,
    #[serde(default)]
    pub replicateable: Option<bool>,
}

/// Result of describing a single SObject.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DescribeSObjectResult {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub queryable: bool,
    #[serde(default)]
    pub retrieveable: bool,
    #[serde(default)]
    pub replicateable: Option<bool>,
    #[serde(default)]
    pub fields: Vec<FieldDescribe>,
}

impl DescribeSObjectResult {
    /// Returns true if getUpdated/getDeleted may be used on this object.
    pub fn is_replicateable(&self) -> bool {
        self.replicateable.unwrap_or(false)
    }
}

/// Field metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldDescribe {
    pub name: String,
    #[serde(default)]
    pub label: String,
    /// Field type (`id`, `reference`, `string`, ...).
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub createable: bool,
    #[serde(default)]
    pub updateable: bool,
    #[serde(default)]
    pub nillable: bool,
    #[serde(rename = "externalId", default)]
    pub external_id: bool,
    /// The field can be used to identify a record in upserts and lookups.
    #[serde(rename = "idLookup", default)]
    pub id_lookup: bool,
    #[serde(default)]
    pub calculated: bool,
    /// Target objects of a reference field.
    #[serde(rename = "referenceTo", default)]
    pub reference_to: Vec<String>,
    /// Relationship name of a reference field (`Owner` for `OwnerId`).
    #[serde(rename = "relationshipName", default)]
    pub relationship_name: Option<String>,
}
