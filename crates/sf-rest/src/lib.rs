//! # sfx-rest
//!
//! Typed access to the parts of the Salesforce REST API used for record
//! extraction and write-back.
//!
//! ## Features
//!
//! - **SOQL Query** - `query`, `queryAll` (deleted and archived rows) and `queryMore`
//! - **Describe** - global object list and per-object field metadata
//! - **Replication** - ids updated or deleted within a time window
//! - **SObject Collections** - retrieve up to 2000 records by id; create,
//!   update, upsert and delete up to 200 records per call
//!
//! ## Example
//!
//! ```rust,ignore
//! use sfx_rest::SalesforceRestClient;
//!
//! let client = SalesforceRestClient::new(instance_url, session_id)?;
//! let updated = client.get_updated("Account", start, end).await?;
//! let records = client
//!     .retrieve_multiple("Account", &updated.ids, &["Id".into(), "Name".into()])
//!     .await?;
//! ```

mod client;
mod collections;
mod describe;
mod error;
mod sync;

pub use client::SalesforceRestClient;
pub use collections::{
    CollectionRequest, CollectionResult, RetrieveRequest, SalesforceError,
    MAX_COLLECTION_RETRIEVE, MAX_COLLECTION_WRITE,
};
pub use describe::{DescribeGlobalResult, DescribeSObjectResult, FieldDescribe, SObjectBasicInfo};
pub use error::{Error, ErrorKind, Result};
pub use sfx_client::QueryResult;
pub use sync::{format_datetime, parse_datetime, DeletedRecord, GetDeletedResult, GetUpdatedResult};
