//! In-memory backend for unit tests. Records every collaborator call.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::metadata::ObjectDescriptor;
use crate::record::{Record, ResultSet};
use crate::transport::{
    DeletedMarker, Fault, LoginInfo, LoginRequest, ObjectSummary, QueryService, SchemaService,
    SessionTransport, WriteOperation, WriteResult,
};
use crate::window::TimeWindow;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Login(String),
    Close,
    Write(WriteOperation),
    DescribeObject(String),
    DescribeGlobal,
    Query(String),
    QueryAll(String),
    QueryMore(String),
    GetUpdated(String),
    GetDeleted(String),
    Retrieve { object: String, ids: usize },
}

#[derive(Debug, Default)]
pub(crate) struct MockBackend {
    objects: Vec<ObjectDescriptor>,
    pages: HashMap<String, ResultSet>,
    updated: Vec<String>,
    deleted: Vec<DeletedMarker>,
    missing: HashSet<String>,
    failures: HashMap<&'static str, Fault>,
    calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_object(mut self, object: ObjectDescriptor) -> Self {
        self.objects.push(object);
        self
    }

    /// Answer `query`/`queryAll` for `soql`, or `queryMore` for a cursor.
    pub(crate) fn with_page(mut self, key: impl Into<String>, page: ResultSet) -> Self {
        self.pages.insert(key.into(), page);
        self
    }

    pub(crate) fn with_updated(mut self, ids: Vec<String>) -> Self {
        self.updated = ids;
        self
    }

    pub(crate) fn with_deleted(mut self, markers: Vec<DeletedMarker>) -> Self {
        self.deleted = markers;
        self
    }

    /// Ids `retrieve` finds nothing for.
    pub(crate) fn with_missing(mut self, id: impl Into<String>) -> Self {
        self.missing.insert(id.into());
        self
    }

    /// Make every call of `operation` fail.
    pub(crate) fn failing(mut self, operation: &'static str, fault: Fault) -> Self {
        self.failures.insert(operation, fault);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn retrieve_sizes(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Retrieve { ids, .. } => Some(ids),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn describe_calls(&self, object: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::DescribeObject(o) if o == object))
            .count()
    }

    fn record(&self, call: Call, operation: &'static str) -> Result<(), Fault> {
        self.calls.lock().unwrap().push(call);
        match self.failures.get(operation) {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }

    fn page(&self, key: &str) -> Result<ResultSet, Fault> {
        self.pages
            .get(key)
            .cloned()
            .ok_or_else(|| Fault::new(Some("MALFORMED_QUERY"), format!("no page for {key}")))
    }
}

impl SessionTransport for MockBackend {
    async fn login(&mut self, request: &LoginRequest) -> Result<LoginInfo, Fault> {
        self.record(Call::Login(request.username.clone()), "login")?;
        Ok(LoginInfo {
            server_url: format!("{}/services/Soap/u/{}", request.url, request.api_version),
            user_name: Some(request.username.clone()),
            user_full_name: Some("Test User".into()),
            organization_name: Some("Test Org".into()),
            ..LoginInfo::default()
        })
    }

    async fn call(&self, operation: WriteOperation) -> Result<Vec<WriteResult>, Fault> {
        let count = operation.len();
        self.record(Call::Write(operation), "call")?;
        Ok((0..count)
            .map(|i| WriteResult {
                id: Some(format!("001{i:015}")),
                success: true,
                errors: vec![],
                created: None,
            })
            .collect())
    }

    async fn close(&mut self) -> Result<(), Fault> {
        self.record(Call::Close, "close")
    }
}

impl SchemaService for MockBackend {
    async fn describe_object(&self, name: &str) -> Result<ObjectDescriptor, Fault> {
        self.record(Call::DescribeObject(name.to_string()), "describe_object")?;
        self.objects
            .iter()
            .find(|o| o.name == name)
            .cloned()
            .ok_or_else(|| Fault::new(Some("NOT_FOUND"), format!("sObject type '{name}' is not supported")))
    }

    async fn describe_global(&self) -> Result<Vec<ObjectSummary>, Fault> {
        self.record(Call::DescribeGlobal, "describe_global")?;
        Ok(self
            .objects
            .iter()
            .map(|o| ObjectSummary {
                name: o.name.clone(),
                queryable: o.queryable,
            })
            .collect())
    }
}

impl QueryService for MockBackend {
    async fn query(&self, soql: &str) -> Result<ResultSet, Fault> {
        self.record(Call::Query(soql.to_string()), "query")?;
        self.page(soql)
    }

    async fn query_all(&self, soql: &str) -> Result<ResultSet, Fault> {
        self.record(Call::QueryAll(soql.to_string()), "query_all")?;
        self.page(soql)
    }

    async fn query_more(&self, cursor: &str) -> Result<ResultSet, Fault> {
        self.record(Call::QueryMore(cursor.to_string()), "query_more")?;
        self.page(cursor)
    }

    async fn get_updated(&self, object: &str, _window: &TimeWindow) -> Result<Vec<String>, Fault> {
        self.record(Call::GetUpdated(object.to_string()), "get_updated")?;
        Ok(self.updated.clone())
    }

    async fn get_deleted(
        &self,
        object: &str,
        _window: &TimeWindow,
    ) -> Result<Vec<DeletedMarker>, Fault> {
        self.record(Call::GetDeleted(object.to_string()), "get_deleted")?;
        Ok(self.deleted.clone())
    }

    async fn retrieve(
        &self,
        object: &str,
        _fields: &[String],
        ids: &[String],
    ) -> Result<Vec<Option<Record>>, Fault> {
        self.record(
            Call::Retrieve {
                object: object.to_string(),
                ids: ids.len(),
            },
            "retrieve",
        )?;
        Ok(ids
            .iter()
            .map(|id| {
                (!self.missing.contains(id))
                    .then(|| Record::new(object).with_field("Id", id.as_str()))
            })
            .collect())
    }
}
