//! Fetch execution and page-by-page iteration.

use chrono::{DateTime, Utc};
use sfx_client::security::soql;
use tracing::{debug, info, instrument};

use crate::batch::fetch_by_ids;
use crate::error::{Error, ErrorKind, Result};
use crate::metadata;
use crate::reconcile::{self, DeletionIndex, Visit};
use crate::record::{Record, ResultSet};
use crate::transport::{QueryService, SchemaService};
use crate::window::FetchMode;

/// What to fetch and how.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchRequest {
    /// Object to read. Required unless an explicit query drives a plain fetch.
    pub object: Option<String>,
    /// Fields to select, dotted paths allowed.
    pub fields: Vec<String>,
    /// WHERE clause appended to the generated query.
    pub condition: Option<String>,
    /// Explicit SOQL used instead of the generated query. Skips the
    /// up-front describe of the object.
    pub query: Option<String>,
    pub mode: FetchMode,
}

impl FetchRequest {
    /// Fetch `fields` of `object`.
    pub fn object<S: Into<String>>(object: impl Into<String>, fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            object: Some(object.into()),
            fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Fetch with an explicit query.
    pub fn query(soql: impl Into<String>) -> Self {
        Self {
            query: Some(soql.into()),
            ..Self::default()
        }
    }

    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn with_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    /// The SOQL the fetch runs: the explicit query, or
    /// `SELECT fields FROM object [WHERE condition]`.
    pub fn soql(&self) -> Result<String> {
        if let Some(query) = self.query.as_deref().filter(|q| !q.trim().is_empty()) {
            return Ok(query.to_string());
        }
        let object = self.checked_object()?;
        let select = soql::build_select(&self.fields)
            .ok_or_else(|| Error::config("no valid fields to select"))?;
        let mut soql = format!("SELECT {select} FROM {object}");
        if let Some(condition) = self.condition.as_deref().filter(|c| !c.trim().is_empty()) {
            soql.push_str(" WHERE ");
            soql.push_str(condition);
        }
        Ok(soql)
    }

    fn checked_object(&self) -> Result<&str> {
        let object = self
            .object
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .ok_or_else(|| Error::config("object name is missing"))?;
        if !soql::is_safe_sobject_name(object) {
            return Err(Error::config(format!("invalid object name: {object}")));
        }
        Ok(object)
    }

    fn has_explicit_query(&self) -> bool {
        self.query.as_deref().is_some_and(|q| !q.trim().is_empty())
    }

    /// Everything that can be checked without a remote call.
    pub fn validate(&self) -> Result<()> {
        if self.mode.requires_replication() || !self.has_explicit_query() {
            self.checked_object()?;
        }
        if matches!(self.mode, FetchMode::UpdatedSince(_)) && self.fields.is_empty() {
            return Err(Error::config("updated-since fetches need a field list"));
        }
        self.soql().map(|_| ())
    }
}

/// A running fetch: the current page plus what is needed to continue.
///
/// Pages replace each other; process a page fully before advancing.
#[derive(Debug)]
pub struct Fetch<'s, B> {
    backend: &'s B,
    mode: FetchMode,
    page: ResultSet,
    deletions: DeletionIndex,
}

impl<'s, B: QueryService + SchemaService> Fetch<'s, B> {
    /// Run `request` and hold its first page.
    ///
    /// - plain: `query` (or `queryAll` when `query_all` is set)
    /// - updated-since: `getUpdated`, then the records by id in batches of
    ///   `batch_limit`, as one complete page
    /// - deleted-since: `getDeleted`, then `queryAll` only if there were
    ///   markers; otherwise an empty, done page
    #[instrument(skip(backend, request), fields(object = ?request.object, mode = ?request.mode))]
    pub async fn execute(
        backend: &'s B,
        request: &FetchRequest,
        query_all: bool,
        batch_limit: usize,
    ) -> Result<Self> {
        request.validate()?;
        if batch_limit == 0 {
            return Err(Error::config("batch limit must be at least 1"));
        }

        if !request.has_explicit_query() {
            metadata::describe(backend, request.checked_object()?, &request.mode).await?;
        }

        let mut deletions = DeletionIndex::new();
        let page = match &request.mode {
            FetchMode::All => {
                let soql = request.soql()?;
                let page = if query_all {
                    backend.query_all(&soql).await
                } else {
                    backend.query(&soql).await
                };
                page.map_err(|fault| Error::query("query failed", fault))?
            }
            FetchMode::UpdatedSince(window) => {
                let object = request.checked_object()?;
                let ids = backend
                    .get_updated(object, window)
                    .await
                    .map_err(|fault| Error::query(format_args!("getUpdated {object}"), fault))?;
                debug!(ids = ids.len(), "Updated ids found");
                let records = fetch_by_ids(backend, object, &request.fields, &ids, batch_limit).await?;
                ResultSet::complete(records)
            }
            FetchMode::DeletedSince(window) => {
                let object = request.checked_object()?;
                deletions = backend
                    .get_deleted(object, window)
                    .await
                    .map_err(|fault| Error::query(format_args!("getDeleted {object}"), fault))?
                    .into_iter()
                    .collect();
                debug!(markers = deletions.len(), "Deleted records found");
                if deletions.is_empty() {
                    ResultSet::empty()
                } else {
                    backend
                        .query_all(&request.soql()?)
                        .await
                        .map_err(|fault| Error::query("queryAll failed", fault))?
                }
            }
        };

        info!(
            records = page.len(),
            total = page.total_size,
            done = page.done,
            "Fetch executed"
        );
        Ok(Self {
            backend,
            mode: request.mode,
            page,
            deletions,
        })
    }

    /// Replace the current page with the next one.
    ///
    /// Fails with [`ErrorKind::NotDone`] once the current page is done.
    pub async fn advance(&mut self) -> Result<&ResultSet> {
        if self.page.done {
            return Err(Error::new(ErrorKind::NotDone));
        }
        let cursor = self.page.cursor.clone().ok_or_else(|| {
            Error::new(ErrorKind::Query(
                "page is not done but carries no cursor".to_string(),
            ))
        })?;
        debug!(cursor = %cursor, "Fetching next page");
        self.page = self
            .backend
            .query_more(&cursor)
            .await
            .map_err(|fault| Error::query("queryMore failed", fault))?;
        Ok(&self.page)
    }

    /// The next page, or `None` once the fetch is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<&ResultSet>> {
        if self.page.done {
            return Ok(None);
        }
        self.advance().await.map(Some)
    }

    /// Step through the current page from `index`.
    ///
    /// Deleted-since fetches go through the deletion reconciler; other modes
    /// return the record at `index` as-is.
    pub fn visit(&self, index: usize) -> Visit<'_> {
        if self.mode.is_deleted() {
            return reconcile::visit(&self.page.records, index, &self.deletions);
        }
        Visit {
            position: index,
            record: self.page.records.get(index).and_then(Option::as_ref),
            deleted_at: None,
            exhausted: index + 1 >= self.page.len(),
        }
    }

    /// Walk every remaining record, calling `f` with each emitted record and
    /// its deletion time. Returns how many records were emitted.
    ///
    /// Plain and updated fetches follow the cursor to the last page; a
    /// deleted-since fetch stops as soon as a step reports exhaustion.
    pub async fn for_each<F>(&mut self, mut f: F) -> Result<usize>
    where
        F: FnMut(&Record, Option<DateTime<Utc>>),
    {
        let mut emitted = 0;
        loop {
            let mut index = 0;
            while index < self.page.len() {
                let step = self.visit(index);
                if let Some(record) = step.record {
                    f(record, step.deleted_at);
                    emitted += 1;
                }
                if step.exhausted && self.mode.is_deleted() {
                    return Ok(emitted);
                }
                index = step.position + 1;
            }
            if self.next_page().await?.is_none() {
                return Ok(emitted);
            }
        }
    }

    pub fn page(&self) -> &ResultSet {
        &self.page
    }

    pub fn mode(&self) -> &FetchMode {
        &self.mode
    }

    pub fn deletions(&self) -> &DeletionIndex {
        &self.deletions
    }

    /// Size of the whole result as reported by the server.
    pub fn total_size(&self) -> usize {
        self.page.total_size
    }

    /// Records on the current page.
    pub fn records_count(&self) -> usize {
        self.page.len()
    }

    pub fn is_done(&self) -> bool {
        self.page.done
    }
}
