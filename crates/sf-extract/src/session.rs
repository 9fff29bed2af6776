//! Session lifecycle and the operations that run under a session.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::accessor::raw_children;
use crate::config::{SessionConfig, MAX_WRITE_BATCH};
use crate::cursor::{Fetch, FetchRequest};
use crate::error::{Error, ErrorKind, Result};
use crate::metadata::{self, FieldRef};
use crate::payload::Payload;
use crate::transport::{Backend, LoginInfo, LoginRequest, WriteOperation, WriteResult};
use crate::window::FetchMode;

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Created,
    Connected(LoginInfo),
    Closed,
}

/// A logged-in conversation with one org.
///
/// Created empty, populated by [`Session::connect`], invalidated by
/// [`Session::close`]. A closed session cannot be reconnected; build a new
/// one.
///
/// # Example
///
/// ```rust,ignore
/// use sfx_extract::{FetchRequest, Session, SessionConfig};
///
/// let mut session = Session::rest(SessionConfig::from_env()?)?;
/// session.connect().await?;
/// let mut fetch = session.fetch(&FetchRequest::object("Account", ["Id", "Name"])).await?;
/// fetch.for_each(|record, _| println!("{:?}", record.id())).await?;
/// session.close().await?;
/// ```
#[derive(Debug)]
pub struct Session<B> {
    config: SessionConfig,
    backend: B,
    state: State,
}

impl<B: Backend> Session<B> {
    /// Create an unconnected session. Fails on invalid configuration.
    pub fn new(config: SessionConfig, backend: B) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend,
            state: State::Created,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, State::Connected(_))
    }

    /// Login details of the connected session.
    pub fn connection(&self) -> Option<&LoginInfo> {
        match &self.state {
            State::Connected(info) => Some(info),
            _ => None,
        }
    }

    /// Log in. Connecting an already connected session is a no-op.
    ///
    /// Login faults whose code means the credentials were refused or access
    /// is restricted become [`ErrorKind::AccessRestricted`]; every other
    /// failure is a [`ErrorKind::Connection`] error.
    #[instrument(skip(self), fields(url = %self.config.login_url, user = %self.config.username))]
    pub async fn connect(&mut self) -> Result<&LoginInfo> {
        match self.state {
            State::Created => {}
            State::Connected(_) => {
                debug!("Session already connected");
                return self.connected();
            }
            State::Closed => return Err(Error::new(ErrorKind::SessionClosed)),
        }

        let request = LoginRequest {
            url: self.config.login_url.clone(),
            username: self.config.username.clone(),
            password: self.config.password.clone(),
            api_version: self.config.api_version.clone(),
        };
        let info = self.backend.login(&request).await.map_err(|fault| {
            let kind = match fault.code.as_deref() {
                Some(code) if sfx_auth::is_access_restricted(code) => ErrorKind::AccessRestricted {
                    code: code.to_string(),
                    message: fault.message.clone(),
                },
                _ => ErrorKind::Connection(fault.to_string()),
            };
            Error::with_source(kind, fault)
        })?;

        info!(server_url = %info.server_url, "Connected");
        debug!(
            user = ?info.user_name,
            full_name = ?info.user_full_name,
            email = ?info.user_email,
            language = ?info.user_language,
            organization = ?info.organization_name,
            "User info"
        );
        self.state = State::Connected(info);
        self.connected()
    }

    fn connected(&self) -> Result<&LoginInfo> {
        match &self.state {
            State::Connected(info) => Ok(info),
            State::Created => Err(Error::new(ErrorKind::NotConnected)),
            State::Closed => Err(Error::new(ErrorKind::SessionClosed)),
        }
    }

    /// Log out. The session is unusable afterwards, whatever state it was
    /// in and even if the logout call fails. Only a connected session makes
    /// the logout call.
    #[instrument(skip(self))]
    pub async fn close(&mut self) -> Result<()> {
        let was_connected = self.is_connected();
        self.state = State::Closed;
        if !was_connected {
            return Ok(());
        }
        match self.backend.close().await {
            Ok(()) => {
                info!("Session closed");
                Ok(())
            }
            Err(fault) => {
                warn!(error = %fault, "Logout failed");
                Err(Error::with_source(ErrorKind::Close(fault.to_string()), fault))
            }
        }
    }

    /// Start a fetch. See [`Fetch::execute`].
    pub async fn fetch(&self, request: &FetchRequest) -> Result<Fetch<'_, B>> {
        request.validate()?;
        self.connected()?;
        Fetch::execute(
            &self.backend,
            request,
            self.config.query_all,
            self.config.batch_limit,
        )
        .await
    }

    /// Names of the fields of `object`, optionally only the writable ones.
    pub async fn field_names(&self, object: &str, exclude_non_updatable: bool) -> Result<Vec<String>> {
        self.connected()?;
        let descriptor = metadata::describe(&self.backend, object, &FetchMode::All).await?;
        Ok(metadata::names(&descriptor.fields, exclude_non_updatable))
    }

    /// Field names of `object` plus the external-key refs of its reference
    /// fields, for building write payloads.
    pub async fn field_refs(&self, object: &str, exclude_non_updatable: bool) -> Result<Vec<FieldRef>> {
        self.connected()?;
        let descriptor = metadata::describe(&self.backend, object, &FetchMode::All).await?;
        metadata::expand(&self.backend, &descriptor.fields, exclude_non_updatable).await
    }

    /// Objects visible to the user.
    pub async fn list_objects(&self, only_queryable: bool) -> Result<Vec<String>> {
        self.connected()?;
        metadata::list_objects(&self.backend, only_queryable).await
    }

    /// Run `soql` and return the visible field names of its first record;
    /// empty when the query matches nothing.
    #[instrument(skip(self))]
    pub async fn query_field_names(&self, soql: &str) -> Result<Vec<String>> {
        self.connected()?;
        let page = self
            .backend
            .query(soql)
            .await
            .map_err(|fault| Error::query("query failed", fault))?;
        Ok(page
            .records
            .iter()
            .flatten()
            .next()
            .map(|record| {
                raw_children(record)
                    .into_iter()
                    .map(|f| f.name().to_string())
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Create records. Results come back in payload order.
    ///
    /// Every write takes at most [`MAX_WRITE_BATCH`] payloads or ids.
    pub async fn insert(&self, payloads: &[Payload]) -> Result<Vec<WriteResult>> {
        self.write(WriteOperation::Insert {
            records: to_records(payloads),
            all_or_none: self.config.rollback_all_changes_on_error,
        })
        .await
    }

    /// Update records; every payload needs an `Id`.
    pub async fn update(&self, payloads: &[Payload]) -> Result<Vec<WriteResult>> {
        if let Some(p) = payloads.iter().find(|p| p.id().is_none()) {
            return Err(Error::config(format!("{} payload without Id", p.object())));
        }
        self.write(WriteOperation::Update {
            records: to_records(payloads),
            all_or_none: self.config.rollback_all_changes_on_error,
        })
        .await
    }

    /// Insert or update records matched on the external id `key_field`.
    /// All payloads must be of the same object.
    pub async fn upsert(&self, key_field: &str, payloads: &[Payload]) -> Result<Vec<WriteResult>> {
        let Some(first) = payloads.first() else {
            return Ok(Vec::new());
        };
        if let Some(other) = payloads.iter().find(|p| p.object() != first.object()) {
            return Err(Error::config(format!(
                "upsert mixes {} and {} payloads",
                first.object(),
                other.object()
            )));
        }
        self.write(WriteOperation::Upsert {
            object: first.object().to_string(),
            key_field: key_field.to_string(),
            records: to_records(payloads),
            all_or_none: self.config.rollback_all_changes_on_error,
        })
        .await
    }

    /// Delete records by id.
    pub async fn delete(&self, ids: &[String]) -> Result<Vec<WriteResult>> {
        self.write(WriteOperation::Delete {
            ids: ids.to_vec(),
            all_or_none: self.config.rollback_all_changes_on_error,
        })
        .await
    }

    #[instrument(skip(self, operation), fields(operation = operation.name(), records = operation.len()))]
    async fn write(&self, operation: WriteOperation) -> Result<Vec<WriteResult>> {
        self.connected()?;
        if operation.is_empty() {
            return Ok(Vec::new());
        }
        if operation.len() > MAX_WRITE_BATCH {
            return Err(Error::config(format!(
                "{} of {} records exceeds the limit of {MAX_WRITE_BATCH} per call",
                operation.name(),
                operation.len()
            )));
        }
        let name = operation.name();
        let results = self.backend.call(operation).await.map_err(|fault| {
            Error::with_source(
                ErrorKind::Write {
                    operation: name,
                    message: fault.to_string(),
                },
                fault,
            )
        })?;
        let failed = results.iter().filter(|r| !r.success).count();
        debug!(succeeded = results.len() - failed, failed, "Write applied");
        Ok(results)
    }
}

impl Session<crate::rest::RestBackend> {
    /// A session over the REST and SOAP APIs.
    pub fn rest(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let backend = crate::rest::RestBackend::new(&config)?;
        Self::new(config, backend)
    }
}

fn to_records(payloads: &[Payload]) -> Vec<Value> {
    payloads.iter().map(Payload::to_json).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FieldDescriptor, ObjectDescriptor};
    use crate::mock::{Call, MockBackend};
    use crate::record::{Record, ResultSet};
    use crate::transport::Fault;
    use crate::window::TimeWindow;
    use chrono::{Duration, Utc};

    fn config() -> SessionConfig {
        SessionConfig::new("https://login.salesforce.com", "user@example.com", "secret")
    }

    fn account() -> ObjectDescriptor {
        ObjectDescriptor {
            name: "Account".into(),
            queryable: true,
            replicateable: true,
            fields: vec![
                FieldDescriptor::identifier("Id"),
                FieldDescriptor::scalar("Name"),
                FieldDescriptor::scalar("Ext_Id__c").with_id_lookup(true),
                FieldDescriptor::scalar("Total__c").with_calculated(true),
            ],
        }
    }

    async fn connected(backend: MockBackend) -> Session<MockBackend> {
        let mut session = Session::new(config(), backend).unwrap();
        session.connect().await.unwrap();
        session
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let mut bad = config();
        bad.login_url.clear();
        let err = Session::new(bad, MockBackend::new()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_connect_and_close() {
        let mut session = Session::new(config(), MockBackend::new()).unwrap();
        assert!(!session.is_connected());

        let info = session.connect().await.unwrap();
        assert_eq!(info.organization_name.as_deref(), Some("Test Org"));
        assert!(session.is_connected());

        session.connect().await.unwrap();
        session.close().await.unwrap();
        assert!(!session.is_connected());
        assert_eq!(
            session.backend().calls(),
            [Call::Login("user@example.com".into()), Call::Close]
        );

        assert!(matches!(
            session.connect().await.unwrap_err().kind,
            ErrorKind::SessionClosed
        ));
        assert!(matches!(
            session.list_objects(false).await.unwrap_err().kind,
            ErrorKind::SessionClosed
        ));
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_before_connect_invalidates_session() {
        let mut session = Session::new(config(), MockBackend::new()).unwrap();
        session.close().await.unwrap();

        assert!(matches!(
            session.connect().await.unwrap_err().kind,
            ErrorKind::SessionClosed
        ));
        assert!(session.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_login_fault_classification() {
        let backend = MockBackend::new().failing(
            "login",
            Fault::new(Some("INVALID_LOGIN"), "Invalid username, password, security token"),
        );
        let mut session = Session::new(config(), backend).unwrap();
        let err = session.connect().await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::AccessRestricted { .. }));
        assert_eq!(err.fault_code(), Some("INVALID_LOGIN"));
        assert!(!session.is_connected());

        let backend = MockBackend::new().failing("login", Fault::new(None, "connection refused"));
        let mut session = Session::new(config(), backend).unwrap();
        let err = session.connect().await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Connection(_)));
    }

    #[tokio::test]
    async fn test_close_failure_still_closes() {
        let backend = MockBackend::new().failing("close", Fault::new(None, "socket closed"));
        let mut session = connected(backend).await;
        let err = session.close().await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Close(_)));
        assert!(matches!(
            session.connect().await.unwrap_err().kind,
            ErrorKind::SessionClosed
        ));
    }

    #[tokio::test]
    async fn test_operations_need_connection() {
        let session = Session::new(config(), MockBackend::new()).unwrap();
        let err = session
            .fetch(&FetchRequest::object("Account", ["Id"]))
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NotConnected));
        assert!(session.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_bad_window_rejected_before_any_call() {
        let end = Utc::now();
        for start in [end, end + Duration::hours(1), end - Duration::days(31)] {
            let backend = MockBackend::new().with_object(account());
            let session = connected(backend).await;
            let result = TimeWindow::new(start, end).and_then(|window| {
                Ok(FetchRequest::object("Account", ["Id"]).with_mode(FetchMode::DeletedSince(window)))
            });
            assert!(result.unwrap_err().is_configuration());
            assert_eq!(session.backend().calls().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_fetch_uses_session_settings() {
        let backend = MockBackend::new()
            .with_object(account())
            .with_page("SELECT Id FROM Account", ResultSet::empty());
        let mut session = Session::new(config().with_query_all(true), backend).unwrap();
        session.connect().await.unwrap();

        let fetch = session
            .fetch(&FetchRequest::object("Account", ["Id"]))
            .await
            .unwrap();
        assert!(fetch.is_done());
        assert!(session
            .backend()
            .calls()
            .contains(&Call::QueryAll("SELECT Id FROM Account".into())));
    }

    #[tokio::test]
    async fn test_field_listing() {
        let session = connected(MockBackend::new().with_object(account())).await;
        assert_eq!(
            session.field_names("Account", true).await.unwrap(),
            ["Id", "Name", "Ext_Id__c"]
        );
        assert_eq!(session.field_names("Account", false).await.unwrap().len(), 4);
        assert_eq!(session.field_refs("Account", true).await.unwrap().len(), 3);
        assert_eq!(session.list_objects(true).await.unwrap(), ["Account"]);
    }

    #[tokio::test]
    async fn test_query_field_names() {
        let page = ResultSet::complete(vec![
            None,
            Some(
                Record::new("Account")
                    .with_field("Id", "001000000000001AAA")
                    .with_field("Name", "Acme"),
            ),
        ]);
        let backend = MockBackend::new()
            .with_page("SELECT Id, Name FROM Account", page)
            .with_page("SELECT Id FROM Lead", ResultSet::empty());
        let session = connected(backend).await;

        assert_eq!(
            session
                .query_field_names("SELECT Id, Name FROM Account")
                .await
                .unwrap(),
            ["Id", "Name"]
        );
        assert!(session
            .query_field_names("SELECT Id FROM Lead")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_writes_pass_through() {
        let session = connected(MockBackend::new()).await;
        let payloads = vec![
            Payload::new("Account").set_field("Name", "Acme"),
            Payload::new("Account").set_field("Name", "Globex"),
        ];

        let results = session.insert(&payloads).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.success));

        session.upsert("Ext_Id__c", &payloads).await.unwrap();
        session
            .delete(&["001000000000001AAA".to_string()])
            .await
            .unwrap();

        let writes: Vec<WriteOperation> = session
            .backend()
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Write(op) => Some(op),
                _ => None,
            })
            .collect();
        assert_eq!(
            writes[0],
            WriteOperation::Insert {
                records: to_records(&payloads),
                all_or_none: false
            }
        );
        assert!(matches!(&writes[1], WriteOperation::Upsert { object, key_field, .. }
            if object == "Account" && key_field == "Ext_Id__c"));
        assert_eq!(writes[2].name(), "delete");
    }

    #[tokio::test]
    async fn test_write_rules() {
        let mut session = Session::new(config().with_rollback_on_error(true), MockBackend::new()).unwrap();
        session.connect().await.unwrap();

        assert!(session.insert(&[]).await.unwrap().is_empty());
        let err = session
            .update(&[Payload::new("Account").set_field("Name", "x")])
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        let err = session
            .upsert(
                "Ext_Id__c",
                &[Payload::new("Account"), Payload::new("Contact")],
            )
            .await
            .unwrap_err();
        assert!(err.is_configuration());

        session
            .update(&[Payload::new("Account").with_id("001000000000001AAA")])
            .await
            .unwrap();
        let calls = session.backend().calls();
        assert!(matches!(
            calls.last(),
            Some(Call::Write(WriteOperation::Update { all_or_none: true, .. }))
        ));
        assert_eq!(calls.len(), 2);
    }

    #[tokio::test]
    async fn test_write_failure() {
        let backend = MockBackend::new().failing("call", Fault::new(Some("REQUEST_LIMIT_EXCEEDED"), "limit"));
        let session = connected(backend).await;
        let err = session
            .delete(&["001000000000001AAA".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Write { operation: "delete", .. }));
        assert_eq!(err.fault_code(), Some("REQUEST_LIMIT_EXCEEDED"));
    }

    #[tokio::test]
    async fn test_oversized_write_is_refused_before_any_call() {
        let session = connected(MockBackend::new()).await;
        let payloads: Vec<Payload> = (0..MAX_WRITE_BATCH + 50)
            .map(|n| Payload::new("Account").set_field("Name", format!("Account {n}")))
            .collect();
        let err = session.insert(&payloads).await.unwrap_err();
        assert!(err.is_configuration());

        let ids: Vec<String> = (0..=MAX_WRITE_BATCH).map(|n| format!("001{n:015}")).collect();
        assert!(session.delete(&ids).await.unwrap_err().is_configuration());

        let results = session.delete(&ids[..MAX_WRITE_BATCH]).await.unwrap();
        assert_eq!(results.len(), MAX_WRITE_BATCH);
        let writes = session
            .backend()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Write(_)))
            .count();
        assert_eq!(writes, 1);
    }
}
