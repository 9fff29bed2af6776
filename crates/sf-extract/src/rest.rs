//! Backend over the partner SOAP login and the REST API.

use serde_json::Value;
use tracing::{debug, instrument};

use sfx_auth::{SalesforceCredentials, SoapLogin};
use sfx_client::ClientConfig;
use sfx_rest::{SalesforceRestClient, MAX_COLLECTION_WRITE};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::metadata::ObjectDescriptor;
use crate::record::{Record, ResultSet};
use crate::transport::{
    DeletedMarker, Fault, LoginInfo, LoginRequest, ObjectSummary, QueryService, SchemaService,
    SessionTransport, WriteOperation, WriteResult,
};
use crate::window::TimeWindow;

/// Logs in over SOAP, then runs every call through the REST API with the
/// session id as bearer token.
#[derive(Debug)]
pub struct RestBackend {
    http_config: ClientConfig,
    session: Option<Connected>,
}

#[derive(Debug)]
struct Connected {
    login: SoapLogin,
    credentials: SalesforceCredentials,
    client: SalesforceRestClient,
}

impl RestBackend {
    /// A backend using the HTTP settings (timeout, compression, proxy) of
    /// `config`.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        Ok(Self::with_client_config(config.client_config()))
    }

    pub fn with_client_config(http_config: ClientConfig) -> Self {
        Self {
            http_config,
            session: None,
        }
    }

    /// The REST client of the logged-in session.
    pub fn client(&self) -> Option<&SalesforceRestClient> {
        self.session.as_ref().map(|s| &s.client)
    }

    fn connected(&self) -> std::result::Result<&SalesforceRestClient, Fault> {
        self.client()
            .ok_or_else(|| Fault::new(None, "not logged in"))
    }
}

fn rest_fault(err: sfx_rest::Error) -> Fault {
    Fault::new(err.error_code(), err.to_string())
}

fn auth_fault(err: sfx_auth::Error) -> Fault {
    Fault::new(err.login_fault_code(), err.to_string())
}

fn page(result: sfx_rest::QueryResult<Value>) -> ResultSet {
    ResultSet {
        total_size: result.total_size as usize,
        cursor: result.next_records_url,
        done: result.done,
        records: result.records.iter().map(Record::from_json).collect(),
    }
}

/// Object type a write batch is addressed to, taken from the first record.
fn batch_object(records: &[Value]) -> std::result::Result<&str, Fault> {
    records
        .first()
        .and_then(|r| r.pointer("/attributes/type"))
        .and_then(Value::as_str)
        .ok_or_else(|| Fault::new(Some("INVALID_TYPE"), "record without attributes.type"))
}

impl SessionTransport for RestBackend {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn login(&mut self, request: &LoginRequest) -> std::result::Result<LoginInfo, Fault> {
        let login = SoapLogin::new(&request.url, self.http_config.clone())
            .map_err(auth_fault)?
            .with_api_version(&request.api_version);
        let result = login
            .login(&request.username, &request.password)
            .await
            .map_err(auth_fault)?;

        let credentials = SalesforceCredentials::from_login(&result, &request.api_version);
        let client = SalesforceRestClient::from_credentials(&credentials, self.http_config.clone())
            .map_err(rest_fault)?;

        let info = LoginInfo {
            server_url: result.server_url.clone(),
            user_id: result.user_id.clone(),
            user_name: result.user_info.user_name.clone(),
            user_full_name: result.user_info.full_name.clone(),
            user_email: result.user_info.email.clone(),
            user_language: result.user_info.language.clone(),
            organization_name: result.user_info.organization_name.clone(),
        };
        self.session = Some(Connected {
            login,
            credentials,
            client,
        });
        Ok(info)
    }

    /// One collection request per operation; batches over
    /// [`MAX_COLLECTION_WRITE`] are refused before they reach the server.
    #[instrument(skip(self, operation), fields(operation = operation.name(), records = operation.len()))]
    async fn call(&self, operation: WriteOperation) -> std::result::Result<Vec<WriteResult>, Fault> {
        let client = self.connected()?;
        if operation.len() > MAX_COLLECTION_WRITE {
            return Err(Fault::new(
                Some("EXCEEDED_ID_LIMIT"),
                format!(
                    "{} records in one {}, at most {MAX_COLLECTION_WRITE} allowed",
                    operation.len(),
                    operation.name()
                ),
            ));
        }
        let results = match &operation {
            WriteOperation::Insert {
                records,
                all_or_none,
            } => {
                client
                    .create_multiple(batch_object(records)?, records, *all_or_none)
                    .await
            }
            WriteOperation::Update {
                records,
                all_or_none,
            } => {
                client
                    .update_multiple(batch_object(records)?, records, *all_or_none)
                    .await
            }
            WriteOperation::Upsert {
                object,
                key_field,
                records,
                all_or_none,
            } => {
                client
                    .upsert_multiple(object, key_field, records, *all_or_none)
                    .await
            }
            WriteOperation::Delete { ids, all_or_none } => {
                client.delete_multiple(ids, *all_or_none).await
            }
        };
        results.map_err(rest_fault)
    }

    async fn close(&mut self) -> std::result::Result<(), Fault> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        session
            .login
            .logout(&session.credentials)
            .await
            .map_err(auth_fault)
    }
}

impl SchemaService for RestBackend {
    async fn describe_object(&self, name: &str) -> std::result::Result<ObjectDescriptor, Fault> {
        let result = self
            .connected()?
            .describe_sobject(name)
            .await
            .map_err(rest_fault)?;
        Ok(result.into())
    }

    async fn describe_global(&self) -> std::result::Result<Vec<ObjectSummary>, Fault> {
        let result = self.connected()?.describe_global().await.map_err(rest_fault)?;
        Ok(result
            .sobjects
            .into_iter()
            .map(|o| ObjectSummary {
                name: o.name,
                queryable: o.queryable,
            })
            .collect())
    }
}

impl QueryService for RestBackend {
    async fn query(&self, soql: &str) -> std::result::Result<ResultSet, Fault> {
        let result = self.connected()?.query(soql).await.map_err(rest_fault)?;
        Ok(page(result))
    }

    async fn query_all(&self, soql: &str) -> std::result::Result<ResultSet, Fault> {
        let result = self
            .connected()?
            .query_all_including_deleted(soql)
            .await
            .map_err(rest_fault)?;
        Ok(page(result))
    }

    async fn query_more(&self, cursor: &str) -> std::result::Result<ResultSet, Fault> {
        let result = self
            .connected()?
            .query_more(cursor)
            .await
            .map_err(rest_fault)?;
        Ok(page(result))
    }

    async fn get_updated(
        &self,
        object: &str,
        window: &TimeWindow,
    ) -> std::result::Result<Vec<String>, Fault> {
        let result = self
            .connected()?
            .get_updated(object, window.start(), window.end())
            .await
            .map_err(rest_fault)?;
        Ok(result.ids)
    }

    async fn get_deleted(
        &self,
        object: &str,
        window: &TimeWindow,
    ) -> std::result::Result<Vec<DeletedMarker>, Fault> {
        let result = self
            .connected()?
            .get_deleted(object, window.start(), window.end())
            .await
            .map_err(rest_fault)?;
        result
            .deleted_records
            .into_iter()
            .map(|record| -> std::result::Result<DeletedMarker, Fault> {
                let deleted_at = record.deleted_at().ok_or_else(|| {
                    Fault::new(
                        Some("INVALID_DATE"),
                        format!("unparsable deletedDate {} for {}", record.deleted_date, record.id),
                    )
                })?;
                Ok(DeletedMarker {
                    id: record.id,
                    deleted_at,
                })
            })
            .collect()
    }

    async fn retrieve(
        &self,
        object: &str,
        fields: &[String],
        ids: &[String],
    ) -> std::result::Result<Vec<Option<Record>>, Fault> {
        let values = self
            .connected()?
            .retrieve_multiple(object, ids, fields)
            .await
            .map_err(rest_fault)?;
        debug!(requested = ids.len(), returned = values.len(), "Retrieved");
        Ok(values
            .iter()
            .map(|v| v.as_ref().and_then(Record::from_json))
            .collect())
    }
}
