//! Session lifecycle, metadata and writes through the REST backend.

use super::common::{
    account_describe, config, connected, id, mount_describe, mount_login, mount_logout, SESSION_ID,
};
use serde_json::json;
use sfx_extract::{ErrorKind, ExternalKeyRef, FieldRef, Payload, Session};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_describe() -> serde_json::Value {
    json!({
        "name": "User",
        "queryable": true,
        "replicateable": true,
        "fields": [
            {"name": "Id", "type": "id", "idLookup": true},
            {"name": "Username", "type": "string", "idLookup": true, "updateable": true},
            {"name": "Alias", "type": "string", "updateable": true}
        ]
    })
}

#[tokio::test]
async fn test_refused_login_is_access_restricted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/Soap/u/62.0"))
        .and(header("SOAPAction", "\"login\""))
        .respond_with(ResponseTemplate::new(500).set_body_string(
            "<soapenv:Envelope><soapenv:Body><soapenv:Fault><faultcode>sf:INVALID_LOGIN</faultcode><faultstring>INVALID_LOGIN: Invalid username, password, security token; or user locked out.</faultstring></soapenv:Fault></soapenv:Body></soapenv:Envelope>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = Session::rest(config(&server)).unwrap();
    let err = session.connect().await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AccessRestricted { .. }));
    assert_eq!(err.fault_code(), Some("INVALID_LOGIN"));
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_connect_reports_user_and_close_logs_out_once() {
    let server = MockServer::start().await;
    let mut session = connected(&server).await;
    mount_logout(&server).await;

    let info = session.connection().unwrap();
    assert_eq!(info.user_name.as_deref(), Some("ann@example.com"));
    assert_eq!(info.organization_name.as_deref(), Some("Acme"));

    session.close().await.unwrap();
    session.close().await.unwrap();
    assert!(matches!(
        session.connect().await.unwrap_err().kind,
        ErrorKind::SessionClosed
    ));
}

#[tokio::test]
async fn test_failed_logout_is_close_error() {
    let server = MockServer::start().await;
    let mut session = connected(&server).await;
    Mock::given(method("POST"))
        .and(path("/services/Soap/u/62.0"))
        .and(header("SOAPAction", "\"logout\""))
        .respond_with(ResponseTemplate::new(500).set_body_string(
            "<soapenv:Envelope><soapenv:Body><soapenv:Fault><faultcode>sf:INVALID_SESSION_ID</faultcode><faultstring>INVALID_SESSION_ID: Invalid Session ID</faultstring></soapenv:Fault></soapenv:Body></soapenv:Envelope>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let err = session.close().await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Close(_)));
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_field_refs_include_external_keys_of_targets() {
    let server = MockServer::start().await;
    let session = connected(&server).await;
    mount_describe(&server, "Account", account_describe()).await;
    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/sobjects/User/describe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_describe()))
        .expect(1)
        .mount(&server)
        .await;

    let refs = session.field_refs("Account", true).await.unwrap();
    let rendered: Vec<String> = refs.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        ["Id", "Name", "Industry", "Phone", "Website", "Ext_Id__c", "OwnerId", "User:Username/Owner"]
    );

    let names = session.field_names("Account", false).await.unwrap();
    assert_eq!(names.len(), 7);
}

#[tokio::test]
async fn test_list_objects_filters_queryable() {
    let server = MockServer::start().await;
    let session = connected(&server).await;
    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/sobjects"))
        .and(header("Authorization", format!("Bearer {SESSION_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "encoding": "UTF-8",
            "maxBatchSize": 200,
            "sobjects": [
                {"name": "Account", "queryable": true, "replicateable": true},
                {"name": "AccountHistory", "queryable": false},
                {"name": "Contact", "queryable": true}
            ]
        })))
        .mount(&server)
        .await;

    assert_eq!(session.list_objects(true).await.unwrap(), ["Account", "Contact"]);
    assert_eq!(session.list_objects(false).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_insert_resolves_owner_by_external_key() {
    let server = MockServer::start().await;
    let session = connected(&server).await;
    Mock::given(method("POST"))
        .and(path("/services/data/v62.0/composite/sobjects"))
        .and(body_json(json!({
            "allOrNone": false,
            "records": [{
                "attributes": {"type": "Account"},
                "Name": "Acme",
                "Owner": {"attributes": {"type": "User"}, "Username": "ann@example.com"}
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": id(7), "success": true, "errors": [], "created": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let owner: ExternalKeyRef = "User:Username/Owner".parse().unwrap();
    let payload = Payload::new("Account")
        .set_field("Name", "Acme")
        .set(FieldRef::from(owner), "ann@example.com");
    let results = session.insert(&[payload]).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id.as_deref(), Some(id(7).as_str()));
}

#[tokio::test]
async fn test_delete_passes_rollback_flag() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let mut session = Session::rest(config(&server).with_rollback_on_error(true)).unwrap();
    session.connect().await.unwrap();
    Mock::given(method("DELETE"))
        .and(path("/services/data/v62.0/composite/sobjects"))
        .and(query_param("ids", format!("{},{}", id(1), id(2))))
        .and(query_param("allOrNone", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": id(1), "success": true, "errors": []},
            {"id": id(2), "success": false, "errors": [
                {"statusCode": "ENTITY_IS_DELETED", "message": "entity is deleted"}
            ]}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let results = session.delete(&[id(1), id(2)]).await.unwrap();
    assert!(results[0].success);
    assert_eq!(results[1].errors[0].status_code, "ENTITY_IS_DELETED");

    assert!(session.delete(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_write_fault_is_write_error() {
    let server = MockServer::start().await;
    let session = connected(&server).await;
    Mock::given(method("POST"))
        .and(path("/services/data/v62.0/composite/sobjects"))
        .and(body_string_contains("\"Name\":\"Acme\""))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([{
            "errorCode": "INVALID_FIELD",
            "message": "No such column 'Bogus__c' on entity 'Account'"
        }])))
        .mount(&server)
        .await;

    let payload = Payload::new("Account")
        .set_field("Name", "Acme")
        .set_field("Bogus__c", 1);
    let err = session.insert(&[payload]).await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Write { operation: "insert", .. }));
    assert_eq!(err.fault_code(), Some("INVALID_FIELD"));
}

#[tokio::test]
async fn test_insert_over_collection_limit_sends_nothing() {
    let server = MockServer::start().await;
    let session = connected(&server).await;
    Mock::given(method("POST"))
        .and(path("/services/data/v62.0/composite/sobjects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let payloads: Vec<Payload> = (0..250)
        .map(|n| Payload::new("Account").set_field("Name", format!("Account {n}")))
        .collect();
    let err = session.insert(&payloads).await.unwrap_err();
    assert!(err.is_configuration());
}
