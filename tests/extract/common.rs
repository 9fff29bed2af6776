use serde_json::{json, Value};
use sfx_extract::{RestBackend, Session, SessionConfig};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const SESSION_ID: &str = "00Dxx0000001gEF!AQ0AQsession";

/// Id of the `n`th test record.
pub fn id(n: usize) -> String {
    format!("001{n:015}")
}

pub fn config(server: &MockServer) -> SessionConfig {
    SessionConfig::new(server.uri(), "ann@example.com", "password")
}

fn login_response(server: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="urn:partner.soap.sforce.com">
<soapenv:Body><loginResponse><result>
<passwordExpired>false</passwordExpired>
<serverUrl>{server}/services/Soap/u/62.0/00Dxx0000001gEF</serverUrl>
<sessionId>{SESSION_ID}</sessionId>
<userId>005xx000001Sv6AAAS</userId>
<userInfo>
<organizationName>Acme</organizationName>
<userEmail>ann@example.com</userEmail>
<userFullName>Ann Smith</userFullName>
<userLanguage>en_US</userLanguage>
<userName>ann@example.com</userName>
</userInfo>
</result></loginResponse></soapenv:Body></soapenv:Envelope>"#
    )
}

/// Mount a successful SOAP login.
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/services/Soap/u/62.0"))
        .and(header("SOAPAction", "\"login\""))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_response(&server.uri())))
        .mount(server)
        .await;
}

/// Mount a SOAP logout expected exactly once.
pub async fn mount_logout(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/services/Soap/u/62.0"))
        .and(header("SOAPAction", "\"logout\""))
        .and(body_string_contains(SESSION_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string("<logoutResponse/>"))
        .expect(1)
        .mount(server)
        .await;
}

pub fn account_describe() -> Value {
    json!({
        "name": "Account",
        "label": "Account",
        "queryable": true,
        "retrieveable": true,
        "replicateable": true,
        "fields": [
            {"name": "Id", "type": "id", "idLookup": true},
            {"name": "Name", "type": "string", "updateable": true, "createable": true},
            {"name": "Industry", "type": "picklist", "updateable": true},
            {"name": "Phone", "type": "phone", "updateable": true},
            {"name": "Website", "type": "url", "updateable": true},
            {"name": "Ext_Id__c", "type": "string", "updateable": true, "externalId": true, "idLookup": true},
            {"name": "OwnerId", "type": "reference", "updateable": true,
             "referenceTo": ["User"], "relationshipName": "Owner"}
        ]
    })
}

pub async fn mount_describe(server: &MockServer, object: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/services/data/v62.0/sobjects/{object}/describe")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// A record the way REST returns it.
pub fn account(n: usize) -> Value {
    json!({
        "attributes": {"type": "Account", "url": format!("/services/data/v62.0/sobjects/Account/{}", id(n))},
        "Id": id(n),
        "Name": format!("Account {n}"),
        "Industry": "Energy",
        "Phone": "555-0100",
        "Website": "example.com",
        "Owner": {"attributes": {"type": "User"}, "Alias": format!("u{n}")}
    })
}

/// Answers a collection retrieve with one record per requested id, in
/// request order.
pub struct EchoRetrieve;

impl Respond for EchoRetrieve {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let records: Vec<Value> = body["ids"]
            .as_array()
            .map(|ids| {
                ids.iter()
                    .map(|id| json!({"attributes": {"type": "Account"}, "Id": id, "Name": "x"}))
                    .collect()
            })
            .unwrap_or_default();
        ResponseTemplate::new(200).set_body_json(records)
    }
}

/// A connected REST session against `server` (login already mounted).
pub async fn connected(server: &MockServer) -> Session<RestBackend> {
    mount_login(server).await;
    let mut session = Session::rest(config(server)).expect("valid config");
    session.connect().await.expect("login should succeed");
    session
}
