//! Fetch modes through the REST backend.

use super::common::{account, account_describe, connected, id, mount_describe, EchoRetrieve};
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use sfx_extract::{value_at, ErrorKind, FetchMode, FetchRequest, TimeWindow};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn window() -> TimeWindow {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    TimeWindow::new(start, start + Duration::days(7)).unwrap()
}

const SOQL: &str = "SELECT Id, Name, Owner.Alias FROM Account";

#[tokio::test]
async fn test_plain_fetch_follows_cursor() {
    let server = MockServer::start().await;
    let session = connected(&server).await;
    mount_describe(&server, "Account", account_describe()).await;

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/query"))
        .and(query_param("q", SOQL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 3,
            "done": false,
            "nextRecordsUrl": "/services/data/v62.0/query/01gxx-2",
            "records": [account(0), account(1)]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/query/01gxx-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 3,
            "done": true,
            "records": [account(2)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = FetchRequest::object("Account", ["Id", "Name", "Owner.Alias"]);
    let mut fetch = session.fetch(&request).await.unwrap();
    assert_eq!(fetch.total_size(), 3);
    assert_eq!(fetch.records_count(), 2);

    let mut aliases = Vec::new();
    let emitted = fetch
        .for_each(|record, deleted_at| {
            assert!(deleted_at.is_none());
            aliases.push(value_at(record, "Owner.Alias").unwrap_or_default());
        })
        .await
        .unwrap();
    assert_eq!(emitted, 3);
    assert_eq!(aliases, ["u0", "u1", "u2"]);
    assert!(fetch.is_done());
    assert!(matches!(fetch.advance().await.unwrap_err().kind, ErrorKind::NotDone));
}

#[tokio::test]
async fn test_updated_since_retrieves_in_three_batches() {
    let server = MockServer::start().await;
    let session = connected(&server).await;
    mount_describe(&server, "Account", account_describe()).await;

    let ids: Vec<String> = (0..4500).map(id).collect();
    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/sobjects/Account/updated/"))
        .and(query_param("start", "2024-01-01T00:00:00Z"))
        .and(query_param("end", "2024-01-08T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ids": ids,
            "latestDateCovered": "2024-01-08T00:00:00.000+0000"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/services/data/v62.0/composite/sobjects/Account"))
        .and(body_partial_json(json!({"fields": ["Id", "Name"]})))
        .respond_with(EchoRetrieve)
        .expect(3)
        .mount(&server)
        .await;

    let request =
        FetchRequest::object("Account", ["Id", "Name"]).with_mode(FetchMode::UpdatedSince(window()));
    let fetch = session.fetch(&request).await.unwrap();

    assert!(fetch.is_done());
    assert_eq!(fetch.records_count(), 4500);
    let returned: Vec<&str> = fetch
        .page()
        .records
        .iter()
        .filter_map(|r| r.as_ref().and_then(|r| r.id()))
        .collect();
    assert_eq!(returned, ids);

    let sizes: Vec<usize> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().ends_with("/composite/sobjects/Account"))
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["ids"].as_array().unwrap().len()
        })
        .collect();
    assert_eq!(sizes, [2000, 2000, 500]);
}

#[tokio::test]
async fn test_deleted_since_without_markers_skips_query_all() {
    let server = MockServer::start().await;
    let session = connected(&server).await;
    mount_describe(&server, "Account", account_describe()).await;

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/sobjects/Account/deleted/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deletedRecords": [],
            "earliestDateAvailable": "2023-12-01T00:00:00.000+0000",
            "latestDateCovered": "2024-01-08T00:00:00.000+0000"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/queryAll"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let request =
        FetchRequest::object("Account", ["Id", "Name"]).with_mode(FetchMode::DeletedSince(window()));
    let fetch = session.fetch(&request).await.unwrap();
    assert!(fetch.is_done());
    assert_eq!(fetch.records_count(), 0);
}

#[tokio::test]
async fn test_deleted_since_pairs_markers_by_id() {
    let server = MockServer::start().await;
    let session = connected(&server).await;
    mount_describe(&server, "Account", account_describe()).await;

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/sobjects/Account/deleted/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deletedRecords": [
                {"id": id(3), "deletedDate": "2024-01-05T08:00:00.000+0000"},
                {"id": id(1), "deletedDate": "2024-01-02T09:30:00.000+0000"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/queryAll"))
        .and(query_param("q", "SELECT Id, Name FROM Account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 5,
            "done": true,
            "records": (0..5).map(|n| json!({
                "attributes": {"type": "Account"},
                "Id": id(n),
                "Name": format!("Account {n}")
            })).collect::<Vec<_>>()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request =
        FetchRequest::object("Account", ["Id", "Name"]).with_mode(FetchMode::DeletedSince(window()));
    let mut fetch = session.fetch(&request).await.unwrap();

    let mut emitted = Vec::new();
    fetch
        .for_each(|record, deleted_at| {
            emitted.push((record.id().unwrap_or_default().to_string(), deleted_at));
        })
        .await
        .unwrap();

    assert_eq!(
        emitted,
        [
            (id(1), Some(Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap())),
            (id(3), Some(Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap())),
        ]
    );
}

#[tokio::test]
async fn test_not_replicable_object_fails_before_replication_call() {
    let server = MockServer::start().await;
    let session = connected(&server).await;
    let mut describe = account_describe();
    describe["replicateable"] = json!(false);
    mount_describe(&server, "Account", describe).await;

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/sobjects/Account/updated/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let request =
        FetchRequest::object("Account", ["Id"]).with_mode(FetchMode::UpdatedSince(window()));
    let err = session.fetch(&request).await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ObjectNotReplicable(_)));
}

#[tokio::test]
async fn test_query_failure_surfaces_as_query_error() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/query"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([{
            "errorCode": "MALFORMED_QUERY",
            "message": "unexpected token: FORM"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let err = session
        .fetch(&FetchRequest::query("SELECT Id FORM Account"))
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Query(_)));
    assert_eq!(err.fault_code(), Some("MALFORMED_QUERY"));
}

#[test]
fn test_window_longer_than_thirty_days_is_rejected() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let err = TimeWindow::new(start, start + Duration::days(31)).unwrap_err();
    assert!(err.is_configuration());
}
