//! Paginated extraction against a mock tests endpoint.

use pretty_assertions::assert_eq;
use serde_json::json;
use vald_api::{Termination, ValdClient};
use vald_config::ApiConfig;
use vald_core::{Cell, Device, Watermark};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TENANT: &str = "tenant-1";
const TOKEN: &str = "T";
const NORDBORD: &str = "/nordbord/tests/v2";

fn client_for(server: &MockServer) -> ValdClient {
    ValdClient::new(&ApiConfig::default().with_base_url(&server.uri()))
}

fn page(records: &serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(records)
}

async fn mount_page(server: &MockServer, since: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(NORDBORD))
        .and(query_param("tenantId", TENANT))
        .and(query_param("modifiedFromUtc", since))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn requested_watermarks(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "modifiedFromUtc")
                .map(|(_, v)| v.into_owned())
        })
        .collect()
}

#[tokio::test]
async fn two_records_then_no_content() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "2023-01-01T00:00:00.000Z",
        page(&json!([
            {"testId": "a", "profileId": "P1", "modifiedDateUtc": "2024-01-01T00:00:00Z"},
            {"testId": "b", "profileId": "P2", "modifiedDateUtc": "2024-01-02T00:00:00Z"}
        ])),
    )
    .await;
    mount_page(&server, "2024-01-02T00:00:00Z", ResponseTemplate::new(204)).await;

    let run = client_for(&server)
        .extract_tests(
            TOKEN,
            TENANT,
            Device::NordBord,
            &Watermark::from("2023-01-01T00:00:00.000Z"),
            None,
        )
        .await;

    assert_eq!(run.termination, Termination::NoContent);
    assert_eq!(run.pages, 2);
    assert_eq!(run.table.len(), 2);
    assert_eq!(run.stalls, 0);
    assert_eq!(
        requested_watermarks(&server).await,
        ["2023-01-01T00:00:00.000Z", "2024-01-02T00:00:00Z"]
    );
}

#[tokio::test]
async fn record_at_request_watermark_bumps_one_millisecond() {
    let server = MockServer::start().await;
    let start = "2024-03-01T10:00:00.000Z";
    mount_page(
        &server,
        start,
        page(&json!([{"testId": "a", "modifiedDateUtc": start}])),
    )
    .await;
    mount_page(&server, "2024-03-01T10:00:00.001Z", ResponseTemplate::new(204)).await;

    let run = client_for(&server)
        .extract_tests(TOKEN, TENANT, Device::NordBord, &Watermark::from(start), None)
        .await;

    assert_eq!(run.termination, Termination::NoContent);
    assert_eq!(run.stalls, 1);
    assert_eq!(run.watermark.as_str(), "2024-03-01T10:00:00.001Z");
    assert_eq!(
        requested_watermarks(&server).await,
        [start, "2024-03-01T10:00:00.001Z"]
    );
}

#[tokio::test]
async fn repeated_cursor_on_consecutive_pages_is_bumped() {
    let server = MockServer::start().await;
    let same = json!([{"testId": "a", "modifiedDateUtc": "2024-02-01T00:00:00.000Z"}]);
    mount_page(&server, "2024-01-01T00:00:00.000Z", page(&same)).await;
    mount_page(&server, "2024-02-01T00:00:00.000Z", page(&same)).await;
    mount_page(&server, "2024-02-01T00:00:00.001Z", page(&json!([]))).await;

    let run = client_for(&server)
        .extract_tests(
            TOKEN,
            TENANT,
            Device::NordBord,
            &Watermark::from("2024-01-01T00:00:00.000Z"),
            None,
        )
        .await;

    assert_eq!(run.termination, Termination::Exhausted);
    assert_eq!(run.pages, 3);
    assert_eq!(run.table.len(), 2);

    let seen = requested_watermarks(&server).await;
    let second = Watermark::new(seen[1].clone()).instant().unwrap();
    let third = Watermark::new(seen[2].clone()).instant().unwrap();
    assert!(third - second >= chrono::Duration::milliseconds(1));
}

#[tokio::test]
async fn missing_timestamp_field_stops_after_that_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(NORDBORD))
        .respond_with(page(&json!({"items": [{"testId": "a"}, {"testId": "b"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let run = client_for(&server)
        .extract_tests(
            TOKEN,
            TENANT,
            Device::NordBord,
            &Watermark::from("2024-01-01T00:00:00.000Z"),
            None,
        )
        .await;

    assert_eq!(run.termination, Termination::NoTimestampField);
    assert_eq!(run.pages, 1);
    assert_eq!(run.table.len(), 2);
}

#[tokio::test]
async fn server_error_keeps_pages_already_fetched() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "2024-01-01T00:00:00.000Z",
        page(&json!({"tests": [{"testId": "a", "modifiedDateUtc": "2024-01-05T00:00:00Z"}]})),
    )
    .await;
    mount_page(
        &server,
        "2024-01-05T00:00:00Z",
        ResponseTemplate::new(500).set_body_string("boom"),
    )
    .await;

    let run = client_for(&server)
        .extract_tests(
            TOKEN,
            TENANT,
            Device::NordBord,
            &Watermark::from("2024-01-01T00:00:00.000Z"),
            None,
        )
        .await;

    assert_eq!(
        run.termination,
        Termination::HttpStatus {
            status: 500,
            body: "boom".into()
        }
    );
    assert!(!run.termination.is_normal());
    assert_eq!(run.table.len(), 1);
}

#[tokio::test]
async fn malformed_body_is_abnormal_stop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .expect(1)
        .mount(&server)
        .await;

    let run = client_for(&server)
        .extract_tests(
            TOKEN,
            TENANT,
            Device::NordBord,
            &Watermark::from("2024-01-01T00:00:00.000Z"),
            None,
        )
        .await;

    assert!(matches!(run.termination, Termination::Malformed(_)));
    assert!(run.table.is_empty());
}

#[tokio::test]
async fn halts_at_page_ceiling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(NORDBORD))
        .respond_with(page(&json!([{"testId": "a", "modifiedDateUtc": "2024-01-01T00:00:00Z"}])))
        .expect(1000)
        .mount(&server)
        .await;

    let run = client_for(&server)
        .extract_tests(
            TOKEN,
            TENANT,
            Device::NordBord,
            &Watermark::from("2024-01-01T00:00:00.000Z"),
            None,
        )
        .await;

    assert_eq!(run.termination, Termination::PageLimit);
    assert_eq!(run.pages, 1000);
    assert_eq!(run.table.len(), 1000);
}

#[tokio::test]
async fn configured_ceiling_is_honored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(&json!([{"modifiedDateUtc": "2024-01-01T00:00:00Z"}])))
        .expect(3)
        .mount(&server)
        .await;

    let run = client_for(&server)
        .with_max_pages(3)
        .extract_tests(
            TOKEN,
            TENANT,
            Device::NordBord,
            &Watermark::from("2024-01-01T00:00:00.000Z"),
            None,
        )
        .await;

    assert_eq!(run.termination, Termination::PageLimit);
    assert_eq!(run.pages, 3);
}

#[tokio::test]
async fn sends_bearer_token_and_profile_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forcedecks/tests"))
        .and(header("authorization", "Bearer T"))
        .and(query_param("profileId", "P1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let run = client_for(&server)
        .extract_tests(
            TOKEN,
            TENANT,
            Device::ForceDecks,
            &Watermark::from("2024-01-01T00:00:00.000Z"),
            Some("P1"),
        )
        .await;

    assert_eq!(run.termination, Termination::NoContent);
    assert!(run.table.is_empty());
}

#[tokio::test]
async fn rows_carry_tenant_and_parsed_dates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forceframe/tests/v2"))
        .and(query_param_is_missing("profileId"))
        .respond_with(page(&json!([{
            "testId": "a",
            "testDateUtc": "2024-06-01T09:00:00Z",
            "device": {"serial": "FF-1"}
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let run = client_for(&server)
        .extract_tests(
            TOKEN,
            TENANT,
            Device::ForceFrame,
            &Watermark::from("2024-01-01T00:00:00.000Z"),
            None,
        )
        .await;

    assert_eq!(run.termination, Termination::NoTimestampField);
    let row = run.table.row(0).unwrap();
    assert_eq!(row.text("tenant_id").as_deref(), Some(TENANT));
    assert_eq!(row.text("device.serial").as_deref(), Some("FF-1"));
    assert!(matches!(row.get("testDateUtc"), Some(Cell::Timestamp(_))));
}
