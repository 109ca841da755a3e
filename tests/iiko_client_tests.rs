use std::sync::Arc;

use cashflow_report_bot::cashflow::{ACCOUNT_FINANCIAL, ACCOUNT_OPERATIONAL};
use cashflow_report_bot::config::IikoConfig;
use cashflow_report_bot::iiko::{IikoClient, IikoError};
use cashflow_report_bot::reports::{IikoSource, ReportRequest, ReportService};
use chrono::NaiveDate;
use httpmock::prelude::*;
use tempfile::TempDir;

const PRESET: &str = "5f1c2b9e-preset";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn config(server: &MockServer) -> IikoConfig {
    IikoConfig::new(&server.base_url(), "admin".to_owned(), "secret".to_owned())
}

fn auth_mock(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/0/auth/access_token")
            .x_www_form_urlencoded_tuple("user_id", "admin")
            .x_www_form_urlencoded_tuple("user_secret", "secret");
        then.status(200).body("\"tok-123\"\n");
    })
}

#[tokio::test]
async fn test_auth_strips_quotes_and_caches_token() {
    let server = MockServer::start();
    let auth = auth_mock(&server);
    let client = IikoClient::new(config(&server)).unwrap();

    assert_eq!(client.ensure_token().await.unwrap(), "tok-123");
    assert_eq!(client.ensure_token().await.unwrap(), "tok-123");

    auth.assert_hits(1);
}

#[tokio::test]
async fn test_invalidated_token_is_requested_again() {
    let server = MockServer::start();
    let auth = auth_mock(&server);
    let client = IikoClient::new(config(&server)).unwrap();

    client.ensure_token().await.unwrap();
    client.invalidate_token().await;
    client.ensure_token().await.unwrap();

    auth.assert_hits(2);
}

#[tokio::test]
async fn test_auth_failure_is_status_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/0/auth/access_token");
        then.status(403).body("Forbidden");
    });
    let client = IikoClient::new(config(&server)).unwrap();

    let err = client.ensure_token().await.unwrap_err();
    assert!(matches!(err, IikoError::Status { status: 403, .. }));
}

#[tokio::test]
async fn test_missing_credentials_skip_request() {
    let server = MockServer::start();
    let auth = auth_mock(&server);
    let client = IikoClient::new(IikoConfig::new(
        &server.base_url(),
        String::new(),
        String::new(),
    ))
    .unwrap();

    let err = client.ensure_token().await.unwrap_err();
    assert!(matches!(err, IikoError::MissingCredentials));
    auth.assert_hits(0);
}

#[tokio::test]
async fn test_preset_report_sends_half_open_range() {
    let server = MockServer::start();
    auth_mock(&server);
    let report = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/resto/api/v2/reports/olap/byPresetId/{PRESET}"))
            .header("Authorization", "Bearer tok-123")
            .query_param("dateFrom", "2024-05-01")
            .query_param("dateTo", "2024-05-02");
        then.status(200).json_body(serde_json::json!({
            "data": [
                {"date": "2024-05-01T00:00:00", "categoryName": "Rent",
                 "accountName": "Operational activity", "amount": "1200,50", "isExpense": true},
                {"date": "2024-05-01", "category": "Loan",
                 "account": "Financial activity", "amount": 300, "isExpense": false}
            ]
        }));
    });
    let client = IikoClient::new(config(&server)).unwrap();

    let rows = client
        .fetch_olap_by_preset(PRESET, date(2024, 5, 1), date(2024, 5, 2))
        .await
        .unwrap();

    report.assert();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].is_expense);
    assert_eq!(rows[0].account_name.as_deref(), Some("Operational activity"));
    assert_eq!(rows[1].category_name.as_deref(), Some("Loan"));
    assert!((rows[1].amount - 300.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_transactions_report_posts_inclusive_range() {
    let server = MockServer::start();
    auth_mock(&server);
    let report = server.mock(|when, then| {
        when.method(POST)
            .path("/api/0/olap_report/report")
            .header("Authorization", "Bearer tok-123")
            .json_body_partial(r#"{"reportType": "TRANSACTIONS"}"#)
            .body_contains("2024-05-01T00:00:00")
            .body_contains("2024-05-03T23:59:59");
        then.status(200).json_body(serde_json::json!({ "data": [] }));
    });
    let client = IikoClient::new(config(&server)).unwrap();

    let rows = client
        .fetch_olap_transactions(date(2024, 5, 1), date(2024, 5, 3))
        .await
        .unwrap();

    report.assert();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_unauthorized_report_reauthenticates_once() {
    let server = MockServer::start();
    let auth = auth_mock(&server);
    let report = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/resto/api/v2/reports/olap/byPresetId/{PRESET}"));
        then.status(401);
    });
    let client = IikoClient::new(config(&server)).unwrap();

    let err = client
        .fetch_olap_by_preset(PRESET, date(2024, 5, 1), date(2024, 5, 2))
        .await
        .unwrap_err();

    assert!(matches!(err, IikoError::Status { status: 401, .. }));
    auth.assert_hits(2);
    report.assert_hits(2);
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let server = MockServer::start();
    auth_mock(&server);
    server.mock(|when, then| {
        when.method(POST).path("/api/0/olap_report/report");
        then.status(500).body("boom");
    });
    let client = IikoClient::new(config(&server)).unwrap();

    let err = client
        .fetch_olap_transactions(date(2024, 5, 1), date(2024, 5, 1))
        .await
        .unwrap_err();

    match err {
        IikoError::Status { status, url } => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/api/0/olap_report/report"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_response_without_data_yields_no_rows() {
    let server = MockServer::start();
    auth_mock(&server);
    server.mock(|when, then| {
        when.method(POST).path("/api/0/olap_report/report");
        then.status(200).json_body(serde_json::json!({ "error": "no data" }));
    });
    let client = IikoClient::new(config(&server)).unwrap();

    let rows = client
        .fetch_olap_transactions(date(2024, 5, 1), date(2024, 5, 1))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_non_json_body_is_invalid_response() {
    let server = MockServer::start();
    auth_mock(&server);
    server.mock(|when, then| {
        when.method(POST).path("/api/0/olap_report/report");
        then.status(200).body("<html>maintenance</html>");
    });
    let client = IikoClient::new(config(&server)).unwrap();

    let err = client
        .fetch_olap_transactions(date(2024, 5, 1), date(2024, 5, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, IikoError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_day_report_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    auth_mock(&server);

    let previous = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/resto/api/v2/reports/olap/byPresetId/{PRESET}"))
            .query_param("dateFrom", "2024-04-30")
            .query_param("dateTo", "2024-05-01");
        then.status(200).json_body(serde_json::json!({
            "data": [
                {"date": "2024-04-30", "category": "Revenue",
                 "account": "Operational activity", "amount": 500, "isExpense": false}
            ]
        }));
    });
    let current = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/resto/api/v2/reports/olap/byPresetId/{PRESET}"))
            .query_param("dateFrom", "2024-05-01")
            .query_param("dateTo", "2024-05-02");
        then.status(200).json_body(serde_json::json!({
            "data": [
                {"date": "2024-05-01", "category": "Rent",
                 "account": "Operational activity", "amount": 200, "isExpense": true},
                {"date": "2024-05-01", "category": "Loan",
                 "account": "Financial activity", "amount": 1000, "isExpense": false}
            ]
        }));
    });

    let client = IikoClient::new(config(&server).with_preset(PRESET)).unwrap();
    let service = ReportService::new(Arc::new(IikoSource::new(client)), temp_dir.path());
    let request = ReportRequest::Day(date(2024, 5, 1));

    let report = service.build(&request).await.unwrap();
    assert!((report.current.account_total(ACCOUNT_OPERATIONAL) + 200.0).abs() < f64::EPSILON);
    assert!((report.current.account_total(ACCOUNT_FINANCIAL) - 1000.0).abs() < f64::EPSILON);
    assert!((report.previous.total() - 500.0).abs() < f64::EPSILON);

    let generated = service.generate(&request).await.unwrap();
    assert_eq!(generated.caption, "Отчёт ДДС — 2024-05-01");
    assert_eq!(
        generated.path,
        generated.dir().join("2024-05-01_ДДС.xlsx")
    );
    assert!(generated.dir().starts_with(temp_dir.path()));
    let bytes = std::fs::read(&generated.path).unwrap();
    assert!(bytes.starts_with(b"PK"));

    previous.assert_hits(2);
    current.assert_hits(2);
}
