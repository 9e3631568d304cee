//! Case endpoints over HTTP, including multipart uploads

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{json_request, multipart_request, token_for, TestApp};

#[tokio::test]
async fn test_admin_creates_case_with_documents() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;
    let token = token_for(&admin);

    let payload = json!({
        "client_user_id": client.id,
        "client_name": "Ana Ruiz",
        "case_type": "Traffic_Violation",
        "case_status": "Pending",
        "court_date": "2030-05-14",
        "assets": [{"name": "ticket.pdf"}, {"name": "photo.jpg"}]
    });
    let (status, body) = app
        .request(multipart_request(
            "/api/cases",
            &token,
            &payload,
            &[("ticket.pdf", b"%PDF-1.4"), ("photo.jpg", b"jpeg")],
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["client_name"], "Ana Ruiz");
    assert_eq!(body["case_status"], "Pending");
    assert_eq!(body["court_date"], "2030-05-14");
    assert_eq!(body["assets"].as_array().unwrap().len(), 2);
    assert_eq!(body["timeline"][0]["title"], "Case Started");
    assert_eq!(body["timeline"][1]["title"], "Assets Updated");
    assert_eq!(app.storage.uploaded().len(), 2);
}

#[tokio::test]
async fn test_create_rejects_file_metadata_mismatch() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;

    let payload = json!({
        "client_user_id": client.id,
        "client_name": "Ana Ruiz",
        "case_type": "Traffic_Violation",
        "case_status": "Pending",
        "assets": [{"name": "a.pdf"}, {"name": "b.pdf"}]
    });
    let (status, _) = app
        .request(multipart_request(
            "/api/cases",
            &token_for(&admin),
            &payload,
            &[("a.pdf", b"a"), ("b.pdf", b"b"), ("c.pdf", b"c")],
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.storage.uploaded().is_empty());
}

#[tokio::test]
async fn test_storage_outage_reports_rollback() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;
    app.storage.fail_on_upload(1);

    let payload = json!({
        "client_user_id": client.id,
        "client_name": "Ana Ruiz",
        "case_type": "Parking_Violation",
        "case_status": "Pending",
        "assets": [{"name": "a.pdf"}]
    });
    let (status, body) = app
        .request(multipart_request(
            "/api/cases",
            &token_for(&admin),
            &payload,
            &[("a.pdf", b"a")],
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Operation rolled back"));

    let (_, list) = app
        .request(json_request(Method::GET, "/api/cases", Some(&token_for(&admin)), None))
        .await;
    assert_eq!(list["meta"]["total"], 0);
}

#[tokio::test]
async fn test_missing_payload_field_is_bad_request() {
    let app = TestApp::new().await;
    let admin = app.admin().await;

    let (status, body) = app
        .request(multipart_request(
            "/api/cases",
            &token_for(&admin),
            &json!("not an object"),
            &[],
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Invalid payload"));
}

#[tokio::test]
async fn test_client_uploads_by_client_name() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;
    let case = app.open_case(&admin, &client).await;

    let payload = json!({
        "target": {"client_name": "Ana Ruiz"},
        "assets": [{"name": "receipt.pdf"}]
    });
    let (status, body) = app
        .request(multipart_request(
            "/api/cases/assets",
            &token_for(&client),
            &payload,
            &[("receipt.pdf", b"receipt")],
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["id"], case.id);
    assert_eq!(body["assets"][0]["name"], "receipt.pdf");
    assert_eq!(body["assets"][0]["size"], 7);
}

#[tokio::test]
async fn test_client_cannot_patch_or_delete() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;
    let case = app.open_case(&admin, &client).await;
    let token = token_for(&client);

    let (status, _) = app
        .request(json_request(
            Method::PATCH,
            &format!("/api/cases/{}", case.id),
            Some(&token),
            Some(json!({"case_status": "Closed"})),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(json_request(
            Method::DELETE,
            &format!("/api/cases/{}", case.id),
            Some(&token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_patch_status_and_read_back() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;
    let case = app.open_case(&admin, &client).await;
    let admin_token = token_for(&admin);

    let (status, body) = app
        .request(json_request(
            Method::PATCH,
            &format!("/api/cases/{}", case.id),
            Some(&admin_token),
            Some(json!({"case_status": "Letter_sent_to_insurance"})),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["case_status"], "Letter_sent_to_insurance");

    // The client sees the change and the audit entry
    let (status, body) = app
        .request(json_request(
            Method::GET,
            &format!("/api/cases/{}", case.id),
            Some(&token_for(&client)),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let timeline = body["timeline"].as_array().unwrap();
    assert_eq!(timeline.last().unwrap()["title"], "Case Updated");
}

#[tokio::test]
async fn test_unknown_status_in_patch_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;
    let case = app.open_case(&admin, &client).await;

    let (status, _) = app
        .request(json_request(
            Method::PATCH,
            &format!("/api/cases/{}", case.id),
            Some(&token_for(&admin)),
            Some(json!({"case_status": "Won"})),
        ))
        .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_timeline_note_and_delete() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let client = app.client("Ana Ruiz", "ana@example.com").await;
    let case = app.open_case(&admin, &client).await;
    let token = token_for(&admin);

    let (status, body) = app
        .request(json_request(
            Method::POST,
            &format!("/api/cases/{}/timeline", case.id),
            Some(&token),
            Some(json!({"title": "Hearing", "description": "Hearing set for May"})),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["timeline"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .request(json_request(
            Method::DELETE,
            &format!("/api/cases/{}", case.id),
            Some(&token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(json_request(
            Method::GET,
            &format!("/api/cases/{}", case.id),
            Some(&token_for(&client)),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_list_is_scoped() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let ana = app.client("Ana Ruiz", "ana@example.com").await;
    let ben = app.client("Ben Ortiz", "ben@example.com").await;
    app.open_case(&admin, &ana).await;
    app.open_case(&admin, &ben).await;
    app.open_case(&admin, &ben).await;

    let (status, body) = app
        .request(json_request(Method::GET, "/api/cases", Some(&token_for(&ben)), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);

    let (_, body) = app
        .request(json_request(
            Method::GET,
            "/api/cases?limit=1&page=2",
            Some(&token_for(&admin)),
            None,
        ))
        .await;
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["total_pages"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
