/// HTTP surface tests: session lifecycle and error status mapping
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use kyc_onboarding::config::Config;
use kyc_onboarding::handlers::AppState;
use kyc_onboarding::routes::build_app;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_for(base_url: String) -> Router {
    let state = AppState::new(Config::for_backend(base_url)).unwrap();
    build_app(Arc::new(state), false).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn multipart_file(uri: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "kyc-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn open_session(app: &Router) -> String {
    let (status, body) = send(app, empty_request("POST", "/api/v1/onboarding/sessions")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["session"]["currentStep"], 0);
    body["sessionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app_for("http://127.0.0.1:9".to_string());
    let (status, body) = send(&app, empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = app_for("http://127.0.0.1:9".to_string());
    let uri = format!("/api/v1/onboarding/sessions/{}", uuid::Uuid::new_v4());
    let (status, body) = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("does not exist"));
}

#[tokio::test]
async fn test_advance_with_missing_fields_is_422() {
    let app = app_for("http://127.0.0.1:9".to_string());
    let id = open_session(&app).await;
    let base = format!("/api/v1/onboarding/sessions/{}", id);

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            &format!("{}/customer", base),
            json!({ "fullName": "Jane Doe", "phone": "555-1111" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer"]["fullName"], "Jane Doe");

    let (status, body) = send(&app, empty_request("POST", &format!("{}/advance", base))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["fields"],
        json!(["dateOfBirth", "idNumber", "address"])
    );

    let (_, snapshot) = send(&app, empty_request("GET", &base)).await;
    assert_eq!(snapshot["currentStep"], 0);
    assert_eq!(snapshot["fieldErrors"].as_array().unwrap().len(), 3);

    let (status, _) = send(&app, empty_request("POST", &format!("{}/retreat", base))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_identity_step_requires_verification_409() {
    let app = app_for("http://127.0.0.1:9".to_string());
    let id = open_session(&app).await;
    let base = format!("/api/v1/onboarding/sessions/{}", id);

    send(
        &app,
        json_request(
            "PATCH",
            &format!("{}/customer", base),
            json!({
                "fullName": "Jane Doe",
                "phone": "555-1111",
                "dateOfBirth": "1990-01-01",
                "idNumber": "ID123",
                "address": "1 Main St"
            }),
        ),
    )
    .await;

    let (status, body) = send(&app, empty_request("POST", &format!("{}/advance", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentStep"], 1);

    let (status, _) = send(&app, empty_request("POST", &format!("{}/advance", base))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, empty_request("POST", &format!("{}/submit", base))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_document_slots_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "fileUrl": "obj-42" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/image-analysis"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "qualityScore": 72.5, "issues": ["glare"] })),
        )
        .mount(&server)
        .await;

    let app = app_for(server.uri());
    let id = open_session(&app).await;
    let base = format!("/api/v1/onboarding/sessions/{}", id);

    let (status, slot) = send(
        &app,
        json_request("POST", &format!("{}/documents", base), json!({ "contentKind": "TEXT" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(slot["contentKind"], "TEXT");
    let slot_id = slot["id"].as_u64().unwrap();

    let (status, slot) = send(
        &app,
        json_request(
            "PUT",
            &format!("{}/documents/{}/kind", base, slot_id),
            json!({ "contentKind": "IMAGE" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slot["contentKind"], "IMAGE");

    let (status, slot) = send(
        &app,
        multipart_file(
            &format!("{}/documents/{}/file", base, slot_id),
            "payslip.jpg",
            b"jpeg-bytes",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slot["fileName"], "payslip.jpg");
    assert_eq!(slot["storedReference"], "obj-42");
    assert_eq!(slot["qualityScore"], "72.5");
    assert_eq!(slot["detectedIssues"], json!(["glare"]));

    // Identity slot cannot become text or be removed.
    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("{}/documents/0/kind", base),
            json!({ "contentKind": "TEXT" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, empty_request("DELETE", &format!("{}/documents/0", base))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, snapshot) = send(
        &app,
        empty_request("DELETE", &format!("{}/documents/{}", base, slot_id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(snapshot["supportingDocuments"].as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        empty_request("POST", &format!("{}/documents/{}/verify", base, slot_id)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_close_session_removes_it() {
    let app = app_for("http://127.0.0.1:9".to_string());
    let id = open_session(&app).await;
    let uri = format!("/api/v1/onboarding/sessions/{}", id);

    let (status, _) = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_multipart_without_file_is_400() {
    let app = app_for("http://127.0.0.1:9".to_string());
    let id = open_session(&app).await;

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v1/onboarding/sessions/{}/documents/0/file", id))
        .header("content-type", "multipart/form-data; boundary=x")
        .body(Body::from("--x--\r\n"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
}
