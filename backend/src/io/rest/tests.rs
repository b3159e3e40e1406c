use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use super::create_router;
use crate::test_state;

struct TestApp {
    router: Router,
    _upload_dir: TempDir,
}

async fn setup_test_app() -> TestApp {
    let upload_dir = TempDir::new().expect("Failed to create temp dir");
    let state = test_state(upload_dir.path()).await;
    TestApp {
        router: create_router(state),
        _upload_dir: upload_dir,
    }
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

async fn send_raw(app: &TestApp, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, request).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn create_sheep(app: &TestApp, body: Value) -> Value {
    let (status, body) = send(app, json_request(Method::POST, "/sheep", body)).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    body["data"].clone()
}

#[tokio::test]
async fn test_create_sheep_and_read_family() {
    let app = setup_test_app().await;

    let mother = create_sheep(&app, json!({"tag_id": "M1", "gender": "female", "dob": "2020-04-01"})).await;
    assert_eq!(mother["pregnant"], json!(false));

    let lamb = create_sheep(
        &app,
        json!({"tag_id": "L1", "gender": "male", "dob": "2024-04-01", "mother_id": "m1", "is_lamb": "true"}),
    )
    .await;
    assert_eq!(lamb["mother_id"], "M1");
    assert_eq!(lamb["is_lamb"], json!(true));
    assert_eq!(lamb["pregnant"], Value::Null);

    let uri = format!("/sheep/{}", mother["id"]);
    let (status, detail) = send(&app, empty_request(Method::GET, &uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["tag_id"], "M1");
    assert_eq!(detail["family"]["children"], json!(["L1"]));
    assert_eq!(detail["family"]["mother"], Value::Null);
}

#[tokio::test]
async fn test_create_response_message() {
    let app = setup_test_app().await;

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/sheep", json!({"tag_id": "T1", "gender": "male", "dob": "2022-01-01"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Sheep added successfully");
    assert_eq!(body["data"]["dob"], "2022-01-01");
}

#[tokio::test]
async fn test_create_from_urlencoded_form() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/sheep")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("tag_id=F1&gender=Female&dob=2021-05-05&pregnant=true&weight=40.5&breed="))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    assert_eq!(body["data"]["gender"], "female");
    assert_eq!(body["data"]["pregnant"], json!(true));
    assert_eq!(body["data"]["weight"], json!(40.5));
}

#[tokio::test]
async fn test_multipart_upload_is_served() {
    let app = setup_test_app().await;

    let boundary = "flockboundary";
    let mut payload = Vec::new();
    for (name, value) in [("tag_id", "P1"), ("gender", "female"), ("dob", "2023-02-02")] {
        payload.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                boundary, name, value
            )
            .as_bytes(),
        );
    }
    payload.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"ewe.png\"\r\nContent-Type: image/png\r\n\r\n",
            boundary
        )
        .as_bytes(),
    );
    payload.extend_from_slice(b"fake png bytes");
    payload.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/sheep")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(payload))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    let image_url = body["data"]["image_url"].as_str().unwrap().to_string();
    assert!(image_url.starts_with("http://farm.test/uploads/"));
    assert!(image_url.ends_with("_ewe.png"));

    let path = image_url.trim_start_matches("http://farm.test");
    let (status, bytes) = send_raw(&app, empty_request(Method::GET, path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"fake png bytes");
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let app = setup_test_app().await;

    let (status, body) = send(&app, json_request(Method::POST, "/sheep", json!({"breed": "Merino"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "Missing required fields: tag_id, gender, dob");

    let (_, list) = send(&app, empty_request(Method::GET, "/sheep")).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/sheep")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_duplicate_tag_conflict() {
    let app = setup_test_app().await;
    create_sheep(&app, json!({"tag_id": "D1", "gender": "male", "dob": "2022-01-01"})).await;

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/sheep", json!({"tag_id": "D1", "gender": "male", "dob": "2022-01-01"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_TAG");
}

#[tokio::test]
async fn test_unknown_parent_not_found() {
    let app = setup_test_app().await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/sheep",
            json!({"tag_id": "C1", "gender": "male", "dob": "2022-01-01", "father_id": "GHOST"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PARENT_NOT_FOUND");
}

#[tokio::test]
async fn test_get_by_tag_ignores_case() {
    let app = setup_test_app().await;
    create_sheep(&app, json!({"tag_id": "Ewe-7", "gender": "female", "dob": "2019-09-09"})).await;

    let (status, body) = send(&app, empty_request(Method::GET, "/sheep/by_tag/EWE-7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tag_id"], "Ewe-7");

    let (status, body) = send(&app, empty_request(Method::GET, "/sheep/by_tag/nobody")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_update_and_delete_sheep() {
    let app = setup_test_app().await;
    let sheep = create_sheep(&app, json!({"tag_id": "U1", "gender": "female", "dob": "2021-01-01"})).await;
    let uri = format!("/sheep/{}", sheep["id"]);

    let (status, body) = send(&app, json_request(Method::PUT, &uri, json!({"weight": 52.0, "pregnant": true}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sheep updated successfully");
    assert_eq!(body["data"]["weight"], json!(52.0));
    assert_eq!(body["data"]["pregnant"], json!(true));

    let (status, body) = send(&app, json_request(Method::PUT, &uri, json!({"dob": "2021-13-40"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(&app, empty_request(Method::DELETE, &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sheep U1 deleted");

    let (status, _) = send(&app, empty_request(Method::GET, &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lamb_scope() {
    let app = setup_test_app().await;
    let ewe = create_sheep(&app, json!({"tag_id": "E1", "gender": "female", "dob": "2019-01-01"})).await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/lambs",
            json!({"tag_id": "L1", "gender": "male", "dob": "2024-03-01", "mother_id": "E1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Lamb added successfully");
    assert_eq!(body["data"]["is_lamb"], json!(true));

    let (status, lambs) = send(&app, empty_request(Method::GET, "/lambs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lambs.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, empty_request(Method::GET, &format!("/lambs/{}", ewe["id"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NOT_A_LAMB");
    assert_eq!(body["error"], "Not a lamb");

    let (status, body) = send(&app, empty_request(Method::GET, "/lambs/by-parent/e1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["tag_id"], "L1");

    let (status, _) = send(&app, empty_request(Method::GET, "/lambs/by-parent/NOBODY")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lamb_detail_lists_siblings() {
    let app = setup_test_app().await;
    create_sheep(&app, json!({"tag_id": "E1", "gender": "female", "dob": "2019-01-01"})).await;

    let mut ids = Vec::new();
    for tag in ["L1", "L2"] {
        let (_, body) = send(
            &app,
            json_request(
                Method::POST,
                "/lambs",
                json!({"tag_id": tag, "gender": "female", "dob": "2024-03-01", "mother_id": "E1"}),
            ),
        )
        .await;
        ids.push(body["data"]["id"].clone());
    }

    let (status, detail) = send(&app, empty_request(Method::GET, &format!("/lambs/{}", ids[0]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["family"]["mother"], "E1");
    assert_eq!(detail["family"]["siblings"], json!(["L2"]));
    assert!(detail["age_days"].as_i64().unwrap() >= 0);

    let (status, body) = send(&app, empty_request(Method::DELETE, &format!("/lambs/{}", ids[1]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Lamb L2 deleted");
}

#[tokio::test]
async fn test_health_and_migrate() {
    let app = setup_test_app().await;

    let (status, body) = send(&app, empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");

    let (status, _) = send(&app, empty_request(Method::POST, "/admin/migrate")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_non_numeric_id_gets_json_error() {
    let app = setup_test_app().await;

    for (method, uri) in [
        (Method::GET, "/sheep/abc"),
        (Method::DELETE, "/sheep/abc"),
        (Method::GET, "/lambs/1.5"),
    ] {
        let (status, bytes) = send_raw(&app, empty_request(method, uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);

        let body: Value = serde_json::from_slice(&bytes).expect("error body should be JSON");
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["error"].as_str().unwrap().starts_with("Malformed request"));
    }
}

#[tokio::test]
async fn test_unknown_route() {
    let app = setup_test_app().await;

    let (status, body) = send(&app, empty_request(Method::GET, "/goats")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Resource not found"}));
}
