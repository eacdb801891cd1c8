//! Hypothesis tool endpoints, exercised through the router.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use satbench::config::{Settings, ToolKind};
use satbench::server::{router, AppState};

fn app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
        ..Settings::default()
    };
    let router = router(AppState::new(settings, ToolKind::Hypothesis));
    (dir, router)
}

fn post_json(path: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn post_text(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn given_plain_label_when_adding_source_then_file_created_with_header() {
    let (dir, app) = app();
    let response = app
        .oneshot(post_text("/api/add-source", "  economic pressure  "))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"ok": true}));

    let content =
        std::fs::read_to_string(dir.path().join("hypothesis/input/source_list.txt")).expect("read");
    assert_eq!(content, "So What?\n- economic pressure");
}

#[tokio::test]
async fn given_blank_label_when_adding_source_then_bad_request() {
    let (_dir, app) = app();
    let response = app
        .oneshot(post_json("/api/add-source", &json!({"label": "   "})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Empty label");
}

#[tokio::test]
async fn given_items_when_rewriting_source_then_bullet_list_replaced() {
    let (dir, app) = app();
    let body = json!({"items": ["one", "  two  ", "", null]});
    let response = app
        .oneshot(post_json("/api/source", &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let content =
        std::fs::read_to_string(dir.path().join("hypothesis/input/source_list.txt")).expect("read");
    assert_eq!(content, "So What?\n- one\n- two\n");
}

#[tokio::test]
async fn given_invalid_json_when_rewriting_source_then_bad_request() {
    let (_dir, app) = app();
    let response = app
        .oneshot(post_json("/api/source", &json!("ignored")).map(|_| Body::from("{not json")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid JSON");
}

#[tokio::test]
async fn given_json_permutation_when_saving_hypothesis_then_line_appended() {
    let (dir, app) = app();
    let first = post_json(
        "/api/save-hypothesis",
        &json!({"permutation": "Nation X -> Economic -> Pressure"}),
    );
    let second = post_text("/api/save-hypothesis", "raw line");
    app.clone().oneshot(first).await.expect("response");
    app.oneshot(second).await.expect("response");

    let content = std::fs::read_to_string(dir.path().join("hypothesis/Hypotheses.txt")).expect("read");
    assert_eq!(content, "Nation X -> Economic -> Pressure\nraw line\n");
}

#[tokio::test]
async fn given_out_of_range_index_when_updating_line_then_bad_request() {
    let (_dir, app) = app();
    app.clone()
        .oneshot(post_json("/api/save-hypothesis", &json!({"text": "only"})))
        .await
        .expect("response");
    let response = app
        .oneshot(post_json(
            "/api/update-hypothesis-line",
            &json!({"index": 7, "text": "replacement"}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_valid_index_when_updating_line_then_line_replaced() {
    let (dir, app) = app();
    app.clone()
        .oneshot(post_json("/api/hypotheses", &json!({"lines": ["a", "b", "c"]})))
        .await
        .expect("response");
    let response = app
        .oneshot(post_json(
            "/api/update-hypothesis-line",
            &json!({"index": 1, "text": "B"}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let content = std::fs::read_to_string(dir.path().join("hypothesis/Hypotheses.txt")).expect("read");
    assert_eq!(content, "a\nB\nc");
}

#[tokio::test]
async fn given_missing_file_when_deleting_then_ok() {
    let (_dir, app) = app();
    let response = app
        .oneshot(post_text("/api/delete-hypotheses-file", ""))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn given_bridge_merges_when_reading_then_payload_accumulates() {
    let (_dir, app) = app();
    app.clone()
        .oneshot(post_json(
            "/api/save-hypothesis-ach",
            &json!({"intelligence_requirement": " intent? ", "titles": ["alpha", "beta"]}),
        ))
        .await
        .expect("response");
    app.clone()
        .oneshot(post_json(
            "/api/save-hypothesis-ach",
            &json!({"id": "H2", "title": "beta2", "description": "updated"}),
        ))
        .await
        .expect("response");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/hypothesis-ach")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["intelligence_requirement"], "intent?");
    assert_eq!(payload["H1"]["title"], "alpha");
    assert_eq!(payload["H2"]["title"], "beta2");
    assert_eq!(payload["H2"]["description"], "updated");
}
