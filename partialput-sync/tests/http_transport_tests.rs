use partialput_model::Model;
use partialput_sync::{
    FetchOptions, HttpTransport, Method, Reconciler, SaveOptions, SetOptions, SyncError,
    SyncRequest, Transport,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn put_sends_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/articles/1"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({"id": 1, "title": "x"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "title": "x"})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri());
    let request = SyncRequest::new(Method::Update, "articles/1").with_body(json!({"id": 1, "title": "x"}));

    let body = transport.send(request).await.unwrap();
    assert_eq!(body, json!({"id": 1, "title": "x"}));
}

#[tokio::test]
async fn get_without_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(format!("{}/", server.uri()));
    let body = transport
        .send(SyncRequest::new(Method::Read, "/articles/1"))
        .await
        .unwrap();
    assert_eq!(body, json!({"id": 1}));
}

#[tokio::test]
async fn empty_response_is_null() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/articles/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri());
    let request = SyncRequest::new(Method::Patch, "articles/1").with_body(json!({"id": 1}));
    assert_eq!(transport.send(request).await.unwrap(), Value::Null);
}

#[tokio::test]
async fn error_status_carries_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"error": "title required"})))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri());
    let err = transport
        .send(SyncRequest::new(Method::Create, "articles").with_body(json!({})))
        .await
        .unwrap_err();

    match err {
        SyncError::Http { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, json!({"error": "title required"}));
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_kept_as_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles/1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri());
    let err = transport
        .send(SyncRequest::new(Method::Read, "articles/1"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert!(matches!(err, SyncError::Http { body: Value::String(ref s), .. } if s == "bad gateway"));
}

#[tokio::test]
async fn malformed_success_body_is_serialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{oops"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri());
    let err = transport
        .send(SyncRequest::new(Method::Read, "articles/1"))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Serialization(_)));
}

#[tokio::test]
async fn absolute_url_bypasses_base() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/elsewhere/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new("http://unused.invalid");
    assert_eq!(transport.base_url(), "http://unused.invalid");

    let url = format!("{}/elsewhere/9", server.uri());
    let body = transport.send(SyncRequest::new(Method::Read, url)).await.unwrap();
    assert_eq!(body, json!({"id": 9}));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let transport = HttpTransport::new("http://127.0.0.1:1");
    let err = transport
        .send(SyncRequest::new(Method::Read, "articles/1"))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
}

// ── Through a reconciler ─────────────────────────────────────────

#[tokio::test]
async fn reconciler_round_trip_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "title": "a1",
            "description": "this is a1"
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/articles/1"))
        .and(body_json(json!({"id": 1, "title": "revised"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "title": "revised",
            "description": "this is a1",
            "updatedAt": "2026-01-01"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let article = Reconciler::new(
        Model::new("articles", json!({"id": 1})),
        Arc::new(HttpTransport::new(server.uri())),
    );

    article.fetch(FetchOptions::default()).await.unwrap();
    article.set(("title", "revised"), SetOptions::default());
    let changes = article.save((), SaveOptions::default()).await.unwrap();

    assert_eq!(changes.get("updatedAt"), Some(&json!("2026-01-01")));
    assert_eq!(changes.len(), 1);
    assert!(!article.has_unsaved_changes());
}
