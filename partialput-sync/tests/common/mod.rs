//! Shared helpers for reconciler tests.

#![allow(dead_code)]

use partialput_model::Model;
use partialput_sync::transport::mock::MockTransport;
use partialput_sync::{
    FetchOptions, Reconciler, ReconcilerConfig, SaveOptions, SyncResult,
};
use partialput_types::{Attributes, from_value};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// The record the server holds for `a/1`.
pub fn a1_json() -> Value {
    json!({
        "id": 1,
        "title": "a1",
        "description": "this is a1",
        "author": "me"
    })
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn attrs(value: Value) -> Attributes {
    from_value(value).unwrap()
}

/// A reconciler over `Model::new("a", initial)` wired to a fresh mock server.
pub fn setup(initial: Value) -> (Reconciler<Model>, MockTransport) {
    setup_with_config(initial, ReconcilerConfig::default())
}

pub fn setup_with_config(
    initial: Value,
    config: ReconcilerConfig,
) -> (Reconciler<Model>, MockTransport) {
    init_tracing();
    let server = MockTransport::new();
    let model = Reconciler::with_config(Model::new("a", initial), Arc::new(server.clone()), config);
    (model, server)
}

pub fn spawn_save(
    model: &Reconciler<Model>,
    attrs: Value,
    options: SaveOptions,
) -> JoinHandle<SyncResult<Attributes>> {
    let model = model.clone();
    tokio::spawn(async move { model.save(attrs, options).await })
}

pub fn spawn_fetch(
    model: &Reconciler<Model>,
    options: FetchOptions,
) -> JoinHandle<SyncResult<Attributes>> {
    let model = model.clone();
    tokio::spawn(async move { model.fetch(options).await })
}

/// Fetches and answers the fetch with `body`.
pub async fn fetch_with(model: &Reconciler<Model>, server: &MockTransport, body: Value) {
    let index = server.request_count();
    let task = spawn_fetch(model, FetchOptions::default());
    server.wait_for_requests(index + 1).await;
    assert!(server.respond(index, 200, body));
    task.await.unwrap().unwrap();
}

/// Body of request `index`.
pub fn request_body(server: &MockTransport, index: usize) -> Value {
    server
        .request(index)
        .and_then(|request| request.body)
        .unwrap_or(Value::Null)
}
