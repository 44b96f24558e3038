//! Transport layer abstraction.
//!
//! The reconciler only knows how to describe a request; moving bytes is
//! delegated to a [`Transport`] so the same policy runs over HTTP in
//! production and over a scripted mock in tests.

use crate::error::SyncResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a request does to the remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Persist a new record.
    Create,
    /// Read the current record.
    Read,
    /// Replace an existing record.
    Update,
    /// Partially modify an existing record.
    Patch,
}

impl Method {
    /// The HTTP verb conventionally used for this method.
    pub fn http_verb(&self) -> &'static str {
        match self {
            Method::Create => "POST",
            Method::Read => "GET",
            Method::Update => "PUT",
            Method::Patch => "PATCH",
        }
    }
}

/// A request produced by the reconciler.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRequest {
    pub method: Method,
    pub url: String,
    /// JSON body; `None` for reads.
    pub body: Option<Value>,
}

impl SyncRequest {
    /// A request without a body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Sends requests to the remote resource.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and resolves with the response body (`Value::Null`
    /// when the body is empty). Non-success responses are errors.
    async fn send(&self, request: SyncRequest) -> SyncResult<Value>;
}

/// A scripted transport for testing.
pub mod mock {
    use super::*;
    use crate::error::SyncError;
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
    use tokio::sync::{oneshot, watch};

    type Responder = oneshot::Sender<SyncResult<Value>>;

    #[derive(Default)]
    struct MockState {
        requests: Vec<SyncRequest>,
        responders: Vec<Option<Responder>>,
    }

    /// Records every request and holds it open until the test answers it,
    /// so tests decide exactly when and in which order responses land.
    #[derive(Clone)]
    pub struct MockTransport {
        state: Arc<Mutex<MockState>>,
        count: Arc<watch::Sender<usize>>,
    }

    impl Default for MockTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockTransport {
        /// A transport with no requests recorded.
        pub fn new() -> Self {
            let (count, _) = watch::channel(0);
            Self {
                state: Arc::new(Mutex::new(MockState::default())),
                count: Arc::new(count),
            }
        }

        fn lock(&self) -> MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// All requests received so far, in arrival order.
        pub fn requests(&self) -> Vec<SyncRequest> {
            self.lock().requests.clone()
        }

        /// Request `index`, if it has arrived.
        pub fn request(&self, index: usize) -> Option<SyncRequest> {
            self.lock().requests.get(index).cloned()
        }

        /// Number of requests received so far.
        pub fn request_count(&self) -> usize {
            self.lock().requests.len()
        }

        /// Waits until at least `n` requests have arrived.
        pub async fn wait_for_requests(&self, n: usize) {
            let mut rx = self.count.subscribe();
            // The sender lives as long as `self`, so this cannot fail.
            let _ = rx.wait_for(|count| *count >= n).await;
        }

        /// Answers request `index`. 2xx statuses resolve with `body`; any
        /// other status fails with [`SyncError::Http`]. Returns `false` if
        /// the request was already answered or its caller went away.
        pub fn respond(&self, index: usize, status: u16, body: Value) -> bool {
            let result = if (200..300).contains(&status) {
                Ok(body)
            } else {
                Err(SyncError::Http { status, body })
            };
            self.complete(index, result)
        }

        /// Fails request `index` with `error`.
        pub fn fail(&self, index: usize, error: SyncError) -> bool {
            self.complete(index, Err(error))
        }

        /// Drops request `index` without answering, as a transport that
        /// lost the connection would.
        pub fn hang_up(&self, index: usize) -> bool {
            self.lock()
                .responders
                .get_mut(index)
                .and_then(Option::take)
                .is_some()
        }

        fn complete(&self, index: usize, result: SyncResult<Value>) -> bool {
            let responder = self
                .lock()
                .responders
                .get_mut(index)
                .and_then(Option::take);
            match responder {
                Some(tx) => tx.send(result).is_ok(),
                None => false,
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: SyncRequest) -> SyncResult<Value> {
            let (tx, rx) = oneshot::channel();
            let count = {
                let mut state = self.lock();
                state.requests.push(request);
                state.responders.push(Some(tx));
                state.requests.len()
            };
            self.count.send_replace(count);
            rx.await.map_err(|_| SyncError::ChannelClosed)?
        }
    }
}
