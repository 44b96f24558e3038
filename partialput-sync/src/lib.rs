//! Partial save and fetch for partialput entities.
//!
//! Wraps any [`Entity`](partialput_model::Entity) in a [`Reconciler`] that
//! tracks which attributes changed since the last server sync and sends only
//! those on save.
//!
//! # Architecture
//!
//! ## Components
//!
//! - **State**: the last-synced snapshot dirty tracking diffs against
//! - **Reconciler**: save/fetch/set/parse/to_json policy over an entity
//! - **Transport**: moves requests; [`HttpTransport`] for real servers,
//!   [`transport::mock::MockTransport`] for tests
//! - **Config**: core attribute set and `protect_unsaved` default
//!
//! ## Save
//!
//! 1. **Short-circuit**: a persisted entity with nothing unsaved is not sent
//! 2. **Payload**: unsaved attributes, the core set and the identifier
//! 3. **Optimistic snapshot**: attributes at dispatch are treated as synced
//! 4. **Narrow**: only response fields that differ from the dispatch-time
//!    attributes are applied, so edits made meanwhile survive
//! 5. **Rollback**: on failure the snapshot is restored unless a later save
//!    already moved it
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use partialput_model::Model;
//! use partialput_sync::{HttpTransport, Reconciler, SaveOptions, SetOptions};
//! use serde_json::json;
//!
//! # async fn run() -> partialput_sync::SyncResult<()> {
//! let transport = Arc::new(HttpTransport::new("https://api.example.com"));
//! let article = Reconciler::new(Model::new("articles", json!({"id": 1})), transport);
//!
//! article.fetch(Default::default()).await?;
//! article.set(("title", "Revised"), SetOptions::default());
//! article.save((), SaveOptions::default()).await?; // PUT {"id": 1, "title": "Revised"}
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod http;
/// Per-call options for reconciler operations.
pub mod options;
mod reconciler;
/// Last-synced snapshot tracking.
pub mod state;
/// Request transport and the scripted test transport.
pub mod transport;

pub use config::ReconcilerConfig;
pub use error::{SyncError, SyncResult};
pub use http::HttpTransport;
pub use options::{FetchOptions, JsonOptions, SaveOptions, SetOptions};
pub use reconciler::Reconciler;
pub use state::SyncState;
pub use transport::{Method, SyncRequest, Transport};
