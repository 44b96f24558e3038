//! Dirty-tracking reconciler.
//!
//! Wraps an [`Entity`] and layers partial-update semantics over its
//! lifecycle: only unsaved attributes (plus a core set and the identifier)
//! are sent on save, and responses are narrowed to what the server actually
//! changed relative to the attributes at dispatch time.
//!
//! # Concurrent saves
//!
//! Saves are not serialized. When a save is dispatched the snapshot is
//! optimistically advanced to the current attributes, so a second save
//! started while the first is in flight only sends what changed since. A
//! failed save restores the previous snapshot only if the snapshot still
//! equals the attributes it was dispatched with; a later save that already
//! advanced the snapshot wins.

use crate::config::ReconcilerConfig;
use crate::error::SyncResult;
use crate::options::{FetchOptions, JsonOptions, SaveOptions, SetOptions};
use crate::state::SyncState;
use crate::transport::{Method, SyncRequest, Transport};
use partialput_model::{ChangeOptions, Entity, ModelEvent, ParseOptions};
use partialput_types::{
    Attributes, IntoAttributes, diff_attributes, merge_into, pick, removed_keys,
};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Handle to an entity with dirty tracking.
///
/// Cloning is cheap; clones share the entity and its sync state, which is
/// how local edits are made while a save or fetch is awaiting its response.
pub struct Reconciler<E> {
    shared: Arc<Mutex<Shared<E>>>,
    transport: Arc<dyn Transport>,
}

impl<E> Clone for Reconciler<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            transport: Arc::clone(&self.transport),
        }
    }
}

struct Shared<E> {
    entity: E,
    state: SyncState,
    config: ReconcilerConfig,
}

/// What a failed save needs to undo its optimistic snapshot.
struct SaveTicket {
    request_id: Uuid,
    baseline: Attributes,
    previous: Option<Attributes>,
}

impl<E: Entity> Reconciler<E> {
    /// Wraps `entity` with the default configuration.
    pub fn new(entity: E, transport: Arc<dyn Transport>) -> Self {
        Self::with_config(entity, transport, ReconcilerConfig::default())
    }

    /// Wraps `entity` with an explicit configuration.
    pub fn with_config(entity: E, transport: Arc<dyn Transport>, config: ReconcilerConfig) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                entity,
                state: SyncState::new(),
                config,
            })),
            transport,
        }
    }

    // A panic inside an entity hook must not wedge the handle; the attribute
    // swap guard has already restored the map by the time the lock is seen
    // poisoned.
    fn lock(&self) -> MutexGuard<'_, Shared<E>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Configuration ────────────────────────────────────────────

    /// A copy of the current configuration.
    pub fn config(&self) -> ReconcilerConfig {
        self.lock().config.clone()
    }

    /// Attributes always included in partial payloads.
    pub fn partial_attributes_core(&self) -> Vec<String> {
        self.lock().config.partial_attributes_core.clone()
    }

    /// Replaces the core attribute set.
    pub fn set_partial_attributes_core<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().config.partial_attributes_core = names.into_iter().map(Into::into).collect();
    }

    // ── Entity access ────────────────────────────────────────────

    /// Runs `f` against the wrapped entity.
    pub fn with_entity<R>(&self, f: impl FnOnce(&E) -> R) -> R {
        f(&self.lock().entity)
    }

    /// The current value of one attribute.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().entity.get(key).cloned()
    }

    /// A copy of the current attribute map.
    pub fn attributes(&self) -> Attributes {
        self.lock().entity.attributes().clone()
    }

    /// Whether the entity has no identifier yet.
    pub fn is_new(&self) -> bool {
        self.lock().entity.is_new()
    }

    /// The last-synced snapshot, if any.
    pub fn synced_attributes(&self) -> Option<Attributes> {
        self.lock().state.synced().cloned()
    }

    // ── Dirty tracking ───────────────────────────────────────────

    /// Attributes that differ from the last-synced snapshot.
    ///
    /// With `attrs`, reports the entries of that map which would be unsaved
    /// if applied. Without a snapshot (never synced) the input is returned
    /// whole.
    pub fn unsaved_attributes(&self, attrs: Option<&Attributes>) -> Attributes {
        self.lock().unsaved(attrs)
    }

    /// Whether any attribute differs from the snapshot.
    pub fn has_unsaved_changes(&self) -> bool {
        !self.lock().unsaved(None).is_empty()
    }

    /// Resets the attributes to the last-synced snapshot with a single
    /// change notification. A never-synced entity is emptied.
    pub fn discard_unsaved_changes(&self) {
        let mut shared = self.lock();
        let synced = shared.state.synced().cloned().unwrap_or_default();
        shared.entity.reset(synced, ChangeOptions::default());
    }

    // ── Mutation ─────────────────────────────────────────────────

    /// Applies attributes to the entity. Returns the names that changed.
    pub fn set(&self, attrs: impl IntoAttributes, options: SetOptions) -> Vec<String> {
        self.lock().apply_set(attrs.into_attributes(), options)
    }

    /// Removes one attribute. Returns whether it was present.
    pub fn unset(&self, key: &str) -> bool {
        let options = SetOptions {
            unset: true,
            ..Default::default()
        };
        !self.set((key, Value::Null), options).is_empty()
    }

    // ── Serialization ────────────────────────────────────────────

    /// The entity's JSON. With `partial`, only unsaved, core and identifier
    /// attributes are included.
    pub fn to_json(&self, options: JsonOptions) -> Value {
        let mut shared = self.lock();
        if options.partial {
            shared.partial_json()
        } else {
            shared.entity.to_json()
        }
    }

    /// Parses a response body through the entity, narrowing to the fields
    /// that differ from `options.baseline`. The baseline is taken out of
    /// `options` before the entity parses, so nested parses never see it.
    pub fn parse(&self, response: Value, options: &mut ParseOptions) -> SyncResult<Attributes> {
        self.lock().parse(response, options)
    }

    // ── Remote operations ────────────────────────────────────────

    /// Saves the entity.
    ///
    /// `attrs` are applied first. A persisted entity with nothing unsaved is
    /// not sent; the call resolves immediately with an empty map. Otherwise
    /// it resolves with the server-side changes parsed from the response.
    pub async fn save(
        &self,
        attrs: impl IntoAttributes,
        options: SaveOptions,
    ) -> SyncResult<Attributes> {
        let attrs = attrs.into_attributes();

        let (request, ticket) = {
            let mut shared = self.lock();
            if !attrs.is_empty() {
                shared.entity.set(attrs, ChangeOptions::default());
            }

            if !shared.entity.is_new() && shared.unsaved(None).is_empty() {
                debug!(url = %shared.entity.url(), "nothing unsaved, skipping save");
                return Ok(Attributes::new());
            }

            let body = if options.partial {
                shared.partial_json()
            } else {
                shared.entity.to_json()
            };
            let method = if shared.entity.is_new() {
                Method::Create
            } else if options.patch {
                Method::Patch
            } else {
                Method::Update
            };
            let request = SyncRequest::new(method, shared.entity.url()).with_body(body);

            let baseline = shared.entity.attributes().clone();
            let previous = shared.state.replace(Some(baseline.clone()));
            let ticket = SaveTicket {
                request_id: Uuid::now_v7(),
                baseline,
                previous,
            };
            (request, ticket)
        };

        info!(
            request_id = %ticket.request_id,
            method = request.method.http_verb(),
            url = %request.url,
            "dispatching save"
        );
        let result = self.transport.send(request).await;

        let mut shared = self.lock();
        let outcome = result.and_then(|response| {
            let mut parse_options = ParseOptions::default();
            if options.partial {
                parse_options.baseline = Some(ticket.baseline.clone());
            }
            shared.parse(response, &mut parse_options)
        });

        match outcome {
            Ok(changes) => {
                let protect = options
                    .protect_unsaved
                    .unwrap_or(shared.config.protect_unsaved);
                shared.apply_server_attributes(changes.clone(), protect);
                shared.state.merge(changes.clone());
                shared.entity.trigger(ModelEvent::Sync);
                debug!(
                    request_id = %ticket.request_id,
                    changed = changes.len(),
                    "save succeeded"
                );
                Ok(changes)
            }
            Err(e) => {
                shared.rollback(&ticket);
                shared.entity.trigger(ModelEvent::Error {
                    message: e.to_string(),
                });
                warn!(request_id = %ticket.request_id, error = %e, "save failed");
                Err(e)
            }
        }
    }

    /// Fetches the entity and applies the response. Afterwards the snapshot
    /// matches the entity, so nothing is unsaved.
    pub async fn fetch(&self, options: FetchOptions) -> SyncResult<Attributes> {
        let (request, baseline) = {
            let shared = self.lock();
            let request = SyncRequest::new(Method::Read, shared.entity.url());
            (request, shared.entity.attributes().clone())
        };

        let request_id = Uuid::now_v7();
        info!(%request_id, url = %request.url, "dispatching fetch");
        let result = self.transport.send(request).await;

        let mut shared = self.lock();
        let outcome = result.and_then(|response| {
            let mut parse_options = ParseOptions::default();
            if options.partial {
                parse_options.baseline = Some(baseline);
            }
            shared.parse(response, &mut parse_options)
        });

        match outcome {
            Ok(changes) => {
                let protect = options
                    .protect_unsaved
                    .unwrap_or(shared.config.protect_unsaved);
                let held_back = shared.apply_server_attributes(changes.clone(), protect);
                let mut synced = shared.entity.attributes().clone();
                merge_into(&mut synced, held_back);
                shared.state.mark_synced(synced);
                shared.entity.trigger(ModelEvent::Sync);
                debug!(%request_id, changed = changes.len(), "fetch succeeded");
                Ok(changes)
            }
            Err(e) => {
                shared.entity.trigger(ModelEvent::Error {
                    message: e.to_string(),
                });
                warn!(%request_id, error = %e, "fetch failed");
                Err(e)
            }
        }
    }
}

impl<E: Entity> Shared<E> {
    fn unsaved(&self, attrs: Option<&Attributes>) -> Attributes {
        let attrs = attrs.unwrap_or_else(|| self.entity.attributes());
        self.state.unsaved(attrs)
    }

    fn protected(&self, protect_unsaved: bool) -> Option<Attributes> {
        protect_unsaved.then(|| self.unsaved(None))
    }

    fn apply_set(&mut self, mut attrs: Attributes, options: SetOptions) -> Vec<String> {
        let protect = options
            .protect_unsaved
            .unwrap_or(self.config.protect_unsaved);
        let dirty = self.protected(protect).unwrap_or_default();

        let cleared: Vec<String> = if options.clear && !options.unset {
            removed_keys(self.entity.attributes(), &attrs)
                .into_iter()
                .filter(|key| !dirty.contains_key(key))
                .collect()
        } else {
            Vec::new()
        };

        if !dirty.is_empty() {
            attrs.retain(|key, _| !dirty.contains_key(key));
        }

        let change_options = ChangeOptions {
            silent: options.silent,
            unset: options.unset,
        };
        if cleared.is_empty() {
            return self.entity.set(attrs, change_options);
        }

        // Removal is decided by presence, so a key already holding `null`
        // is still reported and notified.
        let mut changed = self.entity.set(
            attrs,
            ChangeOptions {
                silent: true,
                ..change_options
            },
        );
        let placeholders = cleared.into_iter().map(|key| (key, Value::Null)).collect();
        changed.extend(self.entity.set(
            placeholders,
            ChangeOptions {
                silent: true,
                unset: true,
            },
        ));

        if !options.silent && !changed.is_empty() {
            for attribute in &changed {
                let value = self.entity.get(attribute).cloned().unwrap_or(Value::Null);
                self.entity.trigger(ModelEvent::Change {
                    attribute: attribute.clone(),
                    value,
                });
            }
            self.entity.trigger(ModelEvent::Changed);
        }
        changed
    }

    /// Applies server-side changes, skipping dirty keys when protected.
    /// Returns the changes that were held back.
    fn apply_server_attributes(&mut self, mut changes: Attributes, protect: bool) -> Attributes {
        let mut held_back = Attributes::new();
        if let Some(dirty) = self.protected(protect) {
            changes.retain(|key, value| {
                if dirty.contains_key(key) {
                    held_back.insert(key.clone(), value.clone());
                    false
                } else {
                    true
                }
            });
        }
        self.entity.set(changes, ChangeOptions::default());
        held_back
    }

    fn partial_json(&mut self) -> Value {
        let id_attribute = self.entity.id_attribute().to_string();
        let core = self
            .config
            .partial_attributes_core
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(id_attribute.as_str()));
        let mut partial = pick(self.entity.attributes(), core);
        merge_into(&mut partial, self.unsaved(None));

        let swapped = SwappedAttributes::new(&mut self.entity, partial);
        swapped.to_json()
    }

    fn parse(&self, response: Value, options: &mut ParseOptions) -> SyncResult<Attributes> {
        let baseline = options.baseline.take();
        let parsed = self.entity.parse(response, options)?;
        Ok(match baseline {
            Some(baseline) => diff_attributes(&parsed, &baseline),
            None => parsed,
        })
    }

    fn rollback(&mut self, ticket: &SaveTicket) {
        if self.state.synced() == Some(&ticket.baseline) {
            self.state.replace(ticket.previous.clone());
            debug!(request_id = %ticket.request_id, "restored snapshot after failed save");
        } else {
            debug!(
                request_id = %ticket.request_id,
                "snapshot advanced by a later sync, keeping it"
            );
        }
    }
}

/// Temporarily substitutes an entity's attribute map, restoring the
/// original on drop (including during unwinding).
struct SwappedAttributes<'a, E: Entity> {
    entity: &'a mut E,
    original: Attributes,
}

impl<'a, E: Entity> SwappedAttributes<'a, E> {
    fn new(entity: &'a mut E, replacement: Attributes) -> Self {
        let original = std::mem::replace(entity.attributes_mut(), replacement);
        Self { entity, original }
    }

    fn to_json(&self) -> Value {
        self.entity.to_json()
    }
}

impl<E: Entity> Drop for SwappedAttributes<'_, E> {
    fn drop(&mut self) {
        std::mem::swap(self.entity.attributes_mut(), &mut self.original);
    }
}

