//! # Generic Actor Server
//!
//! The `ResourceActor` owns a collection of records and processes requests for them one at a
//! time. That sequential loop is the whole concurrency story: no locks around the store, and
//! any check-then-write inside a single hook is atomic with respect to every other client.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use crate::storage::{MemoryStorage, Storage};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// It owns the `store` and the receiving end of the channel. Clients talk to it through a
/// cloneable [`ResourceClient`].
///
/// # Usage Pattern
///
/// 1.  **Create**: `ResourceActor::new()` (volatile) or `ResourceActor::with_storage()`.
/// 2.  **Wire**: pass dependencies into `actor.run(context)`.
/// 3.  **Run**: spawn the run loop in a background task.
///
/// # Operations
///
/// * **Create**: asks [`ActorEntity::next_id`] for an id (given the greatest stored id),
///   rejects duplicates, builds the record, runs `on_create`, persists, then inserts.
/// * **Get**: clone of the stored record, or `None`.
/// * **List**: clones of every record matching the query, ascending by id.
/// * **Update / Action**: run the hook on a copy, persist the copy, then replace the stored
///   record. Hook errors and storage errors leave the stored record untouched.
/// * **Delete**: `on_delete`, remove from storage, remove from the store.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: BTreeMap<T::Id, T>,
    storage: Box<dyn Storage<T>>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a volatile `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the capacity of the request channel; when it is full, client calls wait.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        Self::assemble(buffer_size, BTreeMap::new(), Box::new(MemoryStorage))
    }

    /// Creates an actor backed by `storage`, preloading every record it holds.
    pub fn with_storage<S>(
        buffer_size: usize,
        storage: S,
    ) -> Result<(Self, ResourceClient<T>), FrameworkError>
    where
        S: Storage<T>,
    {
        let store = storage
            .load()?
            .into_iter()
            .map(|item| (item.id().clone(), item))
            .collect::<BTreeMap<_, _>>();
        debug!(records = store.len(), "Loaded records from storage");
        Ok(Self::assemble(buffer_size, store, Box::new(storage)))
    }

    fn assemble(
        buffer_size: usize,
        store: BTreeMap<T::Id, T>,
        storage: Box<dyn Storage<T>>,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store,
            storage,
        };
        (actor, ResourceClient::new(sender))
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    ///
    /// The `context` argument is injected into every entity hook.
    pub async fn run(mut self, context: T::Context) {
        // "Order" instead of "taxi_dispatch::model::order::Order"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, size = self.store.len(), "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = T::next_id(self.store.keys().next_back(), &params);
                    if self.store.contains_key(&id) {
                        warn!(entity_type, %id, "Already exists");
                        let _ = respond_to.send(Err(FrameworkError::AlreadyExists(id.to_string())));
                        continue;
                    }

                    let mut item = match T::from_create_params(id.clone(), params) {
                        Ok(item) => item,
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                    };
                    if let Err(e) = item.on_create(&context).await {
                        warn!(entity_type, error = %e, "on_create failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    if let Err(e) = self.storage.persist(&item) {
                        warn!(entity_type, %id, error = %e, "Persist failed");
                        let _ = respond_to.send(Err(e.into()));
                        continue;
                    }
                    self.store.insert(id.clone(), item);
                    info!(entity_type, %id, size = self.store.len(), "Created");
                    let _ = respond_to.send(Ok(id));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { query, respond_to } => {
                    let items: Vec<T> = self
                        .store
                        .values()
                        .filter(|item| item.matches(&query))
                        .cloned()
                        .collect();
                    debug!(entity_type, ?query, matched = items.len(), "List");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(mut item) = self.store.get(&id).cloned() else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = item.on_update(update, &context).await {
                        warn!(entity_type, %id, error = %e, "Update failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    if let Err(e) = self.storage.persist(&item) {
                        warn!(entity_type, %id, error = %e, "Persist failed");
                        let _ = respond_to.send(Err(e.into()));
                        continue;
                    }
                    self.store.insert(id.clone(), item.clone());
                    info!(entity_type, %id, "Updated");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let Some(item) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = item.on_delete(&context).await {
                        warn!(entity_type, %id, error = %e, "on_delete failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    if let Err(e) = self.storage.remove(&id) {
                        warn!(entity_type, %id, error = %e, "Storage remove failed");
                        let _ = respond_to.send(Err(e.into()));
                        continue;
                    }
                    self.store.remove(&id);
                    info!(entity_type, %id, size = self.store.len(), "Deleted");
                    let _ = respond_to.send(Ok(()));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let Some(mut item) = self.store.get(&id).cloned() else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let outcome = match item.handle_action(action, &context).await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Action failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                    };
                    if let Err(e) = self.storage.persist(&item) {
                        warn!(entity_type, %id, error = %e, "Persist failed");
                        let _ = respond_to.send(Err(e.into()));
                        continue;
                    }
                    self.store.insert(id.clone(), item);
                    info!(entity_type, %id, "Action ok");
                    let _ = respond_to.send(Ok(outcome));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}
