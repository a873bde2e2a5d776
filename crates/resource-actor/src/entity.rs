//! # ActorEntity Trait
//!
//! The contract every record managed by a [`ResourceActor`](crate::ResourceActor) implements.
//! Associated types pin down the id, the DTOs for create and update, the custom actions and
//! the filter type used by `list`, so a client can never send an order payload to a session
//! actor.
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`]
//! - [`ActorEntity::on_delete`]
//!
//! Both default to `Ok(())`.
//!
//! # Id Assignment
//! The actor owns id assignment. [`ActorEntity::next_id`] receives the greatest id currently
//! stored, which is enough to express a `max + 1` sequence, and the create payload, which is
//! enough for entities keyed by a natural id.

use async_trait::async_trait;
use std::fmt::{Debug, Display};

/// Trait that any resource entity must implement to be managed by ResourceActor.
///
/// # Async & Context
/// Hooks are `async` so they may call other actors. The `Context` associated type is injected
/// into every hook at `run()` time rather than at construction time.
///
/// # Mutation Semantics
/// `on_update` and `handle_action` always run against a *copy* of the stored record. The actor
/// persists and commits that copy only when the hook returns `Ok`, so an error (or a storage
/// failure) never leaves a half-applied record behind.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier. Ordered so the store can be scanned in ascending id order.
    type Id: Ord + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum of resource-specific operations.
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// Filter accepted by `list`.
    type Query: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One enum per actor rather than one per message: clients match on a single type, at the
    /// cost of every action nominally being able to return every variant.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The id this record is stored under.
    fn id(&self) -> &Self::Id;

    /// Chooses the id for a new record. `last` is the greatest id currently in the store.
    fn next_id(last: Option<&Self::Id>, params: &Self::Create) -> Self::Id;

    /// Construct the full Entity from the ID and Payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Whether this record is selected by `query`.
    fn matches(&self, query: &Self::Query) -> bool;

    // --- Lifecycle Hooks (Async) ---

    /// Called after the entity is constructed and before it is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed from the system.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
