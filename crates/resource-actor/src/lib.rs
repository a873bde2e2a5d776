//! # Resource Actor
//!
//! Building blocks for single-writer record stores on top of the actor model: each entity
//! type gets one task that owns its records, and everything else talks to that task through
//! a cloneable client.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - the record, its DTOs, actions and filters
//! 2. **Runtime Layer** ([`ResourceActor`]) - sequential message processing over an ordered store
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - type-safe requests
//! 4. **Persistence Layer** ([`Storage`]) - write-through backends (memory, sled)
//!
//! ## Why a single writer
//!
//! Requests for one entity type are handled strictly one at a time. A custom action that
//! reads a field and writes another is therefore a compare-and-set from every caller's point
//! of view, without locks or transactions.
//!
//! ```rust
//! use resource_actor::{ActorEntity, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Ticket { id: u32, holder: Option<String> }
//!
//! #[derive(Debug)] struct TicketCreate;
//! #[derive(Debug)] struct TicketUpdate;
//! #[derive(Debug)] enum TicketAction { Take(String) }
//! #[derive(Debug)] struct AnyTicket;
//! #[derive(Debug, thiserror::Error)] #[error("ticket error")] struct TicketError;
//!
//! #[async_trait]
//! impl ActorEntity for Ticket {
//!     type Id = u32;
//!     type Create = TicketCreate;
//!     type Update = TicketUpdate;
//!     type Action = TicketAction;
//!     type ActionResult = bool;
//!     type Query = AnyTicket;
//!     type Context = ();
//!     type Error = TicketError;
//!
//!     fn id(&self) -> &u32 { &self.id }
//!     fn next_id(last: Option<&u32>, _: &TicketCreate) -> u32 { last.map_or(1, |id| id + 1) }
//!     fn from_create_params(id: u32, _: TicketCreate) -> Result<Self, TicketError> {
//!         Ok(Self { id, holder: None })
//!     }
//!     fn matches(&self, _: &AnyTicket) -> bool { true }
//!     async fn on_update(&mut self, _: TicketUpdate, _: &()) -> Result<(), TicketError> { Ok(()) }
//!     async fn handle_action(&mut self, action: TicketAction, _: &()) -> Result<bool, TicketError> {
//!         match action {
//!             TicketAction::Take(name) if self.holder.is_none() => {
//!                 self.holder = Some(name);
//!                 Ok(true)
//!             }
//!             TicketAction::Take(_) => Ok(false),
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Ticket>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client.create(TicketCreate).await.unwrap();
//!     assert!(client.perform_action(id, TicketAction::Take("a".into())).await.unwrap());
//!     assert!(!client.perform_action(id, TicketAction::Take("b".into())).await.unwrap());
//! }
//! ```
//!
//! ## Context Injection
//!
//! Dependencies are handed to `run(context)` rather than to `new()`, so actors can be created
//! first and wired afterwards.
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers requests from a queue of expectations, which makes store
//! failures trivial to simulate.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod storage;
pub mod tracing;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
pub use storage::{MemoryStorage, SledStorage, Storage, StorageError};
