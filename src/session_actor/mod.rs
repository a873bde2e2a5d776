//! # Session Actor
//!
//! The session store: one [`Session`] per rider, keyed by [`RiderId`](crate::model::RiderId).
//! Sessions are created explicitly on a rider's first message and removed by `/stop`.
//!
//! - [`entity`] - step transitions and the [`ActorEntity`](resource_actor::ActorEntity) impl
//! - [`actions`] - [`SessionAction`]
//! - [`error`] - [`SessionError`]

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::SessionClient;
use crate::model::Session;
use resource_actor::{FrameworkError, ResourceActor, Storage};

/// Creates a volatile Session actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Session>, SessionClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, SessionClient::new(generic_client))
}

/// Creates a Session actor that writes through `storage`.
pub fn with_storage<S>(
    buffer_size: usize,
    storage: S,
) -> Result<(ResourceActor<Session>, SessionClient), FrameworkError>
where
    S: Storage<Session>,
{
    let (actor, generic_client) = ResourceActor::with_storage(buffer_size, storage)?;
    Ok((actor, SessionClient::new(generic_client)))
}
