//! # Order Actor
//!
//! The order store: the single writer for every [`Order`]. All status changes are
//! [`OrderAction`]s, each checked and applied in one actor turn, which is what makes a driver's
//! claim a compare-and-set.
//!
//! ## Structure
//!
//! - [`entity`] - transition rules and the [`ActorEntity`](resource_actor::ActorEntity) impl
//! - [`actions`] - [`OrderAction`], [`ClaimOutcome`], [`OrderActionResult`]
//! - [`error`] - [`OrderError`]
//! - [`new()`] / [`with_storage()`] - factory functions
//!
//! ## Usage
//!
//! ```rust
//! use taxi_dispatch::clients::OrderClient;
//! use taxi_dispatch::model::{OrderCreate, RiderId};
//! use taxi_dispatch::order_actor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, client) = order_actor::new(32);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client
//!         .create_order(OrderCreate { rider_id: RiderId(1), rider_display_name: "Anna".into() })
//!         .await?;
//!     assert_eq!(id.0, 1);
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::OrderClient;
use crate::model::Order;
use resource_actor::{FrameworkError, ResourceActor, Storage};

/// Creates a volatile Order actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, OrderClient::new(generic_client))
}

/// Creates an Order actor that writes through `storage` and starts from what it holds.
pub fn with_storage<S>(
    buffer_size: usize,
    storage: S,
) -> Result<(ResourceActor<Order>, OrderClient), FrameworkError>
where
    S: Storage<Order>,
{
    let (actor, generic_client) = ResourceActor::with_storage(buffer_size, storage)?;
    Ok((actor, OrderClient::new(generic_client)))
}
