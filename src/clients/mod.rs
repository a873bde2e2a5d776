//! Domain clients wrapping [`ResourceClient`](resource_actor::ResourceClient).
//!
//! They turn generic requests into named operations (`claim`, `begin_order`, ...), unpack
//! action results, and map framework errors back into [`OrderError`](crate::order_actor::OrderError)
//! and [`SessionError`](crate::session_actor::SessionError).

pub mod order_client;
pub mod session_client;

pub use order_client::*;
pub use session_client::*;
