//! Plain records and DTOs. The [`ActorEntity`](resource_actor::ActorEntity) implementations live
//! next to each actor ([`crate::order_actor`], [`crate::session_actor`]).

pub mod channel;
pub mod locale;
pub mod order;
pub mod session;

pub use channel::*;
pub use locale::*;
pub use order::*;
pub use session::*;
