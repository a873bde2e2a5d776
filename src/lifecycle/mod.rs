//! Runtime orchestration: starting, wiring and stopping every task of the dispatcher.
//!
//! - [`DispatchSystem`] - owns the store actors, the two listeners and the synchronizer
//!
//! Tracing is installed by the binary with
//! [`resource_actor::tracing::setup_tracing`].

pub mod dispatch_system;

pub use dispatch_system::*;
