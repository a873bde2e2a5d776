//! # Taxi Dispatch
//!
//! A ride-request relay between riders and a pool of drivers, built on single-writer record
//! stores from the `resource-actor` crate.
//!
//! Riders talk to the dispatcher in a private chat: a short guided conversation collects pickup,
//! dropoff, contact and an optional comment, then opens an order. Open orders are announced in a
//! shared driver channel with an Accept button; the first driver to press it gets the order, and
//! the rider is told who is coming.
//!
//! ## Module Tour
//!
//! ### 1. Records ([`model`], [`order_actor`], [`session_actor`])
//! - [`Order`](model::Order) moves `new -> open -> accepted | declined` and carries three
//!   one-shot delivery flags.
//! - [`Session`](model::Session) is where a rider is in the conversation.
//! - Each lives in its own [`ResourceActor`](resource_actor::ResourceActor). Every status change
//!   is an action checked and applied in one actor turn; the driver claim is a compare-and-set.
//!
//! ### 2. Clients ([`clients`])
//! [`OrderClient`](clients::OrderClient) and [`SessionClient`](clients::SessionClient) turn
//! requests into named operations and map framework errors back into domain errors.
//!
//! ### 3. Behaviour
//! - [`conversation`] - the rider state machine
//! - [`sync`] - the polling synchronizer with flag-gated, idempotent delivery
//! - [`claim`] - the driver claim resolver
//!
//! ### 4. Edges
//! - [`transport`] - the chat API seam ([`ChatTransport`](transport::ChatTransport)) and the
//!   geocoder seam
//! - [`config`] - YAML configuration
//! - [`lifecycle`] - [`DispatchSystem`](lifecycle::DispatchSystem), which wires it all together
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run -- dispatch.yaml
//! ```

pub mod claim;
pub mod clients;
pub mod config;
pub mod conversation;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod session_actor;
pub mod sync;
pub mod transport;

pub use error::DispatchError;
