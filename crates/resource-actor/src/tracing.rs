//! # Tracing Setup
//!
//! Every actor logs with an `entity_type` field (`Order`, `Session`, ...) instead of a module
//! path, so the subscriber hides targets.
//!
//! ```bash
//! RUST_LOG=info cargo run      # lifecycle events, deliveries, claims
//! RUST_LOG=debug cargo run     # full request payloads
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
