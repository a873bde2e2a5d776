//! Error types for the Order actor.

use crate::model::OrderStatus;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The order's status does not allow the requested operation.
    #[error("Cannot {action} an order in status {from}")]
    InvalidTransition {
        from: OrderStatus,
        action: &'static str,
    },

    /// A field required to publish the order is missing.
    #[error("Order is missing {0}")]
    Incomplete(&'static str),

    /// Claims must name the driver.
    #[error("Driver name must not be empty")]
    EmptyDriverName,

    /// The order store could not be reached or could not persist the change.
    #[error("Order store error: {0}")]
    Store(String),
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::Store(msg)
    }
}
