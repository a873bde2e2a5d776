use crate::config::ConfigError;
use crate::order_actor::OrderError;
use crate::session_actor::SessionError;
use crate::transport::TransportError;
use resource_actor::{FrameworkError, StorageError};
use thiserror::Error;

/// Everything that can abort a dispatch operation.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Framework(#[from] FrameworkError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
