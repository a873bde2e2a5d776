//! # Session Client
//!
//! High-level API for the session store.
use crate::model::{OrderId, RiderId, Session, SessionCreate, SessionUpdate};
use crate::session_actor::{SessionAction, SessionError};
use async_trait::async_trait;
use resource_actor::{ActorClient, FrameworkError, ResourceClient};
use tracing::{debug, info, instrument};

/// Client for interacting with the Session actor.
#[derive(Clone)]
pub struct SessionClient {
    inner: ResourceClient<Session>,
}

#[async_trait]
impl ActorClient<Session> for SessionClient {
    type Error = SessionError;

    fn inner(&self) -> &ResourceClient<Session> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::EntityError(inner) => match inner.downcast::<SessionError>() {
                Ok(err) => *err,
                Err(other) => SessionError::Store(other.to_string()),
            },
            FrameworkError::NotFound(id) => SessionError::NotFound(id),
            other => SessionError::Store(other.to_string()),
        }
    }
}

impl SessionClient {
    pub fn new(inner: ResourceClient<Session>) -> Self {
        Self { inner }
    }

    /// Returns the rider's session, creating it on first contact.
    #[instrument(skip(self, params), fields(rider_id = %params.rider_id))]
    pub async fn ensure(&self, params: SessionCreate) -> Result<Session, SessionError> {
        if let Some(session) = self.get(params.rider_id).await? {
            return Ok(session);
        }
        let rider_id = self
            .inner
            .create(params)
            .await
            .map_err(Self::map_error)?;
        info!(%rider_id, "Session opened");
        self.get(rider_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(rider_id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn refresh_profile(
        &self,
        rider_id: RiderId,
        update: SessionUpdate,
    ) -> Result<Session, SessionError> {
        debug!("Sending request");
        self.inner
            .update(rider_id, update)
            .await
            .map_err(Self::map_error)
    }

    pub async fn begin_order(&self, rider_id: RiderId, order_id: OrderId) -> Result<Session, SessionError> {
        self.act(rider_id, SessionAction::BeginOrder(order_id)).await
    }

    pub async fn advance(&self, rider_id: RiderId) -> Result<Session, SessionError> {
        self.act(rider_id, SessionAction::Advance).await
    }

    pub async fn complete_order(
        &self,
        rider_id: RiderId,
        contact: String,
    ) -> Result<Session, SessionError> {
        self.act(rider_id, SessionAction::CompleteOrder { contact })
            .await
    }

    pub async fn begin_question(&self, rider_id: RiderId) -> Result<Session, SessionError> {
        self.act(rider_id, SessionAction::BeginQuestion).await
    }

    pub async fn finish_question(&self, rider_id: RiderId) -> Result<Session, SessionError> {
        self.act(rider_id, SessionAction::FinishQuestion).await
    }

    pub async fn reset(&self, rider_id: RiderId) -> Result<Session, SessionError> {
        self.act(rider_id, SessionAction::Reset).await
    }

    #[instrument(skip(self))]
    async fn act(&self, rider_id: RiderId, action: SessionAction) -> Result<Session, SessionError> {
        debug!("Sending request");
        self.inner
            .perform_action(rider_id, action)
            .await
            .map_err(Self::map_error)
    }
}
