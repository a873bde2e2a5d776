//! # Order Client
//!
//! High-level API for the order store.
use crate::model::{
    DeliveryFlag, MessageRef, Order, OrderCreate, OrderId, OrderQuery, OrderStatus, OrderUpdate,
    RiderId,
};
use crate::order_actor::{ClaimOutcome, OrderAction, OrderActionResult, OrderError};
use async_trait::async_trait;
use resource_actor::{ActorClient, FrameworkError, ResourceClient};
use tracing::{debug, instrument};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::EntityError(inner) => match inner.downcast::<OrderError>() {
                Ok(err) => *err,
                Err(other) => OrderError::Store(other.to_string()),
            },
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::Store(other.to_string()),
        }
    }
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<OrderId, OrderError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Writes collected fields. Fails once the order has left `New`.
    #[instrument(skip(self))]
    pub async fn update_fields(&self, id: OrderId, update: OrderUpdate) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn publish(&self, id: OrderId) -> Result<(), OrderError> {
        match self.act(id, OrderAction::Publish).await? {
            OrderActionResult::Publish(()) => Ok(()),
            other => Err(unexpected("Publish", other)),
        }
    }

    /// Conditional `Open -> Accepted`. Exactly one concurrent caller gets `Won`.
    #[instrument(skip(self))]
    pub async fn claim(&self, id: OrderId, driver_name: String) -> Result<ClaimOutcome, OrderError> {
        match self.act(id, OrderAction::Claim { driver_name }).await? {
            OrderActionResult::Claim(outcome) => Ok(outcome),
            other => Err(unexpected("Claim", other)),
        }
    }

    /// Returns whether this call moved the order to `Declined`.
    #[instrument(skip(self))]
    pub async fn decline(&self, id: OrderId) -> Result<bool, OrderError> {
        match self.act(id, OrderAction::Decline).await? {
            OrderActionResult::Decline(declined) => Ok(declined),
            other => Err(unexpected("Decline", other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn mark_rider_notified(&self, id: OrderId) -> Result<(), OrderError> {
        match self.act(id, OrderAction::MarkRiderNotified).await? {
            OrderActionResult::MarkRiderNotified(()) => Ok(()),
            other => Err(unexpected("MarkRiderNotified", other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn mark_channel_posted(
        &self,
        id: OrderId,
        message_ref: Option<MessageRef>,
    ) -> Result<(), OrderError> {
        match self.act(id, OrderAction::MarkChannelPosted(message_ref)).await? {
            OrderActionResult::MarkChannelPosted(()) => Ok(()),
            other => Err(unexpected("MarkChannelPosted", other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn mark_decline_notified(&self, id: OrderId) -> Result<(), OrderError> {
        match self.act(id, OrderAction::MarkDeclineNotified).await? {
            OrderActionResult::MarkDeclineNotified(()) => Ok(()),
            other => Err(unexpected("MarkDeclineNotified", other)),
        }
    }

    /// Orders in `status` whose `flag` is still unset, oldest first.
    pub async fn pending(
        &self,
        status: OrderStatus,
        flag: DeliveryFlag,
    ) -> Result<Vec<Order>, OrderError> {
        self.list(OrderQuery::Pending { status, flag }).await
    }

    /// A rider's orders in `status`, oldest first.
    pub async fn rider_orders(
        &self,
        rider_id: RiderId,
        status: OrderStatus,
    ) -> Result<Vec<Order>, OrderError> {
        self.list(OrderQuery::ByRider { rider_id, status }).await
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}

fn unexpected(action: &str, result: OrderActionResult) -> OrderError {
    OrderError::Store(format!("{action} answered with {result:?}"))
}
