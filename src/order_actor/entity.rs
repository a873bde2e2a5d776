//! [`ActorEntity`] implementation for [`Order`].
//!
//! The transition rules are plain synchronous methods on `Order` (`edit`, `apply`) so they can
//! be exercised without an actor; the trait hooks only delegate to them.

use super::actions::{ClaimOutcome, OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::model::{Address, Order, OrderCreate, OrderId, OrderQuery, OrderStatus, OrderUpdate};
use async_trait::async_trait;
use resource_actor::ActorEntity;

impl Order {
    /// Applies field edits. Only a `New` order can be edited.
    pub fn edit(&mut self, update: OrderUpdate) -> Result<(), OrderError> {
        if self.status != OrderStatus::New {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                action: "edit",
            });
        }
        if let Some(pickup) = update.pickup {
            self.pickup = Some(pickup);
        }
        if let Some(dropoff) = update.dropoff {
            self.dropoff = Some(dropoff);
        }
        if let Some(contact) = update.contact {
            self.contact = contact;
        }
        if let Some(comment) = update.comment {
            self.comment = comment;
        }
        Ok(())
    }

    /// Applies one action. On `Err` the order is unchanged.
    pub fn apply(&mut self, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::Publish => {
                self.require(OrderStatus::New, "publish")?;
                if !has_text(&self.pickup) {
                    return Err(OrderError::Incomplete("pickup"));
                }
                if !has_text(&self.dropoff) {
                    return Err(OrderError::Incomplete("dropoff"));
                }
                if self.contact.trim().is_empty() {
                    return Err(OrderError::Incomplete("contact"));
                }
                self.status = OrderStatus::Open;
                Ok(OrderActionResult::Publish(()))
            }
            OrderAction::Claim { driver_name } => {
                let driver_name = driver_name.trim();
                if driver_name.is_empty() {
                    return Err(OrderError::EmptyDriverName);
                }
                if self.status != OrderStatus::Open {
                    return Ok(OrderActionResult::Claim(ClaimOutcome::Lost {
                        status: self.status,
                        driver_name: self.driver_name.clone(),
                    }));
                }
                self.status = OrderStatus::Accepted;
                self.driver_name = driver_name.to_string();
                Ok(OrderActionResult::Claim(ClaimOutcome::Won(self.clone())))
            }
            OrderAction::Decline => {
                let declined = self.status == OrderStatus::Open;
                if declined {
                    self.status = OrderStatus::Declined;
                }
                Ok(OrderActionResult::Decline(declined))
            }
            OrderAction::MarkRiderNotified => {
                self.require(OrderStatus::Accepted, "notify the rider of")?;
                self.rider_notified = true;
                Ok(OrderActionResult::MarkRiderNotified(()))
            }
            OrderAction::MarkChannelPosted(message_ref) => {
                // a post can land after the rider already cancelled; keep the ref for withdrawal
                if self.status == OrderStatus::New {
                    return Err(OrderError::InvalidTransition {
                        from: self.status,
                        action: "announce",
                    });
                }
                self.driver_channel_notified = true;
                if message_ref.is_some() {
                    self.channel_message_ref = message_ref;
                }
                Ok(OrderActionResult::MarkChannelPosted(()))
            }
            OrderAction::MarkDeclineNotified => {
                self.require(OrderStatus::Declined, "withdraw")?;
                self.decline_notified = true;
                Ok(OrderActionResult::MarkDeclineNotified(()))
            }
        }
    }

    fn require(&self, status: OrderStatus, action: &'static str) -> Result<(), OrderError> {
        if self.status == status {
            Ok(())
        } else {
            Err(OrderError::InvalidTransition {
                from: self.status,
                action,
            })
        }
    }
}

fn has_text(address: &Option<Address>) -> bool {
    address.as_ref().is_some_and(|a| !a.text.trim().is_empty())
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Query = OrderQuery;
    type Context = ();
    type Error = OrderError;

    fn id(&self) -> &OrderId {
        &self.id
    }

    fn next_id(last: Option<&OrderId>, _params: &OrderCreate) -> OrderId {
        OrderId(last.map_or(1, |id| id.0 + 1))
    }

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        Ok(Order::new(id, params.rider_id, params.rider_display_name))
    }

    fn matches(&self, query: &OrderQuery) -> bool {
        match query {
            OrderQuery::All => true,
            OrderQuery::Pending { status, flag } => self.status == *status && !self.flag(*flag),
            OrderQuery::ByRider { rider_id, status } => {
                self.rider_id == *rider_id && self.status == *status
            }
        }
    }

    async fn on_update(
        &mut self,
        update: OrderUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        self.edit(update)
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        _ctx: &Self::Context,
    ) -> Result<OrderActionResult, Self::Error> {
        self.apply(action)
    }
}
