//! # Claim Resolver
//!
//! Handles the Accept button in the driver channel. The order actor performs the
//! compare-and-set; this module only reacts to its outcome:
//!
//! - won: the announcement is edited to show the driver, and the driver gets the order details
//! - lost: the driver is told the order is already taken
//! - unknown order: the driver is told so
//!
//! Notifications here are best effort. The rider's confirmation is owned by the synchronizer.

use crate::clients::OrderClient;
use crate::conversation::Prompt;
use crate::error::DispatchError;
use crate::model::{ChatId, Locale, Order, OrderId, OrderStatus};
use crate::order_actor::{ClaimOutcome, OrderError};
use crate::transport::{CallbackPayload, ChatTransport, DriverCallback, OutboundMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum ClaimResponse {
    Accepted(Order),
    AlreadyTaken { order_id: OrderId, status: OrderStatus },
    NotFound { order_id: OrderId },
}

pub struct ClaimResolver {
    orders: OrderClient,
    transport: Arc<dyn ChatTransport>,
    locale: Locale,
}

impl ClaimResolver {
    pub fn new(orders: OrderClient, transport: Arc<dyn ChatTransport>, locale: Locale) -> Self {
        Self {
            orders,
            transport,
            locale,
        }
    }

    #[instrument(skip(self, callback), fields(driver = %callback.driver_name, payload = %callback.payload))]
    pub async fn resolve(&self, callback: DriverCallback) -> Result<ClaimResponse, DispatchError> {
        let CallbackPayload::Accept { order_id } = callback.payload;

        let outcome = match self.orders.claim(order_id, callback.driver_name.clone()).await {
            Ok(outcome) => outcome,
            Err(OrderError::NotFound(_)) => {
                warn!(%order_id, "Claim for unknown order");
                let text = Prompt::OrderNotFound { order_id }.render(self.locale);
                self.tell_driver(callback.driver_chat, text).await;
                return Ok(ClaimResponse::NotFound { order_id });
            }
            Err(e) => return Err(e.into()),
        };

        match outcome {
            ClaimOutcome::Won(order) => {
                info!(%order_id, driver = %order.driver_name, "Order accepted");
                self.mark_announcement(&callback, &order).await;
                let details = Prompt::DriverDetails(&order).render(self.locale);
                self.tell_driver(callback.driver_chat, details).await;
                Ok(ClaimResponse::Accepted(order))
            }
            ClaimOutcome::Lost { status, driver_name } => {
                info!(%order_id, %status, winner = %driver_name, "Claim rejected");
                let text = Prompt::AlreadyTaken { order_id }.render(self.locale);
                self.tell_driver(callback.driver_chat, text).await;
                Ok(ClaimResponse::AlreadyTaken { order_id, status })
            }
        }
    }

    /// Appends the accepted banner to the announcement and drops its button.
    async fn mark_announcement(&self, callback: &DriverCallback, order: &Order) {
        let Some(message_ref) = callback.message_ref.or(order.channel_message_ref) else {
            warn!(order_id = %order.id, "No announcement to update");
            return;
        };
        let announcement = Prompt::Announcement(order).render(self.locale);
        let text = Prompt::AcceptedBanner {
            announcement: &announcement,
            driver_name: &order.driver_name,
        }
        .render(self.locale);
        if let Err(e) = self.transport.edit_message(message_ref, text).await {
            warn!(order_id = %order.id, %message_ref, error = %e, "Announcement not updated");
        }
    }

    async fn tell_driver(&self, chat: ChatId, text: String) {
        if let Err(e) = self.transport.deliver(chat, OutboundMessage::text(text)).await {
            warn!(%chat, error = %e, "Driver reply not delivered");
        }
    }

    /// Resolves driver callbacks until the inbox closes.
    pub async fn listen(self, mut inbox: mpsc::Receiver<DriverCallback>) {
        info!("Driver listener started");
        while let Some(callback) = inbox.recv().await {
            if let Err(e) = self.resolve(callback).await {
                error!(error = %e, "Failed to resolve claim");
            }
        }
        info!("Driver listener stopped");
    }
}
