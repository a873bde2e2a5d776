//! # Notification Synchronizer
//!
//! Polls the order store and pushes pending notifications out:
//!
//! | Scan | Selects | Side effect | Then sets |
//! |---|---|---|---|
//! | rider notify | `accepted`, `!rider_notified` | confirmation to the rider | `rider_notified` |
//! | announce | `open`, `!driver_channel_notified` | post with an Accept button | `driver_channel_notified` |
//! | withdraw | `declined`, `!decline_notified` | delete the announcement | `decline_notified` |
//!
//! A flag is set only after the transport acknowledged the side effect, so a failed send is
//! retried on the next cycle and a successful one never repeats. Each scan walks its orders in
//! ascending id order.

pub mod ticker;

pub use ticker::*;

use crate::clients::OrderClient;
use crate::conversation::{prompts, Prompt};
use crate::model::{ChatId, DeliveryFlag, Locale, Order, OrderStatus};
use crate::order_actor::OrderError;
use crate::transport::{ChatTransport, OutboundMessage, TransportError};
use std::ops::AddAssign;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// What one or more scan cycles did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub riders_notified: usize,
    pub announced: usize,
    pub withdrawn: usize,
    /// Side effects that failed and stay pending.
    pub failed: usize,
}

impl ScanReport {
    pub fn delivered(&self) -> usize {
        self.riders_notified + self.announced + self.withdrawn
    }
}

impl AddAssign for ScanReport {
    fn add_assign(&mut self, other: Self) {
        self.riders_notified += other.riders_notified;
        self.announced += other.announced;
        self.withdrawn += other.withdrawn;
        self.failed += other.failed;
    }
}

/// Why a single order was skipped this cycle.
#[derive(Debug, Error)]
enum DeliveryError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Order(#[from] OrderError),
}

pub struct Synchronizer {
    orders: OrderClient,
    transport: Arc<dyn ChatTransport>,
    driver_channel: ChatId,
    locale: Locale,
}

impl Synchronizer {
    pub fn new(
        orders: OrderClient,
        transport: Arc<dyn ChatTransport>,
        driver_channel: ChatId,
        locale: Locale,
    ) -> Self {
        Self {
            orders,
            transport,
            driver_channel,
            locale,
        }
    }

    /// Runs all three scans once.
    ///
    /// Per-order failures are counted in the report and left for the next cycle. `Err` means
    /// the store could not be queried at all.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> Result<ScanReport, OrderError> {
        let mut report = ScanReport::default();

        for order in self
            .orders
            .pending(OrderStatus::Accepted, DeliveryFlag::RiderNotified)
            .await?
        {
            match self.notify_rider(&order).await {
                Ok(()) => report.riders_notified += 1,
                Err(e) => {
                    warn!(order_id = %order.id, error = %e, "Rider notification pending");
                    report.failed += 1;
                }
            }
        }

        for order in self
            .orders
            .pending(OrderStatus::Open, DeliveryFlag::DriverChannelNotified)
            .await?
        {
            match self.announce(&order).await {
                Ok(()) => report.announced += 1,
                Err(e) => {
                    warn!(order_id = %order.id, error = %e, "Announcement pending");
                    report.failed += 1;
                }
            }
        }

        for order in self
            .orders
            .pending(OrderStatus::Declined, DeliveryFlag::DeclineNotified)
            .await?
        {
            match self.withdraw(&order).await {
                Ok(()) => report.withdrawn += 1,
                Err(e) => {
                    warn!(order_id = %order.id, error = %e, "Withdrawal pending");
                    report.failed += 1;
                }
            }
        }

        if report != ScanReport::default() {
            info!(?report, "Scan finished");
        }
        Ok(report)
    }

    async fn notify_rider(&self, order: &Order) -> Result<(), DeliveryError> {
        let text = Prompt::RiderConfirmation(order).render(self.locale);
        self.transport
            .deliver(order.rider_id.chat(), OutboundMessage::text(text))
            .await?;
        self.orders.mark_rider_notified(order.id).await?;
        debug!(order_id = %order.id, "Rider notified");
        Ok(())
    }

    async fn announce(&self, order: &Order) -> Result<(), DeliveryError> {
        let message = OutboundMessage::text(Prompt::Announcement(order).render(self.locale))
            .with_keyboard(prompts::accept_button(order.id, self.locale));
        let receipt = self.transport.deliver(self.driver_channel, message).await?;
        self.orders
            .mark_channel_posted(order.id, Some(receipt.message_ref))
            .await?;
        debug!(order_id = %order.id, message_ref = %receipt.message_ref, "Order announced");
        Ok(())
    }

    async fn withdraw(&self, order: &Order) -> Result<(), DeliveryError> {
        if let Some(message_ref) = order.channel_message_ref {
            match self.transport.delete_message(message_ref).await {
                Ok(()) => debug!(order_id = %order.id, %message_ref, "Announcement withdrawn"),
                // Already gone from the channel; nothing left to retry.
                Err(TransportError::Rejected(reason)) => {
                    warn!(order_id = %order.id, %message_ref, %reason, "Announcement not deleted")
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.orders.mark_decline_notified(order.id).await?;
        Ok(())
    }

    /// Scans on every tick until the ticker ends or `shutdown` is cancelled.
    ///
    /// Returns the accumulated report. A cycle whose store query fails is logged and skipped.
    pub async fn run<K: Ticker>(self, mut ticker: K, shutdown: CancellationToken) -> ScanReport {
        info!(driver_channel = %self.driver_channel, "Synchronizer started");
        let mut total = ScanReport::default();
        loop {
            let ticked = tokio::select! {
                _ = shutdown.cancelled() => false,
                ticked = ticker.tick() => ticked,
            };
            if !ticked {
                break;
            }
            match self.run_once().await {
                Ok(report) => total += report,
                Err(e) => error!(error = %e, "Scan skipped"),
            }
        }
        info!(?total, "Synchronizer stopped");
        total
    }
}
