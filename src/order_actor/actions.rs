//! Custom actions for the Order actor.
//!
//! Every status change goes through an action, so the check of the current status and the
//! write of the new one happen inside a single actor turn.

use crate::model::{MessageRef, Order, OrderStatus};

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// `New -> Open`. Requires pickup, dropoff and contact.
    Publish,
    /// `Open -> Accepted` for the first claimant; everyone else loses.
    Claim { driver_name: String },
    /// `Open -> Declined`. Other statuses are left alone.
    Decline,
    /// Sets `rider_notified`. Only meaningful once accepted.
    MarkRiderNotified,
    /// Sets `driver_channel_notified` and remembers where the announcement was posted.
    MarkChannelPosted(Option<MessageRef>),
    /// Sets `decline_notified`. Only meaningful once declined.
    MarkDeclineNotified,
}

/// Result of a claim attempt. Losing is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// The claim went through; carries the accepted order.
    Won(Order),
    /// Someone else got there first, or the order is no longer open.
    Lost {
        status: OrderStatus,
        driver_name: String,
    },
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    Publish(()),
    Claim(ClaimOutcome),
    /// `true` when this call moved the order to `Declined`.
    Decline(bool),
    MarkRiderNotified(()),
    MarkChannelPosted(()),
    MarkDeclineNotified(()),
}
