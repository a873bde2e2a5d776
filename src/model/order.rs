use crate::model::{GeoPoint, MessageRef, RiderId};
use minicbor::{Decode, Encode};
use std::fmt::Display;

/// Sequential order number, assigned by the order actor as `max + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
#[cbor(transparent)]
pub struct OrderId(#[n(0)] pub u64);

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub enum OrderStatus {
    #[n(0)]
    New,
    #[n(1)]
    Open,
    #[n(2)]
    Accepted,
    #[n(3)]
    Declined,
}

impl OrderStatus {
    /// Position in the lifecycle. `Accepted` and `Declined` share the terminal rank.
    pub fn rank(self) -> u8 {
        match self {
            OrderStatus::New => 0,
            OrderStatus::Open => 1,
            OrderStatus::Accepted | OrderStatus::Declined => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::New => "new",
            OrderStatus::Open => "open",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Declined => "declined",
        };
        f.write_str(name)
    }
}

/// Free-text address with the coordinates it was resolved from, if any.
///
/// Typed addresses and location shares end up in the same shape, so nothing downstream cares
/// which one the rider used.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Address {
    #[n(0)]
    pub text: String,
    #[n(1)]
    pub coordinates: Option<GeoPoint>,
}

impl Address {
    pub fn typed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            coordinates: None,
        }
    }

    pub fn located(text: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            text: text.into(),
            coordinates: Some(point),
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// The three one-shot delivery flags. Each is set once its side effect was acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryFlag {
    /// The rider was told who accepted the order.
    RiderNotified,
    /// The order was announced in the driver channel.
    DriverChannelNotified,
    /// The announcement of a declined order was withdrawn.
    DeclineNotified,
}

/// A ride request.
///
/// # Actor Framework
/// Managed by a [`ResourceActor`](resource_actor::ResourceActor); see
/// [`crate::order_actor`] for the transitions it accepts.
///
/// # Lifecycle
/// `New` while the rider fills in fields, `Open` once published, then exactly one of
/// `Accepted` (a driver claimed it) or `Declined` (the rider cancelled it). Orders are never
/// deleted.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Order {
    #[n(0)]
    pub id: OrderId,
    #[n(1)]
    pub rider_id: RiderId,
    #[n(2)]
    pub rider_display_name: String,
    #[n(3)]
    pub status: OrderStatus,
    /// Empty until the order is accepted.
    #[n(4)]
    pub driver_name: String,
    #[n(5)]
    pub pickup: Option<Address>,
    #[n(6)]
    pub dropoff: Option<Address>,
    #[n(7)]
    pub contact: String,
    /// Empty when the rider skipped it.
    #[n(8)]
    pub comment: String,
    #[n(9)]
    pub channel_message_ref: Option<MessageRef>,
    #[n(10)]
    pub rider_notified: bool,
    #[n(11)]
    pub driver_channel_notified: bool,
    #[n(12)]
    pub decline_notified: bool,
    /// Unix seconds.
    #[n(13)]
    pub created_at: i64,
}

impl Order {
    pub fn new(id: OrderId, rider_id: RiderId, rider_display_name: impl Into<String>) -> Self {
        Self {
            id,
            rider_id,
            rider_display_name: rider_display_name.into(),
            status: OrderStatus::New,
            driver_name: String::new(),
            pickup: None,
            dropoff: None,
            contact: String::new(),
            comment: String::new(),
            channel_message_ref: None,
            rider_notified: false,
            driver_channel_notified: false,
            decline_notified: false,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn flag(&self, flag: DeliveryFlag) -> bool {
        match flag {
            DeliveryFlag::RiderNotified => self.rider_notified,
            DeliveryFlag::DriverChannelNotified => self.driver_channel_notified,
            DeliveryFlag::DeclineNotified => self.decline_notified,
        }
    }

    pub fn pickup_text(&self) -> &str {
        self.pickup.as_ref().map_or("", |a| a.text.as_str())
    }

    pub fn dropoff_text(&self) -> &str {
        self.dropoff.as_ref().map_or("", |a| a.text.as_str())
    }
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub rider_id: RiderId,
    pub rider_display_name: String,
}

/// Field edits, accepted only while the order is `New`.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub pickup: Option<Address>,
    pub dropoff: Option<Address>,
    pub contact: Option<String>,
    pub comment: Option<String>,
}

/// Filters for `list`.
#[derive(Debug, Clone)]
pub enum OrderQuery {
    All,
    /// Orders in `status` whose `flag` is still unset.
    Pending {
        status: OrderStatus,
        flag: DeliveryFlag,
    },
    ByRider {
        rider_id: RiderId,
        status: OrderStatus,
    },
}
