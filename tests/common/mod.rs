#![allow(dead_code)]

use std::sync::Arc;
use taxi_dispatch::clients::{OrderClient, SessionClient};
use taxi_dispatch::conversation::ConversationMachine;
use taxi_dispatch::model::{
    Address, ChatId, Locale, OrderCreate, OrderId, OrderUpdate, RiderId,
};
use taxi_dispatch::transport::{Geocoder, NoopGeocoder, RiderProfile, RiderUpdate};
use taxi_dispatch::{order_actor, session_actor};

pub const DRIVER_CHANNEL: ChatId = ChatId(-100);
pub const ADMIN_CHANNEL: ChatId = ChatId(-200);

/// Spawns volatile order and session actors.
pub fn stores() -> (OrderClient, SessionClient) {
    let (order_actor, orders) = order_actor::new(16);
    let (session_actor, sessions) = session_actor::new(16);
    tokio::spawn(order_actor.run(()));
    tokio::spawn(session_actor.run(()));
    (orders, sessions)
}

pub fn machine(orders: &OrderClient, sessions: &SessionClient) -> ConversationMachine {
    machine_with(orders, sessions, Arc::new(NoopGeocoder))
}

pub fn machine_with(
    orders: &OrderClient,
    sessions: &SessionClient,
    geocoder: Arc<dyn Geocoder>,
) -> ConversationMachine {
    ConversationMachine::new(
        orders.clone(),
        sessions.clone(),
        geocoder,
        ADMIN_CHANNEL,
        Locale::En,
    )
}

pub fn rider(id: i64) -> RiderProfile {
    RiderProfile {
        rider_id: RiderId(id),
        display_name: format!("Rider {id}"),
        profile_link: Some(format!("@rider{id}")),
    }
}

pub fn says(id: i64, text: &str) -> RiderUpdate {
    RiderUpdate::text(rider(id), text)
}

/// Creates and publishes an order directly through the store.
pub async fn open_order(orders: &OrderClient, rider_id: i64, pickup: &str, dropoff: &str) -> OrderId {
    let id = orders
        .create_order(OrderCreate {
            rider_id: RiderId(rider_id),
            rider_display_name: format!("Rider {rider_id}"),
        })
        .await
        .unwrap();
    orders
        .update_fields(
            id,
            OrderUpdate {
                pickup: Some(Address::typed(pickup)),
                dropoff: Some(Address::typed(dropoff)),
                contact: Some("+1555".into()),
                comment: None,
            },
        )
        .await
        .unwrap();
    orders.publish(id).await.unwrap();
    id
}
