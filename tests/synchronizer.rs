mod common;

use common::*;
use resource_actor::ActorClient;
use std::sync::Arc;
use taxi_dispatch::clients::OrderClient;
use taxi_dispatch::model::{ChatId, Locale, OrderCreate, OrderId, RiderId};
use taxi_dispatch::order_actor::ClaimOutcome;
use taxi_dispatch::sync::{self, ScanReport, Synchronizer};
use taxi_dispatch::transport::{CallbackPayload, Keyboard, RecordingTransport, TransportError};
use tokio_util::sync::CancellationToken;

fn synchronizer(orders: &OrderClient, transport: &Arc<RecordingTransport>) -> Synchronizer {
    Synchronizer::new(orders.clone(), transport.clone(), DRIVER_CHANNEL, Locale::En)
}

#[tokio::test]
async fn open_order_is_announced_exactly_once() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    let sync = synchronizer(&orders, &transport);
    let id = open_order(&orders, 10, "Main St", "Oak Ave").await;

    let first = sync.run_once().await.unwrap();
    assert_eq!(first.announced, 1);
    assert_eq!(first.failed, 0);

    let posted = transport.delivered_to(DRIVER_CHANNEL);
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].message.text, "New order #1\nMain St -> Oak Ave");
    let Keyboard::Inline(buttons) = &posted[0].message.keyboard else {
        panic!("announcement needs an Accept button");
    };
    assert_eq!(buttons[0].payload, CallbackPayload::Accept { order_id: id });

    let order = orders.get(id).await.unwrap().unwrap();
    assert!(order.driver_channel_notified);
    assert_eq!(order.channel_message_ref, Some(posted[0].message_ref));

    let second = sync.run_once().await.unwrap();
    assert_eq!(second, ScanReport::default());
    assert_eq!(transport.delivered_to(DRIVER_CHANNEL).len(), 1);
}

#[tokio::test]
async fn new_orders_are_not_announced() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    orders
        .create_order(OrderCreate {
            rider_id: RiderId(10),
            rider_display_name: "Rider 10".into(),
        })
        .await
        .unwrap();

    let report = synchronizer(&orders, &transport).run_once().await.unwrap();

    assert_eq!(report, ScanReport::default());
    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn failed_announcement_is_retried_on_the_next_scan() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    let sync = synchronizer(&orders, &transport);
    let id = open_order(&orders, 10, "Main St", "Oak Ave").await;

    transport.fail_next(1);
    let report = sync.run_once().await.unwrap();
    assert_eq!(report.announced, 0);
    assert_eq!(report.failed, 1);
    assert!(!orders.get(id).await.unwrap().unwrap().driver_channel_notified);

    let report = sync.run_once().await.unwrap();
    assert_eq!(report.announced, 1);
    assert_eq!(transport.delivered_to(DRIVER_CHANNEL).len(), 1);
    assert!(orders.get(id).await.unwrap().unwrap().driver_channel_notified);
}

#[tokio::test]
async fn accepted_order_notifies_the_rider_once() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    let sync = synchronizer(&orders, &transport);
    let id = open_order(&orders, 10, "Main St", "Oak Ave").await;
    sync.run_once().await.unwrap();
    let outcome = orders.claim(id, "Ivan".into()).await.unwrap();
    assert!(matches!(outcome, ClaimOutcome::Won(_)));

    let report = sync.run_once().await.unwrap();
    assert_eq!(report.riders_notified, 1);
    let to_rider = transport.delivered_to(ChatId(10));
    assert_eq!(to_rider.len(), 1);
    assert_eq!(
        to_rider[0].message.text,
        "Order #1 accepted! Driver: Ivan\nMain St -> Oak Ave"
    );
    assert!(orders.get(id).await.unwrap().unwrap().rider_notified);

    assert_eq!(sync.run_once().await.unwrap(), ScanReport::default());
    assert_eq!(transport.delivered_to(ChatId(10)).len(), 1);
}

#[tokio::test]
async fn failed_rider_confirmation_is_retried_on_the_next_scan() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    let sync = synchronizer(&orders, &transport);
    let id = open_order(&orders, 10, "Main St", "Oak Ave").await;
    sync.run_once().await.unwrap();
    orders.claim(id, "Ivan".into()).await.unwrap();

    transport.fail_next(1);
    let report = sync.run_once().await.unwrap();
    assert_eq!(report.riders_notified, 0);
    assert_eq!(report.failed, 1);
    assert!(transport.delivered_to(ChatId(10)).is_empty());
    assert!(!orders.get(id).await.unwrap().unwrap().rider_notified);

    let report = sync.run_once().await.unwrap();
    assert_eq!(report.riders_notified, 1);
    assert!(orders.get(id).await.unwrap().unwrap().rider_notified);

    assert_eq!(sync.run_once().await.unwrap(), ScanReport::default());
    assert_eq!(transport.delivered_to(ChatId(10)).len(), 1);
}

#[tokio::test]
async fn declined_order_announcement_is_withdrawn() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    let sync = synchronizer(&orders, &transport);
    let id = open_order(&orders, 10, "Main St", "Oak Ave").await;
    sync.run_once().await.unwrap();
    let posted = transport.delivered_to(DRIVER_CHANNEL)[0].message_ref;

    assert!(orders.decline(id).await.unwrap());
    let report = sync.run_once().await.unwrap();

    assert_eq!(report.withdrawn, 1);
    assert_eq!(transport.deleted(), vec![posted]);
    assert!(orders.get(id).await.unwrap().unwrap().decline_notified);
    assert_eq!(sync.run_once().await.unwrap(), ScanReport::default());
}

#[tokio::test]
async fn unreachable_chat_api_leaves_the_withdrawal_pending() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    let sync = synchronizer(&orders, &transport);
    let id = open_order(&orders, 10, "Main St", "Oak Ave").await;
    sync.run_once().await.unwrap();
    let posted = transport.delivered_to(DRIVER_CHANNEL)[0].message_ref;
    orders.decline(id).await.unwrap();

    transport.fail_next(1);
    let report = sync.run_once().await.unwrap();
    assert_eq!(report.withdrawn, 0);
    assert_eq!(report.failed, 1);
    assert!(transport.deleted().is_empty());
    assert!(!orders.get(id).await.unwrap().unwrap().decline_notified);

    let report = sync.run_once().await.unwrap();
    assert_eq!(report.withdrawn, 1);
    assert_eq!(transport.deleted(), vec![posted]);
    assert!(orders.get(id).await.unwrap().unwrap().decline_notified);
}

#[tokio::test]
async fn announcement_already_gone_counts_as_withdrawn() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    let sync = synchronizer(&orders, &transport);
    let id = open_order(&orders, 10, "Main St", "Oak Ave").await;
    sync.run_once().await.unwrap();
    orders.decline(id).await.unwrap();

    transport.fail_next_with(1, TransportError::Rejected("message to delete not found".into()));
    let report = sync.run_once().await.unwrap();

    assert_eq!(report.withdrawn, 1);
    assert_eq!(report.failed, 0);
    assert!(transport.deleted().is_empty());
    assert!(orders.get(id).await.unwrap().unwrap().decline_notified);
    assert_eq!(sync.run_once().await.unwrap(), ScanReport::default());
}

#[tokio::test]
async fn order_declined_before_announcement_has_nothing_to_delete() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    let sync = synchronizer(&orders, &transport);
    let id = open_order(&orders, 10, "Main St", "Oak Ave").await;
    orders.decline(id).await.unwrap();

    let report = sync.run_once().await.unwrap();

    assert_eq!(report.announced, 0);
    assert_eq!(report.withdrawn, 1);
    assert!(transport.deleted().is_empty());
    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn each_scan_walks_orders_in_ascending_id_order() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    for rider in [30, 10, 20] {
        open_order(&orders, rider, "A", "B").await;
    }

    let report = synchronizer(&orders, &transport).run_once().await.unwrap();

    assert_eq!(report.announced, 3);
    let ids: Vec<String> = transport
        .delivered_to(DRIVER_CHANNEL)
        .iter()
        .map(|d| d.message.text.lines().next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(ids, vec!["New order #1", "New order #2", "New order #3"]);
}

#[tokio::test]
async fn run_loop_scans_on_every_tick_until_the_ticker_ends() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    open_order(&orders, 10, "Main St", "Oak Ave").await;
    open_order(&orders, 11, "Elm St", "Pine Rd").await;

    let (trigger, ticker) = sync::manual();
    let handle = tokio::spawn(synchronizer(&orders, &transport).run(ticker, CancellationToken::new()));
    assert!(trigger.fire());
    assert!(trigger.fire());
    drop(trigger);

    let total = handle.await.unwrap();
    assert_eq!(total.announced, 2);
    assert_eq!(transport.delivered_to(DRIVER_CHANNEL).len(), 2);
    assert_eq!(
        orders.get(OrderId(2)).await.unwrap().unwrap().channel_message_ref.map(|r| r.message_id),
        Some(2)
    );
}

#[tokio::test]
async fn cancellation_stops_a_waiting_loop() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    let (_trigger, ticker) = sync::manual();
    let shutdown = CancellationToken::new();

    let handle = tokio::spawn(synchronizer(&orders, &transport).run(ticker, shutdown.clone()));
    shutdown.cancel();

    assert_eq!(handle.await.unwrap(), ScanReport::default());
}
