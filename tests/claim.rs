mod common;

use common::*;
use resource_actor::ActorClient;
use std::sync::Arc;
use taxi_dispatch::claim::{ClaimResolver, ClaimResponse};
use taxi_dispatch::clients::OrderClient;
use taxi_dispatch::model::{ChatId, Locale, MessageRef, OrderId, OrderStatus};
use taxi_dispatch::order_actor::OrderError;
use taxi_dispatch::sync::Synchronizer;
use taxi_dispatch::transport::{CallbackPayload, DriverCallback, RecordingTransport};
use taxi_dispatch::DispatchError;

fn resolver(orders: &OrderClient, transport: &Arc<RecordingTransport>) -> ClaimResolver {
    ClaimResolver::new(orders.clone(), transport.clone(), Locale::En)
}

fn accept(order_id: u64, driver: &str, chat: i64) -> DriverCallback {
    DriverCallback {
        driver_name: driver.to_string(),
        driver_chat: ChatId(chat),
        payload: CallbackPayload::Accept {
            order_id: OrderId(order_id),
        },
        message_ref: None,
    }
}

/// Opens `count` orders and announces them all.
async fn announced_orders(orders: &OrderClient, transport: &Arc<RecordingTransport>, count: i64) {
    for rider in 1..=count {
        open_order(orders, rider, "Main St", "Oak Ave").await;
    }
    let sync = Synchronizer::new(orders.clone(), transport.clone(), DRIVER_CHANNEL, Locale::En);
    assert_eq!(sync.run_once().await.unwrap().announced, count as usize);
}

#[tokio::test]
async fn two_drivers_racing_for_order_seven_get_one_winner() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    announced_orders(&orders, &transport, 7).await;
    let resolver = resolver(&orders, &transport);

    let (ivan, olga) = tokio::join!(
        resolver.resolve(accept(7, "Ivan", 501)),
        resolver.resolve(accept(7, "Olga", 502)),
    );
    let responses = [ivan.unwrap(), olga.unwrap()];

    let winners: Vec<_> = responses
        .iter()
        .filter_map(|r| match r {
            ClaimResponse::Accepted(order) => Some(order.driver_name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(winners.len(), 1);
    let loser_chat = if winners[0] == "Ivan" { 502 } else { 501 };
    assert!(responses.iter().any(|r| matches!(
        r,
        ClaimResponse::AlreadyTaken {
            order_id: OrderId(7),
            status: OrderStatus::Accepted
        }
    )));

    let order = orders.get(OrderId(7)).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Accepted);
    assert_eq!(order.driver_name, winners[0]);

    let to_loser = transport.delivered_to(ChatId(loser_chat));
    assert_eq!(to_loser.len(), 1);
    assert_eq!(to_loser[0].message.text, "Order #7 is already taken");
}

#[tokio::test]
async fn many_concurrent_claims_produce_exactly_one_acceptance() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    announced_orders(&orders, &transport, 1).await;
    let resolver = Arc::new(resolver(&orders, &transport));

    let handles: Vec<_> = (0..16)
        .map(|n| {
            let resolver = resolver.clone();
            tokio::spawn(async move {
                resolver
                    .resolve(accept(1, &format!("Driver {n}"), 600 + n))
                    .await
            })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            ClaimResponse::Accepted(_) => accepted += 1,
            ClaimResponse::AlreadyTaken { .. } => {}
            other => panic!("unexpected response {other:?}"),
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(transport.edits().len(), 1);
}

#[tokio::test]
async fn winner_sees_the_banner_and_gets_the_details() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    announced_orders(&orders, &transport, 1).await;
    let announcement = transport.delivered_to(DRIVER_CHANNEL)[0].message_ref;

    let response = resolver(&orders, &transport)
        .resolve(accept(1, "  Ivan ", 501))
        .await
        .unwrap();

    let ClaimResponse::Accepted(order) = response else {
        panic!("expected the claim to win, got {response:?}");
    };
    assert_eq!(order.driver_name, "Ivan");

    let edits = transport.edits();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].message_ref, announcement);
    assert_eq!(
        edits[0].text,
        "New order #1\nMain St -> Oak Ave\n\nAccepted! Driver: Ivan"
    );

    let to_driver = transport.delivered_to(ChatId(501));
    assert_eq!(to_driver.len(), 1);
    assert!(to_driver[0].message.text.starts_with("You accepted order #1"));
    assert!(to_driver[0].message.text.contains("Contact: +1555"));
}

#[tokio::test]
async fn callback_message_ref_takes_precedence() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    announced_orders(&orders, &transport, 1).await;
    let pressed = MessageRef {
        chat_id: DRIVER_CHANNEL,
        message_id: 99,
    };

    let mut callback = accept(1, "Ivan", 501);
    callback.message_ref = Some(pressed);
    resolver(&orders, &transport).resolve(callback).await.unwrap();

    assert_eq!(transport.edits()[0].message_ref, pressed);
}

#[tokio::test]
async fn unknown_order_is_reported_to_the_driver() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());

    let response = resolver(&orders, &transport)
        .resolve(accept(42, "Ivan", 501))
        .await
        .unwrap();

    assert_eq!(
        response,
        ClaimResponse::NotFound {
            order_id: OrderId(42)
        }
    );
    let to_driver = transport.delivered_to(ChatId(501));
    assert_eq!(to_driver[0].message.text, "Order #42 not found");
    assert!(transport.edits().is_empty());
}

#[tokio::test]
async fn declined_order_cannot_be_claimed() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    announced_orders(&orders, &transport, 1).await;
    orders.decline(OrderId(1)).await.unwrap();

    let response = resolver(&orders, &transport)
        .resolve(accept(1, "Ivan", 501))
        .await
        .unwrap();

    assert_eq!(
        response,
        ClaimResponse::AlreadyTaken {
            order_id: OrderId(1),
            status: OrderStatus::Declined
        }
    );
    let order = orders.get(OrderId(1)).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Declined);
    assert_eq!(order.driver_name, "");
}

#[tokio::test]
async fn blank_driver_name_is_rejected_and_the_order_stays_open() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    announced_orders(&orders, &transport, 1).await;

    let result = resolver(&orders, &transport)
        .resolve(accept(1, "   ", 501))
        .await;

    assert!(matches!(
        result,
        Err(DispatchError::Order(OrderError::EmptyDriverName))
    ));
    assert_eq!(
        orders.get(OrderId(1)).await.unwrap().unwrap().status,
        OrderStatus::Open
    );
}

#[tokio::test]
async fn failed_banner_edit_does_not_undo_the_claim() {
    let (orders, _) = stores();
    let transport = Arc::new(RecordingTransport::new());
    announced_orders(&orders, &transport, 1).await;

    transport.fail_next(1);
    let response = resolver(&orders, &transport)
        .resolve(accept(1, "Ivan", 501))
        .await
        .unwrap();

    assert!(matches!(response, ClaimResponse::Accepted(_)));
    assert!(transport.edits().is_empty());
    assert_eq!(transport.delivered_to(ChatId(501)).len(), 1);
    assert_eq!(
        orders.get(OrderId(1)).await.unwrap().unwrap().status,
        OrderStatus::Accepted
    );
}
