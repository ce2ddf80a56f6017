use chrono::Utc;
use orderflow_relay::message::{InboxMessage, MessageStatus};
use orderflow_warehouse::events::build_registry;
use serde_json::json;

use crate::helpers::{MockInventoryRepo, inventory_item};

fn inbox_message(event_type: &str, payload: serde_json::Value) -> InboxMessage {
    InboxMessage {
        id: 1,
        message_id: "m-1".to_owned(),
        sender_id: None,
        event_type: event_type.to_owned(),
        payload,
        status: MessageStatus::Processing,
        retry_count: 0,
        exchange: None,
        routing_key: None,
        error: None,
        locked_at: None,
        locked_by: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn order_created_reserves_stock_and_emits_reservation() {
    let repo = MockInventoryRepo::with_items(vec![inventory_item("PROD-001", "Laptop", 100, 0)]);
    let registry = build_registry(repo.clone());

    registry
        .dispatch(inbox_message(
            "order.created",
            json!({"order_id": "O1", "product_id": "PROD-001", "quantity": 4}),
        ))
        .await
        .unwrap();

    assert_eq!(repo.items.lock().unwrap()[0].reserved, 4);
    let events = repo.emitted_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "inventory.reserved");
    assert_eq!(events[0].1["order_id"], "O1");
}

#[tokio::test]
async fn order_created_with_insufficient_stock_is_a_handler_error() {
    let repo = MockInventoryRepo::with_items(vec![inventory_item("PROD-001", "Laptop", 2, 0)]);
    let registry = build_registry(repo.clone());

    // The shortfall propagates so the relay retries within its budget;
    // stock may be replenished in between.
    let result = registry
        .dispatch(inbox_message(
            "order.created",
            json!({"order_id": "O1", "product_id": "PROD-001", "quantity": 5}),
        ))
        .await;

    assert!(result.is_err());
    assert!(repo.emitted_events().is_empty());
}

#[tokio::test]
async fn order_cancelled_releases_the_reservation() {
    let repo = MockInventoryRepo::with_items(vec![inventory_item("PROD-001", "Laptop", 100, 6)]);
    let registry = build_registry(repo.clone());

    registry
        .dispatch(inbox_message(
            "order.cancelled",
            json!({"order_id": "O1", "product_id": "PROD-001", "quantity": 6}),
        ))
        .await
        .unwrap();

    assert_eq!(repo.items.lock().unwrap()[0].reserved, 0);
    assert_eq!(repo.emitted_events()[0].0, "inventory.released");
}

#[tokio::test]
async fn order_updated_is_log_only() {
    let repo = MockInventoryRepo::default();
    let registry = build_registry(repo.clone());

    registry
        .dispatch(inbox_message(
            "order.updated",
            json!({"order_id": "O1", "status": "confirmed"}),
        ))
        .await
        .unwrap();

    assert!(repo.emitted_events().is_empty());
}

#[tokio::test]
async fn malformed_order_payload_is_a_handler_error() {
    let registry = build_registry(MockInventoryRepo::default());

    let result = registry
        .dispatch(inbox_message("order.created", json!({"bogus": 1})))
        .await;
    assert!(result.is_err());
}
