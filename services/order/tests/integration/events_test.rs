use chrono::Utc;
use orderflow_order::domain::types::OrderStatus;
use orderflow_order::events::build_registry;
use orderflow_relay::message::{InboxMessage, MessageStatus};
use serde_json::json;

use crate::helpers::{MockOrderRepo, test_order};

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
async fn inventory_reserved_confirms_the_order() {
    let order = test_order("PROD-001");
    let repo = MockOrderRepo::with_orders(vec![order.clone()]);
    let registry = build_registry(repo.clone());

    let payload = json!({
        "order_id": order.id.to_string(),
        "product_id": "PROD-001",
        "quantity": 2,
    });
    registry
        .dispatch(inbox_message("inventory.reserved", payload))
        .await
        .unwrap();

    let orders = repo.orders.lock().unwrap();
    assert_eq!(orders[0].status, OrderStatus::Confirmed);
    assert!(orders[0].stock_reserved);
}

#[tokio::test]
async fn inventory_reserved_for_unknown_order_is_not_an_error() {
    let repo = MockOrderRepo::new();
    let registry = build_registry(repo);

    let payload = json!({
        "order_id": uuid::Uuid::new_v4().to_string(),
        "product_id": "PROD-001",
        "quantity": 1,
    });
    // Logged as a warning and acknowledged; retrying would never converge.
    registry
        .dispatch(inbox_message("inventory.reserved", payload))
        .await
        .unwrap();
}

#[tokio::test]
async fn malformed_payload_is_a_handler_error() {
    let registry = build_registry(MockOrderRepo::new());

    let result = registry
        .dispatch(inbox_message("inventory.reserved", json!({"oops": true})))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn stock_notifications_are_acknowledged() {
    let registry = build_registry(MockOrderRepo::new());

    registry
        .dispatch(inbox_message(
            "inventory.released",
            json!({"order_id": "o", "product_id": "PROD-001", "quantity": 1}),
        ))
        .await
        .unwrap();

    registry
        .dispatch(inbox_message(
            "inventory.updated",
            json!({"product_id": "PROD-001", "available": 42}),
        ))
        .await
        .unwrap();
}
