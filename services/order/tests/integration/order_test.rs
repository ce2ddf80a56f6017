use orderflow_order::domain::types::OrderStatus;
use orderflow_order::error::OrderServiceError;
use orderflow_order::usecase::order::{
    CancelOrderUseCase, CreateOrderInput, CreateOrderUseCase, GetOrderUseCase,
};
use uuid::Uuid;

use crate::helpers::{MockOrderRepo, MockWarehouse, stock_level, test_order};

// ── CreateOrder ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_order_when_stock_is_available() {
    let repo = MockOrderRepo::new();
    let usecase = CreateOrderUseCase {
        orders: repo.clone(),
        warehouse: MockWarehouse::with_stock(vec![stock_level("PROD-001", "Laptop", 10)]),
    };

    let created = usecase
        .execute(CreateOrderInput {
            product_id: "PROD-001".to_owned(),
            quantity: 3,
        })
        .await
        .unwrap();

    assert_eq!(created.order.status, OrderStatus::Created);
    assert!(!created.order.stock_reserved);
    assert_eq!(created.order.product_name.as_deref(), Some("Laptop"));
    assert!(!created.message_id.is_empty());

    // The order and its outbox event were written together.
    assert_eq!(repo.orders.lock().unwrap().len(), 1);
    assert_eq!(repo.emitted_events(), vec!["order.created"]);
}

#[tokio::test]
async fn should_reject_order_when_stock_is_insufficient() {
    let usecase = CreateOrderUseCase {
        orders: MockOrderRepo::new(),
        warehouse: MockWarehouse::with_stock(vec![stock_level("PROD-001", "Laptop", 2)]),
    };

    let result = usecase
        .execute(CreateOrderInput {
            product_id: "PROD-001".to_owned(),
            quantity: 5,
        })
        .await;

    match result {
        Err(OrderServiceError::InsufficientStock {
            requested,
            available,
        }) => {
            assert_eq!(requested, 5);
            assert_eq!(available, 2);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
}

#[tokio::test]
async fn should_reject_order_for_unknown_product() {
    let usecase = CreateOrderUseCase {
        orders: MockOrderRepo::new(),
        warehouse: MockWarehouse::with_stock(vec![]),
    };

    let result = usecase
        .execute(CreateOrderInput {
            product_id: "PROD-999".to_owned(),
            quantity: 1,
        })
        .await;

    assert!(matches!(
        result,
        Err(OrderServiceError::UnknownProduct(ref p)) if p == "PROD-999"
    ));
}

#[tokio::test]
async fn should_surface_warehouse_outage() {
    let repo = MockOrderRepo::new();
    let usecase = CreateOrderUseCase {
        orders: repo.clone(),
        warehouse: MockWarehouse::down(),
    };

    let result = usecase
        .execute(CreateOrderInput {
            product_id: "PROD-001".to_owned(),
            quantity: 1,
        })
        .await;

    assert!(matches!(
        result,
        Err(OrderServiceError::WarehouseUnavailable(_))
    ));
    // No order, no event.
    assert!(repo.orders.lock().unwrap().is_empty());
    assert!(repo.emitted_events().is_empty());
}

#[tokio::test]
async fn should_reject_non_positive_quantity() {
    let usecase = CreateOrderUseCase {
        orders: MockOrderRepo::new(),
        warehouse: MockWarehouse::with_stock(vec![stock_level("PROD-001", "Laptop", 10)]),
    };

    let result = usecase
        .execute(CreateOrderInput {
            product_id: "PROD-001".to_owned(),
            quantity: 0,
        })
        .await;

    assert!(matches!(result, Err(OrderServiceError::BadRequest(_))));
}

// ── GetOrder ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_not_found_for_unknown_order() {
    let usecase = GetOrderUseCase {
        orders: MockOrderRepo::new(),
    };
    let result = usecase.execute(Uuid::new_v4()).await;
    assert!(matches!(result, Err(OrderServiceError::NotFound)));
}

// ── CancelOrder ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_cancel_order_and_emit_event() {
    let order = test_order("PROD-001");
    let repo = MockOrderRepo::with_orders(vec![order.clone()]);
    let usecase = CancelOrderUseCase {
        orders: repo.clone(),
    };

    let (cancelled, message_id) = usecase.execute(order.id).await.unwrap();

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(!message_id.is_empty());
    assert_eq!(repo.emitted_events(), vec!["order.cancelled"]);
}

#[tokio::test]
async fn should_refuse_to_cancel_twice() {
    let order = test_order("PROD-001");
    let repo = MockOrderRepo::with_orders(vec![order.clone()]);
    let usecase = CancelOrderUseCase {
        orders: repo.clone(),
    };

    usecase.execute(order.id).await.unwrap();
    let result = usecase.execute(order.id).await;
    assert!(matches!(result, Err(OrderServiceError::BadRequest(_))));
}

#[tokio::test]
async fn should_return_not_found_when_cancelling_unknown_order() {
    let usecase = CancelOrderUseCase {
        orders: MockOrderRepo::new(),
    };
    let result = usecase.execute(Uuid::new_v4()).await;
    assert!(matches!(result, Err(OrderServiceError::NotFound)));
}
