use orderflow_warehouse::error::WarehouseServiceError;
use orderflow_warehouse::usecase::inventory::{
    GetStockUseCase, ReleaseStockUseCase, ReserveStockUseCase,
};

use crate::helpers::{MockInventoryRepo, inventory_item};

// ── GetStock ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_stock_for_known_product() {
    let repo = MockInventoryRepo::with_items(vec![inventory_item("PROD-001", "Laptop", 100, 30)]);
    let usecase = GetStockUseCase { inventory: repo };

    let item = usecase.execute("PROD-001").await.unwrap();
    assert_eq!(item.product_name, "Laptop");
    assert_eq!(item.available(), 70);
}

#[tokio::test]
async fn should_return_not_found_for_unknown_product() {
    let usecase = GetStockUseCase {
        inventory: MockInventoryRepo::default(),
    };
    let result = usecase.execute("PROD-999").await;
    assert!(matches!(result, Err(WarehouseServiceError::NotFound)));
}

// ── ReserveStock ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reserve_stock_and_emit_event() {
    let repo = MockInventoryRepo::with_items(vec![inventory_item("PROD-001", "Laptop", 100, 0)]);
    let usecase = ReserveStockUseCase {
        inventory: repo.clone(),
    };

    let item = usecase.execute("O1", "PROD-001", 5).await.unwrap();
    assert_eq!(item.reserved, 5);
    assert_eq!(item.available(), 95);

    let events = repo.emitted_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "inventory.reserved");
    assert_eq!(events[0].1["order_id"], "O1");
    assert_eq!(events[0].1["quantity"], 5);
}

#[tokio::test]
async fn should_reject_reservation_beyond_available_stock() {
    let repo = MockInventoryRepo::with_items(vec![inventory_item("PROD-001", "Laptop", 10, 8)]);
    let usecase = ReserveStockUseCase {
        inventory: repo.clone(),
    };

    let result = usecase.execute("O1", "PROD-001", 5).await;
    match result {
        Err(WarehouseServiceError::InsufficientStock {
            requested,
            available,
        }) => {
            assert_eq!(requested, 5);
            assert_eq!(available, 2);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    // Nothing was emitted for the failed reservation.
    assert!(repo.emitted_events().is_empty());
}

#[tokio::test]
async fn should_reject_non_positive_reservation() {
    let usecase = ReserveStockUseCase {
        inventory: MockInventoryRepo::default(),
    };
    let result = usecase.execute("O1", "PROD-001", 0).await;
    assert!(matches!(result, Err(WarehouseServiceError::BadRequest(_))));
}

// ── ReleaseStock ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_release_reserved_stock() {
    let repo = MockInventoryRepo::with_items(vec![inventory_item("PROD-001", "Laptop", 100, 20)]);
    let usecase = ReleaseStockUseCase {
        inventory: repo.clone(),
    };

    let item = usecase.execute("O1", "PROD-001", 15).await.unwrap();
    assert_eq!(item.reserved, 5);

    let events = repo.emitted_events();
    assert_eq!(events[0].0, "inventory.released");
    assert_eq!(events[0].1["quantity"], 15);
}

#[tokio::test]
async fn release_is_clamped_to_the_reserved_count() {
    let repo = MockInventoryRepo::with_items(vec![inventory_item("PROD-001", "Laptop", 100, 3)]);
    let usecase = ReleaseStockUseCase {
        inventory: repo.clone(),
    };

    // A cancel for an order whose reservation never landed.
    let item = usecase.execute("O1", "PROD-001", 10).await.unwrap();
    assert_eq!(item.reserved, 0);

    let events = repo.emitted_events();
    assert_eq!(events[0].1["quantity"], 3);
}
