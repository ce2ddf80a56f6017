use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use orderflow_relay::message::MessageStatus;
use orderflow_relay::registry::HandlerRegistry;
use orderflow_relay::repository::InboxRepository;
use orderflow_relay::worker::{InboxWorker, WorkerOptions};
use orderflow_testing::MemoryInbox;
use serde_json::json;

const MAX_RETRIES: i32 = 3;

/// Registry whose single handler fails the first `failures` invocations,
/// then succeeds. Returns the invocation counter.
fn flaky_registry(event_type: &str, failures: usize) -> (Arc<HandlerRegistry>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();

    let mut registry = HandlerRegistry::new();
    registry.register(event_type, move |_msg| {
        let calls = seen.clone();
        async move {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            if attempt < failures {
                Err(anyhow::anyhow!("downstream unavailable"))
            } else {
                Ok(())
            }
        }
    });

    (Arc::new(registry), calls)
}

fn worker(inbox: &Arc<MemoryInbox>, registry: Arc<HandlerRegistry>) -> InboxWorker<MemoryInbox> {
    InboxWorker::new(inbox.clone(), registry, MAX_RETRIES, WorkerOptions::default())
}

#[tokio::test]
async fn processes_pending_row_and_marks_it_processed() {
    let inbox = Arc::new(MemoryInbox::new());
    let (registry, calls) = flaky_registry("order.created", 0);

    let row = inbox
        .save("m-1", "order.created", &json!({"order_id": "O1"}), None)
        .await
        .unwrap()
        .unwrap();

    worker(&inbox, registry).process_batch().await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let stored = inbox.get(row.id).unwrap();
    assert_eq!(stored.status, MessageStatus::Processed);
    assert!(stored.locked_by.is_none());
}

#[tokio::test]
async fn transient_failures_retry_until_the_handler_succeeds() {
    let inbox = Arc::new(MemoryInbox::new());
    let (registry, calls) = flaky_registry("order.created", 2);

    let row = inbox
        .save("m-2", "order.created", &json!({}), None)
        .await
        .unwrap()
        .unwrap();

    let w = worker(&inbox, registry);

    // Two failing attempts cycle the row back to PENDING with the error kept.
    w.process_batch().await;
    let after_first = inbox.get(row.id).unwrap();
    assert_eq!(after_first.status, MessageStatus::Pending);
    assert_eq!(after_first.retry_count, 1);
    assert!(after_first.error.is_some());

    w.process_batch().await;
    let after_second = inbox.get(row.id).unwrap();
    assert_eq!(after_second.status, MessageStatus::Pending);
    assert_eq!(after_second.retry_count, 2);

    // Third attempt succeeds; the retry count stays at two.
    w.process_batch().await;
    let done = inbox.get(row.id).unwrap();
    assert_eq!(done.status, MessageStatus::Processed);
    assert_eq!(done.retry_count, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn permanent_failure_dead_letters_after_the_retry_budget() {
    let inbox = Arc::new(MemoryInbox::new());
    let (registry, calls) = flaky_registry("order.created", usize::MAX);

    let row = inbox
        .save("m-3", "order.created", &json!({}), None)
        .await
        .unwrap()
        .unwrap();

    let w = worker(&inbox, registry);
    for _ in 0..5 {
        w.process_batch().await;
    }

    // maxRetries bounds the number of handler invocations.
    assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES as usize);
    let stored = inbox.get(row.id).unwrap();
    assert_eq!(stored.status, MessageStatus::Failed);
    assert_eq!(stored.retry_count, MAX_RETRIES);
    assert!(stored.error.as_deref().unwrap().contains("downstream"));
}

#[tokio::test]
async fn unknown_event_type_is_acknowledged_as_processed() {
    let inbox = Arc::new(MemoryInbox::new());
    let (registry, calls) = flaky_registry("order.created", 0);

    let row = inbox
        .save("m-4", "unknown.type", &json!({}), None)
        .await
        .unwrap()
        .unwrap();

    worker(&inbox, registry).process_batch().await;

    // The registered handler never ran, and the row is terminal.
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(inbox.get(row.id).unwrap().status, MessageStatus::Processed);
}

#[tokio::test]
async fn expired_lease_is_reclaimed_by_another_worker() {
    let inbox = Arc::new(MemoryInbox::new().with_lease_ttl(std::time::Duration::from_secs(60)));
    let (registry, calls) = flaky_registry("order.created", 0);

    let row = inbox
        .save("m-5", "order.created", &json!({}), None)
        .await
        .unwrap()
        .unwrap();

    // A worker claims the row and never comes back.
    let leased = inbox.lease_batch("w-crashed", 3, MAX_RETRIES).await.unwrap();
    assert_eq!(leased.len(), 1);
    inbox.age_lease(row.id, chrono::Utc::now() - chrono::Duration::seconds(120));

    worker(&inbox, registry).process_batch().await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(inbox.get(row.id).unwrap().status, MessageStatus::Processed);
}

#[tokio::test]
async fn fresh_leases_are_not_stolen() {
    let inbox = Arc::new(MemoryInbox::new());
    let (registry, calls) = flaky_registry("order.created", 0);

    inbox
        .save("m-6", "order.created", &json!({}), None)
        .await
        .unwrap()
        .unwrap();

    // Another worker holds a live lease; this worker's batch must skip it.
    let leased = inbox.lease_batch("w-other", 3, MAX_RETRIES).await.unwrap();
    assert_eq!(leased.len(), 1);

    worker(&inbox, registry).process_batch().await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
