//! End-to-end capture behavior over an in-memory storage backend:
//! fingerprint-level deduplication, snapshot immutability, and the
//! per-user cart scan.

use std::sync::Arc;
use storefront_core::capture::CaptureEngine;
use storefront_core::domain::EntryStatus;
use storefront_core::inbox::InboxManager;
use storefront_core::infrastructure::events::EventBus;
use storefront_core::infrastructure::storage::{keys, MemoryBackend, StorageBackend};
use storefront_core::render::{RecordingRender, RenderSink};

struct Harness {
    storage: Arc<dyn StorageBackend>,
    engine: CaptureEngine,
    inbox: Arc<InboxManager>,
    render: Arc<RecordingRender>,
}

fn harness() -> Harness {
    let _ = tracing_subscriber::fmt::try_init();
    let storage: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
    let events = Arc::new(EventBus::default());
    let render = Arc::new(RecordingRender::new());
    let inbox = Arc::new(InboxManager::new(
        storage.clone(),
        events.clone(),
        render.clone() as Arc<dyn RenderSink>,
    ));
    let engine = CaptureEngine::new(storage.clone(), inbox.clone(), events);
    Harness {
        storage,
        engine,
        inbox,
        render,
    }
}

async fn seed_user(storage: &dyn StorageBackend, id: &str, name: &str) {
    let users = serde_json::json!([{
        "id": id,
        "name": name,
        "email": format!("{id}@example.com"),
        "number": "555-0101"
    }]);
    storage.set(keys::USERS, &users.to_string()).await.unwrap();
}

async fn set_cart(storage: &dyn StorageBackend, key: &str, cart: serde_json::Value) {
    storage.set(key, &cart.to_string()).await.unwrap();
}

#[tokio::test]
async fn concrete_scan_scenario() {
    let h = harness();
    seed_user(h.storage.as_ref(), "u_1", "Aria").await;
    h.storage.set(keys::CURRENT_USER, "u_1").await.unwrap();
    set_cart(
        h.storage.as_ref(),
        keys::CART,
        serde_json::json!([{"id": "p_1", "qty": 2, "name": "Handset", "price": 129.0}]),
    )
    .await;

    // First scan materializes one pending entry with quantity 2
    assert_eq!(h.engine.scan_all().await.unwrap(), 1);
    let entries = h.inbox.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].quantity, 2);
    assert_eq!(entries[0].status, EntryStatus::Pending);
    assert_eq!(entries[0].source, keys::CART);
    assert_eq!(entries[0].product.id, "p_1");
    assert_eq!(entries[0].user.as_ref().unwrap().name, "Aria");

    // Second scan with an identical cart is a no-op
    assert_eq!(h.engine.scan_all().await.unwrap(), 0);
    assert_eq!(h.inbox.entries().await.unwrap().len(), 1);

    // Quantity change produces exactly one additional entry; the stale
    // entry coexists with it (dedup is at the scan level, not per product)
    set_cart(
        h.storage.as_ref(),
        keys::CART,
        serde_json::json!([{"id": "p_1", "qty": 3, "name": "Handset", "price": 129.0}]),
    )
    .await;
    assert_eq!(h.engine.scan_all().await.unwrap(), 1);
    let entries = h.inbox.entries().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].quantity, 3);
    assert_eq!(entries[1].quantity, 2);
}

#[tokio::test]
async fn snapshots_are_immutable_after_capture() {
    let h = harness();
    seed_user(h.storage.as_ref(), "u_1", "Aria").await;
    h.storage.set(keys::CURRENT_USER, "u_1").await.unwrap();
    set_cart(
        h.storage.as_ref(),
        keys::CART,
        serde_json::json!([{"id": "p_1", "qty": 1, "name": "Handset"}]),
    )
    .await;
    assert_eq!(h.engine.scan_all().await.unwrap(), 1);

    // Rename the product and the user upstream. The fingerprint only
    // covers id:qty, so no re-capture happens and the entry keeps its
    // point-in-time copies.
    set_cart(
        h.storage.as_ref(),
        keys::CART,
        serde_json::json!([{"id": "p_1", "qty": 1, "name": "Handset Pro"}]),
    )
    .await;
    seed_user(h.storage.as_ref(), "u_1", "Renamed").await;
    assert_eq!(h.engine.scan_all().await.unwrap(), 0);

    let entries = h.inbox.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].product.name.as_deref(), Some("Handset"));
    assert_eq!(entries[0].user.as_ref().unwrap().name, "Aria");
}

#[tokio::test]
async fn multi_line_cart_yields_one_entry_per_line() {
    let h = harness();
    seed_user(h.storage.as_ref(), "u_1", "Aria").await;
    h.storage.set(keys::CURRENT_USER, "u_1").await.unwrap();
    set_cart(
        h.storage.as_ref(),
        keys::CART,
        serde_json::json!([
            {"id": "p_1", "qty": 2},
            {"id": "p_2"},
            {"id": "p_3", "qty": 1}
        ]),
    )
    .await;

    assert_eq!(h.engine.scan_all().await.unwrap(), 3);
    let entries = h.inbox.entries().await.unwrap();
    assert_eq!(entries.len(), 3);
    // Head-insert order: the last materialized line sits at the head
    assert_eq!(entries[0].product.id, "p_3");
    assert_eq!(entries[2].product.id, "p_1");
    // Missing qty defaults to 1
    assert_eq!(entries[1].quantity, 1);
}

#[tokio::test]
async fn per_user_carts_are_scanned_with_their_key_as_source() {
    let h = harness();
    let users = serde_json::json!([
        {"id": "u_1", "name": "Aria"},
        {"id": "u_2", "name": "Noor"}
    ]);
    h.storage
        .set(keys::USERS, &users.to_string())
        .await
        .unwrap();
    set_cart(
        h.storage.as_ref(),
        "cart.u_2",
        serde_json::json!([{"id": "p_9", "qty": 4}]),
    )
    .await;

    assert_eq!(h.engine.scan_all().await.unwrap(), 1);
    let entries = h.inbox.entries().await.unwrap();
    assert_eq!(entries[0].source, "cart.u_2");
    assert_eq!(entries[0].user.as_ref().unwrap().name, "Noor");
    assert_eq!(entries[0].quantity, 4);

    // Same per-user cart again: no new entries
    assert_eq!(h.engine.scan_all().await.unwrap(), 0);
}

#[tokio::test]
async fn missing_owner_or_empty_cart_is_skipped() {
    let h = harness();

    // Cart present but nobody signed in
    set_cart(
        h.storage.as_ref(),
        keys::CART,
        serde_json::json!([{"id": "p_1", "qty": 1}]),
    )
    .await;
    assert_eq!(h.engine.capture_current_cart().await.unwrap(), 0);

    // Owner signed in but the cart is empty
    h.storage.set(keys::CURRENT_USER, "u_1").await.unwrap();
    set_cart(h.storage.as_ref(), keys::CART, serde_json::json!([])).await;
    assert_eq!(h.engine.capture_current_cart().await.unwrap(), 0);

    assert!(h.inbox.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_cart_reads_as_absent() {
    let h = harness();
    seed_user(h.storage.as_ref(), "u_1", "Aria").await;
    h.storage.set(keys::CURRENT_USER, "u_1").await.unwrap();
    h.storage.set(keys::CART, "][ not json").await.unwrap();

    assert_eq!(h.engine.scan_all().await.unwrap(), 0);
    assert!(h.inbox.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_owner_materializes_without_user_snapshot() {
    let h = harness();
    h.storage.set(keys::CURRENT_USER, "u_ghost").await.unwrap();
    set_cart(
        h.storage.as_ref(),
        keys::CART,
        serde_json::json!([{"id": "p_1", "qty": 1}]),
    )
    .await;

    assert_eq!(h.engine.capture_current_cart().await.unwrap(), 1);
    let entries = h.inbox.entries().await.unwrap();
    assert!(entries[0].user.is_none());
}

#[tokio::test]
async fn capture_renders_after_each_entry() {
    let h = harness();
    seed_user(h.storage.as_ref(), "u_1", "Aria").await;
    h.storage.set(keys::CURRENT_USER, "u_1").await.unwrap();
    set_cart(
        h.storage.as_ref(),
        keys::CART,
        serde_json::json!([{"id": "p_1"}, {"id": "p_2"}]),
    )
    .await;

    h.engine.scan_all().await.unwrap();
    let last = h.render.last().expect("at least one render");
    assert_eq!(last.total, 2);
    assert_eq!(last.pending, 2);
    assert_eq!(last.confirmed, 0);
}
