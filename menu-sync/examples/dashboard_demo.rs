//! Staff dashboard demo against the in-memory backend.
//!
//! Simulates a customer placing an order and the kitchen working it
//! through its statuses, printing the partitions and notifications a
//! dashboard would render.
//!
//! ```bash
//! cargo run --example dashboard_demo
//! ```

use std::sync::Arc;

use menu_sync::{
    MemoryFeed, MemoryOrderStore, OrderSyncSession, SideEffectError, Toast, ToastSink,
};
use shared::{ChangeEvent, Order, OrderItem, OrderStatus, Topic};

struct StdoutToasts;

impl ToastSink for StdoutToasts {
    fn toast(&self, toast: Toast) -> Result<(), SideEffectError> {
        println!("  [toast] {}: {}", toast.title, toast.message);
        Ok(())
    }
}

fn row(order: &Order) -> serde_json::Value {
    serde_json::to_value(order).expect("order serializes")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    menu_sync::logger::init_logger();

    let feed = Arc::new(MemoryFeed::default());
    let store = Arc::new(MemoryOrderStore::new());
    let publisher = feed.publisher();

    let session = OrderSyncSession::builder(feed.clone(), store.clone(), "demo-restaurant")
        .toast_sink(Arc::new(StdoutToasts))
        .start()
        .await?;

    let mut partitions = session.partitions();
    partitions.changed().await?;

    // Customer checkout.
    let mut order = Order {
        id: "o-1001".into(),
        restaurant_id: "demo-restaurant".into(),
        table_number: "5".into(),
        customer_name: Some("Ada".into()),
        items: vec![OrderItem {
            name: "Margherita".into(),
            unit_price: 12.5,
            quantity: 1,
            special_instructions: Some("extra basil".into()),
        }],
        total_amount: 12.5,
        status: OrderStatus::Pending,
        created_at: Some(chrono::Utc::now()),
        ..Default::default()
    };
    store.upsert(order.clone());
    publisher.publish(ChangeEvent::insert(Topic::Orders, "demo-restaurant", row(&order)));
    partitions.changed().await?;
    print_view("after checkout", &session);

    // Kitchen walks the order through its statuses.
    for status in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Completed] {
        let before = row(&order);
        order.status = status;
        store.upsert(order.clone());
        publisher.publish(ChangeEvent::update(
            Topic::Orders,
            "demo-restaurant",
            before,
            row(&order),
        ));
        partitions.changed().await?;
        print_view(&format!("after {status}"), &session);
    }

    println!("\nnotifications (newest first):");
    for n in session.notifications().snapshot() {
        println!("  [{}] {} — {}", n.level, n.title, n.message);
    }
    println!("unread: {}", session.notifications().unread_count());

    session.close().await;
    Ok(())
}

fn print_view(label: &str, session: &OrderSyncSession) {
    let view = session.current_partitions();
    println!(
        "{label}: active={} completed={}",
        view.active.len(),
        view.completed.len()
    );
}
