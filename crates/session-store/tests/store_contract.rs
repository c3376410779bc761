//! Behaviour every session store backend must share.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use session_store::{FileSessionStore, InMemorySessionStore, ManualClock, SessionStore, SessionStoreExt};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Line {
    dish: String,
    quantity: u32,
}

fn exercise_contract(store: &dyn SessionStore, clock: &ManualClock) {
    let lines = vec![
        Line {
            dish: "D1".into(),
            quantity: 2,
        },
        Line {
            dish: "D2".into(),
            quantity: 1,
        },
    ];

    // Round trip
    store.save_as("cart", &lines, Duration::days(7));
    assert_eq!(store.load_as::<Vec<Line>>("cart"), Some(lines.clone()));

    // Overwrite
    store.save_as("cart", &lines[..1].to_vec(), Duration::days(7));
    assert_eq!(store.load_as::<Vec<Line>>("cart").map(|l| l.len()), Some(1));

    // Wrong shape reads as absent
    store.save_as("orderStatus", &"garbage", Duration::days(1));
    assert_eq!(store.load_as::<Vec<Line>>("orderStatus"), None);

    // Independent expiry
    store.save_as("currentOrderId", &"ORD-7", Duration::days(1));
    clock.advance(Duration::days(1));
    assert_eq!(store.load_as::<String>("currentOrderId"), None);
    assert!(store.load_as::<Vec<Line>>("cart").is_some());

    // Idempotent clear
    store.clear("cart");
    store.clear("cart");
    assert_eq!(store.load("cart"), None);
}

#[test]
fn in_memory_store_honours_contract() {
    let clock = ManualClock::default();
    let store = InMemorySessionStore::with_clock(clock.clone());
    exercise_contract(&store, &clock);
}

#[test]
fn file_store_honours_contract() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::default();
    let store = FileSessionStore::open_with_clock(dir.path().join("session.json"), clock.clone());
    exercise_contract(&store, &clock);
}

mod shared_file {
    use super::*;
    use serde_json::json;

    #[test]
    fn writes_from_another_instance_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let watcher = FileSessionStore::open(&path);
        watcher.save("currentOrderId", json!("ORD-0001"), Duration::days(1));

        let adder = FileSessionStore::open(&path);
        adder.save("cart", json!([{"dish": "D2", "quantity": 1}]), Duration::days(7));

        // The long-lived instance writes again after the other one.
        watcher.save("orderStatus", json!({"isServed": true}), Duration::days(1));

        let fresh = FileSessionStore::open(&path);
        assert_eq!(fresh.load("cart"), Some(json!([{"dish": "D2", "quantity": 1}])));
        assert_eq!(fresh.load("currentOrderId"), Some(json!("ORD-0001")));
        assert_eq!(fresh.load("orderStatus"), Some(json!({"isServed": true})));
    }

    #[test]
    fn clear_from_another_instance_is_not_undone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let watcher = FileSessionStore::open(&path);
        watcher.save("customer", json!({"id": "C1"}), Duration::days(7));
        watcher.save("currentOrderId", json!("ORD-0001"), Duration::days(1));

        let other = FileSessionStore::open(&path);
        other.clear("customer");
        other.clear("currentOrderId");

        watcher.save("orderStatus", json!({"isPaid": true}), Duration::days(1));

        assert_eq!(watcher.load("customer"), None);
        assert_eq!(watcher.load("currentOrderId"), None);
        let fresh = FileSessionStore::open(&path);
        assert_eq!(fresh.load("customer"), None);
        assert_eq!(fresh.load("currentOrderId"), None);
    }

    #[test]
    fn load_sees_values_written_after_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let reader = FileSessionStore::open(&path);
        assert_eq!(reader.load("cart"), None);

        FileSessionStore::open(&path).save("cart", json!([]), Duration::days(7));
        assert_eq!(reader.load("cart"), Some(json!([])));
    }
}
