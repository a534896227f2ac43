//! # Notification Hub
//!
//! Fans out floor changes to table views and the manager board.
//!
//! ## Channels
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Notification Hub                                 │
//! │                                                                         │
//! │   FloorService (after every applied mutation)                           │
//! │        │                                                                │
//! │        ├── publish_table(&Table) ──► watch<Table> for that table id     │
//! │        │                               │       │       │                │
//! │        │                             phone   phone   tablet             │
//! │        │                                                                │
//! │        └── publish_manager() ──────► watch<ManagerSignal>               │
//! │                                        │       │                        │
//! │                                      board   kitchen                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `watch` keeps only the latest value: producers never block and a slow
//! consumer skips straight to the newest snapshot. Only the latest
//! snapshot matters for a view.
//!
//! ## Replay on Subscribe
//! A fresh subscription is marked changed, so its first `changed().await`
//! resolves immediately with the current state.
//!
//! ## Unsubscribe
//! Dropping a subscription releases it. Table channels with no receivers
//! left are pruned on the next publish for that table.

use std::collections::HashMap;
use std::sync::Mutex;

use bistro_core::Table;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::trace;
use ts_rs::TS;

/// "Something changed, re-pull": the manager board payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ManagerSignal {
    /// Bumped once per applied mutation and once per table created on
    /// first reference.
    pub revision: u64,
}

pub struct NotificationHub {
    tables: Mutex<HashMap<String, watch::Sender<Table>>>,
    manager: watch::Sender<ManagerSignal>,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        let (manager, _) = watch::channel(ManagerSignal::default());
        NotificationHub {
            tables: Mutex::new(HashMap::new()),
            manager,
        }
    }

    // =========================================================================
    // Subscribe
    // =========================================================================

    /// Subscribes to one table, starting from `current`.
    pub fn subscribe_table(&self, current: Table) -> TableSubscription {
        let mut tables = self.tables.lock().expect("hub tables mutex poisoned");
        let table_id = current.id().to_string();

        let sender = tables
            .entry(table_id.clone())
            .or_insert_with(|| watch::channel(current.clone()).0);
        sender.send_if_modified(|snapshot| {
            if *snapshot == current {
                return false;
            }
            *snapshot = current;
            true
        });

        let mut rx = sender.subscribe();
        rx.mark_changed();
        trace!(table_id = %table_id, receivers = sender.receiver_count(), "Table subscriber added");

        TableSubscription { table_id, rx }
    }

    pub fn subscribe_manager(&self) -> ManagerSubscription {
        let mut rx = self.manager.subscribe();
        rx.mark_changed();
        ManagerSubscription { rx }
    }

    // =========================================================================
    // Publish
    // =========================================================================

    /// Pushes a fresh snapshot to the table's subscribers, if any.
    pub fn publish_table(&self, table: &Table) {
        let mut tables = self.tables.lock().expect("hub tables mutex poisoned");

        let Some(sender) = tables.get(table.id()) else {
            return;
        };
        if sender.receiver_count() == 0 {
            tables.remove(table.id());
            trace!(table_id = %table.id(), "Pruned table channel");
            return;
        }
        sender.send_replace(table.clone());
    }

    pub fn publish_manager(&self) {
        self.manager.send_modify(|signal| signal.revision += 1);
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    pub fn table_subscribers(&self, table_id: &str) -> usize {
        self.tables
            .lock()
            .expect("hub tables mutex poisoned")
            .get(table_id)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    pub fn manager_subscribers(&self) -> usize {
        self.manager.receiver_count()
    }

    pub fn revision(&self) -> u64 {
        self.manager.borrow().revision
    }
}

// =============================================================================
// Subscription Handles
// =============================================================================

/// Live view of one table.
#[derive(Debug)]
pub struct TableSubscription {
    table_id: String,
    rx: watch::Receiver<Table>,
}

impl TableSubscription {
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Latest snapshot without waiting.
    pub fn current(&self) -> Table {
        self.rx.borrow().clone()
    }

    /// Waits for the next snapshot. The first call returns the state at
    /// subscribe time. `None` once the hub is gone.
    pub async fn changed(&mut self) -> Option<Table> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

/// Change signal for the manager board.
#[derive(Debug)]
pub struct ManagerSubscription {
    rx: watch::Receiver<ManagerSignal>,
}

impl ManagerSubscription {
    pub fn current(&self) -> ManagerSignal {
        *self.rx.borrow()
    }

    /// Waits for the next signal. The first call returns immediately.
    pub async fn changed(&mut self) -> Option<ManagerSignal> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_core::transition;
    use chrono::Utc;
    use std::time::Duration;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn test_table_subscription_replays_current_state() {
        let hub = NotificationHub::new();
        let mut table = Table::new("5");
        transition::scan(&mut table, Utc::now());

        let mut sub = hub.subscribe_table(table.clone());
        let first = timeout(WAIT, sub.changed()).await.unwrap().unwrap();
        assert_eq!(first, table);

        // Nothing new yet
        assert!(timeout(Duration::from_millis(20), sub.changed()).await.is_err());

        transition::request_waiter(&mut table, Utc::now());
        hub.publish_table(&table);
        let next = timeout(WAIT, sub.changed()).await.unwrap().unwrap();
        assert_eq!(next.pending_reason(), table.pending_reason());
    }

    #[tokio::test]
    async fn test_slow_consumer_sees_latest_only() {
        let hub = NotificationHub::new();
        let mut table = Table::new("2");
        let mut sub = hub.subscribe_table(table.clone());
        sub.changed().await;

        for _ in 0..5 {
            transition::scan(&mut table, Utc::now());
            hub.publish_table(&table);
        }

        let latest = timeout(WAIT, sub.changed()).await.unwrap().unwrap();
        assert_eq!(latest.connected_devices(), 5);
        assert!(timeout(Duration::from_millis(20), sub.changed()).await.is_err());
    }

    #[tokio::test]
    async fn test_manager_signal_replays_and_counts() {
        let hub = NotificationHub::new();
        hub.publish_manager();

        let mut sub = hub.subscribe_manager();
        assert_eq!(sub.changed().await, Some(ManagerSignal { revision: 1 }));

        hub.publish_manager();
        hub.publish_manager();
        assert_eq!(sub.changed().await, Some(ManagerSignal { revision: 3 }));
        assert_eq!(hub.revision(), 3);
    }

    #[test]
    fn test_unsubscribe_prunes_channel() {
        let hub = NotificationHub::new();
        let table = Table::new("8");

        let a = hub.subscribe_table(table.clone());
        let b = hub.subscribe_table(table.clone());
        assert_eq!(hub.table_subscribers("8"), 2);

        a.unsubscribe();
        assert_eq!(hub.table_subscribers("8"), 1);
        drop(b);
        assert_eq!(hub.table_subscribers("8"), 0);

        hub.publish_table(&table);
        assert!(hub.tables.lock().unwrap().get("8").is_none());
    }

    #[test]
    fn test_manager_unsubscribe() {
        let hub = NotificationHub::new();
        let sub = hub.subscribe_manager();
        assert_eq!(hub.manager_subscribers(), 1);
        sub.unsubscribe();
        assert_eq!(hub.manager_subscribers(), 0);
        // Publishing with nobody listening is fine
        hub.publish_manager();
    }
}
