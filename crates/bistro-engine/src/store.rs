//! # In-Memory Stores
//!
//! Plain containers for tables, orders and the event log. They hold no
//! locks of their own: [`crate::FloorService`] owns all three behind one
//! mutex so an operation touching a table, an order and the log is atomic.
//!
//! ## Ordering
//! ```text
//! TableStore::list       numeric-aware id order: 1, 2, ..., 10, 11, patio
//! OrderStore::newest     createdAt descending (manager order list)
//! OrderStore::for_table  createdAt ascending (partial ticket)
//! OrderStore::kitchen    not ENTREGADO, newest first
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;

use bistro_core::{DomainEvent, EventKind, Order, Table};
use chrono::{DateTime, Utc};

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Table Store
// =============================================================================

#[derive(Debug, Default)]
pub struct TableStore {
    tables: HashMap<String, Table>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        TableStore {
            tables: tables
                .into_iter()
                .map(|t| (t.id().to_string(), t))
                .collect(),
        }
    }

    pub fn get(&self, table_id: &str) -> Option<&Table> {
        self.tables.get(table_id)
    }

    pub fn get_mut(&mut self, table_id: &str) -> Option<&mut Table> {
        self.tables.get_mut(table_id)
    }

    /// Looks a table up, creating a LIBRE one on first reference when
    /// `lazy` is set.
    pub fn resolve(&mut self, table_id: &str, lazy: bool) -> EngineResult<&mut Table> {
        if lazy {
            return Ok(self
                .tables
                .entry(table_id.to_string())
                .or_insert_with(|| Table::new(table_id)));
        }
        self.tables
            .get_mut(table_id)
            .ok_or_else(|| EngineError::TableNotFound(table_id.to_string()))
    }

    /// Snapshot of every table in board order.
    pub fn list(&self) -> Vec<Table> {
        let mut tables: Vec<Table> = self.tables.values().cloned().collect();
        tables.sort_by(|a, b| board_order(a.id(), b.id()));
        tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Numeric ids first by value, then everything else alphabetically.
fn board_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

// =============================================================================
// Order Store
// =============================================================================

/// Orders in insertion order. Orders are never deleted.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: Vec<Order>,
    index: HashMap<String, usize>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, order: Order) {
        if let Some(&idx) = self.index.get(order.id()) {
            self.orders[idx] = order;
            return;
        }
        self.index.insert(order.id().to_string(), self.orders.len());
        self.orders.push(order);
    }

    pub fn get(&self, order_id: &str) -> Option<&Order> {
        self.index.get(order_id).map(|&i| &self.orders[i])
    }

    pub fn get_mut(&mut self, order_id: &str) -> Option<&mut Order> {
        match self.index.get(order_id) {
            Some(&i) => self.orders.get_mut(i),
            None => None,
        }
    }

    /// All orders, newest first.
    pub fn newest_first(&self) -> Vec<Order> {
        let mut orders = self.oldest_first(|_| true);
        orders.reverse();
        orders
    }

    /// Orders of one table, oldest first.
    pub fn for_table(&self, table_id: &str) -> Vec<Order> {
        self.oldest_first(|o| o.table_id() == table_id)
    }

    /// Orders the kitchen still has to deliver, newest first.
    pub fn kitchen_queue(&self) -> Vec<Order> {
        let mut orders = self.oldest_first(Order::is_active);
        orders.reverse();
        orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    // Stable sort: equal createdAt keeps insertion order.
    fn oldest_first(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.iter().filter(|o| keep(o)).cloned().collect();
        orders.sort_by_key(|o| o.created_at());
        orders
    }
}

// =============================================================================
// Event Log
// =============================================================================

/// Append-only domain event trail.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<DomainEvent>,
    next_seq: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, table_id: &str, kind: EventKind, now: DateTime<Utc>) -> &DomainEvent {
        self.next_seq += 1;
        self.events.push(DomainEvent {
            id: format!("evt-{}", self.next_seq),
            timestamp: now,
            table_id: table_id.to_string(),
            kind,
        });
        // just pushed
        &self.events[self.events.len() - 1]
    }

    pub fn all(&self) -> &[DomainEvent] {
        &self.events
    }

    pub fn for_table(&self, table_id: &str) -> Vec<DomainEvent> {
        self.events
            .iter()
            .filter(|e| e.table_id == table_id)
            .cloned()
            .collect()
    }

    /// CLOSE_TABLE count per table: sessions completed since startup.
    pub fn closed_sessions(&self) -> HashMap<String, u32> {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for event in &self.events {
            if matches!(event.kind, EventKind::CloseTable) {
                *counts.entry(event.table_id.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_core::seed;
    use chrono::Duration;

    #[test]
    fn test_board_order_is_numeric_aware() {
        let store = TableStore::from_tables(
            ["10", "2", "patio", "1", "11", "bar"]
                .into_iter()
                .map(Table::new),
        );
        let ids: Vec<String> = store.list().iter().map(|t| t.id().to_string()).collect();
        assert_eq!(ids, vec!["1", "2", "10", "11", "bar", "patio"]);
    }

    #[test]
    fn test_resolve_lazy_and_strict() {
        let mut store = TableStore::from_tables(vec![Table::new("1")]);

        assert!(matches!(
            store.resolve("7", false),
            Err(EngineError::TableNotFound(_))
        ));
        assert_eq!(store.len(), 1);

        let table = store.resolve("7", true).unwrap();
        assert!(table.is_free());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_order_listings() {
        let now = Utc::now();
        let floor = seed::demo_floor(12, now);
        let mut orders = OrderStore::new();
        for order in floor.orders {
            orders.insert(order);
        }

        // ord-seed-3 is 5 minutes old, ord-seed-4 an hour old
        let newest: Vec<String> = orders.newest_first().iter().map(|o| o.id().to_string()).collect();
        assert_eq!(newest, vec!["ord-seed-3", "ord-seed-4"]);

        let kitchen = orders.kitchen_queue();
        assert_eq!(kitchen.len(), 1);
        assert_eq!(kitchen[0].id(), "ord-seed-3");

        assert_eq!(orders.for_table("4").len(), 1);
        assert!(orders.for_table("9").is_empty());
        assert!(orders.get("ord-seed-4").is_some());
        assert!(orders.get("ord-nope").is_none());
        assert!(now - orders.get("ord-seed-4").unwrap().created_at() >= Duration::minutes(60));
    }

    #[test]
    fn test_event_log_sequence_and_counts() {
        let mut log = EventLog::new();
        let now = Utc::now();
        assert_eq!(log.append("1", EventKind::RequestWaiter, now).id, "evt-1");
        log.append("1", EventKind::CloseTable, now);
        log.append("2", EventKind::CloseTable, now);
        log.append("1", EventKind::CloseTable, now);

        assert_eq!(log.len(), 4);
        assert_eq!(log.for_table("1").len(), 3);
        let closed = log.closed_sessions();
        assert_eq!(closed.get("1"), Some(&2));
        assert_eq!(closed.get("2"), Some(&1));
    }
}
