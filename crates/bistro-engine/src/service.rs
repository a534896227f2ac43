//! # Floor Service
//!
//! The single owner of all mutable floor state. Every client and manager
//! action goes through here.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       One Mutating Operation                            │
//! │                                                                         │
//! │  validate input ──► lock FloorState ──► resolve table / order           │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                              bistro_core::transition::*                 │
//! │                                              │                          │
//! │                          Ignored ◄───────────┴──────────► Applied       │
//! │                             │                               │           │
//! │                     return, nothing                append DomainEvent   │
//! │                     logged or sent                 publish table        │
//! │                                                    publish manager      │
//! │                                                         │               │
//! │                                                    unlock, return       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Tables, orders and the event log share one `Mutex`. An order state
//! change mutates an order and its table together, and placing an order
//! moves the cart into the order store; one lock keeps both atomic.
//! Notifications are published before the lock is released, so observers
//! see snapshots in mutation order.

use std::sync::Mutex;

use bistro_core::seed::{self, SeedFloor};
use bistro_core::transition::{self, Transition};
use bistro_core::validation;
use bistro_core::{
    recommendation, Catalog, DomainEvent, EventKind, Money, Order, OrderState, PaymentMethod,
    Recommendation, Table, TableBill, UsageHistory,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analytics::DashboardMetrics;
use crate::config::{BistroConfig, UsageSource};
use crate::error::{EngineError, EngineResult};
use crate::hub::{ManagerSubscription, NotificationHub, TableSubscription};
use crate::store::{EventLog, OrderStore, TableStore};

#[derive(Debug, Default)]
struct FloorState {
    tables: TableStore,
    orders: OrderStore,
    events: EventLog,
}

/// Outcome of a table action, before logging and notification.
type TableStep = EngineResult<(Transition, Option<EventKind>)>;

/// What a table action did, and the table as it stood right after.
#[derive(Debug, Clone)]
pub struct TableUpdate {
    pub outcome: Transition,
    pub table: Table,
}

impl TableUpdate {
    pub fn is_applied(&self) -> bool {
        self.outcome.is_applied()
    }
}

/// What an order state change did, with the order right after it.
#[derive(Debug, Clone)]
pub struct OrderMove {
    pub outcome: Transition,
    pub order: Order,
}

impl OrderMove {
    pub fn is_applied(&self) -> bool {
        self.outcome.is_applied()
    }
}

pub struct FloorService {
    state: Mutex<FloorState>,
    hub: NotificationHub,
    catalog: Catalog,
    config: BistroConfig,
}

impl FloorService {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Floor with the house menu, seeded per `config.floor`.
    pub fn new(config: BistroConfig) -> Self {
        Self::with_catalog(config, Catalog::default_menu())
    }

    pub fn with_catalog(config: BistroConfig, catalog: Catalog) -> Self {
        let count = config.floor.table_count;
        let floor = if config.floor.seed_demo {
            seed::demo_floor(count, Utc::now())
        } else {
            seed::empty_floor(count)
        };
        Self::from_seed(config, catalog, floor)
    }

    pub fn from_seed(config: BistroConfig, catalog: Catalog, floor: SeedFloor) -> Self {
        let mut orders = OrderStore::new();
        for order in floor.orders {
            orders.insert(order);
        }
        let state = FloorState {
            tables: TableStore::from_tables(floor.tables),
            orders,
            events: EventLog::new(),
        };

        info!(
            tables = state.tables.len(),
            orders = state.orders.len(),
            products = catalog.products().len(),
            lazy_tables = config.floor.lazy_tables,
            "Floor ready"
        );

        FloorService {
            state: Mutex::new(state),
            hub: NotificationHub::new(),
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &BistroConfig {
        &self.config
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut FloorState) -> R) -> R {
        let mut state = self.state.lock().expect("floor state mutex poisoned");
        f(&mut state)
    }

    /// Looks a table up, creating it when lazy tables are on. A created
    /// table is new on the board, so the manager is signalled.
    fn resolve<'s>(
        &self,
        tables: &'s mut TableStore,
        table_id: &str,
    ) -> EngineResult<&'s mut Table> {
        let known = tables.get(table_id).is_some();
        let table = tables.resolve(table_id, self.config.floor.lazy_tables)?;
        if !known {
            debug!(table_id, "Table created on first reference");
            self.hub.publish_manager();
        }
        Ok(table)
    }

    fn notify(&self, table: &Table) {
        self.hub.publish_table(table);
        self.hub.publish_manager();
    }

    /// Runs one table transition under the lock, then logs and notifies if
    /// it applied.
    fn apply_to_table<F>(&self, table_id: &str, step: F) -> EngineResult<TableUpdate>
    where
        F: FnOnce(&mut Table, DateTime<Utc>) -> TableStep,
    {
        validation::validate_table_id(table_id)?;

        self.with_state(|state| {
            let now = Utc::now();
            let table = self.resolve(&mut state.tables, table_id)?;
            let (outcome, event) = step(table, now)?;
            let table = table.clone();

            if let Transition::Ignored(reason) = outcome {
                debug!(table_id, ?reason, "Transition ignored");
                return Ok(TableUpdate { outcome, table });
            }

            if let Some(kind) = event {
                state.events.append(table_id, kind, now);
            }
            self.notify(&table);
            Ok(TableUpdate { outcome, table })
        })
    }

    // =========================================================================
    // Client Actions
    // =========================================================================

    /// A phone scanned the table QR. Opens a LIBRE table.
    pub fn scan_table(&self, table_id: &str) -> EngineResult<Table> {
        let TableUpdate { table, .. } = self.apply_to_table(table_id, |table, now| {
            let outcome = transition::scan(table, now);
            let event = EventKind::ScanQr {
                connected_devices: table.connected_devices(),
            };
            Ok((outcome, Some(event)))
        })?;

        info!(
            table_id,
            status = %table.status(),
            devices = table.connected_devices(),
            "Table scanned"
        );
        Ok(table)
    }

    /// Adds `delta` units of a product to the table cart (negative removes).
    pub fn update_cart(
        &self,
        table_id: &str,
        product_id: &str,
        delta: i32,
    ) -> EngineResult<TableUpdate> {
        validation::validate_cart_delta(delta)?;
        if !self.catalog.contains(product_id) {
            warn!(table_id, product_id, "Cart update for unknown product");
            return Err(EngineError::ProductNotFound(product_id.to_string()));
        }

        let update = self.apply_to_table(table_id, |table, now| {
            let resulting = table.cart().quantity_of(product_id) as i64 + delta as i64;
            validation::validate_line_quantity(resulting)?;

            let outcome = transition::update_cart(table, product_id, delta, now);
            let event = EventKind::AddToCart {
                product_id: product_id.to_string(),
                delta,
                quantity: table.cart().quantity_of(product_id),
            };
            Ok((outcome, Some(event)))
        })?;

        debug!(
            table_id,
            product_id,
            delta,
            items = update.table.cart().item_count(),
            applied = update.is_applied(),
            "Cart updated"
        );
        Ok(update)
    }

    /// Submits the cart as an order. `None` if the cart was empty.
    pub fn place_order(&self, table_id: &str) -> EngineResult<Option<Order>> {
        validation::validate_table_id(table_id)?;

        let placed = self.with_state(|state| -> EngineResult<Option<Order>> {
            let now = Utc::now();
            let table = self.resolve(&mut state.tables, table_id)?;

            let Some(order) = transition::place_order(table, &self.catalog, new_order_id(now), now)
            else {
                return Ok(None);
            };
            let snapshot = table.clone();

            state.orders.insert(order.clone());
            state.events.append(
                table_id,
                EventKind::PlaceOrder {
                    order_id: order.id().to_string(),
                    total: order.total(),
                },
                now,
            );
            self.notify(&snapshot);
            Ok(Some(order))
        })?;

        match &placed {
            Some(order) => info!(
                table_id,
                order_id = %order.id(),
                total = %order.total(),
                lines = order.items().len(),
                "Order placed"
            ),
            None => debug!(table_id, "Empty cart, no order placed"),
        }
        Ok(placed)
    }

    pub fn request_waiter(&self, table_id: &str) -> EngineResult<TableUpdate> {
        let update = self.apply_to_table(table_id, |table, now| {
            Ok((transition::request_waiter(table, now), Some(EventKind::RequestWaiter)))
        })?;
        info!(table_id, "Waiter requested");
        Ok(update)
    }

    pub fn request_bill(
        &self,
        table_id: &str,
        payment_method: Option<PaymentMethod>,
    ) -> EngineResult<TableUpdate> {
        let update = self.apply_to_table(table_id, |table, now| {
            let outcome = transition::request_bill(table, now);
            Ok((outcome, Some(EventKind::RequestBill { payment_method })))
        })?;
        info!(table_id, method = ?payment_method, "Bill requested");
        Ok(update)
    }

    /// Client confirmed payment. Nothing is charged here.
    pub fn pay_table(
        &self,
        table_id: &str,
        method: PaymentMethod,
        amount: Money,
    ) -> EngineResult<TableUpdate> {
        validation::validate_payment_amount(amount)?;

        let update = self.apply_to_table(table_id, |table, now| {
            let outcome = transition::complete_payment(table, now);
            Ok((outcome, Some(EventKind::PaymentCompleted { method, amount })))
        })?;
        info!(table_id, %method, %amount, "Payment completed");
        Ok(update)
    }

    // =========================================================================
    // Manager Actions
    // =========================================================================

    /// Clears a waiter call. No-op unless the table is waiting on one.
    pub fn attend_waiter(&self, table_id: &str) -> EngineResult<TableUpdate> {
        self.apply_to_table(table_id, |table, now| {
            Ok((transition::attend_waiter(table, now), None))
        })
    }

    /// Clears a bill request. No-op unless the table is waiting on one.
    pub fn deliver_bill(&self, table_id: &str) -> EngineResult<TableUpdate> {
        self.apply_to_table(table_id, |table, now| {
            Ok((transition::deliver_bill(table, now), None))
        })
    }

    /// Releases the table back to LIBRE. Its orders stay in the store.
    pub fn close_table(&self, table_id: &str) -> EngineResult<TableUpdate> {
        let update = self.apply_to_table(table_id, |table, now| {
            Ok((transition::close(table, now), Some(EventKind::CloseTable)))
        })?;
        info!(table_id, "Table closed");
        Ok(update)
    }

    /// Moves an order to `new_state` if that is ahead of its current one.
    pub fn set_order_state(
        &self,
        order_id: &str,
        new_state: OrderState,
    ) -> EngineResult<OrderMove> {
        self.move_order(order_id, |_| new_state)
    }

    /// Moves an order one step down the pipeline.
    pub fn advance_order(&self, order_id: &str) -> EngineResult<OrderMove> {
        self.move_order(order_id, |current| current.next().unwrap_or(current))
    }

    fn move_order(
        &self,
        order_id: &str,
        target: impl FnOnce(OrderState) -> OrderState,
    ) -> EngineResult<OrderMove> {
        self.with_state(|state| {
            let now = Utc::now();
            let FloorState {
                tables,
                orders,
                events,
            } = state;

            let order = orders
                .get_mut(order_id)
                .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))?;
            let table = tables
                .get_mut(order.table_id())
                .ok_or_else(|| EngineError::TableNotFound(order.table_id().to_string()))?;

            let new_state = target(order.state());
            let outcome = transition::set_order_state(order, table, new_state, now);
            let order = order.clone();
            if let Transition::Ignored(reason) = outcome {
                debug!(order_id, ?reason, "Order update ignored");
                return Ok(OrderMove { outcome, order });
            }

            let snapshot = table.clone();
            events.append(
                snapshot.id(),
                EventKind::OrderUpdate {
                    order_id: order_id.to_string(),
                    new_state,
                },
                now,
            );
            self.notify(&snapshot);

            info!(
                order_id,
                table_id = %snapshot.id(),
                state = %new_state,
                table_status = %snapshot.status(),
                "Order state changed"
            );
            Ok(OrderMove { outcome, order })
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every table in board order.
    pub fn list_tables(&self) -> Vec<Table> {
        self.with_state(|state| state.tables.list())
    }

    pub fn get_table(&self, table_id: &str) -> EngineResult<Table> {
        validation::validate_table_id(table_id)?;
        self.with_state(|state| self.resolve(&mut state.tables, table_id).map(|t| t.clone()))
    }

    pub fn get_order(&self, order_id: &str) -> EngineResult<Order> {
        self.with_state(|state| {
            state
                .orders
                .get(order_id)
                .cloned()
                .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))
        })
    }

    /// All orders, newest first.
    pub fn list_orders(&self) -> Vec<Order> {
        self.with_state(|state| state.orders.newest_first())
    }

    /// Orders of one table, oldest first.
    pub fn table_orders(&self, table_id: &str) -> EngineResult<Vec<Order>> {
        validation::validate_table_id(table_id)?;
        self.with_state(|state| {
            self.resolve(&mut state.tables, table_id)?;
            Ok(state.orders.for_table(table_id))
        })
    }

    /// What the table's current session has ordered, at current menu
    /// prices. Orders from before the last close are not billed again.
    pub fn table_bill(&self, table_id: &str) -> EngineResult<TableBill> {
        validation::validate_table_id(table_id)?;
        self.with_state(|state| {
            let table = self.resolve(&mut state.tables, table_id)?;
            let orders = state.orders.for_table(table_id);
            Ok(TableBill::for_session(table, &orders, &self.catalog))
        })
    }

    /// Orders not yet delivered, newest first.
    pub fn kitchen_queue(&self) -> Vec<Order> {
        self.with_state(|state| state.orders.kitchen_queue())
    }

    pub fn menu(&self) -> &Catalog {
        &self.catalog
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.with_state(|state| state.events.all().to_vec())
    }

    pub fn table_events(&self, table_id: &str) -> EngineResult<Vec<DomainEvent>> {
        validation::validate_table_id(table_id)?;
        Ok(self.with_state(|state| state.events.for_table(table_id)))
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    /// Usage counts feeding the allocation heuristic.
    pub fn usage_history(&self) -> UsageHistory {
        self.with_state(|state| self.usage_from(&state.events))
    }

    fn usage_from(&self, events: &EventLog) -> UsageHistory {
        let mut history = UsageHistory::from_performance(&self.config.history);
        if self.config.recommendation.usage_source == UsageSource::Live {
            for (table_id, count) in events.closed_sessions() {
                history.record(&table_id, count);
            }
        }
        history
    }

    /// Tables and usage are read under the same lock, so a table closed
    /// concurrently is either free and counted, or neither.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        let (tables, history) =
            self.with_state(|state| (state.tables.list(), self.usage_from(&state.events)));
        recommendation::recommend(&tables, &history, self.config.recommendation.params())
    }

    pub fn dashboard_metrics(&self) -> DashboardMetrics {
        DashboardMetrics::assemble(self.config.history.clone(), self.recommendations())
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Live snapshots of one table, starting with the current one.
    pub fn subscribe_table(&self, table_id: &str) -> EngineResult<TableSubscription> {
        validation::validate_table_id(table_id)?;
        self.with_state(|state| {
            let current = self.resolve(&mut state.tables, table_id)?.clone();
            debug!(table_id, "Table subscribed");
            Ok(self.hub.subscribe_table(current))
        })
    }

    /// Change signals for the manager board, starting with one right away.
    pub fn subscribe_manager(&self) -> ManagerSubscription {
        self.hub.subscribe_manager()
    }
}

/// `ord-{millis}-{8 hex}`: sortable by creation and unique within a millisecond.
fn new_order_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ord-{}-{}", now.timestamp_millis(), &suffix[..8])
}
