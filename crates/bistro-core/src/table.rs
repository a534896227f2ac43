//! # Table
//!
//! A physical dining table and its session state.
//!
//! ## Status Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Table Status Machine                              │
//! │                                                                         │
//! │   LIBRE ──scan──► ABIERTA ──place order──► PENDIENTE(PRODUCTOS)         │
//! │     ▲                                            │                      │
//! │     │                          order EN_PREPARACION / ENTREGADO         │
//! │     │                                            ▼                      │
//! │     │          waiter / bill request ──► PENDIENTE(CAMARERO|CUENTA)     │
//! │     │                                            │ attend / deliver     │
//! │     │                                            ▼                      │
//! │     │                                        OCUPADA                    │
//! │     │                                            │ payment              │
//! │     │                                            ▼                      │
//! │     └──────────────── close ─────────────────  PAGADA                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fields are private: every mutation goes through [`crate::transition`],
//! which keeps `pending_reason` set exactly while the status is PENDIENTE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::money::Money;

// =============================================================================
// Table Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum TableStatus {
    /// Free, no active session.
    #[default]
    Libre,
    /// Opened by a QR scan, client browsing, nothing pending.
    Abierta,
    /// Waiting on the manager, see [`PendingReason`].
    Pendiente,
    /// Being served, nothing pending.
    Ocupada,
    /// Paid, waiting for the table to be physically released.
    Pagada,
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableStatus::Libre => write!(f, "LIBRE"),
            TableStatus::Abierta => write!(f, "ABIERTA"),
            TableStatus::Pendiente => write!(f, "PENDIENTE"),
            TableStatus::Ocupada => write!(f, "OCUPADA"),
            TableStatus::Pagada => write!(f, "PAGADA"),
        }
    }
}

/// What a PENDIENTE table is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PendingReason {
    /// A new order was submitted.
    Productos,
    /// The client called a waiter.
    Camarero,
    /// The client asked for the bill.
    Cuenta,
}

impl std::fmt::Display for PendingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingReason::Productos => write!(f, "PRODUCTOS"),
            PendingReason::Camarero => write!(f, "CAMARERO"),
            PendingReason::Cuenta => write!(f, "CUENTA"),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One line of a table cart or an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

/// The not-yet-submitted items of a table.
///
/// ## Invariants
/// - Items are unique by `product_id`
/// - Quantity is always > 0; a delta that takes a line to zero or below
///   removes it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart(Vec<CartItem>);

impl Cart {
    pub fn new() -> Self {
        Cart(Vec::new())
    }

    /// Adds `delta` units of a product (negative removes).
    ///
    /// Returns `true` if the cart changed. A non-positive delta for a
    /// product that is not in the cart is a no-op.
    pub fn apply_delta(&mut self, product_id: &str, delta: i32) -> bool {
        if delta == 0 {
            return false;
        }

        if let Some(idx) = self.0.iter().position(|i| i.product_id == product_id) {
            let next = self.0[idx].quantity as i64 + delta as i64;
            if next <= 0 {
                self.0.remove(idx);
            } else {
                self.0[idx].quantity = next as u32;
            }
            return true;
        }

        if delta > 0 {
            self.0.push(CartItem {
                product_id: product_id.to_string(),
                quantity: delta as u32,
            });
            return true;
        }

        false
    }

    /// Quantity currently in the cart for a product (0 if absent).
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.0
            .iter()
            .find(|i| i.product_id == product_id)
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    pub fn items(&self) -> &[CartItem] {
        &self.0
    }

    /// Sum of all quantities (the badge on the cart button).
    pub fn item_count(&self) -> u32 {
        self.0.iter().map(|i| i.quantity).sum()
    }

    /// Cart value at current catalog prices. Unknown products count as 0.
    pub fn total(&self, catalog: &Catalog) -> Money {
        self.0
            .iter()
            .map(|i| {
                catalog
                    .price_of(&i.product_id)
                    .map(|price| price * i.quantity)
                    .unwrap_or_default()
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Moves the items out, leaving the cart empty.
    pub(crate) fn take(&mut self) -> Vec<CartItem> {
        std::mem::take(&mut self.0)
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

// =============================================================================
// Table
// =============================================================================

/// Snapshot-able state of one physical table.
///
/// Tables are never deleted: closing one resets it to LIBRE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Table {
    id: String,
    status: TableStatus,
    pending_reason: Option<PendingReason>,
    /// Active client sessions. Only a full close resets it.
    connected_devices: u32,
    cart: Cart,
    /// In-flight order. Weak reference, the order outlives the session.
    current_order_id: Option<String>,
    #[ts(as = "Option<String>")]
    opened_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    last_event_at: Option<DateTime<Utc>>,
}

impl Table {
    /// A free table with no session.
    pub fn new(id: impl Into<String>) -> Self {
        Table {
            id: id.into(),
            status: TableStatus::Libre,
            pending_reason: None,
            connected_devices: 0,
            cart: Cart::new(),
            current_order_id: None,
            opened_at: None,
            last_event_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> TableStatus {
        self.status
    }

    pub fn pending_reason(&self) -> Option<PendingReason> {
        self.pending_reason
    }

    pub fn connected_devices(&self) -> u32 {
        self.connected_devices
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn current_order_id(&self) -> Option<&str> {
        self.current_order_id.as_deref()
    }

    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.opened_at
    }

    pub fn last_event_at(&self) -> Option<DateTime<Utc>> {
        self.last_event_at
    }

    pub fn is_free(&self) -> bool {
        self.status == TableStatus::Libre
    }

    /// `pending_reason` is set iff the table is PENDIENTE.
    pub fn pending_invariant_holds(&self) -> bool {
        (self.status == TableStatus::Pendiente) == self.pending_reason.is_some()
    }

    // -------------------------------------------------------------------------
    // Crate-internal mutators (used by `transition` and `seed`)
    // -------------------------------------------------------------------------

    pub(crate) fn mark_pending(&mut self, reason: PendingReason) {
        self.status = TableStatus::Pendiente;
        self.pending_reason = Some(reason);
    }

    /// Moves to a non-pending status and clears the reason.
    pub(crate) fn settle(&mut self, status: TableStatus) {
        debug_assert!(status != TableStatus::Pendiente);
        self.status = status;
        self.pending_reason = None;
    }

    pub(crate) fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub(crate) fn set_current_order(&mut self, order_id: Option<String>) {
        self.current_order_id = order_id;
    }

    pub(crate) fn add_device(&mut self) {
        self.connected_devices = self.connected_devices.saturating_add(1);
    }

    pub(crate) fn set_connected_devices(&mut self, devices: u32) {
        self.connected_devices = devices;
    }

    pub(crate) fn set_opened_at(&mut self, at: Option<DateTime<Utc>>) {
        self.opened_at = at;
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_event_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_is_free() {
        let table = Table::new("7");
        assert_eq!(table.status(), TableStatus::Libre);
        assert_eq!(table.pending_reason(), None);
        assert_eq!(table.connected_devices(), 0);
        assert!(table.cart().is_empty());
        assert!(table.pending_invariant_holds());
    }

    #[test]
    fn test_cart_delta_merges_and_collapses() {
        let mut cart = Cart::new();
        assert!(cart.apply_delta("p1", 2));
        assert!(cart.apply_delta("p1", 1));
        assert!(cart.apply_delta("p3", 1));
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.quantity_of("p1"), 3);
        assert_eq!(cart.item_count(), 4);

        assert!(cart.apply_delta("p1", -5));
        assert_eq!(cart.quantity_of("p1"), 0);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_cart_ignores_removal_of_absent_product() {
        let mut cart = Cart::new();
        assert!(!cart.apply_delta("p2", -1));
        assert!(!cart.apply_delta("p2", 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_total_uses_catalog_prices() {
        let catalog = Catalog::default_menu();
        let mut cart = Cart::new();
        cart.apply_delta("p1", 2);
        cart.apply_delta("p3", 1);
        cart.apply_delta("unknown", 4);
        assert_eq!(cart.total(&catalog), Money::from_units(2 * 12500 + 4500));
    }

    #[test]
    fn test_table_json_shape() {
        let mut table = Table::new("5");
        table.mark_pending(PendingReason::Camarero);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["status"], "PENDIENTE");
        assert_eq!(json["pendingReason"], "CAMARERO");
        assert_eq!(json["connectedDevices"], 0);
        assert!(json["cart"].as_array().unwrap().is_empty());
        assert!(json["currentOrderId"].is_null());
    }
}
