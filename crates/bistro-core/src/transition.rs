//! # Transition Engine
//!
//! Pure functions enacting every valid state change on a [`Table`] and its
//! [`Order`]s. No locks, no clock, no notifications: the caller passes
//! `now`, and the engine crate wraps each call with the event log and the
//! notification hub.
//!
//! ## Table Transitions
//! ```text
//! ┌──────────────────────┬──────────────────────┬────────────────────────────┐
//! │ From                 │ Trigger              │ To                         │
//! ├──────────────────────┼──────────────────────┼────────────────────────────┤
//! │ LIBRE                │ scan                 │ ABIERTA (+1 device)        │
//! │ any other            │ scan                 │ unchanged (+1 device)      │
//! │ any, cart not empty  │ place order          │ PENDIENTE(PRODUCTOS)       │
//! │ any                  │ request waiter       │ PENDIENTE(CAMARERO)        │
//! │ any                  │ request bill         │ PENDIENTE(CUENTA)          │
//! │ PENDIENTE(CAMARERO)  │ attend waiter        │ OCUPADA                    │
//! │ PENDIENTE(CUENTA)    │ deliver bill         │ OCUPADA                    │
//! │ any                  │ payment completed    │ PAGADA                     │
//! │ any                  │ close                │ LIBRE (full reset)         │
//! └──────────────────────┴──────────────────────┴────────────────────────────┘
//! ```
//!
//! Order progress reaches the table only through
//! [`OrderState::table_effect`], applied in [`set_order_state`].
//!
//! A request while already PENDIENTE overwrites the reason: last request
//! wins, there is no queue of pending reasons.
//!
//! Applied transitions stamp `last_event_at`; ignored ones leave the table
//! byte-for-byte untouched.

use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::order::{Order, OrderState, TableEffect};
use crate::table::{PendingReason, Table, TableStatus};

// =============================================================================
// Outcome
// =============================================================================

/// Result of attempting a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State changed; the caller logs and notifies.
    Applied,
    /// Nothing changed. Not an error: UIs double-tap.
    Ignored(IgnoreReason),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Cart delta had no effect.
    CartUnchanged,
    /// Table is not waiting on the reason this action resolves.
    NotPending(PendingReason),
    /// Requested order state is not ahead of the current one.
    NotForward { current: OrderState, requested: OrderState },
    /// Order belongs to another table.
    TableMismatch,
}

// =============================================================================
// Client Transitions
// =============================================================================

/// A device scanned the table QR.
pub fn scan(table: &mut Table, now: DateTime<Utc>) -> Transition {
    if table.status() == TableStatus::Libre {
        table.settle(TableStatus::Abierta);
        table.set_opened_at(Some(now));
    }
    table.add_device();
    table.touch(now);
    Transition::Applied
}

/// Adds `delta` units of a product to the cart (negative removes).
///
/// Product existence is the caller's concern: this layer has no catalog
/// opinion about carts.
pub fn update_cart(
    table: &mut Table,
    product_id: &str,
    delta: i32,
    now: DateTime<Utc>,
) -> Transition {
    if !table.cart_mut().apply_delta(product_id, delta) {
        return Transition::Ignored(IgnoreReason::CartUnchanged);
    }
    table.touch(now);
    Transition::Applied
}

/// Submits the cart as a new order.
///
/// The cart is moved into the order in one step, so nothing added
/// concurrently can be lost between "snapshot" and "clear". Returns `None`
/// and leaves the table untouched when the cart is empty.
pub fn place_order(
    table: &mut Table,
    catalog: &Catalog,
    order_id: String,
    now: DateTime<Utc>,
) -> Option<Order> {
    if table.cart().is_empty() {
        return None;
    }

    let items = table.cart_mut().take();
    let order = Order::submit(order_id, table.id(), items, catalog, now);

    table.set_current_order(Some(order.id().to_string()));
    table.mark_pending(PendingReason::Productos);
    if table.opened_at().is_none() {
        table.set_opened_at(Some(now));
    }
    table.touch(now);

    Some(order)
}

pub fn request_waiter(table: &mut Table, now: DateTime<Utc>) -> Transition {
    table.mark_pending(PendingReason::Camarero);
    table.touch(now);
    Transition::Applied
}

pub fn request_bill(table: &mut Table, now: DateTime<Utc>) -> Transition {
    table.mark_pending(PendingReason::Cuenta);
    table.touch(now);
    Transition::Applied
}

/// Client confirmed the payment flow.
pub fn complete_payment(table: &mut Table, now: DateTime<Utc>) -> Transition {
    table.settle(TableStatus::Pagada);
    table.touch(now);
    Transition::Applied
}

// =============================================================================
// Manager Transitions
// =============================================================================

pub fn attend_waiter(table: &mut Table, now: DateTime<Utc>) -> Transition {
    resolve_pending(table, PendingReason::Camarero, now)
}

pub fn deliver_bill(table: &mut Table, now: DateTime<Utc>) -> Transition {
    resolve_pending(table, PendingReason::Cuenta, now)
}

fn resolve_pending(table: &mut Table, reason: PendingReason, now: DateTime<Utc>) -> Transition {
    if table.pending_reason() != Some(reason) {
        return Transition::Ignored(IgnoreReason::NotPending(reason));
    }
    table.settle(TableStatus::Ocupada);
    table.touch(now);
    Transition::Applied
}

/// Releases the table: LIBRE, empty cart, no order, no devices.
///
/// Orders of the finished session are not touched.
pub fn close(table: &mut Table, now: DateTime<Utc>) -> Transition {
    table.settle(TableStatus::Libre);
    table.cart_mut().clear();
    table.set_current_order(None);
    table.set_connected_devices(0);
    table.set_opened_at(None);
    table.touch(now);
    Transition::Applied
}

// =============================================================================
// Order Transitions
// =============================================================================

/// Moves an order forward and applies its effect on the parent table.
///
/// Any state strictly ahead of the current one is accepted (jumps are not
/// forbidden, skipped stages stay unstamped). Same or earlier states are
/// ignored, so the pipeline only ever advances.
pub fn set_order_state(
    order: &mut Order,
    table: &mut Table,
    requested: OrderState,
    now: DateTime<Utc>,
) -> Transition {
    if order.table_id() != table.id() {
        return Transition::Ignored(IgnoreReason::TableMismatch);
    }

    let current = order.state();
    if requested <= current {
        return Transition::Ignored(IgnoreReason::NotForward { current, requested });
    }

    order.enter(requested, now);

    match requested.table_effect() {
        TableEffect::ReleaseProductsPending => {
            if table.pending_reason() == Some(PendingReason::Productos) {
                table.settle(TableStatus::Ocupada);
            }
        }
        TableEffect::ForceServed => table.settle(TableStatus::Ocupada),
        TableEffect::None => {}
    }
    table.touch(now);

    Transition::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::Duration;

    fn t(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn ordered_table(id: &str) -> (Table, Order) {
        let catalog = Catalog::default_menu();
        let mut table = Table::new(id);
        scan(&mut table, t(0));
        update_cart(&mut table, "p1", 2, t(1));
        let order = place_order(&mut table, &catalog, "ord-1".into(), t(2)).unwrap();
        (table, order)
    }

    #[test]
    fn test_scan_opens_free_table() {
        let mut table = Table::new("5");
        assert!(scan(&mut table, t(0)).is_applied());
        assert_eq!(table.status(), TableStatus::Abierta);
        assert_eq!(table.connected_devices(), 1);
        assert_eq!(table.opened_at(), Some(t(0)));
        assert_eq!(table.last_event_at(), Some(t(0)));
    }

    #[test]
    fn test_rescan_only_counts_devices() {
        let mut table = Table::new("5");
        scan(&mut table, t(0));
        request_waiter(&mut table, t(10));
        scan(&mut table, t(20));

        assert_eq!(table.status(), TableStatus::Pendiente);
        assert_eq!(table.pending_reason(), Some(PendingReason::Camarero));
        assert_eq!(table.connected_devices(), 2);
        assert_eq!(table.opened_at(), Some(t(0)));
    }

    #[test]
    fn test_place_order_moves_cart_into_order() {
        let (table, order) = ordered_table("5");

        assert_eq!(order.total(), Money::from_units(25000));
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.table_id(), "5");
        assert!(table.cart().is_empty());
        assert_eq!(table.status(), TableStatus::Pendiente);
        assert_eq!(table.pending_reason(), Some(PendingReason::Productos));
        assert_eq!(table.current_order_id(), Some("ord-1"));
    }

    #[test]
    fn test_place_order_with_empty_cart_is_noop() {
        let catalog = Catalog::default_menu();
        let mut table = Table::new("5");
        scan(&mut table, t(0));
        let before = table.clone();

        assert!(place_order(&mut table, &catalog, "ord-x".into(), t(5)).is_none());
        assert_eq!(table, before);
    }

    #[test]
    fn test_cart_noop_does_not_touch_table() {
        let mut table = Table::new("5");
        let before = table.clone();
        assert_eq!(
            update_cart(&mut table, "p1", -1, t(3)),
            Transition::Ignored(IgnoreReason::CartUnchanged)
        );
        assert_eq!(table, before);
    }

    #[test]
    fn test_last_request_wins() {
        let mut table = Table::new("5");
        scan(&mut table, t(0));
        request_waiter(&mut table, t(1));
        request_bill(&mut table, t(2));
        assert_eq!(table.pending_reason(), Some(PendingReason::Cuenta));

        // The waiter call was overwritten, attending it does nothing
        assert!(!attend_waiter(&mut table, t(3)).is_applied());
        assert!(deliver_bill(&mut table, t(4)).is_applied());
        assert_eq!(table.status(), TableStatus::Ocupada);
        assert_eq!(table.pending_reason(), None);
    }

    #[test]
    fn test_attend_waiter_requires_waiter_call() {
        let (mut table, _) = ordered_table("5");
        let before = table.clone();
        assert_eq!(
            attend_waiter(&mut table, t(9)),
            Transition::Ignored(IgnoreReason::NotPending(PendingReason::Camarero))
        );
        assert_eq!(table, before);
    }

    #[test]
    fn test_preparation_releases_products_pending_only() {
        let (mut table, mut order) = ordered_table("5");
        set_order_state(&mut order, &mut table, OrderState::EnPreparacion, t(10));
        assert_eq!(table.status(), TableStatus::Ocupada);
        assert_eq!(table.pending_reason(), None);

        // A waiter call is not cleared by kitchen progress
        let (mut table, mut order) = ordered_table("6");
        request_waiter(&mut table, t(5));
        set_order_state(&mut order, &mut table, OrderState::EnPreparacion, t(10));
        assert_eq!(table.pending_reason(), Some(PendingReason::Camarero));
    }

    #[test]
    fn test_delivery_forces_served_over_any_pending() {
        let requests: [fn(&mut Table, DateTime<Utc>) -> Transition; 2] =
            [request_waiter, request_bill];
        for request in requests {
            let (mut table, mut order) = ordered_table("5");
            set_order_state(&mut order, &mut table, OrderState::EnPreparacion, t(10));
            request(&mut table, t(20));
            set_order_state(&mut order, &mut table, OrderState::Entregado, t(30));

            assert_eq!(table.status(), TableStatus::Ocupada);
            assert_eq!(table.pending_reason(), None);
        }
    }

    #[test]
    fn test_order_never_moves_backwards() {
        let (mut table, mut order) = ordered_table("5");
        set_order_state(&mut order, &mut table, OrderState::Listo, t(10));
        let stamped = order.timestamps().get(OrderState::Listo);

        let outcome = set_order_state(&mut order, &mut table, OrderState::EnPreparacion, t(20));
        assert_eq!(
            outcome,
            Transition::Ignored(IgnoreReason::NotForward {
                current: OrderState::Listo,
                requested: OrderState::EnPreparacion,
            })
        );
        assert_eq!(order.state(), OrderState::Listo);

        // Re-entering the same state does not restamp it
        set_order_state(&mut order, &mut table, OrderState::Listo, t(30));
        assert_eq!(order.timestamps().get(OrderState::Listo), stamped);
    }

    #[test]
    fn test_jump_leaves_skipped_stages_unstamped() {
        let (mut table, mut order) = ordered_table("5");
        set_order_state(&mut order, &mut table, OrderState::EnCamino, t(10));
        assert_eq!(order.timestamps().get(OrderState::EnPreparacion), None);
        assert_eq!(order.timestamps().get(OrderState::EnCamino), Some(t(10)));
    }

    #[test]
    fn test_order_for_other_table_is_ignored() {
        let (_, mut order) = ordered_table("5");
        let mut other = Table::new("6");
        assert_eq!(
            set_order_state(&mut order, &mut other, OrderState::Listo, t(10)),
            Transition::Ignored(IgnoreReason::TableMismatch)
        );
    }

    #[test]
    fn test_close_resets_everything_but_keeps_order() {
        let (mut table, mut order) = ordered_table("5");
        set_order_state(&mut order, &mut table, OrderState::Entregado, t(10));
        complete_payment(&mut table, t(20));
        assert_eq!(table.status(), TableStatus::Pagada);

        let order_before = order.clone();
        close(&mut table, t(30));

        assert_eq!(table.status(), TableStatus::Libre);
        assert_eq!(table.pending_reason(), None);
        assert!(table.cart().is_empty());
        assert_eq!(table.current_order_id(), None);
        assert_eq!(table.connected_devices(), 0);
        assert_eq!(table.opened_at(), None);
        assert_eq!(order, order_before);
    }

    #[test]
    fn test_pending_invariant_over_random_walk() {
        let catalog = Catalog::default_menu();
        let mut table = Table::new("9");
        let mut orders: Vec<Order> = Vec::new();
        let mut now = t(0);

        // Deterministic pseudo-random walk over every action
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        for step in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            now += Duration::seconds(1);

            match seed % 9 {
                0 => {
                    scan(&mut table, now);
                }
                1 => {
                    update_cart(&mut table, "p2", (seed % 5) as i32 - 2, now);
                }
                2 => {
                    if let Some(o) = place_order(&mut table, &catalog, format!("ord-{}", step), now) {
                        orders.push(o);
                    }
                }
                3 => {
                    request_waiter(&mut table, now);
                }
                4 => {
                    request_bill(&mut table, now);
                }
                5 => {
                    attend_waiter(&mut table, now);
                }
                6 => {
                    deliver_bill(&mut table, now);
                }
                7 => {
                    if let Some(order) = orders.last_mut() {
                        let target = OrderState::ALL[(seed % 5) as usize];
                        set_order_state(order, &mut table, target, now);
                    }
                }
                _ => {
                    if seed % 2 == 0 {
                        complete_payment(&mut table, now);
                    } else {
                        close(&mut table, now);
                    }
                }
            }

            assert!(table.pending_invariant_holds(), "broken at step {}", step);
        }
    }
}
