//! Demo floor used at startup so the table board is not empty.
//!
//! ```text
//! 1  LIBRE
//! 2  ABIERTA               2 devices, browsing
//! 3  PENDIENTE(PRODUCTOS)  ord-seed-3 waiting in the kitchen
//! 4  OCUPADA               ord-seed-4 already delivered
//! 5+ LIBRE
//! ```

use chrono::{DateTime, Duration, Utc};

use crate::money::Money;
use crate::order::{Order, OrderState};
use crate::recommendation::TablePerformance;
use crate::table::{CartItem, PendingReason, Table, TableStatus};

/// Tables and orders to preload into the stores.
#[derive(Debug, Clone, Default)]
pub struct SeedFloor {
    pub tables: Vec<Table>,
    pub orders: Vec<Order>,
}

/// Tables `1..=count`, all LIBRE.
pub fn empty_floor(count: u32) -> SeedFloor {
    SeedFloor {
        tables: (1..=count).map(|i| Table::new(i.to_string())).collect(),
        orders: Vec::new(),
    }
}

/// Tables `1..=count` with live sessions on tables 2, 3 and 4 (when the
/// floor is large enough to have them).
pub fn demo_floor(count: u32, now: DateTime<Utc>) -> SeedFloor {
    let mins = |m: i64| now - Duration::minutes(m);
    let mut floor = empty_floor(count);

    for table in floor.tables.iter_mut() {
        match table.id() {
            "2" => {
                table.settle(TableStatus::Abierta);
                table.set_connected_devices(2);
                table.set_opened_at(Some(mins(15)));
                table.touch(mins(2));
            }
            "3" => {
                let order = Order::with_total(
                    "ord-seed-3".to_string(),
                    "3",
                    vec![item("mock_pizza", 1), item("mock_coca", 2)],
                    Money::from_units(8500),
                    mins(5),
                );
                table.mark_pending(PendingReason::Productos);
                table.set_connected_devices(3);
                table.set_current_order(Some(order.id().to_string()));
                table.set_opened_at(Some(mins(45)));
                table.touch(mins(5));
                floor.orders.push(order);
            }
            "4" => {
                let mut order = Order::with_total(
                    "ord-seed-4".to_string(),
                    "4",
                    vec![item("mock_empanada", 3)],
                    Money::from_units(4500),
                    mins(60),
                );
                order.enter(OrderState::EnPreparacion, mins(50));
                order.enter(OrderState::Listo, mins(40));
                order.enter(OrderState::EnCamino, mins(35));
                order.enter(OrderState::Entregado, mins(30));

                table.settle(TableStatus::Ocupada);
                table.set_connected_devices(1);
                table.set_current_order(Some(order.id().to_string()));
                table.set_opened_at(Some(mins(70)));
                table.touch(mins(30));
                floor.orders.push(order);
            }
            _ => {}
        }
    }

    floor
}

/// Historical revenue and occupancy per table for the allocation heuristic.
pub fn demo_history() -> Vec<TablePerformance> {
    [
        ("4", 450_000, 100),
        ("7", 410_000, 82),
        ("1", 395_000, 65),
        ("9", 280_000, 40),
        ("3", 265_000, 22),
        ("6", 240_000, 18),
        ("2", 210_000, 15),
        ("5", 195_000, 12),
        ("8", 98_000, 10),
        ("10", 85_000, 8),
        ("11", 72_000, 5),
        ("12", 65_000, 2),
    ]
    .into_iter()
    .map(|(id, revenue, occupancy)| TablePerformance {
        table_id: id.to_string(),
        revenue: Money::from_units(revenue),
        occupancy_count: occupancy,
    })
    .collect()
}

fn item(product_id: &str, quantity: u32) -> CartItem {
    CartItem {
        product_id: product_id.to_string(),
        quantity,
    }
}
