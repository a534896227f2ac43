//! Partial ticket: everything a table has ordered, grouped by product and
//! priced at today's menu prices.
//!
//! This is what the client sees before choosing a payment method. It is
//! not the sum of the frozen order totals: a product that left the menu
//! contributes 0 here while its order keeps the original total.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::money::Money;
use crate::order::Order;
use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillLine {
    pub product_id: String,
    /// Menu name, `None` for products no longer on the menu.
    pub name: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TableBill {
    pub table_id: String,
    /// One line per product, in first-ordered order.
    pub lines: Vec<BillLine>,
    pub total: Money,
}

impl TableBill {
    /// Groups the items of `orders` by product. Orders of other tables are
    /// skipped.
    pub fn from_orders<'a>(
        table_id: &str,
        orders: impl IntoIterator<Item = &'a Order>,
        catalog: &Catalog,
    ) -> Self {
        let mut lines: Vec<BillLine> = Vec::new();

        for order in orders.into_iter().filter(|o| o.table_id() == table_id) {
            for item in order.items() {
                match lines.iter_mut().find(|l| l.product_id == item.product_id) {
                    Some(line) => line.quantity += item.quantity,
                    None => {
                        let product = catalog.get(&item.product_id);
                        lines.push(BillLine {
                            product_id: item.product_id.clone(),
                            name: product.map(|p| p.name.clone()),
                            quantity: item.quantity,
                            unit_price: product.map(|p| p.price).unwrap_or_default(),
                            subtotal: Money::zero(),
                        });
                    }
                }
            }
        }

        for line in lines.iter_mut() {
            line.subtotal = line.unit_price * line.quantity;
        }
        let total = lines.iter().map(|l| l.subtotal).sum();

        TableBill {
            table_id: table_id.to_string(),
            lines,
            total,
        }
    }

    /// Bill for the table's current session: only orders placed since it
    /// was opened. A table with no open session bills nothing.
    pub fn for_session<'a>(
        table: &Table,
        orders: impl IntoIterator<Item = &'a Order>,
        catalog: &Catalog,
    ) -> Self {
        match table.opened_at() {
            Some(opened_at) => Self::from_orders(
                table.id(),
                orders.into_iter().filter(|o| o.created_at() >= opened_at),
                catalog,
            ),
            None => Self::from_orders(table.id(), std::iter::empty(), catalog),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CartItem;
    use chrono::{DateTime, Duration, Utc};

    fn order(id: &str, table_id: &str, items: &[(&str, u32)]) -> Order {
        order_at(id, table_id, items, Utc::now())
    }

    fn order_at(id: &str, table_id: &str, items: &[(&str, u32)], at: DateTime<Utc>) -> Order {
        let items = items
            .iter()
            .map(|(p, q)| CartItem {
                product_id: p.to_string(),
                quantity: *q,
            })
            .collect();
        Order::submit(id.to_string(), table_id, items, &Catalog::default_menu(), at)
    }

    #[test]
    fn test_groups_rounds_by_product() {
        let catalog = Catalog::default_menu();
        let orders = vec![
            order("o1", "5", &[("p1", 2), ("p3", 1)]),
            order("o2", "5", &[("p3", 2), ("p5", 1)]),
            order("o3", "6", &[("p1", 9)]),
        ];

        let bill = TableBill::from_orders("5", &orders, &catalog);

        let summary: Vec<(&str, u32)> = bill
            .lines
            .iter()
            .map(|l| (l.product_id.as_str(), l.quantity))
            .collect();
        assert_eq!(summary, vec![("p1", 2), ("p3", 3), ("p5", 1)]);
        assert_eq!(bill.total, Money::from_units(2 * 12500 + 3 * 4500 + 5500));
    }

    #[test]
    fn test_unknown_product_counts_zero() {
        let catalog = Catalog::default_menu();
        let orders = vec![order("o1", "3", &[("mock_pizza", 1), ("p2", 1)])];

        let bill = TableBill::from_orders("3", &orders, &catalog);

        assert_eq!(bill.lines[0].name, None);
        assert_eq!(bill.lines[0].subtotal, Money::zero());
        assert_eq!(bill.total, Money::from_units(6500));
    }

    #[test]
    fn test_no_orders_empty_bill() {
        let bill = TableBill::from_orders("1", &[], &Catalog::default_menu());
        assert!(bill.is_empty());
        assert!(bill.total.is_zero());
    }

    #[test]
    fn test_session_bill_skips_earlier_sessions() {
        let catalog = Catalog::default_menu();
        let start = Utc::now();
        let orders = vec![
            order_at("o1", "5", &[("p1", 2)], start),
            order_at("o2", "5", &[("p3", 1)], start + Duration::minutes(90)),
        ];
        let mut table = Table::new("5");
        table.set_opened_at(Some(start + Duration::minutes(80)));

        let bill = TableBill::for_session(&table, &orders, &catalog);

        assert_eq!(bill.lines.len(), 1);
        assert_eq!(bill.lines[0].product_id, "p3");
        assert_eq!(bill.total, Money::from_units(4500));
    }

    #[test]
    fn test_closed_table_bills_nothing() {
        let orders = vec![order("o1", "5", &[("p1", 2)])];
        let bill = TableBill::for_session(&Table::new("5"), &orders, &Catalog::default_menu());
        assert!(bill.is_empty());
        assert_eq!(bill.table_id, "5");
    }
}
