//! # Domain Events
//!
//! Append-only audit/analytics trail. Events are purely observational: the
//! transition engine never reads them back to make a decision.
//!
//! ## Wire Format
//! Each kind carries exactly one payload shape, serialized adjacently
//! tagged and flattened into the event:
//! ```json
//! { "id": "evt-42", "timestamp": "...", "tableId": "5",
//!   "type": "ORDER_UPDATE", "payload": { "orderId": "ord-...", "newState": "LISTO" } }
//! ```
//! Kinds without data omit `payload`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::order::OrderState;
use crate::payment::PaymentMethod;

/// What happened, with its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum EventKind {
    /// A client scanned the table QR.
    ScanQr {
        #[serde(rename = "connectedDevices")]
        connected_devices: u32,
    },

    /// A cart line changed.
    AddToCart {
        #[serde(rename = "productId")]
        product_id: String,
        delta: i32,
        /// Resulting quantity, 0 if the line was removed.
        quantity: u32,
    },

    /// A cart was submitted as an order.
    PlaceOrder {
        #[serde(rename = "orderId")]
        order_id: String,
        total: Money,
    },

    /// An order moved through the kitchen pipeline.
    OrderUpdate {
        #[serde(rename = "orderId")]
        order_id: String,
        #[serde(rename = "newState")]
        new_state: OrderState,
    },

    RequestWaiter,

    RequestBill {
        #[serde(rename = "paymentMethod")]
        payment_method: Option<PaymentMethod>,
    },

    PaymentCompleted {
        method: PaymentMethod,
        amount: Money,
    },

    CloseTable,
}

impl EventKind {
    /// The wire tag (`"SCAN_QR"`, `"CLOSE_TABLE"`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::ScanQr { .. } => "SCAN_QR",
            EventKind::AddToCart { .. } => "ADD_TO_CART",
            EventKind::PlaceOrder { .. } => "PLACE_ORDER",
            EventKind::OrderUpdate { .. } => "ORDER_UPDATE",
            EventKind::RequestWaiter => "REQUEST_WAITER",
            EventKind::RequestBill { .. } => "REQUEST_BILL",
            EventKind::PaymentCompleted { .. } => "PAYMENT_COMPLETED",
            EventKind::CloseTable => "CLOSE_TABLE",
        }
    }
}

/// One entry of the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub table_id: String,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind) -> DomainEvent {
        DomainEvent {
            id: "evt-1".to_string(),
            timestamp: Utc::now(),
            table_id: "5".to_string(),
            kind,
        }
    }

    #[test]
    fn test_payload_is_tagged_by_type() {
        let json = serde_json::to_value(event(EventKind::OrderUpdate {
            order_id: "ord-1".to_string(),
            new_state: OrderState::Listo,
        }))
        .unwrap();

        assert_eq!(json["tableId"], "5");
        assert_eq!(json["type"], "ORDER_UPDATE");
        assert_eq!(json["payload"]["orderId"], "ord-1");
        assert_eq!(json["payload"]["newState"], "LISTO");
    }

    #[test]
    fn test_unit_kinds_have_no_payload() {
        let json = serde_json::to_value(event(EventKind::CloseTable)).unwrap();
        assert_eq!(json["type"], "CLOSE_TABLE");
        assert!(json.get("payload").is_none());
    }

    #[test]
    fn test_name_matches_wire_tag() {
        let kinds = vec![
            EventKind::ScanQr { connected_devices: 1 },
            EventKind::RequestWaiter,
            EventKind::RequestBill { payment_method: None },
            EventKind::PaymentCompleted {
                method: PaymentMethod::Efectivo,
                amount: Money::from_units(100),
            },
        ];
        for kind in kinds {
            let json = serde_json::to_value(&kind).unwrap();
            assert_eq!(json["type"], kind.name());
        }
    }
}
