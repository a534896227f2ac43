//! # Order
//!
//! One cart submission and its kitchen/delivery progress.
//!
//! ## Fulfillment Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  RECIBIDO ──► EN_PREPARACION ──► LISTO ──► EN_CAMINO ──► ENTREGADO      │
//! │     │              │                                         │          │
//! │     │              └─ table PENDIENTE(PRODUCTOS) → OCUPADA   │          │
//! │     │                                                        │          │
//! │     │                          table → OCUPADA (always) ─────┘          │
//! │     │                                                                   │
//! │  stamped at creation                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An order is immutable except for `state` and `timestamps`. The total is
//! computed once from the catalog at submission and never recomputed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::money::Money;
use crate::table::CartItem;

// =============================================================================
// Order State
// =============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum OrderState {
    #[default]
    Recibido,
    EnPreparacion,
    Listo,
    EnCamino,
    Entregado,
}

impl OrderState {
    /// All states in pipeline order.
    pub const ALL: [OrderState; 5] = [
        OrderState::Recibido,
        OrderState::EnPreparacion,
        OrderState::Listo,
        OrderState::EnCamino,
        OrderState::Entregado,
    ];

    /// The single forward step, `None` once delivered.
    pub fn next(self) -> Option<OrderState> {
        match self {
            OrderState::Recibido => Some(OrderState::EnPreparacion),
            OrderState::EnPreparacion => Some(OrderState::Listo),
            OrderState::Listo => Some(OrderState::EnCamino),
            OrderState::EnCamino => Some(OrderState::Entregado),
            OrderState::Entregado => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == OrderState::Entregado
    }

    /// What reaching this state does to the parent table.
    pub fn table_effect(self) -> TableEffect {
        match self {
            OrderState::EnPreparacion => TableEffect::ReleaseProductsPending,
            OrderState::Entregado => TableEffect::ForceServed,
            _ => TableEffect::None,
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderState::Recibido => write!(f, "RECIBIDO"),
            OrderState::EnPreparacion => write!(f, "EN_PREPARACION"),
            OrderState::Listo => write!(f, "LISTO"),
            OrderState::EnCamino => write!(f, "EN_CAMINO"),
            OrderState::Entregado => write!(f, "ENTREGADO"),
        }
    }
}

impl std::str::FromStr for OrderState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "RECIBIDO" => Ok(OrderState::Recibido),
            "EN_PREPARACION" => Ok(OrderState::EnPreparacion),
            "LISTO" => Ok(OrderState::Listo),
            "EN_CAMINO" => Ok(OrderState::EnCamino),
            "ENTREGADO" => Ok(OrderState::Entregado),
            other => Err(format!("Unknown order state: '{}'", other)),
        }
    }
}

/// The one-directional coupling from order progress to table status.
///
/// ```text
/// EN_PREPARACION → ReleaseProductsPending: PENDIENTE(PRODUCTOS) → OCUPADA,
///                  any other table status is left alone
/// ENTREGADO      → ForceServed: table → OCUPADA whatever it was waiting on
/// others         → None
/// ```
///
/// `ForceServed` deliberately overrides a waiter or bill request that
/// arrived while the order was on its way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEffect {
    None,
    ReleaseProductsPending,
    ForceServed,
}

// =============================================================================
// Timeline
// =============================================================================

/// When each stage was first reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub struct OrderTimeline {
    #[ts(as = "Option<String>")]
    recibido: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    en_preparacion: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    listo: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    en_camino: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    entregado: Option<DateTime<Utc>>,
}

impl OrderTimeline {
    pub fn get(&self, state: OrderState) -> Option<DateTime<Utc>> {
        *self.slot(state)
    }

    /// Stamps `state` the first time it is reached.
    ///
    /// `now` is clamped to the latest stamp of an earlier stage so the
    /// timeline never goes backwards, even with a skewed clock. Returns
    /// `false` if the state was already stamped.
    pub fn stamp(&mut self, state: OrderState, now: DateTime<Utc>) -> bool {
        if self.get(state).is_some() {
            return false;
        }

        let floor = OrderState::ALL
            .iter()
            .take_while(|s| **s < state)
            .filter_map(|s| self.get(*s))
            .max();
        let at = match floor {
            Some(prev) if prev > now => prev,
            _ => now,
        };

        *self.slot_mut(state) = Some(at);
        true
    }

    fn slot(&self, state: OrderState) -> &Option<DateTime<Utc>> {
        match state {
            OrderState::Recibido => &self.recibido,
            OrderState::EnPreparacion => &self.en_preparacion,
            OrderState::Listo => &self.listo,
            OrderState::EnCamino => &self.en_camino,
            OrderState::Entregado => &self.entregado,
        }
    }

    fn slot_mut(&mut self, state: OrderState) -> &mut Option<DateTime<Utc>> {
        match state {
            OrderState::Recibido => &mut self.recibido,
            OrderState::EnPreparacion => &mut self.en_preparacion,
            OrderState::Listo => &mut self.listo,
            OrderState::EnCamino => &mut self.en_camino,
            OrderState::Entregado => &mut self.entregado,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    id: String,
    table_id: String,
    /// Snapshot of the cart at submission time.
    items: Vec<CartItem>,
    /// Frozen at creation.
    total: Money,
    state: OrderState,
    timestamps: OrderTimeline,
    #[ts(as = "String")]
    created_at: DateTime<Utc>,
}

impl Order {
    /// Builds an order from submitted cart items, pricing them against the
    /// catalog as it is right now. Unknown products are priced at 0.
    pub(crate) fn submit(
        id: String,
        table_id: &str,
        items: Vec<CartItem>,
        catalog: &Catalog,
        now: DateTime<Utc>,
    ) -> Self {
        let total = items
            .iter()
            .map(|i| {
                catalog
                    .price_of(&i.product_id)
                    .map(|price| price * i.quantity)
                    .unwrap_or_default()
            })
            .sum();

        Order::with_total(id, table_id, items, total, now)
    }

    /// Builds an order with an explicit total (seed data, imports).
    pub(crate) fn with_total(
        id: String,
        table_id: &str,
        items: Vec<CartItem>,
        total: Money,
        now: DateTime<Utc>,
    ) -> Self {
        let mut timestamps = OrderTimeline::default();
        timestamps.stamp(OrderState::Recibido, now);

        Order {
            id,
            table_id: table_id.to_string(),
            items,
            total,
            state: OrderState::Recibido,
            timestamps,
            created_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn timestamps(&self) -> &OrderTimeline {
        &self.timestamps
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_active(&self) -> bool {
        !self.state.is_terminal()
    }

    pub(crate) fn enter(&mut self, state: OrderState, now: DateTime<Utc>) {
        self.state = state;
        self.timestamps.stamp(state, now);
    }
}
