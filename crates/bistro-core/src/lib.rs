//! # bistro-core: Pure Table/Order Logic for BistrOS
//!
//! Every rule about tables, carts, orders and allocation lives here as pure
//! functions over plain data. No locks, no channels, no clock: callers pass
//! `now` in.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         BistrOS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Table view (QR)              Manager board / kitchen     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + WebSocket                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bistro-server (axum)                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   bistro-engine: FloorService, stores, event log, hub, config   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bistro-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   table   │  │   order   │  │ transition │  │ recommend │  │   │
//! │  │   │   Cart    │  │ Timeline  │  │  Applied / │  │ BAJO_USO  │  │   │
//! │  │   │  Status   │  │  Effect   │  │  Ignored   │  │ ROTACION  │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO LOCKS • NO CLOCK • PURE FUNCTIONS                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`table`] - Table, status, pending reason, cart
//! - [`order`] - Order, fulfillment state, timeline, table effect
//! - [`transition`] - Every valid state change
//! - [`recommendation`] - Free table allocation heuristic
//! - [`event`] - Domain events (tagged payloads)
//! - [`bill`] - Partial ticket grouped by product
//! - [`catalog`] / [`money`] / [`payment`] - Menu, integer money, payment methods
//! - [`validation`] / [`error`] - Input rules and error types
//! - [`seed`] - Demo floor
//!
//! ## Example Usage
//!
//! ```rust
//! use bistro_core::{transition, Catalog, Table, TableStatus};
//! use chrono::Utc;
//!
//! let catalog = Catalog::default_menu();
//! let mut table = Table::new("5");
//!
//! transition::scan(&mut table, Utc::now());
//! transition::update_cart(&mut table, "p1", 2, Utc::now());
//! let order = transition::place_order(&mut table, &catalog, "ord-1".into(), Utc::now()).unwrap();
//!
//! assert_eq!(order.total().units(), 25_000);
//! assert_eq!(table.status(), TableStatus::Pendiente);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bill;
pub mod catalog;
pub mod error;
pub mod event;
pub mod money;
pub mod order;
pub mod payment;
pub mod recommendation;
pub mod seed;
pub mod table;
pub mod transition;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use bill::{BillLine, TableBill};
pub use catalog::{Catalog, Product};
pub use error::ValidationError;
pub use event::{DomainEvent, EventKind};
pub use money::Money;
pub use order::{Order, OrderState, OrderTimeline, TableEffect};
pub use payment::PaymentMethod;
pub use recommendation::{
    AllocationParams, Recommendation, RecommendationReason, TablePerformance, UsageHistory,
};
pub use table::{Cart, CartItem, PendingReason, Table, TableStatus};
pub use transition::{IgnoreReason, Transition};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tables on the default floor.
pub const DEFAULT_TABLE_COUNT: u32 = 12;

/// Maximum quantity of a single product in a cart line.
///
/// ## Business Reason
/// Catches a mistyped "100" from a phone keypad before it hits the kitchen.
pub const MAX_ITEM_QUANTITY: u32 = 999;

/// Maximum length of a table id.
pub const MAX_TABLE_ID_LEN: usize = 32;
