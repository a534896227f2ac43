//! # bistro-engine: Floor State Engine for BistrOS
//!
//! Owns every table, order and event of a running restaurant floor and
//! tells subscribed views when something changed.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         BistrOS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    bistro-server (axum)                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Arc<FloorService>                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bistro-engine (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   FloorService ──► TableStore / OrderStore / EventLog           │   │
//! │  │        │                                                        │   │
//! │  │        └────────► NotificationHub ──► watch channels            │   │
//! │  │                                                                 │   │
//! │  │   BistroConfig (TOML + BISTROS_* env)   DashboardMetrics        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   bistro-core (pure rules)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use bistro_engine::{BistroConfig, FloorService};
//! use bistro_core::{OrderState, TableStatus};
//!
//! let floor = FloorService::new(BistroConfig::default());
//!
//! floor.scan_table("5").unwrap();
//! floor.update_cart("5", "p1", 2).unwrap();
//! let order = floor.place_order("5").unwrap().unwrap();
//!
//! floor.set_order_state(order.id(), OrderState::EnPreparacion).unwrap();
//! assert_eq!(floor.get_table("5").unwrap().status(), TableStatus::Ocupada);
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod hub;
pub mod service;
pub mod store;

pub use analytics::DashboardMetrics;
pub use config::{BistroConfig, FloorSettings, RecommendationSettings, ServerSettings, UsageSource};
pub use error::{EngineError, EngineResult};
pub use hub::{ManagerSignal, ManagerSubscription, NotificationHub, TableSubscription};
pub use service::{FloorService, OrderMove, TableUpdate};
