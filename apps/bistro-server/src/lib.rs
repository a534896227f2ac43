//! # BistrOS Floor Server
//!
//! HTTP and WebSocket surface over [`bistro_engine::FloorService`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Floor Server                                    │
//! │                                                                         │
//! │  QR view / board ──► axum (8080) ──► routes ──► FloorService            │
//! │                                                    │                    │
//! │  QR view / board ◄── ws ◄── subscriptions ◄────────┘                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! `bistros.toml` from the platform config dir (or the path given as the
//! first argument), then environment variables:
//! - `BISTROS_PORT` / `BISTROS_BIND_ADDR` - listen address (default 0.0.0.0:8080)
//! - `BISTROS_TABLE_COUNT` - tables created at startup (default 12)
//! - `BISTROS_SEED_DEMO` - start with the demo floor (default true)
//! - `BISTROS_LAZY_TABLES` - create unknown tables on first use (default true)
//! - `BISTROS_USAGE_SOURCE` - `static` or `live` allocation history
//! - `RUST_LOG` - log filter (default `info,bistro=debug`)

pub mod error;
pub mod routes;
pub mod ws;

pub use error::{ApiError, ApiResult};
pub use routes::build_router;
