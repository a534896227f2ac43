//! # HTTP Routes
//!
//! One handler per [`FloorService`] operation. Handlers only extract,
//! call, and wrap; all rules live in the engine.
//!
//! ```text
//! Client (QR view)                       Manager (board / kitchen)
//! ─────────────────────────────────      ─────────────────────────────────
//! POST /api/tables/{id}/scan             GET  /api/tables
//! POST /api/tables/{id}/cart             POST /api/tables/{id}/attend
//! POST /api/tables/{id}/orders           POST /api/tables/{id}/deliver-bill
//! POST /api/tables/{id}/waiter           POST /api/tables/{id}/close
//! POST /api/tables/{id}/bill             GET  /api/orders, /api/kitchen
//! POST /api/tables/{id}/pay              PUT  /api/orders/{id}/state
//! GET  /api/tables/{id}[/orders|/bill]   POST /api/orders/{id}/advance
//! GET  /api/menu                         GET  /api/dashboard
//! ```

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use bistro_core::{
    DomainEvent, IgnoreReason, Money, Order, OrderState, PaymentMethod, Product, Table,
    TableBill, Transition,
};
use bistro_engine::{DashboardMetrics, FloorService, OrderMove, TableUpdate};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::ws;

/// Builds the full router. Middleware is left to the caller.
pub fn build_router(floor: Arc<FloorService>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Tables
        .route("/api/tables", get(list_tables))
        .route("/api/tables/{id}", get(get_table))
        .route("/api/tables/{id}/scan", post(scan_table))
        .route("/api/tables/{id}/cart", post(update_cart))
        .route("/api/tables/{id}/orders", get(table_orders).post(place_order))
        .route("/api/tables/{id}/waiter", post(request_waiter))
        .route("/api/tables/{id}/bill", get(table_bill).post(request_bill))
        .route("/api/tables/{id}/pay", post(pay_table))
        .route("/api/tables/{id}/attend", post(attend_waiter))
        .route("/api/tables/{id}/deliver-bill", post(deliver_bill))
        .route("/api/tables/{id}/close", post(close_table))
        .route("/api/tables/{id}/events", get(table_events))
        // Orders
        .route("/api/orders", get(list_orders))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/state", put(set_order_state))
        .route("/api/orders/{id}/advance", post(advance_order))
        .route("/api/kitchen", get(kitchen_queue))
        // Menu and analytics
        .route("/api/menu", get(menu))
        .route("/api/dashboard", get(dashboard))
        // Live views
        .route("/ws/tables/{id}", get(ws::table_socket))
        .route("/ws/manager", get(ws::manager_socket))
        .with_state(floor)
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRequest {
    pub product_id: String,
    pub delta: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRequest {
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Deserialize)]
pub struct PayRequest {
    pub method: PaymentMethod,
    pub amount: Money,
}

#[derive(Debug, Deserialize)]
pub struct OrderStateRequest {
    pub state: String,
}

/// Outcome of a table action plus the table as it is now.
#[derive(Debug, Serialize)]
pub struct TableActionResponse {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<&'static str>,
    pub table: Table,
}

#[derive(Debug, Serialize)]
pub struct OrderActionResponse {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<&'static str>,
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub tables: usize,
}

fn ignored_code(outcome: Transition) -> Option<&'static str> {
    match outcome {
        Transition::Applied => None,
        Transition::Ignored(IgnoreReason::CartUnchanged) => Some("CART_UNCHANGED"),
        Transition::Ignored(IgnoreReason::NotPending(_)) => Some("NOT_PENDING"),
        Transition::Ignored(IgnoreReason::NotForward { .. }) => Some("NOT_FORWARD"),
        Transition::Ignored(IgnoreReason::TableMismatch) => Some("TABLE_MISMATCH"),
    }
}

impl From<TableUpdate> for TableActionResponse {
    fn from(update: TableUpdate) -> Self {
        TableActionResponse {
            applied: update.is_applied(),
            ignored: ignored_code(update.outcome),
            table: update.table,
        }
    }
}

impl From<OrderMove> for OrderActionResponse {
    fn from(moved: OrderMove) -> Self {
        OrderActionResponse {
            applied: moved.is_applied(),
            ignored: ignored_code(moved.outcome),
            order: moved.order,
        }
    }
}

// =============================================================================
// Health
// =============================================================================

async fn health(State(floor): State<Arc<FloorService>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: "bistro-server",
        tables: floor.list_tables().len(),
    })
}

// =============================================================================
// Table Handlers
// =============================================================================

async fn list_tables(State(floor): State<Arc<FloorService>>) -> Json<Vec<Table>> {
    Json(floor.list_tables())
}

async fn get_table(
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
) -> ApiResult<Json<Table>> {
    Ok(Json(floor.get_table(&table_id)?))
}

async fn scan_table(
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
) -> ApiResult<Json<Table>> {
    Ok(Json(floor.scan_table(&table_id)?))
}

async fn update_cart(
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
    Json(body): Json<CartRequest>,
) -> ApiResult<Json<TableActionResponse>> {
    Ok(Json(floor.update_cart(&table_id, &body.product_id, body.delta)?.into()))
}

/// `201` with the order, or `200` with `null` when the cart was empty.
async fn place_order(
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let placed = floor.place_order(&table_id)?;
    let status = if placed.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(placed)))
}

async fn table_orders(
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(floor.table_orders(&table_id)?))
}

async fn request_waiter(
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
) -> ApiResult<Json<TableActionResponse>> {
    Ok(Json(floor.request_waiter(&table_id)?.into()))
}

async fn request_bill(
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
    body: Option<Json<BillRequest>>,
) -> ApiResult<Json<TableActionResponse>> {
    let method = body.and_then(|Json(b)| b.payment_method);
    Ok(Json(floor.request_bill(&table_id, method)?.into()))
}

async fn table_bill(
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
) -> ApiResult<Json<TableBill>> {
    Ok(Json(floor.table_bill(&table_id)?))
}

async fn pay_table(
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
    Json(body): Json<PayRequest>,
) -> ApiResult<Json<TableActionResponse>> {
    Ok(Json(floor.pay_table(&table_id, body.method, body.amount)?.into()))
}

async fn attend_waiter(
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
) -> ApiResult<Json<TableActionResponse>> {
    Ok(Json(floor.attend_waiter(&table_id)?.into()))
}

async fn deliver_bill(
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
) -> ApiResult<Json<TableActionResponse>> {
    Ok(Json(floor.deliver_bill(&table_id)?.into()))
}

async fn close_table(
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
) -> ApiResult<Json<TableActionResponse>> {
    Ok(Json(floor.close_table(&table_id)?.into()))
}

async fn table_events(
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
) -> ApiResult<Json<Vec<DomainEvent>>> {
    Ok(Json(floor.table_events(&table_id)?))
}

// =============================================================================
// Order Handlers
// =============================================================================

async fn list_orders(State(floor): State<Arc<FloorService>>) -> Json<Vec<Order>> {
    Json(floor.list_orders())
}

async fn get_order(
    State(floor): State<Arc<FloorService>>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(floor.get_order(&order_id)?))
}

async fn set_order_state(
    State(floor): State<Arc<FloorService>>,
    Path(order_id): Path<String>,
    Json(body): Json<OrderStateRequest>,
) -> ApiResult<Json<OrderActionResponse>> {
    let state: OrderState = body.state.parse().map_err(ApiError::validation)?;
    Ok(Json(floor.set_order_state(&order_id, state)?.into()))
}

async fn advance_order(
    State(floor): State<Arc<FloorService>>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<OrderActionResponse>> {
    Ok(Json(floor.advance_order(&order_id)?.into()))
}

async fn kitchen_queue(State(floor): State<Arc<FloorService>>) -> Json<Vec<Order>> {
    Json(floor.kitchen_queue())
}

// =============================================================================
// Menu and Analytics
// =============================================================================

async fn menu(State(floor): State<Arc<FloorService>>) -> Json<Vec<Product>> {
    Json(floor.menu().products().to_vec())
}

async fn dashboard(State(floor): State<Arc<FloorService>>) -> Json<DashboardMetrics> {
    Json(floor.dashboard_metrics())
}
