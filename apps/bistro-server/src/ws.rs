//! # Live Views over WebSocket
//!
//! ```text
//! /ws/tables/{id}   ──► table JSON now, then after every applied change
//! /ws/manager       ──► {"revision": n} now, then after every board change
//! ```
//!
//! Both sockets are push-only. Anything the client sends besides Close is
//! dropped; actions go through the HTTP routes.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use bistro_engine::{FloorService, ManagerSubscription, TableSubscription};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiResult;

/// Upgrade for one table. The id is checked before upgrading so a bad one
/// gets a plain HTTP error.
pub async fn table_socket(
    ws: WebSocketUpgrade,
    State(floor): State<Arc<FloorService>>,
    Path(table_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let subscription = floor.subscribe_table(&table_id)?;
    Ok(ws.on_upgrade(move |socket| stream_table(socket, subscription)))
}

pub async fn manager_socket(
    ws: WebSocketUpgrade,
    State(floor): State<Arc<FloorService>>,
) -> impl IntoResponse {
    let subscription = floor.subscribe_manager();
    ws.on_upgrade(move |socket| stream_manager(socket, subscription))
}

async fn stream_table(socket: WebSocket, mut subscription: TableSubscription) {
    let table_id = subscription.table_id().to_string();
    let (mut sender, mut receiver) = socket.split();
    info!(table_id = %table_id, "Table view connected");

    loop {
        tokio::select! {
            snapshot = subscription.changed() => {
                let Some(table) = snapshot else { break };
                if let Err(e) = send_json(&mut sender, &table).await {
                    debug!(table_id = %table_id, ?e, "Table view send failed");
                    break;
                }
            }
            incoming = receiver.next() => {
                if !keep_open(incoming) {
                    break;
                }
            }
        }
    }

    subscription.unsubscribe();
    info!(table_id = %table_id, "Table view disconnected");
}

async fn stream_manager(socket: WebSocket, mut subscription: ManagerSubscription) {
    let (mut sender, mut receiver) = socket.split();
    info!("Manager board connected");

    loop {
        tokio::select! {
            signal = subscription.changed() => {
                let Some(signal) = signal else { break };
                if let Err(e) = send_json(&mut sender, &signal).await {
                    debug!(?e, "Manager send failed");
                    break;
                }
            }
            incoming = receiver.next() => {
                if !keep_open(incoming) {
                    break;
                }
            }
        }
    }

    subscription.unsubscribe();
    info!("Manager board disconnected");
}

/// `false` once the client closed or the socket failed.
fn keep_open(incoming: Option<Result<Message, axum::Error>>) -> bool {
    match incoming {
        Some(Ok(Message::Close(_))) | None => false,
        Some(Ok(_)) => true,
        Some(Err(e)) => {
            warn!(?e, "WebSocket error");
            false
        }
    }
}

async fn send_json<T: Serialize>(
    sender: &mut SplitSink<WebSocket, Message>,
    value: &T,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(value).map_err(axum::Error::new)?;
    sender.send(Message::Text(json.into())).await
}
