//! Gateway server implementation.
//!
//! Accepts WebSocket connections at `/ws`. Clients subscribe to individual
//! issues or to the aggregate-statistics feed; events are delivered through
//! the hub's broadcast channels by one forwarder task per subscription, and
//! a lagging subscription is told to resync. The HTTP routes serve the
//! polling fallback from the same store the publish path writes.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use prometheus::Encoder;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use civica_hub::{EventReceiver, StatusBroadcastHub};
use civica_node::{EngineMetrics, ResolutionCoordinator, SubmissionPipeline};
use civica_store::ReportStore;
use civica_types::ReportId;

use crate::api;
use crate::subscriptions::{ClientMessage, ServerMessage};

/// Write half of a client socket, shared with that client's forwarder tasks.
type WsSink = Arc<tokio::sync::Mutex<SplitSink<WebSocket, Message>>>;

/// Shared state for the gateway.
pub struct GatewayState {
    pub hub: Arc<StatusBroadcastHub>,
    pub store: Arc<dyn ReportStore>,
    pub pipeline: Arc<SubmissionPipeline>,
    pub coordinator: Arc<ResolutionCoordinator>,
    pub metrics: Arc<EngineMetrics>,
    /// Polling cadence advertised to clients whose push channel is down.
    pub poll_interval_secs: u64,
}

/// One client-side subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum SubKey {
    Issue(ReportId),
    Stats,
}

/// The gateway server, configured with a port and shared state.
pub struct GatewayServer {
    pub port: u16,
    pub state: Arc<GatewayState>,
}

impl GatewayServer {
    pub fn new(port: u16, state: Arc<GatewayState>) -> Self {
        Self { port, state }
    }

    /// Build the router; exposed separately so tests can drive it without
    /// binding a port.
    pub fn router(state: Arc<GatewayState>) -> Router {
        use axum::routing::post;
        Router::new()
            .route("/ws", get(ws_handler))
            .route("/reports", get(list_reports).post(api::submit_report))
            .route("/reports/:id", get(get_report))
            .route("/reports/:id/status", post(api::update_status))
            .route("/reports/:id/resolve", post(api::resolve_report))
            .route("/reports/:id/upvote", post(api::toggle_upvote))
            .route("/reports/:id/comments", post(api::add_comment))
            .route("/reports/:id/delete", post(api::delete_report))
            .route("/metrics", get(metrics_text))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Start serving. Runs until the server is shut down.
    pub async fn start(&self) -> std::io::Result<()> {
        let app = Self::router(self.state.clone());
        let addr = format!("0.0.0.0:{}", self.port);
        info!(%addr, "gateway listening");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await
    }
}

/// Upgrade an HTTP request to a WebSocket connection.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
///
/// One forwarder task per active subscription copies events from the hub
/// receiver to the socket; all forwarders are aborted when the client
/// disconnects or unsubscribes.
async fn handle_socket(socket: WebSocket, state: Arc<GatewayState>) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let ws_sender: WsSink = Arc::new(tokio::sync::Mutex::new(ws_sender));

    let mut forwarders: HashMap<SubKey, tokio::task::JoinHandle<()>> = HashMap::new();

    debug!("websocket client connected");

    while let Some(msg_result) = ws_receiver.next().await {
        let msg = match msg_result {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "websocket receive error");
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                handle_text_message(&text, &state, &mut forwarders, &ws_sender).await;
            }
            Message::Close(_) => {
                debug!("client sent close frame");
                break;
            }
            Message::Ping(data) => {
                let mut sender = ws_sender.lock().await;
                let _ = sender.send(Message::Pong(data)).await;
            }
            _ => {}
        }
    }

    for (key, handle) in forwarders.drain() {
        debug!(?key, "aborting forwarder");
        handle.abort();
    }
    debug!("websocket client disconnected");
}

/// Process one text frame from the client.
async fn handle_text_message(
    text: &str,
    state: &Arc<GatewayState>,
    forwarders: &mut HashMap<SubKey, tokio::task::JoinHandle<()>>,
    ws_sender: &WsSink,
) {
    let client_msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            send_message(
                ws_sender,
                &ServerMessage::Error {
                    message: format!("invalid message: {e}"),
                },
            )
            .await;
            return;
        }
    };

    match client_msg {
        ClientMessage::Subscribe { report_ids } => {
            let count = report_ids.len();
            for id in report_ids {
                let key = SubKey::Issue(id);
                // Re-subscribing replaces the old forwarder.
                if let Some(old) = forwarders.remove(&key) {
                    old.abort();
                }
                let rx = state.hub.subscribe(id);
                forwarders.insert(key, spawn_forwarder(rx, ws_sender.clone(), Some(id)));
                debug!(report = %id, "client subscribed");
            }
            send_message(
                ws_sender,
                &ServerMessage::Ack {
                    action: "subscribe".to_string(),
                    count,
                },
            )
            .await;
        }
        ClientMessage::SubscribeStats => {
            if let Some(old) = forwarders.remove(&SubKey::Stats) {
                old.abort();
            }
            let rx = state.hub.subscribe_stats();
            forwarders.insert(SubKey::Stats, spawn_forwarder(rx, ws_sender.clone(), None));
            send_message(
                ws_sender,
                &ServerMessage::Ack {
                    action: "subscribe_stats".to_string(),
                    count: 1,
                },
            )
            .await;
        }
        ClientMessage::Unsubscribe { report_ids } => {
            let mut removed = 0;
            for id in report_ids {
                if let Some(handle) = forwarders.remove(&SubKey::Issue(id)) {
                    handle.abort();
                    removed += 1;
                    debug!(report = %id, "client unsubscribed");
                }
            }
            send_message(
                ws_sender,
                &ServerMessage::Ack {
                    action: "unsubscribe".to_string(),
                    count: removed,
                },
            )
            .await;
        }
        ClientMessage::Ping => {
            send_message(ws_sender, &ServerMessage::Pong).await;
        }
    }
}

fn spawn_forwarder(
    rx: EventReceiver,
    ws_sender: WsSink,
    report_id: Option<ReportId>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        forward_events(rx, ws_sender, report_id).await;
    })
}

/// Forwarder task: copies events from a hub receiver to the client socket.
/// A lag means this subscriber's oldest events were dropped; the client is
/// told to refetch current state instead of trusting the gap.
async fn forward_events(mut rx: EventReceiver, ws_sender: WsSink, report_id: Option<ReportId>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "failed to encode event");
                        continue;
                    }
                };
                let mut sender = ws_sender.lock().await;
                if sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(?report_id, lagged = n, "subscriber lagged, requesting resync");
                send_message(&ws_sender, &ServerMessage::Resync { report_id }).await;
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!(?report_id, "hub channel closed");
                break;
            }
        }
    }
}

async fn send_message(ws_sender: &WsSink, msg: &ServerMessage) {
    let text = match serde_json::to_string(msg) {
        Ok(text) => text,
        Err(_) => return,
    };
    let mut sender = ws_sender.lock().await;
    let _ = sender.send(Message::Text(text)).await;
}

// ── Polling fallback ───────────────────────────────────────────────────

/// Current state of one report — what a client refetches after a resync.
async fn get_report(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<u64>,
) -> Response {
    match state.store.get(ReportId(id)) {
        Ok(Some(report)) => Json(report).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// All open reports plus the advertised polling cadence.
async fn list_reports(State(state): State<Arc<GatewayState>>) -> Response {
    match state.store.open_reports() {
        Ok(reports) => Json(serde_json::json!({
            "poll_interval_secs": state.poll_interval_secs,
            "reports": reports,
        }))
        .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Prometheus text exposition of the engine metrics.
async fn metrics_text(State(state): State<Arc<GatewayState>>) -> Response {
    let encoder = prometheus::TextEncoder::new();
    let mut buf = Vec::new();
    match encoder.encode(&state.metrics.registry.gather(), &mut buf) {
        Ok(()) => (
            StatusCode::OK,
            String::from_utf8(buf).unwrap_or_default(),
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
