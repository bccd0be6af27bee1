//! Wire messages exchanged with WebSocket clients.

use civica_types::ReportId;
use serde::{Deserialize, Serialize};

/// A request from a client.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start receiving events for these issues.
    Subscribe { report_ids: Vec<ReportId> },
    /// Start receiving the aggregate-statistics feed.
    SubscribeStats,
    /// Stop receiving events for these issues.
    Unsubscribe { report_ids: Vec<ReportId> },
    Ping,
}

/// A message sent to a client (status events are forwarded separately, in
/// their own wire shape).
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Ack { action: String, count: usize },
    Error { message: String },
    Pong,
    /// Events were dropped for this subscription; the client must refetch
    /// current state. `report_id` is absent for the stats feed.
    Resync { report_id: Option<ReportId> },
}
