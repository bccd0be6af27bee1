//! Transport adapter for live status delivery.
//!
//! Clients connect over WebSocket and subscribe to:
//! - Individual issues (status, resolution, upvote, comment events)
//! - The aggregate-statistics feed (every issue, for dashboard counters)
//!
//! A client whose push channel lags or drops falls back to polling the
//! HTTP routes, which read the same store the publish path writes — the
//! two views can never diverge.

pub mod api;
pub mod server;
pub mod subscriptions;

pub use server::{GatewayServer, GatewayState};
