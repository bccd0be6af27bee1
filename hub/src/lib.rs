//! Status broadcast hub — fans committed state changes out to live viewers.
//!
//! One bounded broadcast channel per issue, created lazily on first
//! subscribe, plus a global channel for aggregate-statistics dashboards.
//! Delivery is at-least-once in per-issue commit order; there is no durable
//! backlog. A subscriber that falls behind its channel capacity loses the
//! oldest events and observes a lag, which the transport layer surfaces as
//! "refetch current state".
//!
//! The registry lock is the hub's own and is never held across an await, so
//! publishing is never blocked behind a resolution transaction.

use civica_types::{EventPayload, ReportId, StatusEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Receiver half handed to each subscriber of an issue (or of the stats
/// feed). `RecvError::Lagged` means events were dropped for this subscriber
/// and it must resync by refetching current state.
pub type EventReceiver = broadcast::Receiver<StatusEvent>;

/// Maintains the subscription relation and delivers status events.
pub struct StatusBroadcastHub {
    /// Per-issue channels. Guarded by its own lock, distinct from any
    /// report mutation lock.
    issues: Mutex<HashMap<ReportId, broadcast::Sender<StatusEvent>>>,
    /// The aggregate-statistics feed: every event, all issues.
    stats_tx: broadcast::Sender<StatusEvent>,
    /// Global monotonic sequence stamped on each published event.
    sequence: AtomicU64,
    /// Capacity of each subscriber-facing channel.
    capacity: usize,
}

impl StatusBroadcastHub {
    /// Create a hub whose channels buffer `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (stats_tx, _) = broadcast::channel(capacity);
        Self {
            issues: Mutex::new(HashMap::new()),
            stats_tx,
            sequence: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to one issue's events. The channel is created on first use.
    pub fn subscribe(&self, id: ReportId) -> EventReceiver {
        let mut issues = self.issues.lock().expect("hub registry poisoned");
        let sender = issues.entry(id).or_insert_with(|| {
            trace!(report = %id, "creating issue channel");
            broadcast::channel(self.capacity).0
        });
        sender.subscribe()
    }

    /// Subscribe to the aggregate-statistics feed (every issue's events).
    pub fn subscribe_stats(&self) -> EventReceiver {
        self.stats_tx.subscribe()
    }

    /// Publish one committed state change.
    ///
    /// Stamps the global sequence, delivers to the issue's subscribers and to
    /// the stats feed, and returns the stamped event. Never blocks on a slow
    /// subscriber: a full channel silently drops that subscriber's oldest
    /// buffered event. Publishing to an issue nobody watches is a no-op
    /// beyond the stats feed.
    pub fn publish(&self, report_id: ReportId, payload: EventPayload) -> StatusEvent {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let event = StatusEvent::new(report_id, payload, sequence);

        {
            let mut issues = self.issues.lock().expect("hub registry poisoned");
            let reap = issues
                .get(&report_id)
                .is_some_and(|sender| sender.receiver_count() == 0);
            if reap {
                // Last subscriber is gone; drop the channel.
                issues.remove(&report_id);
            } else if let Some(sender) = issues.get(&report_id) {
                let _ = sender.send(event.clone());
            }
        }
        let _ = self.stats_tx.send(event.clone());

        debug!(
            report = %report_id,
            kind = %event.kind,
            sequence,
            "published status event"
        );
        event
    }

    /// Number of live subscribers for an issue.
    pub fn subscriber_count(&self, id: ReportId) -> usize {
        let issues = self.issues.lock().expect("hub registry poisoned");
        issues.get(&id).map_or(0, |s| s.receiver_count())
    }

    /// Number of live stats subscribers.
    pub fn stats_subscriber_count(&self) -> usize {
        self.stats_tx.receiver_count()
    }

    /// Drop issue channels with no remaining subscribers.
    pub fn prune(&self) {
        let mut issues = self.issues.lock().expect("hub registry poisoned");
        issues.retain(|_, sender| sender.receiver_count() > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civica_types::{EventKind, ReportStatus, UpvoteAction};
    use tokio::sync::broadcast::error::RecvError;

    fn status_payload(changed_by: &str) -> EventPayload {
        EventPayload::Status {
            old_status: ReportStatus::Reported,
            new_status: ReportStatus::Acknowledged,
            changed_by: changed_by.into(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn subscriber_receives_events_in_commit_order() {
        let hub = StatusBroadcastHub::new(16);
        let mut rx = hub.subscribe(ReportId(1));

        hub.publish(ReportId(1), status_payload("a"));
        hub.publish(ReportId(1), status_payload("b"));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert!(first.sequence < second.sequence);
        match (first.payload, second.payload) {
            (
                EventPayload::Status { changed_by: f, .. },
                EventPayload::Status { changed_by: s, .. },
            ) => {
                assert_eq!(f, "a");
                assert_eq!(s, "b");
            }
            other => panic!("unexpected payloads: {other:?}"),
        }
    }

    #[tokio::test]
    async fn subscriber_receives_nothing_for_other_issues() {
        let hub = StatusBroadcastHub::new(16);
        let mut rx = hub.subscribe(ReportId(1));

        hub.publish(ReportId(2), status_payload("other"));
        assert!(matches!(rx.try_recv(), Err(_)));
    }

    #[tokio::test]
    async fn dropped_receiver_stops_delivery_and_channel_is_reaped() {
        let hub = StatusBroadcastHub::new(16);
        let rx = hub.subscribe(ReportId(1));
        assert_eq!(hub.subscriber_count(ReportId(1)), 1);

        drop(rx);
        assert_eq!(hub.subscriber_count(ReportId(1)), 0);

        // Publishing after the last unsubscribe reaps the channel.
        hub.publish(ReportId(1), status_payload("a"));
        let issues = hub.issues.lock().unwrap();
        assert!(!issues.contains_key(&ReportId(1)));
    }

    #[tokio::test]
    async fn stats_feed_sees_every_issue() {
        let hub = StatusBroadcastHub::new(16);
        let mut stats = hub.subscribe_stats();

        hub.publish(ReportId(1), status_payload("a"));
        hub.publish(
            ReportId(2),
            EventPayload::Upvote {
                total_upvotes: 1,
                user_id: "u".into(),
                action: UpvoteAction::Added,
            },
        );

        let first = stats.recv().await.unwrap();
        let second = stats.recv().await.unwrap();
        assert_eq!(first.report_id, ReportId(1));
        assert_eq!(second.report_id, ReportId(2));
        assert_eq!(second.kind, EventKind::UpvoteUpdate);
    }

    #[tokio::test]
    async fn slow_subscriber_drops_oldest_and_observes_lag() {
        let hub = StatusBroadcastHub::new(2);
        let mut rx = hub.subscribe(ReportId(1));

        for i in 0..4 {
            hub.publish(ReportId(1), status_payload(&format!("n{i}")));
        }

        match rx.recv().await {
            Err(RecvError::Lagged(n)) => assert_eq!(n, 2),
            other => panic!("expected lag, got {other:?}"),
        }

        // The two newest events survive; the oldest were dropped.
        let third = rx.recv().await.unwrap();
        let fourth = rx.recv().await.unwrap();
        assert_eq!(third.sequence, 3);
        assert_eq!(fourth.sequence, 4);
    }

    #[tokio::test]
    async fn sequences_are_stamped_monotonically() {
        let hub = StatusBroadcastHub::new(16);
        let a = hub.publish(ReportId(1), status_payload("a"));
        let b = hub.publish(ReportId(9), status_payload("b"));
        assert_eq!(a.sequence, 1);
        assert_eq!(b.sequence, 2);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_harmless() {
        let hub = StatusBroadcastHub::new(16);
        let event = hub.publish(ReportId(5), status_payload("a"));
        assert_eq!(event.report_id, ReportId(5));
    }

    #[tokio::test]
    async fn prune_drops_only_empty_channels() {
        let hub = StatusBroadcastHub::new(16);
        let _live = hub.subscribe(ReportId(1));
        let dead = hub.subscribe(ReportId(2));
        drop(dead);

        hub.prune();
        let issues = hub.issues.lock().unwrap();
        assert!(issues.contains_key(&ReportId(1)));
        assert!(!issues.contains_key(&ReportId(2)));
    }
}
