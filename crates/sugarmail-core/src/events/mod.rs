//! Notifications from the Gmail client to whatever displays mail.
//!
//! The networking side publishes [`ClientEvent`]s on an [`EventBus`]; views
//! subscribe and react. Publishing never waits on subscribers.

mod model;

pub use model::{Label, Profile, ThreadSummary};

use std::collections::BTreeMap;

use sugarmail_mime::Thread;
use tokio::sync::broadcast;
use tracing::debug;

/// Events buffered per subscriber before the oldest are dropped.
pub const DEFAULT_CAPACITY: usize = 64;

/// Something the Gmail client finished or failed to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The user's profile arrived.
    ProfileLoaded(Profile),
    /// A mailbox refresh started.
    LoadStarted,
    /// Thread lists arrived, keyed by label id.
    ThreadsLoaded {
        /// Threads per label.
        threads: BTreeMap<String, Vec<ThreadSummary>>,
        /// Every label of the account.
        labels: Vec<Label>,
    },
    /// A full thread arrived.
    ThreadLoaded(Box<Thread>),
    /// Sending a message failed.
    SendError(String),
}

impl ClientEvent {
    /// Short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ProfileLoaded(_) => "profile-loaded",
            Self::LoadStarted => "load-started",
            Self::ThreadsLoaded { .. } => "threads-loaded",
            Self::ThreadLoaded(_) => "thread-loaded",
            Self::SendError(_) => "send-error",
        }
    }
}

/// Fan-out channel for [`ClientEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ClientEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    /// Creates a bus buffering `capacity` events per subscriber.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Registers a subscriber that sees every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event, returning how many subscribers will see it.
    pub fn publish(&self, event: ClientEvent) -> usize {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!("Published {kind} to {receivers} subscriber(s)");
                receivers
            }
            Err(_) => {
                debug!("Dropped {kind}: no subscribers");
                0
            }
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(ClientEvent::LoadStarted), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let error = ClientEvent::SendError("quota exceeded".into());
        assert_eq!(bus.publish(error.clone()), 2);
        assert_eq!(first.recv().await.unwrap(), error);
        assert_eq!(second.recv().await.unwrap(), error);
    }

    #[tokio::test]
    async fn test_threads_loaded_payload() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();

        let mut threads = BTreeMap::new();
        threads.insert(
            "INBOX".to_string(),
            vec![ThreadSummary {
                id: "t1".into(),
                snippet: "Lunch?".into(),
                history_id: None,
            }],
        );
        bus.publish(ClientEvent::ThreadsLoaded {
            threads,
            labels: Vec::new(),
        });

        match rx.recv().await.unwrap() {
            ClientEvent::ThreadsLoaded { threads, labels } => {
                assert_eq!(threads["INBOX"][0].id, "t1");
                assert!(labels.is_empty());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let bus = EventBus::new(1);
        let mut rx = bus.subscribe();
        bus.publish(ClientEvent::LoadStarted);
        bus.publish(ClientEvent::SendError("x".into()));

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(1))));
        assert_eq!(rx.recv().await.unwrap(), ClientEvent::SendError("x".into()));
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_not_counted() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        drop(rx);
        assert_eq!(bus.publish(ClientEvent::LoadStarted), 0);
    }
}
