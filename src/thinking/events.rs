//! Session event stream.
//!
//! The [`EventBus`] keeps one unbounded queue per subscriber, keyed by
//! session id. Publishing never blocks on a slow consumer, and every
//! subscriber sees every event of its session exactly once, in order.
//! A subscriber that drops its [`EventStream`] is pruned on the next
//! publish; all subscribers of a session are released after a terminal
//! event.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::types::ThoughtNode;

/// Typed event emitted by the engine for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThinkingEvent {
    /// A node was committed to the tree.
    NodeCreated {
        /// Session id.
        session_id: String,
        /// Emission time.
        timestamp: DateTime<Utc>,
        /// The new node.
        node: ThoughtNode,
    },
    /// An existing node changed.
    NodeUpdated {
        /// Session id.
        session_id: String,
        /// Emission time.
        timestamp: DateTime<Utc>,
        /// The node after the change.
        node: ThoughtNode,
    },
    /// The session entered `paused`.
    SessionPaused {
        /// Session id.
        session_id: String,
        /// Emission time.
        timestamp: DateTime<Utc>,
        /// Why it paused.
        reason: String,
    },
    /// The session left `paused`.
    SessionResumed {
        /// Session id.
        session_id: String,
        /// Emission time.
        timestamp: DateTime<Utc>,
    },
    /// Synthesis closed the session.
    SessionCompleted {
        /// Session id.
        session_id: String,
        /// Emission time.
        timestamp: DateTime<Utc>,
        /// The final conclusion.
        conclusion: String,
    },
    /// The auto-expansion loop failed the session.
    Error {
        /// Session id.
        session_id: String,
        /// Emission time.
        timestamp: DateTime<Utc>,
        /// Error kind label.
        kind: String,
        /// Error message.
        message: String,
    },
}

impl ThinkingEvent {
    /// Session this event belongs to.
    #[must_use]
    pub fn session_id(&self) -> &str {
        match self {
            Self::NodeCreated { session_id, .. }
            | Self::NodeUpdated { session_id, .. }
            | Self::SessionPaused { session_id, .. }
            | Self::SessionResumed { session_id, .. }
            | Self::SessionCompleted { session_id, .. }
            | Self::Error { session_id, .. } => session_id,
        }
    }

    /// Wire name of the event type.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::NodeCreated { .. } => "node_created",
            Self::NodeUpdated { .. } => "node_updated",
            Self::SessionPaused { .. } => "session_paused",
            Self::SessionResumed { .. } => "session_resumed",
            Self::SessionCompleted { .. } => "session_completed",
            Self::Error { .. } => "error",
        }
    }

    /// A stream ends after delivering a terminal event.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::SessionCompleted { .. } | Self::Error { .. })
    }
}

type Subscribers = HashMap<String, Vec<mpsc::UnboundedSender<ThinkingEvent>>>;

/// Publish/subscribe channel keyed by session id.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Subscribers>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber for `session_id`.
    #[must_use]
    pub fn subscribe(&self, session_id: &str) -> EventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock()
            .entry(session_id.to_string())
            .or_default()
            .push(tx);
        EventStream {
            session_id: session_id.to_string(),
            rx,
            finished: false,
        }
    }

    /// Deliver `event` to every live subscriber of its session.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish(&self, event: &ThinkingEvent) -> usize {
        let mut subscribers = self.lock();
        let Some(queues) = subscribers.get_mut(event.session_id()) else {
            return 0;
        };
        queues.retain(|tx| tx.send(event.clone()).is_ok());
        let delivered = queues.len();
        if event.is_terminal() || queues.is_empty() {
            subscribers.remove(event.session_id());
        }
        drop(subscribers);
        tracing::trace!(
            session_id = %event.session_id(),
            event_type = event.event_type(),
            delivered,
            "Published thinking event"
        );
        delivered
    }

    /// Live subscribers for `session_id`. Dropped subscribers are pruned.
    #[must_use]
    pub fn subscriber_count(&self, session_id: &str) -> usize {
        let mut subscribers = self.lock();
        let Some(queues) = subscribers.get_mut(session_id) else {
            return 0;
        };
        queues.retain(|tx| !tx.is_closed());
        let live = queues.len();
        if live == 0 {
            subscribers.remove(session_id);
        }
        live
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Subscribers> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// One subscriber's view of a session's events.
///
/// Lazy and non-restartable; yields `None` after a terminal event or once
/// the bus releases the subscriber. Dropping it unsubscribes.
#[derive(Debug)]
pub struct EventStream {
    session_id: String,
    rx: mpsc::UnboundedReceiver<ThinkingEvent>,
    finished: bool,
}

impl EventStream {
    /// Session this stream observes.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Wait for the next event.
    pub async fn recv(&mut self) -> Option<ThinkingEvent> {
        std::future::poll_fn(|cx| Pin::new(&mut *self).poll_next(cx)).await
    }
}

impl Stream for EventStream {
    type Item = ThinkingEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    self.finished = true;
                    self.rx.close();
                }
                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
