//! Server types and shared state.
//!
//! This module defines the application state shared by every tool handler
//! and the relay that forwards session events to the log.

use std::sync::Arc;
use std::time::Duration;

use crate::anthropic::AnthropicClient;
use crate::config::Config;
use crate::storage::SqliteStorage;
use crate::thinking::{EventStream, ThinkingEngine, ThinkingEvent};

/// A relay with no event for this long detaches from its session.
pub const EVENT_LOG_IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Engine over the production storage and inference client.
pub type Engine = ThinkingEngine<SqliteStorage, AnthropicClient>;

/// Shared application state for all tool handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session engine.
    pub engine: Engine,
    /// Server configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new application state.
    #[must_use]
    pub fn new(storage: SqliteStorage, client: AnthropicClient, config: Config) -> Self {
        Self {
            engine: ThinkingEngine::new(Arc::new(storage), Arc::new(client)),
            config: Arc::new(config),
        }
    }

    /// Forward `session_id`'s events to the log unless a relay already runs.
    ///
    /// Unknown sessions get no relay.
    pub async fn ensure_event_log(&self, session_id: &str) {
        if self.engine.events().subscriber_count(session_id) > 0 {
            return;
        }
        if let Ok(stream) = self.engine.stream_events(session_id).await {
            log_events(stream);
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Spawn a task draining `stream` into the log.
pub fn log_events(stream: EventStream) {
    tokio::spawn(relay_events(stream, EVENT_LOG_IDLE_TIMEOUT));
}

/// Drain `stream` into `debug!` records until it ends or stays quiet
/// for `idle`.
pub async fn relay_events(mut stream: EventStream, idle: Duration) {
    loop {
        match tokio::time::timeout(idle, stream.recv()).await {
            Ok(Some(event)) => log_event(&event),
            Ok(None) => {
                tracing::debug!(session_id = %stream.session_id(), "Event relay closed");
                return;
            }
            Err(_) => {
                tracing::debug!(
                    session_id = %stream.session_id(),
                    idle_secs = idle.as_secs(),
                    "Event relay idle, detaching"
                );
                return;
            }
        }
    }
}

fn log_event(event: &ThinkingEvent) {
    match event {
        ThinkingEvent::NodeCreated { session_id, node, .. }
        | ThinkingEvent::NodeUpdated { session_id, node, .. } => tracing::debug!(
            session_id = %session_id,
            event = event.event_type(),
            node_id = %node.id,
            thought_type = %node.thought_type,
            confidence = node.confidence,
            "Session event"
        ),
        ThinkingEvent::SessionPaused { session_id, reason, .. } => tracing::debug!(
            session_id = %session_id,
            event = event.event_type(),
            reason = %reason,
            "Session event"
        ),
        ThinkingEvent::Error { session_id, kind, message, .. } => tracing::debug!(
            session_id = %session_id,
            event = event.event_type(),
            kind = %kind,
            message = %message,
            "Session event"
        ),
        ThinkingEvent::SessionResumed { session_id, .. }
        | ThinkingEvent::SessionCompleted { session_id, .. } => tracing::debug!(
            session_id = %session_id,
            event = event.event_type(),
            "Session event"
        ),
    }
}
