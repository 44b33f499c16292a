//! Shared helpers for integration tests.
//!
//! `mockall` mocks only exist inside the library's own unit tests, so the
//! integration suites drive the engine through a scripted client instead.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mcp_thinking::error::ThinkingError;
use mcp_thinking::storage::SqliteStorage;
use mcp_thinking::thinking::{ThinkingEngine, ThinkingEvent};
use mcp_thinking::traits::{
    CompletionConfig, CompletionResponse, InferenceClientTrait, Message, Usage,
};
use tempfile::TempDir;

/// Inference client that replays canned replies.
///
/// Replies are served in order; once the script runs out the fallback is
/// repeated, or the call fails when there is none.
#[derive(Debug)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<String>>,
    fallback: Option<String>,
    usage: Usage,
    delay: Duration,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionConfig>>,
}

impl ScriptedClient {
    /// Serve `replies` in order, then fail.
    pub fn script(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(ToString::to_string).collect()),
            fallback: None,
            usage: Usage::new(5, 5),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call with `reply`.
    pub fn always(reply: &str) -> Self {
        let mut client = Self::script(&[]);
        client.fallback = Some(reply.to_string());
        client
    }

    /// Report `input + output` tokens per call.
    pub fn with_usage(mut self, input: u32, output: u32) -> Self {
        self.usage = Usage::new(input, output);
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Completed and failed calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `max_tokens` of every request, in call order.
    pub fn requested_max_tokens(&self) -> Vec<Option<u32>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.max_tokens)
            .collect()
    }
}

#[async_trait]
impl InferenceClientTrait for ScriptedClient {
    async fn complete(
        &self,
        _messages: Vec<Message>,
        config: CompletionConfig,
    ) -> Result<CompletionResponse, ThinkingError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(config);
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.fallback.clone());
        next.map(|text| CompletionResponse::new(text, self.usage.clone()))
            .ok_or_else(|| ThinkingError::InferenceFailure {
                message: "script exhausted".to_string(),
            })
    }
}

/// Engine type used by the integration suites.
pub type TestEngine = ThinkingEngine<SqliteStorage, ScriptedClient>;

/// Engine over fresh in-memory storage.
pub async fn memory_engine(client: ScriptedClient) -> (TestEngine, Arc<ScriptedClient>) {
    let storage = SqliteStorage::new_in_memory()
        .await
        .expect("Failed to create storage");
    let client = Arc::new(client);
    (
        ThinkingEngine::new(Arc::new(storage), Arc::clone(&client)),
        client,
    )
}

/// Create a test database in a temporary directory.
pub async fn create_test_storage() -> (SqliteStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = open_storage(&temp_dir).await;
    (storage, temp_dir)
}

/// Open (or reopen) the database inside `dir`.
pub async fn open_storage(dir: &TempDir) -> SqliteStorage {
    SqliteStorage::new(dir.path().join("thinking.db"))
        .await
        .expect("Failed to create storage")
}

/// Next event from `stream`, failing the test after five seconds.
pub async fn next_event(
    stream: &mut mcp_thinking::thinking::EventStream,
) -> Option<ThinkingEvent> {
    tokio::time::timeout(Duration::from_secs(5), stream.recv())
        .await
        .expect("timed out waiting for an event")
}

/// Collect events until the stream ends.
pub async fn drain(stream: &mut mcp_thinking::thinking::EventStream) -> Vec<ThinkingEvent> {
    let mut events = Vec::new();
    while let Some(event) = next_event(stream).await {
        events.push(event);
    }
    events
}
