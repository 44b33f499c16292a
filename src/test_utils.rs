//! Test utilities and mock factories.
//!
//! This module provides shared testing infrastructure:
//! - Mock inference clients with canned or scripted replies
//! - Session and node fixtures
//! - An engine over in-memory storage with a frozen clock
//!
//! Only compiled for tests (`#[cfg(test)]`).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::error::ThinkingError;
use crate::storage::SqliteStorage;
use crate::thinking::{
    NodeMetadata, ThinkingConfig, ThinkingEngine, ThinkingSession, ThoughtNode, ThoughtType,
};
use crate::traits::{CompletionResponse, MockInferenceClientTrait, MockTimeProvider, Usage};

/// Timestamp used by every fixture.
#[must_use]
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// A mock clock frozen at `time`.
#[must_use]
pub fn mock_time(time: DateTime<Utc>) -> MockTimeProvider {
    let mut mock = MockTimeProvider::new();
    mock.expect_now().return_const(time);
    mock
}

/// A fresh session `id` in project `p1` and its root node `{id}-root`.
#[must_use]
pub fn sample_session(id: &str) -> (ThinkingSession, ThoughtNode) {
    let config = ThinkingConfig::default();
    let root = ThoughtNode::root(
        format!("{id}-root"),
        id,
        "Why is the build slow?",
        &config.model,
        fixed_time(),
    );
    let session = ThinkingSession::new(id, "Why is the build slow?", "p1", None, config, &root);
    (session, root)
}

/// A child of `parent` with fixed metadata.
#[must_use]
pub fn child_node(
    parent: &ThoughtNode,
    id: &str,
    thought_type: ThoughtType,
    confidence: u8,
) -> ThoughtNode {
    ThoughtNode::child_of(
        parent,
        id,
        format!("{thought_type} thought {id}"),
        thought_type,
        confidence,
        NodeMetadata {
            tokens_used: 10,
            duration_ms: 5,
            model: parent.metadata.model.clone(),
            created_at: fixed_time(),
            revised_from: None,
        },
    )
}

/// Mock client that always answers `response`.
#[must_use]
pub fn mock_inference_success(
    response: impl Into<String>,
    input_tokens: u32,
    output_tokens: u32,
) -> MockInferenceClientTrait {
    let response = response.into();
    let mut mock = MockInferenceClientTrait::new();
    mock.expect_complete().returning(move |_msgs, _config| {
        Ok(CompletionResponse::new(
            response.clone(),
            Usage::new(input_tokens, output_tokens),
        ))
    });
    mock
}

/// Mock client that answers `replies` in order, 10 tokens each.
///
/// Calls beyond the script fail with `InferenceFailure`.
#[must_use]
pub fn mock_inference_script(replies: Vec<&str>) -> MockInferenceClientTrait {
    let queue: VecDeque<String> = replies.into_iter().map(ToString::to_string).collect();
    let queue = Arc::new(Mutex::new(queue));
    let mut mock = MockInferenceClientTrait::new();
    mock.expect_complete().returning(move |_msgs, _config| {
        let next = queue.lock().unwrap().pop_front();
        next.map_or_else(
            || {
                Err(ThinkingError::InferenceFailure {
                    message: "script exhausted".to_string(),
                })
            },
            |text| Ok(CompletionResponse::new(text, Usage::new(5, 5))),
        )
    });
    mock
}

/// Mock client that always fails with `error`.
#[must_use]
pub fn mock_inference_error(error: ThinkingError) -> MockInferenceClientTrait {
    let mut mock = MockInferenceClientTrait::new();
    mock.expect_complete()
        .returning(move |_msgs, _config| Err(error.clone()));
    mock
}

/// Engine over fresh in-memory storage with the clock frozen at [`fixed_time`].
pub async fn engine_with(
    client: MockInferenceClientTrait,
) -> ThinkingEngine<SqliteStorage, MockInferenceClientTrait> {
    let storage = SqliteStorage::new_in_memory()
        .await
        .expect("Failed to create test storage");
    ThinkingEngine::new(Arc::new(storage), Arc::new(client))
        .with_clock(Arc::new(mock_time(fixed_time())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{CompletionConfig, InferenceClientTrait, Message};

    #[tokio::test]
    async fn test_mock_inference_script_in_order() {
        let mock = mock_inference_script(vec!["one", "two"]);
        let call = || mock.complete(vec![Message::user("q")], CompletionConfig::new());
        assert_eq!(call().await.unwrap().content, "one");
        assert_eq!(call().await.unwrap().content, "two");
        assert!(matches!(
            call().await,
            Err(ThinkingError::InferenceFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_mock_inference_error() {
        let mock = mock_inference_error(ThinkingError::InferenceFailure {
            message: "down".into(),
        });
        let result = mock
            .complete(vec![Message::user("q")], CompletionConfig::new())
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_sample_session_fixture() {
        let (session, root) = sample_session("s1");
        assert_eq!(root.id, "s1-root");
        assert_eq!(session.root_node_id, "s1-root");
        assert_eq!(session.project_id, "p1");
        assert_eq!(session.created_at, fixed_time());

        let child = child_node(&root, "c", ThoughtType::Evidence, 65);
        assert_eq!(child.depth, 1);
        assert_eq!(child.parent_id.as_deref(), Some("s1-root"));
    }
}
