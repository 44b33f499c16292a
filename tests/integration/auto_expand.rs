//! Auto-expansion loop workflows.

use std::time::Duration;

use mcp_thinking::thinking::{
    SessionStatus, StartSession, ThinkingConfig, ThinkingEvent, BUDGET_PAUSE_REASON,
    PER_CALL_MAX_TOKENS, REQUESTED_PAUSE_REASON, SYNTHESIS_MAX_TOKENS,
};
use pretty_assertions::assert_eq;

use crate::common::{drain, memory_engine, next_event, ScriptedClient};

const CONFIDENT: &str = "The cache key includes a timestamp. Confidence: 90%";

fn auto_config() -> ThinkingConfig {
    ThinkingConfig::default().with_auto_expand(true)
}

fn event_types(events: &[ThinkingEvent]) -> Vec<&'static str> {
    events.iter().map(ThinkingEvent::event_type).collect()
}

#[tokio::test]
async fn test_auto_expand_runs_to_synthesis() {
    let (engine, client) = memory_engine(ScriptedClient::always(CONFIDENT)).await;
    let (session, mut stream) = engine
        .start_session_with_stream(
            StartSession::new("Why is the build slow?", "p1")
                .with_config(auto_config().with_max_depth(2)),
        )
        .await
        .unwrap();

    let events = drain(&mut stream).await;
    assert_eq!(
        event_types(&events),
        vec!["node_created", "node_created", "session_completed"]
    );

    let session = engine.get_session(&session.id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.final_conclusion.as_deref(), Some(CONFIDENT));
    assert_eq!(session.stats.tokens_used, 30);
    assert_eq!(engine.get_tree(&session.id).await.unwrap().len(), 3);
    assert_eq!(
        client.requested_max_tokens(),
        vec![
            Some(PER_CALL_MAX_TOKENS),
            Some(PER_CALL_MAX_TOKENS),
            Some(SYNTHESIS_MAX_TOKENS)
        ]
    );
}

#[tokio::test]
async fn test_auto_expand_idles_below_threshold() {
    let (engine, client) =
        memory_engine(ScriptedClient::always("Maybe the disk. Confidence: 20%")).await;
    let (session, mut stream) = engine
        .start_session_with_stream(
            StartSession::new("Why is the build slow?", "p1").with_config(auto_config()),
        )
        .await
        .unwrap();

    let first = next_event(&mut stream).await.unwrap();
    assert_eq!(first.event_type(), "node_created");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(client.calls(), 1);

    let session = engine.get_session(&session.id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Thinking);
    assert_eq!(engine.get_tree(&session.id).await.unwrap().len(), 2);

    engine.synthesize(&session.id).await.unwrap();
    let last = next_event(&mut stream).await.unwrap();
    assert_eq!(last.event_type(), "session_completed");
}

#[tokio::test]
async fn test_auto_expand_pauses_on_budget() {
    let (engine, client) = memory_engine(ScriptedClient::always(CONFIDENT)).await;
    let (session, mut stream) = engine
        .start_session_with_stream(
            StartSession::new("Why is the build slow?", "p1")
                .with_config(auto_config().with_max_tokens(25)),
        )
        .await
        .unwrap();

    assert_eq!(next_event(&mut stream).await.unwrap().event_type(), "node_created");
    assert_eq!(next_event(&mut stream).await.unwrap().event_type(), "node_created");
    match next_event(&mut stream).await.unwrap() {
        ThinkingEvent::SessionPaused { reason, .. } => assert_eq!(reason, BUDGET_PAUSE_REASON),
        other => panic!("expected session_paused, got {other:?}"),
    }

    let session = engine.get_session(&session.id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Paused);
    assert_eq!(session.stats.tokens_used, 30);
    assert_eq!(engine.get_tree(&session.id).await.unwrap().len(), 3);
    assert_eq!(
        client.requested_max_tokens(),
        vec![Some(25), Some(15), Some(5)]
    );
}

#[tokio::test]
async fn test_pause_halts_loop_and_resume_finishes() {
    let (engine, _client) = memory_engine(
        ScriptedClient::always(CONFIDENT).with_delay(Duration::from_millis(50)),
    )
    .await;
    let (session, mut stream) = engine
        .start_session_with_stream(
            StartSession::new("Why is the build slow?", "p1")
                .with_config(auto_config().with_max_depth(3)),
        )
        .await
        .unwrap();

    assert_eq!(next_event(&mut stream).await.unwrap().event_type(), "node_created");
    engine.pause(&session.id).await.unwrap();

    let mut paused_seen = false;
    while !paused_seen {
        if let ThinkingEvent::SessionPaused { reason, .. } = next_event(&mut stream).await.unwrap()
        {
            assert_eq!(reason, REQUESTED_PAUSE_REASON);
            paused_seen = true;
        }
    }
    let frozen = engine.get_tree(&session.id).await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(engine.get_tree(&session.id).await.unwrap().len(), frozen);
    assert_eq!(
        engine.get_session(&session.id).await.unwrap().status,
        SessionStatus::Paused
    );

    engine.resume(&session.id).await.unwrap();
    let events = drain(&mut stream).await;
    assert_eq!(events.first().map(ThinkingEvent::event_type), Some("session_resumed"));
    assert_eq!(events.last().map(ThinkingEvent::event_type), Some("session_completed"));

    let session = engine.get_session(&session.id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    let tree = engine.get_tree(&session.id).await.unwrap();
    assert!(tree.iter().all(|n| n.depth <= 3));
    assert_eq!(session.stats.max_depth_reached, 3);
}

#[tokio::test]
async fn test_auto_expand_failure_fails_session() {
    let (engine, _client) = memory_engine(ScriptedClient::script(&[CONFIDENT])).await;
    let (session, mut stream) = engine
        .start_session_with_stream(
            StartSession::new("Why is the build slow?", "p1").with_config(auto_config()),
        )
        .await
        .unwrap();

    let events = drain(&mut stream).await;
    assert_eq!(event_types(&events), vec!["node_created", "error"]);
    match &events[1] {
        ThinkingEvent::Error { kind, .. } => assert_eq!(kind, "inference_failure"),
        other => panic!("expected error, got {other:?}"),
    }

    let session = engine.get_session(&session.id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Failed);
    let err = engine.resume(&session.id).await.unwrap_err();
    assert_eq!(err.kind(), "invalid_state");
}
