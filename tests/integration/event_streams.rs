//! Event stream fan-out and termination.

use mcp_thinking::thinking::{StartSession, ThinkingEvent};
use pretty_assertions::assert_eq;

use crate::common::{drain, memory_engine, ScriptedClient};

#[tokio::test]
async fn test_every_subscriber_sees_same_sequence() {
    let (engine, _client) = memory_engine(ScriptedClient::always("Noted.")).await;
    let session = engine
        .start_session(StartSession::new("Why is the build slow?", "p1"))
        .await
        .unwrap();
    let mut first = engine.stream_events(&session.id).await.unwrap();
    let mut second = engine.stream_events(&session.id).await.unwrap();

    let children = engine
        .expand(&session.id, &session.root_node_id, 2)
        .await
        .unwrap();
    engine.pause(&session.id).await.unwrap();
    engine.resume(&session.id).await.unwrap();
    engine.synthesize(&session.id).await.unwrap();

    let seen_first = drain(&mut first).await;
    let seen_second = drain(&mut second).await;
    assert_eq!(seen_first, seen_second);
    assert_eq!(
        seen_first
            .iter()
            .map(ThinkingEvent::event_type)
            .collect::<Vec<_>>(),
        vec![
            "node_created",
            "node_created",
            "session_paused",
            "session_resumed",
            "session_completed"
        ]
    );
    let created: Vec<_> = seen_first
        .iter()
        .filter_map(|e| match e {
            ThinkingEvent::NodeCreated { node, .. } => Some(node.id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        created,
        children.iter().map(|c| c.id.clone()).collect::<Vec<_>>()
    );
    assert_eq!(engine.events().subscriber_count(&session.id), 0);
}

#[tokio::test]
async fn test_dropped_subscriber_does_not_block_others() {
    let (engine, _client) = memory_engine(ScriptedClient::always("Noted.")).await;
    let session = engine
        .start_session(StartSession::new("Why is the build slow?", "p1"))
        .await
        .unwrap();
    let gone = engine.stream_events(&session.id).await.unwrap();
    let mut kept = engine.stream_events(&session.id).await.unwrap();
    drop(gone);

    engine
        .expand(&session.id, &session.root_node_id, 1)
        .await
        .unwrap();
    engine.synthesize(&session.id).await.unwrap();

    let events = drain(&mut kept).await;
    assert_eq!(events.len(), 2);
    assert!(events[1].is_terminal());
}

#[tokio::test]
async fn test_stream_for_unknown_session_fails() {
    let (engine, _client) = memory_engine(ScriptedClient::script(&[])).await;
    let err = engine.stream_events("missing").await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
}
