//! Overlapping operations on shared sessions.

use std::time::Duration;

use mcp_thinking::thinking::{SessionStatus, StartSession};
use pretty_assertions::assert_eq;

use crate::common::{memory_engine, ScriptedClient};

#[tokio::test]
async fn test_concurrent_expansions_keep_every_child() {
    let (engine, client) = memory_engine(
        ScriptedClient::always("Another angle.").with_delay(Duration::from_millis(20)),
    )
    .await;
    let session = engine
        .start_session(StartSession::new("Why is the build slow?", "p1"))
        .await
        .unwrap();

    let first = engine.clone();
    let second = engine.clone();
    let (a, b) = tokio::join!(
        first.expand(&session.id, &session.root_node_id, 1),
        second.expand(&session.id, &session.root_node_id, 2),
    );
    let created = a.unwrap().len() + b.unwrap().len();
    assert_eq!(created, 3);
    assert_eq!(client.calls(), 3);

    let tree = engine.get_tree(&session.id).await.unwrap();
    let root = tree.iter().find(|n| n.is_root()).unwrap();
    assert_eq!(root.children.len(), 3);

    let session = engine.get_session(&session.id).await.unwrap();
    assert_eq!(session.stats.branches_explored, 4);
    assert_eq!(session.stats.tokens_used, 30);
}

#[tokio::test]
async fn test_pause_waits_for_inflight_expansion() {
    let (engine, _client) = memory_engine(
        ScriptedClient::always("Slow answer.").with_delay(Duration::from_millis(50)),
    )
    .await;
    let session = engine
        .start_session(StartSession::new("Why is the build slow?", "p1"))
        .await
        .unwrap();

    let expander = engine.clone();
    let id = session.id.clone();
    let root = session.root_node_id.clone();
    let expansion = tokio::spawn(async move { expander.expand(&id, &root, 1).await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    let paused = engine.pause(&session.id).await.unwrap();
    assert_eq!(paused.status, SessionStatus::Paused);
    assert_eq!(expansion.await.unwrap().unwrap().len(), 1);
    assert_eq!(paused.stats.branches_explored, 2);
}

#[tokio::test]
async fn test_sessions_progress_independently() {
    let (engine, client) = memory_engine(
        ScriptedClient::always("Independent.").with_delay(Duration::from_millis(20)),
    )
    .await;
    let one = engine
        .start_session(StartSession::new("First question?", "p1"))
        .await
        .unwrap();
    let two = engine
        .start_session(StartSession::new("Second question?", "p2"))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        engine.expand(&one.id, &one.root_node_id, 2),
        engine.expand(&two.id, &two.root_node_id, 1),
    );
    assert_eq!(a.unwrap().len(), 2);
    assert_eq!(b.unwrap().len(), 1);
    assert_eq!(client.calls(), 3);

    assert_eq!(engine.get_tree(&one.id).await.unwrap().len(), 3);
    assert_eq!(engine.get_tree(&two.id).await.unwrap().len(), 2);
    assert_eq!(engine.get_session(&two.id).await.unwrap().project_id, "p2");
}
