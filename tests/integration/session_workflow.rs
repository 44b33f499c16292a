//! Explicit session workflows.

use mcp_thinking::error::ThinkingError;
use mcp_thinking::thinking::{
    NodeStatus, SessionStatus, StartSession, ThinkingConfig, ThoughtType, SYNTHESIS_MAX_TOKENS,
};
use pretty_assertions::assert_eq;

use crate::common::{memory_engine, ScriptedClient};

const ALTERNATIVES: &str = r#"[
  {"content": "Cache the dependency graph", "rationale": "it rarely changes", "confidence": 72},
  {"content": "Build only touched crates", "confidence": 64},
  {"content": "Move codegen out of build.rs", "confidence": 58}
]"#;

#[tokio::test]
async fn test_expand_single_child_at_depth_limit() {
    let (engine, client) = memory_engine(ScriptedClient::always("Look at the linker first.")).await;
    let session = engine
        .start_session(
            StartSession::new("Why is the build slow?", "p1")
                .with_config(ThinkingConfig::default().with_max_depth(1)),
        )
        .await
        .unwrap();

    let children = engine
        .expand(&session.id, &session.root_node_id, 1)
        .await
        .unwrap();
    assert_eq!(children.len(), 1);
    let child = &children[0];
    assert_eq!(child.depth, 1);
    assert_eq!(child.parent_id.as_deref(), Some(session.root_node_id.as_str()));

    let session = engine.get_session(&session.id).await.unwrap();
    assert_eq!(session.current_node_id, child.id);
    assert_eq!(session.stats.branches_explored, 2);
    assert_eq!(session.stats.max_depth_reached, 1);

    let deeper = engine.expand(&session.id, &child.id, 1).await.unwrap();
    assert!(deeper.is_empty());
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_first_expansion_over_budget_pauses() {
    let (engine, _client) =
        memory_engine(ScriptedClient::always("Too verbose.").with_usage(50, 50)).await;
    let session = engine
        .start_session(
            StartSession::new("Why is the build slow?", "p1")
                .with_config(ThinkingConfig::default().with_max_tokens(10)),
        )
        .await
        .unwrap();

    let err = engine
        .expand(&session.id, &session.root_node_id, 1)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ThinkingError::BudgetExceeded {
            session_id: session.id.clone(),
            tokens_used: 100,
            max_tokens: 10,
        }
    );

    let session = engine.get_session(&session.id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Paused);
    assert_eq!(session.stats.tokens_used, 100);
    assert_eq!(engine.get_tree(&session.id).await.unwrap().len(), 1);

    let err = engine
        .expand(&session.id, &session.root_node_id, 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_state");
}

#[tokio::test]
async fn test_alternatives_join_existing_siblings() {
    let (engine, _client) = memory_engine(ScriptedClient::script(&[
        "Profile the build.",
        "Check the cache hit rate.",
        ALTERNATIVES,
    ]))
    .await;
    let session = engine
        .start_session(StartSession::new("Why is the build slow?", "p1"))
        .await
        .unwrap();
    let existing = engine
        .expand(&session.id, &session.root_node_id, 2)
        .await
        .unwrap();
    let target = &existing[0];

    let siblings = engine
        .explore_alternatives(&session.id, &target.id, 3)
        .await
        .unwrap();
    assert_eq!(siblings.len(), 3);

    let tree = engine.get_tree(&session.id).await.unwrap();
    let root = tree.iter().find(|n| n.is_root()).unwrap();
    assert_eq!(root.children.len(), 5);
    let target = tree.iter().find(|n| n.id == target.id).unwrap();
    assert_eq!(target.alternatives.len(), 3);
    for sibling in &siblings {
        assert_eq!(sibling.thought_type, ThoughtType::Alternative);
        assert!(target.alternatives.contains(&sibling.id));
    }
    assert_eq!(
        siblings.iter().map(|s| s.confidence).collect::<Vec<_>>(),
        vec![72, 64, 58]
    );
}

#[tokio::test]
async fn test_synthesize_completes_four_node_tree() {
    let (engine, client) = memory_engine(ScriptedClient::script(&[
        "Profile the build.",
        "Check the cache hit rate.",
        "Look at proc macros.",
        "The build is slow because the cache is cold on every CI run.",
    ]))
    .await;
    let session = engine
        .start_session(StartSession::new("Why is the build slow?", "p1"))
        .await
        .unwrap();
    engine
        .expand(&session.id, &session.root_node_id, 3)
        .await
        .unwrap();
    assert_eq!(engine.get_tree(&session.id).await.unwrap().len(), 4);

    let conclusion = engine.synthesize(&session.id).await.unwrap();
    assert!(conclusion.contains("cache is cold"));

    let session = engine.get_session(&session.id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.final_conclusion.as_deref(), Some(conclusion.as_str()));
    assert!(session.completed_at.is_some());
    assert_eq!(
        client.requested_max_tokens().last().copied(),
        Some(Some(SYNTHESIS_MAX_TOKENS))
    );

    let err = engine
        .expand(&session.id, &session.root_node_id, 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_state");
}

#[tokio::test]
async fn test_critique_then_bookmark_after_completion() {
    let (engine, _client) = memory_engine(ScriptedClient::script(&[
        "The linker dominates.",
        "Weakness: no profile was taken. Confidence: 40%",
        "Profile before optimizing.",
    ]))
    .await;
    let session = engine
        .start_session(StartSession::new("Why is the build slow?", "p1"))
        .await
        .unwrap();
    let child = engine
        .expand(&session.id, &session.root_node_id, 1)
        .await
        .unwrap()
        .remove(0);

    let critique = engine.critique(&session.id, &child.id).await.unwrap();
    assert_eq!(critique.thought_type, ThoughtType::Critique);
    assert_eq!(critique.confidence, 40);
    assert_eq!(critique.metadata.revised_from.as_deref(), Some(child.id.as_str()));

    engine.synthesize(&session.id).await.unwrap();

    let bookmark = engine
        .bookmark(&session.id, &critique.id, Some("u1".into()), Some("key flaw".into()))
        .await
        .unwrap();
    assert_eq!(bookmark.node_id, critique.id);

    let tree = engine.get_tree(&session.id).await.unwrap();
    let marked = tree.iter().find(|n| n.id == critique.id).unwrap();
    assert_eq!(marked.status, NodeStatus::Bookmarked);
    let bookmarks = engine.list_bookmarks(&session.id).await.unwrap();
    assert_eq!(bookmarks, vec![bookmark]);

    let session = engine.get_session(&session.id).await.unwrap();
    assert_eq!(session.stats.revisions, 1);
}

#[tokio::test]
async fn test_template_drives_thought_types() {
    let (engine, _client) = memory_engine(ScriptedClient::always("Noted.")).await;
    let session = engine
        .start_session(
            StartSession::new("Why does the test flake?", "p1")
                .with_config(ThinkingConfig::default().with_template("debugging")),
        )
        .await
        .unwrap();

    let first = engine
        .expand(&session.id, &session.root_node_id, 1)
        .await
        .unwrap()
        .remove(0);
    let second = engine
        .expand(&session.id, &first.id, 1)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(first.thought_type, ThoughtType::Observation);
    assert_eq!(second.thought_type, ThoughtType::Hypothesis);
}

#[tokio::test]
async fn test_start_rejects_bad_input() {
    let (engine, client) = memory_engine(ScriptedClient::script(&[])).await;

    let err = engine
        .start_session(StartSession::new("   ", "p1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_input");

    let err = engine
        .start_session(
            StartSession::new("q", "p1")
                .with_config(ThinkingConfig::default().with_template("astrology")),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_input");

    let err = engine.get_session("missing").await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
    assert_eq!(client.calls(), 0);
}
