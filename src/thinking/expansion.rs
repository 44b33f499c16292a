//! Expansion engine.
//!
//! Each expansion picks the next thought type (template step, else the
//! progression table), prompts with the root-to-parent path, makes one
//! inference call, scores the text, and commits the child together with
//! its updated parent and session.

#![allow(clippy::missing_errors_doc)]

use uuid::Uuid;

use super::engine::{ancestry, call_budget, find_node, Generation, ThinkingEngine};
use super::types::{SessionStatus, ThinkingSession, ThoughtNode, ThoughtType, TreeCommit};
use crate::error::ThinkingError;
use crate::heuristics::{assess, next_thought_type, Assessment};
use crate::prompts::expansion_prompt;
use crate::traits::{InferenceClientTrait, StorageTrait};

/// What the next child of a node will be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ChildPlan {
    pub(super) thought_type: ThoughtType,
    /// Template step text, when a template step governs this depth.
    pub(super) step_prompt: Option<String>,
    /// Template step confidence hint.
    pub(super) min_confidence: Option<u8>,
}

/// A scored generation ready to become a node.
#[derive(Debug)]
pub(super) struct ChildDraft {
    pub(super) thought_type: ThoughtType,
    pub(super) generation: Generation,
    pub(super) assessment: Assessment,
    pub(super) revised_from: Option<String>,
}

impl<S, C> ThinkingEngine<S, C>
where
    S: StorageTrait + 'static,
    C: InferenceClientTrait + 'static,
{
    /// Grow `count` children under `node_id`.
    ///
    /// `count` is clamped to `[1, max_branches]`. A parent already at
    /// `max_depth` yields an empty list. Children committed before a
    /// budget stop are kept.
    pub async fn expand(
        &self,
        session_id: &str,
        node_id: &str,
        count: u32,
    ) -> Result<Vec<ThoughtNode>, ThinkingError> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load_session(session_id).await?;
        let tree = self.storage.load_tree(session_id).await?;
        let mut parent = find_node(&tree, session_id, node_id)?.clone();
        session.ensure_status(&[SessionStatus::Thinking], "expand")?;

        if parent.depth >= session.config.max_depth {
            tracing::debug!(
                session_id = %session_id,
                node_id = %node_id,
                depth = parent.depth,
                "Depth limit reached, nothing to expand"
            );
            return Ok(Vec::new());
        }

        let count = count.clamp(1, session.config.max_branches);
        let path = ancestry(&tree, node_id);
        let mut created = Vec::with_capacity(count as usize);

        for _ in 0..count {
            self.ensure_budget(&mut session).await?;

            let plan = self.plan_child(&session, &parent);
            let prompt = expansion_prompt(
                &session.query,
                &path,
                plan.thought_type,
                session.config.style,
                plan.step_prompt.as_deref(),
            );
            let generation = self.infer(&session, prompt, call_budget(&session)).await?;
            self.charge(&mut session, &generation).await?;

            let draft = ChildDraft {
                thought_type: plan.thought_type,
                assessment: assess(&generation.text),
                generation,
                revised_from: None,
            };
            created.push(self.attach_child(&mut session, &mut parent, draft).await?);
        }

        Ok(created)
    }

    /// Decide the type and prompt of the next child of `parent`.
    pub(super) fn plan_child(&self, session: &ThinkingSession, parent: &ThoughtNode) -> ChildPlan {
        let step = session
            .config
            .template
            .as_deref()
            .and_then(|name| self.catalog.get(name))
            .and_then(|template| template.step_for_child_of(parent.depth));

        match step {
            Some(step) => ChildPlan {
                thought_type: step.thought_type,
                step_prompt: Some(step.prompt.clone()),
                min_confidence: step.min_confidence,
            },
            None => ChildPlan {
                thought_type: next_thought_type(
                    parent.thought_type,
                    session.config.style,
                    rand::random::<f64>(),
                    &self.perturbation,
                ),
                step_prompt: None,
                min_confidence: None,
            },
        }
    }

    /// Create a child of `parent` from `draft` and commit it.
    ///
    /// The caller has already charged the generation to the session.
    pub(super) async fn attach_child(
        &self,
        session: &mut ThinkingSession,
        parent: &mut ThoughtNode,
        draft: ChildDraft,
    ) -> Result<ThoughtNode, ThinkingError> {
        let metadata = self.node_metadata(
            session,
            draft.generation.tokens,
            draft.generation.duration_ms,
            draft.revised_from,
        );
        let child = ThoughtNode::child_of(
            parent,
            Uuid::new_v4().to_string(),
            draft.generation.text.trim(),
            draft.thought_type,
            draft.assessment.confidence,
            metadata,
        )
        .with_rationale(draft.assessment.rationale);

        parent.add_child(&child.id);
        session.record_node(&child, self.now());
        if draft.thought_type == ThoughtType::Critique {
            session.stats.revisions += 1;
        }

        self.storage
            .apply_commit(&TreeCommit {
                session: session.clone(),
                created: vec![child.clone()],
                updated: vec![parent.clone()],
            })
            .await?;

        tracing::debug!(
            session_id = %session.id,
            node_id = %child.id,
            parent_id = %parent.id,
            thought_type = %child.thought_type,
            confidence = child.confidence,
            depth = child.depth,
            "Created thought node"
        );
        self.emit_created(std::slice::from_ref(&child));
        Ok(child)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::heuristics::TypePerturbation;
    use crate::test_utils::{engine_with, mock_inference_script, mock_inference_success};
    use crate::thinking::{StartSession, ThinkingConfig, ThinkingEvent, ThinkingStyle};
    use crate::traits::MockInferenceClientTrait;
    use pretty_assertions::assert_eq;

    fn config() -> ThinkingConfig {
        ThinkingConfig::default().with_style(ThinkingStyle::Balanced)
    }

    #[tokio::test]
    async fn test_expand_single_child_at_depth_one() {
        let engine = engine_with(mock_inference_success(
            "The cache key includes a timestamp.\nReasoning: it changes every run.\nConfidence: 80%",
            30,
            40,
        ))
        .await;
        let session = engine
            .start_session(StartSession::new("Why is CI slow?", "p1").with_config(config().with_max_depth(1)))
            .await
            .unwrap();

        let created = engine
            .expand(&session.id, &session.root_node_id, 1)
            .await
            .unwrap();
        assert_eq!(created.len(), 1);
        let child = &created[0];
        assert_eq!(child.depth, 1);
        assert_eq!(child.parent_id.as_deref(), Some(session.root_node_id.as_str()));
        assert_eq!(child.thought_type, ThoughtType::Analysis);
        assert_eq!(child.confidence, 80);
        assert_eq!(child.rationale.as_deref(), Some("it changes every run."));
        assert_eq!(child.metadata.tokens_used, 70);

        let session = engine.get_session(&session.id).await.unwrap();
        assert_eq!(session.current_node_id, child.id);
        assert_eq!(session.stats.branches_explored, 2);
        assert_eq!(session.stats.tokens_used, 70);
        assert_eq!(session.stats.confidence_trend, vec![50, 80]);
        assert!((session.stats.average_confidence - 65.0).abs() < f64::EPSILON);
        assert_eq!(session.stats.max_depth_reached, 1);

        let tree = engine.get_tree(&session.id).await.unwrap();
        assert_eq!(tree[0].children, vec![child.id.clone()]);
    }

    #[tokio::test]
    async fn test_expand_at_max_depth_is_empty() {
        let mut client = MockInferenceClientTrait::new();
        client.expect_complete().times(1).returning(|_, _| {
            Ok(crate::traits::CompletionResponse::new(
                "Only thought.",
                crate::traits::Usage::new(1, 1),
            ))
        });
        let engine = engine_with(client).await;
        let session = engine
            .start_session(StartSession::new("q", "p1").with_config(config().with_max_depth(1)))
            .await
            .unwrap();

        let leaf = engine
            .expand(&session.id, &session.root_node_id, 1)
            .await
            .unwrap()
            .remove(0);
        let created = engine.expand(&session.id, &leaf.id, 3).await.unwrap();
        assert!(created.is_empty());
        assert_eq!(engine.get_tree(&session.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_expand_clamps_count_to_max_branches() {
        let engine = engine_with(mock_inference_success("An idea. Confidence: 70%", 5, 5)).await;
        let session = engine
            .start_session(StartSession::new("q", "p1").with_config(config().with_max_branches(2)))
            .await
            .unwrap();

        let created = engine
            .expand(&session.id, &session.root_node_id, 9)
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert!(created.iter().all(|n| n.depth == 1));

        let tree = engine.get_tree(&session.id).await.unwrap();
        assert_eq!(tree[0].children.len(), 2);
        let session = engine.get_session(&session.id).await.unwrap();
        assert_eq!(session.current_node_id, created[1].id);
    }

    #[tokio::test]
    async fn test_expand_zero_count_creates_one() {
        let engine = engine_with(mock_inference_success("Thought.", 1, 1)).await;
        let session = engine.start_session(StartSession::new("q", "p1")).await.unwrap();
        let created = engine
            .expand(&session.id, &session.root_node_id, 0)
            .await
            .unwrap();
        assert_eq!(created.len(), 1);
    }

    #[tokio::test]
    async fn test_expand_follows_template_steps() {
        let engine = engine_with(mock_inference_script(vec![
            "Symptom: builds take 20 minutes.",
            "Likely cause: cache misses.",
        ]))
        .await;
        let session = engine
            .start_session(
                StartSession::new("Why is CI slow?", "p1")
                    .with_config(config().with_template("debugging")),
            )
            .await
            .unwrap();

        let first = engine
            .expand(&session.id, &session.root_node_id, 1)
            .await
            .unwrap()
            .remove(0);
        assert_eq!(first.thought_type, ThoughtType::Observation);
        let second = engine.expand(&session.id, &first.id, 1).await.unwrap().remove(0);
        assert_eq!(second.thought_type, ThoughtType::Hypothesis);
        assert_eq!(second.depth, 2);
    }

    #[tokio::test]
    async fn test_expand_budget_exhausted_after_call() {
        let engine = engine_with(mock_inference_success("Costly thought.", 60, 40)).await;
        let session = engine
            .start_session(StartSession::new("q", "p1").with_config(config().with_max_tokens(10)))
            .await
            .unwrap();
        let mut stream = engine.stream_events(&session.id).await.unwrap();

        let err = engine
            .expand(&session.id, &session.root_node_id, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ThinkingError::BudgetExceeded { tokens_used: 100, max_tokens: 10, .. }
        ));

        let session = engine.get_session(&session.id).await.unwrap();
        assert_eq!(session.status, SessionStatus::Paused);
        assert_eq!(session.stats.tokens_used, 100);
        assert_eq!(engine.get_tree(&session.id).await.unwrap().len(), 1);

        match stream.recv().await.unwrap() {
            ThinkingEvent::SessionPaused { reason, .. } => {
                assert_eq!(reason, "token budget exhausted");
            }
            other => panic!("Expected session_paused, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_expand_budget_precheck_skips_inference() {
        let engine = engine_with(mock_inference_success("Thought.", 4, 4)).await;
        let session = engine
            .start_session(StartSession::new("q", "p1").with_config(config().with_max_tokens(8)))
            .await
            .unwrap();

        // Exactly reaches the ceiling; allowed.
        let created = engine
            .expand(&session.id, &session.root_node_id, 1)
            .await
            .unwrap();
        assert_eq!(created.len(), 1);

        // Second call fails before inference.
        let err = engine
            .expand(&session.id, &created[0].id, 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "budget_exceeded");
        let session = engine.get_session(&session.id).await.unwrap();
        assert_eq!(session.stats.tokens_used, 8);
        assert_eq!(session.status, SessionStatus::Paused);
    }

    #[tokio::test]
    async fn test_expand_paused_session_is_invalid_state() {
        let mut client = MockInferenceClientTrait::new();
        client.expect_complete().never();
        let engine = engine_with(client).await;
        let session = engine.start_session(StartSession::new("q", "p1")).await.unwrap();
        engine.pause(&session.id).await.unwrap();

        let err = engine
            .expand(&session.id, &session.root_node_id, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ThinkingError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_expand_missing_node() {
        let engine = engine_with(MockInferenceClientTrait::new()).await;
        let session = engine.start_session(StartSession::new("q", "p1")).await.unwrap();
        let err = engine.expand(&session.id, "ghost", 1).await.unwrap_err();
        assert!(matches!(err, ThinkingError::NodeNotFound { .. }));
        let err = engine.expand("ghost", "ghost", 1).await.unwrap_err();
        assert!(matches!(err, ThinkingError::SessionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_expand_inference_failure_leaves_tree_intact() {
        let mut client = MockInferenceClientTrait::new();
        client.expect_complete().returning(|_, _| {
            Err(ThinkingError::InferenceFailure {
                message: "upstream 500".into(),
            })
        });
        let engine = engine_with(client).await;
        let session = engine.start_session(StartSession::new("q", "p1")).await.unwrap();

        let err = engine
            .expand(&session.id, &session.root_node_id, 1)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ThinkingError::InferenceFailure {
                message: "upstream 500".into()
            }
        );
        let reloaded = engine.get_session(&session.id).await.unwrap();
        assert_eq!(reloaded, session);
    }

    #[tokio::test]
    async fn test_expand_emits_node_created_after_commit() {
        let engine = engine_with(mock_inference_success("Thought.", 1, 1)).await;
        let session = engine.start_session(StartSession::new("q", "p1")).await.unwrap();
        let mut stream = engine.stream_events(&session.id).await.unwrap();

        let created = engine
            .expand(&session.id, &session.root_node_id, 1)
            .await
            .unwrap();
        match stream.recv().await.unwrap() {
            ThinkingEvent::NodeCreated { node, .. } => assert_eq!(node, created[0]),
            other => panic!("Expected node_created, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plan_child_analytical_repeat() {
        let engine = engine_with(MockInferenceClientTrait::new())
            .await
            .with_perturbation(TypePerturbation {
                creative_alternative: 0.0,
                analytical_repeat: 1.0,
            });
        let (mut session, root) = crate::test_utils::sample_session("s1");
        session.config.style = ThinkingStyle::Analytical;
        let analysis = crate::test_utils::child_node(&root, "a", ThoughtType::Analysis, 60);

        let plan = engine.plan_child(&session, &analysis);
        assert_eq!(plan.thought_type, ThoughtType::Analysis);
        assert!(plan.step_prompt.is_none());
    }

    #[tokio::test]
    async fn test_plan_child_past_template_end_falls_back() {
        let engine = engine_with(MockInferenceClientTrait::new())
            .await
            .with_perturbation(TypePerturbation::none());
        let (mut session, root) = crate::test_utils::sample_session("s1");
        session.config.template = Some("creative-exploration".into());
        let mut deep = crate::test_utils::child_node(&root, "d", ThoughtType::Conclusion, 60);
        deep.depth = 9;

        let plan = engine.plan_child(&session, &deep);
        assert_eq!(plan.thought_type, ThoughtType::Observation);
        assert_eq!(plan.min_confidence, None);

        let plan = engine.plan_child(&session, &root);
        assert_eq!(plan.thought_type, ThoughtType::Question);
        assert!(plan.step_prompt.is_some());
    }
}
