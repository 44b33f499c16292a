//! Critique and alternative exploration.

#![allow(clippy::missing_errors_doc)]

use uuid::Uuid;

use super::engine::{ancestry, call_budget, find_node, ThinkingEngine};
use super::expansion::ChildDraft;
use super::types::{SessionStatus, ThoughtNode, ThoughtType, TreeCommit};
use crate::error::ThinkingError;
use crate::heuristics::{assess_critique, parse_alternatives};
use crate::prompts::{alternatives_prompt, critique_prompt};
use crate::traits::{InferenceClientTrait, StorageTrait};

impl<S, C> ThinkingEngine<S, C>
where
    S: StorageTrait + 'static,
    C: InferenceClientTrait + 'static,
{
    /// Attach one `critique` child under `node_id`.
    ///
    /// Requires `enable_self_critique`. The target keeps its status and
    /// the critique records it as `revised_from`.
    pub async fn critique(
        &self,
        session_id: &str,
        node_id: &str,
    ) -> Result<ThoughtNode, ThinkingError> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load_session(session_id).await?;
        let tree = self.storage.load_tree(session_id).await?;
        let mut target = find_node(&tree, session_id, node_id)?.clone();
        session.ensure_status(&[SessionStatus::Thinking], "critique")?;
        if !session.config.enable_self_critique {
            return Err(session.invalid_state("critique"));
        }

        self.ensure_budget(&mut session).await?;
        let prompt = critique_prompt(&session.query, &ancestry(&tree, node_id));
        let generation = self.infer(&session, prompt, call_budget(&session)).await?;
        self.charge(&mut session, &generation).await?;

        let draft = ChildDraft {
            thought_type: ThoughtType::Critique,
            assessment: assess_critique(&generation.text),
            generation,
            revised_from: Some(target.id.clone()),
        };
        self.attach_child(&mut session, &mut target, draft).await
    }

    /// Attach `count` siblings of `node_id` under its parent.
    ///
    /// Requires `enable_parallel_exploration`; the root has no siblings.
    /// Either every sibling is committed or none is.
    pub async fn explore_alternatives(
        &self,
        session_id: &str,
        node_id: &str,
        count: u32,
    ) -> Result<Vec<ThoughtNode>, ThinkingError> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load_session(session_id).await?;
        let tree = self.storage.load_tree(session_id).await?;
        let mut target = find_node(&tree, session_id, node_id)?.clone();
        session.ensure_status(&[SessionStatus::Thinking], "explore_alternatives")?;
        if !session.config.enable_parallel_exploration {
            return Err(session.invalid_state("explore_alternatives"));
        }
        let Some(parent_id) = target.parent_id.clone() else {
            return Err(session.invalid_state("explore_alternatives on the root node"));
        };
        let mut parent = find_node(&tree, session_id, &parent_id)?.clone();

        let count = count.clamp(1, session.config.max_branches);
        self.ensure_budget(&mut session).await?;
        let prompt = alternatives_prompt(&session.query, &ancestry(&tree, node_id), count as usize);
        let generation = self.infer(&session, prompt, call_budget(&session)).await?;
        self.charge(&mut session, &generation).await?;

        let drafts = match parse_alternatives(&generation.text, count as usize) {
            Ok(drafts) => drafts,
            Err(e) => {
                // Tokens were spent; keep the usage, leave the tree alone.
                session.updated_at = self.now();
                self.storage.save_session(&session).await?;
                tracing::warn!(
                    session_id = %session_id,
                    node_id = %node_id,
                    error = %e,
                    "Discarding unparseable alternatives"
                );
                return Err(e);
            }
        };

        let (share, remainder) = split_tokens(generation.tokens, drafts.len());
        let now = self.now();
        let mut siblings = Vec::with_capacity(drafts.len());
        for (i, draft) in drafts.into_iter().enumerate() {
            let tokens = if i == 0 { share + remainder } else { share };
            let duration = if i == 0 { generation.duration_ms } else { 0 };
            let mut sibling = ThoughtNode::child_of(
                &parent,
                Uuid::new_v4().to_string(),
                draft.content,
                ThoughtType::Alternative,
                draft.confidence,
                self.node_metadata(&session, tokens, duration, None),
            )
            .with_rationale(draft.rationale);
            sibling.add_alternative(&target.id);

            parent.add_child(&sibling.id);
            target.add_alternative(&sibling.id);
            session.record_node(&sibling, now);
            siblings.push(sibling);
        }

        self.storage
            .apply_commit(&TreeCommit {
                session: session.clone(),
                created: siblings.clone(),
                updated: vec![parent, target],
            })
            .await?;

        tracing::debug!(
            session_id = %session_id,
            node_id = %node_id,
            created = siblings.len(),
            "Explored alternatives"
        );
        self.emit_created(&siblings);
        Ok(siblings)
    }
}

/// Even share of `tokens` across `n` nodes plus the remainder.
fn split_tokens(tokens: u64, n: usize) -> (u64, u64) {
    let n = u64::try_from(n.max(1)).unwrap_or(1);
    (tokens / n, tokens % n)
}
