//! Synthesis engine: one final answer from the whole tree.

#![allow(clippy::missing_errors_doc)]

use super::engine::{Generation, ThinkingEngine, SYNTHESIS_MAX_TOKENS};
use super::events::ThinkingEvent;
use super::types::{SessionStatus, ThinkingSession};
use crate::error::ThinkingError;
use crate::prompts::{synthesis_prompt, tree_outline};
use crate::traits::{InferenceClientTrait, StorageTrait};

impl<S, C> ThinkingEngine<S, C>
where
    S: StorageTrait + 'static,
    C: InferenceClientTrait + 'static,
{
    /// Conclude the session from its full tree.
    ///
    /// Allowed in `thinking` and `completed`; a re-run overwrites the
    /// stored conclusion. A paused session must be resumed first.
    /// Synthesis is not held to the token ceiling, but its usage is
    /// recorded.
    pub async fn synthesize(&self, session_id: &str) -> Result<String, ThinkingError> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load_session(session_id).await?;
        session.ensure_status(
            &[SessionStatus::Thinking, SessionStatus::Completed],
            "synthesize",
        )?;

        let prompt = self.synthesis_request(&session).await?;
        let generation = self.infer(&session, prompt, SYNTHESIS_MAX_TOKENS).await?;
        self.finish_synthesis(&mut session, generation).await
    }

    /// Prompt for synthesizing `session`.
    pub(super) async fn synthesis_request(
        &self,
        session: &ThinkingSession,
    ) -> Result<String, ThinkingError> {
        let tree = self.storage.load_tree(&session.id).await?;
        let outline = tree_outline(&tree, &session.root_node_id);
        Ok(synthesis_prompt(&session.query, &outline, &session.stats))
    }

    /// Store the conclusion and complete the session.
    pub(super) async fn finish_synthesis(
        &self,
        session: &mut ThinkingSession,
        generation: Generation,
    ) -> Result<String, ThinkingError> {
        session
            .stats
            .record_usage(generation.tokens, generation.duration_ms);
        let conclusion = generation.text.trim().to_string();
        if conclusion.is_empty() {
            session.updated_at = self.now();
            self.storage.save_session(session).await?;
            return Err(ThinkingError::ParseError {
                message: "synthesis returned no text".to_string(),
            });
        }

        let now = self.now();
        session.final_conclusion = Some(conclusion.clone());
        session.status = SessionStatus::Completed;
        session.completed_at = Some(now);
        session.updated_at = now;
        self.storage.save_session(session).await?;

        tracing::info!(
            session_id = %session.id,
            nodes = session.stats.node_count(),
            tokens_used = session.stats.tokens_used,
            "Session completed"
        );
        self.emit(ThinkingEvent::SessionCompleted {
            session_id: session.id.clone(),
            timestamp: now,
            conclusion: conclusion.clone(),
        });
        Ok(conclusion)
    }
}
