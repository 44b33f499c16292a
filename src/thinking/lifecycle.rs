//! Pause, resume, and the auto-expansion loop.
//!
//! The loop runs as a spawned task per session. Each pass plans under the
//! session lock, runs inference with the lock released, then re-checks
//! ownership and status under the lock before committing. A result whose
//! session was paused or rescheduled meanwhile is discarded.

#![allow(clippy::missing_errors_doc)]

use tracing::Instrument;

use super::engine::{
    ancestry, call_budget, find_node, Generation, ThinkingEngine, REQUESTED_PAUSE_REASON,
    SYNTHESIS_MAX_TOKENS,
};
use super::events::ThinkingEvent;
use super::expansion::{ChildDraft, ChildPlan};
use super::types::{SessionStatus, ThinkingSession};
use crate::error::ThinkingError;
use crate::heuristics::assess;
use crate::prompts::expansion_prompt;
use crate::traits::{InferenceClientTrait, StorageTrait};

/// Work chosen by the planning phase of one loop pass.
#[derive(Debug)]
enum AutoStep {
    Expand {
        snapshot: ThinkingSession,
        parent_id: String,
        plan: ChildPlan,
        prompt: String,
        max_tokens: u32,
    },
    Synthesize {
        snapshot: ThinkingSession,
        prompt: String,
    },
    Idle,
    Stop,
}

impl<S, C> ThinkingEngine<S, C>
where
    S: StorageTrait + 'static,
    C: InferenceClientTrait + 'static,
{
    /// Hold a `thinking` session.
    pub async fn pause(&self, session_id: &str) -> Result<ThinkingSession, ThinkingError> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load_session(session_id).await?;
        session.ensure_status(&[SessionStatus::Thinking], "pause")?;

        let now = self.now();
        session.status = SessionStatus::Paused;
        session.updated_at = now;
        self.storage.save_session(&session).await?;

        tracing::info!(session_id = %session_id, "Session paused");
        self.emit(ThinkingEvent::SessionPaused {
            session_id: session_id.to_string(),
            timestamp: now,
            reason: REQUESTED_PAUSE_REASON.to_string(),
        });
        Ok(session)
    }

    /// Return a `paused` session to `thinking`.
    ///
    /// With `auto_expand`, the loop re-evaluates the current node as it
    /// would after an expansion.
    pub async fn resume(&self, session_id: &str) -> Result<ThinkingSession, ThinkingError> {
        let session = {
            let _guard = self.locks.acquire(session_id).await;
            let mut session = self.load_session(session_id).await?;
            session.ensure_status(&[SessionStatus::Paused], "resume")?;

            let now = self.now();
            session.status = SessionStatus::Thinking;
            session.updated_at = now;
            self.storage.save_session(&session).await?;

            tracing::info!(session_id = %session_id, "Session resumed");
            self.emit(ThinkingEvent::SessionResumed {
                session_id: session_id.to_string(),
                timestamp: now,
            });
            session
        };

        if session.config.auto_expand {
            self.schedule_auto_expand(session_id, false);
        }
        Ok(session)
    }

    /// Spawn an auto-expansion loop for `session_id`.
    ///
    /// Any loop already running for the session stops at its next check.
    /// `kickoff` forces the first expansion regardless of confidence.
    pub(super) fn schedule_auto_expand(&self, session_id: &str, kickoff: bool) {
        let generation = self.loops.begin(session_id);
        let engine = self.clone();
        let session_id = session_id.to_string();
        let span = tracing::info_span!("auto_expand", session_id = %session_id, generation);

        tokio::spawn(
            async move {
                engine.run_auto_expand(session_id, generation, kickoff).await;
            }
            .instrument(span),
        );
    }

    async fn run_auto_expand(&self, session_id: String, generation: u64, kickoff: bool) {
        let mut force = kickoff;
        loop {
            match self.auto_pass(&session_id, generation, force).await {
                Ok(true) => force = false,
                Ok(false) => break,
                Err(ThinkingError::BudgetExceeded { .. }) => {
                    tracing::debug!("Budget exhausted, auto-expansion stopped");
                    break;
                }
                Err(e) => {
                    self.fail_session(&session_id, generation, &e).await;
                    break;
                }
            }
        }
        self.loops.finish(&session_id, generation);
        tracing::debug!("Auto-expansion loop finished");
    }

    /// One plan, infer, commit pass. Returns whether to keep going.
    async fn auto_pass(
        &self,
        session_id: &str,
        generation: u64,
        force: bool,
    ) -> Result<bool, ThinkingError> {
        match self.plan_auto_step(session_id, generation, force).await? {
            AutoStep::Expand {
                snapshot,
                parent_id,
                plan,
                prompt,
                max_tokens,
            } => {
                let output = self.infer(&snapshot, prompt, max_tokens).await?;

                let _guard = self.locks.acquire(session_id).await;
                let Some(mut session) = self.reclaim(session_id, generation, &output).await? else {
                    return Ok(false);
                };
                let mut parent = self.load_node(session_id, &parent_id).await?;
                self.charge(&mut session, &output).await?;
                let draft = ChildDraft {
                    thought_type: plan.thought_type,
                    assessment: assess(&output.text),
                    generation: output,
                    revised_from: None,
                };
                self.attach_child(&mut session, &mut parent, draft).await?;
                Ok(true)
            }
            AutoStep::Synthesize { snapshot, prompt } => {
                let output = self.infer(&snapshot, prompt, SYNTHESIS_MAX_TOKENS).await?;

                let _guard = self.locks.acquire(session_id).await;
                let Some(mut session) = self.reclaim(session_id, generation, &output).await? else {
                    return Ok(false);
                };
                self.finish_synthesis(&mut session, output).await?;
                Ok(false)
            }
            AutoStep::Idle => {
                tracing::debug!("Auto-expansion idle, waiting for the caller");
                Ok(false)
            }
            AutoStep::Stop => Ok(false),
        }
    }

    async fn plan_auto_step(
        &self,
        session_id: &str,
        generation: u64,
        force: bool,
    ) -> Result<AutoStep, ThinkingError> {
        let _guard = self.locks.acquire(session_id).await;
        if !self.loops.is_current(session_id, generation) {
            return Ok(AutoStep::Stop);
        }
        let session = self.load_session(session_id).await?;
        if session.status != SessionStatus::Thinking {
            return Ok(AutoStep::Stop);
        }

        let tree = self.storage.load_tree(session_id).await?;
        let current = find_node(&tree, session_id, &session.current_node_id)?;
        if current.depth >= session.config.max_depth {
            let prompt = self.synthesis_request(&session).await?;
            return Ok(AutoStep::Synthesize {
                snapshot: session,
                prompt,
            });
        }

        let plan = self.plan_child(&session, current);
        let threshold = session
            .config
            .min_confidence_threshold
            .max(plan.min_confidence.unwrap_or(0));
        let confident = force || current.confidence >= threshold;
        if !confident || session.stats.tokens_used >= session.config.max_tokens {
            tracing::debug!(
                node_id = %current.id,
                confidence = current.confidence,
                threshold,
                "Stopping condition not met"
            );
            return Ok(AutoStep::Idle);
        }

        let prompt = expansion_prompt(
            &session.query,
            &ancestry(&tree, &current.id),
            plan.thought_type,
            session.config.style,
            plan.step_prompt.as_deref(),
        );
        let max_tokens = call_budget(&session);
        Ok(AutoStep::Expand {
            parent_id: current.id.clone(),
            snapshot: session,
            plan,
            prompt,
            max_tokens,
        })
    }

    /// Reload a session after inference, if this loop still owns it.
    ///
    /// A superseded loop, or a session that left `thinking` meanwhile,
    /// discards the result. Tokens it spent are still recorded unless the
    /// session is terminal. Must be called with the session lock held.
    async fn reclaim(
        &self,
        session_id: &str,
        generation: u64,
        output: &Generation,
    ) -> Result<Option<ThinkingSession>, ThinkingError> {
        let mut session = self.load_session(session_id).await?;
        if self.loops.is_current(session_id, generation)
            && session.status == SessionStatus::Thinking
        {
            return Ok(Some(session));
        }
        tracing::debug!(
            status = %session.status,
            "Session changed during inference, discarding result"
        );
        if !session.status.is_terminal() {
            session.stats.record_usage(output.tokens, output.duration_ms);
            session.updated_at = self.now();
            self.storage.save_session(&session).await?;
        }
        Ok(None)
    }

    /// Move a session to `failed` after an unrecoverable loop error.
    async fn fail_session(&self, session_id: &str, generation: u64, error: &ThinkingError) {
        let _guard = self.locks.acquire(session_id).await;
        if !self.loops.is_current(session_id, generation) {
            tracing::debug!(error = %error, "Superseded loop failed, ignoring");
            return;
        }
        let mut session = match self.load_session(session_id).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load session for failure");
                return;
            }
        };
        if session.status.is_terminal() {
            return;
        }

        let now = self.now();
        session.status = SessionStatus::Failed;
        session.updated_at = now;
        if let Err(e) = self.storage.save_session(&session).await {
            tracing::error!(error = %e, "Failed to persist failed status");
            return;
        }

        tracing::error!(kind = error.kind(), error = %error, "Auto-expansion failed the session");
        self.emit(ThinkingEvent::Error {
            session_id: session_id.to_string(),
            timestamp: now,
            kind: error.kind().to_string(),
            message: error.to_string(),
        });
    }
}
