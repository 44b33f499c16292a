//! Thinking sessions.
//!
//! A session grows a tree of typed thoughts from one query. This module
//! holds the data model, the per-session locking and event bus, and the
//! [`ThinkingEngine`] that implements every operation:
//!
//! | Operation | Module |
//! |-----------|--------|
//! | start, bookmark, reads | `engine` |
//! | expand | `expansion` |
//! | critique, alternatives | `review` |
//! | synthesize | `synthesis` |
//! | pause, resume, auto-expansion | `lifecycle` |

mod engine;
mod events;
mod expansion;
mod lifecycle;
mod locks;
mod review;
mod synthesis;
mod types;

pub use engine::{
    StartSession, ThinkingEngine, BUDGET_PAUSE_REASON, PER_CALL_MAX_TOKENS,
    REQUESTED_PAUSE_REASON, SYNTHESIS_MAX_TOKENS,
};
pub use events::{EventBus, EventStream, ThinkingEvent};
pub use locks::{LoopGenerations, SessionGuard, SessionLocks};
pub use types::{
    Bookmark, NodeMetadata, NodeStatus, SessionStats, SessionStatus, ThinkingConfig,
    ThinkingSession, ThinkingStyle, ThoughtNode, ThoughtType, TreeCommit, ROOT_CONFIDENCE,
};
