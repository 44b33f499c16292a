//! Trait definitions for mockable dependencies.
//!
//! This module defines traits for:
//! - [`InferenceClientTrait`]: language-model inference abstraction
//! - [`StorageTrait`]: persistent store abstraction
//! - [`TimeProvider`]: Time abstraction for testing
//!
//! It also re-exports shared types from the `types` submodule.
//!
//! # Mocking
//!
//! All traits are annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates mock implementations automatically for testing.
//!
//! # Example
//!
//! ```
//! use mcp_thinking::traits::{TimeProvider, RealTimeProvider};
//!
//! let time_provider = RealTimeProvider;
//! let now = time_provider.now();
//! println!("Current time: {now}");
//! ```

mod types;

pub use types::{CompletionConfig, CompletionResponse, Message, Usage};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{StorageError, ThinkingError};
use crate::thinking::{Bookmark, ThinkingSession, ThoughtNode, TreeCommit};

/// Inference client trait for mocking.
///
/// Given a prompt and a token budget, returns generated text plus
/// consumed-token counts. Implementations own any retry policy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceClientTrait: Send + Sync {
    /// Send a completion request to the inference service.
    ///
    /// # Errors
    ///
    /// Returns [`ThinkingError::InferenceFailure`] carrying the vendor
    /// message if the call fails.
    async fn complete(
        &self,
        messages: Vec<Message>,
        config: CompletionConfig,
    ) -> Result<CompletionResponse, ThinkingError>;
}

/// Storage trait for mocking.
///
/// Durable record storage for sessions, thought nodes, and bookmarks.
/// The store owns no policy; it is the durability boundary for the engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageTrait: Send + Sync {
    /// Insert or update a session record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn save_session(&self, session: &ThinkingSession) -> Result<(), StorageError>;

    /// Get a session by ID.
    ///
    /// Returns `None` if the session doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn load_session(&self, id: &str) -> Result<Option<ThinkingSession>, StorageError>;

    /// Insert a new thought node.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn save_node(&self, node: &ThoughtNode) -> Result<(), StorageError>;

    /// Update an existing thought node.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NodeNotFound`] if the node was never saved.
    async fn update_node(&self, node: &ThoughtNode) -> Result<(), StorageError>;

    /// Get a node by session and node ID.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn load_node(
        &self,
        session_id: &str,
        node_id: &str,
    ) -> Result<Option<ThoughtNode>, StorageError>;

    /// Get every node of a session, ordered by creation.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn load_tree(&self, session_id: &str) -> Result<Vec<ThoughtNode>, StorageError>;

    /// Apply a session update plus node inserts and updates atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if any statement fails; nothing is applied.
    async fn apply_commit(&self, commit: &TreeCommit) -> Result<(), StorageError>;

    /// Save a bookmark record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn save_bookmark(&self, bookmark: &Bookmark) -> Result<(), StorageError>;

    /// Overwrite the bookmarked node and insert its bookmark atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if either write fails; nothing is applied.
    async fn apply_bookmark(
        &self,
        node: &ThoughtNode,
        bookmark: &Bookmark,
    ) -> Result<(), StorageError>;

    /// Get all bookmarks for a session, ordered by creation.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn list_bookmarks(&self, session_id: &str) -> Result<Vec<Bookmark>, StorageError>;
}

/// Time provider trait for deterministic testing.
///
/// This trait abstracts time operations to allow for
/// deterministic testing by providing fixed timestamps.
#[cfg_attr(test, mockall::automock)]
pub trait TimeProvider: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Real time provider using system clock.
///
/// This is the production implementation that returns the actual current time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
