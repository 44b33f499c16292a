//! `StorageTrait` implementation for `SqliteStorage`.

#![allow(clippy::missing_errors_doc)]

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::thinking::{Bookmark, ThinkingSession, ThoughtNode, TreeCommit};
use crate::traits::StorageTrait;

use super::bookmark::insert_bookmark;
use super::core::SqliteStorage;
use super::node::{insert_node, overwrite_node};
use super::session::upsert_session;

impl SqliteStorage {
    /// Apply a [`TreeCommit`] in one transaction.
    ///
    /// The session row is written first so new nodes satisfy their foreign
    /// key. Any failure rolls the whole commit back.
    pub async fn commit_tree(&self, commit: &TreeCommit) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::query_error("BEGIN", format!("{e}")))?;

        upsert_session(&mut *tx, &commit.session).await?;
        for node in &commit.created {
            insert_node(&mut *tx, node).await?;
        }
        for node in &commit.updated {
            overwrite_node(&mut *tx, node).await?;
        }

        tx.commit()
            .await
            .map_err(|e| Self::query_error("COMMIT", format!("{e}")))?;

        tracing::debug!(
            session_id = %commit.session.id,
            created = commit.created.len(),
            updated = commit.updated.len(),
            "Committed thought tree changes"
        );
        Ok(())
    }

    /// Overwrite a bookmarked node and insert its bookmark in one transaction.
    pub async fn commit_bookmark(
        &self,
        node: &ThoughtNode,
        bookmark: &Bookmark,
    ) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::query_error("BEGIN", format!("{e}")))?;

        overwrite_node(&mut *tx, node).await?;
        insert_bookmark(&mut *tx, bookmark).await?;

        tx.commit()
            .await
            .map_err(|e| Self::query_error("COMMIT", format!("{e}")))?;
        Ok(())
    }
}

#[async_trait]
impl StorageTrait for SqliteStorage {
    async fn save_session(&self, session: &ThinkingSession) -> Result<(), StorageError> {
        self.put_session(session).await
    }

    async fn load_session(&self, id: &str) -> Result<Option<ThinkingSession>, StorageError> {
        self.get_session(id).await
    }

    async fn save_node(&self, node: &ThoughtNode) -> Result<(), StorageError> {
        self.insert_node(node).await
    }

    async fn update_node(&self, node: &ThoughtNode) -> Result<(), StorageError> {
        self.replace_node(node).await
    }

    async fn load_node(
        &self,
        session_id: &str,
        node_id: &str,
    ) -> Result<Option<ThoughtNode>, StorageError> {
        self.get_node(session_id, node_id).await
    }

    async fn load_tree(&self, session_id: &str) -> Result<Vec<ThoughtNode>, StorageError> {
        self.list_nodes(session_id).await
    }

    async fn apply_commit(&self, commit: &TreeCommit) -> Result<(), StorageError> {
        self.commit_tree(commit).await
    }

    async fn save_bookmark(&self, bookmark: &Bookmark) -> Result<(), StorageError> {
        self.insert_bookmark(bookmark).await
    }

    async fn apply_bookmark(
        &self,
        node: &ThoughtNode,
        bookmark: &Bookmark,
    ) -> Result<(), StorageError> {
        self.commit_bookmark(node, bookmark).await
    }

    async fn list_bookmarks(&self, session_id: &str) -> Result<Vec<Bookmark>, StorageError> {
        self.get_bookmarks(session_id).await
    }
}

/// Implement `StorageTrait` for `Arc<SqliteStorage>` to allow shared ownership.
#[async_trait]
impl StorageTrait for Arc<SqliteStorage> {
    async fn save_session(&self, session: &ThinkingSession) -> Result<(), StorageError> {
        self.as_ref().put_session(session).await
    }

    async fn load_session(&self, id: &str) -> Result<Option<ThinkingSession>, StorageError> {
        self.as_ref().get_session(id).await
    }

    async fn save_node(&self, node: &ThoughtNode) -> Result<(), StorageError> {
        self.as_ref().insert_node(node).await
    }

    async fn update_node(&self, node: &ThoughtNode) -> Result<(), StorageError> {
        self.as_ref().replace_node(node).await
    }

    async fn load_node(
        &self,
        session_id: &str,
        node_id: &str,
    ) -> Result<Option<ThoughtNode>, StorageError> {
        self.as_ref().get_node(session_id, node_id).await
    }

    async fn load_tree(&self, session_id: &str) -> Result<Vec<ThoughtNode>, StorageError> {
        self.as_ref().list_nodes(session_id).await
    }

    async fn apply_commit(&self, commit: &TreeCommit) -> Result<(), StorageError> {
        self.as_ref().commit_tree(commit).await
    }

    async fn save_bookmark(&self, bookmark: &Bookmark) -> Result<(), StorageError> {
        self.as_ref().insert_bookmark(bookmark).await
    }

    async fn apply_bookmark(
        &self,
        node: &ThoughtNode,
        bookmark: &Bookmark,
    ) -> Result<(), StorageError> {
        self.as_ref().commit_bookmark(node, bookmark).await
    }

    async fn list_bookmarks(&self, session_id: &str) -> Result<Vec<Bookmark>, StorageError> {
        self.as_ref().get_bookmarks(session_id).await
    }
}
