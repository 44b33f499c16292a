//! Bookmark records.

#![allow(clippy::missing_errors_doc)]

use crate::error::StorageError;
use crate::thinking::Bookmark;
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::Executor;

use super::core::{column, SqliteStorage};

pub(super) async fn insert_bookmark<'e, E>(
    executor: E,
    bookmark: &Bookmark,
) -> Result<(), StorageError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO thought_bookmarks (id, user_id, session_id, node_id, note, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(bookmark.id.as_str())
    .bind(bookmark.user_id.as_deref())
    .bind(bookmark.session_id.as_str())
    .bind(bookmark.node_id.as_str())
    .bind(bookmark.note.as_deref())
    .bind(bookmark.created_at.to_rfc3339())
    .execute(executor)
    .await
    .map_err(|e| SqliteStorage::query_error("INSERT thought_bookmarks", format!("{e}")))?;

    Ok(())
}

fn bookmark_from_row(row: &SqliteRow) -> Result<Bookmark, StorageError> {
    let created_at: String = column(row, "created_at")?;
    Ok(Bookmark {
        id: column(row, "id")?,
        user_id: column(row, "user_id")?,
        session_id: column(row, "session_id")?,
        node_id: column(row, "node_id")?,
        note: column(row, "note")?,
        created_at: SqliteStorage::parse_datetime(&created_at)?,
    })
}

impl SqliteStorage {
    /// Save a bookmark.
    pub async fn insert_bookmark(&self, bookmark: &Bookmark) -> Result<(), StorageError> {
        insert_bookmark(&self.pool, bookmark).await
    }

    /// Bookmarks of a session, oldest first.
    pub async fn get_bookmarks(&self, session_id: &str) -> Result<Vec<Bookmark>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, user_id, session_id, node_id, note, created_at \
             FROM thought_bookmarks WHERE session_id = ? ORDER BY rowid ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Self::query_error("SELECT thought_bookmarks", format!("{e}")))?;

        rows.iter().map(bookmark_from_row).collect()
    }
}
