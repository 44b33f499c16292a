//! Thinking session records.

#![allow(clippy::missing_errors_doc)]

use crate::error::StorageError;
use crate::thinking::{SessionStatus, ThinkingSession};
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::Executor;

use super::core::{column, decode_json, decode_tag, encode_json, SqliteStorage};

const UPSERT_SESSION: &str = r"
INSERT INTO thinking_sessions (
    id, user_id, project_id, query, root_node_id, current_node_id,
    config, status, stats, final_conclusion, created_at, updated_at, completed_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT(id) DO UPDATE SET
    user_id = excluded.user_id,
    project_id = excluded.project_id,
    query = excluded.query,
    current_node_id = excluded.current_node_id,
    config = excluded.config,
    status = excluded.status,
    stats = excluded.stats,
    final_conclusion = excluded.final_conclusion,
    updated_at = excluded.updated_at,
    completed_at = excluded.completed_at
";

const SELECT_SESSION: &str = r"
SELECT id, user_id, project_id, query, root_node_id, current_node_id,
       config, status, stats, final_conclusion, created_at, updated_at, completed_at
FROM thinking_sessions WHERE id = ?
";

/// Insert or overwrite a session row. `root_node_id` never changes.
pub(super) async fn upsert_session<'e, E>(
    executor: E,
    session: &ThinkingSession,
) -> Result<(), StorageError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let config = encode_json("config", &session.config)?;
    let stats = encode_json("stats", &session.stats)?;

    sqlx::query(UPSERT_SESSION)
        .bind(session.id.as_str())
        .bind(session.user_id.as_deref())
        .bind(session.project_id.as_str())
        .bind(session.query.as_str())
        .bind(session.root_node_id.as_str())
        .bind(session.current_node_id.as_str())
        .bind(config)
        .bind(session.status.as_str())
        .bind(stats)
        .bind(session.final_conclusion.as_deref())
        .bind(session.created_at.to_rfc3339())
        .bind(session.updated_at.to_rfc3339())
        .bind(session.completed_at.map(|t| t.to_rfc3339()))
        .execute(executor)
        .await
        .map_err(|e| SqliteStorage::query_error("UPSERT thinking_sessions", format!("{e}")))?;

    Ok(())
}

fn session_from_row(row: &SqliteRow) -> Result<ThinkingSession, StorageError> {
    let config: String = column(row, "config")?;
    let status: String = column(row, "status")?;
    let stats: String = column(row, "stats")?;
    let created_at: String = column(row, "created_at")?;
    let updated_at: String = column(row, "updated_at")?;
    let completed_at: Option<String> = column(row, "completed_at")?;

    Ok(ThinkingSession {
        id: column(row, "id")?,
        user_id: column(row, "user_id")?,
        project_id: column(row, "project_id")?,
        query: column(row, "query")?,
        root_node_id: column(row, "root_node_id")?,
        current_node_id: column(row, "current_node_id")?,
        config: decode_json("config", &config)?,
        status: decode_tag("status", &status, SessionStatus::from_str)?,
        stats: decode_json("stats", &stats)?,
        final_conclusion: column(row, "final_conclusion")?,
        created_at: SqliteStorage::parse_datetime(&created_at)?,
        updated_at: SqliteStorage::parse_datetime(&updated_at)?,
        completed_at: completed_at
            .as_deref()
            .map(SqliteStorage::parse_datetime)
            .transpose()?,
    })
}

impl SqliteStorage {
    /// Insert or overwrite a session.
    pub async fn put_session(&self, session: &ThinkingSession) -> Result<(), StorageError> {
        upsert_session(&self.pool, session).await
    }

    /// Get a session by ID.
    pub async fn get_session(
        &self,
        session_id: &str,
    ) -> Result<Option<ThinkingSession>, StorageError> {
        let row = sqlx::query(SELECT_SESSION)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT thinking_sessions", format!("{e}")))?;

        row.as_ref().map(session_from_row).transpose()
    }

    /// Delete a session and, by cascade, its nodes and bookmarks.
    pub async fn delete_session(&self, session_id: &str) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM thinking_sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::query_error("DELETE thinking_sessions", format!("{e}")))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::SessionNotFound {
                session_id: session_id.to_string(),
            });
        }

        Ok(())
    }
}
