//! Thought node records.

#![allow(clippy::missing_errors_doc)]

use crate::error::StorageError;
use crate::thinking::{NodeStatus, ThoughtNode, ThoughtType};
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::Executor;

use super::core::{column, decode_json, decode_tag, encode_json, SqliteStorage};

const NODE_COLUMNS: &str = "id, session_id, parent_id, content, thought_type, confidence, depth, \
                            children, status, rationale, alternatives, metadata, created_at";

/// Insert a new node row.
pub(super) async fn insert_node<'e, E>(executor: E, node: &ThoughtNode) -> Result<(), StorageError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let children = encode_json("children", &node.children)?;
    let alternatives = encode_json("alternatives", &node.alternatives)?;
    let metadata = encode_json("metadata", &node.metadata)?;

    sqlx::query(&format!(
        "INSERT INTO thought_nodes ({NODE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(node.id.as_str())
    .bind(node.session_id.as_str())
    .bind(node.parent_id.as_deref())
    .bind(node.content.as_str())
    .bind(node.thought_type.as_str())
    .bind(i64::from(node.confidence))
    .bind(i64::from(node.depth))
    .bind(children)
    .bind(node.status.as_str())
    .bind(node.rationale.as_deref())
    .bind(alternatives)
    .bind(metadata)
    .bind(node.metadata.created_at.to_rfc3339())
    .execute(executor)
    .await
    .map_err(|e| SqliteStorage::query_error("INSERT thought_nodes", format!("{e}")))?;

    Ok(())
}

/// Overwrite the mutable fields of an existing node.
///
/// Fails with [`StorageError::NodeNotFound`] when no row matches.
pub(super) async fn overwrite_node<'e, E>(
    executor: E,
    node: &ThoughtNode,
) -> Result<(), StorageError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let children = encode_json("children", &node.children)?;
    let alternatives = encode_json("alternatives", &node.alternatives)?;
    let metadata = encode_json("metadata", &node.metadata)?;

    let result = sqlx::query(
        "UPDATE thought_nodes SET content = ?, thought_type = ?, confidence = ?, children = ?, \
         status = ?, rationale = ?, alternatives = ?, metadata = ? \
         WHERE id = ? AND session_id = ?",
    )
    .bind(node.content.as_str())
    .bind(node.thought_type.as_str())
    .bind(i64::from(node.confidence))
    .bind(children)
    .bind(node.status.as_str())
    .bind(node.rationale.as_deref())
    .bind(alternatives)
    .bind(metadata)
    .bind(node.id.as_str())
    .bind(node.session_id.as_str())
    .execute(executor)
    .await
    .map_err(|e| SqliteStorage::query_error("UPDATE thought_nodes", format!("{e}")))?;

    if result.rows_affected() == 0 {
        return Err(StorageError::NodeNotFound {
            node_id: node.id.clone(),
        });
    }

    Ok(())
}

fn node_from_row(row: &SqliteRow) -> Result<ThoughtNode, StorageError> {
    let thought_type: String = column(row, "thought_type")?;
    let status: String = column(row, "status")?;
    let confidence: i64 = column(row, "confidence")?;
    let depth: i64 = column(row, "depth")?;
    let children: String = column(row, "children")?;
    let alternatives: String = column(row, "alternatives")?;
    let metadata: String = column(row, "metadata")?;

    Ok(ThoughtNode {
        id: column(row, "id")?,
        parent_id: column(row, "parent_id")?,
        session_id: column(row, "session_id")?,
        content: column(row, "content")?,
        thought_type: decode_tag("thought_type", &thought_type, ThoughtType::from_str)?,
        confidence: u8::try_from(confidence).map_err(|_| StorageError::Serialization {
            field: "confidence".to_string(),
            message: format!("out of range: {confidence}"),
        })?,
        depth: u32::try_from(depth).map_err(|_| StorageError::Serialization {
            field: "depth".to_string(),
            message: format!("out of range: {depth}"),
        })?,
        children: decode_json("children", &children)?,
        status: decode_tag("status", &status, NodeStatus::from_str)?,
        rationale: column(row, "rationale")?,
        alternatives: decode_json("alternatives", &alternatives)?,
        metadata: decode_json("metadata", &metadata)?,
    })
}

impl SqliteStorage {
    /// Insert a node.
    pub async fn insert_node(&self, node: &ThoughtNode) -> Result<(), StorageError> {
        insert_node(&self.pool, node).await
    }

    /// Overwrite an existing node.
    pub async fn replace_node(&self, node: &ThoughtNode) -> Result<(), StorageError> {
        overwrite_node(&self.pool, node).await
    }

    /// Get a node of a session.
    pub async fn get_node(
        &self,
        session_id: &str,
        node_id: &str,
    ) -> Result<Option<ThoughtNode>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {NODE_COLUMNS} FROM thought_nodes WHERE id = ? AND session_id = ?"
        ))
        .bind(node_id)
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::query_error("SELECT thought_nodes", format!("{e}")))?;

        row.as_ref().map(node_from_row).transpose()
    }

    /// All nodes of a session in creation order.
    pub async fn list_nodes(&self, session_id: &str) -> Result<Vec<ThoughtNode>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {NODE_COLUMNS} FROM thought_nodes WHERE session_id = ? ORDER BY rowid ASC"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Self::query_error("SELECT thought_nodes", format!("{e}")))?;

        rows.iter().map(node_from_row).collect()
    }
}
