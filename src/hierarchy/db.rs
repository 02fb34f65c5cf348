use sqlx::{SqliteConnection, SqlitePool};

use super::models::{
    validate_name, CreateDocument, CreateFolder, Document, DocumentPatch, Folder, FolderPatch,
    NodeSummary,
};
use crate::error::DocstashError;

#[derive(Debug, Clone)]
pub struct HierarchyDb {
    pool: SqlitePool,
}

impl HierarchyDb {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a folder, flagging the parent as populated in the same
    /// transaction.
    pub async fn create_folder(&self, data: CreateFolder) -> Result<Folder, DocstashError> {
        data.validate()?;

        let mut tx = self.pool.begin().await?;

        ensure_vacant(&mut tx, "folders", &data.name, data.parent).await?;

        if let Some(parent) = data.parent {
            resolve_parent(&mut tx, parent).await?;
        }

        let folder = sqlx::query_as::<_, Folder>(
            "INSERT INTO folders(name, parent, has_children) VALUES(?, ?, ?) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.parent)
        .bind(data.has_children.unwrap_or(false))
        .fetch_one(&mut *tx)
        .await?;

        if let Some(parent) = data.parent {
            mark_populated(&mut tx, parent).await?;
        }

        tx.commit().await?;
        Ok(folder)
    }

    pub async fn create_document(&self, data: CreateDocument) -> Result<Document, DocstashError> {
        data.validate()?;

        let mut tx = self.pool.begin().await?;

        ensure_vacant(&mut tx, "documents", &data.name, data.parent).await?;

        if let Some(parent) = data.parent {
            resolve_parent(&mut tx, parent).await?;
        }

        let document = sqlx::query_as::<_, Document>(
            "INSERT INTO documents(name, parent, content) VALUES(?, ?, ?) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.parent)
        .bind(data.content.unwrap_or_default())
        .fetch_one(&mut *tx)
        .await?;

        if let Some(parent) = data.parent {
            mark_populated(&mut tx, parent).await?;
        }

        tx.commit().await?;
        Ok(document)
    }

    /// Delete a folder and everything beneath it, then clear the parent's
    /// `has_children` flag when no sibling is left. One transaction, so the
    /// cascade and the flag update land together or not at all.
    pub async fn delete_folder(&self, id: i64) -> Result<(), DocstashError> {
        let mut tx = self.pool.begin().await?;

        let folder = sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DocstashError::NotFound(format!("folder {id} not found")))?;

        sqlx::query("DELETE FROM folders WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(parent) = folder.parent {
            refresh_has_children(&mut tx, parent).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete_document(&self, id: i64) -> Result<(), DocstashError> {
        let mut tx = self.pool.begin().await?;

        let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DocstashError::NotFound(format!("document {id} not found")))?;

        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(parent) = document.parent {
            refresh_has_children(&mut tx, parent).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn patch_folder(&self, id: i64, patch: FolderPatch) -> Result<Folder, DocstashError> {
        let current = self.get_folder(id).await?;

        let name = patch.name.unwrap_or(current.name);
        let parent = patch.parent.unwrap_or(current.parent);
        let has_children = patch.has_children.unwrap_or(current.has_children);

        validate_name(&name)?;

        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = ?, parent = ?, has_children = ?, \
             updated_at = CURRENT_TIMESTAMP WHERE id = ? RETURNING *",
        )
        .bind(&name)
        .bind(parent)
        .bind(has_children)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(DocstashError::from)
    }

    pub async fn patch_document(
        &self,
        id: i64,
        patch: DocumentPatch,
    ) -> Result<Document, DocstashError> {
        let current = self.get_document(id).await?;

        let name = patch.name.unwrap_or(current.name);
        let parent = patch.parent.unwrap_or(current.parent);
        let content = patch.content.unwrap_or(current.content);

        validate_name(&name)?;

        sqlx::query_as::<_, Document>(
            "UPDATE documents SET name = ?, parent = ?, content = ?, \
             updated_at = CURRENT_TIMESTAMP WHERE id = ? RETURNING *",
        )
        .bind(&name)
        .bind(parent)
        .bind(&content)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(DocstashError::from)
    }

    pub async fn list_folders(&self) -> Result<Vec<NodeSummary>, DocstashError> {
        sqlx::query_as::<_, NodeSummary>("SELECT id, name FROM folders ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(DocstashError::from)
    }

    pub async fn list_documents(&self) -> Result<Vec<NodeSummary>, DocstashError> {
        sqlx::query_as::<_, NodeSummary>("SELECT id, name FROM documents ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(DocstashError::from)
    }

    pub async fn get_folder(&self, id: i64) -> Result<Folder, DocstashError> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DocstashError::NotFound(format!("folder {id} not found")))
    }

    pub async fn get_document(&self, id: i64) -> Result<Document, DocstashError> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DocstashError::NotFound(format!("document {id} not found")))
    }

    /// Recount a folder's children and drop its `has_children` flag when none
    /// remain. Exposed on its own so the recount is testable outside the
    /// delete path.
    pub async fn refresh_has_children(&self, parent: i64) -> Result<bool, DocstashError> {
        let mut conn = self.pool.acquire().await?;
        refresh_has_children(&mut conn, parent).await
    }
}

/// Reject a create when a same-kind sibling already carries the name. The
/// partial unique indexes remain the backstop for concurrent creates.
async fn ensure_vacant(
    conn: &mut SqliteConnection,
    table: &str,
    name: &str,
    parent: Option<i64>,
) -> Result<(), DocstashError> {
    let taken = sqlx::query_scalar::<_, bool>(&format!(
        "SELECT EXISTS(SELECT 1 FROM {table} WHERE name = ? AND parent IS ?)"
    ))
    .bind(name)
    .bind(parent)
    .fetch_one(conn)
    .await?;

    if taken {
        let kind = table.trim_end_matches('s');
        let scope = match parent {
            Some(id) => format!("under folder {id}"),
            None => "at the root".to_string(),
        };
        return Err(DocstashError::Conflict(format!(
            "a {kind} named '{name}' already exists {scope}"
        )));
    }
    Ok(())
}

async fn resolve_parent(conn: &mut SqliteConnection, parent: i64) -> Result<(), DocstashError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM folders WHERE id = ?)")
        .bind(parent)
        .fetch_one(conn)
        .await?;

    if !exists {
        return Err(DocstashError::NotFound(format!(
            "parent folder {parent} not found"
        )));
    }
    Ok(())
}

/// Idempotent: written even when the flag is already set.
async fn mark_populated(conn: &mut SqliteConnection, parent: i64) -> Result<(), DocstashError> {
    sqlx::query(
        "UPDATE folders SET has_children = TRUE, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(parent)
    .execute(conn)
    .await?;
    Ok(())
}

/// The flag is a cached aggregate: recompute it from the authoritative child
/// counts rather than decrementing a counter. A stale `true` with children
/// still present is deliberately left alone.
pub async fn refresh_has_children(
    conn: &mut SqliteConnection,
    parent: i64,
) -> Result<bool, DocstashError> {
    let remaining = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM folders WHERE parent = ?1) \
             OR EXISTS(SELECT 1 FROM documents WHERE parent = ?1)",
    )
    .bind(parent)
    .fetch_one(&mut *conn)
    .await?;

    if !remaining {
        sqlx::query(
            "UPDATE folders SET has_children = FALSE, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(parent)
        .execute(conn)
        .await?;
    }

    Ok(remaining)
}
