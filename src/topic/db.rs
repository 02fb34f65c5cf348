use sqlx::SqlitePool;

use super::models::{
    validate_short_desc, CreateDocumentTopic, CreateFolderTopic, CreateTopic, DocumentTopic,
    FolderTopic, Topic, TopicPatch,
};
use crate::error::DocstashError;
use crate::hierarchy::models::{validate_name, NodeSummary};

#[derive(Debug, Clone)]
pub struct TopicDb {
    pool: SqlitePool,
}

impl TopicDb {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_topic(&self, data: CreateTopic) -> Result<Topic, DocstashError> {
        data.validate()?;

        let taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM topics WHERE name = ?)")
                .bind(&data.name)
                .fetch_one(&self.pool)
                .await?;

        if taken {
            return Err(DocstashError::Conflict(format!(
                "a topic named '{}' already exists",
                data.name
            )));
        }

        sqlx::query_as::<_, Topic>(
            "INSERT INTO topics(name, short_desc, long_desc) VALUES(?, ?, ?) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.short_desc)
        .bind(data.long_desc.unwrap_or_default())
        .fetch_one(&self.pool)
        .await
        .map_err(DocstashError::from)
    }

    pub async fn list_topics(&self) -> Result<Vec<NodeSummary>, DocstashError> {
        sqlx::query_as::<_, NodeSummary>("SELECT id, name FROM topics ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(DocstashError::from)
    }

    pub async fn get_topic(&self, id: i64) -> Result<Topic, DocstashError> {
        sqlx::query_as::<_, Topic>("SELECT * FROM topics WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DocstashError::NotFound(format!("topic {id} not found")))
    }

    pub async fn patch_topic(&self, id: i64, patch: TopicPatch) -> Result<Topic, DocstashError> {
        let current = self.get_topic(id).await?;

        let name = patch.name.unwrap_or(current.name);
        let short_desc = patch.short_desc.unwrap_or(current.short_desc);
        let long_desc = patch.long_desc.unwrap_or(current.long_desc);

        validate_name(&name)?;
        validate_short_desc(&short_desc)?;

        sqlx::query_as::<_, Topic>(
            "UPDATE topics SET name = ?, short_desc = ?, long_desc = ?, \
             updated_at = CURRENT_TIMESTAMP WHERE id = ? RETURNING *",
        )
        .bind(&name)
        .bind(&short_desc)
        .bind(&long_desc)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(DocstashError::from)
    }

    /// Cascades to the topic's association rows; folders and documents are
    /// untouched.
    pub async fn delete_topic(&self, id: i64) -> Result<(), DocstashError> {
        let deleted = sqlx::query("DELETE FROM topics WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(DocstashError::NotFound(format!("topic {id} not found")));
        }
        Ok(())
    }

    pub async fn associate_folder(
        &self,
        data: CreateFolderTopic,
    ) -> Result<FolderTopic, DocstashError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM folders WHERE id = ?)")
                .bind(data.folder)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(DocstashError::NotFound(format!(
                "folder {} not found",
                data.folder
            )));
        }

        self.get_topic(data.topic).await?;

        let paired = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM folder_topics WHERE folder = ? AND topic = ?)",
        )
        .bind(data.folder)
        .bind(data.topic)
        .fetch_one(&self.pool)
        .await?;
        if paired {
            return Err(DocstashError::Conflict(format!(
                "folder {} is already tagged with topic {}",
                data.folder, data.topic
            )));
        }

        sqlx::query_as::<_, FolderTopic>(
            "INSERT INTO folder_topics(folder, topic) VALUES(?, ?) RETURNING *",
        )
        .bind(data.folder)
        .bind(data.topic)
        .fetch_one(&self.pool)
        .await
        .map_err(DocstashError::from)
    }

    pub async fn associate_document(
        &self,
        data: CreateDocumentTopic,
    ) -> Result<DocumentTopic, DocstashError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM documents WHERE id = ?)")
                .bind(data.document)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(DocstashError::NotFound(format!(
                "document {} not found",
                data.document
            )));
        }

        self.get_topic(data.topic).await?;

        let paired = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM document_topics WHERE document = ? AND topic = ?)",
        )
        .bind(data.document)
        .bind(data.topic)
        .fetch_one(&self.pool)
        .await?;
        if paired {
            return Err(DocstashError::Conflict(format!(
                "document {} is already tagged with topic {}",
                data.document, data.topic
            )));
        }

        sqlx::query_as::<_, DocumentTopic>(
            "INSERT INTO document_topics(document, topic) VALUES(?, ?) RETURNING *",
        )
        .bind(data.document)
        .bind(data.topic)
        .fetch_one(&self.pool)
        .await
        .map_err(DocstashError::from)
    }

    pub async fn folders_by_topic(
        &self,
        topic_name: &str,
    ) -> Result<Vec<NodeSummary>, DocstashError> {
        let topic = self.topic_by_name(topic_name).await?;

        sqlx::query_as::<_, NodeSummary>(
            "SELECT f.id, f.name FROM folders f \
             INNER JOIN folder_topics ft ON ft.folder = f.id \
             WHERE ft.topic = ? ORDER BY f.id",
        )
        .bind(topic.id)
        .fetch_all(&self.pool)
        .await
        .map_err(DocstashError::from)
    }

    pub async fn documents_by_topic(
        &self,
        topic_name: &str,
        folder_name: Option<&str>,
    ) -> Result<Vec<NodeSummary>, DocstashError> {
        let topic = self.topic_by_name(topic_name).await?;

        let Some(folder_name) = folder_name else {
            return sqlx::query_as::<_, NodeSummary>(
                "SELECT d.id, d.name FROM documents d \
                 INNER JOIN document_topics dt ON dt.document = d.id \
                 WHERE dt.topic = ? ORDER BY d.id",
            )
            .bind(topic.id)
            .fetch_all(&self.pool)
            .await
            .map_err(DocstashError::from);
        };

        // Folder names are only unique per parent; resolve the lowest id
        // deterministically when the name is ambiguous.
        let folder = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM folders WHERE name = ? ORDER BY id LIMIT 1",
        )
        .bind(folder_name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DocstashError::NotFound(format!("folder '{folder_name}' not found")))?;

        sqlx::query_as::<_, NodeSummary>(
            "SELECT d.id, d.name FROM documents d \
             INNER JOIN document_topics dt ON dt.document = d.id \
             WHERE dt.topic = ? AND d.parent = ? ORDER BY d.id",
        )
        .bind(topic.id)
        .bind(folder)
        .fetch_all(&self.pool)
        .await
        .map_err(DocstashError::from)
    }

    async fn topic_by_name(&self, name: &str) -> Result<Topic, DocstashError> {
        sqlx::query_as::<_, Topic>("SELECT * FROM topics WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DocstashError::NotFound(format!("topic '{name}' not found")))
    }
}
