//! Topics and the many-to-many links tagging folders and documents.

pub mod db;
pub mod models;

#[cfg(test)]
mod tests {
    use super::db::TopicDb;
    use super::models::{CreateDocumentTopic, CreateFolderTopic, CreateTopic, TopicPatch};
    use crate::error::DocstashError;
    use crate::hierarchy::db::HierarchyDb;
    use crate::hierarchy::models::{CreateDocument, CreateFolder};
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
    use std::str::FromStr;

    async fn setup() -> (HierarchyDb, TopicDb) {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool: SqlitePool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        crate::db::migrate(&pool).await;
        (HierarchyDb::new(pool.clone()), TopicDb::new(pool))
    }

    fn topic(name: &str) -> CreateTopic {
        CreateTopic {
            name: name.to_string(),
            short_desc: "a short description".to_string(),
            long_desc: None,
        }
    }

    fn folder(name: &str, parent: Option<i64>) -> CreateFolder {
        CreateFolder {
            name: name.to_string(),
            parent,
            has_children: None,
        }
    }

    fn document(name: &str, parent: Option<i64>) -> CreateDocument {
        CreateDocument {
            name: name.to_string(),
            parent,
            content: None,
        }
    }

    #[tokio::test]
    async fn topic_names_are_globally_unique() {
        let (_, topics) = setup().await;

        let created = topics.create_topic(topic("rust")).await.unwrap();
        assert_eq!(created.long_desc, "");

        let err = topics.create_topic(topic("rust")).await.unwrap_err();
        assert!(matches!(err, DocstashError::Conflict(_)));
    }

    #[tokio::test]
    async fn topic_field_constraints() {
        let (_, topics) = setup().await;

        let err = topics
            .create_topic(CreateTopic {
                name: "t".to_string(),
                short_desc: String::new(),
                long_desc: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DocstashError::Validation(_)));

        let err = topics
            .create_topic(CreateTopic {
                name: "t".to_string(),
                short_desc: "x".repeat(61),
                long_desc: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DocstashError::Validation(_)));
    }

    #[tokio::test]
    async fn patch_topic_merges_partial_fields() {
        let (_, topics) = setup().await;
        let t = topics.create_topic(topic("history")).await.unwrap();

        let patched = topics
            .patch_topic(
                t.id,
                TopicPatch {
                    long_desc: Some("everything that happened".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(patched.name, "history");
        assert_eq!(patched.short_desc, "a short description");
        assert_eq!(patched.long_desc, "everything that happened");
    }

    #[tokio::test]
    async fn association_pair_is_unique() {
        let (hierarchy, topics) = setup().await;

        let f = hierarchy.create_folder(folder("f", None)).await.unwrap();
        let t = topics.create_topic(topic("t")).await.unwrap();

        topics
            .associate_folder(CreateFolderTopic {
                folder: f.id,
                topic: t.id,
            })
            .await
            .unwrap();
        let err = topics
            .associate_folder(CreateFolderTopic {
                folder: f.id,
                topic: t.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DocstashError::Conflict(_)));
    }

    #[tokio::test]
    async fn association_requires_both_referents() {
        let (hierarchy, topics) = setup().await;

        let f = hierarchy.create_folder(folder("f", None)).await.unwrap();
        let err = topics
            .associate_folder(CreateFolderTopic {
                folder: f.id,
                topic: 99,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DocstashError::NotFound(_)));

        let t = topics.create_topic(topic("t")).await.unwrap();
        let err = topics
            .associate_document(CreateDocumentTopic {
                document: 99,
                topic: t.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DocstashError::NotFound(_)));
    }

    #[tokio::test]
    async fn folders_by_topic_returns_tagged_only() {
        let (hierarchy, topics) = setup().await;

        let tagged = hierarchy.create_folder(folder("tagged", None)).await.unwrap();
        hierarchy.create_folder(folder("plain", None)).await.unwrap();
        let t = topics.create_topic(topic("science")).await.unwrap();

        topics
            .associate_folder(CreateFolderTopic {
                folder: tagged.id,
                topic: t.id,
            })
            .await
            .unwrap();

        let found = topics.folders_by_topic("science").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, tagged.id);
        assert_eq!(found[0].name, "tagged");

        let err = topics.folders_by_topic("nope").await.unwrap_err();
        assert!(matches!(err, DocstashError::NotFound(_)));
    }

    #[tokio::test]
    async fn documents_by_topic_honors_folder_scope() {
        let (hierarchy, topics) = setup().await;

        let folder1 = hierarchy.create_folder(folder("Folder1", None)).await.unwrap();
        let inside = hierarchy
            .create_document(document("inside", Some(folder1.id)))
            .await
            .unwrap();
        let outside = hierarchy.create_document(document("outside", None)).await.unwrap();

        let t = topics.create_topic(topic("T")).await.unwrap();
        topics
            .associate_document(CreateDocumentTopic {
                document: inside.id,
                topic: t.id,
            })
            .await
            .unwrap();
        topics
            .associate_document(CreateDocumentTopic {
                document: outside.id,
                topic: t.id,
            })
            .await
            .unwrap();

        let all = topics.documents_by_topic("T", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let scoped = topics.documents_by_topic("T", Some("Folder1")).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, inside.id);

        let err = topics
            .documents_by_topic("T", Some("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocstashError::NotFound(_)));
    }

    #[tokio::test]
    async fn deleting_a_topic_drops_its_associations_only() {
        let (hierarchy, topics) = setup().await;

        let f = hierarchy.create_folder(folder("kept", None)).await.unwrap();
        let t = topics.create_topic(topic("doomed")).await.unwrap();
        topics
            .associate_folder(CreateFolderTopic {
                folder: f.id,
                topic: t.id,
            })
            .await
            .unwrap();

        topics.delete_topic(t.id).await.unwrap();

        // The folder survives; the topic and its links do not.
        hierarchy.get_folder(f.id).await.unwrap();
        assert!(matches!(
            topics.get_topic(t.id).await.unwrap_err(),
            DocstashError::NotFound(_)
        ));
        assert!(matches!(
            topics.folders_by_topic("doomed").await.unwrap_err(),
            DocstashError::NotFound(_)
        ));

        let err = topics.delete_topic(t.id).await.unwrap_err();
        assert!(matches!(err, DocstashError::NotFound(_)));
    }

    #[tokio::test]
    async fn deleting_a_folder_drops_descendant_associations() {
        let (hierarchy, topics) = setup().await;

        let top = hierarchy.create_folder(folder("top", None)).await.unwrap();
        let doc = hierarchy
            .create_document(document("doc", Some(top.id)))
            .await
            .unwrap();
        let t = topics.create_topic(topic("t")).await.unwrap();

        topics
            .associate_folder(CreateFolderTopic {
                folder: top.id,
                topic: t.id,
            })
            .await
            .unwrap();
        topics
            .associate_document(CreateDocumentTopic {
                document: doc.id,
                topic: t.id,
            })
            .await
            .unwrap();

        hierarchy.delete_folder(top.id).await.unwrap();

        assert!(topics.folders_by_topic("t").await.unwrap().is_empty());
        assert!(topics.documents_by_topic("t", None).await.unwrap().is_empty());
    }
}
