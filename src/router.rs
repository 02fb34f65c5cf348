use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_macros::debug_handler;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::DocstashError,
    hierarchy::models::{
        CreateDocument, CreateFolder, Document, DocumentPatch, Folder, FolderPatch, NodeSummary,
    },
    state::Catalog,
    topic::models::{
        CreateDocumentTopic, CreateFolderTopic, CreateTopic, DocumentTopic, FolderTopic, Topic,
        TopicPatch,
    },
};

pub fn router(state: Catalog) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE]);

    Router::new()
        .route(
            "/folders",
            post(create_folder).get(list_folders).delete(delete_folder),
        )
        .route("/folders/:id", get(folder_details).patch(patch_folder))
        .route(
            "/documents",
            post(create_document)
                .get(list_documents)
                .delete(delete_document),
        )
        .route("/documents/:id", get(document_details).patch(patch_document))
        .route(
            "/topics",
            post(create_topic).get(list_topics).delete(delete_topic),
        )
        .route("/topics/:id", get(topic_details).patch(patch_topic))
        .route(
            "/folder-topics",
            post(create_folder_topic).get(folders_by_topic),
        )
        .route(
            "/document-topics",
            post(create_document_topic).get(documents_by_topic),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Delete requests carry the target in the body rather than the path.
#[derive(Debug, Deserialize)]
pub struct DeleteBody {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct FolderTopicQuery {
    pub topic_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DocumentTopicQuery {
    pub topic_name: String,
    #[serde(default)]
    pub folder_name: Option<String>,
}

#[debug_handler]
pub async fn create_folder(
    state: State<Catalog>,
    Json(data): Json<CreateFolder>,
) -> Result<impl IntoResponse, DocstashError> {
    let folder = state.hierarchy.create_folder(data).await?;
    Ok((StatusCode::CREATED, Json(folder)))
}

pub async fn list_folders(
    state: State<Catalog>,
) -> Result<Json<Vec<NodeSummary>>, DocstashError> {
    Ok(Json(state.hierarchy.list_folders().await?))
}

pub async fn delete_folder(
    state: State<Catalog>,
    Json(data): Json<DeleteBody>,
) -> Result<Json<serde_json::Value>, DocstashError> {
    state.hierarchy.delete_folder(data.id).await?;
    Ok(Json(serde_json::json!({})))
}

pub async fn folder_details(
    state: State<Catalog>,
    Path(id): Path<i64>,
) -> Result<Json<Folder>, DocstashError> {
    Ok(Json(state.hierarchy.get_folder(id).await?))
}

pub async fn patch_folder(
    state: State<Catalog>,
    Path(id): Path<i64>,
    Json(patch): Json<FolderPatch>,
) -> Result<Json<Folder>, DocstashError> {
    Ok(Json(state.hierarchy.patch_folder(id, patch).await?))
}

pub async fn create_document(
    state: State<Catalog>,
    Json(data): Json<CreateDocument>,
) -> Result<impl IntoResponse, DocstashError> {
    let document = state.hierarchy.create_document(data).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn list_documents(
    state: State<Catalog>,
) -> Result<Json<Vec<NodeSummary>>, DocstashError> {
    Ok(Json(state.hierarchy.list_documents().await?))
}

pub async fn delete_document(
    state: State<Catalog>,
    Json(data): Json<DeleteBody>,
) -> Result<Json<serde_json::Value>, DocstashError> {
    state.hierarchy.delete_document(data.id).await?;
    Ok(Json(serde_json::json!({})))
}

pub async fn document_details(
    state: State<Catalog>,
    Path(id): Path<i64>,
) -> Result<Json<Document>, DocstashError> {
    Ok(Json(state.hierarchy.get_document(id).await?))
}

pub async fn patch_document(
    state: State<Catalog>,
    Path(id): Path<i64>,
    Json(patch): Json<DocumentPatch>,
) -> Result<Json<Document>, DocstashError> {
    Ok(Json(state.hierarchy.patch_document(id, patch).await?))
}

pub async fn create_topic(
    state: State<Catalog>,
    Json(data): Json<CreateTopic>,
) -> Result<impl IntoResponse, DocstashError> {
    let topic = state.topics.create_topic(data).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

pub async fn list_topics(state: State<Catalog>) -> Result<Json<Vec<NodeSummary>>, DocstashError> {
    Ok(Json(state.topics.list_topics().await?))
}

pub async fn delete_topic(
    state: State<Catalog>,
    Json(data): Json<DeleteBody>,
) -> Result<Json<serde_json::Value>, DocstashError> {
    state.topics.delete_topic(data.id).await?;
    Ok(Json(serde_json::json!({})))
}

pub async fn topic_details(
    state: State<Catalog>,
    Path(id): Path<i64>,
) -> Result<Json<Topic>, DocstashError> {
    Ok(Json(state.topics.get_topic(id).await?))
}

pub async fn patch_topic(
    state: State<Catalog>,
    Path(id): Path<i64>,
    Json(patch): Json<TopicPatch>,
) -> Result<Json<Topic>, DocstashError> {
    Ok(Json(state.topics.patch_topic(id, patch).await?))
}

pub async fn create_folder_topic(
    state: State<Catalog>,
    Json(data): Json<CreateFolderTopic>,
) -> Result<(StatusCode, Json<FolderTopic>), DocstashError> {
    let link = state.topics.associate_folder(data).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn folders_by_topic(
    state: State<Catalog>,
    query: Query<FolderTopicQuery>,
) -> Result<Json<Vec<NodeSummary>>, DocstashError> {
    Ok(Json(state.topics.folders_by_topic(&query.topic_name).await?))
}

pub async fn create_document_topic(
    state: State<Catalog>,
    Json(data): Json<CreateDocumentTopic>,
) -> Result<(StatusCode, Json<DocumentTopic>), DocstashError> {
    let link = state.topics.associate_document(data).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn documents_by_topic(
    state: State<Catalog>,
    query: Query<DocumentTopicQuery>,
) -> Result<Json<Vec<NodeSummary>>, DocstashError> {
    let documents = state
        .topics
        .documents_by_topic(&query.topic_name, query.folder_name.as_deref())
        .await?;
    Ok(Json(documents))
}
