use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DocstashError;
use crate::hierarchy::models::validate_name;

pub const SHORT_DESC_MAX: usize = 60;

/// Database model
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Topic {
    pub id: i64,
    /// Globally unique, unlike folder and document names.
    pub name: String,
    pub short_desc: String,
    pub long_desc: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join row linking a topic to a folder.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FolderTopic {
    pub id: i64,
    pub folder: i64,
    pub topic: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join row linking a topic to a document.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DocumentTopic {
    pub id: i64,
    pub document: i64,
    pub topic: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTopic {
    pub name: String,
    pub short_desc: String,
    #[serde(default)]
    pub long_desc: Option<String>,
}

impl CreateTopic {
    pub fn validate(&self) -> Result<(), DocstashError> {
        validate_name(&self.name)?;
        validate_short_desc(&self.short_desc)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TopicPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub short_desc: Option<String>,
    #[serde(default)]
    pub long_desc: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderTopic {
    pub folder: i64,
    pub topic: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateDocumentTopic {
    pub document: i64,
    pub topic: i64,
}

pub fn validate_short_desc(short_desc: &str) -> Result<(), DocstashError> {
    if short_desc.is_empty() {
        return Err(DocstashError::Validation(
            "short_desc may not be blank".to_string(),
        ));
    }
    if short_desc.chars().count() > SHORT_DESC_MAX {
        return Err(DocstashError::Validation(format!(
            "short_desc may have at most {SHORT_DESC_MAX} characters"
        )));
    }
    Ok(())
}
