use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DocstashError;

pub const NAME_MAX: usize = 30;

/// Database model
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Folder {
    pub id: i64,
    pub name: String,
    /// Owning folder, if any. Root folders have no parent.
    pub parent: Option<i64>,
    /// Derived flag, maintained on child creation and deletion.
    pub has_children: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Document {
    pub id: i64,
    pub name: String,
    pub parent: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The (id, name) projection used by listings and topic lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct NodeSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolder {
    pub name: String,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub has_children: Option<bool>,
}

impl CreateFolder {
    pub fn validate(&self) -> Result<(), DocstashError> {
        validate_name(&self.name)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDocument {
    pub name: String,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub content: Option<String>,
}

impl CreateDocument {
    pub fn validate(&self) -> Result<(), DocstashError> {
        validate_name(&self.name)
    }
}

/// Partial update. `parent` distinguishes an absent field from an explicit
/// `null`: the former leaves the parent alone, the latter detaches the node.
#[derive(Debug, Default, Deserialize)]
pub struct FolderPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent: Option<Option<i64>>,
    #[serde(default)]
    pub has_children: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent: Option<Option<i64>>,
    #[serde(default)]
    pub content: Option<String>,
}

pub fn validate_name(name: &str) -> Result<(), DocstashError> {
    if name.is_empty() {
        return Err(DocstashError::Validation("name may not be blank".to_string()));
    }
    if name.chars().count() > NAME_MAX {
        return Err(DocstashError::Validation(format!(
            "name may have at most {NAME_MAX} characters"
        )));
    }
    Ok(())
}

pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(de).map(Some)
}
