use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scope_path;

/// Identifier shared between the search index and the file store.
pub type FileId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMeta {
    pub id: FileId,
    pub name: String,
    pub folder_name: String,
    pub folder_path: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl FileMeta {
    pub fn extension(&self) -> Option<String> {
        scope_path::extension(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderMeta {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}
