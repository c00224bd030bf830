use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::file_meta::FileId;

/// Files with this raw name hold a folder's thumbnail image. They are
/// infrastructure: never listed as rows, preferred as the representative
/// file when synthesizing folder rows.
pub const FOLDER_THUMBNAIL: &str = "_folder.jpg";

/// One row of a listing: either a real file or, in subfolder-browse mode,
/// a synthesized folder row. On a folder row (`is_folder == true`) the file
/// fields describe a representative child file used for thumbnailing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingItem {
    pub name: String,
    pub file_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub folder_name: String,
    pub folder_path: String,
    pub url: String,
    pub is_image: bool,
    pub image_url: String,
    pub custom: serde_json::Value,
    pub icon_url: String,
    pub is_editable: bool,
    pub edit_url: String,
    pub is_folder: bool,
}

impl Default for ListingItem {
    fn default() -> Self {
        ListingItem {
            name: String::new(),
            file_name: String::new(),
            created_at: None,
            modified_at: None,
            folder_name: String::new(),
            folder_path: String::new(),
            url: String::new(),
            is_image: false,
            image_url: String::new(),
            // custom metadata is an empty object when absent, never null
            custom: serde_json::Value::Object(serde_json::Map::new()),
            icon_url: String::new(),
            is_editable: false,
            edit_url: String::new(),
            is_folder: false,
        }
    }
}

/// What the index returned for a query: matched ids plus the total match
/// count. The total is adjusted downward during reconciliation for every
/// id whose backing file no longer exists.
#[derive(Debug, Clone, Default)]
pub struct SearchHits {
    pub ids: Vec<FileId>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPage {
    pub items: Vec<ListingItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breadcrumbs: Option<Vec<Breadcrumb>>,
    pub total: i64,
}
