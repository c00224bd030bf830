//! Collaborator interfaces the listing pipeline is built against. The
//! index, file store and metadata store are external systems; the pipeline
//! only ever talks to them through these traits.

pub mod memory;

use crate::error::AppError;
use crate::models::file_meta::{FileId, FileMeta, FolderMeta};
use crate::models::listing::SearchHits;
use crate::models::query::Ratio;

/// Full-text/faceted index over file metadata. `search` takes a query in
/// the native syntax produced by the translator (see `services::query_service`).
pub trait SearchIndex {
    fn search(&self, query: &str) -> Result<SearchHits, AppError>;

    /// Every indexed document, used when the translated query is empty.
    fn list_all(&self) -> Result<SearchHits, AppError>;

    /// Removes a stale entry. Deleting an id that is already gone is not
    /// an error.
    fn delete(&self, id: FileId) -> Result<(), AppError>;
}

/// File/folder repository: metadata resolution, hierarchy traversal and
/// URL computation.
pub trait FileStore {
    fn get_file(&self, id: FileId) -> Result<Option<FileMeta>, AppError>;

    fn get_folder(&self, scope: &str, path: &str) -> Result<Option<FolderMeta>, AppError>;

    fn parent_folder(&self, folder: &FolderMeta) -> Result<Option<FolderMeta>, AppError>;

    fn child_folders(&self, folder: &FolderMeta) -> Result<Vec<FolderMeta>, AppError>;

    fn folder_files(&self, folder: &FolderMeta, recursive: bool)
        -> Result<Vec<FileMeta>, AppError>;

    fn file_url(&self, file: &FileMeta) -> String;

    fn is_image(&self, file: &FileMeta) -> bool;

    fn thumbnail_url(&self, file: &FileMeta, ratio: &Ratio) -> String;

    /// Icon for the given extension, falling back to a generic file icon
    /// when no extension-specific one exists.
    fn icon_url(&self, extension: Option<&str>) -> String;

    fn edit_url(&self, file: &FileMeta) -> String;
}

/// Per-file custom metadata, an opaque JSON document. Implementations
/// return an empty object when a file has no metadata record.
pub trait MetadataStore {
    fn custom_data(&self, file: &FileMeta) -> Result<serde_json::Value, AppError>;
}
