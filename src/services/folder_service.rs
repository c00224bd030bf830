//! Subfolder-browse overlay: synthesized folder rows for the current
//! folder's children, plus the breadcrumb trail back to the base folder.

use crate::backend::{FileStore, MetadataStore};
use crate::error::AppError;
use crate::models::file_meta::FolderMeta;
use crate::models::listing::{Breadcrumb, ListingItem, FOLDER_THUMBNAIL};
use crate::models::query::Ratio;
use crate::scope_path;

/// One row per immediate child folder of `current_folder`, and the
/// breadcrumb trail from `base_folder` down to it. Folder rows borrow
/// their file fields (url, thumbnail, metadata, icon) from a
/// representative child file; the folder's own display name always wins.
pub fn overlay(
    store: &dyn FileStore,
    metadata: &dyn MetadataStore,
    scope: &str,
    base_folder: &str,
    current_folder: &str,
    ratio: &Ratio,
    editable: bool,
) -> Result<(Vec<ListingItem>, Vec<Breadcrumb>), AppError> {
    let Some(folder) = store.get_folder(scope, current_folder)? else {
        tracing::warn!(folder = current_folder, "current folder not found, skipping folder overlay");
        return Ok((Vec::new(), Vec::new()));
    };

    let mut rows = Vec::new();
    for child in store.child_folders(&folder)? {
        let mut row = ListingItem {
            name: child.name.clone(),
            created_at: Some(child.created_at),
            modified_at: Some(child.modified_at),
            folder_name: child.name.clone(),
            folder_path: scope_path::normalize(&child.path),
            is_folder: true,
            ..Default::default()
        };

        let files = store.folder_files(&child, false)?;
        let representative = files
            .iter()
            .find(|f| f.name == FOLDER_THUMBNAIL)
            .or_else(|| files.iter().min_by(|a, b| a.name.cmp(&b.name)));
        if let Some(rep) = representative {
            row.file_name = rep.name.clone();
            row.url = store.file_url(rep);
            row.is_image = store.is_image(rep);
            row.image_url = store.thumbnail_url(rep, ratio);
            row.custom = metadata.custom_data(rep).unwrap_or_else(|e| {
                tracing::warn!(file = %rep.name, error = %e, "failed to load custom metadata");
                serde_json::Value::Object(serde_json::Map::new())
            });
            row.icon_url = store.icon_url(rep.extension().as_deref());
            row.is_editable = editable;
            row.edit_url = if editable {
                store.edit_url(rep)
            } else {
                String::new()
            };
        }
        rows.push(row);
    }

    let breadcrumbs = breadcrumb_trail(store, base_folder, folder)?;
    Ok((rows, breadcrumbs))
}

/// Walks parent links upward from the current folder, prepending each,
/// until a folder with no parent, an empty path, or the base folder. The
/// terminating parent is included.
fn breadcrumb_trail(
    store: &dyn FileStore,
    base_folder: &str,
    folder: FolderMeta,
) -> Result<Vec<Breadcrumb>, AppError> {
    let mut trail = vec![folder.clone()];
    let mut cursor = folder;
    while let Some(parent) = store.parent_folder(&cursor)? {
        trail.insert(0, parent.clone());
        if parent.path.is_empty() || scope_path::normalize(&parent.path) == base_folder {
            break;
        }
        cursor = parent;
    }
    Ok(trail
        .into_iter()
        .map(|f| Breadcrumb {
            name: f.name,
            path: scope_path::normalize(&f.path),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::repository::{NewFile, NewFolder, SqliteStore};
    use chrono::{TimeZone, Utc};

    fn ts(day: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap()
    }

    fn add_folder(store: &SqliteStore, name: &str, path: &str, parent: Option<i64>) -> i64 {
        store
            .insert_folder(&NewFolder {
                scope: "0",
                name,
                path,
                parent_id: parent,
                created_at: ts(1),
                modified_at: ts(1),
            })
            .unwrap()
    }

    fn add_file(store: &SqliteStore, folder_id: i64, name: &str) -> i64 {
        store
            .insert_file(&NewFile {
                folder_id,
                name,
                created_at: ts(2),
                modified_at: ts(2),
            })
            .unwrap()
    }

    #[test]
    fn test_overlay_synthesizes_child_folder_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = add_folder(&store, "a", "a", None);
        let b = add_folder(&store, "b", "a/b", Some(a));
        add_folder(&store, "c", "a/b/c", Some(b));
        add_file(&store, b, "direct.txt");

        let (rows, crumbs) =
            overlay(&store, &store, "0", "a", "a/b", &Ratio::default(), false).unwrap();

        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_folder);
        assert_eq!(rows[0].name, "c");
        assert_eq!(rows[0].folder_path, "a/b/c");
        assert!(!crumbs.is_empty());
    }

    #[test]
    fn test_representative_prefers_folder_thumbnail() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = add_folder(&store, "a", "a", None);
        let pics = add_folder(&store, "pics", "a/pics", Some(a));
        add_file(&store, pics, "aardvark.png");
        add_file(&store, pics, FOLDER_THUMBNAIL);

        let (rows, _) = overlay(&store, &store, "0", "a", "a", &Ratio::default(), false).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].file_name, FOLDER_THUMBNAIL);
        assert!(rows[0].is_image);
    }

    #[test]
    fn test_representative_falls_back_to_first_by_name() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = add_folder(&store, "a", "a", None);
        let docs = add_folder(&store, "docs", "a/docs", Some(a));
        add_file(&store, docs, "zebra.txt");
        add_file(&store, docs, "alpha.txt");

        let (rows, _) = overlay(&store, &store, "0", "a", "a", &Ratio::default(), false).unwrap();
        assert_eq!(rows[0].file_name, "alpha.txt");
    }

    #[test]
    fn test_folder_name_wins_over_metadata_title() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = add_folder(&store, "a", "a", None);
        let docs = add_folder(&store, "docs", "a/docs", Some(a));
        let fid = add_file(&store, docs, "cover.jpg");
        store
            .set_custom_data(fid, &serde_json::json!({"meta": {"title": "Shiny"}}))
            .unwrap();

        let (rows, _) = overlay(&store, &store, "0", "a", "a", &Ratio::default(), false).unwrap();
        assert_eq!(rows[0].name, "docs");
        assert_eq!(rows[0].custom["meta"]["title"], "Shiny");
    }

    #[test]
    fn test_empty_child_folder_has_no_file_fields() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = add_folder(&store, "a", "a", None);
        add_folder(&store, "empty", "a/empty", Some(a));

        let (rows, _) = overlay(&store, &store, "0", "a", "a", &Ratio::default(), true).unwrap();
        assert_eq!(rows[0].file_name, "");
        assert_eq!(rows[0].url, "");
        assert_eq!(rows[0].edit_url, "");
        assert_eq!(rows[0].custom, serde_json::json!({}));
    }

    #[test]
    fn test_breadcrumbs_from_base_to_current() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = add_folder(&store, "a", "a", None);
        let b = add_folder(&store, "b", "a/b", Some(a));
        add_folder(&store, "c", "a/b/c", Some(b));

        let (_, crumbs) =
            overlay(&store, &store, "0", "a", "a/b/c", &Ratio::default(), false).unwrap();
        let paths: Vec<&str> = crumbs.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "a/b", "a/b/c"]);
        let names: Vec<&str> = crumbs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_breadcrumbs_when_base_is_current() {
        let store = SqliteStore::open_in_memory().unwrap();
        add_folder(&store, "a", "a", None);

        let (_, crumbs) = overlay(&store, &store, "0", "a", "a", &Ratio::default(), false).unwrap();
        let paths: Vec<&str> = crumbs.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["a"]);
    }

    #[test]
    fn test_missing_current_folder_yields_empty_overlay() {
        let store = SqliteStore::open_in_memory().unwrap();
        let (rows, crumbs) =
            overlay(&store, &store, "0", "", "ghost", &Ratio::default(), false).unwrap();
        assert!(rows.is_empty());
        assert!(crumbs.is_empty());
    }
}
