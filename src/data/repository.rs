use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::backend::{FileStore, MetadataStore};
use crate::error::AppError;
use crate::models::file_meta::{FileId, FileMeta, FolderMeta};
use crate::models::query::Ratio;
use crate::scope_path;

/// Extensions the URL scheme has dedicated icons for; everything else gets
/// the generic file icon.
const ICON_EXTENSIONS: &[&str] = &[
    "avi", "bmp", "css", "csv", "doc", "docx", "gif", "html", "jpeg", "jpg", "js", "json", "md",
    "mov", "mp3", "mp4", "pdf", "png", "ppt", "pptx", "svg", "txt", "wav", "webp", "xls", "xlsx",
    "xml", "zip",
];

#[derive(Debug, Clone)]
pub struct NewFolder<'a> {
    pub scope: &'a str,
    pub name: &'a str,
    pub path: &'a str,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFile<'a> {
    pub folder_id: i64,
    pub name: &'a str,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// SQLite-backed file repository and custom-metadata store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        SqliteStore { conn }
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        super::migrations::run_migrations(&conn)?;
        Ok(SqliteStore { conn })
    }

    pub fn open(path: &std::path::Path) -> Result<Self, AppError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        super::migrations::run_migrations(&conn)?;
        Ok(SqliteStore { conn })
    }

    pub fn insert_folder(&self, folder: &NewFolder) -> Result<i64, AppError> {
        self.conn.execute(
            "INSERT INTO folders (scope, name, path, parent_id, created_at, modified_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                folder.scope,
                folder.name,
                scope_path::normalize(folder.path),
                folder.parent_id,
                folder.created_at,
                folder.modified_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_file(&self, file: &NewFile) -> Result<FileId, AppError> {
        self.conn.execute(
            "INSERT INTO files (folder_id, name, created_at, modified_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![file.folder_id, file.name, file.created_at, file.modified_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn delete_file(&self, id: FileId) -> Result<usize, AppError> {
        self.conn
            .execute("DELETE FROM custom_metadata WHERE file_id = ?1", params![id])?;
        let count = self
            .conn
            .execute("DELETE FROM files WHERE id = ?1", params![id])?;
        Ok(count)
    }

    pub fn set_custom_data(&self, id: FileId, data: &serde_json::Value) -> Result<(), AppError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO custom_metadata (file_id, data) VALUES (?1, ?2)",
            params![id, serde_json::to_string(data)?],
        )?;
        Ok(())
    }

    fn get_folder_by_id(&self, id: i64) -> Result<Option<FolderMeta>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, path, parent_id, created_at, modified_at
             FROM folders WHERE id = ?1",
        )?;
        let folder = stmt.query_row(params![id], folder_from_row).optional()?;
        Ok(folder)
    }
}

fn folder_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FolderMeta> {
    Ok(FolderMeta {
        id: row.get(0)?,
        name: row.get(1)?,
        path: row.get(2)?,
        parent_id: row.get(3)?,
        created_at: row.get(4)?,
        modified_at: row.get(5)?,
    })
}

fn file_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileMeta> {
    Ok(FileMeta {
        id: row.get(0)?,
        name: row.get(1)?,
        folder_name: row.get(2)?,
        folder_path: row.get(3)?,
        created_at: row.get(4)?,
        modified_at: row.get(5)?,
    })
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

impl FileStore for SqliteStore {
    fn get_file(&self, id: FileId) -> Result<Option<FileMeta>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT f.id, f.name, fo.name, fo.path, f.created_at, f.modified_at
             FROM files f JOIN folders fo ON fo.id = f.folder_id
             WHERE f.id = ?1",
        )?;
        let file = stmt.query_row(params![id], file_from_row).optional()?;
        Ok(file)
    }

    fn get_folder(&self, scope: &str, path: &str) -> Result<Option<FolderMeta>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, path, parent_id, created_at, modified_at
             FROM folders WHERE scope = ?1 AND path = ?2",
        )?;
        let folder = stmt
            .query_row(params![scope, scope_path::normalize(path)], folder_from_row)
            .optional()?;
        Ok(folder)
    }

    fn parent_folder(&self, folder: &FolderMeta) -> Result<Option<FolderMeta>, AppError> {
        match folder.parent_id {
            Some(parent_id) => self.get_folder_by_id(parent_id),
            None => Ok(None),
        }
    }

    fn child_folders(&self, folder: &FolderMeta) -> Result<Vec<FolderMeta>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, path, parent_id, created_at, modified_at
             FROM folders WHERE parent_id = ?1 ORDER BY name ASC",
        )?;
        let folders = stmt
            .query_map(params![folder.id], folder_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(folders)
    }

    fn folder_files(
        &self,
        folder: &FolderMeta,
        recursive: bool,
    ) -> Result<Vec<FileMeta>, AppError> {
        let mut stmt;
        let rows = if recursive {
            stmt = self.conn.prepare(
                "SELECT f.id, f.name, fo.name, fo.path, f.created_at, f.modified_at
                 FROM files f JOIN folders fo ON fo.id = f.folder_id
                 WHERE fo.scope = (SELECT scope FROM folders WHERE id = ?1)
                   AND (fo.path = ?2 OR fo.path LIKE ?2 || '/%')
                 ORDER BY f.name ASC",
            )?;
            stmt.query_map(params![folder.id, folder.path], file_from_row)?
        } else {
            stmt = self.conn.prepare(
                "SELECT f.id, f.name, fo.name, fo.path, f.created_at, f.modified_at
                 FROM files f JOIN folders fo ON fo.id = f.folder_id
                 WHERE f.folder_id = ?1
                 ORDER BY f.name ASC",
            )?;
            stmt.query_map(params![folder.id], file_from_row)?
        };
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    fn file_url(&self, file: &FileMeta) -> String {
        if file.folder_path.is_empty() {
            format!("/files/{}", encode_path(&file.name))
        } else {
            format!(
                "/files/{}/{}",
                encode_path(&file.folder_path),
                encode_path(&file.name)
            )
        }
    }

    fn is_image(&self, file: &FileMeta) -> bool {
        mime_guess::from_path(&file.name)
            .first()
            .map(|mime| mime.type_() == mime_guess::mime::IMAGE)
            .unwrap_or(false)
    }

    fn thumbnail_url(&self, file: &FileMeta, ratio: &Ratio) -> String {
        format!(
            "{}?width={}&height={}",
            self.file_url(file),
            ratio.width,
            ratio.height
        )
    }

    fn icon_url(&self, extension: Option<&str>) -> String {
        match extension {
            Some(ext) if ICON_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => {
                format!("/icons/32/ext-{}.png", ext.to_ascii_lowercase())
            }
            _ => "/icons/32/file.png".to_string(),
        }
    }

    fn edit_url(&self, file: &FileMeta) -> String {
        format!("/files/{}/edit", file.id)
    }
}

impl MetadataStore for SqliteStore {
    fn custom_data(&self, file: &FileMeta) -> Result<serde_json::Value, AppError> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM custom_metadata WHERE file_id = ?1")?;
        let raw: Option<String> = stmt.query_row(params![file.id], |row| row.get(0)).optional()?;
        match raw {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(serde_json::json!({})),
        }
    }
}

// Needed for rusqlite optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
