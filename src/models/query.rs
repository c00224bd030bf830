use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One conjunctive filter term. Exactly one of `exact_value` /
/// `wildcard_value` is meaningful; `name` selects the indexed field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterClause {
    pub name: String,
    #[serde(default)]
    pub exact_value: Option<String>,
    #[serde(default)]
    pub wildcard_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Asc
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortClause {
    pub path: String,
    #[serde(default)]
    pub order: SortOrder,
}

/// `page_size == 0` disables paging.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page_size: usize,
    #[serde(default)]
    pub page_index: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub with_sub_folders: bool,
    #[serde(default)]
    pub image_ratio: Option<String>,
    #[serde(default)]
    pub filters: Vec<FilterClause>,
    #[serde(default)]
    pub sorts: Vec<SortClause>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Caller-supplied request context. The tenant scope is threaded explicitly
/// rather than read from ambient state, and editability is decided by an
/// external authorization check before the pipeline runs.
#[derive(Debug, Clone, Default)]
pub struct ListContext {
    pub scope: String,
    pub editable: bool,
}

/// Thumbnail aspect ratio, parsed from `"width:height"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio {
    pub width: u32,
    pub height: u32,
}

impl Default for Ratio {
    fn default() -> Self {
        Ratio {
            width: 100,
            height: 100,
        }
    }
}

impl Ratio {
    /// Absent or empty input falls back to the 100:100 default; anything
    /// else must be well-formed.
    pub fn parse(raw: Option<&str>) -> Result<Ratio, AppError> {
        let raw = match raw {
            None => return Ok(Ratio::default()),
            Some(r) if r.trim().is_empty() => return Ok(Ratio::default()),
            Some(r) => r.trim(),
        };

        let invalid = || AppError::InvalidRequest(format!("image_ratio must be W:H, got {raw:?}"));
        let (w, h) = raw.split_once(':').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Ratio { width, height })
    }
}
