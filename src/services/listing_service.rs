//! The listing pipeline: translate, fetch, reconcile, overlay, sort,
//! paginate, assemble. Steps run strictly in that order; only the stale-id
//! cleanup mutates anything outside the response.

use serde_json::Value;

use crate::backend::{FileStore, MetadataStore, SearchIndex};
use crate::error::AppError;
use crate::models::file_meta::{FileId, FileMeta};
use crate::models::listing::{ListingItem, ListingPage, SearchHits, FOLDER_THUMBNAIL};
use crate::models::query::{ListContext, ListRequest, Pagination, Ratio, SortClause, SortOrder};
use crate::scope_path;
use crate::services::{folder_service, query_service};

/// Answers one faceted listing request against the given collaborators.
pub fn list(
    index: &dyn SearchIndex,
    store: &dyn FileStore,
    metadata: &dyn MetadataStore,
    req: &ListRequest,
    ctx: &ListContext,
) -> Result<ListingPage, AppError> {
    let ratio = Ratio::parse(req.image_ratio.as_deref())?;
    let translated = query_service::translate(&req.filters, &req.folder, &ctx.scope);

    let hits = if translated.query.is_empty() {
        let hits = index.list_all()?;
        tracing::debug!(total = hits.total, "no filter applies, listing full index");
        hits
    } else {
        let hits = index.search(&translated.query)?;
        tracing::debug!(query = %translated.query, total = hits.total, "index search");
        hits
    };

    let (mut items, total) = reconcile(index, store, metadata, hits, &ratio, ctx.editable)?;

    let mut breadcrumbs = None;
    if req.with_sub_folders {
        let base_folder = scope_path::normalize(&req.folder);
        let (folder_rows, crumbs) = folder_service::overlay(
            store,
            metadata,
            &ctx.scope,
            &base_folder,
            &translated.current_folder,
            &ratio,
            ctx.editable,
        )?;
        items.extend(folder_rows);
        breadcrumbs = Some(crumbs);
    }

    sort_items(&mut items, &req.sorts);
    let items = paginate(items, &req.pagination);

    Ok(ListingPage {
        items,
        breadcrumbs,
        total,
    })
}

/// Resolves every matched id against the store. Ids whose file vanished
/// are collected during the read pass and deleted from the index after it,
/// once per distinct id; the total is decremented for each stale hit.
fn reconcile(
    index: &dyn SearchIndex,
    store: &dyn FileStore,
    metadata: &dyn MetadataStore,
    hits: SearchHits,
    ratio: &Ratio,
    editable: bool,
) -> Result<(Vec<ListingItem>, i64), AppError> {
    let mut items = Vec::new();
    let mut stale: Vec<FileId> = Vec::new();
    let mut total = hits.total;

    for id in hits.ids {
        match store.get_file(id)? {
            None => {
                if !stale.contains(&id) {
                    stale.push(id);
                }
                total -= 1;
            }
            // folder thumbnails are infrastructure, never a listing row
            Some(file) if file.name == FOLDER_THUMBNAIL => continue,
            Some(file) => items.push(file_item(store, metadata, &file, ratio, editable)),
        }
    }

    if !stale.is_empty() {
        tracing::debug!(count = stale.len(), "purging stale index entries");
        for id in &stale {
            index.delete(*id)?;
        }
    }

    Ok((items, total))
}

fn file_item(
    store: &dyn FileStore,
    metadata: &dyn MetadataStore,
    file: &FileMeta,
    ratio: &Ratio,
    editable: bool,
) -> ListingItem {
    // one unreadable metadata record must not fail the whole listing
    let custom = metadata.custom_data(file).unwrap_or_else(|e| {
        tracing::warn!(file = %file.name, error = %e, "failed to load custom metadata");
        Value::Object(serde_json::Map::new())
    });
    let name = meta_title(&custom).unwrap_or_else(|| file.name.clone());
    let extension = file.extension();
    ListingItem {
        name,
        file_name: file.name.clone(),
        created_at: Some(file.created_at),
        modified_at: Some(file.modified_at),
        folder_name: file.folder_name.clone(),
        folder_path: file.folder_path.clone(),
        url: store.file_url(file),
        is_image: store.is_image(file),
        image_url: store.thumbnail_url(file, ratio),
        custom,
        icon_url: store.icon_url(extension.as_deref()),
        is_editable: editable,
        edit_url: if editable {
            store.edit_url(file)
        } else {
            String::new()
        },
        is_folder: false,
    }
}

/// `meta.title` from the custom metadata, if it is a usable string. Shape
/// mismatches collapse to `None` so the raw file name takes over; they are
/// logged, never surfaced.
fn meta_title(custom: &Value) -> Option<String> {
    let meta = custom.get("meta")?;
    match meta.get("title") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(other) => {
            tracing::debug!(title = %other, "custom metadata title is not a usable string");
            None
        }
        None => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKey {
    Modified,
    Name,
    FileName,
    Description,
}

fn parse_sort_key(path: &str) -> Option<SortKey> {
    match path.to_ascii_lowercase().as_str() {
        "lastmodifiedondate" => Some(SortKey::Modified),
        "name" => Some(SortKey::Name),
        "filename" => Some(SortKey::FileName),
        "description" => Some(SortKey::Description),
        _ => None,
    }
}

fn description(item: &ListingItem) -> &str {
    item.custom
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

/// Only the last recognized sort clause determines the order (last-wins,
/// not a composite multi-key sort); unrecognized paths are ignored.
fn sort_items(items: &mut [ListingItem], sorts: &[SortClause]) {
    let Some((key, order)) = sorts
        .iter()
        .rev()
        .find_map(|s| parse_sort_key(&s.path).map(|k| (k, s.order)))
    else {
        return;
    };

    let cmp = |a: &ListingItem, b: &ListingItem| match key {
        SortKey::Modified => a.modified_at.cmp(&b.modified_at),
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::FileName => a.file_name.cmp(&b.file_name),
        SortKey::Description => description(a).cmp(description(b)),
    };
    match order {
        SortOrder::Asc => items.sort_by(cmp),
        SortOrder::Desc => items.sort_by(|a, b| cmp(b, a)),
    }
}

fn paginate(items: Vec<ListingItem>, pagination: &Pagination) -> Vec<ListingItem> {
    if pagination.page_size == 0 {
        return items;
    }
    items
        .into_iter()
        .skip(pagination.page_index * pagination.page_size)
        .take(pagination.page_size)
        .collect()
}
