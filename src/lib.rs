//! Faceted file-listing engine: translates filter/sort/paging requests
//! into index queries, reconciles the hits against the live file store
//! (purging stale index entries), optionally overlays a breadcrumb-aware
//! folder browse, and returns a stable paginated view.
//!
//! The search index, file store and metadata store are external
//! collaborators behind the traits in [`backend`]; [`data::SqliteStore`]
//! is a SQLite-backed store and [`backend::memory::MemoryIndex`] an
//! in-memory index.

pub mod backend;
pub mod data;
mod error;
pub mod models;
pub(crate) mod scope_path;
pub mod services;

pub use error::AppError;
pub use models::listing::{Breadcrumb, ListingItem, ListingPage, SearchHits};
pub use models::query::{
    FilterClause, ListContext, ListRequest, Pagination, Ratio, SortClause, SortOrder,
};
pub use services::listing_service::list;
