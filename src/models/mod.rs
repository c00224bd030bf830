pub mod file_meta;
pub mod listing;
pub mod query;
