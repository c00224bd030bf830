pub mod folder_service;
pub mod listing_service;
pub mod query_service;
