pub mod edit_service;
pub mod executor;
pub mod filters;
pub mod image_store;
pub mod operations;
pub mod storage;
