pub mod download_service;
pub mod mime;
pub mod record_service;
pub mod storage_service;
