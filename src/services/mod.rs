pub mod clock;
pub mod storage;
pub mod upload_service;
