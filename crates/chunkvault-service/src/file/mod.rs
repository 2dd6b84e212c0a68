//! File services: upload, download, delete, search.

pub mod delete;
pub mod download;
pub mod search;
pub mod upload;

pub use delete::DeleteService;
pub use download::{DownloadOutcome, DownloadService};
pub use search::SearchService;
pub use upload::UploadService;
