//! File domain entities.

pub mod listing;
pub mod model;
pub mod part;

pub use listing::{FILE_LIST_LIMIT, FileListing, FileQuery};
pub use model::{CreateFile, File};
pub use part::{NewPart, Part};
