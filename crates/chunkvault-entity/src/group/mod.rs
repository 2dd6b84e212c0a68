//! Group domain entities.

pub mod model;

pub use model::{CreateGroup, Group, GroupDeletion, GroupListing, ROOT_GROUP_NAME};
