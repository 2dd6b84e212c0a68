//! Newtype wrappers for all domain entity identifiers.
//!
//! Using distinct types prevents accidentally passing a `GroupId` where a
//! `FileId` is expected. When the `sqlx` feature is enabled, each ID type
//! also derives `sqlx::Type` transparently over its inner value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Macro to define a newtype ID wrapper around an `i64` row id.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw row id.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the raw row id.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a registered file.
    FileId
);

define_id!(
    /// Identifier of a group.
    GroupId
);

impl GroupId {
    /// The root group (`uncategorized`), created by the initial migration.
    pub const ROOT: GroupId = GroupId(1);

    /// Whether this is the root group.
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::ROOT
    }
}

/// Opaque identifier returned by a blob backend for a stored chunk.
///
/// The store never interprets its contents; it is only persisted and handed
/// back to the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
#[serde(transparent)]
pub struct BlobId(pub String);

impl BlobId {
    /// Wrap a backend-issued id.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for BlobId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for BlobId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}
