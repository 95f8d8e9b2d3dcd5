//! Error types for layout operations and snapshot loading.

use std::fmt;

use msplit_core::geometry::Size;

use crate::item::{GuestKey, ItemId};
use crate::sanity::SanityError;
use crate::separator::SeparatorRef;

/// Failure of a layout operation. The tree is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    ZeroItemId,
    ItemIdOverflow {
        current: ItemId,
    },
    MissingItem {
        item: ItemId,
    },
    DuplicateGuest {
        guest: GuestKey,
    },
    UnknownGuest {
        guest: GuestKey,
    },
    RelativeToPlaceholder {
        item: ItemId,
    },
    InvalidMinSize {
        min_size: Size,
    },
    EmptyTree,
    CannotRemoveRoot,
    NotALeaf {
        item: ItemId,
    },
    InvalidSize {
        size: Size,
    },
    ResizeBelowMinimum {
        requested: Size,
        minimum: Size,
    },
    UnknownSeparator {
        separator: SeparatorRef,
    },
    Invariant(SanityError),
    Snapshot(SnapshotError),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroItemId => write!(f, "item id 0 is invalid"),
            Self::ItemIdOverflow { current } => {
                write!(f, "item id overflow after {}", current.get())
            }
            Self::MissingItem { item } => write!(f, "item {} not found", item.get()),
            Self::DuplicateGuest { guest } => {
                write!(f, "guest '{guest}' is already hosted by this layout")
            }
            Self::UnknownGuest { guest } => write!(f, "guest '{guest}' is not in this layout"),
            Self::RelativeToPlaceholder { item } => {
                write!(f, "cannot insert relative to placeholder item {}", item.get())
            }
            Self::InvalidMinSize { min_size } => write!(
                f,
                "invalid minimum size {}x{}",
                min_size.width, min_size.height
            ),
            Self::EmptyTree => write!(f, "cannot insert a layout without items"),
            Self::CannotRemoveRoot => write!(f, "the root container cannot be removed"),
            Self::NotALeaf { item } => write!(f, "item {} is a container", item.get()),
            Self::InvalidSize { size } => {
                write!(f, "invalid layout size {}x{}", size.width, size.height)
            }
            Self::ResizeBelowMinimum { requested, minimum } => write!(
                f,
                "cannot resize to {}x{}: minimum is {}x{}",
                requested.width, requested.height, minimum.width, minimum.height
            ),
            Self::UnknownSeparator { separator } => write!(
                f,
                "container {} has no separator {}",
                separator.container.get(),
                separator.index
            ),
            Self::Invariant(err) => write!(f, "layout invariant violated: {err}"),
            Self::Snapshot(err) => write!(f, "invalid layout snapshot: {err}"),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Invariant(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SanityError> for LayoutError {
    fn from(err: SanityError) -> Self {
        Self::Invariant(err)
    }
}

impl From<SnapshotError> for LayoutError {
    fn from(err: SnapshotError) -> Self {
        Self::Snapshot(err)
    }
}

/// Structural problems found while loading a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotError {
    UnsupportedSchemaVersion { version: u16 },
    InvalidSeparatorThickness { thickness: i32 },
    RootNotContainer,
    LeafWithChildren { path: String },
    ContainerWithGuest { path: String },
    MissingOrientation { path: String },
    InvalidPercentage { path: String, value: f64 },
    NegativeSize { path: String },
    DuplicateGuest { guest: GuestKey },
    Decode { message: String },
    Sanity(SanityError),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedSchemaVersion { version } => write!(
                f,
                "unsupported schema version {version} (expected {})",
                crate::snapshot::LAYOUT_SNAPSHOT_SCHEMA_VERSION
            ),
            Self::InvalidSeparatorThickness { thickness } => {
                write!(f, "separator thickness {thickness} is negative")
            }
            Self::RootNotContainer => write!(f, "root record must be a container"),
            Self::LeafWithChildren { path } => write!(f, "leaf at {path} has children"),
            Self::ContainerWithGuest { path } => write!(f, "container at {path} has a guest"),
            Self::MissingOrientation { path } => {
                write!(f, "container at {path} has no orientation")
            }
            Self::InvalidPercentage { path, value } => {
                write!(f, "item at {path} has percentage {value} outside [0, 1]")
            }
            Self::NegativeSize { path } => write!(f, "item at {path} has a negative size"),
            Self::DuplicateGuest { guest } => write!(f, "guest '{guest}' appears twice"),
            Self::Decode { message } => write!(f, "decode failed: {message}"),
            Self::Sanity(err) => write!(f, "loaded tree fails sanity check: {err}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sanity(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }
}
