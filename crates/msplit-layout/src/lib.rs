#![forbid(unsafe_code)]

//! Recursive multi-splitter layout engine.
//!
//! An [`ItemTree`] arranges guest widgets in nested horizontal and vertical
//! splits:
//!
//! - [`ItemTree::insert_item`] places a new leaf at an edge of the layout or
//!   next to an existing item, splitting orthogonally when needed
//! - [`ItemTree::remove_item`] and placeholders ([`ItemTree::turn_into_placeholder`])
//!   give space back to siblings, the latter remembering the slot
//! - [`ItemTree::resize`] propagates root size changes proportionally while
//!   honouring every minimum size
//! - [`SeparatorDrag`] drives interactive separator drags
//! - [`snapshot`] serializes layouts through `serde_json::Value`
//!
//! Every mutation runs on a working copy and commits only on success, so an
//! `Err` always leaves the tree as it was. Changes are reported as queued
//! [`LayoutEvent`]s.
//!
//! ```ignore
//! use msplit_layout::{GuestItem, InsertOptions, ItemTree, Location, Size};
//!
//! let mut tree = ItemTree::new(Size::new(1000, 800));
//! let editor = tree.insert_item(
//!     GuestItem::new("editor", Size::new(200, 100)),
//!     Location::Left,
//!     None,
//!     InsertOptions::default(),
//! )?;
//! tree.insert_item(
//!     GuestItem::new("console", Size::new(100, 80)),
//!     Location::Bottom,
//!     Some(editor),
//!     InsertOptions::default(),
//! )?;
//! for event in tree.drain_events() {
//!     println!("{event:?}");
//! }
//! ```

pub mod config;
mod drop_rect;
pub mod error;
pub mod events;
mod insert;
pub mod item;
mod query;
mod reflow;
mod remove;
pub mod sanity;
pub mod separator;
pub mod snapshot;
mod tree;

pub use config::{LayoutConfig, SeparatorMode};
pub use error::{LayoutError, SnapshotError};
pub use events::LayoutEvent;
pub use item::{
    ContainerItem, Guest, GuestItem, GuestKey, GuestRegistry, InsertOptions, ItemId, ItemKind,
    ItemNode, LeafItem, Location, SizingInfo,
};
pub use msplit_core::geometry::{Orientation, Point, Rect, Size};
pub use query::Side;
pub use sanity::{SanityCode, SanityError};
pub use separator::{
    Separator, SeparatorCancelReason, SeparatorDrag, SeparatorDragEffect, SeparatorDragNoopReason,
    SeparatorDragState, SeparatorDragTransition, SeparatorRef,
};
pub use snapshot::{ItemSnapshot, ItemSnapshotKind, LayoutSnapshot, LAYOUT_SNAPSHOT_SCHEMA_VERSION};
pub use tree::ItemTree;
