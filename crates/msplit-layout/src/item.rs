//! Arena node model: identifiers, leaf/container variants, sizing records
//! and the guest capability contract.

use std::collections::BTreeMap;
use std::fmt;

use msplit_core::geometry::{Orientation, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::separator::Separator;

/// Stable identifier for arena nodes.
///
/// `0` is reserved/invalid so IDs are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Lowest valid item ID.
    pub const MIN: Self = Self(1);

    /// Create a new item ID, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, LayoutError> {
        if raw == 0 {
            return Err(LayoutError::ZeroItemId);
        }
        Ok(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn checked_next(self) -> Result<Self, LayoutError> {
        let Some(next) = self.0.checked_add(1) else {
            return Err(LayoutError::ItemIdOverflow { current: self });
        };
        Self::new(next)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque identity of the content hosted by a leaf.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestKey(String);

impl GuestKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GuestKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Side of the target at which new content is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Left,
    Top,
    Right,
    Bottom,
}

impl Location {
    /// Orientation a container needs to hold content at this location.
    #[must_use]
    pub const fn orientation(self) -> Orientation {
        match self {
            Self::Left | Self::Right => Orientation::Horizontal,
            Self::Top | Self::Bottom => Orientation::Vertical,
        }
    }

    /// Left and Top insert before the target, Right and Bottom after it.
    #[must_use]
    pub const fn is_side1(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }
}

/// Per-node geometry record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingInfo {
    /// Absolute geometry. For placeholders this is the last laid-out rect.
    pub geometry: Rect,
    /// Minimum size reported by the guest. Unused for containers, whose
    /// minimum is derived from their children.
    pub min_size: Size,
    /// Fraction of the parent's usable main-axis length. Hidden nodes keep
    /// their last value so a restore can reclaim the same share.
    pub percentage_within_parent: f64,
}

impl SizingInfo {
    pub(crate) fn new(geometry: Rect, min_size: Size) -> Self {
        Self {
            geometry,
            min_size,
            percentage_within_parent: 0.0,
        }
    }

    /// Length of the geometry along `orientation`.
    #[must_use]
    pub const fn length(&self, orientation: Orientation) -> i32 {
        self.geometry.length(orientation)
    }
}

/// Leaf payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafItem {
    pub guest: Option<GuestKey>,
    /// `false` turns the leaf into a placeholder.
    pub visible: bool,
}

/// Container payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerItem {
    pub orientation: Orientation,
    pub children: Vec<ItemId>,
    /// One per adjacent pair of visible children, rebuilt after each mutation.
    pub separators: Vec<Separator>,
}

impl ContainerItem {
    pub(crate) fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            children: Vec::new(),
            separators: Vec::new(),
        }
    }

    /// Whether content at `location` can go directly into this container
    /// without a nested split.
    #[must_use]
    pub fn accepts(&self, location: Location) -> bool {
        self.children.len() <= 1 || self.orientation == location.orientation()
    }
}

/// Node payload variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Leaf(LeafItem),
    Container(ContainerItem),
}

/// One arena node.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemNode {
    pub id: ItemId,
    pub parent: Option<ItemId>,
    pub sizing: SizingInfo,
    pub kind: ItemKind,
    /// Unknown snapshot fields carried through untouched.
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl ItemNode {
    pub(crate) fn leaf(id: ItemId, guest: Option<GuestKey>, min_size: Size) -> Self {
        Self {
            id,
            parent: None,
            sizing: SizingInfo::new(Rect::default(), min_size),
            kind: ItemKind::Leaf(LeafItem {
                guest,
                visible: true,
            }),
            extensions: BTreeMap::new(),
        }
    }

    pub(crate) fn container(id: ItemId, orientation: Orientation, geometry: Rect) -> Self {
        Self {
            id,
            parent: None,
            sizing: SizingInfo::new(geometry, Size::ZERO),
            kind: ItemKind::Container(ContainerItem::new(orientation)),
            extensions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self.kind, ItemKind::Container(_))
    }

    #[must_use]
    pub fn as_container(&self) -> Option<&ContainerItem> {
        match &self.kind {
            ItemKind::Container(container) => Some(container),
            ItemKind::Leaf(_) => None,
        }
    }

    pub(crate) fn as_container_mut(&mut self) -> Option<&mut ContainerItem> {
        match &mut self.kind {
            ItemKind::Container(container) => Some(container),
            ItemKind::Leaf(_) => None,
        }
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&LeafItem> {
        match &self.kind {
            ItemKind::Leaf(leaf) => Some(leaf),
            ItemKind::Container(_) => None,
        }
    }

    #[must_use]
    pub fn guest(&self) -> Option<&GuestKey> {
        self.as_leaf().and_then(|leaf| leaf.guest.as_ref())
    }

    #[must_use]
    pub fn children(&self) -> &[ItemId] {
        match &self.kind {
            ItemKind::Container(container) => &container.children,
            ItemKind::Leaf(_) => &[],
        }
    }
}

/// Content description for a new leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestItem {
    pub key: GuestKey,
    pub min_size: Size,
}

impl GuestItem {
    pub fn new(key: impl Into<GuestKey>, min_size: Size) -> Self {
        Self {
            key: key.into(),
            min_size,
        }
    }
}

impl From<String> for GuestKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Options for the insertion API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertOptions {
    /// Insert as a placeholder that reserves a slot without taking space.
    pub start_hidden: bool,
}

impl InsertOptions {
    #[must_use]
    pub const fn hidden() -> Self {
        Self { start_hidden: true }
    }
}

/// Capabilities the engine expects from hosted content.
pub trait Guest {
    fn key(&self) -> GuestKey;
    fn minimum_size(&self) -> Size;
    fn set_visible(&mut self, visible: bool);
    fn set_geometry(&mut self, geometry: Rect);
}

/// Lookup from guest keys to live guests, used when dispatching events.
pub trait GuestRegistry {
    fn guest_mut(&mut self, key: &GuestKey) -> Option<&mut dyn Guest>;
}

impl<G: Guest> GuestRegistry for BTreeMap<GuestKey, G> {
    fn guest_mut(&mut self, key: &GuestKey) -> Option<&mut dyn Guest> {
        self.get_mut(key).map(|guest| guest as &mut dyn Guest)
    }
}
