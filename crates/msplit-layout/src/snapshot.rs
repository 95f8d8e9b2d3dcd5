//! Serialized layout form.
//!
//! A snapshot is a nested tree of [`ItemSnapshot`] records. It round-trips
//! through `serde_json::Value`, the neutral key-value tree hosts persist.
//! Fields this version does not know are captured in `extensions` on load
//! and written back on save.

use std::collections::{BTreeMap, BTreeSet};

use msplit_core::debug;
use msplit_core::geometry::{Orientation, Rect, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::LayoutConfig;
use crate::error::{LayoutError, SnapshotError};
use crate::item::{ContainerItem, GuestKey, ItemId, ItemKind, ItemNode, LeafItem, SizingInfo};
use crate::tree::ItemTree;

/// Current snapshot schema version.
pub const LAYOUT_SNAPSHOT_SCHEMA_VERSION: u16 = 1;

fn default_schema_version() -> u16 {
    LAYOUT_SNAPSHOT_SCHEMA_VERSION
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSnapshotKind {
    Leaf,
    Container,
}

/// One item and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub kind: ItemSnapshotKind,
    pub geometry: Rect,
    #[serde(default)]
    pub min_size: Size,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest: Option<GuestKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ItemSnapshot>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// Whole-layout snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    pub separator_thickness: i32,
    pub root: ItemSnapshot,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl ItemTree {
    /// Export the layout.
    #[must_use]
    pub fn to_snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            schema_version: LAYOUT_SNAPSHOT_SCHEMA_VERSION,
            separator_thickness: self.thickness(),
            root: self.item_snapshot(self.root),
            extensions: self.extensions.clone(),
        }
    }

    fn item_snapshot(&self, id: ItemId) -> ItemSnapshot {
        let Some(node) = self.nodes.get(&id) else {
            return ItemSnapshot {
                kind: ItemSnapshotKind::Leaf,
                geometry: Rect::default(),
                min_size: Size::ZERO,
                orientation: None,
                visible: false,
                percentage: 0.0,
                guest: None,
                children: Vec::new(),
                extensions: BTreeMap::new(),
            };
        };
        let (kind, orientation, guest, children) = match &node.kind {
            ItemKind::Leaf(leaf) => (ItemSnapshotKind::Leaf, None, leaf.guest.clone(), Vec::new()),
            ItemKind::Container(container) => (
                ItemSnapshotKind::Container,
                Some(container.orientation),
                None,
                container
                    .children
                    .iter()
                    .map(|child| self.item_snapshot(*child))
                    .collect(),
            ),
        };
        ItemSnapshot {
            kind,
            geometry: node.sizing.geometry,
            min_size: node.sizing.min_size,
            orientation,
            visible: self.is_visible(id),
            percentage: node.sizing.percentage_within_parent,
            guest,
            children,
            extensions: node.extensions.clone(),
        }
    }

    /// Rebuild a layout from a snapshot with the default configuration
    /// (the snapshot's separator thickness always wins).
    pub fn from_snapshot(snapshot: LayoutSnapshot) -> Result<Self, LayoutError> {
        Self::from_snapshot_with_config(snapshot, LayoutConfig::default())
    }

    /// Rebuild a layout from a snapshot.
    ///
    /// The snapshot is validated record by record, then the rebuilt tree
    /// must pass [`ItemTree::check_sanity`]. Nothing is returned on failure.
    pub fn from_snapshot_with_config(
        snapshot: LayoutSnapshot,
        config: LayoutConfig,
    ) -> Result<Self, LayoutError> {
        if snapshot.schema_version != LAYOUT_SNAPSHOT_SCHEMA_VERSION {
            return Err(SnapshotError::UnsupportedSchemaVersion {
                version: snapshot.schema_version,
            }
            .into());
        }
        if snapshot.separator_thickness < 0 {
            return Err(SnapshotError::InvalidSeparatorThickness {
                thickness: snapshot.separator_thickness,
            }
            .into());
        }
        if snapshot.root.kind != ItemSnapshotKind::Container {
            return Err(SnapshotError::RootNotContainer.into());
        }

        let mut builder = Builder {
            next: ItemId::MIN,
            nodes: BTreeMap::new(),
            guests: BTreeSet::new(),
        };
        let root = builder.next;
        builder.add(snapshot.root, None, "root")?;
        if let Some(node) = builder.nodes.get_mut(&root) {
            node.sizing.percentage_within_parent = 1.0;
        }

        let config = LayoutConfig {
            separator_thickness: snapshot.separator_thickness,
            ..config
        };
        let mut tree = Self::from_parts(config, root, builder.nodes, snapshot.extensions);
        tree.rebuild_separators();
        tree.check_sanity().map_err(SnapshotError::Sanity)?;
        debug!(items = tree.count(), visible = tree.visible_count(), "layout restored from snapshot");
        Ok(tree)
    }

    /// Export as a neutral key-value tree.
    pub fn to_value(&self) -> Result<Value, LayoutError> {
        serde_json::to_value(self.to_snapshot()).map_err(|err| SnapshotError::from(err).into())
    }

    /// Load from a neutral key-value tree.
    pub fn from_value(value: Value) -> Result<Self, LayoutError> {
        let snapshot: LayoutSnapshot = serde_json::from_value(value).map_err(SnapshotError::from)?;
        Self::from_snapshot(snapshot)
    }

    /// Export as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, LayoutError> {
        serde_json::to_string_pretty(&self.to_snapshot())
            .map_err(|err| SnapshotError::from(err).into())
    }

    /// Load from JSON text.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let snapshot: LayoutSnapshot = serde_json::from_str(json).map_err(SnapshotError::from)?;
        Self::from_snapshot(snapshot)
    }
}

struct Builder {
    next: ItemId,
    nodes: BTreeMap<ItemId, ItemNode>,
    guests: BTreeSet<GuestKey>,
}

impl Builder {
    fn add(
        &mut self,
        record: ItemSnapshot,
        parent: Option<ItemId>,
        path: &str,
    ) -> Result<ItemId, LayoutError> {
        validate_record(&record, path)?;
        let id = if parent.is_none() {
            self.next
        } else {
            self.next = self.next.checked_next()?;
            self.next
        };

        let kind = match record.kind {
            ItemSnapshotKind::Leaf => {
                if let Some(guest) = &record.guest
                    && !self.guests.insert(guest.clone())
                {
                    return Err(SnapshotError::DuplicateGuest {
                        guest: guest.clone(),
                    }
                    .into());
                }
                ItemKind::Leaf(LeafItem {
                    guest: record.guest,
                    visible: record.visible,
                })
            }
            ItemSnapshotKind::Container => {
                let orientation = record.orientation.ok_or_else(|| SnapshotError::MissingOrientation {
                    path: path.to_owned(),
                })?;
                let mut container = ContainerItem::new(orientation);
                for (index, child) in record.children.into_iter().enumerate() {
                    let child_id = self.add(child, Some(id), &format!("{path}/{index}"))?;
                    container.children.push(child_id);
                }
                ItemKind::Container(container)
            }
        };

        self.nodes.insert(
            id,
            ItemNode {
                id,
                parent,
                sizing: SizingInfo {
                    geometry: record.geometry,
                    min_size: record.min_size,
                    percentage_within_parent: record.percentage,
                },
                kind,
                extensions: record.extensions,
            },
        );
        Ok(id)
    }
}

fn validate_record(record: &ItemSnapshot, path: &str) -> Result<(), SnapshotError> {
    let path = path.to_owned();
    match record.kind {
        ItemSnapshotKind::Leaf if !record.children.is_empty() => {
            return Err(SnapshotError::LeafWithChildren { path });
        }
        ItemSnapshotKind::Container if record.guest.is_some() => {
            return Err(SnapshotError::ContainerWithGuest { path });
        }
        ItemSnapshotKind::Container if record.orientation.is_none() => {
            return Err(SnapshotError::MissingOrientation { path });
        }
        _ => {}
    }
    if !record.percentage.is_finite() || !(0.0..=1.0).contains(&record.percentage) {
        return Err(SnapshotError::InvalidPercentage {
            path,
            value: record.percentage,
        });
    }
    if record.geometry.size().is_negative() || record.min_size.is_negative() {
        return Err(SnapshotError::NegativeSize { path });
    }
    Ok(())
}
