//! The item tree: arena storage, construction, and the transactional wrapper
//! every mutation runs through.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use msplit_core::geometry::{Orientation, Rect, Size};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::events::{self, LayoutEvent};
use crate::item::{ContainerItem, GuestKey, GuestRegistry, ItemId, ItemKind, ItemNode};
use crate::separator::SeparatorRef;

/// Recursive split layout owning every item it arranges.
///
/// The root is a container that is never collapsed or removed. All geometry
/// is absolute, with the root's origin where the caller placed it (the
/// origin by default).
#[derive(Debug, Clone)]
pub struct ItemTree {
    pub(crate) config: LayoutConfig,
    pub(crate) root: ItemId,
    pub(crate) next_id: ItemId,
    pub(crate) nodes: BTreeMap<ItemId, ItemNode>,
    pub(crate) generation: u64,
    pub(crate) active_drag: Option<SeparatorRef>,
    pub(crate) events: Vec<LayoutEvent>,
    pub(crate) extensions: BTreeMap<String, serde_json::Value>,
}

/// Leaf state captured before a mutation so events can be derived after it.
#[derive(Debug, Clone, PartialEq)]
struct LeafState {
    geometry: Rect,
    visible: bool,
    guest: Option<GuestKey>,
}

impl ItemTree {
    /// Empty layout of the given size with the default configuration.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self::with_config(size, LayoutConfig::default())
    }

    /// Empty layout of the given size. Negative dimensions become zero.
    #[must_use]
    pub fn with_config(size: Size, config: LayoutConfig) -> Self {
        let root = ItemId::MIN;
        let mut node = ItemNode::container(
            root,
            Orientation::Vertical,
            Rect::from_size(size.expanded_to(Size::ZERO)),
        );
        node.sizing.percentage_within_parent = 1.0;
        let mut nodes = BTreeMap::new();
        nodes.insert(root, node);
        Self {
            config,
            root,
            next_id: ItemId::MIN,
            nodes,
            generation: 0,
            active_drag: None,
            events: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }

    pub(crate) fn from_parts(
        config: LayoutConfig,
        root: ItemId,
        nodes: BTreeMap<ItemId, ItemNode>,
        extensions: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        let next_id = nodes.keys().next_back().copied().unwrap_or(root);
        Self {
            config,
            root,
            next_id,
            nodes,
            generation: 0,
            active_drag: None,
            events: Vec::new(),
            extensions,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    #[must_use]
    pub const fn root(&self) -> ItemId {
        self.root
    }

    /// Current geometry of the root container.
    #[must_use]
    pub fn root_geometry(&self) -> Rect {
        self.nodes
            .get(&self.root)
            .map(|node| node.sizing.geometry)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn root_size(&self) -> Size {
        self.root_geometry().size()
    }

    /// Counter bumped by every structural change (insert, remove, placeholder
    /// toggles). Drag sessions use it to detect that their separator may have
    /// been renumbered.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a separator drag is in progress.
    #[must_use]
    pub const fn is_resizing(&self) -> bool {
        self.active_drag.is_some()
    }

    /// Snapshot-level fields this engine does not interpret.
    #[must_use]
    pub const fn extensions(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.extensions
    }

    /// Events queued since the last drain.
    #[must_use]
    pub fn pending_events(&self) -> &[LayoutEvent] {
        &self.events
    }

    /// Take every queued event.
    pub fn drain_events(&mut self) -> Vec<LayoutEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain queued events and forward the guest-facing ones. Returns the
    /// number of guest calls made.
    pub fn dispatch_events(&mut self, registry: &mut impl GuestRegistry) -> usize {
        let events = self.drain_events();
        events::dispatch(&events, registry)
    }

    /// Deterministic hash of the layout state.
    ///
    /// Covers structure, geometry, minimums, percentages and visibility, but
    /// not queued events or the drag flag.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0001_0000_01b3;

        fn mix_bytes(hash: &mut u64, bytes: &[u8]) {
            for byte in bytes {
                *hash ^= u64::from(*byte);
                *hash = hash.wrapping_mul(PRIME);
            }
        }

        fn mix_i32(hash: &mut u64, value: i32) {
            mix_bytes(hash, &value.to_le_bytes());
        }

        fn mix_u64(hash: &mut u64, value: u64) {
            mix_bytes(hash, &value.to_le_bytes());
        }

        fn mix_rect(hash: &mut u64, rect: Rect) {
            for value in [rect.x, rect.y, rect.width, rect.height] {
                mix_i32(hash, value);
            }
        }

        let mut hash = OFFSET_BASIS;
        mix_u64(&mut hash, self.root.get());
        mix_i32(&mut hash, self.config.separator_thickness);
        for (id, node) in &self.nodes {
            mix_u64(&mut hash, id.get());
            mix_u64(&mut hash, node.parent.map_or(0, ItemId::get));
            mix_rect(&mut hash, node.sizing.geometry);
            mix_i32(&mut hash, node.sizing.min_size.width);
            mix_i32(&mut hash, node.sizing.min_size.height);
            mix_u64(&mut hash, node.sizing.percentage_within_parent.to_bits());
            match &node.kind {
                ItemKind::Leaf(leaf) => {
                    mix_bytes(&mut hash, &[0, u8::from(leaf.visible)]);
                    if let Some(guest) = &leaf.guest {
                        mix_bytes(&mut hash, guest.as_str().as_bytes());
                    }
                }
                ItemKind::Container(container) => {
                    let axis = match container.orientation {
                        Orientation::Horizontal => 1,
                        Orientation::Vertical => 2,
                    };
                    mix_bytes(&mut hash, &[1, axis]);
                    for child in &container.children {
                        mix_u64(&mut hash, child.get());
                    }
                }
            }
        }
        hash
    }

    // ── arena access ────────────────────────────────────────────────────

    pub(crate) fn node_ref(&self, id: ItemId) -> Result<&ItemNode, LayoutError> {
        self.nodes
            .get(&id)
            .ok_or(LayoutError::MissingItem { item: id })
    }

    pub(crate) fn node_mut(&mut self, id: ItemId) -> Result<&mut ItemNode, LayoutError> {
        self.nodes
            .get_mut(&id)
            .ok_or(LayoutError::MissingItem { item: id })
    }

    pub(crate) fn container_ref(&self, id: ItemId) -> Result<&ContainerItem, LayoutError> {
        self.node_ref(id)?
            .as_container()
            .ok_or(LayoutError::MissingItem { item: id })
    }

    pub(crate) fn container_mut(&mut self, id: ItemId) -> Result<&mut ContainerItem, LayoutError> {
        self.node_mut(id)?
            .as_container_mut()
            .ok_or(LayoutError::MissingItem { item: id })
    }

    pub(crate) fn allocate_id(&mut self) -> Result<ItemId, LayoutError> {
        let id = self.next_id.checked_next()?;
        self.next_id = id;
        Ok(id)
    }

    pub(crate) const fn thickness(&self) -> i32 {
        self.config.separator_thickness
    }

    /// Total separator thickness between `visible` laid-out children.
    pub(crate) const fn separators_length(&self, visible: usize) -> i32 {
        self.config.separator_thickness * visible.saturating_sub(1) as i32
    }

    /// Record a structural change. Invalidates in-flight drags.
    pub(crate) fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.active_drag = None;
    }

    /// Every id in the subtree rooted at `id`, parents before children.
    pub(crate) fn subtree(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(node) = self.nodes.get(&next) else {
                continue;
            };
            out.push(next);
            stack.extend(node.children().iter().rev().copied());
        }
        out
    }

    // ── transactions ────────────────────────────────────────────────────

    /// Run `op` on a working copy and commit it only on success.
    ///
    /// After `op` the working copy gets fresh separators. Debug builds also
    /// verify every invariant before committing. Events describing the leaf
    /// changes are appended to the queue.
    pub(crate) fn transact<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, LayoutError>,
    ) -> Result<T, LayoutError> {
        let before = self.leaf_states();
        let before_root = self.root_size();
        let mut working = self.clone();
        let value = op(&mut working)?;
        working.rebuild_separators();

        #[cfg(debug_assertions)]
        if let Err(error) = working.check_sanity() {
            msplit_core::warn!(%error, layout = %working, "layout failed its sanity check");
            return Err(error.into());
        }

        working.record_changes(&before, before_root);
        *self = working;
        Ok(value)
    }

    fn leaf_states(&self) -> BTreeMap<ItemId, LeafState> {
        self.nodes
            .iter()
            .filter_map(|(id, node)| {
                let leaf = node.as_leaf()?;
                Some((
                    *id,
                    LeafState {
                        geometry: node.sizing.geometry,
                        visible: leaf.visible,
                        guest: leaf.guest.clone(),
                    },
                ))
            })
            .collect()
    }

    fn record_changes(&mut self, before: &BTreeMap<ItemId, LeafState>, before_root: Size) {
        let after = self.leaf_states();
        let mut events = Vec::new();

        let root_size = self.root_size();
        if root_size != before_root {
            events.push(LayoutEvent::RootResized {
                from: before_root,
                to: root_size,
            });
        }

        for (id, old) in before {
            if !after.contains_key(id) {
                events.push(LayoutEvent::ItemRemoved {
                    item: *id,
                    guest: old.guest.clone(),
                });
            }
        }

        for (id, new) in &after {
            let old = before.get(id);
            if old.map(|old| old.visible) != Some(new.visible) {
                events.push(LayoutEvent::VisibilityChanged {
                    item: *id,
                    guest: new.guest.clone(),
                    visible: new.visible,
                });
            }
            let moved = old.is_none_or(|old| old.geometry != new.geometry || !old.visible);
            if new.visible && moved {
                events.push(LayoutEvent::GeometryChanged {
                    item: *id,
                    guest: new.guest.clone(),
                    geometry: new.geometry,
                });
            }
        }

        let visible_before = before.values().filter(|state| state.visible).count();
        let visible_after = after.values().filter(|state| state.visible).count();
        if before.len() != after.len() || visible_before != visible_after {
            events.push(LayoutEvent::ItemsChanged {
                count: after.len(),
                visible: visible_after,
            });
        }

        self.events.extend(events);
    }
}

/// Indented dump of the whole tree, one node per line.
///
/// ```text
/// container #1 horizontal 1000x800+0+0 min 205x100 share 1.000
///   leaf #2 'editor' 498x800+0+0 min 100x100 share 0.501
///   leaf #3 'console' 497x800+503+0 min 100x100 share 0.499 placeholder
/// ```
impl fmt::Display for ItemTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.dump_node(f, self.root, 0)
    }
}

impl ItemTree {
    fn dump_node(&self, f: &mut fmt::Formatter<'_>, id: ItemId, depth: usize) -> fmt::Result {
        let Some(node) = self.nodes.get(&id) else {
            return writeln!(f, "{:indent$}missing {id}", "", indent = depth * 2);
        };
        let rect = node.sizing.geometry;
        let min = self.min_size(id);
        write!(f, "{:indent$}", "", indent = depth * 2)?;
        match &node.kind {
            ItemKind::Container(container) => write!(
                f,
                "container {id} {}",
                match container.orientation {
                    Orientation::Horizontal => "horizontal",
                    Orientation::Vertical => "vertical",
                }
            )?,
            ItemKind::Leaf(leaf) => match &leaf.guest {
                Some(guest) => write!(f, "leaf {id} '{guest}'")?,
                None => write!(f, "leaf {id}")?,
            },
        }
        write!(
            f,
            " {}x{}+{}+{} min {}x{} share {:.3}",
            rect.width,
            rect.height,
            rect.x,
            rect.y,
            min.width,
            min.height,
            node.sizing.percentage_within_parent
        )?;
        if !self.is_visible(id) {
            f.write_str(if node.is_container() { " hidden" } else { " placeholder" })?;
        }
        writeln!(f)?;
        for child in node.children() {
            self.dump_node(f, *child, depth + 1)?;
        }
        Ok(())
    }
}

/// Containers whose percentages must be refreshed after a mutation.
pub(crate) type Touched = BTreeSet<ItemId>;
