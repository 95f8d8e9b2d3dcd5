//! Insertion: new leaves, orthogonal splits and absorbed subtrees.

use std::collections::BTreeMap;

use msplit_core::debug;
use msplit_core::geometry::{Orientation, Rect, Size};

use crate::error::LayoutError;
use crate::item::{Guest, GuestItem, InsertOptions, ItemId, ItemKind, ItemNode, Location};
use crate::reflow::Claim;
use crate::tree::{ItemTree, Touched};

impl ItemTree {
    /// Insert a new leaf at `location`, either relative to the whole layout
    /// (`relative_to == None`) or next to an existing visible item.
    ///
    /// Inputs are validated before anything changes; on error the layout is
    /// untouched.
    pub fn insert_item(
        &mut self,
        guest: GuestItem,
        location: Location,
        relative_to: Option<ItemId>,
        options: InsertOptions,
    ) -> Result<ItemId, LayoutError> {
        if guest.min_size.is_negative() {
            return Err(LayoutError::InvalidMinSize {
                min_size: guest.min_size,
            });
        }
        if self.item_for_guest(&guest.key).is_some() {
            return Err(LayoutError::DuplicateGuest { guest: guest.key });
        }
        let relative_to = self.check_relative(relative_to)?;

        self.transact(|tree| {
            let id = tree.allocate_id()?;
            debug!(
                item = id.get(),
                guest = guest.key.as_str(),
                ?location,
                relative_to = relative_to.map(ItemId::get),
                start_hidden = options.start_hidden,
                "insert item"
            );
            tree.nodes
                .insert(id, ItemNode::leaf(id, Some(guest.key), guest.min_size));
            tree.place(id, location, relative_to, options)?;
            Ok(id)
        })
    }

    /// Insert a leaf for a live guest, reading its key and minimum size.
    /// An empty minimum falls back to the configured default.
    pub fn insert_guest(
        &mut self,
        guest: &dyn Guest,
        location: Location,
        relative_to: Option<ItemId>,
        options: InsertOptions,
    ) -> Result<ItemId, LayoutError> {
        let mut min_size = guest.minimum_size();
        if min_size == Size::ZERO {
            min_size = self.config.default_min_size;
        }
        self.insert_item(
            GuestItem {
                key: guest.key(),
                min_size,
            },
            location,
            relative_to,
            options,
        )
    }

    /// Absorb every item of `other`, keeping its internal arrangement.
    ///
    /// The donor's items are moved, not copied: they get fresh ids in this
    /// layout but keep their guests, minimums, visibility and proportions.
    /// Returns the id of the absorbed top node: a leaf if the donor held a
    /// single child, otherwise a container with the donor root's orientation.
    /// When that container lands inside one running along the same axis its
    /// children are merged there, and the receiving container is returned.
    pub fn insert_tree(
        &mut self,
        other: ItemTree,
        location: Location,
        relative_to: Option<ItemId>,
        options: InsertOptions,
    ) -> Result<ItemId, LayoutError> {
        if other.children(other.root).is_empty() {
            return Err(LayoutError::EmptyTree);
        }
        for id in other.items() {
            if let Some(guest) = other.guest(id)
                && self.item_for_guest(guest).is_some()
            {
                return Err(LayoutError::DuplicateGuest {
                    guest: guest.clone(),
                });
            }
        }
        let relative_to = self.check_relative(relative_to)?;

        self.transact(|tree| {
            let top = tree.adopt(other)?;
            let first = tree.children(top).first().copied();
            debug!(item = top.get(), ?location, "insert subtree");
            tree.place(top, location, relative_to, options)?;
            if tree.contains(top) {
                return Ok(top);
            }
            // Merged into a container running along the same axis.
            first
                .and_then(|child| tree.parent(child))
                .ok_or(LayoutError::MissingItem { item: top })
        })
    }

    /// Normalize and validate an insertion target. The root means "the whole
    /// layout"; placeholders cannot anchor an insertion.
    fn check_relative(&self, relative_to: Option<ItemId>) -> Result<Option<ItemId>, LayoutError> {
        match relative_to {
            None => Ok(None),
            Some(item) if item == self.root => Ok(None),
            Some(item) if !self.contains(item) => Err(LayoutError::MissingItem { item }),
            Some(item) if !self.is_visible(item) => {
                Err(LayoutError::RelativeToPlaceholder { item })
            }
            Some(item) => Ok(Some(item)),
        }
    }

    /// Link a detached node into the tree and make room for it.
    fn place(
        &mut self,
        id: ItemId,
        location: Location,
        relative_to: Option<ItemId>,
        options: InsertOptions,
    ) -> Result<(), LayoutError> {
        let (container, index) = match relative_to {
            None => self.root_slot(location)?,
            Some(target) => self.sibling_slot(target, location)?,
        };
        let origin = self.node_ref(container)?.sizing.geometry.origin();
        let children = &mut self.container_mut(container)?.children;
        let index = index.min(children.len());
        children.insert(index, id);
        self.node_mut(id)?.parent = Some(container);
        self.bump_generation();

        let mut touched = Touched::new();
        if options.start_hidden {
            self.hide_subtree(id, origin.x, origin.y)?;
        } else if self.is_visible(id) {
            self.show_anchor(id, Claim::Share, &mut touched)?;
        }
        // Shares must be current before a same-axis container is spliced.
        self.refresh_touched(&touched);
        self.flatten(&mut touched)?;
        self.refresh_touched(&touched);
        Ok(())
    }

    /// Slot for content placed against an edge of the whole layout.
    ///
    /// If the root already holds several children along the other axis they
    /// move into a new container first, and the root flips orientation so
    /// the new content spans the full edge.
    fn root_slot(&mut self, location: Location) -> Result<(ItemId, usize), LayoutError> {
        let root = self.root;
        if !self.container_ref(root)?.accepts(location) {
            let children = self.container_ref(root)?.children.clone();
            let orientation = self.container_ref(root)?.orientation;
            let geometry = self.root_geometry();
            let wrapper = self.allocate_id()?;
            let mut node = ItemNode::container(wrapper, orientation, geometry);
            node.parent = Some(root);
            node.sizing.percentage_within_parent = 1.0;
            if let ItemKind::Container(container) = &mut node.kind {
                container.children = children.clone();
            }
            self.nodes.insert(wrapper, node);
            for child in children {
                self.node_mut(child)?.parent = Some(wrapper);
            }
            self.container_mut(root)?.children = vec![wrapper];
            debug!(wrapper = wrapper.get(), "wrapped root children");
        }
        let container = self.container_mut(root)?;
        if container.children.len() <= 1 {
            container.orientation = location.orientation();
        }
        let index = if location.is_side1() {
            0
        } else {
            container.children.len()
        };
        Ok((root, index))
    }

    /// Slot next to `target`, splitting it orthogonally if its container
    /// runs along the other axis. A container target that already runs
    /// along the requested axis takes the new content at its own edge.
    fn sibling_slot(
        &mut self,
        target: ItemId,
        location: Location,
    ) -> Result<(ItemId, usize), LayoutError> {
        let parent = self
            .parent(target)
            .ok_or(LayoutError::MissingItem { item: target })?;
        let container = self.container_mut(parent)?;
        if container.accepts(location) {
            if container.children.len() <= 1 {
                container.orientation = location.orientation();
            }
            let index = container
                .children
                .iter()
                .position(|child| *child == target)
                .ok_or(LayoutError::MissingItem { item: target })?;
            let index = if location.is_side1() { index } else { index + 1 };
            return Ok((parent, index));
        }
        if let Some(nested) = self.nodes.get(&target).and_then(ItemNode::as_container)
            && nested.orientation == location.orientation()
        {
            let index = if location.is_side1() {
                0
            } else {
                nested.children.len()
            };
            return Ok((target, index));
        }
        let wrapper = self.wrap_in_container(target, location.orientation())?;
        Ok((wrapper, usize::from(!location.is_side1())))
    }

    /// Replace `target` in its parent by a new container that holds only
    /// `target` and occupies the same rect and share.
    fn wrap_in_container(
        &mut self,
        target: ItemId,
        orientation: Orientation,
    ) -> Result<ItemId, LayoutError> {
        let wrapper = self.allocate_id()?;
        let target_node = self.node_ref(target)?;
        let parent = target_node
            .parent
            .ok_or(LayoutError::MissingItem { item: target })?;
        let sizing = target_node.sizing;

        let mut node = ItemNode::container(wrapper, orientation, sizing.geometry);
        node.parent = Some(parent);
        node.sizing.percentage_within_parent = sizing.percentage_within_parent;
        if let ItemKind::Container(container) = &mut node.kind {
            container.children.push(target);
        }
        self.nodes.insert(wrapper, node);

        let siblings = &mut self.container_mut(parent)?.children;
        if let Some(slot) = siblings.iter_mut().find(|child| **child == target) {
            *slot = wrapper;
        }
        let target_node = self.node_mut(target)?;
        target_node.parent = Some(wrapper);
        target_node.sizing.percentage_within_parent = 1.0;
        debug!(target = target.get(), wrapper = wrapper.get(), ?orientation, "orthogonal split");
        Ok(wrapper)
    }

    /// Turn every leaf under `id` into a placeholder with a nominal rect at
    /// `(x, y)` and no remembered share.
    fn hide_subtree(&mut self, id: ItemId, x: i32, y: i32) -> Result<(), LayoutError> {
        for item in self.subtree(id) {
            let node = self.node_mut(item)?;
            if let ItemKind::Leaf(leaf) = &mut node.kind {
                leaf.visible = false;
                let min = node.sizing.min_size;
                node.sizing.geometry = Rect::new(x, y, min.width, min.height);
            }
        }
        self.node_mut(id)?.sizing.percentage_within_parent = 0.0;
        Ok(())
    }

    /// Move `other`'s nodes into this arena with fresh ids.
    fn adopt(&mut self, other: ItemTree) -> Result<ItemId, LayoutError> {
        let ItemTree {
            root: other_root,
            nodes: mut other_nodes,
            ..
        } = other;
        let top_children = other_nodes
            .get(&other_root)
            .map(|node| node.children().to_vec())
            .unwrap_or_default();
        let top = match top_children.as_slice() {
            [only] => *only,
            _ => other_root,
        };

        let mut order = Vec::new();
        let mut stack = vec![top];
        while let Some(id) = stack.pop() {
            if let Some(node) = other_nodes.get(&id) {
                order.push(id);
                stack.extend(node.children().iter().rev().copied());
            }
        }
        let mut mapping = BTreeMap::new();
        for old in &order {
            mapping.insert(*old, self.allocate_id()?);
        }

        for old in order {
            let Some(mut node) = other_nodes.remove(&old) else {
                continue;
            };
            let new = mapping[&old];
            node.id = new;
            node.parent = if old == top {
                None
            } else {
                node.parent.and_then(|parent| mapping.get(&parent).copied())
            };
            if let ItemKind::Container(container) = &mut node.kind {
                container.children = container
                    .children
                    .iter()
                    .filter_map(|child| mapping.get(child).copied())
                    .collect();
                container.separators.clear();
            }
            self.nodes.insert(new, node);
        }
        Ok(mapping[&top])
    }
}
