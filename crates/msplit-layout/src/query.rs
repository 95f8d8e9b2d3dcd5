//! Read-only queries over the tree.

use msplit_core::geometry::{Orientation, Point, Rect, Size};

use crate::item::{GuestKey, ItemId, ItemKind, ItemNode};
use crate::separator::{Separator, SeparatorRef};
use crate::tree::ItemTree;

/// Which neighbour of an item to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Left or above.
    Before,
    /// Right or below.
    After,
}

impl ItemTree {
    #[must_use]
    pub fn contains(&self, item: ItemId) -> bool {
        self.nodes.contains_key(&item)
    }

    #[must_use]
    pub fn node(&self, item: ItemId) -> Option<&ItemNode> {
        self.nodes.get(&item)
    }

    #[must_use]
    pub fn parent(&self, item: ItemId) -> Option<ItemId> {
        self.nodes.get(&item).and_then(|node| node.parent)
    }

    /// Children of a container in visual order. Empty for leaves.
    #[must_use]
    pub fn children(&self, item: ItemId) -> &[ItemId] {
        match self.nodes.get(&item) {
            Some(node) => node.children(),
            None => &[],
        }
    }

    #[must_use]
    pub fn geometry(&self, item: ItemId) -> Option<Rect> {
        self.nodes.get(&item).map(|node| node.sizing.geometry)
    }

    #[must_use]
    pub fn percentage(&self, item: ItemId) -> Option<f64> {
        self.nodes
            .get(&item)
            .map(|node| node.sizing.percentage_within_parent)
    }

    /// Orientation of a container.
    #[must_use]
    pub fn orientation(&self, item: ItemId) -> Option<Orientation> {
        self.nodes
            .get(&item)
            .and_then(ItemNode::as_container)
            .map(|container| container.orientation)
    }

    #[must_use]
    pub fn guest(&self, item: ItemId) -> Option<&GuestKey> {
        self.nodes.get(&item).and_then(ItemNode::guest)
    }

    /// Leaves are visible unless they are placeholders; containers are
    /// visible while any descendant leaf is. The root counts as visible.
    #[must_use]
    pub fn is_visible(&self, item: ItemId) -> bool {
        if item == self.root {
            return true;
        }
        match self.nodes.get(&item).map(|node| &node.kind) {
            Some(ItemKind::Leaf(leaf)) => leaf.visible,
            Some(ItemKind::Container(container)) => {
                container.children.iter().any(|child| self.is_visible(*child))
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_placeholder(&self, item: ItemId) -> bool {
        self.nodes
            .get(&item)
            .and_then(ItemNode::as_leaf)
            .is_some_and(|leaf| !leaf.visible)
    }

    /// Children that currently take up space.
    #[must_use]
    pub fn visible_children(&self, item: ItemId) -> Vec<ItemId> {
        self.children(item)
            .iter()
            .copied()
            .filter(|child| self.is_visible(*child))
            .collect()
    }

    /// Effective minimum size. Hidden items need nothing; containers need
    /// their visible children's minimums plus separators along the main
    /// axis and the largest child minimum across it.
    #[must_use]
    pub fn min_size(&self, item: ItemId) -> Size {
        let Some(node) = self.nodes.get(&item) else {
            return Size::ZERO;
        };
        match &node.kind {
            ItemKind::Leaf(leaf) if leaf.visible => node.sizing.min_size,
            ItemKind::Leaf(_) => Size::ZERO,
            ItemKind::Container(container) => {
                let visible = self.visible_children(item);
                let (mut length, mut cross) = (self.separators_length(visible.len()), 0);
                for child in visible {
                    let min = self.min_size(child);
                    length += container.orientation.length(min);
                    cross = cross.max(container.orientation.cross_length(min));
                }
                container.orientation.size(length, cross)
            }
        }
    }

    /// How much the root would have to grow to satisfy every minimum.
    /// Zero whenever the layout is consistent.
    #[must_use]
    pub fn missing_size(&self) -> Size {
        let min = self.min_size(self.root);
        let size = self.root_size();
        Size::new(
            (min.width - size.width).max(0),
            (min.height - size.height).max(0),
        )
    }

    /// Every leaf, depth-first in visual order.
    #[must_use]
    pub fn items(&self) -> Vec<ItemId> {
        self.subtree(self.root)
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|node| !node.is_container()))
            .collect()
    }

    /// Number of leaves, placeholders included.
    #[must_use]
    pub fn count(&self) -> usize {
        self.nodes.values().filter(|node| !node.is_container()).count()
    }

    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.nodes
            .values()
            .filter_map(ItemNode::as_leaf)
            .filter(|leaf| leaf.visible)
            .count()
    }

    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.count() - self.visible_count()
    }

    /// Visible leaf under `point`. Separators and empty space hit nothing.
    #[must_use]
    pub fn item_at(&self, point: Point) -> Option<ItemId> {
        let mut current = self.root;
        loop {
            let node = self.nodes.get(&current)?;
            if !node.is_container() {
                return Some(current);
            }
            current = self
                .visible_children(current)
                .into_iter()
                .find(|child| self.geometry(*child).is_some_and(|rect| rect.contains(point)))?;
        }
    }

    #[must_use]
    pub fn item_for_guest(&self, guest: &GuestKey) -> Option<ItemId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.guest() == Some(guest))
            .map(|(id, _)| *id)
    }

    /// Closest visible sibling on `side`.
    #[must_use]
    pub fn neighbour(&self, item: ItemId, side: Side) -> Option<ItemId> {
        let parent = self.parent(item)?;
        let siblings = self.visible_children(parent);
        let index = siblings.iter().position(|child| *child == item)?;
        match side {
            Side::Before => index.checked_sub(1).map(|i| siblings[i]),
            Side::After => siblings.get(index + 1).copied(),
        }
    }

    /// Separators of one container, in order.
    #[must_use]
    pub fn separators(&self, container: ItemId) -> &[Separator] {
        match self.nodes.get(&container).and_then(ItemNode::as_container) {
            Some(container) => &container.separators,
            None => &[],
        }
    }

    /// Every separator in the tree, depth-first.
    #[must_use]
    pub fn separators_recursive(&self) -> Vec<&Separator> {
        self.subtree(self.root)
            .into_iter()
            .flat_map(|id| self.separators(id))
            .collect()
    }

    #[must_use]
    pub fn separator(&self, separator: SeparatorRef) -> Option<&Separator> {
        self.separators(separator.container).get(separator.index)
    }
}
