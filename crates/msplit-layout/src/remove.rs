//! Removal, clearing, and placeholder toggling.

use msplit_core::debug;

use crate::error::LayoutError;
use crate::item::{ItemId, ItemKind};
use crate::reflow::Claim;
use crate::tree::{ItemTree, Touched};

impl ItemTree {
    /// Remove an item and everything below it.
    ///
    /// Returns `Ok(false)` if the item is not in the tree. A container left
    /// with a single child is dissolved into its parent.
    pub fn remove_item(&mut self, item: ItemId) -> Result<bool, LayoutError> {
        if item == self.root {
            return Err(LayoutError::CannotRemoveRoot);
        }
        if !self.contains(item) {
            return Ok(false);
        }
        self.transact(|tree| {
            let mut touched = Touched::new();
            let parent = tree.detach(item, &mut touched)?;
            tree.collapse_if_single(parent, &mut touched)?;
            tree.flatten(&mut touched)?;
            tree.reflow_all(None, &mut touched);
            tree.refresh_touched(&touched);
            tree.bump_generation();
            debug!(item = item.get(), parent = parent.get(), "removed item");
            Ok(true)
        })
    }

    /// [`Self::remove_item`] addressed by guest.
    pub fn remove_guest(&mut self, guest: &crate::item::GuestKey) -> Result<bool, LayoutError> {
        match self.item_for_guest(guest) {
            Some(item) => self.remove_item(item),
            None => Ok(false),
        }
    }

    /// Remove every item. The root keeps its size.
    pub fn clear(&mut self) -> Result<(), LayoutError> {
        self.transact(|tree| {
            let root = tree.root;
            let children = tree.children(root).to_vec();
            for child in children {
                for id in tree.subtree(child) {
                    tree.nodes.remove(&id);
                }
            }
            tree.container_mut(root)?.children.clear();
            tree.bump_generation();
            debug!("cleared layout");
            Ok(())
        })
    }

    /// Hide a leaf while keeping its slot, share and geometry.
    ///
    /// Returns `Ok(false)` if it already is a placeholder.
    pub fn turn_into_placeholder(&mut self, item: ItemId) -> Result<bool, LayoutError> {
        let node = self.node_ref(item)?;
        let Some(leaf) = node.as_leaf() else {
            return Err(LayoutError::NotALeaf { item });
        };
        if !leaf.visible {
            return Ok(false);
        }
        self.transact(|tree| {
            tree.set_leaf_visible(item, false)?;
            let mut touched = Touched::new();
            for ancestor in tree.ancestors(item) {
                touched.insert(ancestor);
            }
            tree.reflow_all(None, &mut touched);
            tree.refresh_touched(&touched);
            tree.bump_generation();
            debug!(item = item.get(), "turned into placeholder");
            Ok(true)
        })
    }

    /// Show a placeholder again, claiming its remembered share.
    ///
    /// Returns `Ok(false)` if it is already visible.
    pub fn restore_placeholder(&mut self, item: ItemId) -> Result<bool, LayoutError> {
        let node = self.node_ref(item)?;
        let Some(leaf) = node.as_leaf() else {
            return Err(LayoutError::NotALeaf { item });
        };
        if leaf.visible {
            return Ok(false);
        }
        self.transact(|tree| {
            // The highest ancestor that is hidden now becomes visible with it.
            let mut anchor = item;
            for ancestor in tree.ancestors(item) {
                if ancestor == tree.root || tree.is_visible(ancestor) {
                    break;
                }
                anchor = ancestor;
            }
            tree.set_leaf_visible(item, true)?;
            let remembered = tree.node_ref(anchor)?.sizing.percentage_within_parent;
            let mut touched: Touched = tree.ancestors(item).into_iter().collect();
            tree.show_anchor(anchor, Claim::Remembered(remembered), &mut touched)?;
            tree.refresh_touched(&touched);
            tree.bump_generation();
            debug!(item = item.get(), anchor = anchor.get(), remembered, "restored placeholder");
            Ok(true)
        })
    }

    /// [`Self::turn_into_placeholder`] or [`Self::restore_placeholder`]
    /// depending on `visible`.
    pub fn set_item_visible(&mut self, item: ItemId, visible: bool) -> Result<bool, LayoutError> {
        if visible {
            self.restore_placeholder(item)
        } else {
            self.turn_into_placeholder(item)
        }
    }

    /// Parents of `item`, nearest first, ending at the root.
    fn ancestors(&self, item: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut current = self.parent(item);
        while let Some(id) = current {
            out.push(id);
            current = self.parent(id);
        }
        out
    }

    fn set_leaf_visible(&mut self, item: ItemId, visible: bool) -> Result<(), LayoutError> {
        match &mut self.node_mut(item)?.kind {
            ItemKind::Leaf(leaf) => {
                leaf.visible = visible;
                Ok(())
            }
            ItemKind::Container(_) => Err(LayoutError::NotALeaf { item }),
        }
    }

    /// Unlink `item` from its parent and drop its subtree. Returns the parent.
    fn detach(&mut self, item: ItemId, touched: &mut Touched) -> Result<ItemId, LayoutError> {
        let parent = self
            .node_ref(item)?
            .parent
            .ok_or(LayoutError::CannotRemoveRoot)?;
        self.container_mut(parent)?
            .children
            .retain(|child| *child != item);
        for id in self.subtree(item) {
            self.nodes.remove(&id);
        }
        touched.insert(parent);
        Ok(parent)
    }

    /// Dissolve a non-root container that is down to one child.
    ///
    /// The child takes the container's place, rect and share.
    fn collapse_if_single(&mut self, container: ItemId, touched: &mut Touched) -> Result<(), LayoutError> {
        if container == self.root {
            return Ok(());
        }
        let [child] = self.children(container) else {
            return Ok(());
        };
        let child = *child;
        let node = self.node_ref(container)?;
        let sizing = node.sizing;
        let grandparent = node
            .parent
            .ok_or(LayoutError::MissingItem { item: container })?;

        let siblings = &mut self.container_mut(grandparent)?.children;
        let Some(index) = siblings.iter().position(|id| *id == container) else {
            return Err(LayoutError::MissingItem { item: container });
        };
        siblings[index] = child;
        self.nodes.remove(&container);
        touched.remove(&container);
        touched.insert(grandparent);

        let child_node = self.node_mut(child)?;
        child_node.parent = Some(grandparent);
        child_node.sizing.geometry = sizing.geometry;
        child_node.sizing.percentage_within_parent = sizing.percentage_within_parent;
        debug!(container = container.get(), child = child.get(), "collapsed single-child container");
        Ok(())
    }

    /// Remove redundant nesting after a structural change.
    ///
    /// A root whose only child is a container takes over that container's
    /// orientation and children. Any container running along its parent's
    /// axis is replaced by its children, so nested containers always
    /// alternate orientation.
    pub(crate) fn flatten(&mut self, touched: &mut Touched) -> Result<(), LayoutError> {
        let root = self.root;
        while let [only] = self.children(root) {
            let only = *only;
            if self.orientation(only).is_none() {
                break;
            }
            self.absorb_into_root(only, touched)?;
        }

        for id in self.subtree(root) {
            if id == root || !self.contains(id) {
                continue;
            }
            let Some(orientation) = self.orientation(id) else {
                continue;
            };
            let Some(parent) = self.parent(id) else {
                continue;
            };
            if self.orientation(parent) != Some(orientation) {
                continue;
            }
            let index = self
                .children(parent)
                .iter()
                .position(|child| *child == id)
                .ok_or(LayoutError::MissingItem { item: id })?;
            self.splice(id, parent, index, touched)?;
        }
        Ok(())
    }

    /// Make `child`, the root's only child, disappear into the root. The
    /// grandchildren keep their shares since the rect they divide is the same.
    fn absorb_into_root(&mut self, child: ItemId, touched: &mut Touched) -> Result<(), LayoutError> {
        let root = self.root;
        let absorbed = self.container_ref(child)?;
        let orientation = absorbed.orientation;
        let children = absorbed.children.clone();
        for grandchild in &children {
            self.node_mut(*grandchild)?.parent = Some(root);
        }
        let container = self.container_mut(root)?;
        container.orientation = orientation;
        container.children = children;
        self.nodes.remove(&child);
        touched.remove(&child);
        touched.insert(root);
        debug!(container = child.get(), ?orientation, "root absorbed its only container");
        Ok(())
    }

    /// Replace `container` at `index` in `parent` by its own children.
    fn splice(
        &mut self,
        container: ItemId,
        parent: ItemId,
        index: usize,
        touched: &mut Touched,
    ) -> Result<(), LayoutError> {
        let share = self.node_ref(container)?.sizing.percentage_within_parent;
        let children = self.children(container).to_vec();
        for child in &children {
            let node = self.node_mut(*child)?;
            node.parent = Some(parent);
            node.sizing.percentage_within_parent *= share;
        }
        let siblings = &mut self.container_mut(parent)?.children;
        siblings.remove(index);
        for (offset, child) in children.iter().enumerate() {
            siblings.insert(index + offset, *child);
        }
        self.nodes.remove(&container);
        touched.remove(&container);
        touched.insert(parent);
        debug!(container = container.get(), parent = parent.get(), "spliced same-axis container");
        Ok(())
    }
}
