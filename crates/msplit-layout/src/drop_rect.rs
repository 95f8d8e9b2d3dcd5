//! Drop indicator geometry.
//!
//! [`ItemTree::suggested_drop_rect`] previews where an item of a given
//! minimum size would land if inserted at a location. It does not touch the
//! tree, and the real insertion may differ slightly once siblings' minimums
//! come into play.

use msplit_core::geometry::{Orientation, Rect, Size};

use crate::error::LayoutError;
use crate::item::{ItemId, Location};
use crate::tree::ItemTree;

impl ItemTree {
    /// Rect an item of `min_size` would roughly occupy if inserted at
    /// `location` relative to `relative_to` (or to the whole layout).
    pub fn suggested_drop_rect(
        &self,
        min_size: Size,
        relative_to: Option<ItemId>,
        location: Location,
    ) -> Result<Rect, LayoutError> {
        if min_size.is_negative() {
            return Err(LayoutError::InvalidMinSize { min_size });
        }
        let target = match relative_to {
            Some(item) if item == self.root => None,
            Some(item) if !self.contains(item) => return Err(LayoutError::MissingItem { item }),
            Some(item) if !self.is_visible(item) => {
                return Err(LayoutError::RelativeToPlaceholder { item });
            }
            Some(item) => {
                let parent = self.parent(item).unwrap_or(self.root);
                (self.visible_children(parent).len() > 1).then_some((item, parent))
            }
            None => None,
        };

        let axis = location.orientation();
        let item_min = axis.length(min_size);
        let thickness = self.thickness();

        let Some((item, parent)) = target else {
            let rect = self.root_geometry();
            let root_len = rect.length(axis);
            let available = (root_len - axis.length(self.min_size(self.root)) - thickness).max(0);
            let length = available.min(root_len / 3).max(item_min);
            return Ok(at_edge(rect, axis, location, length));
        };

        let item_rect = self.node_ref(item)?.sizing.geometry;
        let container_orientation = self.container_ref(parent)?.orientation;

        if container_orientation != axis {
            let item_len = item_rect.length(axis);
            let available = (item_len - axis.length(self.min_size(item)) - thickness).max(0);
            let length = available.min(item_len / 2).max(item_min);
            return Ok(at_edge(item_rect, axis, location, length));
        }

        let container_rect = self.node_ref(parent)?.sizing.geometry;
        let siblings = self.visible_children(parent);
        let container_len = container_rect.length(axis);
        let usable = container_len - self.separators_length(siblings.len());
        let available =
            (container_len - axis.length(self.min_size(parent)) - thickness).max(0);
        let length = available
            .min(usable / (siblings.len() as i32 + 1))
            .max(item_min);

        let index = siblings.iter().position(|id| *id == item).unwrap_or(0);
        let start = container_rect.pos(axis);
        let end = container_rect.end(axis);
        // Siblings before the split give up space to the left of the
        // boundary, the rest to the right. The rect never covers more than
        // either side can release.
        let split = if location.is_side1() { index } else { index + 1 };
        let pos = if split == 0 {
            start
        } else if split == siblings.len() {
            end - length
        } else {
            let boundary = if location.is_side1() {
                item_rect.pos(axis)
            } else {
                item_rect.end(axis)
            };
            let min1 = boundary - self.slack(&siblings[..split], axis);
            let max2 = boundary + self.slack(&siblings[split..], axis) - length;
            (boundary - length / 2).min(max2).max(min1)
        };
        let pos = pos.min(end - length).max(start);
        Ok(item_rect.with_span(axis, pos, length))
    }

    /// Length `items` could give up along `axis` without going below their
    /// minimums.
    fn slack(&self, items: &[ItemId], axis: Orientation) -> i32 {
        items
            .iter()
            .filter_map(|id| {
                let length = self.nodes.get(id)?.sizing.length(axis);
                Some((length - axis.length(self.min_size(*id))).max(0))
            })
            .sum()
    }
}

/// `length` units of `rect` at the edge named by `location`.
fn at_edge(rect: Rect, axis: Orientation, location: Location, length: i32) -> Rect {
    let pos = if location.is_side1() {
        rect.pos(axis)
    } else {
        rect.end(axis) - length
    };
    rect.with_span(axis, pos, length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{GuestItem, InsertOptions};

    fn row(names: &[&str]) -> (ItemTree, Vec<ItemId>) {
        let mut tree = ItemTree::new(Size::new(1000, 600));
        let ids = names
            .iter()
            .map(|name| {
                tree.insert_item(
                    GuestItem::new(*name, Size::new(50, 50)),
                    Location::Right,
                    None,
                    InsertOptions::default(),
                )
                .expect("insert")
            })
            .collect();
        (tree, ids)
    }

    #[test]
    fn root_edges_take_a_third() {
        let (tree, _) = row(&["a"]);
        let min = Size::new(50, 50);
        assert_eq!(
            tree.suggested_drop_rect(min, None, Location::Left),
            Ok(Rect::new(0, 0, 333, 600))
        );
        assert_eq!(
            tree.suggested_drop_rect(min, None, Location::Bottom),
            Ok(Rect::new(0, 400, 1000, 200))
        );
    }

    #[test]
    fn minimum_wins_over_a_third() {
        let (tree, _) = row(&["a"]);
        let rect = tree
            .suggested_drop_rect(Size::new(500, 10), None, Location::Right)
            .expect("rect");
        assert_eq!(rect, Rect::new(500, 0, 500, 600));
    }

    #[test]
    fn only_child_behaves_like_root() {
        let (tree, ids) = row(&["a"]);
        let min = Size::new(50, 50);
        assert_eq!(
            tree.suggested_drop_rect(min, Some(ids[0]), Location::Top),
            tree.suggested_drop_rect(min, None, Location::Top)
        );
    }

    #[test]
    fn same_axis_straddles_the_boundary() {
        let (tree, ids) = row(&["a", "b"]);
        let a = tree.geometry(ids[0]).expect("a");
        let rect = tree
            .suggested_drop_rect(Size::new(50, 50), Some(ids[0]), Location::Right)
            .expect("rect");
        // usable 995 over three items.
        assert_eq!(rect.width, 331);
        assert_eq!(rect.x, a.right() - 331 / 2);
        assert_eq!(rect.height, 600);

        let first = tree
            .suggested_drop_rect(Size::new(50, 50), Some(ids[0]), Location::Left)
            .expect("rect");
        assert_eq!(first.x, 0);
        let last = tree
            .suggested_drop_rect(Size::new(50, 50), Some(ids[1]), Location::Right)
            .expect("rect");
        assert_eq!(last.right(), 1000);
    }

    #[test]
    fn straddling_rect_stops_at_what_neighbours_can_release() {
        let mut tree = ItemTree::new(Size::new(1000, 600));
        let a = tree
            .insert_item(
                GuestItem::new("a", Size::new(450, 50)),
                Location::Right,
                None,
                InsertOptions::default(),
            )
            .expect("insert a");
        tree.insert_item(
            GuestItem::new("b", Size::new(50, 50)),
            Location::Right,
            None,
            InsertOptions::default(),
        )
        .expect("insert b");
        assert_eq!(tree.geometry(a).map(|r| r.width), Some(498));

        let rect = tree
            .suggested_drop_rect(Size::new(50, 50), Some(a), Location::Right)
            .expect("rect");
        assert_eq!(rect.width, 331);
        // a can only give up 48 units, so the rect starts at its minimum.
        assert_eq!(rect.x, 450);
    }

    #[test]
    fn orthogonal_split_stays_inside_the_item() {
        let (tree, ids) = row(&["a", "b"]);
        let b = tree.geometry(ids[1]).expect("b");
        let rect = tree
            .suggested_drop_rect(Size::new(50, 50), Some(ids[1]), Location::Bottom)
            .expect("rect");
        assert_eq!(rect, Rect::new(b.x, 300, b.width, 300));
    }

    #[test]
    fn placeholders_cannot_be_targets() {
        let (mut tree, ids) = row(&["a", "b"]);
        tree.turn_into_placeholder(ids[0]).expect("hide");
        assert_eq!(
            tree.suggested_drop_rect(Size::new(1, 1), Some(ids[0]), Location::Left),
            Err(LayoutError::RelativeToPlaceholder { item: ids[0] })
        );
    }
}
