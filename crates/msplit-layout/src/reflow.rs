//! Geometry propagation.
//!
//! Every mutation ends in [`ItemTree::reflow`], one top-down walk that takes
//! the rect a node must occupy, fits the visible children of a container
//! into it along the main axis, broadcasts the cross extent, and recurses.
//! Lengths move by deltas relative to what children currently have, shared
//! out in proportion to their remembered percentages, so repeated resizes
//! keep proportions and never push anyone below a minimum.

use msplit_core::geometry::{Rect, Size};
use msplit_core::{debug, trace, warn};

use crate::error::LayoutError;
use crate::item::ItemId;
use crate::tree::{ItemTree, Touched};

/// How an item becoming visible claims length from its siblings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Claim {
    /// An equal share of the container.
    Share,
    /// The remembered fraction of the container, if there is one.
    Remembered(f64),
}

impl ItemTree {
    /// Lay out `id` inside `rect`, then its visible descendants.
    ///
    /// `pinned` keeps the length it already has in its container; its
    /// siblings absorb the difference. Containers whose child lengths change
    /// are added to `touched`.
    pub(crate) fn reflow(
        &mut self,
        id: ItemId,
        rect: Rect,
        pinned: Option<ItemId>,
        touched: &mut Touched,
    ) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.sizing.geometry = rect;
        let Some(orientation) = node.as_container().map(|container| container.orientation) else {
            return;
        };

        let children = self.visible_children(id);
        if children.is_empty() {
            return;
        }
        let usable = (rect.length(orientation) - self.separators_length(children.len())).max(0);
        let mut current = Vec::with_capacity(children.len());
        let mut mins = Vec::with_capacity(children.len());
        let mut weights = Vec::with_capacity(children.len());
        for child in &children {
            let Some(node) = self.nodes.get(child) else {
                continue;
            };
            current.push(node.sizing.length(orientation));
            weights.push(node.sizing.percentage_within_parent);
            mins.push(orientation.length(self.min_size(*child)));
        }
        let pinned_index = pinned.and_then(|p| children.iter().position(|child| *child == p));
        let lengths = distribute(&current, &mins, &weights, usable, pinned_index);
        if lengths != current {
            touched.insert(id);
        }
        trace!(container = id.get(), usable, ?lengths, "reflow");

        let thickness = self.thickness();
        let mut pos = rect.pos(orientation);
        for (child, length) in children.into_iter().zip(lengths) {
            self.reflow(child, rect.with_span(orientation, pos, length), pinned, touched);
            pos += length + thickness;
        }
    }

    /// Reset the percentages of `container`'s visible children from their
    /// current lengths. Hidden children keep their remembered value.
    pub(crate) fn refresh_percentages(&mut self, container: ItemId) {
        let Ok(orientation) = self.container_ref(container).map(|c| c.orientation) else {
            return;
        };
        let children = self.visible_children(container);
        if children.is_empty() {
            return;
        }
        let length = self
            .nodes
            .get(&container)
            .map_or(0, |node| node.sizing.length(orientation));
        let usable = length - self.separators_length(children.len());
        let count = children.len() as f64;
        for child in children {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.sizing.percentage_within_parent = if usable > 0 {
                    f64::from(node.sizing.length(orientation)) / f64::from(usable)
                } else {
                    1.0 / count
                };
            }
        }
    }

    pub(crate) fn refresh_touched(&mut self, touched: &Touched) {
        for container in touched {
            self.refresh_percentages(*container);
        }
    }

    /// Root rect grown just enough to satisfy the tree's minimum size.
    pub(crate) fn grown_root_rect(&self) -> Rect {
        let rect = self.root_geometry();
        let minimum = self.min_size(self.root);
        if minimum.fits_within(rect.size()) {
            return rect;
        }
        let grown = rect.size().expanded_to(minimum);
        debug!(
            from_width = rect.width,
            from_height = rect.height,
            to_width = grown.width,
            to_height = grown.height,
            "growing root to fit minimum sizes"
        );
        rect.with_size(grown)
    }

    /// Reflow the whole tree, growing the root first if minimums demand it.
    pub(crate) fn reflow_all(&mut self, pinned: Option<ItemId>, touched: &mut Touched) {
        let rect = self.grown_root_rect();
        let root = self.root;
        self.reflow(root, rect, pinned, touched);
    }

    /// Give a node that just became visible its length in its container.
    ///
    /// The anchor receives `claim` clamped to its own minimum and to what
    /// its siblings can spare; if even its minimum does not fit, the root
    /// grows.
    pub(crate) fn show_anchor(
        &mut self,
        anchor: ItemId,
        claim: Claim,
        touched: &mut Touched,
    ) -> Result<(), LayoutError> {
        let parent = self
            .node_ref(anchor)?
            .parent
            .ok_or(LayoutError::MissingItem { item: anchor })?;
        let orientation = self.container_ref(parent)?.orientation;
        let parent_rect = self.node_ref(parent)?.sizing.geometry;
        let siblings: Vec<ItemId> = self
            .visible_children(parent)
            .into_iter()
            .filter(|child| *child != anchor)
            .collect();
        let anchor_min = orientation.length(self.min_size(anchor));

        let target = if siblings.is_empty() {
            parent_rect.length(orientation).max(anchor_min)
        } else {
            let usable = parent_rect.length(orientation) - self.separators_length(siblings.len() + 1);
            let share = usable / (siblings.len() as i32 + 1);
            let desired = match claim {
                Claim::Remembered(pct) if pct.is_finite() && pct > 0.0 => {
                    (pct * f64::from(usable)).round() as i32
                }
                Claim::Share | Claim::Remembered(_) => share,
            };
            let spare: i32 = siblings
                .iter()
                .map(|sibling| {
                    let length = self
                        .nodes
                        .get(sibling)
                        .map_or(0, |node| node.sizing.length(orientation));
                    (length - orientation.length(self.min_size(*sibling))).max(0)
                })
                .sum::<i32>()
                - self.thickness();
            desired.max(anchor_min).min(spare.max(anchor_min))
        };

        let node = self.node_mut(anchor)?;
        node.sizing.geometry =
            parent_rect.with_span(orientation, parent_rect.pos(orientation), target);
        touched.insert(parent);
        self.reflow_all(Some(anchor), touched);
        Ok(())
    }

    /// Resize the root.
    ///
    /// Sizes below the tree's minimum are rejected and leave the layout
    /// untouched. Percentages are not refreshed, so shrinking and growing
    /// back restores the previous lengths.
    pub fn resize(&mut self, size: Size) -> Result<(), LayoutError> {
        if size.is_negative() {
            return Err(LayoutError::InvalidSize { size });
        }
        let minimum = self.min_size(self.root);
        if !minimum.fits_within(size) {
            warn!(
                width = size.width,
                height = size.height,
                min_width = minimum.width,
                min_height = minimum.height,
                "rejected resize below minimum"
            );
            return Err(LayoutError::ResizeBelowMinimum {
                requested: size,
                minimum,
            });
        }
        if size == self.root_size() {
            return Ok(());
        }
        self.transact(|tree| {
            let rect = tree.root_geometry().with_size(size);
            let root = tree.root;
            tree.reflow(root, rect, None, &mut Touched::new());
            Ok(())
        })
    }

    /// Change a leaf's minimum size, as reported by its guest.
    ///
    /// A visible leaf that is now too small is grown at its siblings'
    /// expense; if they cannot spare enough the root grows.
    pub fn set_min_size(&mut self, item: ItemId, min_size: Size) -> Result<(), LayoutError> {
        if min_size.is_negative() {
            return Err(LayoutError::InvalidMinSize { min_size });
        }
        if self.node_ref(item)?.as_leaf().is_none() {
            return Err(LayoutError::NotALeaf { item });
        }
        self.transact(|tree| {
            tree.node_mut(item)?.sizing.min_size = min_size;
            if tree.is_visible(item) {
                let mut touched = Touched::new();
                tree.reflow_all(None, &mut touched);
                tree.refresh_touched(&touched);
            }
            debug!(item = item.get(), width = min_size.width, height = min_size.height, "min size changed");
            Ok(())
        })
    }

    /// [`Self::set_min_size`] addressed by guest.
    pub fn set_guest_min_size(
        &mut self,
        guest: &crate::item::GuestKey,
        min_size: Size,
    ) -> Result<(), LayoutError> {
        let item = self
            .item_for_guest(guest)
            .ok_or_else(|| LayoutError::UnknownGuest {
                guest: guest.clone(),
            })?;
        self.set_min_size(item, min_size)
    }
}

/// Fit `current` lengths into `usable`.
///
/// Children below their minimum are raised to it first. The remaining
/// difference is shared out by weight among the other children, excluding
/// `pinned`; whatever they cannot absorb falls back to everyone with slack.
pub(crate) fn distribute(
    current: &[i32],
    mins: &[i32],
    weights: &[f64],
    usable: i32,
    pinned: Option<usize>,
) -> Vec<i32> {
    let mut lengths = current.to_vec();
    let mut eligible = vec![true; lengths.len()];
    for (i, length) in lengths.iter_mut().enumerate() {
        if *length < mins[i] {
            *length = mins[i];
            eligible[i] = false;
        }
    }
    if let Some(pinned) = pinned
        && let Some(slot) = eligible.get_mut(pinned)
    {
        *slot = false;
    }

    let delta = usable - lengths.iter().sum::<i32>();
    let rest = apply_delta(&mut lengths, mins, weights, &eligible, delta);
    if rest != 0 {
        let everyone = vec![true; lengths.len()];
        let rest = apply_delta(&mut lengths, mins, weights, &everyone, rest);
        if rest != 0 {
            warn!(rest, usable, "children cannot fit their container");
        }
    }
    lengths
}

/// Add `delta` to the eligible lengths in proportion to `weights`, never
/// taking anyone below `mins`. Returns the part that could not be applied.
fn apply_delta(
    lengths: &mut [i32],
    mins: &[i32],
    weights: &[f64],
    eligible: &[bool],
    delta: i32,
) -> i32 {
    if delta > 0 {
        let receivers: Vec<usize> = (0..lengths.len()).filter(|&i| eligible[i]).collect();
        if receivers.is_empty() {
            return delta;
        }
        for (i, share) in shares(delta, &receivers, weights) {
            lengths[i] += share;
        }
        return 0;
    }

    // Each round the last donor absorbs the rounding remainder, mirroring
    // growth, so shrinking by what was just added restores the old lengths.
    let mut remaining = -delta;
    while remaining > 0 {
        let donors: Vec<usize> = (0..lengths.len())
            .filter(|&i| eligible[i] && lengths[i] > mins[i])
            .collect();
        if donors.is_empty() {
            break;
        }
        let mut taken = 0;
        for (i, share) in shares(remaining, &donors, weights) {
            let take = share.min(lengths[i] - mins[i]).min(remaining - taken);
            lengths[i] -= take;
            taken += take;
        }
        remaining -= taken;
    }
    -remaining
}

/// Split a positive `amount` across `receivers` by weight. Floors each share
/// and gives the remainder to the last receiver.
fn shares(amount: i32, receivers: &[usize], weights: &[f64]) -> Vec<(usize, i32)> {
    let total = weight_total(receivers, weights);
    let mut given = 0;
    let mut out = Vec::with_capacity(receivers.len());
    for (k, &i) in receivers.iter().enumerate() {
        let share = if k + 1 == receivers.len() {
            amount - given
        } else {
            portion(amount, weights[i], total, receivers.len())
        };
        given += share;
        out.push((i, share));
    }
    out
}

fn weight_total(indices: &[usize], weights: &[f64]) -> f64 {
    indices.iter().map(|&i| clean_weight(weights[i])).sum()
}

/// Floored share of `amount` for one weight. All-zero weights split evenly.
fn portion(amount: i32, weight: f64, total: f64, count: usize) -> i32 {
    if total > f64::EPSILON {
        (f64::from(amount) * clean_weight(weight) / total + 1e-9).floor() as i32
    } else {
        amount / count.max(1) as i32
    }
}

fn clean_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}
