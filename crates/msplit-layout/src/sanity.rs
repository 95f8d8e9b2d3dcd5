//! Structural and geometric invariant checks.
//!
//! Debug builds run [`ItemTree::check_sanity`] on the working copy of every
//! mutation, so a bug in the engine surfaces as
//! [`LayoutError::Invariant`](crate::LayoutError::Invariant) instead of a
//! silently broken layout. Snapshot loading runs it in every build.

use std::collections::BTreeSet;
use std::fmt;

use msplit_core::geometry::Orientation;
use serde::{Deserialize, Serialize};

use crate::item::{ItemId, ItemKind};
use crate::tree::ItemTree;

/// Tolerance on the sum of visible percentages in a container.
pub const PERCENTAGE_TOLERANCE: f64 = 0.01;

/// Which invariant failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanityCode {
    /// Parent and child links disagree, or a node is unreachable.
    ParentMismatch,
    /// A non-root container with fewer than two children.
    CollapsibleContainer,
    ChildOutOfBounds,
    /// Adjacent visible children are not exactly one separator apart.
    GapOrOverlap,
    CrossExtentMismatch,
    LengthMismatch,
    BelowMinimum,
    PercentageSum,
    SeparatorCount,
    DuplicateGuest,
    NegativeGeometry,
}

impl SanityCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParentMismatch => "parent_mismatch",
            Self::CollapsibleContainer => "collapsible_container",
            Self::ChildOutOfBounds => "child_out_of_bounds",
            Self::GapOrOverlap => "gap_or_overlap",
            Self::CrossExtentMismatch => "cross_extent_mismatch",
            Self::LengthMismatch => "length_mismatch",
            Self::BelowMinimum => "below_minimum",
            Self::PercentageSum => "percentage_sum",
            Self::SeparatorCount => "separator_count",
            Self::DuplicateGuest => "duplicate_guest",
            Self::NegativeGeometry => "negative_geometry",
        }
    }
}

/// One failed invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanityError {
    pub code: SanityCode,
    pub item: Option<ItemId>,
    pub message: String,
}

impl SanityError {
    #[must_use]
    pub fn new(code: SanityCode, item: Option<ItemId>, message: impl Into<String>) -> Self {
        Self {
            code,
            item,
            message: message.into(),
        }
    }
}

impl fmt::Display for SanityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item {
            Some(item) => write!(f, "{} at item {}: {}", self.code.as_str(), item.get(), self.message),
            None => write!(f, "{}: {}", self.code.as_str(), self.message),
        }
    }
}

impl std::error::Error for SanityError {}

impl ItemTree {
    /// First failed invariant, if any.
    pub fn check_sanity(&self) -> Result<(), SanityError> {
        match self.sanity_report().into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Every failed invariant, in tree order.
    #[must_use]
    pub fn sanity_report(&self) -> Vec<SanityError> {
        let mut report = Vec::new();
        self.check_links(&mut report);
        self.check_guests(&mut report);
        for id in self.subtree(self.root) {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if id != self.root
                && let ItemKind::Container(container) = &node.kind
                && container.children.len() < 2
            {
                report.push(SanityError::new(
                    SanityCode::CollapsibleContainer,
                    Some(id),
                    format!("{} children", container.children.len()),
                ));
            }
            if !self.is_visible(id) {
                continue;
            }
            let rect = node.sizing.geometry;
            if rect.width < 0 || rect.height < 0 {
                report.push(SanityError::new(
                    SanityCode::NegativeGeometry,
                    Some(id),
                    format!("{}x{}", rect.width, rect.height),
                ));
            }
            let min = self.min_size(id);
            if !min.fits_within(rect.size()) {
                report.push(SanityError::new(
                    SanityCode::BelowMinimum,
                    Some(id),
                    format!(
                        "{}x{} is below minimum {}x{}",
                        rect.width, rect.height, min.width, min.height
                    ),
                ));
            }
            if let ItemKind::Container(container) = &node.kind {
                self.check_container(id, container.orientation, &mut report);
            }
        }
        report
    }

    fn check_links(&self, report: &mut Vec<SanityError>) {
        if let Some(root) = self.nodes.get(&self.root) {
            if root.parent.is_some() {
                report.push(SanityError::new(
                    SanityCode::ParentMismatch,
                    Some(self.root),
                    "root has a parent",
                ));
            }
            if !root.is_container() {
                report.push(SanityError::new(
                    SanityCode::ParentMismatch,
                    Some(self.root),
                    "root is not a container",
                ));
            }
        } else {
            report.push(SanityError::new(SanityCode::ParentMismatch, None, "root is missing"));
            return;
        }

        let mut reached = BTreeSet::new();
        for id in self.subtree(self.root) {
            if !reached.insert(id) {
                report.push(SanityError::new(
                    SanityCode::ParentMismatch,
                    Some(id),
                    "reachable twice",
                ));
                continue;
            }
            for child in self.children(id) {
                let parent = self.parent(*child);
                if parent != Some(id) {
                    report.push(SanityError::new(
                        SanityCode::ParentMismatch,
                        Some(*child),
                        format!(
                            "listed under {} but parent is {:?}",
                            id.get(),
                            parent.map(ItemId::get)
                        ),
                    ));
                }
                if !self.contains(*child) {
                    report.push(SanityError::new(
                        SanityCode::ParentMismatch,
                        Some(*child),
                        "child is missing from the arena",
                    ));
                }
            }
        }
        for id in self.nodes.keys() {
            if !reached.contains(id) {
                report.push(SanityError::new(
                    SanityCode::ParentMismatch,
                    Some(*id),
                    "unreachable from the root",
                ));
            }
        }
    }

    fn check_guests(&self, report: &mut Vec<SanityError>) {
        let mut seen = BTreeSet::new();
        for (id, node) in &self.nodes {
            if let Some(guest) = node.guest()
                && !seen.insert(guest)
            {
                report.push(SanityError::new(
                    SanityCode::DuplicateGuest,
                    Some(*id),
                    format!("guest {guest} appears twice"),
                ));
            }
        }
    }

    fn check_container(&self, id: ItemId, orientation: Orientation, report: &mut Vec<SanityError>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let rect = node.sizing.geometry;
        let visible = self.visible_children(id);

        let expected = visible.len().saturating_sub(1);
        let actual = self.separators(id).len();
        if actual != expected {
            report.push(SanityError::new(
                SanityCode::SeparatorCount,
                Some(id),
                format!("{actual} separators for {} visible children", visible.len()),
            ));
        }
        if visible.is_empty() {
            return;
        }

        let thickness = self.thickness();
        let mut expected_pos = rect.pos(orientation);
        let mut total = self.separators_length(visible.len());
        let mut percentages = 0.0;
        for child in &visible {
            let Some(child_node) = self.nodes.get(child) else {
                continue;
            };
            let child_rect = child_node.sizing.geometry;
            percentages += child_node.sizing.percentage_within_parent;
            total += child_rect.length(orientation);

            if !rect.contains_rect(&child_rect) {
                report.push(SanityError::new(
                    SanityCode::ChildOutOfBounds,
                    Some(*child),
                    format!("{child_rect:?} outside {rect:?}"),
                ));
            }
            if child_rect.pos(orientation) != expected_pos {
                report.push(SanityError::new(
                    SanityCode::GapOrOverlap,
                    Some(*child),
                    format!(
                        "starts at {} instead of {expected_pos}",
                        child_rect.pos(orientation)
                    ),
                ));
            }
            let cross = orientation.opposite();
            if child_rect.pos(cross) != rect.pos(cross)
                || child_rect.length(cross) != rect.length(cross)
            {
                report.push(SanityError::new(
                    SanityCode::CrossExtentMismatch,
                    Some(*child),
                    format!("{child_rect:?} does not span {rect:?}"),
                ));
            }
            expected_pos = child_rect.end(orientation) + thickness;
        }

        if total != rect.length(orientation) {
            report.push(SanityError::new(
                SanityCode::LengthMismatch,
                Some(id),
                format!("children need {total}, container has {}", rect.length(orientation)),
            ));
        }
        if (percentages - 1.0).abs() > PERCENTAGE_TOLERANCE {
            report.push(SanityError::new(
                SanityCode::PercentageSum,
                Some(id),
                format!("visible percentages sum to {percentages:.4}"),
            ));
        }
    }
}
