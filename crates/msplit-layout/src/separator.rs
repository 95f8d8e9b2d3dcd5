//! Separators between visible siblings and the drag session that moves them.
//!
//! Separators are derived data: [`ItemTree::rebuild_separators`] regenerates
//! them after every committed mutation, one between each pair of adjacent
//! visible children. A drag is driven through [`SeparatorDrag`], a small
//! caller-owned state machine:
//!
//! ```text
//! Idle --press--> Dragging --release--> Idle
//!                    |  \--move (button up)--> Idle (recovered)
//!                    \----move after a structural change--> Idle (canceled)
//! ```

use msplit_core::geometry::{Orientation, Rect};
use msplit_core::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::SeparatorMode;
use crate::error::LayoutError;
use crate::item::ItemId;
use crate::tree::{ItemTree, Touched};

/// Stable address of a separator: its container and its position among the
/// container's separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeparatorRef {
    pub container: ItemId,
    pub index: usize,
}

/// Divider between two adjacent visible siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separator {
    pub container: ItemId,
    pub index: usize,
    /// Axis the separator moves along (its container's orientation).
    pub axis: Orientation,
    /// Coordinate of the separator's leading edge along `axis`.
    pub position: i32,
    pub geometry: Rect,
}

impl Separator {
    #[must_use]
    pub const fn handle(&self) -> SeparatorRef {
        SeparatorRef {
            container: self.container,
            index: self.index,
        }
    }
}

impl ItemTree {
    /// Regenerate every container's separators from current geometry.
    pub(crate) fn rebuild_separators(&mut self) {
        let thickness = self.thickness();
        let containers: Vec<ItemId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.is_container())
            .map(|(id, _)| *id)
            .collect();
        for id in containers {
            let visible = self.visible_children(id);
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            let rect = node.sizing.geometry;
            let Some(axis) = node.as_container().map(|container| container.orientation) else {
                continue;
            };
            let separators: Vec<Separator> = visible
                .windows(2)
                .enumerate()
                .map(|(index, pair)| {
                    let position = self
                        .nodes
                        .get(&pair[0])
                        .map_or(0, |left| left.sizing.geometry.end(axis));
                    Separator {
                        container: id,
                        index,
                        axis,
                        position,
                        geometry: rect.with_span(axis, position, thickness),
                    }
                })
                .collect();
            if let Some(container) = self.nodes.get_mut(&id).and_then(|n| n.as_container_mut()) {
                container.separators = separators;
            }
        }
    }

    /// The visible siblings on either side of a separator.
    fn separator_neighbours(
        &self,
        separator: SeparatorRef,
    ) -> Result<(ItemId, ItemId, Orientation), LayoutError> {
        let unknown = LayoutError::UnknownSeparator { separator };
        let axis = self
            .node(separator.container)
            .and_then(|node| node.as_container())
            .map(|container| container.orientation)
            .ok_or_else(|| unknown.clone())?;
        let visible = self.visible_children(separator.container);
        match (visible.get(separator.index), visible.get(separator.index + 1)) {
            (Some(left), Some(right)) => Ok((*left, *right, axis)),
            _ => Err(unknown),
        }
    }

    /// Smallest position the separator can be dragged to.
    pub fn min_pos_for_separator(&self, separator: SeparatorRef) -> Result<i32, LayoutError> {
        let (left, _, axis) = self.separator_neighbours(separator)?;
        let rect = self.node_ref(left)?.sizing.geometry;
        Ok(rect.pos(axis) + axis.length(self.min_size(left)))
    }

    /// Largest position the separator can be dragged to.
    pub fn max_pos_for_separator(&self, separator: SeparatorRef) -> Result<i32, LayoutError> {
        let (_, right, axis) = self.separator_neighbours(separator)?;
        let rect = self.node_ref(right)?.sizing.geometry;
        Ok(rect.end(axis) - axis.length(self.min_size(right)) - self.thickness())
    }

    /// Current position of a separator.
    pub fn separator_position(&self, separator: SeparatorRef) -> Result<i32, LayoutError> {
        let (left, _, axis) = self.separator_neighbours(separator)?;
        Ok(self.node_ref(left)?.sizing.geometry.end(axis))
    }

    /// Move a separator by `delta`, clamped so neither neighbour drops below
    /// its minimum. Returns the delta actually applied.
    pub fn request_separator_move(
        &mut self,
        separator: SeparatorRef,
        delta: i32,
    ) -> Result<i32, LayoutError> {
        let (left, right, axis) = self.separator_neighbours(separator)?;
        let position = self.separator_position(separator)?;
        let min = self.min_pos_for_separator(separator)?;
        let max = self.max_pos_for_separator(separator)?;
        if min > max {
            warn!(container = separator.container.get(), min, max, "separator has no room to move");
            return Ok(0);
        }
        let applied = position.saturating_add(delta).clamp(min, max) - position;
        if applied == 0 {
            return Ok(0);
        }

        self.transact(|tree| {
            let left_rect = tree.node_ref(left)?.sizing.geometry;
            let right_rect = tree.node_ref(right)?.sizing.geometry;
            let mut touched = Touched::new();
            tree.reflow(
                left,
                left_rect.with_span(axis, left_rect.pos(axis), left_rect.length(axis) + applied),
                None,
                &mut touched,
            );
            tree.reflow(
                right,
                right_rect.with_span(
                    axis,
                    right_rect.pos(axis) + applied,
                    right_rect.length(axis) - applied,
                ),
                None,
                &mut touched,
            );
            tree.refresh_touched(&touched);
            tree.refresh_percentages(separator.container);
            trace!(
                container = separator.container.get(),
                index = separator.index,
                requested = delta,
                applied,
                "separator moved"
            );
            Ok(applied)
        })
    }
}

/// Drag lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SeparatorDragState {
    #[default]
    Idle,
    Dragging {
        separator: SeparatorRef,
        /// Separator position at press time.
        origin: i32,
        /// Position last applied to the tree.
        current: i32,
        /// Position shown to the user; ahead of `current` in lazy mode.
        preview: i32,
        /// Tree generation at press time.
        generation: u64,
    },
}

/// Why an input was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorDragNoopReason {
    IdleWithoutActiveDrag,
    AlreadyDragging,
    PositionUnchanged,
}

/// Why a drag ended without committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorCancelReason {
    /// Items were inserted, removed, shown or hidden mid-drag.
    LayoutChanged,
    SeparatorVanished,
}

/// Effect of one drag step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum SeparatorDragEffect {
    Started {
        separator: SeparatorRef,
        origin: i32,
    },
    Moved {
        separator: SeparatorRef,
        position: i32,
        applied: i32,
    },
    PreviewMoved {
        separator: SeparatorRef,
        preview: i32,
    },
    Committed {
        separator: SeparatorRef,
        origin: i32,
        end: i32,
    },
    /// A move arrived with the button already up; the release was missed.
    Recovered {
        separator: SeparatorRef,
        origin: i32,
        end: i32,
    },
    Canceled {
        separator: Option<SeparatorRef>,
        reason: SeparatorCancelReason,
    },
    Noop {
        reason: SeparatorDragNoopReason,
    },
}

/// One state-machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeparatorDragTransition {
    pub transition_id: u64,
    pub from: SeparatorDragState,
    pub to: SeparatorDragState,
    pub effect: SeparatorDragEffect,
}

/// Caller-owned drag session for one pointer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeparatorDrag {
    state: SeparatorDragState,
    mode: SeparatorMode,
    transition_counter: u64,
}

impl SeparatorDrag {
    #[must_use]
    pub const fn new(mode: SeparatorMode) -> Self {
        Self {
            state: SeparatorDragState::Idle,
            mode,
            transition_counter: 0,
        }
    }

    /// Session using the tree's configured mode.
    #[must_use]
    pub const fn for_tree(tree: &ItemTree) -> Self {
        Self::new(tree.config.separator_mode)
    }

    #[must_use]
    pub const fn state(&self) -> SeparatorDragState {
        self.state
    }

    #[must_use]
    pub const fn mode(&self) -> SeparatorMode {
        self.mode
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, SeparatorDragState::Dragging { .. })
    }

    /// Start dragging `separator`.
    pub fn on_press(
        &mut self,
        tree: &mut ItemTree,
        separator: SeparatorRef,
    ) -> Result<SeparatorDragTransition, LayoutError> {
        let from = self.state;
        if self.is_dragging() {
            return Ok(self.finish(
                from,
                SeparatorDragEffect::Noop {
                    reason: SeparatorDragNoopReason::AlreadyDragging,
                },
            ));
        }
        let origin = tree.separator_position(separator)?;
        self.state = SeparatorDragState::Dragging {
            separator,
            origin,
            current: origin,
            preview: origin,
            generation: tree.generation(),
        };
        tree.active_drag = Some(separator);
        debug!(container = separator.container.get(), index = separator.index, origin, "drag started");
        Ok(self.finish(from, SeparatorDragEffect::Started { separator, origin }))
    }

    /// Follow the pointer to `position` along the separator's axis.
    ///
    /// `button_held == false` means the release was lost somewhere upstream;
    /// the drag is finished as if it had arrived.
    pub fn on_move(
        &mut self,
        tree: &mut ItemTree,
        position: i32,
        button_held: bool,
    ) -> Result<SeparatorDragTransition, LayoutError> {
        let from = self.state;
        let SeparatorDragState::Dragging {
            separator,
            origin,
            current,
            preview,
            generation,
        } = self.state
        else {
            return Ok(self.finish(
                from,
                SeparatorDragEffect::Noop {
                    reason: SeparatorDragNoopReason::IdleWithoutActiveDrag,
                },
            ));
        };

        if let Some(reason) = self.stale(tree, separator, generation) {
            return Ok(self.cancel(tree, from, separator, reason));
        }

        if !button_held {
            warn!(
                container = separator.container.get(),
                index = separator.index,
                "move without button held; recovering missed release"
            );
            let end = self.apply_preview(tree, separator, current, preview)?;
            self.state = SeparatorDragState::Idle;
            tree.active_drag = None;
            return Ok(self.finish(
                from,
                SeparatorDragEffect::Recovered {
                    separator,
                    origin,
                    end,
                },
            ));
        }

        let min = tree.min_pos_for_separator(separator)?;
        let max = tree.max_pos_for_separator(separator)?;
        let target = if min > max {
            current
        } else {
            position.clamp(min, max)
        };

        match self.mode {
            SeparatorMode::Lazy => {
                if target == preview {
                    return Ok(self.unchanged(from));
                }
                self.state = SeparatorDragState::Dragging {
                    separator,
                    origin,
                    current,
                    preview: target,
                    generation,
                };
                Ok(self.finish(
                    from,
                    SeparatorDragEffect::PreviewMoved {
                        separator,
                        preview: target,
                    },
                ))
            }
            SeparatorMode::Immediate => {
                let now = tree.separator_position(separator)?;
                if target == now {
                    return Ok(self.unchanged(from));
                }
                let applied = tree.request_separator_move(separator, target - now)?;
                let position = now + applied;
                self.state = SeparatorDragState::Dragging {
                    separator,
                    origin,
                    current: position,
                    preview: position,
                    generation,
                };
                Ok(self.finish(
                    from,
                    SeparatorDragEffect::Moved {
                        separator,
                        position,
                        applied,
                    },
                ))
            }
        }
    }

    /// Finish the drag. Lazy sessions apply their preview here.
    pub fn on_release(
        &mut self,
        tree: &mut ItemTree,
    ) -> Result<SeparatorDragTransition, LayoutError> {
        let from = self.state;
        let SeparatorDragState::Dragging {
            separator,
            origin,
            current,
            preview,
            generation,
        } = self.state
        else {
            return Ok(self.finish(
                from,
                SeparatorDragEffect::Noop {
                    reason: SeparatorDragNoopReason::IdleWithoutActiveDrag,
                },
            ));
        };
        if let Some(reason) = self.stale(tree, separator, generation) {
            return Ok(self.cancel(tree, from, separator, reason));
        }
        let end = self.apply_preview(tree, separator, current, preview)?;
        self.state = SeparatorDragState::Idle;
        tree.active_drag = None;
        debug!(container = separator.container.get(), index = separator.index, origin, end, "drag committed");
        Ok(self.finish(
            from,
            SeparatorDragEffect::Committed {
                separator,
                origin,
                end,
            },
        ))
    }

    fn stale(
        &self,
        tree: &ItemTree,
        separator: SeparatorRef,
        generation: u64,
    ) -> Option<SeparatorCancelReason> {
        if tree.generation() != generation {
            Some(SeparatorCancelReason::LayoutChanged)
        } else if tree.separator(separator).is_none() {
            Some(SeparatorCancelReason::SeparatorVanished)
        } else {
            None
        }
    }

    fn apply_preview(
        &self,
        tree: &mut ItemTree,
        separator: SeparatorRef,
        current: i32,
        preview: i32,
    ) -> Result<i32, LayoutError> {
        if self.mode != SeparatorMode::Lazy || preview == current {
            return Ok(current);
        }
        let now = tree.separator_position(separator)?;
        let applied = tree.request_separator_move(separator, preview - now)?;
        Ok(now + applied)
    }

    fn cancel(
        &mut self,
        tree: &mut ItemTree,
        from: SeparatorDragState,
        separator: SeparatorRef,
        reason: SeparatorCancelReason,
    ) -> SeparatorDragTransition {
        debug!(container = separator.container.get(), index = separator.index, ?reason, "drag canceled");
        self.state = SeparatorDragState::Idle;
        tree.active_drag = None;
        self.finish(
            from,
            SeparatorDragEffect::Canceled {
                separator: Some(separator),
                reason,
            },
        )
    }

    fn unchanged(&mut self, from: SeparatorDragState) -> SeparatorDragTransition {
        self.finish(
            from,
            SeparatorDragEffect::Noop {
                reason: SeparatorDragNoopReason::PositionUnchanged,
            },
        )
    }

    fn finish(
        &mut self,
        from: SeparatorDragState,
        effect: SeparatorDragEffect,
    ) -> SeparatorDragTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        SeparatorDragTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state,
            effect,
        }
    }
}
