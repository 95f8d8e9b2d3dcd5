//! Change notifications queued by mutations and drained by the host.

use msplit_core::geometry::{Rect, Size};
use serde::{Deserialize, Serialize};

use crate::item::{GuestKey, GuestRegistry, ItemId};

/// One observable change produced by a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LayoutEvent {
    /// Leaf count or visible-leaf count changed.
    ItemsChanged { count: usize, visible: usize },
    /// The root was resized, either by the caller or to satisfy minimums.
    RootResized { from: Size, to: Size },
    /// A visible leaf got new geometry.
    GeometryChanged {
        item: ItemId,
        guest: Option<GuestKey>,
        geometry: Rect,
    },
    /// A leaf was shown or turned into a placeholder.
    VisibilityChanged {
        item: ItemId,
        guest: Option<GuestKey>,
        visible: bool,
    },
    /// A leaf left the tree. Its guest is detached, not destroyed.
    ItemRemoved {
        item: ItemId,
        guest: Option<GuestKey>,
    },
}

impl LayoutEvent {
    /// Guest the event concerns, if any.
    #[must_use]
    pub fn guest(&self) -> Option<&GuestKey> {
        match self {
            Self::GeometryChanged { guest, .. }
            | Self::VisibilityChanged { guest, .. }
            | Self::ItemRemoved { guest, .. } => guest.as_ref(),
            Self::ItemsChanged { .. } | Self::RootResized { .. } => None,
        }
    }
}

/// Forward guest-facing events to the registry. Returns how many guest
/// calls were made.
pub(crate) fn dispatch(events: &[LayoutEvent], registry: &mut dyn GuestRegistry) -> usize {
    let mut calls = 0;
    for event in events {
        let Some(key) = event.guest() else { continue };
        let Some(guest) = registry.guest_mut(key) else {
            continue;
        };
        match event {
            LayoutEvent::GeometryChanged { geometry, .. } => guest.set_geometry(*geometry),
            LayoutEvent::VisibilityChanged { visible, .. } => guest.set_visible(*visible),
            LayoutEvent::ItemRemoved { .. } => guest.set_visible(false),
            LayoutEvent::ItemsChanged { .. } | LayoutEvent::RootResized { .. } => continue,
        }
        calls += 1;
    }
    calls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Guest;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct Panel {
        visible: bool,
        geometry: Rect,
    }

    impl Guest for Panel {
        fn key(&self) -> GuestKey {
            GuestKey::new("panel")
        }
        fn minimum_size(&self) -> Size {
            Size::new(10, 10)
        }
        fn set_visible(&mut self, visible: bool) {
            self.visible = visible;
        }
        fn set_geometry(&mut self, geometry: Rect) {
            self.geometry = geometry;
        }
    }

    #[test]
    fn dispatch_reaches_known_guests_only() {
        let mut registry = BTreeMap::new();
        registry.insert(GuestKey::new("panel"), Panel::default());
        let item = ItemId::MIN;
        let events = vec![
            LayoutEvent::VisibilityChanged {
                item,
                guest: Some(GuestKey::new("panel")),
                visible: true,
            },
            LayoutEvent::GeometryChanged {
                item,
                guest: Some(GuestKey::new("panel")),
                geometry: Rect::new(0, 0, 50, 60),
            },
            LayoutEvent::GeometryChanged {
                item,
                guest: Some(GuestKey::new("ghost")),
                geometry: Rect::new(0, 0, 1, 1),
            },
            LayoutEvent::ItemsChanged {
                count: 1,
                visible: 1,
            },
        ];
        assert_eq!(dispatch(&events, &mut registry), 2);
        let panel = &registry[&GuestKey::new("panel")];
        assert!(panel.visible);
        assert_eq!(panel.geometry, Rect::new(0, 0, 50, 60));
    }
}
