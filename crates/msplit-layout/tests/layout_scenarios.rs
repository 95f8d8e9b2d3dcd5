//! End-to-end layout scenarios.

use std::collections::BTreeMap;

use msplit_layout::{
    Guest, GuestItem, GuestKey, InsertOptions, ItemId, ItemTree, LayoutConfig, LayoutError,
    LayoutEvent, Location, Orientation, Rect, SanityCode, SeparatorDrag, SeparatorDragEffect,
    SeparatorMode, SeparatorRef, Size, SnapshotError,
};

const ST: i32 = 5;

fn item(name: &str) -> GuestItem {
    GuestItem::new(name, Size::new(100, 100))
}

fn add(tree: &mut ItemTree, name: &str, location: Location, relative_to: Option<ItemId>) -> ItemId {
    tree.insert_item(item(name), location, relative_to, InsertOptions::default())
        .expect("insert")
}

fn width(tree: &ItemTree, id: ItemId) -> i32 {
    tree.geometry(id).map_or(0, |rect| rect.width)
}

fn assert_round_trips(tree: &ItemTree) {
    let value = tree.to_value().expect("serialize");
    let restored = ItemTree::from_value(value).expect("deserialize");
    assert_eq!(restored.to_snapshot(), tree.to_snapshot());
}

#[test]
fn three_side_by_side_share_the_width() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = add(&mut tree, "a", Location::Left, None);
    let b = add(&mut tree, "b", Location::Right, None);
    let c = add(&mut tree, "c", Location::Right, None);

    assert_eq!(tree.children(tree.root()), &[a, b, c]);
    assert_eq!(width(&tree, a) + width(&tree, b) + width(&tree, c), 1000 - 2 * ST);
    let rects: Vec<Rect> = [a, b, c].iter().filter_map(|id| tree.geometry(*id)).collect();
    for pair in rects.windows(2) {
        assert!(pair[0].intersection(&pair[1]).is_none());
        assert_eq!(pair[0].right() + ST, pair[1].x);
    }
    for rect in &rects {
        assert_eq!(rect.height, 1000);
    }
    assert!(tree.check_sanity().is_ok());
    assert_round_trips(&tree);
}

#[test]
fn orthogonal_insert_nests_exactly_one_container() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = add(&mut tree, "a", Location::Left, None);
    let b = add(&mut tree, "b", Location::Right, None);
    let c = add(&mut tree, "c", Location::Bottom, Some(a));

    let root = tree.root();
    assert_eq!(tree.orientation(root), Some(Orientation::Horizontal));
    let column = tree.parent(a).expect("nested");
    assert_ne!(column, root);
    assert_eq!(tree.parent(c), Some(column));
    assert_eq!(tree.orientation(column), Some(Orientation::Vertical));
    assert_eq!(tree.children(root), &[column, b]);
    assert_eq!(tree.children(column), &[a, c]);
    assert!(tree.children(a).is_empty() && tree.children(b).is_empty());

    let col = tree.geometry(column).expect("column rect");
    let (ra, rc) = (tree.geometry(a).expect("a"), tree.geometry(c).expect("c"));
    assert_eq!(ra.width, col.width);
    assert_eq!(ra.height + rc.height + ST, 1000);
    assert!(tree.check_sanity().is_ok());
    assert_round_trips(&tree);
}

#[test]
fn resize_below_minimum_is_rejected() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    for name in ["a", "b"] {
        tree.insert_item(
            GuestItem::new(name, Size::new(500, 500)),
            Location::Right,
            None,
            InsertOptions::default(),
        )
        .expect("insert");
    }
    // Two 500-wide minimums plus a separator do not fit in 1000.
    let size = tree.root_size();
    assert_eq!(size, Size::new(1005, 1000));

    let err = tree.resize(Size::new(999, 1000)).expect_err("too small");
    assert_eq!(
        err,
        LayoutError::ResizeBelowMinimum {
            requested: Size::new(999, 1000),
            minimum: Size::new(1005, 500),
        }
    );
    assert_eq!(tree.root_size(), size);
    assert!(tree.check_sanity().is_ok());
}

#[test]
fn placeholder_width_goes_to_its_neighbours() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = add(&mut tree, "a", Location::Left, None);
    let b = add(&mut tree, "b", Location::Right, None);
    let c = add(&mut tree, "c", Location::Right, None);
    let (wa, wb, wc) = (width(&tree, a), width(&tree, b), width(&tree, c));

    tree.turn_into_placeholder(b).expect("hide");
    assert_eq!(tree.visible_count(), 2);
    assert_eq!(tree.count(), 3);
    let gained = (width(&tree, a) - wa) + (width(&tree, c) - wc);
    assert_eq!(gained, wb + ST);
    assert!(tree.check_sanity().is_ok());
    assert_round_trips(&tree);
}

#[test]
fn removing_sole_sibling_hoists_into_grandparent() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = add(&mut tree, "a", Location::Left, None);
    let b = add(&mut tree, "b", Location::Right, None);
    let c = add(&mut tree, "c", Location::Bottom, Some(b));
    let column = tree.parent(b).expect("column");
    let column_rect = tree.geometry(column).expect("column rect");

    tree.remove_item(b).expect("remove");
    assert!(!tree.contains(column));
    assert_eq!(tree.children(tree.root()), &[a, c]);
    assert_eq!(tree.geometry(c), Some(column_rect));
    assert!(tree.check_sanity().is_ok());
}

#[test]
fn root_absorbs_its_only_container() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = add(&mut tree, "a", Location::Left, None);
    let b = add(&mut tree, "b", Location::Right, None);
    let row = [tree.geometry(a), tree.geometry(b)];
    let c = add(&mut tree, "c", Location::Bottom, None);
    let wrapper = tree.parent(a).expect("wrapper");
    assert_ne!(wrapper, tree.root());

    tree.remove_item(c).expect("remove");
    let root = tree.root();
    assert!(!tree.contains(wrapper));
    assert_eq!(tree.children(root), &[a, b]);
    assert_eq!(tree.orientation(root), Some(Orientation::Horizontal));
    assert_eq!([tree.geometry(a), tree.geometry(b)], row);
    assert_eq!(tree.separators(root).len(), 1);

    let d = add(&mut tree, "d", Location::Right, None);
    assert_eq!(tree.children(root), &[a, b, d]);
    assert!(tree.check_sanity().is_ok());
    assert_round_trips(&tree);
}

#[test]
fn same_axis_container_target_takes_the_item_directly() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = add(&mut tree, "a", Location::Left, None);
    let b = add(&mut tree, "b", Location::Right, None);
    add(&mut tree, "c", Location::Bottom, None);
    let row = tree.parent(a).expect("row");
    let count = tree.items().len();

    let d = add(&mut tree, "d", Location::Left, Some(row));
    assert_eq!(tree.parent(d), Some(row));
    assert_eq!(tree.children(row), &[d, a, b]);
    assert_eq!(tree.orientation(row), Some(Orientation::Horizontal));
    assert_eq!(tree.items().len(), count + 1);
    assert_eq!(tree.geometry(d).map(|r| r.x), Some(0));
    assert!(tree.check_sanity().is_ok());
    assert_round_trips(&tree);
}

#[test]
fn absorbed_row_merges_into_a_row() {
    let mut other = ItemTree::new(Size::new(600, 400));
    add(&mut other, "x", Location::Left, None);
    add(&mut other, "y", Location::Right, None);

    let mut tree = ItemTree::new(Size::new(1200, 400));
    let a = add(&mut tree, "a", Location::Left, None);
    let holder = tree
        .insert_tree(other, Location::Right, None, InsertOptions::default())
        .expect("absorb");
    let root = tree.root();
    assert_eq!(holder, root);
    assert_eq!(tree.children(root).len(), 3);
    assert_eq!(tree.children(root)[0], a);
    assert!(tree.children(root).iter().all(|id| tree.orientation(*id).is_none()));
    assert!(tree.check_sanity().is_ok());
}

#[test]
fn separator_count_tracks_visible_children() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    assert_eq!(tree.separators_recursive().len(), 0);
    add(&mut tree, "1", Location::Left, None);
    assert_eq!(tree.separators_recursive().len(), 0);
    add(&mut tree, "2", Location::Left, None);
    assert_eq!(tree.separators_recursive().len(), 1);
    let i3 = add(&mut tree, "3", Location::Top, None);
    assert_eq!(tree.separators_recursive().len(), 2);
    add(&mut tree, "4", Location::Right, Some(i3));
    assert_eq!(tree.separators_recursive().len(), 3);

    tree.remove_item(i3).expect("remove");
    assert_eq!(tree.separators_recursive().len(), 2);

    tree.clear().expect("clear");
    assert_eq!(tree.separators_recursive().len(), 0);

    add(&mut tree, "5", Location::Left, None);
    tree.insert_item(item("6"), Location::Left, None, InsertOptions::hidden())
        .expect("hidden insert");
    assert_eq!(tree.separators_recursive().len(), 0);
    assert_round_trips(&tree);
}

#[test]
fn separator_bounds_follow_minimums() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = add(&mut tree, "a", Location::Left, None);
    let b = add(&mut tree, "b", Location::Left, None);
    tree.set_min_size(a, Size::new(200, 200)).expect("min a");
    tree.set_min_size(b, Size::new(200, 200)).expect("min b");

    let separator = tree.separators_recursive()[0].handle();
    assert_eq!(tree.min_pos_for_separator(separator), Ok(200));
    assert_eq!(tree.max_pos_for_separator(separator), Ok(1000 - ST - 200));
}

#[test]
fn hiding_everything_in_a_row_keeps_a_sane_tree() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = add(&mut tree, "a", Location::Left, None);
    tree.turn_into_placeholder(a).expect("hide");
    assert_eq!(tree.visible_count(), 0);
    assert_eq!(tree.count(), 1);
    assert!(tree.check_sanity().is_ok());

    let b = add(&mut tree, "b", Location::Left, None);
    let c = add(&mut tree, "c", Location::Left, None);
    assert_eq!(width(&tree, b) + width(&tree, c) + ST, 1000);
    tree.turn_into_placeholder(b).expect("hide b");
    assert_eq!(width(&tree, c), 1000);
    assert_round_trips(&tree);
}

#[test]
fn nested_container_hides_with_its_leaves() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = add(&mut tree, "a", Location::Left, None);
    let b = add(&mut tree, "b", Location::Right, None);
    let c = add(&mut tree, "c", Location::Bottom, Some(b));
    tree.turn_into_placeholder(b).expect("hide b");
    assert!(tree.check_sanity().is_ok());
    tree.turn_into_placeholder(c).expect("hide c");
    assert!(tree.check_sanity().is_ok());
    assert_eq!(width(&tree, a), 1000);
    assert_round_trips(&tree);
}

#[test]
fn layout_grows_to_fit_large_minimums() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = tree
        .insert_item(
            GuestItem::new("a", Size::new(2000, 500)),
            Location::Left,
            None,
            InsertOptions::default(),
        )
        .expect("a");
    assert_eq!(tree.root_size(), Size::new(2000, 1000));
    assert_eq!(tree.geometry(a).map(|r| r.size()), Some(Size::new(2000, 1000)));
    assert_eq!(tree.min_size(tree.root()), Size::new(2000, 500));

    tree.insert_item(
        GuestItem::new("b", Size::new(2000, 2000)),
        Location::Right,
        None,
        InsertOptions::default(),
    )
    .expect("b");
    assert_eq!(tree.root_size(), Size::new(2000 + 2000 + ST, 2000));
    assert!(tree
        .drain_events()
        .iter()
        .any(|event| matches!(event, LayoutEvent::RootResized { .. })));
    assert_round_trips(&tree);
}

#[test]
fn min_size_changes_grow_the_root() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = tree
        .insert_item(
            GuestItem::new("a", Size::new(50, 50)),
            Location::Left,
            None,
            InsertOptions::default(),
        )
        .expect("a");
    tree.resize(Size::new(200, 200)).expect("shrink");
    tree.set_guest_min_size(&GuestKey::new("a"), Size::new(300, 300))
        .expect("grow minimum");
    assert_eq!(tree.root_size(), Size::new(300, 300));

    add(&mut tree, "b", Location::Top, None);
    assert!(tree.check_sanity().is_ok());
    tree.resize(Size::new(1000, 1000)).expect("grow");
    tree.set_min_size(a, Size::new(700, 700)).expect("bigger minimum");
    assert_eq!(tree.root_size(), Size::new(1000, 1000));
    assert!(tree.geometry(a).is_some_and(|r| r.height >= 700));
    assert!(tree.check_sanity().is_ok());
    assert_round_trips(&tree);
}

#[test]
fn resize_keeps_proportions() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = add(&mut tree, "a", Location::Left, None);
    let b = add(&mut tree, "b", Location::Right, None);
    let c = add(&mut tree, "c", Location::Right, None);
    let before: Vec<f64> = [a, b, c]
        .iter()
        .map(|id| f64::from(width(&tree, *id)) / 1000.0)
        .collect();

    tree.resize(Size::new(2000, 505)).expect("resize");
    for (id, share) in [a, b, c].iter().zip(before) {
        let now = f64::from(width(&tree, *id)) / 2000.0;
        assert!((now - share).abs() < 0.01, "{now} vs {share}");
        assert_eq!(tree.geometry(*id).map(|r| r.height), Some(505));
    }

    add(&mut tree, "c1", Location::Bottom, Some(c));
    tree.resize(Size::new(2500, 505)).expect("resize again");
    assert!(tree.check_sanity().is_ok());
    assert_round_trips(&tree);
}

#[test]
fn absorbing_another_layout_keeps_its_shape() {
    let mut other = ItemTree::new(Size::new(1000, 1000));
    let x = add(&mut other, "x", Location::Left, None);
    add(&mut other, "y", Location::Right, None);
    add(&mut other, "z", Location::Bottom, Some(x));

    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = add(&mut tree, "a", Location::Top, None);
    let top = tree
        .insert_tree(other, Location::Bottom, None, InsertOptions::default())
        .expect("absorb");
    assert_eq!(tree.orientation(top), Some(Orientation::Horizontal));
    assert_eq!(tree.children(tree.root()), &[a, top]);
    assert_eq!(tree.count(), 4);
    for guest in ["x", "y", "z"] {
        assert!(tree.item_for_guest(&GuestKey::new(guest)).is_some());
    }
    assert!(tree.check_sanity().is_ok());
    assert_round_trips(&tree);
}

#[test]
fn drop_rect_previews_insertions() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    let a = add(&mut tree, "a", Location::Left, None);
    add(&mut tree, "b", Location::Right, None);

    let rect = tree
        .suggested_drop_rect(Size::new(100, 100), None, Location::Top)
        .expect("root rect");
    assert_eq!(rect, Rect::new(0, 0, 1000, 333));

    let rect = tree
        .suggested_drop_rect(Size::new(100, 100), Some(a), Location::Bottom)
        .expect("item rect");
    let ra = tree.geometry(a).expect("a");
    assert_eq!(rect.x, ra.x);
    assert_eq!(rect.width, ra.width);
    assert_eq!(rect.bottom(), ra.bottom());
    assert!(ra.contains_rect(&rect));
}

#[test]
fn immediate_and_lazy_drags_agree() {
    let run = |mode: SeparatorMode| {
        let config = LayoutConfig::default().with_separator_mode(mode);
        let mut tree = ItemTree::with_config(Size::new(1000, 500), config);
        let a = add(&mut tree, "a", Location::Left, None);
        add(&mut tree, "b", Location::Right, None);
        let sep = SeparatorRef {
            container: tree.root(),
            index: 0,
        };
        let mut drag = SeparatorDrag::for_tree(&tree);
        drag.on_press(&mut tree, sep).expect("press");
        for position in [450, 300, 50, 250] {
            drag.on_move(&mut tree, position, true).expect("move");
        }
        let release = drag.on_release(&mut tree).expect("release");
        assert!(matches!(release.effect, SeparatorDragEffect::Committed { end: 250, .. }));
        (width(&tree, a), tree.to_snapshot())
    };
    let (immediate_width, immediate) = run(SeparatorMode::Immediate);
    let (lazy_width, lazy) = run(SeparatorMode::Lazy);
    assert_eq!(immediate_width, 250);
    assert_eq!(lazy_width, 250);
    assert_eq!(immediate.root, lazy.root);
}

#[test]
fn events_reach_guests() {
    #[derive(Default)]
    struct Pane {
        visible: bool,
        geometry: Rect,
    }
    impl Guest for Pane {
        fn key(&self) -> GuestKey {
            GuestKey::new("pane")
        }
        fn minimum_size(&self) -> Size {
            Size::ZERO
        }
        fn set_visible(&mut self, visible: bool) {
            self.visible = visible;
        }
        fn set_geometry(&mut self, geometry: Rect) {
            self.geometry = geometry;
        }
    }

    let mut guests = BTreeMap::new();
    guests.insert(GuestKey::new("pane"), Pane::default());
    let mut tree = ItemTree::new(Size::new(640, 480));
    let id = tree
        .insert_guest(&guests[&GuestKey::new("pane")], Location::Left, None, InsertOptions::default())
        .expect("insert guest");
    assert_eq!(
        tree.node(id).map(|node| node.sizing.min_size),
        Some(tree.config().default_min_size)
    );
    assert!(tree.dispatch_events(&mut guests) >= 2);
    let pane = &guests[&GuestKey::new("pane")];
    assert!(pane.visible);
    assert_eq!(pane.geometry, Rect::new(0, 0, 640, 480));

    tree.remove_guest(&GuestKey::new("pane")).expect("remove");
    tree.dispatch_events(&mut guests);
    assert!(!guests[&GuestKey::new("pane")].visible);
}

#[test]
fn corrupt_snapshots_are_rejected() {
    let mut tree = ItemTree::new(Size::new(1000, 1000));
    add(&mut tree, "a", Location::Left, None);
    add(&mut tree, "b", Location::Right, None);

    let mut value = tree.to_value().expect("value");
    value["root"]["children"][0]["kind"] = serde_json::json!("container");
    value["root"]["children"][0]["orientation"] = serde_json::json!("vertical");
    match ItemTree::from_value(value) {
        Err(LayoutError::Snapshot(SnapshotError::ContainerWithGuest { path })) => {
            assert_eq!(path, "root/0");
        }
        other => panic!("unexpected {other:?}"),
    }

    let mut value = tree.to_value().expect("value");
    value["root"]["children"][1]["geometry"]["x"] = serde_json::json!(400);
    match ItemTree::from_value(value) {
        Err(LayoutError::Snapshot(SnapshotError::Sanity(error))) => {
            assert_eq!(error.code, SanityCode::GapOrOverlap);
        }
        other => panic!("unexpected {other:?}"),
    }
}
