//! Property-based invariant tests for geometry primitives (Rect, Size, Orientation).
//!
//! 1. Intersection is commutative and fits within both inputs.
//! 2. Union is commutative and contains both inputs.
//! 3. A point is in the intersection iff it is in both rectangles.
//! 4. `with_span` only touches the requested axis.
//! 5. `Orientation::size` round-trips through `length`/`cross_length`.
//! 6. `expanded_to` dominates both inputs; `bounded_to` is dominated by both.

use msplit_core::geometry::{Orientation, Point, Rect, Size};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (-500i32..=500, -500i32..=500, 0i32..=500, 0i32..=500)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn size_strategy() -> impl Strategy<Value = Size> {
    (0i32..=10_000, 0i32..=10_000).prop_map(|(w, h)| Size::new(w, h))
}

fn orientation_strategy() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::Horizontal), Just(Orientation::Vertical)]
}

// ═════════════════════════════════════════════════════════════════════════
// Rect
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn intersection_commutes_and_fits(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(a.intersection(&b), b.intersection(&a));
        if let Some(i) = a.intersection(&b) {
            prop_assert!(a.contains_rect(&i));
            prop_assert!(b.contains_rect(&i));
            prop_assert!(!i.is_empty());
        }
    }

    #[test]
    fn union_commutes_and_covers(a in rect_strategy(), b in rect_strategy()) {
        let u = a.union(&b);
        prop_assert_eq!(u, b.union(&a));
        prop_assert!(u.contains_rect(&a));
        prop_assert!(u.contains_rect(&b));
    }

    #[test]
    fn contains_agrees_with_intersection(
        a in rect_strategy(),
        b in rect_strategy(),
        px in -600i32..=1100,
        py in -600i32..=1100,
    ) {
        let p = Point::new(px, py);
        let in_both = a.contains(p) && b.contains(p);
        let in_inter = a.intersection(&b).is_some_and(|i| i.contains(p));
        prop_assert_eq!(in_both, in_inter);
    }

    #[test]
    fn with_span_touches_one_axis(
        r in rect_strategy(),
        axis in orientation_strategy(),
        pos in -500i32..=500,
        len in 0i32..=500,
    ) {
        let s = r.with_span(axis, pos, len);
        prop_assert_eq!(s.pos(axis), pos);
        prop_assert_eq!(s.length(axis), len);
        prop_assert_eq!(s.pos(axis.opposite()), r.pos(axis.opposite()));
        prop_assert_eq!(s.length(axis.opposite()), r.length(axis.opposite()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Size / Orientation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn orientation_size_round_trips(
        axis in orientation_strategy(),
        main in 0i32..=10_000,
        cross in 0i32..=10_000,
    ) {
        let s = axis.size(main, cross);
        prop_assert_eq!(axis.length(s), main);
        prop_assert_eq!(axis.cross_length(s), cross);
    }

    #[test]
    fn expanded_and_bounded_are_lattice_ops(a in size_strategy(), b in size_strategy()) {
        let hi = a.expanded_to(b);
        let lo = a.bounded_to(b);
        prop_assert!(a.fits_within(hi) && b.fits_within(hi));
        prop_assert!(lo.fits_within(a) && lo.fits_within(b));
        prop_assert_eq!(hi, b.expanded_to(a));
    }
}
