#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Coordinates are signed pixels with the origin at the top-left corner.
//! Right and bottom edges are exclusive.

use serde::{Deserialize, Serialize};

/// Axis along which a container lays out its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Children are placed left to right.
    Horizontal,
    /// Children are placed top to bottom.
    #[default]
    Vertical,
}

impl Orientation {
    /// The other axis.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Extent of `size` along this axis.
    #[inline]
    #[must_use]
    pub const fn length(self, size: Size) -> i32 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Extent of `size` across this axis.
    #[inline]
    #[must_use]
    pub const fn cross_length(self, size: Size) -> i32 {
        self.opposite().length(size)
    }

    /// Coordinate of `point` along this axis.
    #[inline]
    #[must_use]
    pub const fn pos(self, point: Point) -> i32 {
        match self {
            Self::Horizontal => point.x,
            Self::Vertical => point.y,
        }
    }

    /// Build a size from a main-axis and a cross-axis length.
    #[inline]
    #[must_use]
    pub const fn size(self, length: i32, cross: i32) -> Size {
        match self {
            Self::Horizontal => Size::new(length, cross),
            Self::Vertical => Size::new(cross, length),
        }
    }
}

/// A point in layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Zero size.
    pub const ZERO: Self = Self::new(0, 0);

    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum.
    #[inline]
    #[must_use]
    pub fn expanded_to(self, other: Self) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Component-wise minimum.
    #[inline]
    #[must_use]
    pub fn bounded_to(self, other: Self) -> Self {
        Self::new(self.width.min(other.width), self.height.min(other.height))
    }

    /// Whether both dimensions are no larger than `other`'s.
    #[inline]
    #[must_use]
    pub const fn fits_within(self, other: Self) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    /// Whether either dimension is negative.
    #[inline]
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.width < 0 || self.height < 0
    }
}

/// An axis-aligned rectangle used for item geometry and hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether the rectangle covers no area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether `point` lies inside. Empty rectangles contain nothing.
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Whether `other` lies fully inside `self`. Edges may coincide.
    #[inline]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Overlapping region, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right > x && bottom > y).then(|| Rect::new(x, y, right - x, bottom - y))
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Start coordinate along `orientation`.
    #[inline]
    pub const fn pos(&self, orientation: Orientation) -> i32 {
        orientation.pos(self.origin())
    }

    /// Extent along `orientation`.
    #[inline]
    pub const fn length(&self, orientation: Orientation) -> i32 {
        orientation.length(self.size())
    }

    /// Exclusive end coordinate along `orientation`.
    #[inline]
    pub const fn end(&self, orientation: Orientation) -> i32 {
        self.pos(orientation).saturating_add(self.length(orientation))
    }

    /// Copy of `self` whose extent along `orientation` is replaced by
    /// `[pos, pos + length)`. The other axis is kept.
    #[must_use]
    pub const fn with_span(&self, orientation: Orientation, pos: i32, length: i32) -> Rect {
        match orientation {
            Orientation::Horizontal => Rect::new(pos, self.y, length, self.height),
            Orientation::Vertical => Rect::new(self.x, pos, self.width, length),
        }
    }

    /// Copy of `self` with the same origin and a new size.
    #[must_use]
    pub const fn with_size(&self, size: Size) -> Rect {
        Rect::new(self.x, self.y, size.width, size.height)
    }
}
