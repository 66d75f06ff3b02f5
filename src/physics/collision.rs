//! Obstacle geometry: line segments and the pure predicates the
//! collision resolver is built on.
//!
//! All arithmetic is exact: orientation tests run in `i64`, so no
//! collision decision ever depends on floating-point rounding. The only
//! float involved is the slope angle used for walkability classification.

use crate::math::{Angle, Rect, Vec2};

/// Index of a segment in the level's obstacle list.
///
/// Segment lists are immutable for the lifetime of a level, so a plain
/// index is a stable identity.
pub type SegmentId = usize;

/// One obstacle edge: a directed line between two pixel coordinates.
///
/// A segment is not inherently a floor, wall or ceiling; the resolver
/// classifies it per contact from its slope and the body's motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub p1: Vec2,
    pub p2: Vec2,
}

impl Segment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Segment {
            p1: Vec2::new(x1, y1),
            p2: Vec2::new(x2, y2),
        }
    }

    pub fn from_points(p1: Vec2, p2: Vec2) -> Self {
        Segment { p1, p2 }
    }

    #[inline]
    pub fn min_x(&self) -> i32 {
        self.p1.x.min(self.p2.x)
    }

    #[inline]
    pub fn max_x(&self) -> i32 {
        self.p1.x.max(self.p2.x)
    }

    #[inline]
    pub fn min_y(&self) -> i32 {
        self.p1.y.min(self.p2.y)
    }

    #[inline]
    pub fn max_y(&self) -> i32 {
        self.p1.y.max(self.p2.y)
    }

    /// Angle of the segment from horizontal, ignoring direction.
    /// A flat floor is 0°, a vertical wall 90°.
    pub fn slope_angle(&self) -> Angle {
        let dx = (self.p2.x - self.p1.x).abs() as f64;
        let dy = (self.p2.y - self.p1.y).abs() as f64;
        Angle::Rad(dy.atan2(dx))
    }

    /// Whether a body can stand on this segment. The boundary is
    /// inclusive: a slope at exactly the maximum angle is walkable.
    pub fn is_walkable(&self, max_angle: Angle) -> bool {
        self.slope_angle().deg() <= max_angle.deg()
    }

    /// The over/under test: true if the rectangle's horizontal span
    /// overlaps this segment's horizontal span, i.e. some part of the
    /// rectangle is directly above or below the segment.
    pub fn x_overlaps(&self, rect: &Rect) -> bool {
        rect.right() >= self.min_x() && self.max_x() >= rect.x
    }

    /// Exact segment-segment intersection, endpoints and collinear
    /// overlap included.
    pub fn crosses(&self, other: &Segment) -> bool {
        segments_intersect(self.p1, self.p2, other.p1, other.p2)
    }

    /// True if the segment touches the closed box of `rect` anywhere:
    /// an endpoint inside the box, a crossing of the interior, or a mere
    /// touch of the boundary all count.
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        // span reject
        if self.max_x() < rect.x
            || self.min_x() > rect.right()
            || self.max_y() < rect.y
            || self.min_y() > rect.bottom()
        {
            return false;
        }
        if rect.contains(self.p1.x, self.p1.y) || rect.contains(self.p2.x, self.p2.y) {
            return true;
        }
        // both endpoints outside: the segment must cross an edge to touch
        let tl = Vec2::new(rect.x, rect.y);
        let tr = Vec2::new(rect.right(), rect.y);
        let br = Vec2::new(rect.right(), rect.bottom());
        let bl = Vec2::new(rect.x, rect.bottom());
        let edges = [(tl, tr), (tr, br), (br, bl), (bl, tl)];
        edges
            .iter()
            .any(|&(a, b)| segments_intersect(self.p1, self.p2, a, b))
    }
}

/// Twice the signed area of the triangle `a`, `b`, `c`.
/// Positive when `c` is on the left of `a -> b` in screen coordinates.
#[inline]
fn orient(a: Vec2, b: Vec2, c: Vec2) -> i64 {
    let abx = (b.x - a.x) as i64;
    let aby = (b.y - a.y) as i64;
    let acx = (c.x - a.x) as i64;
    let acy = (c.y - a.y) as i64;
    abx * acy - aby * acx
}

/// Assuming `p` is collinear with `a -> b`, is it within the span?
#[inline]
fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Segment intersection via orientation tests, touching included.
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = orient(b1, b2, a1);
    let d2 = orient(b1, b2, a2);
    let d3 = orient(a1, a2, b1);
    let d4 = orient(a1, a2, b2);

    if ((d1 > 0 && d2 < 0) || (d1 < 0 && d2 > 0)) && ((d3 > 0 && d4 < 0) || (d3 < 0 && d4 > 0)) {
        return true;
    }
    (d1 == 0 && on_segment(b1, b2, a1))
        || (d2 == 0 && on_segment(b1, b2, a2))
        || (d3 == 0 && on_segment(a1, a2, b1))
        || (d4 == 0 && on_segment(a1, a2, b2))
}
