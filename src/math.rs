//! Types, aliases and helper operations for integer pixel-space math.
//!
//! The world is measured in whole pixels: x grows rightward, y grows
//! downward (screen coordinates), so a positive y velocity means falling.
use std::f64::consts::PI;

/// Positions, sizes and velocities are whole pixels.
pub type Vec2 = ultraviolet::int::IVec2;

/// An angle in either degrees or radians.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Angle {
    Rad(f64),
    Deg(f64),
}

impl Angle {
    /// Get the angle as degrees.
    #[inline]
    pub fn deg(&self) -> f64 {
        match self {
            Angle::Rad(rad) => rad * 180.0 / PI,
            Angle::Deg(deg) => *deg,
        }
    }

    /// Get the angle as radians.
    #[inline]
    pub fn rad(&self) -> f64 {
        match self {
            Angle::Rad(rad) => *rad,
            Angle::Deg(deg) => deg * PI / 180.0,
        }
    }
}

impl Default for Angle {
    fn default() -> Self {
        Angle::Rad(0.0)
    }
}

/// An axis-aligned rectangle in pixel coordinates.
///
/// The covered region is the closed box from `(x, y)` to
/// `(x + w, y + h)`; collision predicates treat the boundary as solid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// Create a rectangle. Zero or negative sizes are clamped to 1
    /// so no degenerate hitboxes enter the simulation.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect {
            x,
            y,
            w: w.max(1),
            h: h.max(1),
        }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// True if the interiors of the two rectangles overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True if the point lies inside the closed box.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// The smallest rectangle covering a body's position both before and
    /// after a move. The span is padded by the body's own size so that a
    /// displacement larger than an obstacle's thickness still sweeps over it.
    pub fn sweep_union(before: &Rect, after: &Rect) -> Rect {
        let x_min = before.x.min(after.x);
        let x_max = before.x.max(after.x);
        let y_min = before.y.min(after.y);
        let y_max = before.y.max(after.y);
        Rect {
            x: x_min,
            y: y_min,
            w: (x_max - x_min) + after.w,
            h: (y_max - y_min) + after.h,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_size_is_clamped() {
        let r = Rect::new(5, 5, 0, -3);
        assert_eq!((r.w, r.h), (1, 1));
    }

    #[test]
    fn sweep_union_covers_both_ends() {
        let before = Rect::new(0, 0, 10, 10);
        let after = Rect::new(0, 30, 10, 10);
        let u = Rect::sweep_union(&before, &after);
        assert_eq!(u, Rect::new(0, 0, 10, 40));
        // a stationary body sweeps exactly its own box
        let still = Rect::sweep_union(&before, &before);
        assert_eq!(still, before);
    }

    #[test]
    fn angle_conversions() {
        assert_eq!(Angle::Deg(45.0).deg(), 45.0);
        assert!((Angle::Deg(180.0).rad() - PI).abs() < 1e-12);
        assert!((Angle::Rad(PI / 2.0).deg() - 90.0).abs() < 1e-12);
    }
}
