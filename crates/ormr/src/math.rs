//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. glam covers the vector algebra (sum, difference,
//! scale, dot, length, `normalize_or_zero`, distance); this module adds the
//! screen-space helpers and the rectangle types used by collision and
//! rendering.
//!
//! ## Screen Convention
//!
//! Y grows downward. Angles are measured counter-clockwise *as seen on
//! screen*, which is why [`dir`] negates Y before calling `atan2` and
//! [`len_dir`] negates the sine. A sprite rotated by `PI / 2` points up.

use serde::{Deserialize, Serialize};

pub use glam::{IVec2, Mat4, Vec2, Vec3};

pub const PI: f32 = std::f32::consts::PI;

/// Linear interpolation between `a` and `b`. `t` must be in `[0, 1]`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    debug_assert!((0.0..=1.0).contains(&t), "lerp factor {t} outside [0, 1]");
    a + (b - a) * t
}

/// Component-wise [`lerp`].
pub fn lerp_vec(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    Vec2::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

/// Screen-space direction of `v` in radians.
pub fn dir(v: Vec2) -> f32 {
    (-v.y).atan2(v.x)
}

/// Vector of length `len` pointing along screen-space direction `dir`.
///
/// Inverse of [`dir`]: `len_dir(v.length(), dir(v)) ≈ v`.
pub fn len_dir(len: f32, dir: f32) -> Vec2 {
    Vec2::new(dir.cos() * len, -dir.sin() * len)
}

/// Orthographic projection with a top-left origin (`top < bottom`).
pub fn ortho_matrix(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    assert!(right > left);
    assert!(top < bottom);
    assert!(far > near);

    Mat4::orthographic_rh(left, right, bottom, top, near, far)
}

/// An axis-aligned rectangle in world units. Width and height are never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Build from a top-left position and a size.
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn top_center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y)
    }

    pub fn top_right(&self) -> Vec2 {
        Vec2::new(self.right(), self.y)
    }

    pub fn center_left(&self) -> Vec2 {
        Vec2::new(self.x, self.y + self.height * 0.5)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn center_right(&self) -> Vec2 {
        Vec2::new(self.right(), self.y + self.height * 0.5)
    }

    pub fn bottom_left(&self) -> Vec2 {
        Vec2::new(self.x, self.bottom())
    }

    pub fn bottom_center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.bottom())
    }

    pub fn bottom_right(&self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }

    /// Corners in clockwise screen order, starting top-left.
    pub fn corners(&self) -> [Vec2; 4] {
        [self.pos(), self.top_right(), self.bottom_right(), self.bottom_left()]
    }

    pub fn edges(&self) -> RectEdges {
        RectEdges {
            left: self.x,
            top: self.y,
            right: self.right(),
            bottom: self.bottom(),
        }
    }

    /// Return a copy moved by `offset`.
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Half-open containment: the left and top edges are inside, the right
    /// and bottom edges are not.
    pub fn contains_point(&self, pt: Vec2) -> bool {
        pt.x >= self.x && pt.y >= self.y && pt.x < self.right() && pt.y < self.bottom()
    }

    /// Strict overlap test. Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.y < other.bottom()
            && self.right() > other.x
            && self.bottom() > other.y
    }

    /// The smallest rectangle enclosing every rectangle in `rects`.
    ///
    /// # Panics
    ///
    /// Panics if `rects` is empty.
    pub fn spanning(rects: &[Rect]) -> Rect {
        let (first, rest) = rects
            .split_first()
            .expect("spanning rect requires at least one rect");

        let mut span = first.edges();

        for r in rest {
            span.left = span.left.min(r.x);
            span.top = span.top.min(r.y);
            span.right = span.right.max(r.right());
            span.bottom = span.bottom.max(r.bottom());
        }

        span.to_rect()
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.width >= 0.0 && self.height >= 0.0
    }
}

/// An axis-aligned rectangle on an integer grid (tiles, texture pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RectI {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl RectI {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn pos(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn top_center(&self) -> IVec2 {
        IVec2::new(self.x + self.width / 2, self.y)
    }

    pub fn top_right(&self) -> IVec2 {
        IVec2::new(self.right(), self.y)
    }

    pub fn center_left(&self) -> IVec2 {
        IVec2::new(self.x, self.y + self.height / 2)
    }

    pub fn center(&self) -> IVec2 {
        IVec2::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn center_right(&self) -> IVec2 {
        IVec2::new(self.right(), self.y + self.height / 2)
    }

    pub fn bottom_left(&self) -> IVec2 {
        IVec2::new(self.x, self.bottom())
    }

    pub fn bottom_center(&self) -> IVec2 {
        IVec2::new(self.x + self.width / 2, self.bottom())
    }

    pub fn bottom_right(&self) -> IVec2 {
        IVec2::new(self.right(), self.bottom())
    }

    /// Clamp to the grid `[0, bounds)`. The result may be empty (zero width or height).
    pub fn clamped(&self, bounds: IVec2) -> RectI {
        let left = self.x.clamp(0, bounds.x);
        let top = self.y.clamp(0, bounds.y);
        let right = self.right().clamp(left, bounds.x);
        let bottom = self.bottom().clamp(top, bounds.y);

        RectI::new(left, top, right - left, bottom - top)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x as f32, self.y as f32, self.width as f32, self.height as f32)
    }
}

/// A rectangle stored by its edges rather than position and size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RectEdges {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RectEdges {
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.right - self.left, self.bottom - self.top)
    }
}

/// A closed interval on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    /// The empty interval; growing it with any value yields `[value, value]`.
    pub const EMPTY: Self = Self {
        min: f32::MAX,
        max: f32::MIN,
    };

    pub fn include(&mut self, value: f32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Strict overlap: touching endpoints are disjoint.
    pub fn overlaps(&self, other: &Range) -> bool {
        !(self.max <= other.min || other.max <= self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp(2.0, 6.0, 0.5), 4.0);
        assert_eq!(lerp_vec(Vec2::ZERO, Vec2::new(4.0, -4.0), 0.25), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn dir_is_screen_space() {
        // Up on screen is negative Y.
        assert!((dir(Vec2::new(0.0, -1.0)) - PI / 2.0).abs() < 1e-6);
        assert!(dir(Vec2::new(1.0, 0.0)).abs() < 1e-6);
    }

    #[test]
    fn len_dir_inverts_dir() {
        let v = Vec2::new(3.0, -7.0);
        assert!(approx(len_dir(v.length(), dir(v)), v));
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalize_or_zero(), Vec2::ZERO);
    }

    #[test]
    fn point_in_rect_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains_point(Vec2::new(0.0, 0.0)));
        assert!(r.contains_point(Vec2::new(9.99, 5.0)));
        assert!(!r.contains_point(Vec2::new(10.0, 5.0)));
        assert!(!r.contains_point(Vec2::new(5.0, 10.0)));
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));

        let c = Rect::new(9.5, 9.5, 1.0, 1.0);
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }

    #[test]
    fn derived_points() {
        let r = Rect::new(2.0, 4.0, 10.0, 6.0);
        assert_eq!(r.center(), Vec2::new(7.0, 7.0));
        assert_eq!(r.bottom_right(), Vec2::new(12.0, 10.0));
        assert_eq!(r.top_center(), Vec2::new(7.0, 4.0));
        assert_eq!(r.center_left(), Vec2::new(2.0, 7.0));

        let ri = RectI::new(2, 4, 10, 7);
        assert_eq!(ri.center(), IVec2::new(7, 7));
        assert_eq!(ri.bottom_center(), IVec2::new(7, 11));
    }

    #[test]
    fn spanning_rect_encloses_all() {
        let rects = [
            Rect::new(0.0, 0.0, 4.0, 4.0),
            Rect::new(-2.0, 3.0, 1.0, 10.0),
            Rect::new(5.0, 1.0, 2.0, 2.0),
        ];
        assert_eq!(Rect::spanning(&rects), Rect::new(-2.0, 0.0, 9.0, 13.0));
    }

    #[test]
    #[should_panic]
    fn spanning_rect_requires_input() {
        Rect::spanning(&[]);
    }

    #[test]
    fn clamp_to_grid() {
        let span = RectI::new(-3, 5, 10, 10);
        assert_eq!(span.clamped(IVec2::new(8, 8)), RectI::new(0, 5, 7, 3));
        assert!(RectI::new(20, 20, 4, 4).clamped(IVec2::new(8, 8)).is_empty());
    }

    #[test]
    fn range_overlap_is_strict() {
        let a = Range { min: 0.0, max: 1.0 };
        let b = Range { min: 1.0, max: 2.0 };
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Range { min: 0.5, max: 3.0 }));
    }
}
