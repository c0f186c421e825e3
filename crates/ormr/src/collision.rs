//! # Collision: Convex Polygons and the Separating Axis Theorem
//!
//! Sprites rotate, so axis-aligned rectangles are not enough for projectile
//! hits. A collider is a convex polygon built from the sprite's size, pivot
//! (`origin`, normalized `0..1` within the rect) and rotation.
//!
//! ## Ownership
//!
//! ```text
//! PolyView<'a>   borrowed &[Vec2], used by every test
//! ArenaPoly      handle to points living in a MemArena (usually the temp arena)
//!                  └── .view(&arena) -> PolyView   (panics if the arena was reset)
//! ```
//!
//! ## SAT
//!
//! For every edge of either polygon, project both polygons onto the edge
//! normal. If the two 1-D intervals are disjoint on any axis, the polygons do
//! not intersect. Interval overlap is strict, so shapes that only touch along
//! an edge do not intersect, matching [`Rect::intersects`].
//!
//! The test is only correct for convex polygons. Winding must be consistent;
//! both are the caller's responsibility and are checked with `debug_assert!`.

use crate::arena::{ArenaRegion, ArenaSlice, MemArena};
use crate::math::{PI, Range, Rect, Vec2, len_dir};

/// A borrowed, consistently wound convex polygon.
#[derive(Debug, Clone, Copy)]
pub struct PolyView<'a> {
    pub pts: &'a [Vec2],
}

impl<'a> PolyView<'a> {
    pub fn new(pts: &'a [Vec2]) -> Self {
        Self { pts }
    }

    /// True if every turn has the same sign (collinear points allowed).
    pub fn is_convex(&self) -> bool {
        let n = self.pts.len();
        if n < 3 {
            return false;
        }

        let mut sign = 0.0f32;
        for i in 0..n {
            let a = self.pts[i];
            let b = self.pts[(i + 1) % n];
            let c = self.pts[(i + 2) % n];
            let cross = (b - a).perp_dot(c - b);

            if cross != 0.0 {
                if sign != 0.0 && cross.signum() != sign {
                    return false;
                }
                sign = cross.signum();
            }
        }
        sign != 0.0
    }

    fn project(&self, axis: Vec2) -> Range {
        let mut range = Range::EMPTY;
        for &pt in self.pts {
            range.include(pt.dot(axis));
        }
        range
    }

    /// Edge normals of this polygon. Not normalized: only the interval order
    /// matters, not its scale.
    fn normals(&self) -> impl Iterator<Item = Vec2> + '_ {
        let n = self.pts.len();
        (0..n).map(move |i| {
            let edge = self.pts[(i + 1) % n] - self.pts[i];
            Vec2::new(edge.y, -edge.x)
        })
    }
}

/// A polygon whose points are owned by a [`MemArena`].
#[derive(Debug, Clone, Copy)]
pub struct ArenaPoly {
    pts: ArenaSlice<Vec2>,
}

impl ArenaPoly {
    /// Copy `pts` into `arena`.
    pub fn push(arena: &mut MemArena, pts: &[Vec2]) -> Option<Self> {
        Some(Self {
            pts: arena.push_copy(pts)?,
        })
    }

    pub fn len(&self) -> usize {
        self.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    /// The arena bytes holding the points.
    pub fn region(&self) -> ArenaRegion {
        self.pts.region()
    }

    /// Borrow the points. Panics if `arena` was reset since allocation.
    pub fn view<'a>(&self, arena: &'a MemArena) -> PolyView<'a> {
        PolyView::new(arena.slice(self.pts))
    }
}

/// Corners of an axis-aligned `size` rectangle whose `origin` sits at `pos`.
pub fn quad_points(pos: Vec2, size: Vec2, origin: Vec2) -> [Vec2; 4] {
    let base = pos - size * origin;
    [
        base,
        Vec2::new(base.x + size.x, base.y),
        base + size,
        Vec2::new(base.x, base.y + size.y),
    ]
}

/// Corners of a `size` rectangle rotated by `rot` about its `origin`, which
/// sits at `pos`. Rotation is about the pivot, not the rect center.
pub fn rotated_quad_points(pos: Vec2, size: Vec2, origin: Vec2, rot: f32) -> [Vec2; 4] {
    let left = len_dir(size.x * origin.x, rot + PI);
    let up = len_dir(size.y * origin.y, rot + PI * 0.5);
    let right = len_dir(size.x * (1.0 - origin.x), rot);
    let down = len_dir(size.y * (1.0 - origin.y), rot - PI * 0.5);

    [
        pos + left + up,
        pos + right + up,
        pos + right + down,
        pos + left + down,
    ]
}

/// Arena-backed [`quad_points`]. `None` if the arena is out of space.
pub fn push_quad_poly(arena: &mut MemArena, pos: Vec2, size: Vec2, origin: Vec2) -> Option<ArenaPoly> {
    ArenaPoly::push(arena, &quad_points(pos, size, origin))
}

/// Arena-backed [`rotated_quad_points`]. `None` if the arena is out of space.
pub fn push_rotated_quad_poly(
    arena: &mut MemArena,
    pos: Vec2,
    size: Vec2,
    origin: Vec2,
    rot: f32,
) -> Option<ArenaPoly> {
    ArenaPoly::push(arena, &rotated_quad_points(pos, size, origin, rot))
}

/// Separating Axis Theorem test between two convex polygons.
pub fn polys_intersect(a: PolyView<'_>, b: PolyView<'_>) -> bool {
    debug_assert!(a.pts.len() >= 3 && b.pts.len() >= 3, "degenerate polygon");
    debug_assert!(a.is_convex() && b.is_convex(), "SAT requires convex polygons");

    !has_separating_axis(a, b) && !has_separating_axis(b, a)
}

/// SAT test between a convex polygon and an axis-aligned rectangle.
///
/// `rect` must have positive width and height. A zero-area rect has no edge
/// normals to project onto, so it is rejected in debug builds rather than
/// treated as a polygon.
pub fn poly_intersects_rect(poly: PolyView<'_>, rect: &Rect) -> bool {
    debug_assert!(
        rect.width > 0.0 && rect.height > 0.0,
        "poly_intersects_rect needs a positive-size rect, got {rect:?}"
    );

    let corners = rect.corners();
    polys_intersect(poly, PolyView::new(&corners))
}

/// True if one of `poly`'s edge normals separates it from `other`.
fn has_separating_axis(poly: PolyView<'_>, other: PolyView<'_>) -> bool {
    poly.normals()
        .any(|axis| !poly.project(axis).overlaps(&other.project(axis)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn identical_quads_intersect() {
        let a = quad_points(Vec2::new(10.0, 10.0), Vec2::new(8.0, 4.0), Vec2::splat(0.5));
        let b = a;
        assert!(polys_intersect(PolyView::new(&a), PolyView::new(&b)));
    }

    #[test]
    fn separated_quads_do_not_intersect() {
        let size = Vec2::new(8.0, 8.0);
        let a = quad_points(Vec2::ZERO, size, Vec2::splat(0.5));
        // Combined half-widths are 8; place them 8.5 apart.
        let b = quad_points(Vec2::new(8.5, 0.0), size, Vec2::splat(0.5));
        assert!(!polys_intersect(PolyView::new(&a), PolyView::new(&b)));
    }

    #[test]
    fn touching_quads_do_not_intersect() {
        let size = Vec2::new(8.0, 8.0);
        let a = quad_points(Vec2::ZERO, size, Vec2::ZERO);
        let b = quad_points(Vec2::new(8.0, 0.0), size, Vec2::ZERO);
        assert!(!polys_intersect(PolyView::new(&a), PolyView::new(&b)));
    }

    #[test]
    fn full_turn_restores_quad() {
        let pos = Vec2::new(32.0, -12.0);
        let size = Vec2::new(24.0, 40.0);
        let origin = Vec2::new(0.25, 0.75);

        let unrotated = rotated_quad_points(pos, size, origin, 0.0);
        let turned = rotated_quad_points(pos, size, origin, 2.0 * PI);
        for (u, t) in unrotated.iter().zip(&turned) {
            assert!(approx(*u, *t), "{u} != {t}");
        }

        // At zero rotation the rotated builder matches the axis-aligned one.
        let aligned = quad_points(pos, size, origin);
        for (u, a) in unrotated.iter().zip(&aligned) {
            assert!(approx(*u, *a), "{u} != {a}");
        }
    }

    #[test]
    fn rotation_is_about_origin() {
        let pos = Vec2::new(5.0, 5.0);
        // Origin at the top-left corner: that corner stays put under rotation.
        let pts = rotated_quad_points(pos, Vec2::new(10.0, 2.0), Vec2::ZERO, 1.1);
        assert!(approx(pts[0], pos));
    }

    #[test]
    fn rotated_quad_clears_rect_its_bounds_would_hit() {
        // A long thin bar rotated 45° misses a rect sitting in the corner of
        // its axis-aligned bounding box.
        let bar = rotated_quad_points(Vec2::ZERO, Vec2::new(40.0, 2.0), Vec2::new(0.5, 0.5), PI / 4.0);
        let corner = Rect::new(10.0, 10.0, 3.0, 3.0);
        let bounds = Rect::spanning(&bar.map(|p| Rect::new(p.x, p.y, 0.0, 0.0)));
        assert!(bounds.intersects(&corner));
        assert!(!poly_intersects_rect(PolyView::new(&bar), &corner));
    }

    #[test]
    fn poly_rect_hit() {
        let tri = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)];
        assert!(poly_intersects_rect(PolyView::new(&tri), &Rect::new(1.0, 1.0, 2.0, 2.0)));
        assert!(!poly_intersects_rect(PolyView::new(&tri), &Rect::new(8.0, 8.0, 2.0, 2.0)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "positive-size rect")]
    fn zero_area_rect_is_rejected() {
        let tri = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)];
        let _ = poly_intersects_rect(PolyView::new(&tri), &Rect::new(1.0, 1.0, 0.0, 2.0));
    }

    #[test]
    fn arena_polys() {
        let mut arena = MemArena::new(1024).unwrap();
        let a = push_rotated_quad_poly(&mut arena, Vec2::ZERO, Vec2::splat(4.0), Vec2::splat(0.5), 0.3).unwrap();
        let b = push_quad_poly(&mut arena, Vec2::new(1.0, 1.0), Vec2::splat(4.0), Vec2::splat(0.5)).unwrap();
        assert_eq!(a.len(), 4);
        assert!(polys_intersect(a.view(&arena), b.view(&arena)));
    }

    #[test]
    fn convexity_check() {
        let square = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        assert!(PolyView::new(&square).is_convex());

        let dart = [Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 4.0)];
        assert!(!PolyView::new(&dart).is_convex());
    }
}
