//! Sprite lookup tables.
//!
//! A game names its sprites with a closed enum and implements [`SpriteKey`]
//! for it. A [`SpriteTable`] maps each key to the texture and pixel source
//! rectangle it is cut from. The table is built once at startup and never
//! mutated.
//!
//! ```ignore
//! #[derive(Clone, Copy)]
//! enum Sprite { Player, Enemy, Projectile }
//!
//! impl SpriteKey for Sprite {
//!     const COUNT: usize = 3;
//!     fn index(self) -> usize { self as usize }
//! }
//! ```

use std::marker::PhantomData;

use crate::arena::MemArena;
use crate::collision::{ArenaPoly, push_rotated_quad_poly};
use crate::math::{Rect, RectI, Vec2};

use super::TextureId;

/// A closed enumeration of sprite identities.
pub trait SpriteKey: Copy {
    /// Number of variants.
    const COUNT: usize;

    /// Ordinal of this variant, in `0..COUNT`.
    fn index(self) -> usize;
}

/// Where a sprite's pixels live.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDef {
    pub texture: TextureId,
    /// Source rectangle in texture pixels.
    pub src_rect: RectI,
}

impl SpriteDef {
    pub const fn new(texture: TextureId, src_rect: RectI) -> Self {
        Self { texture, src_rect }
    }

    /// Size in pixels (and world units at scale 1).
    pub fn size(&self) -> Vec2 {
        self.src_rect.size().as_vec2()
    }
}

/// Immutable mapping from `K` to [`SpriteDef`].
pub struct SpriteTable<K> {
    defs: Vec<SpriteDef>,
    _key: PhantomData<fn(K)>,
}

impl<K: SpriteKey> SpriteTable<K> {
    /// Build from one definition per key, in ordinal order.
    pub fn new(defs: Vec<SpriteDef>) -> Self {
        assert_eq!(defs.len(), K::COUNT, "sprite table needs exactly one entry per key");

        Self {
            defs,
            _key: PhantomData,
        }
    }

    pub fn get(&self, key: K) -> &SpriteDef {
        &self.defs[key.index()]
    }

    /// Axis-aligned collider matching the sprite's unrotated bounds.
    pub fn collider_rect(&self, key: K, pos: Vec2, origin: Vec2) -> Rect {
        let size = self.get(key).size();
        Rect::from_pos_size(pos - size * origin, size)
    }

    /// Rotated collider polygon, allocated in `arena` (typically the temp arena).
    pub fn push_collider_poly(
        &self,
        key: K,
        arena: &mut MemArena,
        pos: Vec2,
        origin: Vec2,
        rot: f32,
    ) -> Option<ArenaPoly> {
        debug_assert!(super::is_origin_valid(origin));

        push_rotated_quad_poly(arena, pos, self.get(key).size(), origin, rot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::poly_intersects_rect;

    #[derive(Clone, Copy)]
    enum Sprite {
        Player,
        Cursor,
    }

    impl SpriteKey for Sprite {
        const COUNT: usize = 2;

        fn index(self) -> usize {
            self as usize
        }
    }

    fn table() -> SpriteTable<Sprite> {
        SpriteTable::new(vec![
            SpriteDef::new(TextureId(1), RectI::new(8, 0, 24, 40)),
            SpriteDef::new(TextureId(1), RectI::new(0, 8, 8, 8)),
        ])
    }

    #[test]
    fn lookup_by_key() {
        let table = table();
        assert_eq!(table.get(Sprite::Cursor).src_rect, RectI::new(0, 8, 8, 8));
        assert_eq!(table.get(Sprite::Player).size(), Vec2::new(24.0, 40.0));
    }

    #[test]
    fn collider_rect_honours_origin() {
        let table = table();
        let rect = table.collider_rect(Sprite::Player, Vec2::new(100.0, 100.0), Vec2::splat(0.5));
        assert_eq!(rect, Rect::new(88.0, 80.0, 24.0, 40.0));
    }

    #[test]
    fn collider_poly_in_arena() {
        let table = table();
        let mut arena = MemArena::new(256).unwrap();
        let poly = table
            .push_collider_poly(Sprite::Cursor, &mut arena, Vec2::new(4.0, 4.0), Vec2::splat(0.5), 0.7)
            .unwrap();
        assert!(poly_intersects_rect(poly.view(&arena), &Rect::new(3.0, 3.0, 2.0, 2.0)));
    }

    #[test]
    #[should_panic]
    fn table_size_must_match_keys() {
        let _ = SpriteTable::<Sprite>::new(vec![SpriteDef::new(TextureId::PIXEL, RectI::new(0, 0, 1, 1))]);
    }
}
