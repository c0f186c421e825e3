//! # Tilemap: Chunked Occupancy Grid
//!
//! Level geometry is a grid of solid tiles. Each tile is one bit; the grid is
//! split into fixed-size chunks, each with its own [`BitSet`], so a query
//! touches a few small bitsets instead of one big one.
//!
//! ```text
//!   tile (x, y)
//!     chunk = (x / chunk_width, y / chunk_height)
//!     local = (x % chunk_width, y % chunk_height)
//!     bit   = local.y * chunk_width + local.x
//! ```
//!
//! ## Queries
//!
//! [`Tilemap::collides_with`] maps a world-space rectangle to a *tile span*
//! (floor of the min edge, ceil of the max edge, divided by tile size),
//! clamps it to the grid, and tests only the tiles in that span. Cost scales
//! with the collider's size, not the level's.
//!
//! ## Movement Resolution
//!
//! [`Tilemap::resolve_collisions`] is a discrete, axis-separated
//! approximation: it tests the horizontal step, then the vertical step, then
//! (if both axes still move) the diagonal step, zeroing velocity on each hit.
//! It is not tunneling-safe; a velocity larger than a tile can skip a tile.
//! The test order is part of the behaviour (it decides corner grazes).

use serde::{Deserialize, Serialize};

use crate::bitset::BitSet;
use crate::math::{IVec2, Rect, RectI, Vec2};
#[cfg(feature = "render2d")]
use crate::render2d::{BatchRenderer, BatchSink, DrawParams, SpriteDef, Textures};

/// Dimensions of a tilemap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilemapConfig {
    /// Width in tiles.
    pub width: i32,
    /// Height in tiles.
    pub height: i32,
    /// Chunk width in tiles. Must divide `width`.
    pub chunk_width: i32,
    /// Chunk height in tiles. Must divide `height`.
    pub chunk_height: i32,
    /// Edge length of one tile in world units.
    pub tile_size: f32,
}

impl Default for TilemapConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            chunk_width: 8,
            chunk_height: 8,
            tile_size: 16.0,
        }
    }
}

/// A fixed-size grid of solid/empty tiles.
#[derive(Debug, Clone)]
pub struct Tilemap {
    config: TilemapConfig,
    /// Row-major, `chunk_cols * chunk_rows` entries.
    chunks: Vec<BitSet>,
    chunk_cols: i32,
}

impl Tilemap {
    pub fn new(config: TilemapConfig) -> Self {
        assert!(config.width > 0 && config.height > 0, "tilemap must have positive dimensions");
        assert!(config.chunk_width > 0 && config.chunk_height > 0);
        assert!(
            config.width % config.chunk_width == 0 && config.height % config.chunk_height == 0,
            "tilemap size must be a multiple of the chunk size"
        );
        assert!(config.tile_size > 0.0);

        let chunk_cols = config.width / config.chunk_width;
        let chunk_rows = config.height / config.chunk_height;
        let chunk_bits = (config.chunk_width * config.chunk_height) as usize;

        Self {
            config,
            chunks: vec![BitSet::new(chunk_bits); (chunk_cols * chunk_rows) as usize],
            chunk_cols,
        }
    }

    pub fn config(&self) -> &TilemapConfig {
        &self.config
    }

    pub fn width(&self) -> i32 {
        self.config.width
    }

    pub fn height(&self) -> i32 {
        self.config.height
    }

    pub fn tile_size(&self) -> f32 {
        self.config.tile_size
    }

    pub fn is_in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.config.width && y >= 0 && y < self.config.height
    }

    /// Mark the tile at `(x, y)` solid.
    pub fn activate_tile(&mut self, x: i32, y: i32) {
        let (chunk, bit) = self.locate(x, y);
        self.chunks[chunk].activate(bit);
    }

    pub fn is_tile_active(&self, x: i32, y: i32) -> bool {
        let (chunk, bit) = self.locate(x, y);
        self.chunks[chunk].is_active(bit)
    }

    /// World-space rectangle covered by tile `(x, y)`.
    pub fn tile_rect(&self, x: i32, y: i32) -> Rect {
        let size = self.config.tile_size;
        Rect::new(x as f32 * size, y as f32 * size, size, size)
    }

    /// The clamped range of tiles `rect` overlaps.
    pub fn tile_span(&self, rect: &Rect) -> RectI {
        let size = self.config.tile_size;
        let cols = self.config.width as f32;
        let rows = self.config.height as f32;

        // Clamp each edge to the grid before forming the span.
        let left = (rect.x / size).floor().clamp(0.0, cols) as i32;
        let top = (rect.y / size).floor().clamp(0.0, rows) as i32;
        let right = (rect.right() / size).ceil().clamp(0.0, cols) as i32;
        let bottom = (rect.bottom() / size).ceil().clamp(0.0, rows) as i32;

        RectI::new(left, top, (right - left).max(0), (bottom - top).max(0))
    }

    /// True if `collider` overlaps any solid tile.
    pub fn collides_with(&self, collider: &Rect) -> bool {
        debug_assert!(collider.is_valid(), "malformed collider {collider:?}");

        let span = self.tile_span(collider);

        for y in span.y..span.bottom() {
            for x in span.x..span.right() {
                if self.is_tile_active(x, y) && collider.intersects(&self.tile_rect(x, y)) {
                    return true;
                }
            }
        }

        false
    }

    /// Zero the components of `vel` that would move `collider` into a solid tile.
    pub fn resolve_collisions(&self, vel: Vec2, collider: &Rect) -> Vec2 {
        let mut vel = vel;

        if self.collides_with(&collider.translated(Vec2::new(vel.x, 0.0))) {
            vel.x = 0.0;
        }

        if self.collides_with(&collider.translated(Vec2::new(0.0, vel.y))) {
            vel.y = 0.0;
        }

        if vel.x != 0.0 && vel.y != 0.0 && self.collides_with(&collider.translated(vel)) {
            vel = Vec2::ZERO;
        }

        vel
    }

    /// Iterate solid tiles as `(x, y)`, chunk by chunk, skipping empty chunks.
    pub fn active_tiles(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let cw = self.config.chunk_width;
        let ch = self.config.chunk_height;
        let cols = self.chunk_cols;

        self.chunks
            .iter()
            .enumerate()
            .filter(|(_, chunk)| !chunk.is_empty())
            .flat_map(move |(i, chunk)| {
                let origin = IVec2::new((i as i32 % cols) * cw, (i as i32 / cols) * ch);
                chunk
                    .iter_active()
                    .map(move |bit| (origin.x + bit as i32 % cw, origin.y + bit as i32 / cw))
            })
    }

    /// Draw every solid tile with `sprite`, stretched to the tile size.
    #[cfg(feature = "render2d")]
    pub fn render<S: BatchSink>(&self, renderer: &mut BatchRenderer<S>, textures: &Textures, sprite: &SpriteDef) {
        let scale = Vec2::splat(self.config.tile_size) / sprite.size();

        for (x, y) in self.active_tiles() {
            let params = DrawParams::at(self.tile_rect(x, y).pos()).scale(scale);
            renderer.draw_sprite(sprite, textures, &params);
        }
    }

    fn locate(&self, x: i32, y: i32) -> (usize, usize) {
        assert!(self.is_in_bounds(x, y), "tile ({x}, {y}) out of bounds");

        let cw = self.config.chunk_width;
        let ch = self.config.chunk_height;
        let chunk = (y / ch) * self.chunk_cols + (x / cw);
        let bit = (y % ch) * cw + (x % cw);
        (chunk as usize, bit as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_map() -> Tilemap {
        let mut map = Tilemap::new(TilemapConfig::default());
        for y in 10..15 {
            for x in 10..15 {
                map.activate_tile(x, y);
            }
        }
        map
    }

    #[test]
    fn activate_and_query() {
        let map = block_map();
        assert!(map.is_tile_active(10, 10));
        assert!(map.is_tile_active(14, 14));
        assert!(!map.is_tile_active(15, 14));
        assert!(!map.is_tile_active(9, 10));
        assert_eq!(map.active_tiles().count(), 25);
    }

    #[test]
    fn tiles_across_chunk_boundaries() {
        let mut map = Tilemap::new(TilemapConfig::default());
        map.activate_tile(7, 7);
        map.activate_tile(8, 8);
        map.activate_tile(127, 127);

        let mut tiles: Vec<_> = map.active_tiles().collect();
        tiles.sort();
        assert_eq!(tiles, vec![(7, 7), (8, 8), (127, 127)]);
    }

    #[test]
    fn collider_inside_block_collides() {
        let map = block_map();
        assert!(map.collides_with(&Rect::new(170.0, 170.0, 4.0, 4.0)));
    }

    #[test]
    fn collider_outside_block_does_not_collide() {
        let map = block_map();
        assert!(!map.collides_with(&Rect::new(0.0, 0.0, 4.0, 4.0)));
    }

    #[test]
    fn touching_tile_edge_does_not_collide() {
        let map = block_map();
        // Block starts at x = 160; this collider ends exactly there.
        assert!(!map.collides_with(&Rect::new(150.0, 170.0, 10.0, 4.0)));
        assert!(map.collides_with(&Rect::new(150.0, 170.0, 10.5, 4.0)));
    }

    #[test]
    fn span_is_clamped_to_grid() {
        let map = block_map();
        let span = map.tile_span(&Rect::new(-40.0, -40.0, 60.0, 60.0));
        assert_eq!(span, RectI::new(0, 0, 2, 2));
        assert!(!map.collides_with(&Rect::new(-100.0, -100.0, 50.0, 50.0)));
        assert!(!map.collides_with(&Rect::new(5000.0, 5000.0, 50.0, 50.0)));
    }

    #[test]
    fn huge_collider_span_saturates_to_grid() {
        let map = block_map();
        let strip = Rect::new(-1e30, 0.0, 2e30, 4.0);
        assert_eq!(map.tile_span(&strip), RectI::new(0, 0, 128, 1));
        assert!(!map.collides_with(&strip));

        let everything = Rect::new(-1e30, -1e30, 2e30, 2e30);
        assert_eq!(map.tile_span(&everything), RectI::new(0, 0, 128, 128));
        assert!(map.collides_with(&everything));
    }

    #[test]
    fn resolve_blocks_each_axis() {
        let map = block_map();
        // Just left of the block, moving right and down.
        let collider = Rect::new(150.0, 170.0, 8.0, 8.0);
        let vel = map.resolve_collisions(Vec2::new(4.0, 2.0), &collider);
        assert_eq!(vel, Vec2::new(0.0, 2.0));

        // Just above the block, moving down and right.
        let collider = Rect::new(170.0, 150.0, 8.0, 8.0);
        let vel = map.resolve_collisions(Vec2::new(2.0, 4.0), &collider);
        assert_eq!(vel, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn resolve_blocks_diagonal_corner() {
        let map = block_map();
        // Up-left of the block's corner: each axis alone is clear, the
        // diagonal step clips the corner tile.
        let collider = Rect::new(150.0, 150.0, 8.0, 8.0);
        let vel = map.resolve_collisions(Vec2::new(4.0, 4.0), &collider);
        assert_eq!(vel, Vec2::ZERO);
    }

    #[test]
    fn resolve_leaves_free_movement() {
        let map = block_map();
        let vel = map.resolve_collisions(Vec2::new(3.0, -1.0), &Rect::new(0.0, 0.0, 8.0, 8.0));
        assert_eq!(vel, Vec2::new(3.0, -1.0));
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_tile_panics() {
        let mut map = Tilemap::new(TilemapConfig::default());
        map.activate_tile(128, 0);
    }

    #[cfg(feature = "render2d")]
    #[test]
    fn render_draws_one_quad_per_active_tile() {
        use crate::render2d::{RecordingSink, TextureId};

        let map = block_map();
        let mut textures = Textures::new();
        let atlas = textures.add(IVec2::new(64, 64));
        let wall = SpriteDef::new(atlas, RectI::new(0, 0, 8, 8));
        let mut renderer = BatchRenderer::new(RecordingSink::new(), 16);

        map.render(&mut renderer, &textures, &wall);
        renderer.flush();

        let batches = &renderer.sink().batches;
        let quads: usize = batches.iter().map(|b| b.quad_count()).sum();
        assert_eq!(quads, 25);
        assert_eq!(batches.len(), 2, "25 quads over 16 slots");
        assert!(batches.iter().all(|b| b.texture != TextureId::PIXEL));

        // 8px sprite stretched to the 16 unit tile at (10, 10).
        let first = &batches[0].vertices;
        assert!((first[0].position[0] - 160.0).abs() < 1e-3);
        assert!((first[2].position[0] - 176.0).abs() < 1e-3);
    }
}
