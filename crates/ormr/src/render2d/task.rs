//! # Render Tasks: Per-Frame Depth-Sorted Draw Requests
//!
//! Gameplay code does not draw sprites directly. Each renderable entity
//! appends a [`RenderTask`] with a *sort depth* (usually the Y position of
//! its feet), and at the end of the frame the list is sorted and replayed
//! into the [`BatchRenderer`].
//!
//! ```text
//!  append(player, y=120)   append(enemy, y=80)   append(enemy, y=200)
//!           │                      │                      │
//!           ▼                      ▼                      ▼
//!   ┌────────────────────────────────────────────────────────────┐
//!   │ [player 120] [enemy 80] [enemy 200]        len 3 / cap 4    │
//!   └────────────────────────────────────────────────────────────┘
//!                              │ sort_by_depth
//!                              ▼
//!   ┌────────────────────────────────────────────────────────────┐
//!   │ [enemy 80] [player 120] [enemy 200]                        │
//!   └────────────────────────────────────────────────────────────┘
//!                              │ render + flush
//!                              ▼
//!                        BatchRenderer
//! ```
//!
//! Growth doubles the capacity (`0 → 1 → 2 → 4 …`). Allocation failure is
//! reported as [`RenderError::TaskListGrowth`] so the caller can skip the
//! frame's render pass instead of aborting.

use std::fmt;

use crate::math::Vec2;

use super::batch::{BatchRenderer, BatchSink};
use super::sprite::{SpriteKey, SpriteTable};
use super::texture::Textures;
use super::{Color, DrawParams};

/// Errors raised while collecting render tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Growing the task list to `requested` entries failed.
    TaskListGrowth { requested: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::TaskListGrowth { requested } => {
                write!(f, "render task list could not grow to {requested} entries")
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// One pending sprite draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTask<K> {
    pub pos: Vec2,
    pub origin: Vec2,
    pub scale: Vec2,
    pub rot: f32,
    pub alpha: f32,
    pub sprite: K,
    /// Ascending draw order. Larger depths are drawn on top.
    pub sort_depth: f32,
}

impl<K: SpriteKey> RenderTask<K> {
    /// Centered, unscaled, unrotated, opaque.
    pub fn new(pos: Vec2, sprite: K, sort_depth: f32) -> Self {
        Self {
            pos,
            origin: Vec2::splat(0.5),
            scale: Vec2::ONE,
            rot: 0.0,
            alpha: 1.0,
            sprite,
            sort_depth,
        }
    }

    fn params(&self) -> DrawParams {
        DrawParams::at(self.pos)
            .origin(self.origin)
            .scale(self.scale)
            .rotation(self.rot)
            .blend(Color::WHITE.with_alpha(self.alpha))
    }
}

/// Growable list of [`RenderTask`]s for one frame.
///
/// A default-constructed list owns no buffer.
#[derive(Debug, Clone)]
pub struct RenderTaskList<K> {
    tasks: Vec<RenderTask<K>>,
}

impl<K> Default for RenderTaskList<K> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<K: SpriteKey> RenderTaskList<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn capacity(&self) -> usize {
        self.tasks.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in their current order.
    pub fn tasks(&self) -> &[RenderTask<K>] {
        &self.tasks
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderTask<K>> {
        self.tasks.iter()
    }

    /// Drop every task, keeping the buffer.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Append a centered, opaque, unrotated sprite.
    pub fn append(&mut self, pos: Vec2, sprite: K, sort_depth: f32) -> Result<(), RenderError> {
        self.append_extended(RenderTask::new(pos, sprite, sort_depth))
    }

    /// Append a fully specified task.
    pub fn append_extended(&mut self, task: RenderTask<K>) -> Result<(), RenderError> {
        debug_assert!(super::is_origin_valid(task.origin));
        debug_assert!((0.0..=1.0).contains(&task.alpha), "alpha {} outside [0, 1]", task.alpha);

        if self.tasks.len() == self.tasks.capacity() {
            self.grow()?;
        }

        self.tasks.push(task);
        Ok(())
    }

    fn grow(&mut self) -> Result<(), RenderError> {
        let cap = self.tasks.capacity();
        let cap_new = if cap == 0 { 1 } else { cap * 2 };

        self.tasks.try_reserve_exact(cap_new - self.tasks.len()).map_err(|e| {
            log::error!("Render task list reallocation to {cap_new} entries failed: {e}");
            RenderError::TaskListGrowth { requested: cap_new }
        })
    }

    /// Stable sort by ascending `sort_depth`.
    pub fn sort_by_depth(&mut self) {
        self.tasks.sort_by(|a, b| a.sort_depth.total_cmp(&b.sort_depth));
    }

    /// Draw every task in its current order. Does not flush.
    pub fn render<S: BatchSink>(&self, renderer: &mut BatchRenderer<S>, table: &SpriteTable<K>, textures: &Textures) {
        for task in &self.tasks {
            renderer.draw_sprite(table.get(task.sprite), textures, &task.params());
        }
    }

    /// Sort, draw, flush, and release the list.
    pub fn sort_and_flush<S: BatchSink>(
        mut self,
        renderer: &mut BatchRenderer<S>,
        table: &SpriteTable<K>,
        textures: &Textures,
    ) {
        self.sort_by_depth();
        self.render(renderer, table, textures);
        renderer.flush();

        log::trace!("Flushed {} render tasks", self.tasks.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{IVec2, RectI};
    use crate::render2d::{RecordingSink, SpriteDef, TextureId};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Sprite {
        Player,
        Enemy,
    }

    impl SpriteKey for Sprite {
        const COUNT: usize = 2;

        fn index(self) -> usize {
            self as usize
        }
    }

    fn setup() -> (SpriteTable<Sprite>, Textures) {
        let mut textures = Textures::new();
        let atlas = textures.add(IVec2::new(64, 64));
        let table = SpriteTable::new(vec![
            SpriteDef::new(atlas, RectI::new(0, 0, 16, 16)),
            SpriteDef::new(atlas, RectI::new(16, 0, 16, 16)),
        ]);
        (table, textures)
    }

    #[test]
    fn default_list_owns_nothing() {
        let list = RenderTaskList::<Sprite>::new();
        assert!(list.is_empty());
        assert_eq!(list.capacity(), 0);
    }

    #[test]
    fn length_survives_growth() {
        let mut list = RenderTaskList::new();
        for i in 0..37 {
            list.append(Vec2::ZERO, Sprite::Enemy, i as f32).unwrap();
            assert!(list.len() <= list.capacity());
        }
        assert_eq!(list.len(), 37);
    }

    #[test]
    fn capacity_doubles_from_one() {
        let mut list = RenderTaskList::new();
        let mut caps = Vec::new();
        for i in 0..9 {
            list.append(Vec2::ZERO, Sprite::Player, i as f32).unwrap();
            caps.push(list.capacity());
        }
        assert_eq!(caps, vec![1, 2, 4, 4, 8, 8, 8, 8, 16]);
    }

    #[test]
    fn sort_yields_non_decreasing_depths() {
        let mut list = RenderTaskList::new();
        let depths = [5.0, -3.0, 12.5, 0.0, 5.0, 99.0, -40.0, 7.25];
        for d in depths {
            list.append(Vec2::ZERO, Sprite::Enemy, d).unwrap();
        }
        list.sort_by_depth();

        let sorted: Vec<f32> = list.iter().map(|t| t.sort_depth).collect();
        assert!(sorted.windows(2).all(|w| w[0] <= w[1]), "not sorted: {sorted:?}");
        assert_eq!(sorted.len(), depths.len());
    }

    #[test]
    fn equal_depths_keep_insertion_order() {
        let mut list = RenderTaskList::new();
        list.append(Vec2::new(1.0, 0.0), Sprite::Enemy, 10.0).unwrap();
        list.append(Vec2::new(2.0, 0.0), Sprite::Player, 5.0).unwrap();
        list.append(Vec2::new(3.0, 0.0), Sprite::Enemy, 10.0).unwrap();
        list.append(Vec2::new(4.0, 0.0), Sprite::Player, 10.0).unwrap();
        list.sort_by_depth();

        let xs: Vec<f32> = list.iter().map(|t| t.pos.x).collect();
        assert_eq!(xs, vec![2.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn append_uses_centered_opaque_defaults() {
        let mut list = RenderTaskList::new();
        list.append(Vec2::new(8.0, 8.0), Sprite::Player, 0.0).unwrap();

        let task = list.tasks()[0];
        assert_eq!(task.origin, Vec2::splat(0.5));
        assert_eq!(task.scale, Vec2::ONE);
        assert_eq!(task.alpha, 1.0);
        assert_eq!(task.rot, 0.0);
    }

    #[test]
    fn sort_and_flush_draws_back_to_front() {
        let (table, textures) = setup();
        let mut renderer = BatchRenderer::new(RecordingSink::new(), 16);

        let mut list = RenderTaskList::new();
        list.append(Vec2::new(0.0, 200.0), Sprite::Enemy, 200.0).unwrap();
        list.append_extended(RenderTask {
            alpha: 0.5,
            ..RenderTask::new(Vec2::new(0.0, 100.0), Sprite::Player, 100.0)
        })
        .unwrap();
        list.sort_and_flush(&mut renderer, &table, &textures);

        let batches = &renderer.sink().batches;
        assert_eq!(batches.len(), 1);
        assert_ne!(batches[0].texture, TextureId::PIXEL);
        assert_eq!(batches[0].quad_count(), 2);

        // Player (depth 100) comes first and carries its alpha.
        let v = &batches[0].vertices;
        assert_eq!(v[0].color[3], 0.5);
        assert_eq!(v[0].uv[0], 0.0);
        assert_eq!(v[4].uv[0], 0.25);
        assert_eq!(renderer.slots_used(), 0);
    }

    #[test]
    fn growth_error_displays_request() {
        let err = RenderError::TaskListGrowth { requested: 64 };
        assert_eq!(err.to_string(), "render task list could not grow to 64 entries");
    }
}
