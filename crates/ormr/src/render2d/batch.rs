//! # Batch: Fixed-Capacity Quad Accumulation
//!
//! The [`BatchRenderer`] collects quads into `slot_count` slots that all share
//! one bound texture. Submitting a batch is a [`BatchSink::submit`] call. It
//! happens only on a *flush*:
//!
//! - the slots are full and another quad arrives
//! - a quad arrives with a different texture than the bound one
//! - the view matrix (render surface) changes
//! - the caller asks, at least once at every frame boundary
//!
//! Flushing submits whatever is accumulated and resets the slot counter, so
//! no geometry crosses a state change.
//!
//! ## Why Batching Matters
//!
//! Every submission carries driver overhead. A scene of 500 sprites sharing
//! one atlas texture is one submission here instead of 500. Texture changes
//! break batches, so sorting sprites by atlas helps, but depth order always
//! wins: the renderer never reorders what it is given.
//!
//! ## The Sink Seam
//!
//! The renderer knows nothing about GPUs. [`BatchSink`] receives finished
//! batches; `gpu::GpuSink` uploads them with wgpu, [`RecordingSink`] keeps
//! them in memory for tests and headless tools.

use crate::collision::{PolyView, rotated_quad_points};
use crate::math::{Mat4, Rect, RectEdges, RectI, Vec2, dir};

use super::sprite::SpriteDef;
use super::texture::{TextureId, Textures, tex_coords};
use super::vertex::{SLOT_VERT_COUNT, SpriteVertex};
use super::{Color, ColorRgb, DrawParams, is_origin_valid};

/// UV edges covering a whole texture.
const FULL_UV: RectEdges = RectEdges {
    left: 0.0,
    top: 0.0,
    right: 1.0,
    bottom: 1.0,
};

/// One flushed batch of quads sharing a texture and view.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub texture: TextureId,
    /// View matrix in effect when the quads were drawn.
    pub view: Mat4,
    /// Four vertices per quad, in slot order.
    pub vertices: &'a [SpriteVertex],
}

impl Batch<'_> {
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / SLOT_VERT_COUNT
    }
}

/// Receives flushed batches. Implemented by GPU backends and test doubles.
pub trait BatchSink {
    /// Clear the current render target.
    fn clear(&mut self, color: Color);

    /// Consume one batch. The vertex slice is only valid for this call.
    fn submit(&mut self, batch: &Batch<'_>);
}

/// Per-frame submission counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Number of non-empty flushes (one GPU submission each).
    pub draw_calls: u32,
    /// Number of quads submitted.
    pub quads: u32,
}

/// Accumulates quads and flushes them to `S`.
pub struct BatchRenderer<S> {
    sink: S,
    vertices: Vec<SpriteVertex>,
    slot_count: usize,
    texture: Option<TextureId>,
    view: Mat4,
    stats: RenderStats,
}

impl<S: BatchSink> BatchRenderer<S> {
    /// Create a renderer with room for `slot_count` quads per batch.
    pub fn new(sink: S, slot_count: usize) -> Self {
        assert!(slot_count > 0, "batch needs at least one slot");

        Self {
            sink,
            vertices: Vec::with_capacity(slot_count * SLOT_VERT_COUNT),
            slot_count,
            texture: None,
            view: Mat4::IDENTITY,
            stats: RenderStats::default(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Number of quads waiting for the next flush.
    pub fn slots_used(&self) -> usize {
        self.vertices.len() / SLOT_VERT_COUNT
    }

    /// Texture of the pending batch, if any quad was drawn since creation.
    pub fn bound_texture(&self) -> Option<TextureId> {
        self.texture
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Counters since the last [`begin_frame`](Self::begin_frame).
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Start a frame: reset counters and the view matrix.
    ///
    /// Quads left over from a frame that never flushed are submitted first,
    /// under the view they were drawn with.
    pub fn begin_frame(&mut self) {
        if !self.vertices.is_empty() {
            log::warn!(
                "Previous frame ended with {} unflushed quads; flushing them now",
                self.slots_used()
            );
            self.flush();
        }

        self.texture = None;
        self.view = Mat4::IDENTITY;
        self.stats = RenderStats::default();
    }

    /// Flush, then clear the render target.
    pub fn clear(&mut self, color: Color) {
        self.flush();
        self.sink.clear(color);
    }

    /// Flush, then switch to a new view matrix (e.g. world camera → UI).
    pub fn set_view(&mut self, view: Mat4) {
        self.flush();
        self.view = view;
    }

    /// Submit the pending quads (if any) and reset the slot counter.
    pub fn flush(&mut self) {
        if self.vertices.is_empty() {
            return;
        }

        let Some(texture) = self.texture else {
            unreachable!("pending quads without a bound texture");
        };

        let batch = Batch {
            texture,
            view: self.view,
            vertices: &self.vertices,
        };
        self.stats.draw_calls += 1;
        self.stats.quads += batch.quad_count() as u32;
        self.sink.submit(&batch);

        self.vertices.clear();
    }

    /// Queue one quad of `size` world units sampling `uv` from `texture`.
    pub fn draw(&mut self, texture: TextureId, uv: RectEdges, size: Vec2, params: &DrawParams) {
        debug_assert!(is_origin_valid(params.origin), "origin {} outside unit square", params.origin);
        debug_assert!(params.blend.is_valid(), "invalid blend {:?}", params.blend);

        if self.texture != Some(texture) || self.slots_used() == self.slot_count {
            self.flush();
            self.texture = Some(texture);
        }

        let corners = rotated_quad_points(params.pos, size * params.scale, params.origin, params.rot);
        let uvs = [
            [uv.left, uv.top],
            [uv.right, uv.top],
            [uv.right, uv.bottom],
            [uv.left, uv.bottom],
        ];
        let color = params.blend.to_array();

        for (corner, uv) in corners.iter().zip(uvs) {
            self.vertices.push(SpriteVertex {
                position: corner.to_array(),
                uv,
                color,
            });
        }
    }

    /// Draw the `src_rect` pixels of `texture`, sized 1 pixel = 1 unit before scaling.
    pub fn draw_texture(&mut self, texture: TextureId, textures: &Textures, src_rect: RectI, params: &DrawParams) {
        let uv = tex_coords(src_rect, textures.size(texture));
        self.draw(texture, uv, src_rect.size().as_vec2(), params);
    }

    pub fn draw_sprite(&mut self, sprite: &SpriteDef, textures: &Textures, params: &DrawParams) {
        self.draw_texture(sprite.texture, textures, sprite.src_rect, params);
    }

    /// Solid rectangle.
    pub fn draw_rect(&mut self, rect: &Rect, color: Color) {
        self.draw(TextureId::PIXEL, FULL_UV, rect.size(), &DrawParams::at(rect.pos()).blend(color));
    }

    /// Rectangle outline drawn inside `rect`.
    pub fn draw_rect_outline(&mut self, rect: &Rect, color: Color, thickness: f32) {
        debug_assert!(thickness > 0.0);

        let t = thickness.min(rect.width * 0.5).min(rect.height * 0.5);
        let side_height = rect.height - t * 2.0;

        self.draw_rect(&Rect::new(rect.x, rect.y, rect.width, t), color);
        self.draw_rect(&Rect::new(rect.x, rect.bottom() - t, rect.width, t), color);
        self.draw_rect(&Rect::new(rect.x, rect.y + t, t, side_height), color);
        self.draw_rect(&Rect::new(rect.right() - t, rect.y + t, t, side_height), color);
    }

    /// Line from `a` to `b`, `width` units thick, centered on the segment.
    pub fn draw_line(&mut self, a: Vec2, b: Vec2, color: Color, width: f32) {
        let diff = b - a;
        let params = DrawParams::at(a)
            .origin(Vec2::new(0.0, 0.5))
            .rotation(dir(diff))
            .blend(color);
        self.draw(TextureId::PIXEL, FULL_UV, Vec2::new(diff.length(), width), &params);
    }

    /// Closed outline through every point of `poly`.
    pub fn draw_poly_outline(&mut self, poly: PolyView<'_>, color: Color, width: f32) {
        let n = poly.pts.len();
        for i in 0..n {
            self.draw_line(poly.pts[i], poly.pts[(i + 1) % n], color, width);
        }
    }

    /// Horizontal progress bar: `back` over the whole rect, `front` over the
    /// leftmost `perc` of it.
    pub fn draw_bar_hor(&mut self, rect: &Rect, perc: f32, front: ColorRgb, back: ColorRgb) {
        debug_assert!((0.0..=1.0).contains(&perc), "bar fill {perc} outside [0, 1]");

        self.draw_rect(rect, back.into());
        let filled = Rect::new(rect.x, rect.y, rect.width * perc, rect.height);
        self.draw_rect(&filled, front.into());
    }
}

/// A batch copied out of a [`RecordingSink`].
#[derive(Debug, Clone)]
pub struct RecordedBatch {
    pub texture: TextureId,
    pub view: Mat4,
    pub vertices: Vec<SpriteVertex>,
}

impl RecordedBatch {
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / SLOT_VERT_COUNT
    }
}

/// Keeps every submission in memory. Useful for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub batches: Vec<RecordedBatch>,
    pub clears: Vec<Color>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything recorded so far.
    pub fn reset(&mut self) {
        self.batches.clear();
        self.clears.clear();
    }
}

impl BatchSink for RecordingSink {
    fn clear(&mut self, color: Color) {
        self.clears.push(color);
    }

    fn submit(&mut self, batch: &Batch<'_>) {
        self.batches.push(RecordedBatch {
            texture: batch.texture,
            view: batch.view,
            vertices: batch.vertices.to_vec(),
        });
    }
}
