//! # Render2d: Deferred, Depth-Sorted Sprite Batching
//!
//! A 2D sprite renderer turns a stream of textured quads into as few GPU
//! submissions as possible. Gameplay code never talks to the GPU directly;
//! it appends draw requests and the renderer decides when to submit.
//!
//! ## Architecture
//!
//! ```text
//!   gameplay glue (per entity)
//!         │ append / append_extended
//!         ▼
//!   ┌────────────────────┐
//!   │  RenderTaskList    │  growable, doubling capacity
//!   └─────────┬──────────┘
//!             │ sort_by_depth (stable, ascending Y anchor)
//!             ▼
//!   ┌────────────────────┐
//!   │  BatchRenderer     │  N quad slots, one bound texture
//!   │   flush when:      │
//!   │   • slots full     │
//!   │   • texture change │
//!   │   • view change    │
//!   │   • explicit flush │
//!   └─────────┬──────────┘
//!             │ Batch { texture, view, vertices }
//!             ▼
//!   ┌────────────────────┐
//!   │  impl BatchSink    │  GpuSink (wgpu), RecordingSink (tests)
//!   └────────────────────┘
//! ```
//!
//! ## Design Decisions
//!
//! **CPU-side vertex transform.** Each quad's four corners are rotated about
//! the sprite pivot on the CPU using the same math as collision polygons
//! ([`rotated_quad_points`](crate::collision::rotated_quad_points)), so what
//! you see is exactly what collides. The shader only applies the view and
//! projection matrices.
//!
//! **Painter's algorithm.** Top-down scenes sort by the Y position of each
//! sprite's visual anchor. Sprites lower on screen draw later and overlap the
//! ones above them. The sort is stable, so equal depths keep insertion order.
//!
//! **Fixed slot capacity.** The batch never grows. When it is full it is
//! submitted and reused, which keeps the GPU vertex buffer a fixed size.

pub(crate) mod batch;
pub(crate) mod camera;
pub(crate) mod sprite;
pub(crate) mod task;
pub(crate) mod texture;
pub(crate) mod vertex;

#[cfg(feature = "gpu")]
pub mod gpu;
#[cfg(feature = "gpu")]
pub(crate) mod pipeline;

pub use batch::{Batch, BatchRenderer, BatchSink, RecordedBatch, RecordingSink, RenderStats};
pub use camera::Camera2d;
pub use sprite::{SpriteDef, SpriteKey, SpriteTable};
pub use task::{RenderError, RenderTask, RenderTaskList};
pub use texture::{TextureError, TextureId, Textures, tex_coords};
pub use vertex::SpriteVertex;

use crate::math::Vec2;

/// An RGBA color with floating-point components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    pub const RED: Self = Self::rgba(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Self = Self::rgba(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Self = Self::rgba(0.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Self = Self::rgba(1.0, 1.0, 0.0, 1.0);
    pub const CYAN: Self = Self::rgba(0.0, 1.0, 1.0, 1.0);
    pub const MAGENTA: Self = Self::rgba(1.0, 0.0, 1.0, 1.0);
    pub const GRAY: Self = Self::rgba(0.5, 0.5, 0.5, 1.0);

    /// Create a color from RGB (alpha = 1).
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// True if every component is in [0, 1].
    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|c| (0.0..=1.0).contains(c))
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorRgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn is_valid(&self) -> bool {
        [self.r, self.g, self.b].iter().all(|c| (0.0..=1.0).contains(c))
    }
}

impl From<Color> for ColorRgb {
    fn from(c: Color) -> Self {
        Self::new(c.r, c.g, c.b)
    }
}

impl From<ColorRgb> for Color {
    fn from(c: ColorRgb) -> Self {
        Color::rgb(c.r, c.g, c.b)
    }
}

/// True if `origin` lies within the unit square.
pub fn is_origin_valid(origin: Vec2) -> bool {
    (0.0..=1.0).contains(&origin.x) && (0.0..=1.0).contains(&origin.y)
}

/// Placement of one quad: where its pivot goes and how it is transformed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    /// World position of the pivot.
    pub pos: Vec2,
    /// Pivot within the quad, normalized to `0..1`.
    pub origin: Vec2,
    pub scale: Vec2,
    /// Screen-space rotation in radians about the pivot.
    pub rot: f32,
    pub blend: Color,
}

impl DrawParams {
    /// Unrotated, unscaled, untinted, pivot at the top-left corner.
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            origin: Vec2::ZERO,
            scale: Vec2::ONE,
            rot: 0.0,
            blend: Color::WHITE,
        }
    }

    pub fn origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Pivot at the center of the quad.
    pub fn centered(self) -> Self {
        self.origin(Vec2::splat(0.5))
    }

    pub fn scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotation(mut self, rot: f32) -> Self {
        self.rot = rot;
        self
    }

    pub fn blend(mut self, blend: Color) -> Self {
        self.blend = blend;
        self
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.blend.a = alpha;
        self
    }
}
