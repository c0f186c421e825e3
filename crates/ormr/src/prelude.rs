//! Convenience re-exports. `use ormr::prelude::*` for the common items.

// Core
pub use crate::arena::{ArenaError, ArenaRegion, ArenaSlice, FrameMemory, MemArena};
pub use crate::bitset::BitSet;
pub use crate::collision::{
    ArenaPoly, PolyView, poly_intersects_rect, polys_intersect, push_quad_poly, push_rotated_quad_poly,
    quad_points, rotated_quad_points,
};
pub use crate::config::{ConfigError, EngineConfig};
pub use crate::math::{IVec2, Mat4, Range, Rect, RectEdges, RectI, Vec2, Vec3, dir, len_dir, lerp, lerp_vec};
pub use crate::pool::{Pool, PoolError};
pub use crate::tilemap::{Tilemap, TilemapConfig};

// Render 2D (feature-gated)
#[cfg(feature = "render2d")]
pub use crate::render2d::{
    BatchRenderer, BatchSink, Camera2d, Color, ColorRgb, DrawParams, RecordingSink, RenderError, RenderTask,
    RenderTaskList, SpriteDef, SpriteKey, SpriteTable, TextureError, TextureId, Textures,
};

#[cfg(feature = "gpu")]
pub use crate::render2d::gpu::GpuSink;
