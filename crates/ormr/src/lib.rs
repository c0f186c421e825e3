//! # Ormr: Frame-Scoped 2D Game Runtime
//!
//! The low-level half of a top-down 2D game: arena memory with per-frame
//! reset, bit sets and fixed pools for entities, rectangle and polygon
//! geometry with SAT collision, a chunked tilemap for static level
//! collision, and a depth-sorted, batching sprite renderer.
//!
//! Start with `use ormr::prelude::*`.
//!
//! ## One Frame
//!
//! ```text
//!  FrameMemory::temp ◄── colliders, scratch polygons
//!        │
//!  update: Tilemap::resolve_collisions, polys_intersect
//!        │
//!  render: RenderTaskList::append ... sort_and_flush ──► BatchRenderer ──► BatchSink
//!        │
//!  FrameMemory::end_frame (temp reset, handles from this frame go stale)
//! ```
//!
//! Everything runs on one thread. Nothing here locks.

pub mod arena;
pub mod bitset;
pub mod collision;
pub mod config;
pub mod math;
pub mod pool;
pub mod prelude;
pub mod tilemap;

#[cfg(feature = "render2d")]
pub mod render2d;
