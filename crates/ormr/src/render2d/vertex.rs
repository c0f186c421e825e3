//! # Vertex: Per-Corner Data Sent to the GPU
//!
//! Every batch slot is one quad: four [`SpriteVertex`] values. They are
//! packed into a flat `#[repr(C)]` struct so the whole batch can be cast to
//! `&[u8]` with `bytemuck` and uploaded without copies.
//!
//! ```text
//! SpriteVertex (32 bytes per vertex)
//! ┌──────────────┬──────────────┬────────────────────────┐
//! │ position     │ uv           │ color                  │
//! │ [f32; 2]     │ [f32; 2]     │ [f32; 4]               │
//! │ offset 0     │ offset 8     │ offset 16              │
//! │ location(0)  │ location(1)  │ location(2)            │
//! └──────────────┴──────────────┴────────────────────────┘
//! ```
//!
//! Positions are world-space: the quad was already rotated about its pivot
//! on the CPU. The shader applies `projection * view` only.

use bytemuck::{Pod, Zeroable};

/// Number of vertices in one batch slot.
pub(crate) const SLOT_VERT_COUNT: usize = 4;

/// Number of indices drawn per batch slot (two triangles).
#[cfg_attr(not(feature = "gpu"), allow(dead_code))]
pub(crate) const SLOT_INDEX_COUNT: usize = 6;

/// Per-vertex data for sprite quads.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

#[cfg(feature = "gpu")]
impl SpriteVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: size_of::<SpriteVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &Self::ATTRIBUTES,
    };
}

/// Camera `projection * view` matrix uploaded as a uniform buffer.
#[cfg(feature = "gpu")]
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Index pattern for `slot_count` quads: `0 1 2, 2 3 0` per slot.
#[cfg_attr(not(feature = "gpu"), allow(dead_code))]
pub(crate) fn quad_indices(slot_count: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(slot_count * SLOT_INDEX_COUNT);
    for slot in 0..slot_count as u32 {
        let base = slot * SLOT_VERT_COUNT as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_32_bytes() {
        assert_eq!(std::mem::size_of::<SpriteVertex>(), 32);
    }

    #[test]
    fn quad_indices_in_range() {
        let idxs = quad_indices(3);
        assert_eq!(idxs.len(), 18);
        for &idx in &idxs {
            assert!((idx as usize) < 3 * SLOT_VERT_COUNT, "index {idx} out of range");
        }
    }
}
