//! # GPU Sink: Replaying Batches with wgpu
//!
//! [`GpuSink`] is the production [`BatchSink`]. It does not draw on
//! `submit`; each flushed batch becomes a small *pending draw* (its own
//! vertex buffer and camera bind group) and [`GpuSink::encode`] replays all
//! of them inside a single render pass.
//!
//! ```text
//!  BatchRenderer::flush ──► submit(batch)
//!                             │  vertex buffer  ← bytemuck::cast_slice(vertices)
//!                             │  camera uniform ← ortho(display) * batch.view
//!                             ▼
//!                       pending: Vec<PendingDraw>
//!                             │
//!  encode(encoder, view) ─────┘  one pass: clear, then draw_indexed per batch
//! ```
//!
//! All batches share one index buffer holding the `0 1 2, 2 3 0` pattern for
//! `slot_count` quads, so a batch of `n` quads is `draw_indexed(0..n * 6)`.
//!
//! The sink owns clones of the device and queue (both are reference-counted
//! handles in wgpu) and works with any surface or offscreen target view.

use std::path::Path;

use wgpu::util::DeviceExt;

use crate::math::{IVec2, ortho_matrix};

use super::Color;
use super::batch::{Batch, BatchSink};
use super::pipeline::SpritePipeline;
use super::texture::{TextureError, TextureId};
use super::vertex::{CameraUniform, SLOT_INDEX_COUNT, quad_indices};

struct PendingDraw {
    vertex_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    texture: TextureId,
    index_count: u32,
}

/// wgpu-backed batch sink.
pub struct GpuSink {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: SpritePipeline,
    index_buffer: wgpu::Buffer,
    slot_count: usize,
    /// Bind group per [`TextureId`] index; `None` until uploaded.
    textures: Vec<Option<wgpu::BindGroup>>,
    display_size: IVec2,
    clear_color: Option<Color>,
    pending: Vec<PendingDraw>,
}

impl GpuSink {
    /// Create the pipeline, the shared index buffer for `slot_count` quads,
    /// and the built-in white pixel texture.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        display_size: IVec2,
        slot_count: usize,
    ) -> Self {
        let pipeline = SpritePipeline::new(device, format);

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite index buffer"),
            contents: bytemuck::cast_slice(&quad_indices(slot_count)),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut sink = Self {
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            index_buffer,
            slot_count,
            textures: Vec::new(),
            display_size,
            clear_color: None,
            pending: Vec::new(),
        };
        sink.upload_texture(TextureId::PIXEL, 1, 1, &[255, 255, 255, 255]);
        sink
    }

    /// Upload RGBA8 pixels for `id`, replacing any earlier upload.
    pub fn upload_texture(&mut self, id: TextureId, width: u32, height: u32, rgba: &[u8]) {
        assert_eq!(rgba.len(), (width * height * 4) as usize, "RGBA buffer size mismatch");

        let label = format!("sprite texture {}", id.index());
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some(&label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.pipeline.texture_bind_group(&self.device, &view, &label);

        if self.textures.len() <= id.index() {
            self.textures.resize_with(id.index() + 1, || None);
        }
        self.textures[id.index()] = Some(bind_group);
    }

    /// Decode an image file and upload it for `id`.
    pub fn load_texture(&mut self, id: TextureId, path: impl AsRef<Path>) -> Result<(), TextureError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| {
                log::error!("Failed to decode texture '{}': {e}", path.display());
                TextureError::Load {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            })?
            .to_rgba8();

        let (w, h) = img.dimensions();
        self.upload_texture(id, w, h, &img);
        log::debug!("Uploaded texture '{}' as {} ({w}x{h})", path.display(), id.index());
        Ok(())
    }

    /// Track a new display (surface) size for the projection.
    pub fn resize(&mut self, display_size: IVec2) {
        assert!(display_size.x > 0 && display_size.y > 0);
        self.display_size = display_size;
    }

    pub fn display_size(&self) -> IVec2 {
        self.display_size
    }

    /// Number of flushed batches waiting for [`encode`](Self::encode).
    pub fn pending_draws(&self) -> usize {
        self.pending.len()
    }

    /// Record one render pass into `target` that clears (if requested) and
    /// replays every pending batch, then forget them.
    pub fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let load = match self.clear_color.take() {
            Some(c) => wgpu::LoadOp::Clear(wgpu::Color {
                r: c.r as f64,
                g: c.g as f64,
                b: c.b as f64,
                a: c.a as f64,
            }),
            None => wgpu::LoadOp::Load,
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("sprite batch pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.pipeline.pipeline);
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        for draw in &self.pending {
            let Some(texture) = self.bind_group(draw.texture) else {
                continue;
            };
            render_pass.set_bind_group(0, &draw.camera_bind_group, &[]);
            render_pass.set_bind_group(1, texture, &[]);
            render_pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
            render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
        }

        drop(render_pass);
        self.pending.clear();
    }

    /// Bind group for `id`, falling back to the white pixel for textures that
    /// were registered but never uploaded.
    fn bind_group(&self, id: TextureId) -> Option<&wgpu::BindGroup> {
        match self.textures.get(id.index()).and_then(Option::as_ref) {
            Some(bg) => Some(bg),
            None => {
                log::warn!("Texture {} was never uploaded; drawing with the pixel texture", id.index());
                self.textures.get(TextureId::PIXEL.index()).and_then(Option::as_ref)
            }
        }
    }
}

impl BatchSink for GpuSink {
    fn clear(&mut self, color: Color) {
        // Anything pending would be covered by the clear.
        self.pending.clear();
        self.clear_color = Some(color);
    }

    fn submit(&mut self, batch: &Batch<'_>) {
        let quads = batch.quad_count();
        debug_assert!(quads <= self.slot_count, "batch of {quads} quads exceeds {} slots", self.slot_count);

        let size = self.display_size.as_vec2();
        let projection = ortho_matrix(0.0, size.x, size.y, 0.0, -1.0, 1.0);
        let camera = CameraUniform {
            view_proj: (projection * batch.view).to_cols_array_2d(),
        };

        let camera_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite camera uniform"),
            contents: bytemuck::cast_slice(&[camera]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite batch vertices"),
            contents: bytemuck::cast_slice(batch.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        self.pending.push(PendingDraw {
            camera_bind_group: self.pipeline.camera_bind_group(&self.device, &camera_buffer),
            vertex_buffer,
            texture: batch.texture,
            index_count: (quads * SLOT_INDEX_COUNT) as u32,
        });
    }
}
