//! # Texture: Metadata for UV Computation
//!
//! The batch renderer only needs to know two things about a texture: which
//! one it is (for batching) and how big it is (to turn a pixel source
//! rectangle into normalized UVs). [`Textures`] stores exactly that; pixel
//! data lives with the sink (see `gpu::GpuSink::upload_texture`).
//!
//! ```text
//! Textures
//! ┌────────────────────────────────────────┐
//! │ [0] 1x1 white (PIXEL)   ◄── always here │
//! │ [1] "all.png"    256x256               │
//! │ [2] "ui.png"     512x128               │
//! └────────────────────────────────────────┘
//! ```
//!
//! Entry 0 is a single white pixel. Solid rectangles, lines and bars sample it
//! and multiply by the tint color, so untextured draws go through the same
//! path as sprites.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::math::{IVec2, RectEdges, RectI};

/// Handle to a texture in [`Textures`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) usize);

impl TextureId {
    /// The built-in 1x1 white texture.
    pub const PIXEL: Self = Self(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Errors that can occur when loading texture metadata.
#[derive(Debug)]
pub enum TextureError {
    /// The file could not be read or decoded.
    Load { path: PathBuf, reason: String },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Load { path, reason } => {
                write!(f, "failed to load texture '{}': {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for TextureError {}

struct TextureEntry {
    size: IVec2,
    path: Option<PathBuf>,
}

/// Dimensions of every known texture, indexed by [`TextureId`].
pub struct Textures {
    entries: Vec<TextureEntry>,
}

impl Textures {
    /// A store holding only the 1x1 white [`TextureId::PIXEL`].
    pub fn new() -> Self {
        Self {
            entries: vec![TextureEntry {
                size: IVec2::ONE,
                path: None,
            }],
        }
    }

    /// Register a texture of `size` pixels.
    pub fn add(&mut self, size: IVec2) -> TextureId {
        assert!(size.x > 0 && size.y > 0, "texture size must be positive");

        self.entries.push(TextureEntry { size, path: None });
        TextureId(self.entries.len() - 1)
    }

    /// Read the dimensions of each image file and register it.
    ///
    /// Stops at the first failure; textures registered before it are kept.
    pub fn load_from_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<Vec<TextureId>, TextureError> {
        let mut ids = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            let (w, h) = image::image_dimensions(path).map_err(|e| {
                log::error!("Failed to load texture '{}': {e}", path.display());
                TextureError::Load {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;

            self.entries.push(TextureEntry {
                size: IVec2::new(w as i32, h as i32),
                path: Some(path.to_path_buf()),
            });
            ids.push(TextureId(self.entries.len() - 1));
            log::info!("Loaded texture '{}' ({w}x{h})", path.display());
        }

        Ok(ids)
    }

    /// Pixel dimensions of `id`.
    pub fn size(&self, id: TextureId) -> IVec2 {
        self.entries[id.0].size
    }

    /// Source file of `id`, if it was loaded from disk.
    pub fn path(&self, id: TextureId) -> Option<&Path> {
        self.entries[id.0].path.as_deref()
    }

    /// Number of textures, including the built-in pixel.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Textures {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalized UV edges of `src_rect` within a texture of `tex_size` pixels.
pub fn tex_coords(src_rect: RectI, tex_size: IVec2) -> RectEdges {
    assert!(tex_size.x > 0 && tex_size.y > 0);

    let w = tex_size.x as f32;
    let h = tex_size.y as f32;
    RectEdges {
        left: src_rect.x as f32 / w,
        top: src_rect.y as f32 / h,
        right: src_rect.right() as f32 / w,
        bottom: src_rect.bottom() as f32 / h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_is_always_present() {
        let textures = Textures::new();
        assert_eq!(textures.len(), 1);
        assert_eq!(textures.size(TextureId::PIXEL), IVec2::ONE);
    }

    #[test]
    fn add_returns_sequential_ids() {
        let mut textures = Textures::new();
        let a = textures.add(IVec2::new(64, 32));
        let b = textures.add(IVec2::new(8, 8));
        assert_eq!(a.index(), 1);
        assert_eq!(b.index(), 2);
        assert_eq!(textures.size(a), IVec2::new(64, 32));
    }

    #[test]
    fn uv_from_source_rect() {
        let uv = tex_coords(RectI::new(8, 0, 24, 40), IVec2::new(64, 80));
        assert_eq!(uv, RectEdges { left: 0.125, top: 0.0, right: 0.5, bottom: 0.5 });
    }

    #[test]
    fn missing_file_is_reported() {
        let mut textures = Textures::new();
        let err = textures
            .load_from_files(&["definitely/not/here.png"])
            .unwrap_err();
        assert!(err.to_string().contains("not/here.png"));
        assert_eq!(textures.len(), 1);
    }
}
