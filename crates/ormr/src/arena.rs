//! # Arena: Bump Allocation With Bulk Reset
//!
//! A [`MemArena`] hands out sequential, aligned sub-regions of one buffer that
//! is allocated once up front. Nothing is freed individually: [`MemArena::reset`]
//! reclaims everything at once. Games use two of them:
//!
//! ```text
//! FrameMemory
//! ├── perm  lives for the whole process (texture tables, level data)
//! └── temp  reset at the end of every frame (colliders, scratch polygons)
//! ```
//!
//! ## Handles, Not References
//!
//! A push returns an [`ArenaRegion`] (or a typed [`ArenaSlice`]) rather than a
//! borrow. Handles are `Copy`, so many allocations can be alive at once while
//! the arena stays mutably accessible, and they are resolved through the arena
//! with [`MemArena::slice`] / [`MemArena::slice_mut`].
//!
//! Every handle records the arena *generation* it was allocated in. `reset`
//! and `clean` advance the generation, and resolving a handle from an older
//! generation panics. A stale collider polygon is caught on first use instead
//! of silently reading whatever the next frame wrote there.
//!
//! ## Zeroing
//!
//! `reset` zeroes the consumed bytes `[0, offset)` before rewinding. The cost
//! is proportional to what was used, not to the arena size, and every fresh
//! allocation starts out zeroed.
//!
//! ## Alignment
//!
//! The buffer starts on a [`ARENA_ALIGN`]-byte boundary and offsets are
//! rounded up relative to that start, so any push of up to `ARENA_ALIGN`
//! alignment lands on a correctly aligned address.

use std::fmt;
use std::marker::PhantomData;

use bytemuck::{Pod, Zeroable};

/// Alignment of the arena buffer start, and the largest alignment a push may ask for.
pub const ARENA_ALIGN: usize = 64;

#[derive(Clone, Copy)]
#[repr(C, align(64))]
struct Block([u8; ARENA_ALIGN]);

// SAFETY: 64 plain bytes with matching size and alignment, so no padding.
unsafe impl Zeroable for Block {}
unsafe impl Pod for Block {}

/// Errors that can occur when creating an arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// The backing buffer could not be allocated.
    AllocationFailed {
        /// Requested buffer size in bytes.
        size: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaError::AllocationFailed { size } => {
                write!(f, "failed to allocate {size} byte memory arena")
            }
        }
    }
}

impl std::error::Error for ArenaError {}

/// Round `n` up to the next multiple of `alignment` (a power of two).
pub fn align_forward(n: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (n + alignment - 1) & !(alignment - 1)
}

/// An untyped byte region inside a [`MemArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct ArenaRegion {
    generation: u32,
    offset: usize,
    len: usize,
}

impl ArenaRegion {
    /// Byte offset from the start of the arena buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Arena generation this region was allocated in.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// A region holding `count` values of `T`.
#[must_use]
pub struct ArenaSlice<T> {
    region: ArenaRegion,
    count: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ArenaSlice<T> {
    pub fn region(&self) -> ArenaRegion {
        self.region
    }

    /// Number of `T` elements.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

// Manual impls: deriving would require `T: Clone`/`T: Debug`.
impl<T> Clone for ArenaSlice<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArenaSlice<T> {}

impl<T> fmt::Debug for ArenaSlice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaSlice")
            .field("region", &self.region)
            .field("count", &self.count)
            .finish()
    }
}

/// A linear allocator over one fixed-size, zero-initialized buffer.
pub struct MemArena {
    blocks: Vec<Block>,
    size: usize,
    offset: usize,
    generation: u32,
}

impl MemArena {
    /// Allocate a zeroed arena of `size` bytes.
    pub fn new(size: usize) -> Result<Self, ArenaError> {
        assert!(size > 0, "arena size must be positive");

        let block_count = size.div_ceil(ARENA_ALIGN);
        let mut blocks = Vec::new();
        if blocks.try_reserve_exact(block_count).is_err() {
            log::error!("Failed to allocate memory arena of {size} bytes");
            return Err(ArenaError::AllocationFailed { size });
        }
        blocks.resize(block_count, Block::zeroed());

        Ok(Self {
            blocks,
            size,
            offset: 0,
            generation: 0,
        })
    }

    /// Total buffer size in bytes (0 once cleaned).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Bytes consumed so far, including alignment padding.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.size() - self.offset
    }

    /// Current generation. Advanced by [`reset`](Self::reset) and [`clean`](Self::clean).
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// False once the buffer has been released with [`clean`](Self::clean).
    pub fn is_active(&self) -> bool {
        self.size > 0
    }

    fn buf(&self) -> &[u8] {
        &bytemuck::cast_slice(&self.blocks)[..self.size]
    }

    fn buf_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut(&mut self.blocks)[..self.size]
    }

    /// Reserve `size` bytes at the next offset that is a multiple of `alignment`.
    ///
    /// `alignment` must be a power of two no larger than [`ARENA_ALIGN`].
    /// Returns `None` (and leaves the arena untouched) if the aligned region
    /// does not fit in the remaining space.
    pub fn push_aligned(&mut self, size: usize, alignment: usize) -> Option<ArenaRegion> {
        assert!(self.is_active(), "push to a cleaned memory arena");
        assert!(size > 0, "arena push size must be positive");
        assert!(alignment.is_power_of_two(), "alignment {alignment} is not a power of two");
        assert!(alignment <= ARENA_ALIGN, "alignment {alignment} exceeds arena alignment {ARENA_ALIGN}");

        let offset_aligned = align_forward(self.offset, alignment);
        let fits = offset_aligned
            .checked_add(size)
            .filter(|&next| next <= self.size);

        let Some(offset_next) = fits else {
            log::warn!(
                "Failed to push {size} bytes to memory arena ({} of {} bytes used)",
                self.offset,
                self.size
            );
            return None;
        };

        self.offset = offset_next;

        Some(ArenaRegion {
            generation: self.generation,
            offset: offset_aligned,
            len: size,
        })
    }

    /// Reserve room for `count` zeroed values of `T`.
    pub fn push<T: Pod>(&mut self, count: usize) -> Option<ArenaSlice<T>> {
        assert!(count > 0, "arena push count must be positive");

        let region = self.push_aligned(size_of::<T>() * count, align_of::<T>())?;

        Some(ArenaSlice {
            region,
            count,
            _marker: PhantomData,
        })
    }

    /// Reserve room for `values` and copy them in.
    pub fn push_copy<T: Pod>(&mut self, values: &[T]) -> Option<ArenaSlice<T>> {
        let slice = self.push::<T>(values.len())?;
        self.slice_mut(slice).copy_from_slice(values);
        Some(slice)
    }

    /// Resolve a byte region.
    ///
    /// # Panics
    ///
    /// Panics if the region was allocated before the last reset.
    pub fn bytes(&self, region: ArenaRegion) -> &[u8] {
        self.check(region);
        &self.buf()[region.offset..region.offset + region.len]
    }

    /// Resolve a byte region mutably. Panics on stale regions.
    pub fn bytes_mut(&mut self, region: ArenaRegion) -> &mut [u8] {
        self.check(region);
        &mut self.buf_mut()[region.offset..region.offset + region.len]
    }

    /// Resolve a typed slice. Panics on stale handles.
    pub fn slice<T: Pod>(&self, slice: ArenaSlice<T>) -> &[T] {
        bytemuck::cast_slice(self.bytes(slice.region))
    }

    /// Resolve a typed slice mutably. Panics on stale handles.
    pub fn slice_mut<T: Pod>(&mut self, slice: ArenaSlice<T>) -> &mut [T] {
        bytemuck::cast_slice_mut(self.bytes_mut(slice.region))
    }

    /// True if `region` belongs to the current generation.
    pub fn is_live(&self, region: ArenaRegion) -> bool {
        region.generation == self.generation
    }

    /// Zero the used bytes and rewind to the start. Invalidates every handle.
    pub fn reset(&mut self) {
        assert!(self.is_active(), "reset of a cleaned memory arena");

        if self.offset > 0 {
            let used = self.offset;
            self.buf_mut()[..used].fill(0);
            self.offset = 0;
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Release the buffer. The arena can no longer be pushed to.
    pub fn clean(&mut self) {
        self.blocks = Vec::new();
        self.size = 0;
        self.offset = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    fn check(&self, region: ArenaRegion) {
        assert!(
            region.generation == self.generation,
            "stale arena region: allocated in generation {}, arena is at generation {}",
            region.generation,
            self.generation
        );
        debug_assert!(region.offset + region.len <= self.offset);
    }
}

impl fmt::Debug for MemArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemArena")
            .field("size", &self.size())
            .field("offset", &self.offset)
            .field("generation", &self.generation)
            .finish()
    }
}

/// The two arena lifetimes of a running game.
#[derive(Debug)]
pub struct FrameMemory {
    /// Lives for the whole process. Only pushed to during initialization.
    pub perm: MemArena,
    /// Reset at the end of every frame.
    pub temp: MemArena,
}

impl FrameMemory {
    pub fn new(perm_size: usize, temp_size: usize) -> Result<Self, ArenaError> {
        Ok(Self {
            perm: MemArena::new(perm_size)?,
            temp: MemArena::new(temp_size)?,
        })
    }

    /// Reclaim all per-frame allocations. Call once per frame, whether or not
    /// the frame's work succeeded.
    pub fn end_frame(&mut self) {
        self.temp.reset();
    }
}
