// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The per-frame transient geometry arena.
//!
//! ```text
//! | indices | vertices | pad | indices | vertices | ... free ... |
//! 0                               ^ cursor (even)               capacity
//! ```
//!
//! Allocations bump the cursor; nothing is freed individually. A combined request
//! places its indices first so both regions are packed back to back, and the
//! cursor is rounded up to an even offset afterwards. When the frame
//! advances the whole arena is reclaimed and the generation moves on, which
//! invalidates every handle issued during the frame.

use std::ops::Range;
use vela_core::renderer::{
    FrameGeneration, TransientError, TransientIndexBuffer, TransientVertexBuffer, VertexLayout,
};

const INDEX_SIZE: usize = std::mem::size_of::<u16>();

/// Where a combined vertex and index request would land.
#[derive(Debug, Clone)]
struct Placement {
    vertices: Range<usize>,
    indices: Range<usize>,
}

impl Placement {
    fn end(&self) -> usize {
        self.vertices.end.max(self.indices.end)
    }
}

fn align_up(value: usize, align: usize) -> Option<usize> {
    match value % align {
        0 => Some(value),
        rem => value.checked_add(align - rem),
    }
}

/// A bump allocator handing out vertex and 16-bit index storage for one frame.
///
/// Vertex regions are addressed by byte offset and carry no stride padding; index
/// regions start on a 2-byte boundary because the cursor stays even between
/// allocations. A request for `n` vertices of stride `s` and `m` indices therefore
/// needs exactly `n * s + m * 2` free bytes. The space check and the allocation
/// share one placement computation, so a failed
/// [`check_available_space`](Self::check_available_space) always predicts a failed
/// [`allocate`](Self::allocate).
#[derive(Debug)]
pub struct TransientArena {
    /// Backing storage. `u64` words keep every region aligned for `u16` views.
    storage: Vec<u64>,
    capacity: usize,
    cursor: usize,
    generation: FrameGeneration,
}

impl TransientArena {
    /// Creates an arena of `capacity` bytes for frame `generation`.
    ///
    /// Capacity is clamped to `u32::MAX` so handle offsets always fit.
    pub fn new(capacity: usize, generation: FrameGeneration) -> Self {
        let capacity = capacity.min(u32::MAX as usize);
        let words = capacity.div_ceil(std::mem::size_of::<u64>());
        log::debug!("Transient arena created with {capacity} bytes");
        Self {
            storage: vec![0; words],
            capacity,
            cursor: 0,
            generation,
        }
    }

    /// Total size in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes handed out this frame, the even-cursor padding included.
    #[inline]
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.cursor
    }

    /// The frame the arena is currently serving.
    #[inline]
    pub fn generation(&self) -> FrameGeneration {
        self.generation
    }

    fn plan(&self, vertex_bytes: Option<(usize, usize)>, index_count: u32) -> Option<Placement> {
        // Only a cursor pinned at an odd capacity is uneven, and nothing fits there.
        let mut cursor = align_up(self.cursor, INDEX_SIZE)?;

        let indices = if index_count > 0 {
            let end = cursor.checked_add(INDEX_SIZE.checked_mul(index_count as usize)?)?;
            let region = cursor..end;
            cursor = end;
            region
        } else {
            cursor..cursor
        };

        let vertices = match vertex_bytes {
            Some((stride, count)) if count > 0 => {
                let end = cursor.checked_add(stride.checked_mul(count)?)?;
                cursor..end
            }
            _ => cursor..cursor,
        };

        Some(Placement { vertices, indices })
    }

    fn commit(&mut self, placement: &Placement) {
        let end = placement.end();
        if end > self.cursor {
            self.cursor = align_up(end, INDEX_SIZE)
                .unwrap_or(end)
                .min(self.capacity);
        }
    }

    fn place(
        &self,
        vertex_bytes: Option<(usize, usize)>,
        index_count: u32,
    ) -> Result<Placement, TransientError> {
        match self.plan(vertex_bytes, index_count) {
            Some(p) if p.end() <= self.capacity => Ok(p),
            Some(p) => Err(TransientError::Exhausted {
                requested: p.end() - self.cursor,
                available: self.remaining(),
            }),
            None => Err(TransientError::Exhausted {
                requested: usize::MAX,
                available: self.remaining(),
            }),
        }
    }

    fn stride_of(layout: &VertexLayout) -> Result<usize, TransientError> {
        match layout.stride() {
            0 => Err(TransientError::InvalidLayout),
            stride => Ok(stride as usize),
        }
    }

    /// Returns `true` if `vertex_count` vertices of `layout` and `index_count` indices
    /// fit in what is left of the frame.
    pub fn check_available_space(
        &self,
        vertex_count: u32,
        layout: &VertexLayout,
        index_count: u32,
    ) -> bool {
        let Ok(stride) = Self::stride_of(layout) else {
            return false;
        };
        self.place(Some((stride, vertex_count as usize)), index_count)
            .is_ok()
    }

    /// Number of vertices of `layout`, up to `wanted`, that still fit.
    pub fn available_vertices(&self, layout: &VertexLayout, wanted: u32) -> u32 {
        let Ok(stride) = Self::stride_of(layout) else {
            return 0;
        };
        let fit = self.remaining() / stride;
        fit.min(wanted as usize) as u32
    }

    /// Number of indices, up to `wanted`, that still fit.
    pub fn available_indices(&self, wanted: u32) -> u32 {
        let Some(start) = align_up(self.cursor, INDEX_SIZE) else {
            return 0;
        };
        let fit = self.capacity.saturating_sub(start) / INDEX_SIZE;
        fit.min(wanted as usize) as u32
    }

    /// Reserves vertex and index storage together. On failure nothing is reserved.
    pub fn allocate(
        &mut self,
        vertex_count: u32,
        layout: &VertexLayout,
        index_count: u32,
    ) -> Result<(TransientVertexBuffer, TransientIndexBuffer), TransientError> {
        let stride = Self::stride_of(layout)?;
        let placement = self
            .place(Some((stride, vertex_count as usize)), index_count)
            .inspect_err(|err| log::warn!("Transient allocation failed: {err}"))?;

        self.commit(&placement);
        Ok((
            self.vertex_handle(placement.vertices, vertex_count, layout),
            self.index_handle(placement.indices, index_count),
        ))
    }

    /// Reserves storage for `count` vertices of `layout`.
    pub fn allocate_vertices(
        &mut self,
        count: u32,
        layout: &VertexLayout,
    ) -> Result<TransientVertexBuffer, TransientError> {
        let stride = Self::stride_of(layout)?;
        let placement = self
            .place(Some((stride, count as usize)), 0)
            .inspect_err(|err| log::warn!("Transient vertex allocation failed: {err}"))?;

        self.commit(&placement);
        Ok(self.vertex_handle(placement.vertices, count, layout))
    }

    /// Reserves storage for `count` 16-bit indices.
    pub fn allocate_indices(&mut self, count: u32) -> Result<TransientIndexBuffer, TransientError> {
        let placement = self
            .place(None, count)
            .inspect_err(|err| log::warn!("Transient index allocation failed: {err}"))?;

        self.commit(&placement);
        Ok(self.index_handle(placement.indices, count))
    }

    // Offsets fit in u32 because capacity is clamped at construction.
    fn vertex_handle(
        &self,
        region: Range<usize>,
        count: u32,
        layout: &VertexLayout,
    ) -> TransientVertexBuffer {
        TransientVertexBuffer {
            offset: region.start as u32,
            size: region.len() as u32,
            count,
            layout: *layout,
            generation: self.generation,
        }
    }

    fn index_handle(&self, region: Range<usize>, count: u32) -> TransientIndexBuffer {
        TransientIndexBuffer {
            offset: region.start as u32,
            size: region.len() as u32,
            start_index: (region.start / INDEX_SIZE) as u32,
            count,
            generation: self.generation,
        }
    }

    fn region(
        &self,
        generation: FrameGeneration,
        offset: u32,
        size: u32,
    ) -> Result<Range<usize>, TransientError> {
        if generation != self.generation {
            return Err(TransientError::Stale);
        }
        let start = offset as usize;
        let end = start + size as usize;
        if end > self.cursor {
            return Err(TransientError::OutOfBounds);
        }
        Ok(start..end)
    }

    /// Checks that `buffer` was allocated this frame and lies in the arena.
    pub fn validate_vertices(&self, buffer: &TransientVertexBuffer) -> Result<(), TransientError> {
        self.region(buffer.generation, buffer.offset, buffer.size).map(|_| ())
    }

    /// Checks that `buffer` was allocated this frame and lies in the arena.
    pub fn validate_indices(&self, buffer: &TransientIndexBuffer) -> Result<(), TransientError> {
        self.region(buffer.generation, buffer.offset, buffer.size).map(|_| ())
    }

    /// The vertex bytes of `buffer`.
    pub fn vertex_data(&self, buffer: &TransientVertexBuffer) -> Result<&[u8], TransientError> {
        let range = self.region(buffer.generation, buffer.offset, buffer.size)?;
        Ok(&self.bytes_all()[range])
    }

    /// The vertex bytes of `buffer`, for the caller to fill.
    pub fn vertex_data_mut(
        &mut self,
        buffer: &TransientVertexBuffer,
    ) -> Result<&mut [u8], TransientError> {
        let range = self.region(buffer.generation, buffer.offset, buffer.size)?;
        Ok(&mut self.bytes_all_mut()[range])
    }

    /// The indices of `buffer`, in native byte order.
    pub fn index_data(&self, buffer: &TransientIndexBuffer) -> Result<&[u16], TransientError> {
        let range = self.region(buffer.generation, buffer.offset, buffer.size)?;
        bytemuck::try_cast_slice::<u8, u16>(&self.bytes_all()[range])
            .map_err(|_| TransientError::OutOfBounds)
    }

    /// The indices of `buffer`, for the caller to fill.
    pub fn index_data_mut(
        &mut self,
        buffer: &TransientIndexBuffer,
    ) -> Result<&mut [u16], TransientError> {
        let range = self.region(buffer.generation, buffer.offset, buffer.size)?;
        bytemuck::try_cast_slice_mut::<u8, u16>(&mut self.bytes_all_mut()[range])
            .map_err(|_| TransientError::OutOfBounds)
    }

    /// The bytes handed out this frame, as uploaded by a backend at frame end.
    pub fn used_bytes(&self) -> &[u8] {
        &self.bytes_all()[..self.cursor]
    }

    fn bytes_all(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.storage)[..self.capacity]
    }

    fn bytes_all_mut(&mut self) -> &mut [u8] {
        let capacity = self.capacity;
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.storage)[..capacity]
    }

    /// Reclaims everything and starts serving `generation`.
    pub fn reset(&mut self, generation: FrameGeneration) {
        log::trace!(
            "Transient arena reset: {} of {} bytes used in generation {}",
            self.cursor,
            self.capacity,
            self.generation.0
        );
        self.cursor = 0;
        self.generation = generation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_core::renderer::{Attrib, AttribType};

    fn position_layout() -> VertexLayout {
        VertexLayout::builder()
            .add(Attrib::Position, 3, AttribType::Float, false)
            .build()
            .expect("valid layout")
    }

    #[test]
    fn triangle_fits_exactly() {
        let layout = position_layout();

        let exact = TransientArena::new(60, FrameGeneration(0));
        assert!(exact.check_available_space(4, &layout, 6));

        let short = TransientArena::new(59, FrameGeneration(0));
        assert!(!short.check_available_space(4, &layout, 6));
    }

    #[test]
    fn failed_check_predicts_failed_allocation() {
        let layout = position_layout();
        let mut arena = TransientArena::new(59, FrameGeneration(0));

        assert!(!arena.check_available_space(4, &layout, 6));
        let err = arena.allocate(4, &layout, 6).unwrap_err();
        assert_eq!(
            err,
            TransientError::Exhausted {
                requested: 60,
                available: 59
            }
        );
        assert_eq!(arena.used(), 0, "a failed allocation reserves nothing");
    }

    #[test]
    fn combined_allocation_packs_indices_then_vertices() {
        let layout = position_layout();
        let mut arena = TransientArena::new(1024, FrameGeneration(7));

        let indices = arena.allocate_indices(3).expect("indices");
        assert_eq!((indices.offset, indices.size, indices.start_index), (0, 6, 0));

        // No stride padding: the vertex region follows the indices byte for byte.
        let (vb, ib) = arena.allocate(4, &layout, 6).expect("allocation");
        assert_eq!((ib.offset, ib.size, ib.start_index), (6, 12, 3));
        assert_eq!((vb.offset, vb.size), (18, 48));
        assert_eq!(vb.generation, FrameGeneration(7));
        assert_eq!(arena.used(), 66);
    }

    #[test]
    fn written_data_is_visible_in_frame_bytes() {
        let layout = position_layout();
        let mut arena = TransientArena::new(256, FrameGeneration(0));
        let (vb, ib) = arena.allocate(1, &layout, 3).expect("allocation");

        arena.vertex_data_mut(&vb).expect("vertices").fill(0xab);
        arena
            .index_data_mut(&ib)
            .expect("indices")
            .copy_from_slice(&[0, 1, 2]);

        assert_eq!(arena.used_bytes().len(), 18);
        assert!(arena.used_bytes()[6..18].iter().all(|&b| b == 0xab));
        assert_eq!(arena.index_data(&ib).expect("indices"), &[0, 1, 2]);
    }

    #[test]
    fn handles_go_stale_on_reset() {
        let layout = position_layout();
        let mut arena = TransientArena::new(256, FrameGeneration(0));
        let vb = arena.allocate_vertices(3, &layout).expect("vertices");

        arena.reset(FrameGeneration(1));
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.validate_vertices(&vb), Err(TransientError::Stale));
        assert_eq!(arena.vertex_data_mut(&vb).unwrap_err(), TransientError::Stale);
    }

    #[test]
    fn availability_queries_respect_alignment() {
        let layout = position_layout();
        let mut arena = TransientArena::new(100, FrameGeneration(0));
        arena.allocate_indices(1).expect("indices");

        // 98 bytes left after the first index: 8 vertices of 12 bytes.
        assert_eq!(arena.available_vertices(&layout, 100), 8);
        assert_eq!(arena.available_vertices(&layout, 5), 5);
        assert_eq!(arena.available_indices(1000), 49);
    }

    #[test]
    fn empty_requests_reserve_nothing() {
        let layout = position_layout();
        let mut arena = TransientArena::new(16, FrameGeneration(0));
        let (vb, ib) = arena.allocate(0, &layout, 0).expect("empty allocation");
        assert_eq!((vb.size, ib.size), (0, 0));
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn triangle_fits_after_an_unaligned_cursor() {
        let layout = position_layout();

        // 2 bytes of indices leave the cursor off the 12-byte stride with 60 bytes free.
        let mut arena = TransientArena::new(62, FrameGeneration(0));
        arena.allocate_indices(1).expect("indices");
        assert_eq!(arena.remaining(), 60);
        assert!(arena.check_available_space(4, &layout, 6));
        arena.allocate(4, &layout, 6).expect("the check was honoured");
        assert_eq!(arena.remaining(), 0);

        let mut short = TransientArena::new(61, FrameGeneration(0));
        short.allocate_indices(1).expect("indices");
        assert_eq!(short.remaining(), 59);
        assert!(!short.check_available_space(4, &layout, 6));
        assert!(short.allocate(4, &layout, 6).is_err());
        assert_eq!(short.remaining(), 59, "a failed allocation reserves nothing");
    }

    #[test]
    fn odd_strides_keep_the_cursor_even() {
        let one_byte = VertexLayout::builder()
            .add(Attrib::Color0, 1, AttribType::Uint8, true)
            .build()
            .expect("valid layout");
        let mut arena = TransientArena::new(64, FrameGeneration(0));

        let vb = arena.allocate_vertices(3, &one_byte).expect("vertices");
        assert_eq!((vb.offset, vb.size), (0, 3));
        assert_eq!(arena.used(), 4);

        let ib = arena.allocate_indices(2).expect("indices");
        assert_eq!((ib.offset, ib.start_index), (4, 2));
        assert_eq!(arena.index_data(&ib).expect("aligned indices").len(), 2);
    }
}
