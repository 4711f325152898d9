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

//! Handles into the per-frame transient arena.

use crate::renderer::vertex::VertexLayout;

/// Identifies the frame a transient allocation or cache entry belongs to.
///
/// Bumped once per frame advance; handles stamped with an older generation are
/// rejected instead of reading reclaimed memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameGeneration(pub u64);

impl FrameGeneration {
    /// Returns the following generation.
    #[inline]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Vertex storage in the transient arena, valid until the frame advances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransientVertexBuffer {
    /// Byte offset of the region in the arena. Backends bind the arena at this offset.
    pub offset: u32,
    /// Size of the region in bytes.
    pub size: u32,
    /// Number of vertices.
    pub count: u32,
    /// Layout of each vertex.
    pub layout: VertexLayout,
    /// Frame the region belongs to.
    pub generation: FrameGeneration,
}

/// 16-bit index storage in the transient arena, valid until the frame advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransientIndexBuffer {
    /// Byte offset of the region in the arena.
    pub offset: u32,
    /// Size of the region in bytes.
    pub size: u32,
    /// `offset / 2`: the first index when the arena is bound as one index buffer.
    pub start_index: u32,
    /// Number of indices.
    pub count: u32,
    /// Frame the region belongs to.
    pub generation: FrameGeneration,
}
