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

//! Fixed limits of the submission model and the capacity report of a backend.

/// Number of vertex streams a draw may bind.
pub const MAX_VERTEX_STREAMS: usize = 4;

/// Upper bound on texture units a draw may bind.
pub const MAX_TEXTURE_UNITS: usize = 16;

/// Upper bound on buffers and images a dispatch may bind.
pub const MAX_COMPUTE_BINDINGS: usize = 8;

/// Number of frames a threaded backend may queue before the producer blocks.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Number of entries in the clear color palette.
pub const PALETTE_SIZE: usize = 16;

/// Capacities a backend supports. Renderer configuration is clamped to these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendLimits {
    /// Number of views the backend can order and execute.
    pub max_views: u16,
    /// Size of the per-frame transient arena in bytes.
    pub transient_bytes: usize,
    /// Transform cache capacity in matrices.
    pub max_matrix_cache: u32,
    /// Scissor cache capacity in rectangles.
    pub max_rect_cache: u32,
    /// Number of texture units per draw.
    pub max_texture_units: u8,
    /// Number of compute bindings per dispatch.
    pub max_compute_bindings: u8,
    /// Draw calls accepted per frame.
    pub max_draw_calls: u32,
}

impl Default for BackendLimits {
    fn default() -> Self {
        Self {
            max_views: 256,
            transient_bytes: 64 << 20,
            max_matrix_cache: 65_536,
            max_rect_cache: 4_096,
            max_texture_units: MAX_TEXTURE_UNITS as u8,
            max_compute_bindings: MAX_COMPUTE_BINDINGS as u8,
            max_draw_calls: 65_535,
        }
    }
}
