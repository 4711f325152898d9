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

//! The renderer context object.

use crate::config::{ConfigError, RendererConfig};
use crate::encoder::{DrawState, PendingDraw};
use crate::stats::FrameStats;
use crate::view::ViewTable;
use vela_core::math::{LinearRgba, Mat4};
use vela_core::renderer::{
    ClearFlags, FrameBufferId, FrameGeneration, RenderBackend, RenderError, SubmitError,
    TransientIndexBuffer, TransientVertexBuffer, VertexLayout, ViewError, ViewId, ViewRect,
};
use vela_data::allocators::TransientArena;
use vela_data::cache::{MatrixCache, RectCache};

/// Accumulates draw and compute state, submits it to a backend view by view, and
/// drives the frame lifecycle.
///
/// One `Renderer` is owned by the submission thread. Within a frame, callers
/// populate the pending state through the `set_*` methods and hand it over with
/// [`submit`](Self::submit) or [`dispatch`](Self::dispatch); both leave the pending
/// state empty whatever the outcome. [`advance_frame`](Self::advance_frame) ends
/// the frame and invalidates every transient allocation and cache handle.
#[derive(Debug)]
pub struct Renderer<B: RenderBackend> {
    pub(crate) backend: B,
    pub(crate) config: RendererConfig,

    pub(crate) views: ViewTable,
    pub(crate) transient: TransientArena,
    pub(crate) transforms: MatrixCache,
    pub(crate) scissors: RectCache,
    pub(crate) pending: PendingDraw,

    pub(crate) generation: FrameGeneration,
    pub(crate) frame_number: u64,

    pub(crate) stats: FrameStats,
    pub(crate) last_frame_stats: FrameStats,
    pub(crate) last_submit_error: Option<SubmitError>,
}

impl<B: RenderBackend> Renderer<B> {
    /// Creates a renderer over `backend`.
    ///
    /// `config` is validated, then every capacity is lowered to the backend's
    /// reported limits.
    pub fn new(backend: B, config: RendererConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let config = config.clamped_to(&backend.limits());
        config.validate()?;

        let generation = FrameGeneration::default();
        log::info!(
            "Renderer created: {} views, {} transient bytes, {} transform slots, {} scissor slots",
            config.max_views,
            config.transient_bytes,
            config.matrix_cache_size,
            config.rect_cache_size
        );

        Ok(Self {
            backend,
            views: ViewTable::new(config.max_views),
            transient: TransientArena::new(config.transient_bytes, generation),
            transforms: MatrixCache::new(config.matrix_cache_size, generation, "Transform"),
            scissors: RectCache::new(config.rect_cache_size, generation, "Scissor"),
            pending: PendingDraw::default(),
            generation,
            frame_number: 0,
            stats: FrameStats::default(),
            last_frame_stats: FrameStats::default(),
            last_submit_error: None,
            config,
        })
    }

    // --- Accessors ---

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, to create resources.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The effective configuration, after clamping.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The current frame number. The first frame is 0.
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// The view table.
    pub fn views(&self) -> &ViewTable {
        &self.views
    }

    /// The view table, for bulk edits.
    pub fn views_mut(&mut self) -> &mut ViewTable {
        &mut self.views
    }

    /// Statistics of the last finished frame.
    pub fn last_frame_stats(&self) -> &FrameStats {
        &self.last_frame_stats
    }

    /// The most recent backend rejection, if any.
    pub fn last_submit_error(&self) -> Option<&SubmitError> {
        self.last_submit_error.as_ref()
    }

    /// Whether state has been set since the last submission.
    pub fn draw_state(&self) -> DrawState {
        self.pending.state()
    }

    /// The transient arena.
    pub fn transient(&self) -> &TransientArena {
        &self.transient
    }

    // --- View table ---

    /// Sets the debug name of a view.
    pub fn set_view_name(&mut self, id: ViewId, name: &str) -> Result<(), ViewError> {
        self.views.set_name(id, name)
    }

    /// Sets the viewport of a view.
    pub fn set_view_rect(&mut self, id: ViewId, rect: ViewRect) -> Result<(), ViewError> {
        self.views.set_rect(id, rect)
    }

    /// Sets the scissor of a view. An all-zero rectangle disables it.
    pub fn set_view_scissor(&mut self, id: ViewId, rect: ViewRect) -> Result<(), ViewError> {
        self.views.set_scissor(id, rect)
    }

    /// Clears a view with one `0xRRGGBBAA` color.
    pub fn set_view_clear(
        &mut self,
        id: ViewId,
        flags: ClearFlags,
        rgba: u32,
        depth: f32,
        stencil: u8,
    ) -> Result<(), ViewError> {
        self.views.set_clear(id, flags, rgba, depth, stencil)
    }

    /// Clears each color attachment of a view with a palette entry.
    pub fn set_view_clear_palette(
        &mut self,
        id: ViewId,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
        indices: &[u8],
    ) -> Result<(), ViewError> {
        self.views
            .set_clear_palette(id, flags, depth, stencil, indices)
    }

    /// Sets the view and projection matrices of a view.
    pub fn set_view_transform(
        &mut self,
        id: ViewId,
        view: Mat4,
        projection: Mat4,
    ) -> Result<(), ViewError> {
        self.views.set_transform(id, view, projection)
    }

    /// Sets the render target of a view.
    pub fn set_view_frame_buffer(
        &mut self,
        id: ViewId,
        frame_buffer: Option<FrameBufferId>,
    ) -> Result<(), ViewError> {
        self.views.set_frame_buffer(id, frame_buffer)
    }

    /// Keeps a view's draws in submission order.
    pub fn set_view_sequential(&mut self, id: ViewId, sequential: bool) -> Result<(), ViewError> {
        self.views.set_sequential(id, sequential)
    }

    /// Restores the default configuration of a view.
    pub fn reset_view(&mut self, id: ViewId) -> Result<(), ViewError> {
        self.views.reset(id)
    }

    /// Sets one entry of the clear palette.
    pub fn set_palette_color(&mut self, index: u8, color: LinearRgba) -> Result<(), ViewError> {
        self.views.set_palette_color(index, color)
    }

    // --- Transient geometry ---

    /// Returns `true` if the vertices and indices fit in the arena together.
    pub fn check_available_space(
        &self,
        vertex_count: u32,
        layout: &VertexLayout,
        index_count: u32,
    ) -> bool {
        self.transient
            .check_available_space(vertex_count, layout, index_count)
    }

    /// Vertices of `layout`, up to `wanted`, that still fit.
    pub fn available_transient_vertices(&self, layout: &VertexLayout, wanted: u32) -> u32 {
        self.transient.available_vertices(layout, wanted)
    }

    /// Indices, up to `wanted`, that still fit.
    pub fn available_transient_indices(&self, wanted: u32) -> u32 {
        self.transient.available_indices(wanted)
    }

    /// Allocates vertex and index storage for this frame. On failure nothing is
    /// allocated.
    pub fn allocate_transient(
        &mut self,
        vertex_count: u32,
        layout: &VertexLayout,
        index_count: u32,
    ) -> Result<(TransientVertexBuffer, TransientIndexBuffer), RenderError> {
        Ok(self
            .transient
            .allocate(vertex_count, layout, index_count)?)
    }

    /// Allocates vertex storage for this frame.
    pub fn allocate_transient_vertices(
        &mut self,
        count: u32,
        layout: &VertexLayout,
    ) -> Result<TransientVertexBuffer, RenderError> {
        Ok(self.transient.allocate_vertices(count, layout)?)
    }

    /// Allocates index storage for this frame.
    pub fn allocate_transient_indices(
        &mut self,
        count: u32,
    ) -> Result<TransientIndexBuffer, RenderError> {
        Ok(self.transient.allocate_indices(count)?)
    }

    /// The bytes of a transient vertex allocation, for the caller to fill.
    pub fn transient_vertex_data_mut(
        &mut self,
        buffer: &TransientVertexBuffer,
    ) -> Result<&mut [u8], RenderError> {
        Ok(self.transient.vertex_data_mut(buffer)?)
    }

    /// The indices of a transient allocation, for the caller to fill.
    pub fn transient_index_data_mut(
        &mut self,
        buffer: &TransientIndexBuffer,
    ) -> Result<&mut [u16], RenderError> {
        Ok(self.transient.index_data_mut(buffer)?)
    }
}
