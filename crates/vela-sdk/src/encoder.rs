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

//! The draw state accumulator.
//!
//! Every `set_*` call writes one field of the pending state. A setter that fails
//! leaves the pending state exactly as it was.

use crate::renderer::Renderer;
use vela_core::math::Mat4;
use vela_core::renderer::{
    Access, BindingError, ComputeBinding, ComputeBuffer, IndexSource, InstanceSource,
    RenderBackend, RenderError, RenderState, SamplerFlags, StencilFaceState, StencilState,
    TextureBinding, TextureId, TextureSource, UniformBinding, UniformData, UniformId,
    VertexStream, ViewRect, MAX_COMPUTE_BINDINGS, MAX_TEXTURE_UNITS, MAX_VERTEX_STREAMS,
};
use vela_data::cache::{ScissorHandle, TransformHandle};

/// Whether the accumulator holds state for the next submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawState {
    /// Nothing has been set since the last submission.
    Idle,
    /// At least one field has been set.
    Pending,
}

/// A run of cached transforms the next draw reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TransformRef {
    pub(crate) handle: TransformHandle,
    pub(crate) count: u32,
}

/// State accumulated for the next draw or dispatch.
#[derive(Debug, Clone, Default)]
pub(crate) struct PendingDraw {
    pub(crate) streams: [Option<VertexStream>; MAX_VERTEX_STREAMS],
    pub(crate) vertex_count: Option<u32>,
    pub(crate) index: Option<IndexSource>,
    pub(crate) instances: Option<InstanceSource>,
    pub(crate) textures: [Option<TextureBinding>; MAX_TEXTURE_UNITS],
    pub(crate) uniforms: Vec<UniformBinding>,
    pub(crate) transform: Option<TransformRef>,
    pub(crate) scissor: Option<ScissorHandle>,
    pub(crate) render_state: RenderState,
    pub(crate) blend_factor: Option<u32>,
    pub(crate) stencil: Option<StencilState>,
    pub(crate) compute: [Option<ComputeBinding>; MAX_COMPUTE_BINDINGS],
    dirty: bool,
}

impl PendingDraw {
    pub(crate) fn is_pending(&self) -> bool {
        self.dirty
    }

    pub(crate) fn state(&self) -> DrawState {
        if self.dirty {
            DrawState::Pending
        } else {
            DrawState::Idle
        }
    }

    fn touch(&mut self) -> &mut Self {
        self.dirty = true;
        self
    }
}

impl<B: RenderBackend> Renderer<B> {
    /// Binds a vertex buffer to `stream`.
    ///
    /// Accepts a buffer handle (whole buffer), a transient allocation, or an
    /// explicit [`VertexStream`] range.
    pub fn set_vertex_buffer(
        &mut self,
        stream: u8,
        source: impl Into<VertexStream>,
    ) -> Result<(), RenderError> {
        let slot = usize::from(stream);
        if slot >= MAX_VERTEX_STREAMS {
            return Err(BindingError::StreamOutOfRange {
                stream,
                max: MAX_VERTEX_STREAMS as u8,
            }
            .into());
        }
        let source = source.into();
        if let VertexStream::Transient { buffer, .. } = &source {
            self.transient.validate_vertices(buffer)?;
        }
        self.pending.touch().streams[slot] = Some(source);
        Ok(())
    }

    /// Draws `count` vertices generated by the vertex shader, without a vertex buffer.
    pub fn set_vertex_count(&mut self, count: u32) {
        self.pending.touch().vertex_count = Some(count);
    }

    /// Binds the index buffer.
    pub fn set_index_buffer(&mut self, source: impl Into<IndexSource>) -> Result<(), RenderError> {
        let source = source.into();
        if let IndexSource::Transient { buffer, .. } = &source {
            self.transient.validate_indices(buffer)?;
        }
        self.pending.touch().index = Some(source);
        Ok(())
    }

    /// Binds per-instance data. The draw is repeated once per instance record.
    pub fn set_instance_data_buffer(
        &mut self,
        source: impl Into<InstanceSource>,
    ) -> Result<(), RenderError> {
        let source = source.into();
        if let InstanceSource::Transient { buffer, .. } = &source {
            self.transient.validate_vertices(buffer)?;
        }
        self.pending.touch().instances = Some(source);
        Ok(())
    }

    /// Binds a texture or frame buffer attachment to `unit`, sampled through
    /// `sampler`. `flags` overrides the texture's sampler state.
    pub fn set_texture(
        &mut self,
        unit: u8,
        sampler: UniformId,
        source: impl Into<TextureSource>,
        flags: Option<SamplerFlags>,
    ) -> Result<(), RenderError> {
        let max = self.config.max_texture_units;
        if unit >= max {
            return Err(BindingError::TextureUnitOutOfRange { unit, max }.into());
        }
        self.pending.touch().textures[usize::from(unit)] = Some(TextureBinding {
            sampler,
            source: source.into(),
            flags,
        });
        Ok(())
    }

    /// Sets a uniform value for the next draw or dispatch. Setting the same uniform
    /// again replaces the earlier value.
    pub fn set_uniform(&mut self, uniform: UniformId, data: UniformData) {
        let pending = self.pending.touch();
        match pending.uniforms.iter_mut().find(|b| b.uniform == uniform) {
            Some(binding) => binding.data = data,
            None => pending.uniforms.push(UniformBinding { uniform, data }),
        }
    }

    /// Caches `matrices` and uses them as the model transforms of the next draw.
    ///
    /// The returned handle can be reused with
    /// [`set_transform_cached`](Self::set_transform_cached) until the frame ends.
    pub fn set_transform(&mut self, matrices: &[Mat4]) -> Result<TransformHandle, RenderError> {
        let handle = self.transforms.push(matrices)?;
        self.pending.touch().transform = Some(TransformRef {
            handle,
            count: handle.count(),
        });
        Ok(handle)
    }

    /// Uses the first `count` matrices of a cached run as model transforms.
    ///
    /// To start inside a run, narrow the handle first with
    /// `TransformHandle::offset` or `TransformHandle::sub_run`.
    pub fn set_transform_cached(
        &mut self,
        handle: TransformHandle,
        count: u32,
    ) -> Result<(), RenderError> {
        self.transforms.get_run(&handle, count)?;
        self.pending.touch().transform = Some(TransformRef { handle, count });
        Ok(())
    }

    /// Reserves `count` transform slots for in-place writing. The slots start as
    /// identity; bind them afterwards with [`set_transform_cached`](Self::set_transform_cached).
    pub fn alloc_transform(
        &mut self,
        count: u32,
    ) -> Result<(TransformHandle, &mut [Mat4]), RenderError> {
        let handle = self.transforms.reserve(count)?;
        let matrices = self.transforms.get_run_mut(&handle)?;
        Ok((handle, matrices))
    }

    /// Caches `rect` and uses it as the scissor of the next draw.
    pub fn set_scissor(&mut self, rect: ViewRect) -> Result<ScissorHandle, RenderError> {
        let handle = self.scissors.push_one(rect)?;
        self.pending.touch().scissor = Some(handle);
        Ok(handle)
    }

    /// Uses a cached scissor for the next draw.
    pub fn set_scissor_cached(&mut self, handle: ScissorHandle) -> Result<(), RenderError> {
        self.scissors.get(&handle)?;
        self.pending.touch().scissor = Some(handle);
        Ok(())
    }

    /// Draws the next submission with the view scissor only.
    pub fn clear_scissor(&mut self) {
        self.pending.touch().scissor = None;
    }

    /// Sets the fixed-function state and the blend factor color (`0xRRGGBBAA`).
    pub fn set_state(&mut self, state: RenderState, blend_factor: Option<u32>) {
        let pending = self.pending.touch();
        pending.render_state = state;
        pending.blend_factor = blend_factor;
    }

    /// Enables the stencil test. `back` defaults to `front`.
    pub fn set_stencil(&mut self, front: StencilFaceState, back: Option<StencilFaceState>) {
        self.pending.touch().stencil = Some(StencilState::new(front, back));
    }

    /// Binds a buffer to a compute stage.
    pub fn set_compute_buffer(
        &mut self,
        stage: u8,
        buffer: ComputeBuffer,
        access: Access,
    ) -> Result<(), RenderError> {
        self.set_compute_binding(stage, ComputeBinding::Buffer { buffer, access })
    }

    /// Binds one mip level of a texture to a compute stage.
    pub fn set_compute_image(
        &mut self,
        stage: u8,
        texture: TextureId,
        mip: u8,
        access: Access,
    ) -> Result<(), RenderError> {
        self.set_compute_binding(
            stage,
            ComputeBinding::Image {
                texture,
                mip,
                access,
            },
        )
    }

    fn set_compute_binding(&mut self, stage: u8, binding: ComputeBinding) -> Result<(), RenderError> {
        let max = self.config.max_compute_bindings;
        if stage >= max {
            return Err(BindingError::ComputeStageOutOfRange { stage, max }.into());
        }
        self.pending.touch().compute[usize::from(stage)] = Some(binding);
        Ok(())
    }
}
