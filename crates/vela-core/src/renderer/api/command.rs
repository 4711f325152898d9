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

//! Self-contained draw and compute commands as handed to a backend, plus the
//! per-frame snapshot delivered on frame advance.

use super::binding::*;
use super::handles::{IndirectBufferId, ProgramId};
use super::state::{RenderState, StencilState};
use super::view::{ViewConfig, ViewRect};
use crate::math::{LinearRgba, Mat4};

/// A range of pre-encoded commands in an indirect buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndirectRange {
    /// The buffer holding the commands.
    pub buffer: IndirectBufferId,
    /// First command executed.
    pub start: u32,
    /// Commands executed.
    pub count: u32,
}

/// A vertex stream slot with its source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamBinding {
    /// Stream index, below [`MAX_VERTEX_STREAMS`](super::limits::MAX_VERTEX_STREAMS).
    pub stream: u8,
    /// The bound buffer and range.
    pub source: VertexStream,
}

/// A texture unit with its binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureUnitBinding {
    /// Unit index.
    pub unit: u8,
    /// The binding.
    pub binding: TextureBinding,
}

/// A compute stage with its binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeStageBinding {
    /// Stage index.
    pub stage: u8,
    /// The binding.
    pub binding: ComputeBinding,
}

/// Everything a backend needs to issue one draw, with cache references resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Graphics program.
    pub program: ProgramId,
    /// Bound vertex streams, ordered by stream index.
    pub streams: Vec<StreamBinding>,
    /// Vertex count for draws without a vertex stream.
    pub vertex_count: Option<u32>,
    /// Index buffer, `None` for non-indexed draws.
    pub index: Option<IndexSource>,
    /// Instance data, `None` for a single instance.
    pub instances: Option<InstanceSource>,
    /// Bound texture units, ordered by unit.
    pub textures: Vec<TextureUnitBinding>,
    /// Uniform values in the order they were set.
    pub uniforms: Vec<UniformBinding>,
    /// Model transforms. Empty means identity.
    pub transforms: Vec<Mat4>,
    /// Draw scissor, `None` to use the view's.
    pub scissor: Option<ViewRect>,
    /// Fixed-function state.
    pub state: RenderState,
    /// Blend factor color as `0xRRGGBBAA`.
    pub blend_factor: Option<u32>,
    /// Stencil state, `None` to disable the stencil test.
    pub stencil: Option<StencilState>,
    /// Indirect command range, for indirect submission.
    pub indirect: Option<IndirectRange>,
}

impl DrawCommand {
    /// Creates a draw of `program` with no bindings and default state.
    pub fn new(program: ProgramId) -> Self {
        Self {
            program,
            streams: Vec::new(),
            vertex_count: None,
            index: None,
            instances: None,
            textures: Vec::new(),
            uniforms: Vec::new(),
            transforms: Vec::new(),
            scissor: None,
            state: RenderState::default(),
            blend_factor: None,
            stencil: None,
            indirect: None,
        }
    }
}

/// Everything a backend needs to issue one compute dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeCommand {
    /// Compute program.
    pub program: ProgramId,
    /// Bound buffers and images, ordered by stage.
    pub bindings: Vec<ComputeStageBinding>,
    /// Uniform values in the order they were set.
    pub uniforms: Vec<UniformBinding>,
    /// Work group counts along x, y and z.
    pub groups: [u32; 3],
}

/// The state a backend receives when a frame ends.
#[derive(Debug, Clone, Copy)]
pub struct FrameData<'a> {
    /// Number of the frame being finished.
    pub number: u64,
    /// The view table, indexed by view id.
    pub views: &'a [ViewConfig],
    /// The clear color palette.
    pub palette: &'a [LinearRgba],
    /// The used part of the transient arena.
    pub transient: &'a [u8],
}
