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

//! The headless implementation of the `RenderBackend` trait.

use super::record::{CommandKind, DrawRecord, FrameRecord, RecordedCommand, ResolvedClear, ViewPass};
use super::resources::{
    CreateError, IndexBufferEntry, IndexFormat, ProgramKind, Registry, TextureEntry,
    UniformEntry, VertexBufferEntry,
};
use std::collections::BTreeMap;
use std::hash::Hash;
use vela_core::math::Mat4;
use vela_core::renderer::*;

/// A render backend that validates and records work instead of executing it.
///
/// Resources are created through the `create_*` methods, which mint the handles
/// the submission model binds. Every draw and dispatch is checked against that
/// registry before being recorded, and [`advance_frame`](RenderBackend::advance_frame)
/// turns the recorded work into a [`FrameRecord`].
#[derive(Debug)]
pub struct HeadlessBackend {
    limits: BackendLimits,

    programs: Registry<ProgramId, ProgramKind>,
    vertex_buffers: Registry<VertexBufferId, VertexBufferEntry>,
    dynamic_vertex_buffers: Registry<DynamicVertexBufferId, VertexBufferEntry>,
    index_buffers: Registry<IndexBufferId, IndexBufferEntry>,
    dynamic_index_buffers: Registry<DynamicIndexBufferId, IndexBufferEntry>,
    textures: Registry<TextureId, TextureEntry>,
    frame_buffers: Registry<FrameBufferId, Vec<TextureId>>,
    uniforms: Registry<UniformId, UniformEntry>,
    indirect_buffers: Registry<IndirectBufferId, u32>,

    pending: Vec<RecordedCommand>,
    sequence: u32,
    draw_calls: u32,
    dispatches: u32,

    frames_completed: u64,
    last_frame: Option<FrameRecord>,
}

impl HeadlessBackend {
    /// Creates a backend reporting `limits`.
    pub fn new(limits: BackendLimits) -> Self {
        log::info!(
            "Headless backend created ({} views, {} transient bytes, {} draw calls per frame)",
            limits.max_views,
            limits.transient_bytes,
            limits.max_draw_calls
        );
        Self {
            limits,
            programs: Registry::new("program"),
            vertex_buffers: Registry::new("vertex buffer"),
            dynamic_vertex_buffers: Registry::new("dynamic vertex buffer"),
            index_buffers: Registry::new("index buffer"),
            dynamic_index_buffers: Registry::new("dynamic index buffer"),
            textures: Registry::new("texture"),
            frame_buffers: Registry::new("frame buffer"),
            uniforms: Registry::new("uniform"),
            indirect_buffers: Registry::new("indirect buffer"),
            pending: Vec::new(),
            sequence: 0,
            draw_calls: 0,
            dispatches: 0,
            frames_completed: 0,
            last_frame: None,
        }
    }

    // --- Resource creation ---

    /// Registers a graphics or compute program.
    pub fn create_program(&mut self, kind: ProgramKind) -> Result<ProgramId, CreateError> {
        self.programs.insert(ProgramId, kind)
    }

    /// Registers an immutable vertex buffer of `count` vertices.
    pub fn create_vertex_buffer(
        &mut self,
        layout: VertexLayout,
        count: u32,
    ) -> Result<VertexBufferId, CreateError> {
        self.vertex_buffers
            .insert(VertexBufferId, VertexBufferEntry { layout, count })
    }

    /// Registers an updatable vertex buffer of `count` vertices.
    pub fn create_dynamic_vertex_buffer(
        &mut self,
        layout: VertexLayout,
        count: u32,
    ) -> Result<DynamicVertexBufferId, CreateError> {
        self.dynamic_vertex_buffers
            .insert(DynamicVertexBufferId, VertexBufferEntry { layout, count })
    }

    /// Registers an immutable index buffer of `count` indices.
    pub fn create_index_buffer(
        &mut self,
        count: u32,
        format: IndexFormat,
    ) -> Result<IndexBufferId, CreateError> {
        self.index_buffers
            .insert(IndexBufferId, IndexBufferEntry { count, format })
    }

    /// Registers an updatable index buffer of `count` indices.
    pub fn create_dynamic_index_buffer(
        &mut self,
        count: u32,
        format: IndexFormat,
    ) -> Result<DynamicIndexBufferId, CreateError> {
        self.dynamic_index_buffers
            .insert(DynamicIndexBufferId, IndexBufferEntry { count, format })
    }

    /// Registers a texture with `mips` mip levels.
    pub fn create_texture(&mut self, mips: u8) -> Result<TextureId, CreateError> {
        self.textures
            .insert(TextureId, TextureEntry { mips: mips.max(1) })
    }

    /// Registers a frame buffer whose color attachments are `attachments`.
    pub fn create_frame_buffer(
        &mut self,
        attachments: &[TextureId],
    ) -> Result<FrameBufferId, CreateError> {
        if let Some(unknown) = attachments.iter().find(|t| !self.textures.contains(**t)) {
            return Err(CreateError::UnknownAttachment(unknown.0));
        }
        self.frame_buffers
            .insert(FrameBufferId, attachments.to_vec())
    }

    /// Registers a uniform of `kind` with `count` array elements.
    pub fn create_uniform(
        &mut self,
        name: &str,
        kind: UniformKind,
        count: u16,
    ) -> Result<UniformId, CreateError> {
        self.uniforms.insert(
            UniformId,
            UniformEntry {
                name: name.to_owned(),
                kind,
                count: count.max(1),
            },
        )
    }

    /// Registers an indirect buffer holding `count` draw commands.
    pub fn create_indirect_buffer(&mut self, count: u32) -> Result<IndirectBufferId, CreateError> {
        self.indirect_buffers.insert(IndirectBufferId, count)
    }

    // --- Inspection ---

    /// The record of the most recently finished frame.
    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.last_frame.as_ref()
    }

    /// Takes the record of the most recently finished frame.
    pub fn take_last_frame(&mut self) -> Option<FrameRecord> {
        self.last_frame.take()
    }

    /// Frames finished so far.
    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    /// Commands recorded since the last frame end.
    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }

    /// Number of live resources across every kind.
    pub fn resource_count(&self) -> usize {
        self.programs.len()
            + self.vertex_buffers.len()
            + self.dynamic_vertex_buffers.len()
            + self.index_buffers.len()
            + self.dynamic_index_buffers.len()
            + self.textures.len()
            + self.frame_buffers.len()
            + self.uniforms.len()
            + self.indirect_buffers.len()
    }

    // --- Validation ---

    fn check_view(&self, view: ViewId) -> Result<(), SubmitError> {
        if view.0 >= self.limits.max_views {
            return Err(SubmitError::InvalidHandle {
                kind: "view",
                id: view.0,
            });
        }
        Ok(())
    }

    fn stream_extent(&self, source: &VertexStream) -> Result<(VertexLayout, u32), SubmitError> {
        match *source {
            VertexStream::Static {
                buffer,
                first,
                count,
            } => {
                let entry = lookup(&self.vertex_buffers, buffer, buffer.0)?;
                let count = resolve_range(self.vertex_buffers.kind(), first, count, entry.count)?;
                Ok((entry.layout, count))
            }
            VertexStream::Dynamic {
                buffer,
                first,
                count,
            } => {
                let entry = lookup(&self.dynamic_vertex_buffers, buffer, buffer.0)?;
                let count =
                    resolve_range(self.dynamic_vertex_buffers.kind(), first, count, entry.count)?;
                Ok((entry.layout, count))
            }
            VertexStream::Transient {
                buffer,
                first,
                count,
            } => {
                let count = resolve_range("transient vertex buffer", first, count, buffer.count)?;
                Ok((buffer.layout, count))
            }
        }
    }

    fn index_extent(&self, source: &IndexSource) -> Result<(u32, IndexFormat), SubmitError> {
        match *source {
            IndexSource::Static {
                buffer,
                first,
                count,
            } => {
                let entry = lookup(&self.index_buffers, buffer, buffer.0)?;
                let count = resolve_range(self.index_buffers.kind(), first, count, entry.count)?;
                Ok((count, entry.format))
            }
            IndexSource::Dynamic {
                buffer,
                first,
                count,
            } => {
                let entry = lookup(&self.dynamic_index_buffers, buffer, buffer.0)?;
                let count =
                    resolve_range(self.dynamic_index_buffers.kind(), first, count, entry.count)?;
                Ok((count, entry.format))
            }
            IndexSource::Transient {
                buffer,
                first,
                count,
            } => {
                let count = resolve_range("transient index buffer", first, count, buffer.count)?;
                Ok((count, IndexFormat::Uint16))
            }
        }
    }

    fn instance_extent(&self, source: &InstanceSource) -> Result<u32, SubmitError> {
        match *source {
            InstanceSource::Static {
                buffer,
                first,
                count,
            } => {
                let entry = lookup(&self.vertex_buffers, buffer, buffer.0)?;
                resolve_range("instance buffer", first, count, entry.count)
            }
            InstanceSource::Dynamic {
                buffer,
                first,
                count,
            } => {
                let entry = lookup(&self.dynamic_vertex_buffers, buffer, buffer.0)?;
                resolve_range("instance buffer", first, count, entry.count)
            }
            InstanceSource::Transient {
                buffer,
                first,
                count,
            } => resolve_range("transient instance buffer", first, count, buffer.count),
        }
    }

    fn check_texture(&self, binding: &TextureBinding) -> Result<(), SubmitError> {
        let sampler = lookup(&self.uniforms, binding.sampler, binding.sampler.0)?;
        if sampler.kind != UniformKind::Sampler {
            log::debug!("Uniform '{}' bound as a sampler is {:?}", sampler.name, sampler.kind);
            return Err(SubmitError::UniformMismatch(binding.sampler.0));
        }
        match binding.source {
            TextureSource::Texture(texture) => {
                lookup(&self.textures, texture, texture.0)?;
            }
            TextureSource::FrameBuffer {
                frame_buffer,
                attachment,
            } => {
                let attachments = lookup(&self.frame_buffers, frame_buffer, frame_buffer.0)?;
                if usize::from(attachment) >= attachments.len() {
                    return Err(SubmitError::InvalidHandle {
                        kind: "frame buffer attachment",
                        id: u16::from(attachment),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_uniforms(&self, uniforms: &[UniformBinding]) -> Result<(), SubmitError> {
        for binding in uniforms {
            let entry = lookup(&self.uniforms, binding.uniform, binding.uniform.0)?;
            let len = binding.data.len();
            if binding.data.kind() != entry.kind || len == 0 || len > usize::from(entry.count) {
                log::debug!(
                    "Uniform '{}' declared as {}x{:?} received {}x{:?}",
                    entry.name,
                    entry.count,
                    entry.kind,
                    len,
                    binding.data.kind()
                );
                return Err(SubmitError::UniformMismatch(binding.uniform.0));
            }
        }
        Ok(())
    }

    fn check_compute_binding(&self, binding: &ComputeBinding) -> Result<(), SubmitError> {
        match *binding {
            ComputeBinding::Buffer { buffer, .. } => match buffer {
                ComputeBuffer::Index(id) => lookup(&self.index_buffers, id, id.0).map(|_| ()),
                ComputeBuffer::DynamicIndex(id) => {
                    lookup(&self.dynamic_index_buffers, id, id.0).map(|_| ())
                }
                ComputeBuffer::Vertex(id) => lookup(&self.vertex_buffers, id, id.0).map(|_| ()),
                ComputeBuffer::DynamicVertex(id) => {
                    lookup(&self.dynamic_vertex_buffers, id, id.0).map(|_| ())
                }
                ComputeBuffer::Indirect(id) => {
                    lookup(&self.indirect_buffers, id, id.0).map(|_| ())
                }
            },
            ComputeBinding::Image { texture, mip, .. } => {
                let entry = lookup(&self.textures, texture, texture.0)?;
                if mip >= entry.mips {
                    return Err(SubmitError::InvalidHandle {
                        kind: "texture mip",
                        id: u16::from(mip),
                    });
                }
                Ok(())
            }
        }
    }

    /// Validates a draw and derives its counts. Nothing is recorded here.
    fn validate_draw(&self, command: &DrawCommand) -> Result<DrawRecord, SubmitError> {
        let attributes = match lookup(&self.programs, command.program, command.program.0)? {
            ProgramKind::Graphics { attributes } => attributes,
            ProgramKind::Compute => return Err(SubmitError::NotGraphicsProgram(command.program)),
        };

        if command.streams.is_empty() && command.vertex_count.is_none() {
            return Err(SubmitError::MissingVertexStream);
        }

        let mut layouts = Vec::with_capacity(command.streams.len());
        let mut stream_vertices: Option<u32> = None;
        for binding in &command.streams {
            let (layout, count) = self.stream_extent(&binding.source)?;
            layouts.push(layout);
            stream_vertices = Some(stream_vertices.map_or(count, |min| min.min(count)));
        }

        if let Some(&attrib) = attributes
            .iter()
            .find(|&&attrib| !layouts.iter().any(|layout| layout.has(attrib)))
        {
            return Err(SubmitError::LayoutMismatch { attrib });
        }

        let index = command
            .index
            .as_ref()
            .map(|source| self.index_extent(source))
            .transpose()?;
        let instance_count = match &command.instances {
            Some(source) => self.instance_extent(source)?,
            None => 1,
        };

        for unit in &command.textures {
            self.check_texture(&unit.binding)?;
        }
        self.check_uniforms(&command.uniforms)?;

        let element_count = match (index, stream_vertices) {
            (Some((count, _)), _) => count,
            (None, Some(count)) => count,
            (None, None) => command.vertex_count.unwrap_or(0),
        };

        let draw_calls = match &command.indirect {
            Some(range) => {
                let len = *lookup(&self.indirect_buffers, range.buffer, range.buffer.0)?;
                resolve_range(self.indirect_buffers.kind(), range.start, range.count, len)?
            }
            None if element_count == 0 || instance_count == 0 => 0,
            None => 1,
        };

        Ok(DrawRecord {
            command: command.clone(),
            draw_calls,
            element_count,
            instance_count,
            index_format: index.map(|(_, format)| format),
            scissor: None,
            model_view_projection: Mat4::IDENTITY,
        })
    }

    fn record(&mut self, view: ViewId, sort_key: u32, kind: CommandKind) {
        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        self.pending.push(RecordedCommand {
            view,
            sort_key,
            sequence,
            kind,
        });
    }

    fn attachment_count(&self, frame_buffer: Option<FrameBufferId>) -> usize {
        frame_buffer
            .and_then(|fb| self.frame_buffers.get(fb))
            .map_or(1, |attachments| attachments.len().max(1))
    }

    fn build_pass(
        &self,
        id: u16,
        mut commands: Vec<RecordedCommand>,
        frame: &FrameData<'_>,
    ) -> ViewPass {
        let view = ViewId(id);
        let fallback;
        let config = match frame.views.get(usize::from(id)) {
            Some(config) => config,
            None => {
                fallback = ViewConfig::new(view);
                &fallback
            }
        };

        if !config.sequential {
            commands.sort_by_key(RecordedCommand::order_key);
        }

        let view_projection = config.projection * config.view;
        for command in &mut commands {
            if let CommandKind::Draw(draw) = &mut command.kind {
                draw.scissor = match (draw.command.scissor, config.scissor) {
                    (Some(own), Some(view_scissor)) => Some(own.intersect(&view_scissor)),
                    (own, view_scissor) => own.or(view_scissor),
                };
                let model = draw.command.transforms.first().copied().unwrap_or_default();
                draw.model_view_projection = view_projection * model;
            }
        }

        ViewPass {
            view,
            name: config.name.clone(),
            rect: config.rect,
            frame_buffer: config.frame_buffer,
            clear: ResolvedClear::resolve(
                &config.clear,
                self.attachment_count(config.frame_buffer),
                frame.palette,
            ),
            commands,
        }
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(BackendLimits::default())
    }
}

impl RenderBackend for HeadlessBackend {
    fn limits(&self) -> BackendLimits {
        self.limits
    }

    fn submit(
        &mut self,
        view: ViewId,
        command: DrawCommand,
        sort_key: u32,
    ) -> Result<u32, SubmitError> {
        self.check_view(view)?;
        let draw = self.validate_draw(&command)?;
        if draw.draw_calls == 0 {
            return Ok(0);
        }

        let total = u64::from(self.draw_calls) + u64::from(draw.draw_calls);
        if total > u64::from(self.limits.max_draw_calls) {
            return Err(SubmitError::DrawCallLimit(self.limits.max_draw_calls));
        }

        let issued = draw.draw_calls;
        self.draw_calls += issued;
        self.record(view, sort_key, CommandKind::Draw(draw));
        Ok(issued)
    }

    fn dispatch(&mut self, view: ViewId, command: ComputeCommand) -> Result<(), SubmitError> {
        self.check_view(view)?;
        match lookup(&self.programs, command.program, command.program.0)? {
            ProgramKind::Compute => {}
            ProgramKind::Graphics { .. } => {
                return Err(SubmitError::NotComputeProgram(command.program))
            }
        }
        for stage in &command.bindings {
            self.check_compute_binding(&stage.binding)?;
        }
        self.check_uniforms(&command.uniforms)?;

        if command.groups.contains(&0) {
            log::trace!("Skipping empty dispatch of {:?}", command.program);
            return Ok(());
        }

        self.dispatches += 1;
        self.record(view, 0, CommandKind::Dispatch(command));
        Ok(())
    }

    fn advance_frame(&mut self, frame: &FrameData<'_>) -> u64 {
        let mut by_view: BTreeMap<u16, Vec<RecordedCommand>> = BTreeMap::new();
        for command in self.pending.drain(..) {
            by_view.entry(command.view.0).or_default().push(command);
        }
        for (id, config) in frame.views.iter().enumerate() {
            if !config.clear.flags.is_empty() {
                if let Ok(id) = u16::try_from(id) {
                    by_view.entry(id).or_default();
                }
            }
        }

        let passes: Vec<ViewPass> = by_view
            .into_iter()
            .map(|(id, commands)| self.build_pass(id, commands, frame))
            .collect();

        let record = FrameRecord {
            number: frame.number,
            passes,
            transient: frame.transient.to_vec(),
            draw_calls: self.draw_calls,
            dispatches: self.dispatches,
        };

        log::debug!(
            "Frame {} finished: {} passes, {} draw calls, {} dispatches, {} transient bytes",
            record.number,
            record.passes.len(),
            record.draw_calls,
            record.dispatches,
            record.transient.len()
        );

        self.last_frame = Some(record);
        self.sequence = 0;
        self.draw_calls = 0;
        self.dispatches = 0;
        self.frames_completed += 1;
        self.frames_completed
    }
}

fn lookup<K: Copy + Eq + Hash, V>(
    registry: &Registry<K, V>,
    id: K,
    raw: u16,
) -> Result<&V, SubmitError> {
    registry.get(id).ok_or(SubmitError::InvalidHandle {
        kind: registry.kind(),
        id: raw,
    })
}

/// Resolves `count` (or [`ALL_ELEMENTS`]) to the number of elements read from a
/// buffer of `len`, rejecting ranges that end past it.
fn resolve_range(kind: &'static str, first: u32, count: u32, len: u32) -> Result<u32, SubmitError> {
    let count = if count == ALL_ELEMENTS {
        len.saturating_sub(first)
    } else {
        count
    };
    let end = u64::from(first) + u64::from(count);
    if end > u64::from(len) {
        return Err(SubmitError::RangeOutOfBounds { kind, end, len });
    }
    Ok(count)
}
