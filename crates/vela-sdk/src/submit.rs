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

//! The submission pipeline: resolves the pending state into a command and hands it
//! to the backend.

use crate::encoder::PendingDraw;
use crate::renderer::Renderer;
use vela_core::renderer::{
    ComputeCommand, ComputeStageBinding, DrawCommand, IndirectBufferId, IndirectRange,
    ProgramId, RenderBackend, RenderError, StreamBinding, SubmitError, TextureUnitBinding,
    ViewId,
};

impl<B: RenderBackend> Renderer<B> {
    /// Submits the pending state as one draw of `program` into `view`.
    ///
    /// `depth` is the sort key within the view; sequential views ignore it.
    /// ## Returns
    /// The number of draw calls issued. A draw the backend refuses issues none and
    /// is recorded in [`last_submit_error`](Self::last_submit_error).
    /// ## Errors
    /// * `RenderError::View` - `view` is outside the view table.
    /// * `RenderError::Cache` - a cached transform or scissor no longer holds its values.
    ///
    /// The pending state is reset in every case.
    pub fn submit(
        &mut self,
        view: ViewId,
        program: ProgramId,
        depth: u32,
    ) -> Result<u32, RenderError> {
        let pending = std::mem::take(&mut self.pending);
        self.views.check(view)?;
        let command = self.resolve_draw(program, pending)?;
        Ok(self.forward_draw(view, command, depth))
    }

    /// Submits the pending state as `count` draws read from an indirect buffer,
    /// starting at command `start`.
    ///
    /// Behaves like [`submit`](Self::submit) otherwise. `count` may be
    /// [`ALL_ELEMENTS`](vela_core::renderer::ALL_ELEMENTS) to run to the end of
    /// the buffer.
    pub fn submit_indirect(
        &mut self,
        view: ViewId,
        program: ProgramId,
        indirect: IndirectBufferId,
        start: u32,
        count: u32,
        depth: u32,
    ) -> Result<u32, RenderError> {
        let pending = std::mem::take(&mut self.pending);
        self.views.check(view)?;
        let mut command = self.resolve_draw(program, pending)?;
        command.indirect = Some(IndirectRange {
            buffer: indirect,
            start,
            count,
        });
        Ok(self.forward_draw(view, command, depth))
    }

    /// Dispatches `program` over `x * y * z` work groups into `view`, using the
    /// pending compute bindings and uniforms.
    ///
    /// The whole pending state is reset, including draw-only fields.
    pub fn dispatch(
        &mut self,
        view: ViewId,
        program: ProgramId,
        x: u32,
        y: u32,
        z: u32,
    ) -> Result<(), RenderError> {
        let pending = std::mem::take(&mut self.pending);
        self.views.check(view)?;

        let command = ComputeCommand {
            program,
            bindings: pending
                .compute
                .iter()
                .enumerate()
                .filter_map(|(stage, binding)| {
                    binding.map(|binding| ComputeStageBinding {
                        stage: stage as u8,
                        binding,
                    })
                })
                .collect(),
            uniforms: pending.uniforms,
            groups: [x, y, z],
        };

        match self.backend.dispatch(view, command) {
            Ok(()) => {
                if x != 0 && y != 0 && z != 0 {
                    self.stats.dispatches += 1;
                }
                log::trace!("Dispatched {program:?} into view {} ({x}x{y}x{z})", view.0);
            }
            Err(err) => self.reject(view, err),
        }
        Ok(())
    }

    /// Drops the pending state without submitting it.
    pub fn discard(&mut self) {
        if std::mem::take(&mut self.pending).is_pending() {
            self.stats.discards += 1;
        }
    }

    fn resolve_draw(
        &self,
        program: ProgramId,
        pending: PendingDraw,
    ) -> Result<DrawCommand, RenderError> {
        let transforms = match pending.transform {
            Some(t) => self.transforms.get_run(&t.handle, t.count)?.to_vec(),
            None => Vec::new(),
        };
        let scissor = pending
            .scissor
            .map(|handle| self.scissors.get(&handle))
            .transpose()?;

        Ok(DrawCommand {
            program,
            streams: pending
                .streams
                .iter()
                .enumerate()
                .filter_map(|(stream, source)| {
                    source.map(|source| StreamBinding {
                        stream: stream as u8,
                        source,
                    })
                })
                .collect(),
            vertex_count: pending.vertex_count,
            index: pending.index,
            instances: pending.instances,
            textures: pending
                .textures
                .iter()
                .enumerate()
                .filter_map(|(unit, binding)| {
                    binding.map(|binding| TextureUnitBinding {
                        unit: unit as u8,
                        binding,
                    })
                })
                .collect(),
            uniforms: pending.uniforms,
            transforms,
            scissor,
            state: pending.render_state,
            blend_factor: pending.blend_factor,
            stencil: pending.stencil,
            indirect: None,
        })
    }

    fn forward_draw(&mut self, view: ViewId, command: DrawCommand, depth: u32) -> u32 {
        let program = command.program;
        match self.backend.submit(view, command, depth) {
            Ok(issued) => {
                self.stats.draw_calls += issued;
                log::trace!(
                    "Submitted {program:?} into view {} at depth {depth}: {issued} draw calls",
                    view.0
                );
                issued
            }
            Err(err) => {
                self.reject(view, err);
                0
            }
        }
    }

    fn reject(&mut self, view: ViewId, err: SubmitError) {
        log::warn!("Submission to view {} rejected: {err}", view.0);
        self.stats.rejected_submissions += 1;
        self.last_submit_error = Some(err);
    }
}
