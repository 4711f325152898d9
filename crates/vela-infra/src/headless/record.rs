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

//! What the headless backend records for each finished frame.

use super::resources::IndexFormat;
use vela_core::math::{LinearRgba, Mat4};
use vela_core::renderer::{
    ClearColor, ClearConfig, ClearFlags, ComputeCommand, DrawCommand, FrameBufferId, ProgramId,
    ViewId, ViewRect, CLEAR_TARGET_NONE,
};

/// A draw accepted by the backend, with its derived counts.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    /// The command as submitted.
    pub command: DrawCommand,
    /// Draw calls it issues: one, or the indirect command count.
    pub draw_calls: u32,
    /// Indices drawn, or vertices for non-indexed draws.
    pub element_count: u32,
    /// Instances drawn.
    pub instance_count: u32,
    /// Width of the bound indices.
    pub index_format: Option<IndexFormat>,
    /// Draw scissor combined with the view scissor. Filled at frame end.
    pub scissor: Option<ViewRect>,
    /// `projection * view * model` of the first transform. Filled at frame end.
    pub model_view_projection: Mat4,
}

/// A recorded draw or dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    /// A draw.
    Draw(DrawRecord),
    /// A compute dispatch.
    Dispatch(ComputeCommand),
}

impl CommandKind {
    /// The program the command runs.
    pub fn program(&self) -> ProgramId {
        match self {
            CommandKind::Draw(draw) => draw.command.program,
            CommandKind::Dispatch(dispatch) => dispatch.program,
        }
    }
}

/// A command with the ordering information it was submitted with.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommand {
    /// The target view.
    pub view: ViewId,
    /// Sort key given at submission. Zero for dispatches.
    pub sort_key: u32,
    /// Submission order within the frame.
    pub sequence: u32,
    /// The command.
    pub kind: CommandKind,
}

impl RecordedCommand {
    /// Execution order inside a sorted view: dispatches first in submission order,
    /// then draws by sort key and program.
    pub(crate) fn order_key(&self) -> (bool, u32, u16, u32) {
        match &self.kind {
            CommandKind::Dispatch(_) => (false, 0, 0, self.sequence),
            CommandKind::Draw(draw) => (true, self.sort_key, draw.command.program.0, self.sequence),
        }
    }
}

/// Clear values with palette indices resolved to colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedClear {
    /// Targets cleared.
    pub flags: ClearFlags,
    /// One entry per color attachment; `None` leaves the attachment untouched.
    pub colors: Vec<Option<LinearRgba>>,
    /// Depth clear value.
    pub depth: f32,
    /// Stencil clear value.
    pub stencil: u8,
}

impl ResolvedClear {
    pub(crate) fn resolve(clear: &ClearConfig, attachments: usize, palette: &[LinearRgba]) -> Self {
        let colors = if clear.flags.contains(ClearFlags::COLOR) {
            match clear.color {
                ClearColor::Rgba(rgba) => vec![Some(LinearRgba::from_rgba_u32(rgba)); attachments],
                ClearColor::Palette(indices) => indices
                    .iter()
                    .take(attachments)
                    .map(|&index| match index {
                        CLEAR_TARGET_NONE => None,
                        index => {
                            let color = palette.get(index as usize).copied();
                            if color.is_none() {
                                log::warn!("Clear palette index {index} is out of range");
                            }
                            color
                        }
                    })
                    .collect(),
            }
        } else {
            Vec::new()
        };

        Self {
            flags: clear.flags,
            colors,
            depth: clear.depth,
            stencil: clear.stencil,
        }
    }
}

/// The work of one view in a finished frame, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPass {
    /// The view.
    pub view: ViewId,
    /// Its debug name.
    pub name: String,
    /// Viewport.
    pub rect: ViewRect,
    /// Render target, `None` for the backbuffer.
    pub frame_buffer: Option<FrameBufferId>,
    /// Clear performed before the first command.
    pub clear: ResolvedClear,
    /// Commands in execution order.
    pub commands: Vec<RecordedCommand>,
}

/// Everything that happened in one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameRecord {
    /// Frame number.
    pub number: u64,
    /// Views with work or a clear, by ascending view id.
    pub passes: Vec<ViewPass>,
    /// Copy of the transient arena contents used by the frame.
    pub transient: Vec<u8>,
    /// Draw calls issued.
    pub draw_calls: u32,
    /// Dispatches issued.
    pub dispatches: u32,
}

impl FrameRecord {
    /// The pass of `view`, if it had work or a clear.
    pub fn pass(&self, view: ViewId) -> Option<&ViewPass> {
        self.passes.iter().find(|p| p.view == view)
    }

    /// Iterates the draws of every pass in execution order.
    pub fn draws(&self) -> impl Iterator<Item = &DrawRecord> + '_ {
        self.passes
            .iter()
            .flat_map(|p| p.commands.iter())
            .filter_map(|c| match &c.kind {
                CommandKind::Draw(draw) => Some(draw),
                CommandKind::Dispatch(_) => None,
            })
    }
}
