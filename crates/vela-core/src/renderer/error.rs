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

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! Each component reports its own error enum; [`RenderError`] wraps all of them for
//! callers that drive the whole submission model.

use crate::renderer::api::{ProgramId, ViewId};
use crate::renderer::vertex::Attrib;
use std::fmt;

/// An error raised by vertex layout construction, packing, conversion or welding.
///
/// These are caller-contract violations: the operation performed no writes.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A buffer is shorter than the vertices addressed by the call.
    BufferTooSmall {
        /// Bytes needed by the call.
        required: usize,
        /// Bytes actually provided.
        actual: usize,
    },
    /// The same attribute was declared twice in one layout.
    DuplicateAttribute(Attrib),
    /// An attribute was declared with a component count outside `1..=4`.
    InvalidComponentCount {
        /// The offending attribute.
        attrib: Attrib,
        /// The declared component count.
        num: u8,
    },
    /// The layout does not contain an attribute the operation needs.
    MissingAttribute(Attrib),
    /// The layout stride does not fit in a `u16`.
    StrideOverflow,
    /// The weld epsilon is negative or not finite.
    InvalidEpsilon(f32),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::BufferTooSmall { required, actual } => {
                write!(f, "Vertex buffer too small: {required} bytes required, {actual} provided")
            }
            LayoutError::DuplicateAttribute(attrib) => {
                write!(f, "Attribute {attrib:?} declared more than once")
            }
            LayoutError::InvalidComponentCount { attrib, num } => {
                write!(f, "Attribute {attrib:?} declared with {num} components (expected 1 to 4)")
            }
            LayoutError::MissingAttribute(attrib) => {
                write!(f, "Vertex layout has no {attrib:?} attribute")
            }
            LayoutError::StrideOverflow => write!(f, "Vertex layout stride exceeds 65535 bytes"),
            LayoutError::InvalidEpsilon(eps) => {
                write!(f, "Weld epsilon must be finite and non-negative, got {eps}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// An error raised by the view table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    /// The view id is not below the configured view count.
    OutOfRange {
        /// The requested view.
        id: ViewId,
        /// The number of views in the table.
        max: u16,
    },
    /// A palette index is not below the palette size.
    PaletteIndexOutOfRange(u8),
    /// More palette indices than a frame buffer has color attachments.
    TooManyTargets {
        /// Number of indices given.
        count: usize,
        /// Attachment limit.
        max: usize,
    },
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::OutOfRange { id, max } => {
                write!(f, "View {} is out of range (max views: {max})", id.0)
            }
            ViewError::PaletteIndexOutOfRange(index) => {
                write!(f, "Palette index {index} is out of range")
            }
            ViewError::TooManyTargets { count, max } => {
                write!(f, "{count} clear targets given, at most {max} attachments")
            }
        }
    }
}

impl std::error::Error for ViewError {}

/// An error raised when resolving or filling a transform or scissor cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// The handle was issued during an earlier frame.
    Stale {
        /// Generation stamped into the handle.
        handle: u64,
        /// Generation of the cache.
        current: u64,
    },
    /// The ring wrapped around and the slots now hold newer entries.
    Overwritten,
    /// The referenced run does not lie inside the cache.
    OutOfRange {
        /// First slot of the run.
        first: u32,
        /// Number of slots in the run.
        count: u32,
        /// Capacity of the cache.
        capacity: u32,
    },
    /// More entries were requested than the referenced run holds.
    ExceedsRun {
        /// Requested entry count.
        requested: u32,
        /// Entries in the run.
        run: u32,
    },
    /// The request needs more slots than the cache holds.
    TooLarge {
        /// Requested slot count.
        requested: u32,
        /// Capacity of the cache.
        capacity: u32,
    },
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Stale { handle, current } => write!(
                f,
                "Cache handle from frame generation {handle} used in generation {current}"
            ),
            CacheError::Overwritten => write!(f, "Cache entry was overwritten by a newer entry"),
            CacheError::OutOfRange {
                first,
                count,
                capacity,
            } => write!(
                f,
                "Cache run {first}..{} exceeds capacity {capacity}",
                u64::from(*first) + u64::from(*count)
            ),
            CacheError::ExceedsRun { requested, run } => {
                write!(f, "Requested {requested} entries from a cached run of {run}")
            }
            CacheError::TooLarge {
                requested,
                capacity,
            } => write!(f, "Cache request of {requested} slots exceeds capacity {capacity}"),
        }
    }
}

impl std::error::Error for CacheError {}

/// An error raised by the transient arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientError {
    /// Not enough space left in the arena for this frame.
    Exhausted {
        /// Bytes the request needs, alignment included.
        requested: usize,
        /// Bytes left before the request.
        available: usize,
    },
    /// The handle belongs to an earlier frame.
    Stale,
    /// The vertex layout has a zero stride.
    InvalidLayout,
    /// The handle does not describe a region of the arena.
    OutOfBounds,
}

impl fmt::Display for TransientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransientError::Exhausted {
                requested,
                available,
            } => write!(
                f,
                "Transient arena exhausted: {requested} bytes requested, {available} available"
            ),
            TransientError::Stale => write!(f, "Transient buffer belongs to a previous frame"),
            TransientError::InvalidLayout => write!(f, "Vertex layout has a zero stride"),
            TransientError::OutOfBounds => write!(f, "Transient buffer lies outside the arena"),
        }
    }
}

impl std::error::Error for TransientError {}

/// An error raised by a draw-state setter given an index outside its binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingError {
    /// Vertex stream index too large.
    StreamOutOfRange {
        /// Requested stream.
        stream: u8,
        /// Number of streams.
        max: u8,
    },
    /// Texture unit index too large.
    TextureUnitOutOfRange {
        /// Requested unit.
        unit: u8,
        /// Number of texture units.
        max: u8,
    },
    /// Compute stage index too large.
    ComputeStageOutOfRange {
        /// Requested stage.
        stage: u8,
        /// Number of compute stages.
        max: u8,
    },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::StreamOutOfRange { stream, max } => {
                write!(f, "Vertex stream {stream} out of range (max: {max})")
            }
            BindingError::TextureUnitOutOfRange { unit, max } => {
                write!(f, "Texture unit {unit} out of range (max: {max})")
            }
            BindingError::ComputeStageOutOfRange { stage, max } => {
                write!(f, "Compute stage {stage} out of range (max: {max})")
            }
        }
    }
}

impl std::error::Error for BindingError {}

/// A submission the backend refused. The draw or dispatch was not issued.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitError {
    /// The program handle is unknown to the backend.
    InvalidProgram(ProgramId),
    /// A compute program was used for a draw.
    NotGraphicsProgram(ProgramId),
    /// A graphics program was used for a dispatch.
    NotComputeProgram(ProgramId),
    /// The draw has neither a vertex stream nor a vertex count.
    MissingVertexStream,
    /// A bound resource handle is unknown to the backend.
    InvalidHandle {
        /// Resource kind, for diagnostics.
        kind: &'static str,
        /// Raw handle value.
        id: u16,
    },
    /// The program reads an attribute no bound stream provides.
    LayoutMismatch {
        /// The missing attribute.
        attrib: Attrib,
    },
    /// A bound range extends past the end of its buffer.
    RangeOutOfBounds {
        /// Resource kind, for diagnostics.
        kind: &'static str,
        /// Elements addressed by the range end.
        end: u64,
        /// Elements in the buffer.
        len: u32,
    },
    /// A uniform value does not match the declared uniform kind or count.
    UniformMismatch(u16),
    /// The per-frame draw call budget is spent.
    DrawCallLimit(u32),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::InvalidProgram(id) => write!(f, "Invalid program {id:?}"),
            SubmitError::NotGraphicsProgram(id) => {
                write!(f, "Program {id:?} is a compute program and cannot draw")
            }
            SubmitError::NotComputeProgram(id) => {
                write!(f, "Program {id:?} is a graphics program and cannot be dispatched")
            }
            SubmitError::MissingVertexStream => {
                write!(f, "Draw has no vertex stream and no vertex count")
            }
            SubmitError::InvalidHandle { kind, id } => write!(f, "Invalid {kind} handle {id}"),
            SubmitError::LayoutMismatch { attrib } => {
                write!(f, "Program reads {attrib:?} but no bound stream provides it")
            }
            SubmitError::RangeOutOfBounds { kind, end, len } => {
                write!(f, "{kind} range ends at {end} but the buffer holds {len} elements")
            }
            SubmitError::UniformMismatch(id) => {
                write!(f, "Uniform {id} value does not match its declaration")
            }
            SubmitError::DrawCallLimit(max) => {
                write!(f, "Draw call limit of {max} per frame reached")
            }
        }
    }
}

impl std::error::Error for SubmitError {}

/// A high-level error returned by the submission model.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Vertex layout or packing error.
    Layout(LayoutError),
    /// View table error.
    View(ViewError),
    /// Transform or scissor cache error.
    Cache(CacheError),
    /// Transient arena error.
    Transient(TransientError),
    /// Draw-state binding error.
    Binding(BindingError),
    /// Backend rejection.
    Submit(SubmitError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Layout(err) => write!(f, "Vertex layout error: {err}"),
            RenderError::View(err) => write!(f, "View error: {err}"),
            RenderError::Cache(err) => write!(f, "State cache error: {err}"),
            RenderError::Transient(err) => write!(f, "Transient allocation error: {err}"),
            RenderError::Binding(err) => write!(f, "Binding error: {err}"),
            RenderError::Submit(err) => write!(f, "Submission rejected: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Layout(err) => Some(err),
            RenderError::View(err) => Some(err),
            RenderError::Cache(err) => Some(err),
            RenderError::Transient(err) => Some(err),
            RenderError::Binding(err) => Some(err),
            RenderError::Submit(err) => Some(err),
        }
    }
}

impl From<LayoutError> for RenderError {
    fn from(err: LayoutError) -> Self {
        RenderError::Layout(err)
    }
}

impl From<ViewError> for RenderError {
    fn from(err: ViewError) -> Self {
        RenderError::View(err)
    }
}

impl From<CacheError> for RenderError {
    fn from(err: CacheError) -> Self {
        RenderError::Cache(err)
    }
}

impl From<TransientError> for RenderError {
    fn from(err: TransientError) -> Self {
        RenderError::Transient(err)
    }
}

impl From<BindingError> for RenderError {
    fn from(err: BindingError) -> Self {
        RenderError::Binding(err)
    }
}

impl From<SubmitError> for RenderError {
    fn from(err: SubmitError) -> Self {
        RenderError::Submit(err)
    }
}
