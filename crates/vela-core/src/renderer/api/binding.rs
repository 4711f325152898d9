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

//! Resource bindings a draw or dispatch accumulates before submission.
//!
//! Vertex, index and instance sources are tagged by storage kind: immutable
//! (`Static`), updatable between frames (`Dynamic`) or per-frame (`Transient`).
//! Each carries the element range the draw reads.

use super::handles::*;
use super::transient::{TransientIndexBuffer, TransientVertexBuffer};
use crate::math::Mat4;
use crate::vela_bitflags;

/// Element count meaning "to the end of the buffer".
pub const ALL_ELEMENTS: u32 = u32::MAX;

/// A vertex buffer bound to one stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexStream {
    /// An immutable buffer.
    Static {
        /// The buffer.
        buffer: VertexBufferId,
        /// First vertex read.
        first: u32,
        /// Vertices read, or [`ALL_ELEMENTS`].
        count: u32,
    },
    /// An updatable buffer.
    Dynamic {
        /// The buffer.
        buffer: DynamicVertexBufferId,
        /// First vertex read.
        first: u32,
        /// Vertices read, or [`ALL_ELEMENTS`].
        count: u32,
    },
    /// A transient allocation. The range is relative to the allocation.
    Transient {
        /// The allocation.
        buffer: TransientVertexBuffer,
        /// First vertex read.
        first: u32,
        /// Vertices read, or [`ALL_ELEMENTS`].
        count: u32,
    },
}

impl From<VertexBufferId> for VertexStream {
    fn from(buffer: VertexBufferId) -> Self {
        VertexStream::Static {
            buffer,
            first: 0,
            count: ALL_ELEMENTS,
        }
    }
}

impl From<DynamicVertexBufferId> for VertexStream {
    fn from(buffer: DynamicVertexBufferId) -> Self {
        VertexStream::Dynamic {
            buffer,
            first: 0,
            count: ALL_ELEMENTS,
        }
    }
}

impl From<TransientVertexBuffer> for VertexStream {
    fn from(buffer: TransientVertexBuffer) -> Self {
        VertexStream::Transient {
            buffer,
            first: 0,
            count: buffer.count,
        }
    }
}

/// The index buffer of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    /// An immutable buffer.
    Static {
        /// The buffer.
        buffer: IndexBufferId,
        /// First index read.
        first: u32,
        /// Indices read, or [`ALL_ELEMENTS`].
        count: u32,
    },
    /// An updatable buffer.
    Dynamic {
        /// The buffer.
        buffer: DynamicIndexBufferId,
        /// First index read.
        first: u32,
        /// Indices read, or [`ALL_ELEMENTS`].
        count: u32,
    },
    /// A transient allocation. The range is relative to the allocation.
    Transient {
        /// The allocation.
        buffer: TransientIndexBuffer,
        /// First index read.
        first: u32,
        /// Indices read, or [`ALL_ELEMENTS`].
        count: u32,
    },
}

impl From<IndexBufferId> for IndexSource {
    fn from(buffer: IndexBufferId) -> Self {
        IndexSource::Static {
            buffer,
            first: 0,
            count: ALL_ELEMENTS,
        }
    }
}

impl From<DynamicIndexBufferId> for IndexSource {
    fn from(buffer: DynamicIndexBufferId) -> Self {
        IndexSource::Dynamic {
            buffer,
            first: 0,
            count: ALL_ELEMENTS,
        }
    }
}

impl From<TransientIndexBuffer> for IndexSource {
    fn from(buffer: TransientIndexBuffer) -> Self {
        IndexSource::Transient {
            buffer,
            first: 0,
            count: buffer.count,
        }
    }
}

/// Per-instance data. The number of instances drawn is the element count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InstanceSource {
    /// An immutable vertex buffer.
    Static {
        /// The buffer.
        buffer: VertexBufferId,
        /// First instance record.
        first: u32,
        /// Instances drawn, or [`ALL_ELEMENTS`].
        count: u32,
    },
    /// An updatable vertex buffer.
    Dynamic {
        /// The buffer.
        buffer: DynamicVertexBufferId,
        /// First instance record.
        first: u32,
        /// Instances drawn, or [`ALL_ELEMENTS`].
        count: u32,
    },
    /// A transient vertex allocation.
    Transient {
        /// The allocation.
        buffer: TransientVertexBuffer,
        /// First instance record.
        first: u32,
        /// Instances drawn, or [`ALL_ELEMENTS`].
        count: u32,
    },
}

impl From<TransientVertexBuffer> for InstanceSource {
    fn from(buffer: TransientVertexBuffer) -> Self {
        InstanceSource::Transient {
            buffer,
            first: 0,
            count: buffer.count,
        }
    }
}

vela_bitflags! {
    /// Sampler state overriding the texture's own.
    pub struct SamplerFlags: u32 {
        /// Clamp U.
        const U_CLAMP = 1 << 0;
        /// Clamp V.
        const V_CLAMP = 1 << 1;
        /// Clamp W.
        const W_CLAMP = 1 << 2;
        /// Mirror U.
        const U_MIRROR = 1 << 3;
        /// Mirror V.
        const V_MIRROR = 1 << 4;
        /// Mirror W.
        const W_MIRROR = 1 << 5;
        /// Point minification.
        const MIN_POINT = 1 << 6;
        /// Point magnification.
        const MAG_POINT = 1 << 7;
        /// Point mip selection.
        const MIP_POINT = 1 << 8;
        /// Depth comparison sampling.
        const COMPARE_LESS = 1 << 9;
        /// Clamp on every axis.
        const UVW_CLAMP = Self::U_CLAMP.bits() | Self::V_CLAMP.bits() | Self::W_CLAMP.bits();
        /// Point filtering everywhere.
        const POINT = Self::MIN_POINT.bits() | Self::MAG_POINT.bits() | Self::MIP_POINT.bits();
    }
}

/// What a texture unit samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSource {
    /// A texture.
    Texture(TextureId),
    /// One attachment of a frame buffer.
    FrameBuffer {
        /// The frame buffer.
        frame_buffer: FrameBufferId,
        /// Attachment index.
        attachment: u8,
    },
}

impl From<TextureId> for TextureSource {
    fn from(texture: TextureId) -> Self {
        TextureSource::Texture(texture)
    }
}

/// A texture unit binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureBinding {
    /// Sampler uniform the unit is exposed through.
    pub sampler: UniformId,
    /// The sampled resource.
    pub source: TextureSource,
    /// Sampler override, `None` to use the texture's flags.
    pub flags: Option<SamplerFlags>,
}

/// The declared type of a uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// A texture unit index.
    Sampler,
    /// Four floats.
    Vec4,
    /// A 3x3 matrix, column-major.
    Mat3,
    /// A 4x4 matrix.
    Mat4,
}

/// A uniform value. Array uniforms hold one element per array slot.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformData {
    /// Texture unit index.
    Sampler(u8),
    /// `vec4` array.
    Vec4(Vec<[f32; 4]>),
    /// `mat3` array.
    Mat3(Vec<[f32; 9]>),
    /// `mat4` array.
    Mat4(Vec<Mat4>),
}

impl UniformData {
    /// The kind this value satisfies.
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformData::Sampler(_) => UniformKind::Sampler,
            UniformData::Vec4(_) => UniformKind::Vec4,
            UniformData::Mat3(_) => UniformKind::Mat3,
            UniformData::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// Number of array elements.
    pub fn len(&self) -> usize {
        match self {
            UniformData::Sampler(_) => 1,
            UniformData::Vec4(v) => v.len(),
            UniformData::Mat3(v) => v.len(),
            UniformData::Mat4(v) => v.len(),
        }
    }

    /// Returns `true` if the array holds no element.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A uniform handle with the value it takes for one draw or dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBinding {
    /// The uniform.
    pub uniform: UniformId,
    /// Its value.
    pub data: UniformData,
}

/// Shader access to a compute resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Read only.
    Read,
    /// Write only.
    Write,
    /// Read and write.
    ReadWrite,
}

/// A buffer a compute program may bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputeBuffer {
    /// Immutable index buffer.
    Index(IndexBufferId),
    /// Updatable index buffer.
    DynamicIndex(DynamicIndexBufferId),
    /// Immutable vertex buffer.
    Vertex(VertexBufferId),
    /// Updatable vertex buffer.
    DynamicVertex(DynamicVertexBufferId),
    /// Indirect command buffer.
    Indirect(IndirectBufferId),
}

/// A resource bound to one compute stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputeBinding {
    /// A buffer.
    Buffer {
        /// The buffer.
        buffer: ComputeBuffer,
        /// Shader access.
        access: Access,
    },
    /// One mip level of a texture.
    Image {
        /// The texture.
        texture: TextureId,
        /// Mip level.
        mip: u8,
        /// Shader access.
        access: Access,
    },
}
