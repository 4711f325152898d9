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

//! Fixed-function render state carried by a draw: write masks, depth test, culling,
//! topology, blending and stencil.

use crate::vela_bitflags;

vela_bitflags! {
    /// Which channels of the color and depth targets a draw writes.
    pub struct WriteMask: u8 {
        /// Red channel.
        const R = 1 << 0;
        /// Green channel.
        const G = 1 << 1;
        /// Blue channel.
        const B = 1 << 2;
        /// Alpha channel.
        const A = 1 << 3;
        /// Depth.
        const Z = 1 << 4;
        /// All four color channels.
        const RGBA = Self::R.bits() | Self::G.bits() | Self::B.bits() | Self::A.bits();
    }
}

/// The comparison function used for depth and stencil testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    /// The test never passes.
    Never,
    /// Passes if the new value is less than the stored one.
    Less,
    /// Passes if both values are equal.
    Equal,
    /// Passes if the new value is less than or equal to the stored one.
    LessEqual,
    /// Passes if the new value is greater than the stored one.
    Greater,
    /// Passes if the values differ.
    NotEqual,
    /// Passes if the new value is greater than or equal to the stored one.
    GreaterEqual,
    /// The test always passes.
    #[default]
    Always,
}

/// Which triangle winding is culled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// No culling.
    None,
    /// Cull clockwise triangles.
    #[default]
    Clockwise,
    /// Cull counter-clockwise triangles.
    CounterClockwise,
}

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Isolated triangles.
    #[default]
    TriangleList,
    /// A connected triangle strip.
    TriangleStrip,
    /// Isolated lines.
    LineList,
    /// A connected line strip.
    LineStrip,
    /// Isolated points.
    PointList,
}

/// A factor in a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `0`.
    Zero,
    /// `1`.
    One,
    /// Source color.
    SrcColor,
    /// `1 - src`.
    OneMinusSrcColor,
    /// Source alpha.
    SrcAlpha,
    /// `1 - src.a`.
    OneMinusSrcAlpha,
    /// Destination color.
    DstColor,
    /// `1 - dst`.
    OneMinusDstColor,
    /// Destination alpha.
    DstAlpha,
    /// `1 - dst.a`.
    OneMinusDstAlpha,
    /// The draw's blend factor color.
    Constant,
    /// `1 - constant`.
    OneMinusConstant,
}

/// The operation combining the weighted source and destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOperation {
    /// `src + dst`.
    #[default]
    Add,
    /// `src - dst`.
    Subtract,
    /// `dst - src`.
    ReverseSubtract,
    /// `min(src, dst)`.
    Min,
    /// `max(src, dst)`.
    Max,
}

/// A blend equation for either the color or the alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponent {
    /// Weight of the incoming fragment.
    pub src_factor: BlendFactor,
    /// Weight of the stored value.
    pub dst_factor: BlendFactor,
    /// How both weighted terms are combined.
    pub operation: BlendOperation,
}

impl BlendComponent {
    /// Writes the source unchanged.
    pub const REPLACE: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::Zero,
        operation: BlendOperation::Add,
    };

    /// Returns `true` if either factor reads the draw's blend factor color.
    pub fn uses_constant(&self) -> bool {
        [self.src_factor, self.dst_factor]
            .iter()
            .any(|f| matches!(f, BlendFactor::Constant | BlendFactor::OneMinusConstant))
    }
}

/// Color and alpha blend equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    /// Equation for RGB.
    pub color: BlendComponent,
    /// Equation for alpha.
    pub alpha: BlendComponent,
}

impl BlendState {
    /// Standard "over" compositing.
    pub const ALPHA_BLENDING: Self = Self {
        color: BlendComponent {
            src_factor: BlendFactor::SrcAlpha,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            operation: BlendOperation::Add,
        },
        alpha: BlendComponent {
            src_factor: BlendFactor::One,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            operation: BlendOperation::Add,
        },
    };

    /// Adds the source on top of the destination.
    pub const ADDITIVE: Self = Self {
        color: BlendComponent {
            src_factor: BlendFactor::One,
            dst_factor: BlendFactor::One,
            operation: BlendOperation::Add,
        },
        alpha: BlendComponent {
            src_factor: BlendFactor::One,
            dst_factor: BlendFactor::One,
            operation: BlendOperation::Add,
        },
    };

    /// Returns `true` if the equations read the draw's blend factor color.
    pub fn uses_constant(&self) -> bool {
        self.color.uses_constant() || self.alpha.uses_constant()
    }
}

/// The fixed-function state of one draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderState {
    /// Channels written by the draw.
    pub write_mask: WriteMask,
    /// Depth test, or `None` to disable it.
    pub depth_test: Option<CompareFunction>,
    /// Face culling.
    pub cull: CullMode,
    /// Primitive assembly.
    pub topology: PrimitiveTopology,
    /// Blending, or `None` to write fragments unblended.
    pub blend: Option<BlendState>,
    /// Multisampled rasterization.
    pub msaa: bool,
}

impl Default for RenderState {
    /// Opaque geometry: writes color and depth, tests `Less`, culls clockwise
    /// triangles and rasterizes with MSAA.
    fn default() -> Self {
        Self {
            write_mask: WriteMask::RGBA | WriteMask::Z,
            depth_test: Some(CompareFunction::Less),
            cull: CullMode::Clockwise,
            topology: PrimitiveTopology::TriangleList,
            blend: None,
            msaa: true,
        }
    }
}

/// An operation performed on a stencil value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOperation {
    /// Keep the stored value.
    #[default]
    Keep,
    /// Write zero.
    Zero,
    /// Write the reference value.
    Replace,
    /// Bitwise invert.
    Invert,
    /// Increment, saturating.
    IncrementClamp,
    /// Decrement, saturating at zero.
    DecrementClamp,
    /// Increment, wrapping.
    IncrementWrap,
    /// Decrement, wrapping.
    DecrementWrap,
}

/// Stencil test and operations for one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilFaceState {
    /// Test applied to `reference & read_mask` against the stored value.
    pub compare: CompareFunction,
    /// Reference value.
    pub reference: u8,
    /// Mask applied before comparing.
    pub read_mask: u8,
    /// Operation when the stencil test fails.
    pub fail: StencilOperation,
    /// Operation when the stencil test passes but the depth test fails.
    pub depth_fail: StencilOperation,
    /// Operation when both tests pass.
    pub pass: StencilOperation,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        Self {
            compare: CompareFunction::Always,
            reference: 0,
            read_mask: 0xff,
            fail: StencilOperation::Keep,
            depth_fail: StencilOperation::Keep,
            pass: StencilOperation::Keep,
        }
    }
}

/// Stencil state for both faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StencilState {
    /// Front-facing triangles.
    pub front: StencilFaceState,
    /// Back-facing triangles.
    pub back: StencilFaceState,
}

impl StencilState {
    /// Builds a stencil state; `back` defaults to `front` when omitted.
    pub fn new(front: StencilFaceState, back: Option<StencilFaceState>) -> Self {
        Self {
            front,
            back: back.unwrap_or(front),
        }
    }
}
