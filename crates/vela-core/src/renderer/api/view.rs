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

//! Per-view configuration: viewport, scissor, clear, target and camera.

use super::handles::{FrameBufferId, ViewId};
use crate::math::Mat4;
use crate::vela_bitflags;

/// Number of frame buffer attachments a palette clear addresses.
pub const MAX_FRAME_BUFFER_ATTACHMENTS: usize = 8;

/// Palette index meaning "leave this attachment untouched".
pub const CLEAR_TARGET_NONE: u8 = u8::MAX;

/// A rectangle in pixels, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViewRect {
    /// Left edge.
    pub x: u16,
    /// Top edge.
    pub y: u16,
    /// Width.
    pub width: u16,
    /// Height.
    pub height: u16,
}

impl ViewRect {
    /// The all-zero rectangle. As a scissor it means "disabled".
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Creates a rectangle.
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` for the all-zero rectangle.
    pub const fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0 && self.width == 0 && self.height == 0
    }

    /// Returns the overlap of both rectangles, which may have zero area.
    pub fn intersect(&self, other: &ViewRect) -> ViewRect {
        let x0 = u32::from(self.x).max(u32::from(other.x));
        let y0 = u32::from(self.y).max(u32::from(other.y));
        let x1 = (u32::from(self.x) + u32::from(self.width))
            .min(u32::from(other.x) + u32::from(other.width));
        let y1 = (u32::from(self.y) + u32::from(self.height))
            .min(u32::from(other.y) + u32::from(other.height));

        // Both ends stay below 2 * u16::MAX; the clamp keeps the result representable.
        let clamp = |v: u32| v.min(u32::from(u16::MAX)) as u16;
        ViewRect::new(
            clamp(x0),
            clamp(y0),
            clamp(x1.saturating_sub(x0)),
            clamp(y1.saturating_sub(y0)),
        )
    }
}

vela_bitflags! {
    /// Which targets a view clears before its first draw.
    pub struct ClearFlags: u8 {
        /// Color attachments.
        const COLOR = 1 << 0;
        /// Depth.
        const DEPTH = 1 << 1;
        /// Stencil.
        const STENCIL = 1 << 2;
    }
}

/// The color a view clears its color attachments to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClearColor {
    /// One `0xRRGGBBAA` color for every attachment.
    Rgba(u32),
    /// A palette index per attachment; [`CLEAR_TARGET_NONE`] leaves it untouched.
    Palette([u8; MAX_FRAME_BUFFER_ATTACHMENTS]),
}

impl Default for ClearColor {
    fn default() -> Self {
        ClearColor::Rgba(0x0000_00ff)
    }
}

/// Clear configuration of a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearConfig {
    /// Targets to clear.
    pub flags: ClearFlags,
    /// Color source.
    pub color: ClearColor,
    /// Depth clear value.
    pub depth: f32,
    /// Stencil clear value.
    pub stencil: u8,
}

impl Default for ClearConfig {
    fn default() -> Self {
        Self {
            flags: ClearFlags::EMPTY,
            color: ClearColor::default(),
            depth: 1.0,
            stencil: 0,
        }
    }
}

/// Everything the backend needs to set up one view before executing its draws.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    /// Debug name, shown by backends in captures and logs.
    pub name: String,
    /// Viewport.
    pub rect: ViewRect,
    /// View-wide scissor.
    pub scissor: Option<ViewRect>,
    /// Clear configuration.
    pub clear: ClearConfig,
    /// Render target, `None` for the backbuffer.
    pub frame_buffer: Option<FrameBufferId>,
    /// View (camera) transform.
    pub view: Mat4,
    /// Projection transform.
    pub projection: Mat4,
    /// Keep draws in submission order instead of sorting them.
    pub sequential: bool,
}

impl ViewConfig {
    /// Returns the default configuration of view `id`.
    pub fn new(id: ViewId) -> Self {
        Self {
            name: format!("View {}", id.0),
            rect: ViewRect::ZERO,
            scissor: None,
            clear: ClearConfig::default(),
            frame_buffer: None,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            sequential: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_overlapping_rects() {
        let a = ViewRect::new(0, 0, 100, 100);
        let b = ViewRect::new(50, 25, 100, 100);
        assert_eq!(a.intersect(&b), ViewRect::new(50, 25, 50, 75));
    }

    #[test]
    fn intersect_disjoint_rects_is_empty() {
        let a = ViewRect::new(0, 0, 10, 10);
        let b = ViewRect::new(20, 20, 10, 10);
        let r = a.intersect(&b);
        assert_eq!((r.width, r.height), (0, 0));
    }

    #[test]
    fn new_view_has_defaults() {
        let v = ViewConfig::new(ViewId(3));
        assert_eq!(v.name, "View 3");
        assert!(v.scissor.is_none());
        assert!(v.clear.flags.is_empty());
        assert!(!v.sequential);
    }
}
