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

//! Defines the `LinearRgba` color type.

/// A color in **linear** RGBA space with `f32` components.
///
/// Clear colors are exchanged with backends either as this type (palette entries)
/// or packed as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct LinearRgba {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl LinearRgba {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    /// Creates a color from its four components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Unpacks a `0xRRGGBBAA` value, mapping each byte to `[0, 1]`.
    pub fn from_rgba_u32(rgba: u32) -> Self {
        let [r, g, b, a] = rgba.to_be_bytes();
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Packs into `0xRRGGBBAA`, clamping each component to `[0, 1]`.
    pub fn to_rgba_u32(&self) -> u32 {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        u32::from_be_bytes([q(self.r), q(self.g), q(self.b), q(self.a)])
    }

    /// Returns the components as an array.
    #[inline]
    pub const fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rgba_u32_round_trip() {
        let c = LinearRgba::from_rgba_u32(0x303030FF);
        assert_relative_eq!(c.r, 48.0 / 255.0);
        assert_relative_eq!(c.a, 1.0);
        assert_eq!(c.to_rgba_u32(), 0x303030FF);
    }

    #[test]
    fn to_rgba_u32_clamps() {
        assert_eq!(LinearRgba::new(2.0, -1.0, 0.5, 1.0).to_rgba_u32(), 0xFF0080FF);
    }
}
