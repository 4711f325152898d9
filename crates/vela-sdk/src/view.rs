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

//! The view table: persistent per-view configuration and the clear palette.

use vela_core::math::{LinearRgba, Mat4};
use vela_core::renderer::{
    ClearColor, ClearConfig, ClearFlags, FrameBufferId, ViewConfig, ViewError, ViewId, ViewRect,
    MAX_FRAME_BUFFER_ATTACHMENTS, PALETTE_SIZE,
};

/// Configuration of every view, indexed by view id.
///
/// Entries persist across frames until changed. Each setter touches exactly one
/// field; ids at or above the table size fail with [`ViewError::OutOfRange`] and
/// change nothing.
#[derive(Debug, Clone)]
pub struct ViewTable {
    views: Vec<ViewConfig>,
    palette: [LinearRgba; PALETTE_SIZE],
}

impl ViewTable {
    /// Creates `count` views with default configuration.
    pub fn new(count: u16) -> Self {
        Self {
            views: (0..count).map(|id| ViewConfig::new(ViewId(id))).collect(),
            palette: [LinearRgba::BLACK; PALETTE_SIZE],
        }
    }

    /// Number of views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Returns `true` if the table holds no view.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Fails unless `id` addresses a view of this table.
    pub fn check(&self, id: ViewId) -> Result<(), ViewError> {
        self.entry(id).map(|_| ())
    }

    /// The configuration of `id`.
    pub fn get(&self, id: ViewId) -> Result<&ViewConfig, ViewError> {
        self.entry(id)
    }

    /// Every view, indexed by id.
    pub fn as_slice(&self) -> &[ViewConfig] {
        &self.views
    }

    /// The clear palette.
    pub fn palette(&self) -> &[LinearRgba] {
        &self.palette
    }

    fn entry(&self, id: ViewId) -> Result<&ViewConfig, ViewError> {
        self.views.get(usize::from(id.0)).ok_or(self.out_of_range(id))
    }

    fn entry_mut(&mut self, id: ViewId) -> Result<&mut ViewConfig, ViewError> {
        let err = self.out_of_range(id);
        self.views.get_mut(usize::from(id.0)).ok_or(err)
    }

    fn out_of_range(&self, id: ViewId) -> ViewError {
        ViewError::OutOfRange {
            id,
            max: u16::try_from(self.views.len()).unwrap_or(u16::MAX),
        }
    }

    /// Sets the debug name.
    pub fn set_name(&mut self, id: ViewId, name: &str) -> Result<(), ViewError> {
        self.entry_mut(id)?.name = name.to_owned();
        Ok(())
    }

    /// Sets the viewport.
    pub fn set_rect(&mut self, id: ViewId, rect: ViewRect) -> Result<(), ViewError> {
        self.entry_mut(id)?.rect = rect;
        Ok(())
    }

    /// Sets the view scissor. An all-zero rectangle disables it.
    pub fn set_scissor(&mut self, id: ViewId, rect: ViewRect) -> Result<(), ViewError> {
        self.entry_mut(id)?.scissor = (!rect.is_zero()).then_some(rect);
        Ok(())
    }

    /// Clears with a single `0xRRGGBBAA` color.
    pub fn set_clear(
        &mut self,
        id: ViewId,
        flags: ClearFlags,
        rgba: u32,
        depth: f32,
        stencil: u8,
    ) -> Result<(), ViewError> {
        self.entry_mut(id)?.clear = ClearConfig {
            flags,
            color: ClearColor::Rgba(rgba),
            depth,
            stencil,
        };
        Ok(())
    }

    /// Clears each color attachment with a palette entry.
    ///
    /// `indices` holds up to eight palette indices, one per attachment; missing
    /// entries and [`CLEAR_TARGET_NONE`](vela_core::renderer::CLEAR_TARGET_NONE)
    /// leave the attachment untouched. More than eight indices is an error.
    pub fn set_clear_palette(
        &mut self,
        id: ViewId,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
        indices: &[u8],
    ) -> Result<(), ViewError> {
        if indices.len() > MAX_FRAME_BUFFER_ATTACHMENTS {
            return Err(ViewError::TooManyTargets {
                count: indices.len(),
                max: MAX_FRAME_BUFFER_ATTACHMENTS,
            });
        }
        let mut slots = [u8::MAX; MAX_FRAME_BUFFER_ATTACHMENTS];
        for (slot, &index) in slots.iter_mut().zip(indices) {
            if index != u8::MAX && usize::from(index) >= PALETTE_SIZE {
                return Err(ViewError::PaletteIndexOutOfRange(index));
            }
            *slot = index;
        }
        self.entry_mut(id)?.clear = ClearConfig {
            flags,
            color: ClearColor::Palette(slots),
            depth,
            stencil,
        };
        Ok(())
    }

    /// Sets the view and projection matrices.
    pub fn set_transform(
        &mut self,
        id: ViewId,
        view: Mat4,
        projection: Mat4,
    ) -> Result<(), ViewError> {
        let entry = self.entry_mut(id)?;
        entry.view = view;
        entry.projection = projection;
        Ok(())
    }

    /// Renders the view into `frame_buffer`, or the backbuffer for `None`.
    pub fn set_frame_buffer(
        &mut self,
        id: ViewId,
        frame_buffer: Option<FrameBufferId>,
    ) -> Result<(), ViewError> {
        self.entry_mut(id)?.frame_buffer = frame_buffer;
        Ok(())
    }

    /// Keeps the view's draws in submission order instead of sorting them.
    pub fn set_sequential(&mut self, id: ViewId, sequential: bool) -> Result<(), ViewError> {
        self.entry_mut(id)?.sequential = sequential;
        Ok(())
    }

    /// Restores the default configuration of `id`.
    pub fn reset(&mut self, id: ViewId) -> Result<(), ViewError> {
        *self.entry_mut(id)? = ViewConfig::new(id);
        Ok(())
    }

    /// Sets one entry of the clear palette.
    pub fn set_palette_color(&mut self, index: u8, color: LinearRgba) -> Result<(), ViewError> {
        let slot = self
            .palette
            .get_mut(usize::from(index))
            .ok_or(ViewError::PaletteIndexOutOfRange(index))?;
        *slot = color;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_id_is_rejected() {
        let mut table = ViewTable::new(4);
        assert_eq!(
            table.set_rect(ViewId(4), ViewRect::new(0, 0, 1, 1)),
            Err(ViewError::OutOfRange {
                id: ViewId(4),
                max: 4
            })
        );
    }

    #[test]
    fn zero_scissor_disables() {
        let mut table = ViewTable::new(1);
        table.set_scissor(ViewId(0), ViewRect::new(1, 2, 3, 4)).unwrap();
        assert!(table.get(ViewId(0)).unwrap().scissor.is_some());
        table.set_scissor(ViewId(0), ViewRect::ZERO).unwrap();
        assert!(table.get(ViewId(0)).unwrap().scissor.is_none());
    }

    #[test]
    fn palette_clear_pads_with_none() {
        let mut table = ViewTable::new(1);
        table
            .set_clear_palette(ViewId(0), ClearFlags::COLOR, 1.0, 0, &[3, 1])
            .unwrap();
        let clear = table.get(ViewId(0)).unwrap().clear;
        let mut expected = [u8::MAX; MAX_FRAME_BUFFER_ATTACHMENTS];
        expected[..2].copy_from_slice(&[3, 1]);
        assert_eq!(clear.color, ClearColor::Palette(expected));
    }

    #[test]
    fn palette_index_is_bounded() {
        let mut table = ViewTable::new(1);
        assert_eq!(
            table.set_palette_color(16, LinearRgba::WHITE),
            Err(ViewError::PaletteIndexOutOfRange(16))
        );
        assert_eq!(
            table.set_clear_palette(ViewId(0), ClearFlags::COLOR, 1.0, 0, &[20]),
            Err(ViewError::PaletteIndexOutOfRange(20))
        );
    }

    #[test]
    fn palette_clear_rejects_extra_targets() {
        let mut table = ViewTable::new(1);
        table
            .set_clear_palette(ViewId(0), ClearFlags::COLOR, 1.0, 0, &[0; 8])
            .unwrap();
        let before = table.get(ViewId(0)).unwrap().clear;

        assert_eq!(
            table.set_clear_palette(ViewId(0), ClearFlags::COLOR, 1.0, 0, &[1; 9]),
            Err(ViewError::TooManyTargets { count: 9, max: 8 })
        );
        assert_eq!(table.get(ViewId(0)).unwrap().clear, before);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut table = ViewTable::new(2);
        table.set_name(ViewId(1), "shadow").unwrap();
        table.set_sequential(ViewId(1), true).unwrap();
        table.reset(ViewId(1)).unwrap();
        assert_eq!(table.get(ViewId(1)).unwrap(), &ViewConfig::new(ViewId(1)));
    }
}
