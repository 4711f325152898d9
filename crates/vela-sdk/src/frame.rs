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

//! The frame sequencer.

use crate::renderer::Renderer;
use vela_core::renderer::{FrameData, RenderBackend};

impl<B: RenderBackend> Renderer<B> {
    /// Ends the current frame.
    ///
    /// The view table, palette and transient bytes are handed to the backend. The
    /// transient arena and both caches are then reclaimed under a new generation,
    /// so every transient buffer and cache handle of the finished frame turns
    /// stale. State set but never submitted is dropped.
    /// ## Returns
    /// The new current frame number. The first call returns 1.
    pub fn advance_frame(&mut self) -> u64 {
        if self.pending.is_pending() {
            log::debug!(
                "Discarding un-submitted draw state at the end of frame {}",
                self.frame_number
            );
            self.discard();
        }

        self.stats.frame = self.frame_number;
        self.stats.transient_bytes = self.transient.used();
        self.stats.transforms_cached = self.transforms.used();
        self.stats.scissors_cached = self.scissors.used();

        let frame = FrameData {
            number: self.frame_number,
            views: self.views.as_slice(),
            palette: self.views.palette(),
            transient: self.transient.used_bytes(),
        };
        let completed = self.backend.advance_frame(&frame);

        self.generation = self.generation.next();
        self.transient.reset(self.generation);
        self.transforms.advance(self.generation);
        self.scissors.advance(self.generation);

        self.last_frame_stats = std::mem::take(&mut self.stats);
        log::debug!(
            "Frame {} ended: {} draw calls, {} dispatches, {} rejected, {} transient bytes ({} frames completed by the backend)",
            self.last_frame_stats.frame,
            self.last_frame_stats.draw_calls,
            self.last_frame_stats.dispatches,
            self.last_frame_stats.rejected_submissions,
            self.last_frame_stats.transient_bytes,
            completed
        );

        self.frame_number += 1;
        self.frame_number
    }
}
