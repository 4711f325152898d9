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

use crate::renderer::api::*;
use crate::renderer::error::SubmitError;
use std::fmt::Debug;

/// The command-submission interface of a graphics backend.
///
/// The submission model calls into it synchronously from one thread. Every call
/// returns without waiting on the GPU; a backend that executes on another thread
/// owns the hand-off.
pub trait RenderBackend: Send + Debug {
    /// Reports the capacities the backend supports.
    ///
    /// Queried once when the renderer is created; configuration values above these
    /// limits are clamped.
    fn limits(&self) -> BackendLimits;

    /// Records a draw into `view`.
    /// ## Arguments
    /// * `view` - The view the draw belongs to.
    /// * `command` - The draw, with every cached reference already resolved.
    /// * `sort_key` - Ordering key within the view; ignored by sequential views.
    /// ## Returns
    /// The number of draw calls issued, `0` when the draw was empty.
    /// ## Errors
    /// * `SubmitError` - The backend refused the draw; nothing was recorded.
    fn submit(
        &mut self,
        view: ViewId,
        command: DrawCommand,
        sort_key: u32,
    ) -> Result<u32, SubmitError>;

    /// Records a compute dispatch into `view`.
    /// ## Errors
    /// * `SubmitError` - The backend refused the dispatch; nothing was recorded.
    fn dispatch(&mut self, view: ViewId, command: ComputeCommand) -> Result<(), SubmitError>;

    /// Ends the current frame.
    /// ## Arguments
    /// * `frame` - The view table, palette and transient data of the finished frame.
    /// ## Returns
    /// The number of frames the backend has completed.
    fn advance_frame(&mut self, frame: &FrameData<'_>) -> u64;
}

impl<B: RenderBackend + ?Sized> RenderBackend for Box<B> {
    fn limits(&self) -> BackendLimits {
        (**self).limits()
    }

    fn submit(
        &mut self,
        view: ViewId,
        command: DrawCommand,
        sort_key: u32,
    ) -> Result<u32, SubmitError> {
        (**self).submit(view, command, sort_key)
    }

    fn dispatch(&mut self, view: ViewId, command: ComputeCommand) -> Result<(), SubmitError> {
        (**self).dispatch(view, command)
    }

    fn advance_frame(&mut self, frame: &FrameData<'_>) -> u64 {
        (**self).advance_frame(frame)
    }
}
