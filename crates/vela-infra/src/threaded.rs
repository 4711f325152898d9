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

//! A backend that hands finished frames to a dedicated render thread.

use crate::headless::{FrameRecord, HeadlessBackend};
use crossbeam_channel::Sender;
use std::fmt;
use std::thread;
use vela_core::renderer::{
    BackendLimits, ComputeCommand, DrawCommand, FrameData, SubmitError, ViewId,
    MAX_FRAMES_IN_FLIGHT,
};
use vela_core::RenderBackend;

/// Validates and records on the calling thread, then ships each finished
/// [`FrameRecord`] to a consumer running on a render thread.
///
/// At most [`MAX_FRAMES_IN_FLIGHT`] frames wait in the hand-off queue; a faster
/// producer blocks in `advance_frame` until the render thread catches up. Dropping
/// the backend closes the queue and joins the thread after the last frame is
/// consumed.
pub struct ThreadedBackend {
    inner: HeadlessBackend,
    frame_tx: Option<Sender<FrameRecord>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ThreadedBackend {
    /// Starts the render thread.
    ///
    /// `consumer` is called on that thread with every finished frame, in order.
    /// ## Errors
    /// Returns the OS error if the thread could not be spawned.
    pub fn spawn<F>(inner: HeadlessBackend, mut consumer: F) -> std::io::Result<Self>
    where
        F: FnMut(FrameRecord) + Send + 'static,
    {
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<FrameRecord>(MAX_FRAMES_IN_FLIGHT);

        let handle = thread::Builder::new()
            .name("vela-render".to_owned())
            .spawn(move || {
                log::info!("Render thread started.");
                for frame in frame_rx.iter() {
                    log::trace!("Render thread consuming frame {}", frame.number);
                    consumer(frame);
                }
                log::info!("Render thread stopped.");
            })?;

        Ok(Self {
            inner,
            frame_tx: Some(frame_tx),
            handle: Some(handle),
        })
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &HeadlessBackend {
        &self.inner
    }

    /// The wrapped backend, to create resources.
    pub fn inner_mut(&mut self) -> &mut HeadlessBackend {
        &mut self.inner
    }
}

impl RenderBackend for ThreadedBackend {
    fn limits(&self) -> BackendLimits {
        self.inner.limits()
    }

    fn submit(
        &mut self,
        view: ViewId,
        command: DrawCommand,
        sort_key: u32,
    ) -> Result<u32, SubmitError> {
        self.inner.submit(view, command, sort_key)
    }

    fn dispatch(&mut self, view: ViewId, command: ComputeCommand) -> Result<(), SubmitError> {
        self.inner.dispatch(view, command)
    }

    fn advance_frame(&mut self, frame: &FrameData<'_>) -> u64 {
        let completed = self.inner.advance_frame(frame);
        if let (Some(record), Some(tx)) = (self.inner.take_last_frame(), &self.frame_tx) {
            if tx.send(record).is_err() {
                log::error!("Render thread is gone; frame {} was dropped", frame.number);
            }
        }
        completed
    }
}

impl fmt::Debug for ThreadedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadedBackend")
            .field("inner", &self.inner)
            .field("running", &self.handle.is_some())
            .finish()
    }
}

impl Drop for ThreadedBackend {
    fn drop(&mut self) {
        drop(self.frame_tx.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Render thread panicked");
            }
        }
    }
}
