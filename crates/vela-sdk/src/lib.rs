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

//! # Vela SDK
//!
//! The public entry point of Vela. [`Renderer`] owns the per-frame state of the
//! submission model and forwards recorded work to any
//! [`RenderBackend`](vela_core::RenderBackend):
//!
//! - the view table, configured once and persisted across frames;
//! - the draw state accumulator, filled by `set_*` calls between submissions;
//! - the transform and scissor caches and the transient geometry arena, all
//!   reclaimed when the frame advances.
//!
//! ```ignore
//! let mut renderer = Renderer::new(backend, RendererConfig::default())?;
//! renderer.set_view_rect(ViewId(0), ViewRect::new(0, 0, 1280, 720))?;
//!
//! let (vertices, _) = renderer.allocate_transient(3, &layout, 0)?;
//! // fill renderer.transient_vertex_data_mut(&vertices)? ...
//! renderer.set_vertex_buffer(0, vertices)?;
//! renderer.submit(ViewId(0), program, 0)?;
//! renderer.advance_frame();
//! ```

#![warn(missing_docs)]

pub mod config;
mod encoder;
mod frame;
mod renderer;
pub mod stats;
mod submit;
pub mod view;

pub use config::{ConfigError, RendererConfig};
pub use encoder::DrawState;
pub use renderer::Renderer;
pub use stats::FrameStats;
pub use view::ViewTable;

pub use vela_core;
pub use vela_data::cache::{ScissorHandle, TransformHandle};
