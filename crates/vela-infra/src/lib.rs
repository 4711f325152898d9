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

//! # Vela Infra
//!
//! Concrete implementations of [`RenderBackend`](vela_core::RenderBackend).
//!
//! - [`HeadlessBackend`]: validates submissions against the resources it minted,
//!   orders them per view and records each finished frame as a [`FrameRecord`].
//! - [`ThreadedBackend`]: wraps a headless backend and ships every finished frame to
//!   a consumer running on its own render thread.

#![warn(missing_docs)]

pub mod headless;
pub mod threaded;

pub use headless::{
    CommandKind, CreateError, DrawRecord, FrameRecord, HeadlessBackend, IndexFormat, ProgramKind,
    RecordedCommand, ResolvedClear, ViewPass,
};
pub use threaded::ThreadedBackend;
