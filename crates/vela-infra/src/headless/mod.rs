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

//! A backend that executes nothing and records everything.
//!
//! It owns a registry of the resources it created, rejects draws that reference
//! unknown handles or read past their buffers, and at each frame end assembles
//! the submitted work into ordered per-view passes.

mod backend;
mod record;
mod resources;

pub use self::backend::HeadlessBackend;
pub use self::record::{CommandKind, DrawRecord, FrameRecord, RecordedCommand, ResolvedClear, ViewPass};
pub use self::resources::{CreateError, IndexFormat, ProgramKind};
