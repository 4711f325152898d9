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

//! Vertex layouts and the operations driven by them.
//!
//! A [`VertexLayout`] describes the byte encoding of one vertex. [`pack`] and
//! [`unpack`] move one attribute between `[f32; 4]` and that encoding, [`convert`]
//! re-encodes whole vertex streams between two layouts and [`weld`] merges
//! vertices that are close enough to be considered the same.
//!
//! All multi-byte values are stored little-endian.

mod half;
mod layout;
mod pack;
mod weld;

pub use self::half::{f16_to_f32, f32_to_f16};
pub use self::layout::{Attrib, AttribDesc, AttribType, VertexLayout, VertexLayoutBuilder};
pub use self::pack::{convert, pack, unpack};
pub use self::weld::{weld, weld_with, WeldMode, WeldOutput};
