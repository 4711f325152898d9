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

//! Ring caches for per-draw state that is shared between draws of one frame.

mod ring;

pub use self::ring::{CacheHandle, RingCache};

use vela_core::math::Mat4;
use vela_core::renderer::ViewRect;

/// Transform cache: runs of model matrices.
pub type MatrixCache = RingCache<Mat4>;

/// Scissor cache: single rectangles.
pub type RectCache = RingCache<ViewRect>;

/// A run of cached model matrices.
pub type TransformHandle = CacheHandle<Mat4>;

/// A cached scissor rectangle.
pub type ScissorHandle = CacheHandle<ViewRect>;
