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

//! Per-frame submission statistics.

/// Counters describing one finished frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Number of the frame the counters describe.
    pub frame: u64,
    /// Draw calls the backend issued.
    pub draw_calls: u32,
    /// Compute dispatches the backend accepted.
    pub dispatches: u32,
    /// Draws and dispatches the backend refused.
    pub rejected_submissions: u32,
    /// Pending states dropped by `discard` or at frame end.
    pub discards: u32,
    /// Transient arena bytes handed out.
    pub transient_bytes: usize,
    /// Transform cache slots written.
    pub transforms_cached: u32,
    /// Scissor cache slots written.
    pub scissors_cached: u32,
}
