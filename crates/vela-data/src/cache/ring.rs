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

//! A fixed-capacity ring of frame-scoped values.
//!
//! Each reservation takes the next contiguous run of slots and stamps it with a new
//! write epoch. A run that would cross the end of the ring starts over at slot 0,
//! overwriting the oldest entries. Handles remember the epoch and the frame
//! generation of their run, so a lookup detects both a wrapped ring and a handle
//! carried over from an earlier frame.

use std::fmt;
use std::marker::PhantomData;
use vela_core::renderer::{CacheError, FrameGeneration};

/// A reference to a run of entries in a [`RingCache`].
pub struct CacheHandle<T> {
    first: u32,
    count: u32,
    epoch: u64,
    generation: FrameGeneration,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CacheHandle<T> {
    /// First slot of the run.
    #[inline]
    pub fn first(&self) -> u32 {
        self.first
    }

    /// Number of entries in the run.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Frame the handle was issued in.
    #[inline]
    pub fn generation(&self) -> FrameGeneration {
        self.generation
    }

    /// A handle to `count` entries starting `start` entries into this run.
    ///
    /// The sub-run keeps the epoch and generation of the run, so it goes stale or
    /// overwritten together with it.
    pub fn sub_run(&self, start: u32, count: u32) -> Result<Self, CacheError> {
        match start.checked_add(count) {
            Some(end) if end <= self.count => Ok(Self {
                first: self.first + start,
                count,
                ..*self
            }),
            _ => Err(CacheError::ExceedsRun {
                requested: start.saturating_add(count),
                run: self.count,
            }),
        }
    }

    /// A handle to the entries from `index` to the end of this run.
    pub fn offset(&self, index: u32) -> Result<Self, CacheError> {
        if index >= self.count {
            return Err(CacheError::ExceedsRun {
                requested: index.saturating_add(1),
                run: self.count,
            });
        }
        self.sub_run(index, self.count - index)
    }
}

impl<T> Clone for CacheHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CacheHandle<T> {}

impl<T> PartialEq for CacheHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.first == other.first
            && self.count == other.count
            && self.epoch == other.epoch
            && self.generation == other.generation
    }
}

impl<T> Eq for CacheHandle<T> {}

impl<T> fmt::Debug for CacheHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheHandle")
            .field("first", &self.first)
            .field("count", &self.count)
            .field("epoch", &self.epoch)
            .field("generation", &self.generation.0)
            .finish()
    }
}

/// A bounded ring cache of `T` values, rotated once per frame.
#[derive(Debug)]
pub struct RingCache<T> {
    slots: Vec<T>,
    epochs: Vec<u64>,
    cursor: u32,
    used: u32,
    next_epoch: u64,
    generation: FrameGeneration,
    label: &'static str,
}

impl<T: Copy + Default> RingCache<T> {
    /// Creates a cache of `capacity` entries serving frame `generation`.
    pub fn new(capacity: u32, generation: FrameGeneration, label: &'static str) -> Self {
        Self {
            slots: vec![T::default(); capacity as usize],
            epochs: vec![0; capacity as usize],
            cursor: 0,
            used: 0,
            next_epoch: 1,
            generation,
            label,
        }
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Slots written this frame, saturating at capacity.
    #[inline]
    pub fn used(&self) -> u32 {
        self.used
    }

    /// The frame the cache is currently serving.
    #[inline]
    pub fn generation(&self) -> FrameGeneration {
        self.generation
    }

    /// Reserves a contiguous run of `count` slots, filled with `T::default()`.
    pub fn reserve(&mut self, count: u32) -> Result<CacheHandle<T>, CacheError> {
        let capacity = self.capacity();
        if count > capacity {
            return Err(CacheError::TooLarge {
                requested: count,
                capacity,
            });
        }

        if u64::from(self.cursor) + u64::from(count) > u64::from(capacity) {
            log::warn!(
                "{} cache wrapped after {} entries this frame; older entries are overwritten",
                self.label,
                self.used
            );
            self.cursor = 0;
        }

        let first = self.cursor;
        let epoch = self.next_epoch;
        self.next_epoch += 1;

        let run = first as usize..(first + count) as usize;
        self.slots[run.clone()].fill(T::default());
        self.epochs[run].fill(epoch);

        self.cursor += count;
        self.used = self.used.saturating_add(count).min(capacity);

        Ok(CacheHandle {
            first,
            count,
            epoch,
            generation: self.generation,
            _marker: PhantomData,
        })
    }

    /// Stores `values` as one run.
    pub fn push(&mut self, values: &[T]) -> Result<CacheHandle<T>, CacheError> {
        let count = u32::try_from(values.len()).map_err(|_| CacheError::TooLarge {
            requested: u32::MAX,
            capacity: self.capacity(),
        })?;
        let handle = self.reserve(count)?;
        let first = handle.first as usize;
        self.slots[first..first + values.len()].copy_from_slice(values);
        Ok(handle)
    }

    /// Stores a single value.
    pub fn push_one(&mut self, value: T) -> Result<CacheHandle<T>, CacheError> {
        self.push(std::slice::from_ref(&value))
    }

    fn check(
        &self,
        handle: &CacheHandle<T>,
        count: u32,
    ) -> Result<std::ops::Range<usize>, CacheError> {
        if handle.generation != self.generation {
            return Err(CacheError::Stale {
                handle: handle.generation.0,
                current: self.generation.0,
            });
        }
        if count > handle.count {
            return Err(CacheError::ExceedsRun {
                requested: count,
                run: handle.count,
            });
        }
        let capacity = self.capacity();
        let end = u64::from(handle.first) + u64::from(count);
        if end > u64::from(capacity) {
            return Err(CacheError::OutOfRange {
                first: handle.first,
                count,
                capacity,
            });
        }
        let range = handle.first as usize..end as usize;
        if self.epochs[range.clone()].iter().any(|&e| e != handle.epoch) {
            return Err(CacheError::Overwritten);
        }
        Ok(range)
    }

    /// Returns the first `count` entries of the run.
    pub fn get_run(&self, handle: &CacheHandle<T>, count: u32) -> Result<&[T], CacheError> {
        let range = self.check(handle, count)?;
        Ok(&self.slots[range])
    }

    /// Returns the whole run for writing.
    pub fn get_run_mut(&mut self, handle: &CacheHandle<T>) -> Result<&mut [T], CacheError> {
        let range = self.check(handle, handle.count)?;
        Ok(&mut self.slots[range])
    }

    /// Returns the first entry of the run.
    pub fn get(&self, handle: &CacheHandle<T>) -> Result<T, CacheError> {
        let run = self.get_run(handle, 1)?;
        Ok(run[0])
    }

    /// Rewinds the ring for frame `generation`. Earlier handles become stale.
    pub fn advance(&mut self, generation: FrameGeneration) {
        log::trace!(
            "{} cache: {} of {} entries used in generation {}",
            self.label,
            self.used,
            self.capacity(),
            self.generation.0
        );
        self.cursor = 0;
        self.used = 0;
        self.generation = generation;
    }
}
