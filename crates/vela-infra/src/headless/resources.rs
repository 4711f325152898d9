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

//! The resource registry of the headless backend.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use vela_core::renderer::{Attrib, UniformKind, VertexLayout};

/// What a program runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramKind {
    /// A vertex and fragment program reading the listed vertex attributes.
    Graphics {
        /// Attributes the vertex stage reads.
        attributes: Vec<Attrib>,
    },
    /// A compute program.
    Compute,
}

/// Width of the indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexFormat {
    /// 16-bit indices.
    #[default]
    Uint16,
    /// 32-bit indices.
    Uint32,
}

/// A resource could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateError {
    /// Every handle value of this kind is in use.
    HandlesExhausted(&'static str),
    /// A frame buffer references a texture that does not exist.
    UnknownAttachment(u16),
}

impl fmt::Display for CreateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateError::HandlesExhausted(kind) => write!(f, "No {kind} handles left"),
            CreateError::UnknownAttachment(id) => {
                write!(f, "Frame buffer attachment references unknown texture {id}")
            }
        }
    }
}

impl std::error::Error for CreateError {}

#[derive(Debug, Clone)]
pub(crate) struct VertexBufferEntry {
    pub(crate) layout: VertexLayout,
    pub(crate) count: u32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct IndexBufferEntry {
    pub(crate) count: u32,
    pub(crate) format: IndexFormat,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TextureEntry {
    pub(crate) mips: u8,
}

#[derive(Debug, Clone)]
pub(crate) struct UniformEntry {
    pub(crate) name: String,
    pub(crate) kind: UniformKind,
    pub(crate) count: u16,
}

/// A table of one resource kind with sequentially minted handles.
#[derive(Debug)]
pub(crate) struct Registry<K, V> {
    entries: HashMap<K, V>,
    next: u16,
    kind: &'static str,
}

impl<K: Copy + Eq + Hash, V> Registry<K, V> {
    pub(crate) fn new(kind: &'static str) -> Self {
        Self {
            entries: HashMap::new(),
            next: 0,
            kind,
        }
    }

    pub(crate) fn insert(&mut self, make_id: fn(u16) -> K, value: V) -> Result<K, CreateError> {
        let raw = self.next;
        self.next = raw
            .checked_add(1)
            .ok_or(CreateError::HandlesExhausted(self.kind))?;
        let id = make_id(raw);
        self.entries.insert(id, value);
        log::trace!("Created {} {}", self.kind, raw);
        Ok(id)
    }

    pub(crate) fn get(&self, id: K) -> Option<&V> {
        self.entries.get(&id)
    }

    pub(crate) fn contains(&self, id: K) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn kind(&self) -> &'static str {
        self.kind
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
