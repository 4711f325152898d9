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

//! Declarative vertex layouts.

use crate::renderer::error::LayoutError;

/// The semantic of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attrib {
    /// Position.
    Position,
    /// Normal.
    Normal,
    /// Tangent.
    Tangent,
    /// Bitangent.
    Bitangent,
    /// First vertex color.
    Color0,
    /// Second vertex color.
    Color1,
    /// Third vertex color.
    Color2,
    /// Fourth vertex color.
    Color3,
    /// Skinning bone indices.
    Indices,
    /// Skinning bone weights.
    Weight,
    /// Texture coordinate set 0.
    TexCoord0,
    /// Texture coordinate set 1.
    TexCoord1,
    /// Texture coordinate set 2.
    TexCoord2,
    /// Texture coordinate set 3.
    TexCoord3,
    /// Texture coordinate set 4.
    TexCoord4,
    /// Texture coordinate set 5.
    TexCoord5,
    /// Texture coordinate set 6.
    TexCoord6,
    /// Texture coordinate set 7.
    TexCoord7,
}

impl Attrib {
    /// Number of attribute semantics.
    pub const COUNT: usize = 18;

    /// Every attribute, in declaration order of the enum.
    pub const ALL: [Attrib; Attrib::COUNT] = [
        Attrib::Position,
        Attrib::Normal,
        Attrib::Tangent,
        Attrib::Bitangent,
        Attrib::Color0,
        Attrib::Color1,
        Attrib::Color2,
        Attrib::Color3,
        Attrib::Indices,
        Attrib::Weight,
        Attrib::TexCoord0,
        Attrib::TexCoord1,
        Attrib::TexCoord2,
        Attrib::TexCoord3,
        Attrib::TexCoord4,
        Attrib::TexCoord5,
        Attrib::TexCoord6,
        Attrib::TexCoord7,
    ];

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

/// Storage type of one attribute component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttribType {
    /// 8-bit unsigned integer.
    Uint8,
    /// 10-bit unsigned integer; three components and a 2-bit fourth share one `u32`.
    Uint10,
    /// 16-bit signed integer.
    Int16,
    /// IEEE 754 half float.
    Half,
    /// IEEE 754 single float.
    Float,
}

impl AttribType {
    /// Size in bytes of an attribute of this type with `num` components (1 to 4).
    ///
    /// Odd component counts of sub-dword types are padded to keep attributes
    /// 4-byte aligned where the hardware requires it.
    pub const fn size(self, num: u8) -> usize {
        const TABLE: [[usize; 4]; 5] = [
            [1, 2, 4, 4],
            [4, 4, 4, 4],
            [2, 4, 8, 8],
            [2, 4, 8, 8],
            [4, 8, 12, 16],
        ];
        let row = match self {
            AttribType::Uint8 => 0,
            AttribType::Uint10 => 1,
            AttribType::Int16 => 2,
            AttribType::Half => 3,
            AttribType::Float => 4,
        };
        let col = if num == 0 { 0 } else if num > 4 { 3 } else { num as usize - 1 };
        TABLE[row][col]
    }
}

/// One declared attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttribDesc {
    /// Component count, 1 to 4.
    pub num: u8,
    /// Component storage type.
    pub ty: AttribType,
    /// Integer storage holds normalized values (`[0, 1]` unsigned, `[-1, 1]` signed).
    pub normalized: bool,
    /// Byte offset inside the vertex.
    pub offset: u16,
}

impl AttribDesc {
    /// Bytes occupied by the attribute.
    #[inline]
    pub const fn size(&self) -> usize {
        self.ty.size(self.num)
    }
}

/// The byte layout of one vertex.
///
/// Built with [`VertexLayout::builder`]. Attributes are laid out in the order they
/// are added; a layout is `Copy` so it can travel inside transient buffer handles.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    attribs: [Option<AttribDesc>; Attrib::COUNT],
    order: [Attrib; Attrib::COUNT],
    len: u8,
    stride: u16,
}

impl VertexLayout {
    /// Starts a new layout.
    pub fn builder() -> VertexLayoutBuilder {
        VertexLayoutBuilder::default()
    }

    /// Bytes per vertex.
    #[inline]
    pub fn stride(&self) -> u16 {
        self.stride
    }

    /// Bytes occupied by `count` vertices.
    #[inline]
    pub fn size(&self, count: u32) -> usize {
        self.stride as usize * count as usize
    }

    /// Returns `true` if the layout declares `attrib`.
    #[inline]
    pub fn has(&self, attrib: Attrib) -> bool {
        self.attribs[attrib.slot()].is_some()
    }

    /// Returns the declaration of `attrib`.
    #[inline]
    pub fn get(&self, attrib: Attrib) -> Option<&AttribDesc> {
        self.attribs[attrib.slot()].as_ref()
    }

    /// Byte offset of `attrib` inside the vertex.
    #[inline]
    pub fn offset(&self, attrib: Attrib) -> Option<u16> {
        self.get(attrib).map(|d| d.offset)
    }

    /// Iterates declared attributes in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (Attrib, &AttribDesc)> + '_ {
        self.order[..self.len as usize]
            .iter()
            .filter_map(move |&a| self.get(a).map(|d| (a, d)))
    }

    /// Number of declared attributes.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns `true` if no attribute is declared.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Debug for VertexLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexLayout")
            .field("stride", &self.stride)
            .field("attribs", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Accumulates attribute declarations for a [`VertexLayout`].
///
/// Errors are deferred to [`build`](Self::build) so declarations chain.
#[derive(Debug, Clone, Default)]
pub struct VertexLayoutBuilder {
    attribs: Vec<(Attrib, AttribDesc)>,
    offset: usize,
    error: Option<LayoutError>,
}

impl VertexLayoutBuilder {
    /// Appends an attribute at the current offset.
    pub fn add(mut self, attrib: Attrib, num: u8, ty: AttribType, normalized: bool) -> Self {
        if self.error.is_some() {
            return self;
        }
        if !(1..=4).contains(&num) {
            self.error = Some(LayoutError::InvalidComponentCount { attrib, num });
            return self;
        }
        if self.attribs.iter().any(|(a, _)| *a == attrib) {
            self.error = Some(LayoutError::DuplicateAttribute(attrib));
            return self;
        }
        let Ok(offset) = u16::try_from(self.offset) else {
            self.error = Some(LayoutError::StrideOverflow);
            return self;
        };
        let desc = AttribDesc {
            num,
            ty,
            normalized,
            offset,
        };
        self.offset += desc.size();
        self.attribs.push((attrib, desc));
        self
    }

    /// Inserts `bytes` of padding.
    pub fn skip(mut self, bytes: u16) -> Self {
        self.offset += bytes as usize;
        self
    }

    /// Finishes the layout.
    pub fn build(self) -> Result<VertexLayout, LayoutError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let stride = u16::try_from(self.offset).map_err(|_| LayoutError::StrideOverflow)?;

        let mut layout = VertexLayout {
            attribs: [None; Attrib::COUNT],
            order: [Attrib::Position; Attrib::COUNT],
            len: 0,
            stride,
        };
        for (i, (attrib, desc)) in self.attribs.into_iter().enumerate() {
            layout.attribs[attrib.slot()] = Some(desc);
            layout.order[i] = attrib;
            layout.len += 1;
        }
        Ok(layout)
    }
}
