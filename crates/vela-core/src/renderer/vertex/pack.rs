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

//! Encoding and decoding of single attributes, and layout-to-layout conversion.
//!
//! Quantization rounds half away from zero (`f32::round`). Normalized `Uint8` and
//! `Uint10` are unsigned-normalized and clamp to `[0, 1]`; normalized `Int16` is
//! signed-normalized and clamps to `[-1, 1]`. Non-normalized integer storage
//! saturates to the type's range.

use super::half::{f16_to_f32, f32_to_f16};
use super::layout::{Attrib, AttribDesc, AttribType, VertexLayout};
use crate::renderer::error::LayoutError;

const UINT10_MAX: [f32; 4] = [1023.0, 1023.0, 1023.0, 3.0];
const UINT10_SHIFT: [u32; 4] = [0, 10, 20, 30];

/// Byte range of `attrib` of vertex `index`, checked against `len`.
fn attrib_range(
    layout: &VertexLayout,
    desc: &AttribDesc,
    index: u32,
    len: usize,
) -> Result<std::ops::Range<usize>, LayoutError> {
    let start = layout.size(index) + desc.offset as usize;
    let end = start + desc.size();
    if end > len {
        return Err(LayoutError::BufferTooSmall {
            required: end,
            actual: len,
        });
    }
    Ok(start..end)
}

fn check_len(layout: &VertexLayout, count: u32, len: usize) -> Result<(), LayoutError> {
    let required = layout.size(count);
    if required > len {
        return Err(LayoutError::BufferTooSmall {
            required,
            actual: len,
        });
    }
    Ok(())
}

fn is_unorm(desc: &AttribDesc) -> bool {
    desc.normalized && matches!(desc.ty, AttribType::Uint8 | AttribType::Uint10)
}

/// Writes `attrib` of vertex `index` into `data`.
///
/// Components beyond the declared count are ignored. When `input_normalized` is set
/// the input is taken as `[-1, 1]` and remapped to `[0, 1]` before it is stored
/// into unsigned-normalized storage. Packing an attribute the layout does not
/// declare writes nothing.
pub fn pack(
    input: [f32; 4],
    input_normalized: bool,
    attrib: Attrib,
    layout: &VertexLayout,
    data: &mut [u8],
    index: u32,
) -> Result<(), LayoutError> {
    let Some(desc) = layout.get(attrib) else {
        return Ok(());
    };
    let range = attrib_range(layout, desc, index, data.len())?;
    let dst = &mut data[range];
    let num = desc.num as usize;

    let mut values = input;
    if input_normalized && is_unorm(desc) {
        for v in &mut values[..num] {
            *v = *v * 0.5 + 0.5;
        }
    }

    match desc.ty {
        AttribType::Uint8 => {
            for (byte, &v) in dst.iter_mut().zip(&values[..num]) {
                *byte = if desc.normalized {
                    (v.clamp(0.0, 1.0) * 255.0).round() as u8
                } else {
                    v.round().clamp(0.0, 255.0) as u8
                };
            }
        }
        AttribType::Uint10 => {
            let mut packed = 0u32;
            for (i, &v) in values[..num].iter().enumerate() {
                let q = if desc.normalized {
                    (v.clamp(0.0, 1.0) * UINT10_MAX[i]).round()
                } else {
                    v.round().clamp(0.0, UINT10_MAX[i])
                };
                packed |= (q as u32) << UINT10_SHIFT[i];
            }
            dst.copy_from_slice(&packed.to_le_bytes());
        }
        AttribType::Int16 => {
            for (chunk, &v) in dst.chunks_exact_mut(2).zip(&values[..num]) {
                let q = if desc.normalized {
                    (v.clamp(-1.0, 1.0) * 32767.0).round() as i16
                } else {
                    v.round().clamp(-32768.0, 32767.0) as i16
                };
                chunk.copy_from_slice(&q.to_le_bytes());
            }
        }
        AttribType::Half => {
            for (chunk, &v) in dst.chunks_exact_mut(2).zip(&values[..num]) {
                chunk.copy_from_slice(&f32_to_f16(v).to_le_bytes());
            }
        }
        AttribType::Float => {
            for (chunk, &v) in dst.chunks_exact_mut(4).zip(&values[..num]) {
                chunk.copy_from_slice(&v.to_le_bytes());
            }
        }
    }
    Ok(())
}

/// Reads `attrib` of vertex `index` from `data`.
///
/// Undeclared components read as `0.0`, and an attribute the layout does not
/// declare reads as all zeros. `output_normalized` is the inverse of the `pack`
/// flag: unsigned-normalized values are remapped from `[0, 1]` to `[-1, 1]`.
pub fn unpack(
    attrib: Attrib,
    layout: &VertexLayout,
    data: &[u8],
    index: u32,
    output_normalized: bool,
) -> Result<[f32; 4], LayoutError> {
    let mut out = [0.0f32; 4];
    let Some(desc) = layout.get(attrib) else {
        return Ok(out);
    };
    let range = attrib_range(layout, desc, index, data.len())?;
    let src = &data[range];
    let num = desc.num as usize;

    match desc.ty {
        AttribType::Uint8 => {
            for (o, &b) in out[..num].iter_mut().zip(src) {
                *o = if desc.normalized {
                    f32::from(b) / 255.0
                } else {
                    f32::from(b)
                };
            }
        }
        AttribType::Uint10 => {
            let packed = u32::from_le_bytes([src[0], src[1], src[2], src[3]]);
            for (i, o) in out[..num].iter_mut().enumerate() {
                let q = (packed >> UINT10_SHIFT[i]) & UINT10_MAX[i] as u32;
                *o = if desc.normalized {
                    q as f32 / UINT10_MAX[i]
                } else {
                    q as f32
                };
            }
        }
        AttribType::Int16 => {
            for (o, chunk) in out[..num].iter_mut().zip(src.chunks_exact(2)) {
                let q = i16::from_le_bytes([chunk[0], chunk[1]]);
                *o = if desc.normalized {
                    (f32::from(q) / 32767.0).max(-1.0)
                } else {
                    f32::from(q)
                };
            }
        }
        AttribType::Half => {
            for (o, chunk) in out[..num].iter_mut().zip(src.chunks_exact(2)) {
                *o = f16_to_f32(u16::from_le_bytes([chunk[0], chunk[1]]));
            }
        }
        AttribType::Float => {
            for (o, chunk) in out[..num].iter_mut().zip(src.chunks_exact(4)) {
                *o = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            }
        }
    }

    if output_normalized && is_unorm(desc) {
        for v in &mut out[..num] {
            *v = *v * 2.0 - 1.0;
        }
    }
    Ok(out)
}

/// Re-encodes `count` vertices from `src_layout` into `dst_layout`.
///
/// Every destination vertex is zeroed, then each destination attribute that the
/// source also declares is decoded and re-encoded. Attributes missing from the
/// source stay zero. Identical layouts are copied byte for byte.
pub fn convert(
    dst_layout: &VertexLayout,
    dst: &mut [u8],
    src_layout: &VertexLayout,
    src: &[u8],
    count: u32,
) -> Result<(), LayoutError> {
    check_len(dst_layout, count, dst.len())?;
    check_len(src_layout, count, src.len())?;

    if dst_layout == src_layout {
        let size = dst_layout.size(count);
        dst[..size].copy_from_slice(&src[..size]);
        return Ok(());
    }

    let stride = dst_layout.stride() as usize;
    for index in 0..count {
        let start = index as usize * stride;
        dst[start..start + stride].fill(0);

        for (attrib, _) in dst_layout.iter() {
            if !src_layout.has(attrib) {
                continue;
            }
            let value = unpack(attrib, src_layout, src, index, false)?;
            pack(value, false, attrib, dst_layout, dst, index)?;
        }
    }
    Ok(())
}
