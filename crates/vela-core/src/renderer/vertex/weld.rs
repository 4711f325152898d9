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

//! Vertex welding: merging vertices closer than an epsilon.

use super::layout::{Attrib, VertexLayout};
use super::pack::unpack;
use crate::renderer::error::LayoutError;
use ahash::AHashMap;

/// What "close" means when welding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeldMode {
    /// Only positions are compared.
    #[default]
    Position,
    /// Every declared attribute must be within epsilon.
    AllAttributes,
}

/// The result of a weld.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeldOutput {
    /// Number of distinct vertices left.
    pub unique_count: u32,
    /// For each input vertex, the index of the vertex it was merged into (itself when unique).
    pub remap: Vec<u32>,
}

/// Welds `count` vertices by position. See [`weld_with`].
pub fn weld(
    layout: &VertexLayout,
    data: &[u8],
    count: u32,
    epsilon: f32,
) -> Result<WeldOutput, LayoutError> {
    weld_with(layout, data, count, epsilon, WeldMode::Position)
}

type Cell = [i64; 3];

/// Welds `count` vertices of `data`.
///
/// Two vertices are close when every compared component differs by at most
/// `epsilon`. A vertex merges into the lowest-indexed earlier representative it is
/// close to; a representative is a vertex that merged into nothing. Candidates are
/// looked up in a spatial hash over positions with a cell size of `epsilon`, or by
/// exact position when `epsilon` is zero.
pub fn weld_with(
    layout: &VertexLayout,
    data: &[u8],
    count: u32,
    epsilon: f32,
    mode: WeldMode,
) -> Result<WeldOutput, LayoutError> {
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(LayoutError::InvalidEpsilon(epsilon));
    }
    if !layout.has(Attrib::Position) {
        return Err(LayoutError::MissingAttribute(Attrib::Position));
    }
    let required = layout.size(count);
    if required > data.len() {
        return Err(LayoutError::BufferTooSmall {
            required,
            actual: data.len(),
        });
    }

    let positions = (0..count)
        .map(|i| unpack(Attrib::Position, layout, data, i, false))
        .collect::<Result<Vec<_>, _>>()?;

    let compared: Vec<(Attrib, usize)> = match mode {
        WeldMode::Position => Vec::new(),
        WeldMode::AllAttributes => layout
            .iter()
            .filter(|(a, _)| *a != Attrib::Position)
            .map(|(a, d)| (a, d.num as usize))
            .collect(),
    };
    let mut others = Vec::with_capacity(compared.len());
    for &(attrib, _) in &compared {
        let values = (0..count)
            .map(|i| unpack(attrib, layout, data, i, false))
            .collect::<Result<Vec<_>, _>>()?;
        others.push(values);
    }

    let close = |a: usize, b: usize| -> bool {
        let near = |x: &[f32], y: &[f32]| x.iter().zip(y).all(|(p, q)| (p - q).abs() <= epsilon);
        near(&positions[a][..3], &positions[b][..3])
            && compared
                .iter()
                .zip(&others)
                .all(|(&(_, num), values)| near(&values[a][..num], &values[b][..num]))
    };

    let cell_of = |p: &[f32; 4]| -> Cell {
        if epsilon == 0.0 {
            // Adding 0.0 folds -0.0 into 0.0 so both land in one cell.
            [
                i64::from((p[0] + 0.0).to_bits()),
                i64::from((p[1] + 0.0).to_bits()),
                i64::from((p[2] + 0.0).to_bits()),
            ]
        } else {
            [
                (p[0] / epsilon).floor() as i64,
                (p[1] / epsilon).floor() as i64,
                (p[2] / epsilon).floor() as i64,
            ]
        }
    };

    let mut grid: AHashMap<Cell, Vec<u32>> = AHashMap::with_capacity(count as usize);
    let mut remap = Vec::with_capacity(count as usize);
    let mut unique_count = 0u32;

    for i in 0..count as usize {
        let cell = cell_of(&positions[i]);
        let mut found: Option<u32> = None;

        if epsilon == 0.0 {
            if let Some(reps) = grid.get(&cell) {
                found = reps.iter().copied().find(|&r| close(i, r as usize));
            }
        } else {
            for dx in -1..=1i64 {
                for dy in -1..=1i64 {
                    for dz in -1..=1i64 {
                        let neighbour = [
                            cell[0].saturating_add(dx),
                            cell[1].saturating_add(dy),
                            cell[2].saturating_add(dz),
                        ];
                        let Some(reps) = grid.get(&neighbour) else {
                            continue;
                        };
                        // Representatives are pushed in index order.
                        if let Some(r) = reps.iter().copied().find(|&r| close(i, r as usize)) {
                            found = Some(found.map_or(r, |f| f.min(r)));
                        }
                    }
                }
            }
        }

        match found {
            Some(rep) => remap.push(rep),
            None => {
                let index = i as u32;
                remap.push(index);
                grid.entry(cell).or_default().push(index);
                unique_count += 1;
            }
        }
    }

    log::trace!("Welded {count} vertices into {unique_count} (epsilon {epsilon}, {mode:?})");
    Ok(WeldOutput {
        unique_count,
        remap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::vertex::{pack, AttribType};

    fn layout() -> VertexLayout {
        VertexLayout::builder()
            .add(Attrib::Position, 3, AttribType::Float, false)
            .add(Attrib::TexCoord0, 2, AttribType::Float, false)
            .build()
            .expect("valid layout")
    }

    fn mesh(points: &[([f32; 3], [f32; 2])]) -> Vec<u8> {
        let layout = layout();
        let mut data = vec![0u8; layout.size(points.len() as u32)];
        for (i, (p, uv)) in points.iter().enumerate() {
            pack([p[0], p[1], p[2], 0.0], false, Attrib::Position, &layout, &mut data, i as u32)
                .expect("pack");
            pack([uv[0], uv[1], 0.0, 0.0], false, Attrib::TexCoord0, &layout, &mut data, i as u32)
                .expect("pack");
        }
        data
    }

    #[test]
    fn unique_vertices_with_zero_epsilon_give_identity() {
        let data = mesh(&[
            ([0.0, 0.0, 0.0], [0.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0]),
            ([0.0, 1.0, 0.0], [0.0, 0.0]),
            ([0.0, 0.0, 1.0], [0.0, 0.0]),
        ]);
        let out = weld(&layout(), &data, 4, 0.0).expect("weld");
        assert_eq!(out.unique_count, 4);
        assert_eq!(out.remap, vec![0, 1, 2, 3]);
    }

    #[test]
    fn exact_duplicates_merge_with_zero_epsilon() {
        let data = mesh(&[
            ([1.0, 2.0, 3.0], [0.0, 0.0]),
            ([4.0, 5.0, 6.0], [0.0, 0.0]),
            ([1.0, 2.0, 3.0], [1.0, 1.0]),
            ([-0.0, 0.0, 0.0], [0.0, 0.0]),
            ([0.0, 0.0, 0.0], [0.0, 0.0]),
        ]);
        let out = weld(&layout(), &data, 5, 0.0).expect("weld");
        assert_eq!(out.unique_count, 3);
        assert_eq!(out.remap, vec![0, 1, 0, 3, 3]);
    }

    #[test]
    fn vertices_closer_than_epsilon_merge() {
        let data = mesh(&[
            ([0.0, 0.0, 0.0], [0.0, 0.0]),
            ([5.0, 5.0, 5.0], [0.0, 0.0]),
            ([0.0005, 0.0, -0.0005], [0.0, 0.0]),
        ]);
        let out = weld(&layout(), &data, 3, 0.001).expect("weld");
        assert_eq!(out.unique_count, 2);
        assert_eq!(out.remap[2], out.remap[0]);
        assert_eq!(out.remap[0], 0);
    }

    #[test]
    fn lowest_index_wins_across_cells() {
        // 0 and 1 are 1.5 eps apart, so both stay; 2 is within eps of both.
        let data = mesh(&[
            ([0.0, 0.0, 0.0], [0.0, 0.0]),
            ([0.15, 0.0, 0.0], [0.0, 0.0]),
            ([0.08, 0.0, 0.0], [0.0, 0.0]),
        ]);
        let out = weld(&layout(), &data, 3, 0.1).expect("weld");
        assert_eq!(out.unique_count, 2);
        assert_eq!(out.remap, vec![0, 1, 0]);
    }

    #[test]
    fn all_attributes_mode_keeps_seams() {
        let data = mesh(&[
            ([0.0, 0.0, 0.0], [0.0, 0.0]),
            ([0.0, 0.0, 0.0], [1.0, 0.0]),
            ([0.0, 0.0, 0.0], [0.0, 0.0]),
        ]);
        let by_position = weld(&layout(), &data, 3, 0.0).expect("weld");
        assert_eq!(by_position.unique_count, 1);

        let full = weld_with(&layout(), &data, 3, 0.0, WeldMode::AllAttributes).expect("weld");
        assert_eq!(full.unique_count, 2);
        assert_eq!(full.remap, vec![0, 1, 0]);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let data = mesh(&[([0.0, 0.0, 0.0], [0.0, 0.0])]);
        assert_eq!(
            weld(&layout(), &data, 1, -1.0),
            Err(LayoutError::InvalidEpsilon(-1.0))
        );
        assert!(matches!(
            weld(&layout(), &data, 2, 0.1),
            Err(LayoutError::BufferTooSmall { .. })
        ));

        let no_position = VertexLayout::builder()
            .add(Attrib::Normal, 3, AttribType::Float, false)
            .build()
            .expect("valid layout");
        assert_eq!(
            weld(&no_position, &data, 1, 0.1),
            Err(LayoutError::MissingAttribute(Attrib::Position))
        );
    }
}
