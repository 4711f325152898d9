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

//! Integration tests for the headless backend: validation, per-view ordering and
//! clear resolution.

use vela_core::math::{LinearRgba, Mat4, Vec3};
use vela_core::renderer::*;
use vela_infra::{CommandKind, HeadlessBackend, IndexFormat, ProgramKind};

/// Helper: a position-only layout.
fn position_layout() -> VertexLayout {
    VertexLayout::builder()
        .add(Attrib::Position, 3, AttribType::Float, false)
        .build()
        .unwrap()
}

/// Helper: a graphics program reading positions.
fn graphics_program(backend: &mut HeadlessBackend) -> ProgramId {
    backend
        .create_program(ProgramKind::Graphics {
            attributes: vec![Attrib::Position],
        })
        .unwrap()
}

/// Helper: a draw of `program` reading all of `buffer`.
fn draw(program: ProgramId, buffer: VertexBufferId) -> DrawCommand {
    let mut command = DrawCommand::new(program);
    command.streams.push(StreamBinding {
        stream: 0,
        source: buffer.into(),
    });
    command
}

/// Helper: finishes a frame with the given view table and an empty palette.
fn finish(backend: &mut HeadlessBackend, number: u64, views: &[ViewConfig]) -> u64 {
    backend.advance_frame(&FrameData {
        number,
        views,
        palette: &[],
        transient: &[],
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_submit_counts_one_draw_call() {
    let mut backend = HeadlessBackend::default();
    let program = graphics_program(&mut backend);
    let vb = backend.create_vertex_buffer(position_layout(), 3).unwrap();

    let issued = backend.submit(ViewId(0), draw(program, vb), 0).unwrap();

    assert_eq!(issued, 1);
    assert_eq!(backend.pending_commands(), 1);
}

#[test]
fn test_submit_rejects_unknown_program() {
    let mut backend = HeadlessBackend::default();
    let vb = backend.create_vertex_buffer(position_layout(), 3).unwrap();

    let result = backend.submit(ViewId(0), draw(ProgramId(9), vb), 0);

    assert_eq!(
        result,
        Err(SubmitError::InvalidHandle {
            kind: "program",
            id: 9
        })
    );
    assert_eq!(backend.pending_commands(), 0);
}

#[test]
fn test_submit_rejects_compute_program() {
    let mut backend = HeadlessBackend::default();
    let program = backend.create_program(ProgramKind::Compute).unwrap();
    let vb = backend.create_vertex_buffer(position_layout(), 3).unwrap();

    let result = backend.submit(ViewId(0), draw(program, vb), 0);

    assert_eq!(result, Err(SubmitError::NotGraphicsProgram(program)));
}

#[test]
fn test_submit_requires_a_vertex_source() {
    let mut backend = HeadlessBackend::default();
    let program = backend
        .create_program(ProgramKind::Graphics { attributes: vec![] })
        .unwrap();

    let missing = backend.submit(ViewId(0), DrawCommand::new(program), 0);
    let mut generated = DrawCommand::new(program);
    generated.vertex_count = Some(3);
    let issued = backend.submit(ViewId(0), generated, 0);

    assert_eq!(missing, Err(SubmitError::MissingVertexStream));
    assert_eq!(issued, Ok(1));
}

#[test]
fn test_submit_rejects_range_past_buffer_end() {
    let mut backend = HeadlessBackend::default();
    let program = graphics_program(&mut backend);
    let vb = backend.create_vertex_buffer(position_layout(), 4).unwrap();
    let mut command = DrawCommand::new(program);
    command.streams.push(StreamBinding {
        stream: 0,
        source: VertexStream::Static {
            buffer: vb,
            first: 2,
            count: 3,
        },
    });

    let result = backend.submit(ViewId(0), command, 0);

    assert_eq!(
        result,
        Err(SubmitError::RangeOutOfBounds {
            kind: "vertex buffer",
            end: 5,
            len: 4
        })
    );
}

#[test]
fn test_submit_rejects_missing_attribute() {
    let mut backend = HeadlessBackend::default();
    let program = backend
        .create_program(ProgramKind::Graphics {
            attributes: vec![Attrib::Position, Attrib::TexCoord0],
        })
        .unwrap();
    let vb = backend.create_vertex_buffer(position_layout(), 3).unwrap();

    let result = backend.submit(ViewId(0), draw(program, vb), 0);

    assert_eq!(
        result,
        Err(SubmitError::LayoutMismatch {
            attrib: Attrib::TexCoord0
        })
    );
}

#[test]
fn test_submit_checks_uniform_declaration() {
    let mut backend = HeadlessBackend::default();
    let program = graphics_program(&mut backend);
    let vb = backend.create_vertex_buffer(position_layout(), 3).unwrap();
    let tint = backend.create_uniform("u_tint", UniformKind::Vec4, 1).unwrap();

    let mut wrong_kind = draw(program, vb);
    wrong_kind.uniforms.push(UniformBinding {
        uniform: tint,
        data: UniformData::Mat4(vec![Mat4::IDENTITY]),
    });
    let mut too_long = draw(program, vb);
    too_long.uniforms.push(UniformBinding {
        uniform: tint,
        data: UniformData::Vec4(vec![[1.0; 4]; 2]),
    });
    let mut valid = draw(program, vb);
    valid.uniforms.push(UniformBinding {
        uniform: tint,
        data: UniformData::Vec4(vec![[1.0; 4]]),
    });

    assert_eq!(
        backend.submit(ViewId(0), wrong_kind, 0),
        Err(SubmitError::UniformMismatch(tint.0))
    );
    assert_eq!(
        backend.submit(ViewId(0), too_long, 0),
        Err(SubmitError::UniformMismatch(tint.0))
    );
    assert_eq!(backend.submit(ViewId(0), valid, 0), Ok(1));
}

#[test]
fn test_indexed_instanced_draw_counts() {
    let mut backend = HeadlessBackend::default();
    let program = graphics_program(&mut backend);
    let vb = backend.create_vertex_buffer(position_layout(), 4).unwrap();
    let ib = backend.create_index_buffer(12, IndexFormat::Uint32).unwrap();
    let instances = backend.create_vertex_buffer(position_layout(), 8).unwrap();

    let mut command = draw(program, vb);
    command.index = Some(IndexSource::Static {
        buffer: ib,
        first: 6,
        count: ALL_ELEMENTS,
    });
    command.instances = Some(InstanceSource::Static {
        buffer: instances,
        first: 0,
        count: 5,
    });
    backend.submit(ViewId(0), command, 0).unwrap();
    finish(&mut backend, 0, &[]);

    let frame = backend.last_frame().unwrap();
    let record = frame.draws().next().unwrap();
    assert_eq!(record.element_count, 6);
    assert_eq!(record.instance_count, 5);
    assert_eq!(record.index_format, Some(IndexFormat::Uint32));
}

#[test]
fn test_empty_draw_is_not_recorded() {
    let mut backend = HeadlessBackend::default();
    let program = graphics_program(&mut backend);
    let vb = backend.create_vertex_buffer(position_layout(), 3).unwrap();
    let mut command = draw(program, vb);
    command.streams[0].source = VertexStream::Static {
        buffer: vb,
        first: 3,
        count: ALL_ELEMENTS,
    };

    assert_eq!(backend.submit(ViewId(0), command, 0), Ok(0));
    assert_eq!(backend.pending_commands(), 0);
}

#[test]
fn test_indirect_draw_issues_range_count() {
    let mut backend = HeadlessBackend::default();
    let program = graphics_program(&mut backend);
    let vb = backend.create_vertex_buffer(position_layout(), 3).unwrap();
    let indirect = backend.create_indirect_buffer(16).unwrap();

    let mut command = draw(program, vb);
    command.indirect = Some(IndirectRange {
        buffer: indirect,
        start: 4,
        count: 8,
    });
    let mut overrun = draw(program, vb);
    overrun.indirect = Some(IndirectRange {
        buffer: indirect,
        start: 10,
        count: 8,
    });

    assert_eq!(backend.submit(ViewId(0), command, 0), Ok(8));
    assert!(matches!(
        backend.submit(ViewId(0), overrun, 0),
        Err(SubmitError::RangeOutOfBounds { end: 18, len: 16, .. })
    ));
}

#[test]
fn test_draw_call_budget_is_enforced() {
    let limits = BackendLimits {
        max_draw_calls: 2,
        ..BackendLimits::default()
    };
    let mut backend = HeadlessBackend::new(limits);
    let program = graphics_program(&mut backend);
    let vb = backend.create_vertex_buffer(position_layout(), 3).unwrap();

    assert_eq!(backend.submit(ViewId(0), draw(program, vb), 0), Ok(1));
    assert_eq!(backend.submit(ViewId(0), draw(program, vb), 0), Ok(1));
    assert_eq!(
        backend.submit(ViewId(0), draw(program, vb), 0),
        Err(SubmitError::DrawCallLimit(2))
    );

    // The budget is per frame.
    finish(&mut backend, 0, &[]);
    assert_eq!(backend.submit(ViewId(0), draw(program, vb), 0), Ok(1));
}

#[test]
fn test_dispatch_requires_compute_program() {
    let mut backend = HeadlessBackend::default();
    let graphics = graphics_program(&mut backend);
    let compute = backend.create_program(ProgramKind::Compute).unwrap();
    let texture = backend.create_texture(2).unwrap();

    let command = |program| ComputeCommand {
        program,
        bindings: vec![ComputeStageBinding {
            stage: 0,
            binding: ComputeBinding::Image {
                texture,
                mip: 1,
                access: Access::Write,
            },
        }],
        uniforms: vec![],
        groups: [8, 8, 1],
    };

    assert_eq!(
        backend.dispatch(ViewId(0), command(graphics)),
        Err(SubmitError::NotComputeProgram(graphics))
    );
    assert_eq!(backend.dispatch(ViewId(0), command(compute)), Ok(()));
    assert_eq!(backend.pending_commands(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame assembly
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_sorted_view_orders_by_key_with_compute_first() {
    let mut backend = HeadlessBackend::default();
    let program = graphics_program(&mut backend);
    let compute = backend.create_program(ProgramKind::Compute).unwrap();
    let vb = backend.create_vertex_buffer(position_layout(), 3).unwrap();

    backend.submit(ViewId(0), draw(program, vb), 30).unwrap();
    backend.submit(ViewId(0), draw(program, vb), 10).unwrap();
    backend
        .dispatch(
            ViewId(0),
            ComputeCommand {
                program: compute,
                bindings: vec![],
                uniforms: vec![],
                groups: [1, 1, 1],
            },
        )
        .unwrap();
    backend.submit(ViewId(0), draw(program, vb), 20).unwrap();
    finish(&mut backend, 0, &[]);

    let pass = &backend.last_frame().unwrap().passes[0];
    assert!(matches!(pass.commands[0].kind, CommandKind::Dispatch(_)));
    let keys: Vec<u32> = pass.commands[1..].iter().map(|c| c.sort_key).collect();
    assert_eq!(keys, vec![10, 20, 30]);
}

#[test]
fn test_sequential_view_keeps_submission_order() {
    let mut backend = HeadlessBackend::default();
    let program = graphics_program(&mut backend);
    let vb = backend.create_vertex_buffer(position_layout(), 3).unwrap();
    let mut config = ViewConfig::new(ViewId(0));
    config.sequential = true;

    for key in [30, 10, 20] {
        backend.submit(ViewId(0), draw(program, vb), key).unwrap();
    }
    finish(&mut backend, 0, &[config]);

    let pass = &backend.last_frame().unwrap().passes[0];
    let keys: Vec<u32> = pass.commands.iter().map(|c| c.sort_key).collect();
    assert_eq!(keys, vec![30, 10, 20]);
}

#[test]
fn test_passes_are_ordered_by_view_id() {
    let mut backend = HeadlessBackend::default();
    let program = graphics_program(&mut backend);
    let vb = backend.create_vertex_buffer(position_layout(), 3).unwrap();

    backend.submit(ViewId(5), draw(program, vb), 0).unwrap();
    backend.submit(ViewId(1), draw(program, vb), 0).unwrap();
    let completed = finish(&mut backend, 0, &[]);

    let frame = backend.last_frame().unwrap();
    let ids: Vec<u16> = frame.passes.iter().map(|p| p.view.0).collect();
    assert_eq!(ids, vec![1, 5]);
    assert_eq!(frame.draw_calls, 2);
    assert_eq!(completed, 1);
    assert_eq!(backend.pending_commands(), 0);
}

#[test]
fn test_scissor_and_transform_are_resolved_against_view() {
    let mut backend = HeadlessBackend::default();
    let program = graphics_program(&mut backend);
    let vb = backend.create_vertex_buffer(position_layout(), 3).unwrap();
    let mut config = ViewConfig::new(ViewId(0));
    config.scissor = Some(ViewRect::new(0, 0, 100, 100));
    config.view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));

    let mut command = draw(program, vb);
    command.scissor = Some(ViewRect::new(50, 50, 100, 100));
    command.transforms = vec![Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0))];
    backend.submit(ViewId(0), command, 0).unwrap();
    finish(&mut backend, 0, &[config]);

    let record = backend.last_frame().unwrap().draws().next().unwrap().clone();
    assert_eq!(record.scissor, Some(ViewRect::new(50, 50, 50, 50)));
    let origin = record.model_view_projection.transform_point3(Vec3::ZERO);
    assert_eq!(origin, Vec3::new(1.0, 0.0, -5.0));
}

#[test]
fn test_clear_only_view_produces_a_pass() {
    let mut backend = HeadlessBackend::default();
    let mut config = ViewConfig::new(ViewId(0));
    config.clear = ClearConfig {
        flags: ClearFlags::COLOR | ClearFlags::DEPTH,
        color: ClearColor::Rgba(0xff00_00ff),
        depth: 1.0,
        stencil: 0,
    };
    let idle = ViewConfig::new(ViewId(1));

    finish(&mut backend, 0, &[config, idle]);

    let frame = backend.last_frame().unwrap();
    assert_eq!(frame.passes.len(), 1);
    assert_eq!(
        frame.passes[0].clear.colors,
        vec![Some(LinearRgba::from_rgba_u32(0xff00_00ff))]
    );
}

#[test]
fn test_palette_clear_resolves_per_attachment() {
    let mut backend = HeadlessBackend::default();
    let a = backend.create_texture(1).unwrap();
    let b = backend.create_texture(1).unwrap();
    let c = backend.create_texture(1).unwrap();
    let fb = backend.create_frame_buffer(&[a, b, c]).unwrap();

    let mut config = ViewConfig::new(ViewId(0));
    config.frame_buffer = Some(fb);
    let mut indices = [CLEAR_TARGET_NONE; MAX_FRAME_BUFFER_ATTACHMENTS];
    indices[0] = 1;
    indices[2] = 40;
    config.clear = ClearConfig {
        flags: ClearFlags::COLOR,
        color: ClearColor::Palette(indices),
        ..ClearConfig::default()
    };
    let palette = [LinearRgba::BLACK, LinearRgba::WHITE];

    backend.advance_frame(&FrameData {
        number: 0,
        views: &[config],
        palette: &palette,
        transient: &[],
    });

    let clear = &backend.last_frame().unwrap().passes[0].clear;
    assert_eq!(clear.colors, vec![Some(LinearRgba::WHITE), None, None]);
}

#[test]
fn test_frame_record_copies_transient_bytes() {
    let mut backend = HeadlessBackend::default();
    let bytes = [1u8, 2, 3, 4];

    backend.advance_frame(&FrameData {
        number: 7,
        views: &[],
        palette: &[],
        transient: &bytes,
    });

    let frame = backend.take_last_frame().unwrap();
    assert_eq!(frame.number, 7);
    assert_eq!(frame.transient, bytes.to_vec());
    assert!(backend.last_frame().is_none());
}
