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

//! Integration tests for the draw state accumulator and the submission pipeline,
//! run against the headless backend.

use vela_core::math::{Mat4, Vec3};
use vela_core::renderer::*;
use vela_infra::{CommandKind, DrawRecord, HeadlessBackend, ProgramKind};
use vela_sdk::{DrawState, Renderer, RendererConfig};

/// Helper: a renderer over a fresh headless backend.
fn renderer_with(config: RendererConfig) -> Renderer<HeadlessBackend> {
    let _ = env_logger::builder().is_test(true).try_init();
    Renderer::new(HeadlessBackend::default(), config).unwrap()
}

/// Helper: a renderer with the default configuration.
fn renderer() -> Renderer<HeadlessBackend> {
    renderer_with(RendererConfig::default())
}

/// Helper: a 12-byte position layout.
fn position_layout() -> VertexLayout {
    VertexLayout::builder()
        .add(Attrib::Position, 3, AttribType::Float, false)
        .build()
        .unwrap()
}

/// Helper: a flat-color program reading positions.
fn flat_program(renderer: &mut Renderer<HeadlessBackend>) -> ProgramId {
    renderer
        .backend_mut()
        .create_program(ProgramKind::Graphics {
            attributes: vec![Attrib::Position],
        })
        .unwrap()
}

/// Helper: allocates a transient triangle and fills its positions.
fn transient_triangle(renderer: &mut Renderer<HeadlessBackend>) -> TransientVertexBuffer {
    let layout = position_layout();
    let vertices = renderer.allocate_transient_vertices(3, &layout).unwrap();
    let data = renderer.transient_vertex_data_mut(&vertices).unwrap();
    let positions = [[-1.0, -1.0, 0.0, 1.0], [1.0, -1.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0]];
    for (i, p) in positions.iter().enumerate() {
        pack(*p, false, Attrib::Position, &layout, data, i as u32).unwrap();
    }
    vertices
}

/// Helper: the draws of the last finished frame.
fn last_draws(renderer: &Renderer<HeadlessBackend>) -> Vec<DrawRecord> {
    renderer
        .backend()
        .last_frame()
        .map(|frame| frame.draws().cloned().collect())
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Submission
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_triangle_then_empty_submit() {
    // ARRANGE
    let mut renderer = renderer();
    let view = ViewId(0);
    renderer
        .set_view_rect(view, ViewRect::new(0, 0, 1280, 720))
        .unwrap();
    renderer
        .set_view_clear(view, ClearFlags::COLOR | ClearFlags::DEPTH, 0x3030_30ff, 1.0, 0)
        .unwrap();
    let program = flat_program(&mut renderer);
    let triangle = transient_triangle(&mut renderer);

    // ACT
    renderer.set_vertex_buffer(0, triangle).unwrap();
    let first = renderer.submit(view, program, 0).unwrap();
    let second = renderer.submit(view, program, 0).unwrap();

    // ASSERT
    assert_eq!(first, 1);
    assert_eq!(second, 0, "Nothing is bound after the first submit");
    assert_eq!(
        renderer.last_submit_error(),
        Some(&SubmitError::MissingVertexStream)
    );
}

#[test]
fn test_submit_returns_to_idle() {
    let mut renderer = renderer();
    let program = flat_program(&mut renderer);
    let triangle = transient_triangle(&mut renderer);

    renderer.set_vertex_buffer(0, triangle).unwrap();
    renderer.set_state(RenderState::default(), Some(0xff00_00ff));
    assert_eq!(renderer.draw_state(), DrawState::Pending);

    renderer.submit(ViewId(0), program, 0).unwrap();

    assert_eq!(renderer.draw_state(), DrawState::Idle);
}

#[test]
fn test_out_of_range_view_still_resets_state() {
    let mut renderer = renderer_with(RendererConfig {
        max_views: 2,
        ..RendererConfig::default()
    });
    let program = flat_program(&mut renderer);
    let triangle = transient_triangle(&mut renderer);
    renderer.set_vertex_buffer(0, triangle).unwrap();

    let result = renderer.submit(ViewId(2), program, 0);

    assert_eq!(
        result,
        Err(RenderError::View(ViewError::OutOfRange {
            id: ViewId(2),
            max: 2
        }))
    );
    assert_eq!(renderer.draw_state(), DrawState::Idle);
}

#[test]
fn test_backend_rejection_reports_zero_draws() {
    let mut renderer = renderer();
    let program = flat_program(&mut renderer);

    renderer.set_vertex_buffer(0, VertexBufferId(42)).unwrap();
    let issued = renderer.submit(ViewId(0), program, 0).unwrap();
    renderer.advance_frame();

    assert_eq!(issued, 0);
    assert_eq!(
        renderer.last_submit_error(),
        Some(&SubmitError::InvalidHandle {
            kind: "vertex buffer",
            id: 42
        })
    );
    assert_eq!(renderer.last_frame_stats().rejected_submissions, 1);
}

#[test]
fn test_failing_setter_leaves_state_unchanged() {
    let mut renderer = renderer_with(RendererConfig {
        max_texture_units: 2,
        ..RendererConfig::default()
    });
    let sampler = renderer
        .backend_mut()
        .create_uniform("s_color", UniformKind::Sampler, 1)
        .unwrap();
    let texture = renderer.backend_mut().create_texture(1).unwrap();

    let stream = renderer.set_vertex_buffer(4, VertexBufferId(0));
    let unit = renderer.set_texture(2, sampler, texture, None);
    let stage = renderer.set_compute_buffer(8, ComputeBuffer::Vertex(VertexBufferId(0)), Access::Read);

    assert_eq!(
        stream,
        Err(RenderError::Binding(BindingError::StreamOutOfRange {
            stream: 4,
            max: 4
        }))
    );
    assert_eq!(
        unit,
        Err(RenderError::Binding(BindingError::TextureUnitOutOfRange {
            unit: 2,
            max: 2
        }))
    );
    assert!(matches!(
        stage,
        Err(RenderError::Binding(BindingError::ComputeStageOutOfRange { stage: 8, .. }))
    ));
    assert_eq!(renderer.draw_state(), DrawState::Idle);
}

#[test]
fn test_textures_and_uniforms_reach_the_backend() {
    let mut renderer = renderer();
    let program = flat_program(&mut renderer);
    let sampler = renderer
        .backend_mut()
        .create_uniform("s_color", UniformKind::Sampler, 1)
        .unwrap();
    let tint = renderer
        .backend_mut()
        .create_uniform("u_tint", UniformKind::Vec4, 1)
        .unwrap();
    let texture = renderer.backend_mut().create_texture(1).unwrap();
    let triangle = transient_triangle(&mut renderer);

    renderer.set_vertex_buffer(0, triangle).unwrap();
    renderer
        .set_texture(3, sampler, texture, Some(SamplerFlags::POINT))
        .unwrap();
    renderer.set_uniform(tint, UniformData::Vec4(vec![[1.0, 0.0, 0.0, 1.0]]));
    renderer.set_uniform(tint, UniformData::Vec4(vec![[0.0, 1.0, 0.0, 1.0]]));
    assert_eq!(renderer.submit(ViewId(0), program, 0), Ok(1));
    renderer.advance_frame();

    let draw = &last_draws(&renderer)[0];
    assert_eq!(draw.command.textures.len(), 1);
    assert_eq!(draw.command.textures[0].unit, 3);
    assert_eq!(
        draw.command.uniforms,
        vec![UniformBinding {
            uniform: tint,
            data: UniformData::Vec4(vec![[0.0, 1.0, 0.0, 1.0]]),
        }]
    );
}

#[test]
fn test_indirect_range_is_threaded_through() {
    let mut renderer = renderer();
    let program = flat_program(&mut renderer);
    let indirect = renderer.backend_mut().create_indirect_buffer(32).unwrap();
    let triangle = transient_triangle(&mut renderer);

    renderer.set_vertex_buffer(0, triangle).unwrap();
    let issued = renderer
        .submit_indirect(ViewId(0), program, indirect, 4, 10, 0)
        .unwrap();
    renderer.advance_frame();

    assert_eq!(issued, 10);
    assert_eq!(
        last_draws(&renderer)[0].command.indirect,
        Some(IndirectRange {
            buffer: indirect,
            start: 4,
            count: 10
        })
    );
    assert_eq!(renderer.last_frame_stats().draw_calls, 10);
}

#[test]
fn test_dispatch_consumes_compute_bindings_and_resets() {
    let mut renderer = renderer();
    let compute = renderer
        .backend_mut()
        .create_program(ProgramKind::Compute)
        .unwrap();
    let buffer = renderer
        .backend_mut()
        .create_dynamic_vertex_buffer(position_layout(), 64)
        .unwrap();
    let triangle = transient_triangle(&mut renderer);

    renderer.set_vertex_buffer(0, triangle).unwrap();
    renderer
        .set_compute_buffer(1, ComputeBuffer::DynamicVertex(buffer), Access::ReadWrite)
        .unwrap();
    renderer.dispatch(ViewId(0), compute, 4, 1, 1).unwrap();
    assert_eq!(renderer.draw_state(), DrawState::Idle);
    renderer.advance_frame();

    let frame = renderer.backend().last_frame().unwrap();
    let CommandKind::Dispatch(command) = &frame.passes[0].commands[0].kind else {
        panic!("Expected a dispatch");
    };
    assert_eq!(command.groups, [4, 1, 1]);
    assert_eq!(command.bindings.len(), 1);
    assert_eq!(command.bindings[0].stage, 1);
    assert_eq!(renderer.last_frame_stats().dispatches, 1);
}

#[test]
fn test_discard_drops_pending_state() {
    let mut renderer = renderer();
    let program = flat_program(&mut renderer);
    let triangle = transient_triangle(&mut renderer);

    renderer.set_vertex_buffer(0, triangle).unwrap();
    renderer.discard();
    let issued = renderer.submit(ViewId(0), program, 0).unwrap();
    renderer.advance_frame();

    assert_eq!(issued, 0);
    assert_eq!(renderer.last_frame_stats().discards, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Caches and transient data
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_cached_transforms_round_trip_bit_exact() {
    let mut renderer = renderer();
    let program = flat_program(&mut renderer);
    let matrices = [
        Mat4::from_translation(Vec3::new(0.1, -0.0, 1e-30)),
        Mat4::from_rotation_z(0.3) * Mat4::from_scale(Vec3::new(3.3, 7.1, f32::MIN_POSITIVE)),
    ];
    let triangle = transient_triangle(&mut renderer);

    let handle = renderer.set_transform(&matrices).unwrap();
    renderer.discard();
    renderer.set_vertex_buffer(0, triangle).unwrap();
    renderer.set_transform_cached(handle, 2).unwrap();
    renderer.submit(ViewId(0), program, 0).unwrap();
    renderer.advance_frame();

    let stored = &last_draws(&renderer)[0].command.transforms;
    assert_eq!(stored.len(), 2);
    for (stored, original) in stored.iter().zip(&matrices) {
        let a = stored.to_cols_array().map(f32::to_bits);
        let b = original.to_cols_array().map(f32::to_bits);
        assert_eq!(a, b);
    }
}

#[test]
fn test_alloc_transform_writes_in_place() {
    let mut renderer = renderer();
    let program = flat_program(&mut renderer);
    let triangle = transient_triangle(&mut renderer);
    let offset = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));

    let (handle, slots) = renderer.alloc_transform(1).unwrap();
    assert_eq!(slots[0], Mat4::IDENTITY);
    slots[0] = offset;
    renderer.set_vertex_buffer(0, triangle).unwrap();
    renderer.set_transform_cached(handle, 1).unwrap();
    renderer.submit(ViewId(0), program, 0).unwrap();
    renderer.advance_frame();

    assert_eq!(last_draws(&renderer)[0].command.transforms, vec![offset]);
}

#[test]
fn test_draws_bind_single_entries_of_an_allocated_run() {
    let mut renderer = renderer();
    let program = flat_program(&mut renderer);
    let offsets: Vec<Mat4> = (0..3)
        .map(|i| Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0)))
        .collect();

    let (run, slots) = renderer.alloc_transform(3).unwrap();
    slots.copy_from_slice(&offsets);

    let triangle = transient_triangle(&mut renderer);
    renderer.set_vertex_buffer(0, triangle).unwrap();
    renderer.set_transform_cached(run.offset(1).unwrap(), 1).unwrap();
    renderer.submit(ViewId(0), program, 0).unwrap();

    let triangle = transient_triangle(&mut renderer);
    renderer.set_vertex_buffer(0, triangle).unwrap();
    renderer.set_transform_cached(run.sub_run(2, 1).unwrap(), 1).unwrap();
    renderer.submit(ViewId(0), program, 1).unwrap();
    renderer.advance_frame();

    let draws = last_draws(&renderer);
    assert_eq!(draws[0].command.transforms, vec![offsets[1]]);
    assert_eq!(draws[1].command.transforms, vec![offsets[2]]);
    assert_eq!(
        run.offset(3),
        Err(CacheError::ExceedsRun { requested: 4, run: 3 })
    );
}

#[test]
fn test_cached_scissor_is_resolved() {
    let mut renderer = renderer();
    let program = flat_program(&mut renderer);
    let rect = ViewRect::new(10, 20, 30, 40);

    let handle = renderer.set_scissor(rect).unwrap();
    renderer.clear_scissor();
    let triangle = transient_triangle(&mut renderer);
    renderer.set_vertex_buffer(0, triangle).unwrap();
    renderer.submit(ViewId(0), program, 0).unwrap();

    let triangle = transient_triangle(&mut renderer);
    renderer.set_vertex_buffer(0, triangle).unwrap();
    renderer.set_scissor_cached(handle).unwrap();
    renderer.submit(ViewId(0), program, 1).unwrap();
    renderer.advance_frame();

    let draws = last_draws(&renderer);
    assert_eq!(draws[0].command.scissor, None);
    assert_eq!(draws[1].command.scissor, Some(rect));
    assert_eq!(renderer.last_frame_stats().scissors_cached, 1);
}

#[test]
fn test_handles_from_previous_frame_are_stale() {
    let mut renderer = renderer();
    let triangle = transient_triangle(&mut renderer);
    let transform = renderer.set_transform(&[Mat4::IDENTITY]).unwrap();
    let scissor = renderer.set_scissor(ViewRect::new(0, 0, 8, 8)).unwrap();

    renderer.advance_frame();

    assert_eq!(
        renderer.set_vertex_buffer(0, triangle),
        Err(RenderError::Transient(TransientError::Stale))
    );
    assert_eq!(
        renderer.set_transform_cached(transform, 1),
        Err(RenderError::Cache(CacheError::Stale {
            handle: 0,
            current: 1
        }))
    );
    assert!(matches!(
        renderer.set_scissor_cached(scissor),
        Err(RenderError::Cache(CacheError::Stale { .. }))
    ));
    assert!(renderer.transient_vertex_data_mut(&triangle).is_err());
}

#[test]
fn test_wrapped_transform_cache_reports_overwrite() {
    let mut renderer = renderer_with(RendererConfig {
        matrix_cache_size: 4,
        ..RendererConfig::default()
    });
    let m = Mat4::from_scale(Vec3::ONE * 2.0);

    let first = renderer.set_transform(&[m; 3]).unwrap();
    renderer.set_transform(&[m; 3]).unwrap();

    assert_eq!(
        renderer.set_transform_cached(first, 3),
        Err(RenderError::Cache(CacheError::Overwritten))
    );
}

#[test]
fn test_transient_bytes_reach_the_backend() {
    let mut renderer = renderer();
    let layout = position_layout();
    let program = flat_program(&mut renderer);
    let triangle = transient_triangle(&mut renderer);

    renderer.set_vertex_buffer(0, triangle).unwrap();
    renderer.submit(ViewId(0), program, 0).unwrap();
    renderer.advance_frame();

    let frame = renderer.backend().last_frame().unwrap();
    let start = triangle.offset as usize;
    let bytes = &frame.transient[start..start + triangle.size as usize];
    let top = unpack(Attrib::Position, &layout, bytes, 2, false).unwrap();
    assert_eq!(top, [0.0, 1.0, 0.0, 0.0], "undeclared components read as zero");
    assert_eq!(renderer.last_frame_stats().transient_bytes, 36);
    assert_eq!(renderer.transient().used(), 0);
}

#[test]
fn test_arena_capacity_scenario() {
    let layout = position_layout();

    let roomy = renderer_with(RendererConfig {
        transient_bytes: 60,
        ..RendererConfig::default()
    });
    let tight = renderer_with(RendererConfig {
        transient_bytes: 59,
        ..RendererConfig::default()
    });

    assert!(roomy.check_available_space(4, &layout, 6));
    assert!(!tight.check_available_space(4, &layout, 6));
}

#[test]
fn test_exhausted_arena_fails_without_partial_allocation() {
    let mut renderer = renderer_with(RendererConfig {
        transient_bytes: 59,
        ..RendererConfig::default()
    });
    let layout = position_layout();

    let result = renderer.allocate_transient(4, &layout, 6);

    assert!(matches!(
        result,
        Err(RenderError::Transient(TransientError::Exhausted { .. }))
    ));
    assert_eq!(renderer.transient().used(), 0);
    assert_eq!(renderer.available_transient_vertices(&layout, 100), 4);
}
