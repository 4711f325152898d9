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

// Vela Sandbox
// Renders a spinning triangle for a few frames through the threaded headless backend.

use anyhow::{Context, Result};
use vela_core::math::{Mat4, Vec3, FRAC_PI_4};
use vela_core::renderer::*;
use vela_infra::{FrameRecord, HeadlessBackend, ProgramKind, ThreadedBackend};
use vela_sdk::{Renderer, RendererConfig};

const FRAMES: u32 = 4;
const MAIN_VIEW: ViewId = ViewId(0);

const TRIANGLE: [([f32; 3], u32); 3] = [
    ([0.0, 0.5, 0.0], 0xff00_00ff),
    ([-0.5, -0.5, 0.0], 0x00ff_00ff),
    ([0.5, -0.5, 0.0], 0x0000_ffff),
];

fn vertex_layout() -> Result<VertexLayout> {
    Ok(VertexLayout::builder()
        .add(Attrib::Position, 3, AttribType::Float, false)
        .add(Attrib::Color0, 4, AttribType::Uint8, true)
        .build()?)
}

fn load_config() -> RendererConfig {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/sandbox.ron");
    match RendererConfig::load(path) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("{err}; using the default configuration");
            RendererConfig::default()
        }
    }
}

fn report(frame: FrameRecord) {
    for pass in &frame.passes {
        log::info!(
            "Frame {}: view '{}' {}x{} cleared {:?}, {} commands",
            frame.number,
            pass.name,
            pass.rect.width,
            pass.rect.height,
            pass.clear.flags,
            pass.commands.len()
        );
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let backend = ThreadedBackend::spawn(HeadlessBackend::default(), report)
        .context("Failed to start the render thread")?;
    let mut renderer = Renderer::new(backend, load_config())?;

    let layout = vertex_layout()?;
    let program = renderer
        .backend_mut()
        .inner_mut()
        .create_program(ProgramKind::Graphics {
            attributes: vec![Attrib::Position, Attrib::Color0],
        })?;

    renderer.set_view_name(MAIN_VIEW, "main")?;
    renderer.set_view_rect(MAIN_VIEW, ViewRect::new(0, 0, 1280, 720))?;
    renderer.set_view_clear(
        MAIN_VIEW,
        ClearFlags::COLOR | ClearFlags::DEPTH,
        0x3030_30ff,
        1.0,
        0,
    )?;
    let eye = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, Vec3::Y)
        .context("Degenerate camera")?;
    renderer.set_view_transform(
        MAIN_VIEW,
        eye,
        Mat4::perspective_rh_zo(FRAC_PI_4, 1280.0 / 720.0, 0.1, 100.0),
    )?;

    for frame in 0..FRAMES {
        if !renderer.check_available_space(3, &layout, 0) {
            log::warn!("Not enough transient space for the triangle");
            renderer.advance_frame();
            continue;
        }

        let vertices = renderer.allocate_transient_vertices(3, &layout)?;
        let data = renderer.transient_vertex_data_mut(&vertices)?;
        for (i, (position, color)) in TRIANGLE.iter().enumerate() {
            let [x, y, z] = *position;
            let rgba = vela_core::math::LinearRgba::from_rgba_u32(*color).to_array();
            pack([x, y, z, 1.0], false, Attrib::Position, &layout, data, i as u32)?;
            pack(rgba, false, Attrib::Color0, &layout, data, i as u32)?;
        }

        renderer.set_transform(&[Mat4::from_rotation_z(frame as f32 * 0.25)])?;
        renderer.set_vertex_buffer(0, vertices)?;
        renderer.set_state(RenderState::default(), None);
        let draw_calls = renderer.submit(MAIN_VIEW, program, 0)?;

        let next = renderer.advance_frame();
        log::debug!("Submitted {draw_calls} draw calls, now on frame {next}");
    }

    let stats = renderer.last_frame_stats();
    log::info!(
        "Done after {} frames: last frame issued {} draw calls using {} transient bytes",
        renderer.frame_number(),
        stats.draw_calls,
        stats.transient_bytes
    );
    Ok(())
}
