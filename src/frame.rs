/*
 * Frame Module
 *
 * The hand-off between the simulation and whatever draws it. A tick
 * produces a RenderableFrame (global uniforms plus one DrawParams per
 * drawable); a RenderBackend consumes it. The backend owns every drawing
 * resource and never feeds anything back into the simulation.
 */

use glam::{Mat4, Vec3};

use crate::mesh::MeshRef;

#[derive(Debug, Clone, PartialEq)]
pub struct FrameUniforms {
    pub projection: Mat4,
    pub view: Mat4,
    pub background: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawParams {
    pub mesh: MeshRef,
    pub model: Mat4,
    pub color: Vec3,
    pub alpha: f32,
}

impl DrawParams {
    pub fn opaque(mesh: MeshRef, model: Mat4, color: Vec3) -> Self {
        Self {
            mesh,
            model,
            color,
            alpha: 1.0,
        }
    }

    pub fn is_translucent(&self) -> bool {
        self.alpha < 1.0
    }
}

/// Everything needed to draw one tick. Opaque drawables come first,
/// translucent ones (the dome) last.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableFrame {
    pub uniforms: FrameUniforms,
    pub drawables: Vec<DrawParams>,
}

pub trait RenderBackend {
    fn begin_frame(&mut self, uniforms: &FrameUniforms);
    fn set_alpha_blending(&mut self, enabled: bool);
    fn draw(&mut self, params: &DrawParams);
    fn end_frame(&mut self) {}
}

/// Replay a frame into a backend, turning blending on only around
/// translucent drawables.
pub fn submit<B: RenderBackend + ?Sized>(frame: &RenderableFrame, backend: &mut B) {
    backend.begin_frame(&frame.uniforms);

    let mut blending = false;
    backend.set_alpha_blending(false);
    for params in &frame.drawables {
        if params.is_translucent() != blending {
            blending = params.is_translucent();
            backend.set_alpha_blending(blending);
        }
        backend.draw(params);
    }
    if blending {
        backend.set_alpha_blending(false);
    }

    backend.end_frame();
}
