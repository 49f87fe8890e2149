/*
 * Renderer Module
 *
 * This module draws RenderableFrames with nannou's immediate-mode Draw API.
 * NannouBackend projects every mesh triangle through projection * view *
 * model, shades it from the mesh normals (or the face normal when the mesh
 * has none) and buffers it; at the end of the frame the buffered
 * triangles are painted back to front, opaque geometry first and the
 * translucent dome last.
 */

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use nannou::prelude::{pt2, rgb, rgba, App, Draw, Frame};

use crate::app::Model;
use crate::frame::{submit, DrawParams, FrameUniforms, RenderBackend};
use crate::mesh::MeshLibrary;
use crate::ui;

const LIGHT_DIRECTION: Vec3 = Vec3::new(0.3, 0.8, 0.5);
const AMBIENT: f32 = 0.45;
// Clip-space w below this is at or behind the eye
const MIN_CLIP_W: f32 = 1e-4;

/// A projected triangle waiting to be painted.
#[derive(Debug, Clone, PartialEq)]
struct ScreenTriangle {
    points: [Vec2; 3],
    depth: f32,
    color: [f32; 4],
}

pub struct NannouBackend<'a> {
    draw: &'a Draw,
    meshes: &'a MeshLibrary,
    half_size: Vec2,
    view_projection: Mat4,
    blending: bool,
    opaque: Vec<ScreenTriangle>,
    translucent: Vec<ScreenTriangle>,
}

impl<'a> NannouBackend<'a> {
    pub fn new(draw: &'a Draw, meshes: &'a MeshLibrary, width: f32, height: f32) -> Self {
        Self {
            draw,
            meshes,
            half_size: Vec2::new(width, height) * 0.5,
            view_projection: Mat4::IDENTITY,
            blending: false,
            opaque: Vec::new(),
            translucent: Vec::new(),
        }
    }

    fn paint(&self, triangles: &mut [ScreenTriangle]) {
        triangles.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        for tri in triangles.iter() {
            let [a, b, c] = tri.points;
            let [r, g, bl, alpha] = tri.color;
            self.draw
                .tri()
                .points(pt2(a.x, a.y), pt2(b.x, b.y), pt2(c.x, c.y))
                .color(rgba(r, g, bl, alpha));
        }
    }
}

impl RenderBackend for NannouBackend<'_> {
    fn begin_frame(&mut self, uniforms: &FrameUniforms) {
        let bg = uniforms.background;
        self.draw.background().color(rgb(bg.x, bg.y, bg.z));
        self.view_projection = uniforms.projection * uniforms.view;
        self.opaque.clear();
        self.translucent.clear();
    }

    fn set_alpha_blending(&mut self, enabled: bool) {
        self.blending = enabled;
    }

    fn draw(&mut self, params: &DrawParams) {
        let meshes = self.meshes;
        let Some(mesh) = meshes.get(params.mesh.handle) else {
            log::debug!("skipping drawable with unknown mesh {:?}", params.mesh.handle);
            return;
        };

        let mvp = self.view_projection * params.model;
        let half_size = self.half_size;
        let alpha = if self.blending { params.alpha } else { 1.0 };
        let target = if self.blending {
            &mut self.translucent
        } else {
            &mut self.opaque
        };

        for triangle in mesh.triangle_indices() {
            let corners = triangle.map(|i| mesh.positions[i]);
            let Some((points, depth)) = project_triangle(mvp, &corners, half_size) else {
                continue;
            };
            let color = params.color * shade(params.model, &corners, mesh.corner_normals(triangle));
            target.push(ScreenTriangle {
                points,
                depth,
                color: [color.x, color.y, color.z, alpha],
            });
        }
    }

    fn end_frame(&mut self) {
        let mut opaque = std::mem::take(&mut self.opaque);
        let mut translucent = std::mem::take(&mut self.translucent);
        self.paint(&mut opaque);
        self.paint(&mut translucent);
    }
}

/// Window-space corners (origin at the centre, y up) and mean NDC depth,
/// or None if any corner is behind the eye or the triangle is off screen.
fn project_triangle(mvp: Mat4, corners: &[Vec3; 3], half_size: Vec2) -> Option<([Vec2; 3], f32)> {
    let mut points = [Vec2::ZERO; 3];
    let mut depth = 0.0;
    let mut outside = [true; 4];

    for (point, corner) in points.iter_mut().zip(corners) {
        let clip = mvp * corner.extend(1.0);
        if clip.w < MIN_CLIP_W {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        if ndc.z > 1.0 {
            return None;
        }
        outside[0] &= ndc.x < -1.0;
        outside[1] &= ndc.x > 1.0;
        outside[2] &= ndc.y < -1.0;
        outside[3] &= ndc.y > 1.0;

        *point = Vec2::new(ndc.x, ndc.y) * half_size;
        depth += ndc.z / 3.0;
    }

    if outside.iter().any(|&o| o) {
        return None;
    }
    Some((points, depth))
}

// Two-sided lambert term of the averaged corner normal, falling back to the
// face normal when the corners carry none or they cancel out
fn shade(model: Mat4, corners: &[Vec3; 3], normals: Option<[Vec3; 3]>) -> f32 {
    let smooth = normals
        .map(|n| n.iter().map(|&v| model.transform_vector3(v)).sum::<Vec3>().normalize_or_zero())
        .unwrap_or(Vec3::ZERO);
    let normal = if smooth == Vec3::ZERO {
        let [a, b, c] = corners.map(|p| model.transform_point3(p));
        (b - a).cross(c - a).normalize_or_zero()
    } else {
        smooth
    };
    AMBIENT + (1.0 - AMBIENT) * normal.dot(LIGHT_DIRECTION.normalize()).abs()
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let window_rect = app.window_rect();

    if let Some(rendered) = &model.last_frame {
        let mut backend = NannouBackend::new(&draw, &model.meshes, window_rect.w(), window_rect.h());
        submit(rendered, &mut backend);
    }

    if model.config.show_debug {
        ui::draw_debug_info(&draw, &model.debug_info, window_rect);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        log::error!("failed to draw frame: {:?}", err);
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        log::error!("failed to draw ui: {:?}", err);
    }
}
