/*
 * UI Module
 *
 * This module contains functions for creating and updating the user interface
 * using nannou_egui. It provides controls for the flock, the environment and
 * the camera. Parameter change detection is handled by SimulationConfig.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::environment::DayNightCycle;
use crate::params::{BoundaryPolicy, ConfigChanges, SimulationConfig};

/// Buttons pressed this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiActions {
    pub restart: bool,
    pub reset_camera: bool,
}

// Update the UI and return the pressed buttons plus what changed in the config
pub fn update_ui(
    egui: &mut Egui,
    config: &mut SimulationConfig,
    day_night: &mut DayNightCycle,
    debug_info: &DebugInfo,
) -> (UiActions, ConfigChanges) {
    let mut actions = UiActions::default();

    // Take a snapshot of current parameter values for change detection
    config.take_snapshot();

    let ctx = egui.begin_frame();

    egui::Window::new("Firefly Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Flock", |ui| {
                ui.add(egui::Slider::new(&mut config.num_boids, SimulationConfig::num_boids_range()).text("Number of Boids"));

                if ui.button("Restart").clicked() {
                    actions.restart = true;
                }

                ui.add(egui::Slider::new(&mut config.boid_speed, SimulationConfig::boid_speed_range()).text("Speed"));
                ui.add(egui::Slider::new(&mut config.boid_size, SimulationConfig::boid_size_range()).text("Boid Size"));
                ui.add(egui::Slider::new(&mut config.mesh_vertex_budget, SimulationConfig::mesh_vertex_budget_range()).text("Mesh Detail (vertices)"));
            });

            ui.collapsing("Flocking Behavior", |ui| {
                ui.add(egui::Slider::new(&mut config.alignment_weight, SimulationConfig::weight_range()).text("Alignment Weight"));
                ui.add(egui::Slider::new(&mut config.cohesion_weight, SimulationConfig::weight_range()).text("Cohesion Weight"));
                ui.add(egui::Slider::new(&mut config.separation_distance, SimulationConfig::separation_distance_range()).text("Separation Distance"));
                ui.checkbox(&mut config.personal_weights, "Personal Weights");
            });

            ui.collapsing("Avoidance", |ui| {
                ui.add(egui::Slider::new(&mut config.avoidance_weight, SimulationConfig::weight_range()).text("Avoidance Weight"));
                ui.add(egui::Slider::new(&mut config.distance_min_to_camera, SimulationConfig::camera_distance_range()).text("Min Distance to Camera"));
                ui.checkbox(&mut config.camera_avoidance, "Avoid Camera");
            });

            ui.collapsing("Environment", |ui| {
                let mut day = day_night.day_mode;
                ui.checkbox(&mut day, "Day");
                day_night.set_day_mode(day);

                ui.checkbox(&mut config.auto_day_night, "Automatic Day/Night");
                ui.checkbox(&mut config.female_blush, "Female Blush");

                egui::ComboBox::from_label("Dome Boundary")
                    .selected_text(config.boundary_policy.to_string())
                    .show_ui(ui, |ui| {
                        for policy in BoundaryPolicy::ALL {
                            ui.selectable_value(&mut config.boundary_policy, policy, policy.to_string());
                        }
                    });

                ui.label(format!("Transition: {:.2}", day_night.transition));
            });

            ui.collapsing("Camera Controls", |ui| {
                ui.label("Up/Down: move forward/back");
                ui.label("Left/Right: strafe");
                ui.label("W/S: move up/down");
                ui.label("Q/E: turn");
                ui.label("N: toggle day/night, R: reset camera, Space: pause");
                if ui.button("Reset Camera").clicked() {
                    actions.reset_camera = true;
                }
            });

            ui.collapsing("Performance", |ui| {
                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!("Excited Boids: {}", debug_info.excited));
            });

            ui.checkbox(&mut config.show_debug, "Show Debug Info");
            ui.checkbox(&mut config.pause_simulation, "Pause Simulation");
        });

    (actions, config.detect_changes())
}

// Draw debug information on the screen
pub fn draw_debug_info(draw: &nannou::Draw, debug_info: &DebugInfo, window_rect: nannou::geom::Rect) {
    let lines = debug_info.lines();

    // Background panel in the top-right corner, clear of the controls window
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 240.0;
    let panel_height = line_height * lines.len() as f32 + margin;
    let panel_x = window_rect.right() - panel_width / 2.0;
    let panel_y = window_rect.top() - panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_x = window_rect.right() - panel_width + margin;
    let text_y = window_rect.top() - margin;

    for (i, text) in lines.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);

        draw.text(text)
            .x_y(text_x + 90.0, y)
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
