/*
 * UI Module
 *
 * egui control panel. The panel edits a copy of the configuration; the
 * caller diffs the copy against the live configuration and applies each
 * change through Simulation::set_parameter. Buttons that are not plain
 * parameters come back as UiActions.
 */

use nannou_egui::{egui, Egui};

use crate::debug::{DebugInfo, Statistics};
use crate::input::Tool;
use crate::params::{BoundaryPolicy, SimulationConfig, Variant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UiActions {
    pub reset: bool,
    pub toggle_pause: bool,
    pub clear_obstacles: bool,
    pub reset_camera: bool,
    pub variant: Option<Variant>,
    pub boundary: Option<BoundaryPolicy>,
    pub tool: Option<Tool>,
}

// Everything the panel displays but does not edit
pub struct PanelState<'a> {
    pub statistics: &'a Statistics,
    pub debug_info: &'a DebugInfo,
    pub paused: bool,
    pub tool: Tool,
    pub zoom: f32,
}

pub fn update_ui(egui: &mut Egui, edited: &mut SimulationConfig, panel: &PanelState) -> UiActions {
    let mut actions = UiActions::default();
    let mut variant = edited.variant;
    let mut boundary = edited.boundary_policy();
    let mut tool = panel.tool;

    let ctx = egui.begin_frame();

    egui::Window::new("Simulation Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.horizontal(|ui| {
                for v in Variant::ALL {
                    ui.radio_value(&mut variant, v, v.label());
                }
            });
            ui.horizontal(|ui| {
                let label = if panel.paused { "Resume" } else { "Pause" };
                if ui.button(label).clicked() {
                    actions.toggle_pause = true;
                }
                if ui.button("Reset").clicked() {
                    actions.reset = true;
                }
            });
            ui.horizontal(|ui| {
                ui.label("Click:");
                for t in Tool::ALL {
                    ui.radio_value(&mut tool, t, t.label());
                }
                if ui.button("Clear Obstacles").clicked() {
                    actions.clear_obstacles = true;
                }
            });

            match variant {
                Variant::Boids => boid_controls(ui, edited),
                Variant::AntColony => ant_controls(ui, edited),
                Variant::Aquarium => aquarium_controls(ui, edited),
            }

            ui.collapsing("World", |ui| {
                ui.horizontal(|ui| {
                    ui.radio_value(&mut boundary, BoundaryPolicy::Wrap, "Wrap");
                    ui.radio_value(&mut boundary, BoundaryPolicy::Repel, "Repel");
                });
                ui.add(egui::Slider::new(&mut edited.max_force, SimulationConfig::get_force_range()).text("Max Force"));
                ui.add(egui::Slider::new(&mut edited.boundary_margin, SimulationConfig::get_radius_range()).text("Boundary Margin"));
                ui.add(egui::Slider::new(&mut edited.boundary_weight, SimulationConfig::get_weight_range()).text("Boundary Weight"));
                ui.add(egui::Slider::new(&mut edited.obstacle_weight, SimulationConfig::get_weight_range()).text("Obstacle Weight"));
                ui.add(egui::Slider::new(&mut edited.scare_radius, SimulationConfig::get_radius_range()).text("Scare Radius"));
            });

            ui.collapsing("Display", |ui| {
                ui.checkbox(&mut edited.show_trails, "Show Trails");
                ui.checkbox(&mut edited.show_field, "Show Pheromones");
                ui.checkbox(&mut edited.show_perception, "Show Perception");
                ui.add(egui::Slider::new(&mut edited.trail_capacity, 0..=100).text("Trail Length"));
                ui.add(egui::Slider::new(&mut edited.trail_fade_secs, 0.1..=10.0).text("Trail Fade (s)"));
                ui.label(format!("Zoom Level: {:.2}x", panel.zoom));
                if ui.button("Reset Camera").clicked() {
                    actions.reset_camera = true;
                }
            });

            ui.collapsing("Statistics", |ui| {
                statistics(ui, panel.statistics);
                ui.separator();
                ui.label(format!("FPS: {:.1}", panel.debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", panel.debug_info.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!(
                    "Primitives: {} ({} visible, {:.0}% culled)",
                    panel.debug_info.primitives,
                    panel.debug_info.visible_primitives,
                    panel.debug_info.culling_efficiency()
                ));
            });
        });

    if variant != edited.variant {
        actions.variant = Some(variant);
    }
    if boundary != edited.boundary_policy() {
        actions.boundary = Some(boundary);
    }
    if tool != panel.tool {
        actions.tool = Some(tool);
    }
    actions
}

fn flocking_sliders(ui: &mut egui::Ui, edited: &mut SimulationConfig) {
    ui.add(egui::Slider::new(&mut edited.separation_weight, SimulationConfig::get_weight_range()).text("Separation Weight"));
    ui.add(egui::Slider::new(&mut edited.alignment_weight, SimulationConfig::get_weight_range()).text("Alignment Weight"));
    ui.add(egui::Slider::new(&mut edited.cohesion_weight, SimulationConfig::get_weight_range()).text("Cohesion Weight"));
    ui.add(egui::Slider::new(&mut edited.separation_radius, SimulationConfig::get_radius_range()).text("Separation Radius"));
    ui.add(egui::Slider::new(&mut edited.perception_radius, SimulationConfig::get_radius_range()).text("Perception Radius"));
}

fn boid_controls(ui: &mut egui::Ui, edited: &mut SimulationConfig) {
    ui.collapsing("Boid Parameters", |ui| {
        ui.add(egui::Slider::new(&mut edited.boid_count, SimulationConfig::get_count_range()).text("Number of Boids"));
        ui.add(egui::Slider::new(&mut edited.boid_max_speed, SimulationConfig::get_max_speed_range()).text("Max Speed"));
    });
    ui.collapsing("Flocking Behavior", |ui| flocking_sliders(ui, edited));
}

fn ant_controls(ui: &mut egui::Ui, edited: &mut SimulationConfig) {
    ui.collapsing("Colony", |ui| {
        ui.add(egui::Slider::new(&mut edited.ant_count, SimulationConfig::get_count_range()).text("Number of Ants"));
        ui.add(egui::Slider::new(&mut edited.ant_max_speed, SimulationConfig::get_max_speed_range()).text("Max Speed"));
        ui.add(egui::Slider::new(&mut edited.food_source_size, 1..=1000).text("Food per Source"));
        ui.add(egui::Slider::new(&mut edited.explore_probability, SimulationConfig::get_probability_range()).text("Explore Probability"));
        ui.add(egui::Slider::new(&mut edited.wander_jitter_deg, 0.0..=90.0).text("Wander Jitter (deg)"));
    });
    ui.collapsing("Pheromones", |ui| {
        ui.add(egui::Slider::new(&mut edited.decay_rate, SimulationConfig::get_rate_range()).text("Decay Rate"));
        ui.add(egui::Slider::new(&mut edited.deposit_amount, 0.0..=50.0).text("Deposit Amount"));
        ui.add(egui::Slider::new(&mut edited.pheromone_weight, SimulationConfig::get_weight_range()).text("Follow Weight"));
        ui.add(egui::Slider::new(&mut edited.pheromone_sensitivity, 0.0..=5.0).text("Sensitivity"));
        ui.add(egui::Slider::new(&mut edited.sensor_angle_deg, 5.0..=90.0).text("Sensor Angle (deg)"));
        ui.add(egui::Slider::new(&mut edited.sensor_distance, 5.0..=60.0).text("Sensor Distance"));
        ui.add(egui::Slider::new(&mut edited.sensor_count, 1..=9).text("Sensors"));
    });
}

fn aquarium_controls(ui: &mut egui::Ui, edited: &mut SimulationConfig) {
    ui.collapsing("Population", |ui| {
        ui.add(egui::Slider::new(&mut edited.small_fish_count, SimulationConfig::get_count_range()).text("Small Fish"));
        ui.add(egui::Slider::new(&mut edited.medium_fish_count, SimulationConfig::get_count_range()).text("Medium Fish"));
        ui.add(egui::Slider::new(&mut edited.large_fish_count, SimulationConfig::get_count_range()).text("Large Fish"));
        ui.add(egui::Slider::new(&mut edited.predator_count, 0..=20).text("Predators"));
        ui.add(egui::Slider::new(&mut edited.respawn_interval, 0..=600).text("Respawn Interval"));
        ui.add(egui::Slider::new(&mut edited.auto_feed_interval, 0..=600).text("Auto-feed Interval"));
    });
    ui.collapsing("Predators and Fear", |ui| {
        ui.add(egui::Slider::new(&mut edited.predator_speed, SimulationConfig::get_max_speed_range()).text("Predator Speed"));
        ui.add(egui::Slider::new(&mut edited.hunt_radius, SimulationConfig::get_radius_range()).text("Hunt Radius"));
        ui.add(egui::Slider::new(&mut edited.flee_radius, SimulationConfig::get_radius_range()).text("Flee Radius"));
        ui.add(egui::Slider::new(&mut edited.flee_weight, SimulationConfig::get_weight_range()).text("Flee Weight"));
        ui.add(egui::Slider::new(&mut edited.alarm_decay, 0.5..=1.0).text("Alarm Decay"));
        ui.add(egui::Slider::new(&mut edited.digestion_ticks, 0..=600).text("Digestion Ticks"));
    });
    ui.collapsing("Schooling", |ui| flocking_sliders(ui, edited));
}

fn statistics(ui: &mut egui::Ui, stats: &Statistics) {
    ui.label(format!("Tick: {}", stats.tick));
    ui.label(format!("Agents: {}", stats.total));
    if stats.boids > 0 {
        ui.label(format!("Boids: {}", stats.boids));
    }
    if stats.ants > 0 {
        ui.label(format!("Ants: {}", stats.ants));
        ui.label(format!("Food delivered: {}", stats.food_delivered));
        ui.label(format!("Food remaining: {}", stats.food_remaining));
        ui.label(format!("Active field cells: {}", stats.active_field_cells));
    }
    if stats.prey() > 0 || stats.predators > 0 {
        ui.label(format!(
            "Fish: {} / {} / {}",
            stats.small_fish, stats.medium_fish, stats.large_fish
        ));
        ui.label(format!("Predators: {}", stats.predators));
        ui.label(format!("Catches: {}", stats.catches));
        ui.label(format!("Pellets: {}", stats.pellets));
    }
    ui.label(format!("Active trails: {}", stats.active_trails));
    ui.label(format!("Mean speed: {:.2}", stats.mean_speed));
    ui.label(format!("Mean alarm: {:.2}", stats.mean_alarm));
    ui.label(format!("Health: {:.0}%", stats.health * 100.0));
}
