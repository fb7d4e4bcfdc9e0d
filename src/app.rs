/*
 * Application Module
 *
 * nannou surface around the simulation. Each display frame:
 * 1. Run the control panel and apply its edits as named parameters
 * 2. Advance the simulation by one tick (unless paused) and render it
 * 3. Cull the primitives against the camera view
 * The view callback only transforms the surviving primitives to screen
 * space and draws them.
 */

use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::{info, warn};

use crate::camera::Camera;
use crate::culling;
use crate::debug::DebugInfo;
use crate::input::{self, Tool};
use crate::params::SimulationConfig;
use crate::renderer::Primitive;
use crate::simulation::{InteractionKind, Simulation};
use crate::ui::{self, PanelState};

// Screen-space slack so shapes on the window edge are not culled
const CULL_MARGIN: f32 = 24.0;

pub struct Model {
    pub simulation: Simulation,
    pub egui: Egui,
    pub camera: Camera,
    pub debug_info: DebugInfo,
    pub mouse_position: Vec2,
    pub tool: Tool,
    pub primitives: Vec<Primitive>,
    pub visible: Vec<usize>,
}

// Config from the first command line argument, defaults otherwise
pub fn load_config(path: Option<String>) -> SimulationConfig {
    let Some(path) = path else {
        return SimulationConfig::default();
    };
    match SimulationConfig::load(&path) {
        Ok(config) => {
            info!(%path, "loaded config");
            config
        }
        Err(err) => {
            warn!(%err, "using default config");
            SimulationConfig::default()
        }
    }
}

pub fn model(app: &App) -> Model {
    let config = load_config(std::env::args().nth(1));
    let seed: u64 = rand::random();
    info!(seed, variant = config.variant.label(), "starting");

    let window_id = app
        .new_window()
        .title("Swarm Simulation")
        .size(config.world_width.max(1.0) as u32, config.world_height.max(1.0) as u32)
        .view(view)
        .key_pressed(input::key_pressed)
        .mouse_moved(input::mouse_moved)
        .mouse_pressed(input::mouse_pressed)
        .mouse_released(input::mouse_released)
        .mouse_wheel(input::mouse_wheel)
        .resized(resized)
        .raw_event(input::raw_window_event)
        .build()
        .expect("failed to build window");

    let window = app.window(window_id).expect("window closed during startup");
    let egui = Egui::from_window(&window);

    Model {
        simulation: Simulation::new(config, seed),
        egui,
        camera: Camera::new(),
        debug_info: DebugInfo::default(),
        mouse_position: Vec2::ZERO,
        tool: Tool::Food,
        primitives: Vec::new(),
        visible: Vec::new(),
    }
}

pub fn update(app: &App, model: &mut Model, update: Update) {
    let mut edited = model.simulation.config().clone();
    let actions = {
        let panel = PanelState {
            statistics: model.simulation.statistics(),
            debug_info: &model.debug_info,
            paused: model.simulation.is_paused(),
            tool: model.tool,
            zoom: model.camera.zoom,
        };
        ui::update_ui(&mut model.egui, &mut edited, &panel)
    };

    // Rejected values are logged by the simulation
    for (name, value) in model.simulation.config().changes(&edited) {
        model.simulation.set_parameter(name, value).ok();
    }
    if let Some(variant) = actions.variant {
        model.simulation.set_variant(variant);
    }
    if let Some(policy) = actions.boundary {
        model.simulation.set_boundary_policy(policy);
    }
    if let Some(tool) = actions.tool {
        model.tool = tool;
    }
    if actions.toggle_pause {
        model.simulation.toggle_pause();
    }
    if actions.reset {
        model.simulation.reset();
    }
    if actions.clear_obstacles {
        model.simulation.on_interaction(InteractionKind::ClearObstacles, Vec2::ZERO);
    }
    if actions.reset_camera {
        model.camera.reset();
    }

    model.primitives = model.simulation.frame();

    let view = culling::expand(model.camera.visible_rect(app.window_rect()), CULL_MARGIN / model.camera.zoom);
    model.visible = culling::visible_primitives(&model.primitives, view);

    model
        .debug_info
        .record_frame(app.fps(), update.since_last, model.primitives.len(), model.visible.len());
}

// The world follows the window size
fn resized(_app: &App, model: &mut Model, size: Vec2) {
    model.simulation.resize(size.x, size.y);
}

pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let window_rect = app.window_rect();
    let camera = &model.camera;
    let to_screen = |p: Vec2| camera.world_to_screen(p, window_rect);

    for &i in &model.visible {
        match &model.primitives[i] {
            Primitive::Triangle { vertices, colors } => {
                draw.polygon()
                    .points_colored(vertices.iter().zip(colors.iter()).map(|(v, c)| (to_screen(*v), *c)));
            }
            Primitive::Line { start, end, colors } => {
                draw.polyline()
                    .weight(1.0)
                    .points_colored([(to_screen(*start), colors[0]), (to_screen(*end), colors[1])]);
            }
        }
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        warn!(?err, "failed to draw frame");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        warn!(?err, "failed to draw control panel");
    }
}
