/*
 * Input Module
 *
 * Maps window events onto the simulation:
 * - Keys become Commands (pause, reset, variant, pointer tool, clear)
 * - Left click applies the selected Tool at the cursor's world position
 * - Right drag pans the camera, the wheel zooms it
 *
 * Events the egui panel consumes never reach the simulation.
 */

use nannou::prelude::*;
use nannou::winit::event::{MouseButton, MouseScrollDelta, TouchPhase};
use tracing::debug;

use crate::app::Model;
use crate::params::Variant;
use crate::simulation::{InteractionKind, Simulation};

// What a left click does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Food,
    Scare,
    Obstacle,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Food, Tool::Scare, Tool::Obstacle];

    pub fn interaction(self) -> InteractionKind {
        match self {
            Tool::Food => InteractionKind::PlaceFood,
            Tool::Scare => InteractionKind::Scare,
            Tool::Obstacle => InteractionKind::PlaceObstacle,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tool::Food => "Food",
            Tool::Scare => "Scare",
            Tool::Obstacle => "Obstacle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    Reset,
    SelectVariant(Variant),
    SelectTool(Tool),
    ClearObstacles,
}

pub fn command_for_key(key: Key) -> Option<Command> {
    let command = match key {
        Key::Space => Command::TogglePause,
        Key::R => Command::Reset,
        Key::Key1 => Command::SelectVariant(Variant::Boids),
        Key::Key2 => Command::SelectVariant(Variant::AntColony),
        Key::Key3 => Command::SelectVariant(Variant::Aquarium),
        Key::F => Command::SelectTool(Tool::Food),
        Key::S => Command::SelectTool(Tool::Scare),
        Key::O => Command::SelectTool(Tool::Obstacle),
        Key::C => Command::ClearObstacles,
        _ => return None,
    };
    Some(command)
}

// Execute a command against the simulation and the pointer tool
pub fn apply_command(simulation: &mut Simulation, tool: &mut Tool, command: Command) {
    debug!(?command, "command");
    match command {
        Command::TogglePause => simulation.toggle_pause(),
        Command::Reset => simulation.reset(),
        Command::SelectVariant(variant) => simulation.set_variant(variant),
        Command::SelectTool(selected) => *tool = selected,
        Command::ClearObstacles => simulation.on_interaction(InteractionKind::ClearObstacles, Vec2::ZERO),
    }
}

pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    if model.egui.ctx().wants_keyboard_input() {
        return;
    }
    if let Some(command) = command_for_key(key) {
        apply_command(&mut model.simulation, &mut model.tool, command);
    }
}

pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    if model.camera.is_panning() {
        model.camera.pan_to(pos);
    }
    model.mouse_position = pos;
}

pub fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }
    match button {
        MouseButton::Left => {
            let world = model.camera.screen_to_world(model.mouse_position, app.window_rect());
            model.simulation.on_interaction(model.tool.interaction(), world);
        }
        MouseButton::Right => model.camera.begin_pan(model.mouse_position),
        _ => {}
    }
}

pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Right {
        model.camera.end_pan();
    }
}

pub fn mouse_wheel(app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    let scroll = match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
    };
    model.camera.zoom_at(scroll, model.mouse_position, app.window_rect());
}

pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
