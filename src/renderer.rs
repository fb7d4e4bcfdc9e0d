/*
 * Renderer Module
 *
 * Turns a borrowed snapshot of the simulation into a flat list of colored
 * primitives in world coordinates. Nothing here mutates simulation state;
 * the surface (app.rs) only transforms and draws what comes out.
 *
 * Draw order, back to front:
 * - Pheromone field quads (dominant channel hue, alpha by strength)
 * - World border
 * - Obstacles, nest, food sources and pellets
 * - Fading trails
 * - Agents as heading-oriented triangles
 * - Perception ring of the first agent
 */

use nannou::prelude::*;

use crate::agent::{Agent, AntState, FishSize, Role};
use crate::debug::FIELD_VISIBLE_THRESHOLD;
use crate::field::{Channel, FieldGrid};
use crate::params::SimulationConfig;
use crate::resources::{FoodKind, Resources};
use crate::vector;

const FAN_SEGMENTS: usize = 16;
const RING_SEGMENTS: usize = 48;
const PELLET_SIZE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Triangle { vertices: [Vec2; 3], colors: [Rgba; 3] },
    Line { start: Vec2, end: Vec2, colors: [Rgba; 2] },
}

impl Primitive {
    pub fn triangle(a: Vec2, b: Vec2, c: Vec2, color: Rgba) -> Self {
        Primitive::Triangle {
            vertices: [a, b, c],
            colors: [color; 3],
        }
    }

    pub fn line(start: Vec2, end: Vec2, color: Rgba) -> Self {
        Primitive::Line {
            start,
            end,
            colors: [color; 2],
        }
    }

    // Axis-aligned (min, max) corners
    pub fn bounds(&self) -> (Vec2, Vec2) {
        match self {
            Primitive::Triangle { vertices, .. } => {
                let min = vertices[0].min(vertices[1]).min(vertices[2]);
                let max = vertices[0].max(vertices[1]).max(vertices[2]);
                (min, max)
            }
            Primitive::Line { start, end, .. } => (start.min(*end), start.max(*end)),
        }
    }
}

// Trail segments per agent reserved up front in the output buffer
const MAX_TRAIL_HINT: usize = 64;

// Everything the renderer reads for one frame
pub struct RenderSnapshot<'a> {
    pub config: &'a SimulationConfig,
    pub agents: &'a [Agent],
    pub field: &'a FieldGrid,
    pub resources: &'a Resources,
    pub tick: u64,
}

pub fn render(snapshot: &RenderSnapshot) -> Vec<Primitive> {
    let per_agent = snapshot.config.trail_capacity.min(MAX_TRAIL_HINT) + 1;
    let mut out = Vec::with_capacity(snapshot.agents.len().saturating_mul(per_agent).saturating_add(64));

    if snapshot.config.show_field {
        push_field(&mut out, snapshot.field, snapshot.config.pheromone_saturation);
    }
    push_border(&mut out, snapshot.config);
    push_resources(&mut out, snapshot.resources);
    if snapshot.config.show_trails {
        push_trails(&mut out, snapshot);
    }
    for agent in snapshot.agents {
        push_agent(&mut out, agent);
    }
    if snapshot.config.show_perception {
        if let Some(first) = snapshot.agents.first() {
            push_ring(
                &mut out,
                first.position,
                snapshot.config.perception_radius,
                rgba(1.0, 1.0, 0.0, 0.5),
            );
        }
    }

    out
}

fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    rgba(color.red, color.green, color.blue, alpha.clamp(0.0, 1.0))
}

fn scaled(color: Rgba, factor: f32) -> Rgba {
    rgba(
        (color.red * factor).clamp(0.0, 1.0),
        (color.green * factor).clamp(0.0, 1.0),
        (color.blue * factor).clamp(0.0, 1.0),
        color.alpha,
    )
}

fn mix(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    rgba(
        a.red + (b.red - a.red) * t,
        a.green + (b.green - a.green) * t,
        a.blue + (b.blue - a.blue) * t,
        a.alpha + (b.alpha - a.alpha) * t,
    )
}

fn channel_color(channel: Channel) -> Rgba {
    match channel {
        Channel::ToFood => rgba(0.2, 0.85, 0.3, 1.0),
        Channel::ToNest => rgba(0.3, 0.5, 1.0, 1.0),
    }
}

fn push_quad(out: &mut Vec<Primitive>, min: Vec2, max: Vec2, color: Rgba) {
    let a = min;
    let b = Vec2::new(max.x, min.y);
    let c = max;
    let d = Vec2::new(min.x, max.y);
    out.push(Primitive::triangle(a, b, c, color));
    out.push(Primitive::triangle(a, c, d, color));
}

// Filled circle as a triangle fan
fn push_fan(out: &mut Vec<Primitive>, center: Vec2, radius: f32, color: Rgba) {
    let step = std::f32::consts::TAU / FAN_SEGMENTS as f32;
    for i in 0..FAN_SEGMENTS {
        let a = center + vector::from_angle(step * i as f32) * radius;
        let b = center + vector::from_angle(step * (i + 1) as f32) * radius;
        out.push(Primitive::triangle(center, a, b, color));
    }
}

fn push_ring(out: &mut Vec<Primitive>, center: Vec2, radius: f32, color: Rgba) {
    let step = std::f32::consts::TAU / RING_SEGMENTS as f32;
    for i in 0..RING_SEGMENTS {
        let a = center + vector::from_angle(step * i as f32) * radius;
        let b = center + vector::from_angle(step * (i + 1) as f32) * radius;
        out.push(Primitive::line(a, b, color));
    }
}

fn push_field(out: &mut Vec<Primitive>, field: &FieldGrid, saturation: f32) {
    let saturation = saturation.max(f32::EPSILON);
    let size = Vec2::splat(field.cell_size());

    for (col, row, cell) in field.cells() {
        let food = FieldGrid::value(cell, Channel::ToFood);
        let nest = FieldGrid::value(cell, Channel::ToNest);
        let (channel, value) = if food >= nest {
            (Channel::ToFood, food)
        } else {
            (Channel::ToNest, nest)
        };
        if value <= FIELD_VISIBLE_THRESHOLD {
            continue;
        }
        let alpha = value.min(saturation) / saturation * 0.6;
        let min = field.cell_origin(col, row);
        push_quad(out, min, min + size, with_alpha(channel_color(channel), alpha));
    }
}

fn push_border(out: &mut Vec<Primitive>, config: &SimulationConfig) {
    let hw = config.world_width / 2.0;
    let hh = config.world_height / 2.0;
    let color = rgba(0.3, 0.3, 0.3, 1.0);
    let corners = [
        Vec2::new(-hw, -hh),
        Vec2::new(hw, -hh),
        Vec2::new(hw, hh),
        Vec2::new(-hw, hh),
    ];
    for i in 0..corners.len() {
        out.push(Primitive::line(corners[i], corners[(i + 1) % corners.len()], color));
    }
}

fn push_resources(out: &mut Vec<Primitive>, resources: &Resources) {
    for obstacle in &resources.obstacles {
        push_fan(out, obstacle.position, obstacle.radius, rgba(0.45, 0.45, 0.5, 1.0));
    }

    if let Some(nest) = &resources.nest {
        push_fan(out, nest.position, nest.radius, rgba(0.55, 0.35, 0.2, 0.9));
    }

    for food in &resources.food {
        match food.kind {
            FoodKind::Source => {
                let radius = 4.0 + 10.0 * food.fill_ratio();
                push_fan(out, food.position, radius, rgba(0.3, 0.9, 0.2, 1.0));
            }
            FoodKind::Pellet { age, lifetime } => {
                let fade = if lifetime == 0 { 0.0 } else { 1.0 - age as f32 / lifetime as f32 };
                let half = Vec2::splat(PELLET_SIZE);
                push_quad(
                    out,
                    food.position - half,
                    food.position + half,
                    rgba(0.85, 0.7, 0.4, 0.4 + 0.6 * fade),
                );
            }
        }
    }
}

// Color of an agent from its kind and transient state
pub fn agent_color(agent: &Agent) -> Rgba {
    match &agent.role {
        Role::Boid => rgba(220.0 / 255.0, 220.0 / 255.0, 220.0 / 255.0, 1.0),
        Role::Ant { state, .. } => match state {
            AntState::Exploring => rgba(0.8, 0.5, 0.3, 1.0),
            AntState::Returning => rgba(0.3, 0.9, 0.3, 1.0),
        },
        Role::Fish { size, depth } => {
            // School color by size class, darker deeper down, reddened by fear
            let base = match size {
                FishSize::Small => rgba(1.0, 0.85, 0.3, 1.0),
                FishSize::Medium => rgba(1.0, 0.55, 0.2, 1.0),
                FishSize::Large => rgba(0.4, 0.7, 1.0, 1.0),
            };
            let shaded = scaled(base, 1.0 - 0.4 * depth.clamp(0.0, 1.0));
            mix(shaded, rgba(1.0, 0.3, 0.3, 1.0), agent.alarm.level * 0.6)
        }
        Role::Predator { cooldown, .. } => {
            if *cooldown > 0 {
                rgba(0.55, 0.1, 0.1, 1.0)
            } else {
                rgba(0.9, 0.15, 0.15, 1.0)
            }
        }
    }
}

fn push_agent(out: &mut Vec<Primitive>, agent: &Agent) {
    let color = agent_color(agent);
    let tail = scaled(color, 0.7);
    let size = agent.size;

    let tip = agent.position + vector::rotate(Vec2::new(size, 0.0), agent.heading);
    let left = agent.position + vector::rotate(Vec2::new(-size, size / 2.0), agent.heading);
    let right = agent.position + vector::rotate(Vec2::new(-size, -size / 2.0), agent.heading);

    out.push(Primitive::Triangle {
        vertices: [tip, left, right],
        colors: [color, tail, tail],
    });
}

fn push_trails(out: &mut Vec<Primitive>, snapshot: &RenderSnapshot) {
    let fade = snapshot.config.trail_fade_ticks();
    let alpha_at = |tick: u64| 1.0 - snapshot.tick.saturating_sub(tick) as f32 / fade;

    for agent in snapshot.agents {
        let color = agent_color(agent);
        let mut points = agent.trail.iter();
        let Some(mut previous) = points.next() else {
            continue;
        };
        for point in points {
            let (a0, a1) = (alpha_at(previous.tick), alpha_at(point.tick));
            if a0 > 0.0 || a1 > 0.0 {
                out.push(Primitive::Line {
                    start: previous.position,
                    end: point.position,
                    colors: [with_alpha(color, a0 * 0.5), with_alpha(color, a1 * 0.5)],
                });
            }
            previous = point;
        }
    }
}
