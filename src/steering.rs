/*
 * Steering Behaviors Module
 *
 * Each behavior returns a force contribution, never a velocity. The caller
 * weights and sums the contributions, clamps the sum to max_force and only
 * then integrates (see physics.rs).
 *
 * Behaviors:
 * 1. Separation: push away from close neighbors, 1/d^2 weighted
 * 2. Alignment: match the average neighbor velocity
 * 3. Cohesion: seek the neighbor centroid
 * 4. Seek / Flee: toward or away from a point, flee scaled by proximity,
 *    fear and alarm
 * 5. Pheromone follow: pick the strongest of several sensor headings
 * 6. Boundary and obstacle avoidance: inward force proportional to depth
 * 7. Hunting: seek the nearest prey, capture on contact
 *
 * Every behavior contributes zero force for an empty neighbor set.
 */

use nannou::prelude::*;
use rand::Rng;

use crate::agent::AgentKind;
use crate::field::{Channel, FieldGrid};
use crate::resources::Obstacle;
use crate::vector;

// Another agent as seen from the tick-start snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    pub kind: AgentKind,
    pub distance: f32,
}

// Speed and force limits of the steering agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub max_speed: f32,
    pub max_force: f32,
}

pub fn separation(position: Vec2, velocity: Vec2, neighbors: &[Neighbor], radius: f32, limits: Limits) -> Vec2 {
    let mut push = Vec2::ZERO;
    let mut count = 0;

    for other in neighbors {
        let d = other.distance;
        // Coincident agents give no direction to push along
        if d > 0.0 && d < radius {
            push += (position - other.position) / (d * d);
            count += 1;
        }
    }

    if count == 0 {
        return Vec2::ZERO;
    }
    push /= count as f32;
    vector::steer_towards(push, velocity, limits.max_speed, limits.max_force)
}

pub fn alignment(velocity: Vec2, neighbors: &[Neighbor], limits: Limits) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }
    let sum = neighbors.iter().fold(Vec2::ZERO, |acc, n| acc + n.velocity);
    let average = sum / neighbors.len() as f32;
    vector::steer_towards(average, velocity, limits.max_speed, limits.max_force)
}

pub fn cohesion(position: Vec2, velocity: Vec2, neighbors: &[Neighbor], limits: Limits) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }
    let sum = neighbors.iter().fold(Vec2::ZERO, |acc, n| acc + n.position);
    let centroid = sum / neighbors.len() as f32;
    seek(position, velocity, centroid, limits)
}

pub fn seek(position: Vec2, velocity: Vec2, target: Vec2, limits: Limits) -> Vec2 {
    vector::steer_towards(target - position, velocity, limits.max_speed, limits.max_force)
}

// How strongly an agent reacts to a threat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fear {
    pub multiplier: f32,
    pub alarm_level: f32,
    pub alarm_boost: f32,
}

impl Fear {
    pub fn gain(&self) -> f32 {
        self.multiplier * (1.0 + self.alarm_level * self.alarm_boost)
    }
}

// Steer away from `threat`; full strength at contact, zero at `radius`
pub fn flee(position: Vec2, velocity: Vec2, threat: Vec2, radius: f32, fear: Fear, limits: Limits) -> Vec2 {
    let d = position.distance(threat);
    if radius <= 0.0 || d >= radius {
        return Vec2::ZERO;
    }
    let proximity = 1.0 - d / radius;
    let away = vector::steer_towards(position - threat, velocity, limits.max_speed, limits.max_force);
    away * proximity * fear.gain()
}

// Pheromone sensor layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensors {
    pub count: usize,
    // Half-width of the sweep either side of the heading, radians
    pub spread: f32,
    pub distance: f32,
    pub saturation: f32,
    pub sensitivity: f32,
}

impl Sensors {
    // Candidate headings spread evenly over [heading - spread, heading + spread]
    pub fn headings(&self, heading: f32) -> impl Iterator<Item = f32> + '_ {
        let count = self.count;
        let step = if count > 1 { 2.0 * self.spread / (count - 1) as f32 } else { 0.0 };
        let start = if count > 1 { heading - self.spread } else { heading };
        (0..count).map(move |i| start + step * i as f32)
    }
}

// Direction of the strongest sensed value, or None when nothing clears the threshold
pub fn pheromone_follow(field: &FieldGrid, position: Vec2, heading: f32, channel: Channel, sensors: &Sensors) -> Option<Vec2> {
    let mut best: Option<(f32, f32)> = None;
    for candidate in sensors.headings(heading) {
        let probe = position + vector::from_angle(candidate) * sensors.distance;
        let value = field.sample_saturated(probe, channel, sensors.saturation);
        if best.map_or(true, |(v, _)| value > v) {
            best = Some((value, candidate));
        }
    }

    match best {
        Some((value, angle)) if value >= sensors.sensitivity && value > 0.0 => Some(vector::from_angle(angle)),
        _ => None,
    }
}

// Random-walk heading perturbation within +/- jitter radians
pub fn wander<R: Rng + ?Sized>(heading: f32, jitter: f32, rng: &mut R) -> f32 {
    let jitter = jitter.abs();
    if jitter == 0.0 || !jitter.is_finite() {
        return heading;
    }
    heading + rng.gen_range(-jitter..=jitter)
}

// Inward push when inside `margin` of the edge of a centered world
pub fn boundary_avoidance(position: Vec2, half_width: f32, half_height: f32, margin: f32, weight: f32) -> Vec2 {
    if margin <= 0.0 {
        return Vec2::ZERO;
    }
    let mut force = Vec2::ZERO;

    let left = -half_width + margin;
    let right = half_width - margin;
    let bottom = -half_height + margin;
    let top = half_height - margin;

    if position.x < left {
        force.x += (left - position.x) / margin;
    } else if position.x > right {
        force.x -= (position.x - right) / margin;
    }
    if position.y < bottom {
        force.y += (bottom - position.y) / margin;
    } else if position.y > top {
        force.y -= (position.y - top) / margin;
    }

    force * weight
}

// Same depth-proportional push, around circular obstacles
pub fn obstacle_avoidance(position: Vec2, obstacles: &[Obstacle], margin: f32, weight: f32) -> Vec2 {
    if margin <= 0.0 {
        return Vec2::ZERO;
    }
    let mut force = Vec2::ZERO;
    for obstacle in obstacles {
        let offset = position - obstacle.position;
        let reach = obstacle.radius + margin;
        let d = offset.length();
        if d < reach {
            force += vector::normalize(offset) * ((reach - d) / margin);
        }
    }
    force * weight
}

// Result of one hunting decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hunt {
    pub force: Vec2,
    // Snapshot index of prey close enough to be caught this tick
    pub capture: Option<usize>,
}

// Chase the closest prey among `candidates`; resting predators do nothing
pub fn hunt(position: Vec2, velocity: Vec2, candidates: &[Neighbor], cooldown: u32, capture_distance: f32, limits: Limits) -> Hunt {
    let idle = Hunt {
        force: Vec2::ZERO,
        capture: None,
    };
    if cooldown > 0 {
        return idle;
    }

    let target = candidates
        .iter()
        .filter(|n| n.kind.is_prey())
        .min_by(|a, b| a.distance.total_cmp(&b.distance));

    match target {
        Some(prey) => Hunt {
            force: seek(position, velocity, prey.position, limits),
            capture: (prey.distance < capture_distance).then_some(prey.index),
        },
        None => idle,
    }
}
