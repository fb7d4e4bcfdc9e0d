/*
 * Physics Module
 *
 * Turns a summed steering force into motion: clamp the force, add it to
 * the velocity, clamp the speed, then take one Euler step (one tick).
 * Also applies the wrap boundary policy and records trail points.
 */

use nannou::prelude::*;

use crate::agent::Agent;
use crate::vector;

// Clamp force, integrate velocity and position for one tick
pub fn integrate(agent: &mut Agent, force: Vec2, max_force: f32, max_speed: f32) {
    let force = vector::clamp_magnitude(sanitize(force), max_force);
    agent.velocity = vector::clamp_magnitude(agent.velocity + force, max_speed);
    agent.position += agent.velocity;
    agent.update_heading();
}

// Replace non-finite components so a bad parameter cannot poison the state
#[inline]
fn sanitize(v: Vec2) -> Vec2 {
    if v.x.is_finite() && v.y.is_finite() {
        v
    } else {
        Vec2::ZERO
    }
}

// Teleport to the opposite edge of a centered world
pub fn wrap_edges(position: &mut Vec2, half_width: f32, half_height: f32) -> bool {
    let mut wrapped = false;

    if position.x > half_width {
        position.x = -half_width;
        wrapped = true;
    } else if position.x < -half_width {
        position.x = half_width;
        wrapped = true;
    }

    if position.y > half_height {
        position.y = -half_height;
        wrapped = true;
    } else if position.y < -half_height {
        position.y = half_height;
        wrapped = true;
    }

    wrapped
}

// Record the new position; a wrap starts a fresh trail so no line spans the world
pub fn record_trail(agent: &mut Agent, wrapped: bool, tick: u64) {
    if wrapped {
        agent.trail.clear();
    }
    agent.trail.push(agent.position, tick);
}
