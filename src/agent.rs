/*
 * Agent Module
 *
 * An Agent is one steerable entity: a boid, an ant, a fish or a predator.
 * The kind tag plus its kind-specific state live in `Role`, so behavior code
 * dispatches with a plain `match` instead of probing optional fields.
 */

use std::collections::VecDeque;

use nannou::prelude::*;
use serde::{Deserialize, Serialize};

use crate::vector;

// Size class of a fish; drives speed, fear and which school it joins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FishSize {
    Small,
    Medium,
    Large,
}

impl FishSize {
    pub const ALL: [FishSize; 3] = [FishSize::Small, FishSize::Medium, FishSize::Large];
}

// Kind tag without state, used for counting and per-kind parameter lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Boid,
    Ant,
    Fish(FishSize),
    Predator,
}

impl AgentKind {
    pub fn is_prey(self) -> bool {
        matches!(self, AgentKind::Fish(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntState {
    Exploring,
    Returning,
}

// Kind tag together with the transient state only that kind carries
#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Boid,
    Ant {
        state: AntState,
        // Strength of the next deposit; refreshed at the nest and at food
        deposit_strength: f32,
    },
    Fish {
        size: FishSize,
        // 0 = surface, 1 = deepest; only used for shading
        depth: f32,
    },
    Predator {
        // Ticks of rest left after a catch
        cooldown: u32,
        catches: u32,
    },
}

impl Role {
    pub fn kind(&self) -> AgentKind {
        match self {
            Role::Boid => AgentKind::Boid,
            Role::Ant { .. } => AgentKind::Ant,
            Role::Fish { size, .. } => AgentKind::Fish(*size),
            Role::Predator { .. } => AgentKind::Predator,
        }
    }
}

// Heightened flight response after a scare; decays every tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Alarm {
    pub level: f32,
    pub source: Option<Vec2>,
}

impl Alarm {
    pub fn trigger(&mut self, source: Vec2) {
        self.level = 1.0;
        self.source = Some(source);
    }

    pub fn decay(&mut self, factor: f32) {
        self.level *= factor.clamp(0.0, 1.0);
        if self.level < 0.01 {
            self.level = 0.0;
            self.source = None;
        }
    }

    pub fn is_active(&self) -> bool {
        self.level > 0.0
    }
}

// One recorded trail position and the tick it was recorded on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: Vec2,
    pub tick: u64,
}

// Storage reserved up front; longer trails grow as points arrive
const TRAIL_PREALLOC: usize = 64;

// Bounded history of recent positions, oldest evicted first
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(TRAIL_PREALLOC)),
            capacity,
        }
    }

    pub fn push(&mut self, position: Vec2, tick: u64) {
        if self.capacity == 0 {
            return;
        }
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(TrailPoint { position, tick });
    }

    // Change the capacity, dropping the oldest points if it shrank
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.points.len() > capacity {
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: u64,
    pub role: Role,
    pub position: Vec2,
    pub velocity: Vec2,
    // Last non-degenerate direction of travel, radians
    pub heading: f32,
    // Body length in world units
    pub size: f32,
    pub alarm: Alarm,
    pub trail: Trail,
}

impl Agent {
    pub fn new(id: u64, role: Role, position: Vec2, velocity: Vec2, size: f32, trail_capacity: usize) -> Self {
        let heading = if velocity.length_squared() > 0.0 { vector::angle_of(velocity) } else { 0.0 };
        Self {
            id,
            role,
            position,
            velocity,
            heading,
            size,
            alarm: Alarm::default(),
            trail: Trail::new(trail_capacity),
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.role.kind()
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    // Keep the previous heading when the agent is at rest
    pub fn update_heading(&mut self) {
        if self.velocity.length_squared() > 1e-12 {
            self.heading = vector::angle_of(self.velocity);
        }
    }

    pub fn is_carrying(&self) -> bool {
        matches!(self.role, Role::Ant { state: AntState::Returning, .. })
    }

    pub fn cooldown(&self) -> u32 {
        match self.role {
            Role::Predator { cooldown, .. } => cooldown,
            _ => 0,
        }
    }
}
