/*
 * Debug Information Module
 *
 * Statistics: read-only aggregate snapshot of the simulation, recomputed
 * once per tick and handed to the control panel.
 *
 * DebugInfo: per-frame surface metrics (FPS, frame time, primitive counts
 * before and after culling).
 */

use std::time::Duration;

use crate::agent::{AgentKind, FishSize};
use crate::field::FieldGrid;
use crate::params::{SimulationConfig, Variant};
use crate::population::AgentPopulation;
use crate::resources::Resources;

// Field cells at or below this value are treated as empty
pub const FIELD_VISIBLE_THRESHOLD: f32 = 0.1;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub tick: u64,
    pub boids: usize,
    pub ants: usize,
    pub small_fish: usize,
    pub medium_fish: usize,
    pub large_fish: usize,
    pub predators: usize,
    pub total: usize,
    pub active_trails: usize,
    pub active_field_cells: usize,
    pub catches: u64,
    pub food_delivered: u64,
    pub food_remaining: u64,
    pub pellets: usize,
    pub mean_speed: f32,
    pub mean_alarm: f32,
    // Aquarium: prey vs. target, ants: share carrying food, boids: always 1
    pub health: f32,
}

impl Statistics {
    pub fn collect(
        tick: u64,
        catches: u64,
        config: &SimulationConfig,
        population: &AgentPopulation,
        field: &FieldGrid,
        resources: &Resources,
    ) -> Self {
        let mut stats = Self {
            tick,
            catches,
            food_delivered: resources.nest.map_or(0, |n| n.delivered),
            food_remaining: resources.food_remaining(),
            pellets: resources.pellet_count(),
            active_field_cells: field.active_cells(FIELD_VISIBLE_THRESHOLD),
            ..Self::default()
        };

        let mut speed_sum = 0.0;
        let mut alarm_sum = 0.0;
        let mut carrying = 0;

        for agent in population.agents() {
            match agent.kind() {
                AgentKind::Boid => stats.boids += 1,
                AgentKind::Ant => stats.ants += 1,
                AgentKind::Fish(FishSize::Small) => stats.small_fish += 1,
                AgentKind::Fish(FishSize::Medium) => stats.medium_fish += 1,
                AgentKind::Fish(FishSize::Large) => stats.large_fish += 1,
                AgentKind::Predator => stats.predators += 1,
            }
            if agent.trail.len() > 1 {
                stats.active_trails += 1;
            }
            if agent.is_carrying() {
                carrying += 1;
            }
            speed_sum += agent.speed();
            alarm_sum += agent.alarm.level;
        }

        stats.total = population.len();
        if stats.total > 0 {
            stats.mean_speed = speed_sum / stats.total as f32;
            stats.mean_alarm = alarm_sum / stats.total as f32;
        }

        stats.health = match config.variant {
            Variant::Boids => 1.0,
            Variant::AntColony => {
                if stats.ants == 0 {
                    1.0
                } else {
                    carrying as f32 / stats.ants as f32
                }
            }
            Variant::Aquarium => {
                let target: usize = FishSize::ALL
                    .iter()
                    .map(|&size| config.target_count(AgentKind::Fish(size)))
                    .sum();
                if target == 0 {
                    1.0
                } else {
                    (stats.prey() as f32 / target as f32).clamp(0.0, 1.0)
                }
            }
        };

        stats
    }

    pub fn prey(&self) -> usize {
        self.small_fish + self.medium_fish + self.large_fish
    }
}

// Surface-side metrics shown in the control panel
#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub primitives: usize,
    pub visible_primitives: usize,
}

impl DebugInfo {
    pub fn record_frame(&mut self, fps: f32, frame_time: Duration, primitives: usize, visible: usize) {
        self.fps = fps;
        self.frame_time = frame_time;
        self.primitives = primitives;
        self.visible_primitives = visible;
    }

    // Share of primitives dropped by culling, in percent
    pub fn culling_efficiency(&self) -> f32 {
        if self.primitives == 0 {
            return 0.0;
        }
        (1.0 - self.visible_primitives as f32 / self.primitives as f32) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Role;
    use nannou::prelude::Vec2;

    #[test]
    fn aquarium_health_tracks_prey_target() {
        let mut config = SimulationConfig::for_variant(Variant::Aquarium);
        config.small_fish_count = 2;
        config.medium_fish_count = 1;
        config.large_fish_count = 1;

        let mut population = AgentPopulation::new();
        population.insert(
            Role::Fish {
                size: FishSize::Small,
                depth: 0.5,
            },
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            5.0,
            4,
        );
        population.insert(Role::Predator { cooldown: 0, catches: 0 }, Vec2::ZERO, Vec2::ZERO, 16.0, 4);

        let field = FieldGrid::new(100.0, 100.0, 5.0);
        let stats = Statistics::collect(3, 7, &config, &population, &field, &Resources::default());
        assert_eq!(stats.small_fish, 1);
        assert_eq!(stats.predators, 1);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.catches, 7);
        assert!((stats.health - 0.25).abs() < 1e-6);
        assert!((stats.mean_speed - 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_population_is_healthy() {
        let config = SimulationConfig::for_variant(Variant::AntColony);
        let field = FieldGrid::new(0.0, 0.0, 5.0);
        let stats = Statistics::collect(0, 0, &config, &AgentPopulation::new(), &field, &Resources::default());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.mean_speed, 0.0);
        assert_eq!(stats.health, 1.0);
    }

    #[test]
    fn culling_efficiency_is_a_percentage() {
        let mut info = DebugInfo::default();
        assert_eq!(info.culling_efficiency(), 0.0);
        info.record_frame(60.0, Duration::from_millis(16), 200, 50);
        assert!((info.culling_efficiency() - 75.0).abs() < 1e-4);
    }
}
