/*
 * Simulation Loop Module
 *
 * Owns the whole simulation state and drives it in a fixed order per frame:
 * 1. Tick the population (steering, integration, deposits, events)
 * 2. Decay the pheromone field once
 * 3. Tick transient resources (falling pellets, depleted food)
 * 4. Respawn / auto-feed for the aquarium
 * 5. Recompute statistics
 * and then always render, so a paused scene stays visible.
 *
 * External input only reaches the state through the methods here, between
 * frames: parameter changes, one-shot interactions, pause/resume/reset.
 */

use nannou::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use crate::agent::{AgentKind, FishSize};
use crate::debug::Statistics;
use crate::error::ParamError;
use crate::field::FieldGrid;
use crate::params::{BoundaryPolicy, ParamValue, SimulationConfig, Variant};
use crate::population::{AgentPopulation, SpawnAnchor};
use crate::renderer::{self, Primitive, RenderSnapshot};
use crate::resources::{Food, Nest, Obstacle, Resources};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Paused,
}

// Point interactions coming from the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    PlaceFood,
    Scare,
    PlaceObstacle,
    ClearObstacles,
}

pub struct Simulation {
    config: SimulationConfig,
    seed: u64,
    rng: SmallRng,
    state: LoopState,
    population: AgentPopulation,
    field: FieldGrid,
    resources: Resources,
    tick: u64,
    catches: u64,
    statistics: Statistics,
}

impl Simulation {
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        let field = FieldGrid::new(config.world_width, config.world_height, config.cell_size);
        let mut simulation = Self {
            config,
            seed,
            rng: SmallRng::seed_from_u64(seed),
            state: LoopState::Running,
            population: AgentPopulation::new(),
            field,
            resources: Resources::default(),
            tick: 0,
            catches: 0,
            statistics: Statistics::default(),
        };
        simulation.populate();
        simulation
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn population(&self) -> &AgentPopulation {
        &self.population
    }

    pub fn field(&self) -> &FieldGrid {
        &self.field
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == LoopState::Paused
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn pause(&mut self) {
        self.state = LoopState::Paused;
    }

    pub fn resume(&mut self) {
        self.state = LoopState::Running;
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            LoopState::Running => LoopState::Paused,
            LoopState::Paused => LoopState::Running,
        };
    }

    // One display frame: advance if running, always render
    pub fn frame(&mut self) -> Vec<Primitive> {
        if self.state == LoopState::Running {
            self.step();
        }
        renderer::render(&self.snapshot())
    }

    pub fn snapshot(&self) -> RenderSnapshot<'_> {
        RenderSnapshot {
            config: &self.config,
            agents: self.population.agents(),
            field: &self.field,
            resources: &self.resources,
            tick: self.tick,
        }
    }

    // Advance exactly one tick regardless of the loop state
    pub fn step(&mut self) {
        self.field.set_cell_size(self.config.cell_size);

        let report = self.population.tick(
            &self.config,
            &mut self.field,
            &mut self.resources,
            self.tick,
            &mut self.rng,
        );
        self.field.decay(self.config.decay_rate);
        self.resources
            .tick(self.config.food_fall_speed, self.floor_y());

        self.tick += 1;
        self.catches += report.captures as u64;

        if self.config.variant == Variant::Aquarium {
            self.maintain_aquarium();
        }

        self.statistics = Statistics::collect(
            self.tick,
            self.catches,
            &self.config,
            &self.population,
            &self.field,
            &self.resources,
        );

        trace!(
            tick = self.tick,
            agents = self.statistics.total,
            captures = report.captures,
            deliveries = report.deliveries,
            "tick"
        );
    }

    // Apply one named parameter; population counts resize immediately
    pub fn set_parameter(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<(), ParamError> {
        let value = value.into();
        if let Err(err) = self.config.set_parameter(name, value) {
            warn!(%err, "rejected parameter");
            return Err(err);
        }

        if let Some(kind) = SimulationConfig::count_kind(name) {
            if self.config.variant.kinds().contains(&kind) {
                let target = self.config.target_count(kind);
                let anchor = self.spawn_anchor(kind);
                self.population
                    .set_target_count(kind, target, &anchor, &self.config, &mut self.rng);
            }
        }

        if name == "cell_size" {
            self.field.set_cell_size(self.config.cell_size);
        }
        Ok(())
    }

    pub fn set_variant(&mut self, variant: Variant) {
        if self.config.variant == variant {
            return;
        }
        info!(from = self.config.variant.label(), to = variant.label(), "switching variant");
        self.config.variant = variant;
        // A boundary override belongs to the variant it was chosen in
        self.config.boundary = None;
        self.tick = 0;
        self.catches = 0;
        self.populate();
    }

    pub fn set_boundary_policy(&mut self, policy: BoundaryPolicy) {
        debug!(?policy, "boundary policy changed");
        self.config.boundary = Some(policy);
    }

    pub fn on_interaction(&mut self, kind: InteractionKind, point: Vec2) {
        debug!(?kind, x = point.x, y = point.y, "interaction");
        match kind {
            InteractionKind::PlaceFood => match self.config.variant {
                Variant::AntColony => {
                    let quantity = self.config.food_source_size as u32;
                    self.resources.food.push(Food::source(point, quantity));
                }
                Variant::Aquarium => self.drop_pellets(point, self.config.pellets_per_feed),
                Variant::Boids => {}
            },
            InteractionKind::Scare => {
                let scared = self.population.scare(point, self.config.scare_radius);
                debug!(scared, "scare");
            }
            InteractionKind::PlaceObstacle => self.resources.obstacles.push(Obstacle {
                position: point,
                radius: self.config.obstacle_radius,
            }),
            InteractionKind::ClearObstacles => self.resources.obstacles.clear(),
        }
    }

    // Restart from the original seed with the current configuration
    pub fn reset(&mut self) {
        info!(seed = self.seed, variant = self.config.variant.label(), "reset");
        self.rng = SmallRng::seed_from_u64(self.seed);
        self.tick = 0;
        self.catches = 0;
        self.populate();
    }

    // Follow the surface size; field contents are discarded
    pub fn resize(&mut self, width: f32, height: f32) {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        info!(width, height, "resize");
        self.config.world_width = width;
        self.config.world_height = height;
        self.field.resize(width, height);
    }

    fn half_extent(&self) -> Vec2 {
        Vec2::new(self.config.world_width / 2.0, self.config.world_height / 2.0)
    }

    fn floor_y(&self) -> f32 {
        -self.config.world_height / 2.0 + 4.0
    }

    // Nest and first food pile sit in opposite corners
    fn nest_position(&self) -> Vec2 {
        self.half_extent() * Vec2::new(0.6, -0.6)
    }

    fn spawn_anchor(&self, kind: AgentKind) -> SpawnAnchor {
        match kind {
            AgentKind::Ant => {
                let nest = self.resources.nest.map_or(self.nest_position(), |n| n.position);
                SpawnAnchor {
                    center: nest,
                    half_extent: Vec2::splat(self.config.nest_radius * 0.5),
                }
            }
            _ => {
                let inset = match self.config.boundary_policy() {
                    BoundaryPolicy::Wrap => Vec2::ZERO,
                    BoundaryPolicy::Repel => Vec2::splat(self.config.boundary_margin),
                };
                SpawnAnchor {
                    center: Vec2::ZERO,
                    half_extent: (self.half_extent() - inset).max(Vec2::ZERO),
                }
            }
        }
    }

    // Rebuild agents and resources for the current variant
    fn populate(&mut self) {
        self.population.clear();
        self.resources.clear();
        self.field = FieldGrid::new(self.config.world_width, self.config.world_height, self.config.cell_size);

        if self.config.variant == Variant::AntColony {
            self.resources.nest = Some(Nest {
                position: self.nest_position(),
                radius: self.config.nest_radius,
                delivered: 0,
            });
            let food = -self.nest_position();
            self.resources
                .food
                .push(Food::source(food, self.config.food_source_size as u32));
        }

        for &kind in self.config.variant.kinds() {
            let anchor = self.spawn_anchor(kind);
            let target = self.config.target_count(kind);
            self.population
                .set_target_count(kind, target, &anchor, &self.config, &mut self.rng);
        }

        self.statistics = Statistics::collect(
            self.tick,
            self.catches,
            &self.config,
            &self.population,
            &self.field,
            &self.resources,
        );
        debug!(agents = self.population.len(), "populated");
    }

    fn drop_pellets(&mut self, point: Vec2, count: usize) {
        let lifetime = self.config.pellet_lifetime as u32;
        for _ in 0..count {
            let offset = Vec2::new(self.rng.gen_range(-20.0..20.0), self.rng.gen_range(-10.0..10.0));
            self.resources.food.push(Food::pellet(point + offset, lifetime));
        }
    }

    // Keep the tank alive: slow prey respawn and optional auto-feed
    fn maintain_aquarium(&mut self) {
        let respawn = self.config.respawn_interval as u64;
        if respawn > 0 && self.tick % respawn == 0 {
            for size in FishSize::ALL {
                let kind = AgentKind::Fish(size);
                if self.population.count(kind) < self.config.target_count(kind) {
                    let anchor = self.spawn_anchor(kind);
                    self.population.spawn(kind, &anchor, &self.config, &mut self.rng);
                }
            }
        }

        let feed = self.config.auto_feed_interval as u64;
        if feed > 0 && self.tick % feed == 0 {
            let half = self.half_extent();
            let x = if half.x > 0.0 { self.rng.gen_range(-half.x..half.x) } else { 0.0 };
            let lifetime = self.config.pellet_lifetime as u32;
            self.resources
                .food
                .push(Food::pellet(Vec2::new(x, half.y - 10.0), lifetime));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(variant: Variant) -> SimulationConfig {
        let mut config = SimulationConfig::for_variant(variant);
        config.boid_count = 30;
        config.ant_count = 30;
        config.small_fish_count = 10;
        config.medium_fish_count = 5;
        config.large_fish_count = 3;
        config.predator_count = 1;
        config
    }

    #[test]
    fn new_populates_the_selected_variant() {
        let sim = Simulation::new(small(Variant::Aquarium), 1);
        let stats = sim.statistics();
        assert_eq!(stats.small_fish, 10);
        assert_eq!(stats.predators, 1);
        assert_eq!(stats.boids, 0);
        assert_eq!(stats.ants, 0);
    }

    #[test]
    fn ant_colony_starts_with_nest_and_food() {
        let sim = Simulation::new(small(Variant::AntColony), 1);
        assert!(sim.resources().nest.is_some());
        assert_eq!(sim.resources().food.len(), 1);
        assert_eq!(sim.statistics().ants, 30);
    }

    #[test]
    fn pause_freezes_ticks_but_still_renders() {
        let mut sim = Simulation::new(small(Variant::Boids), 2);
        sim.frame();
        assert_eq!(sim.tick_count(), 1);

        sim.pause();
        sim.pause();
        assert_eq!(sim.state(), LoopState::Paused);
        let primitives = sim.frame();
        assert_eq!(sim.tick_count(), 1);
        assert!(!primitives.is_empty());

        sim.resume();
        sim.resume();
        assert_eq!(sim.state(), LoopState::Running);
        sim.frame();
        assert_eq!(sim.tick_count(), 2);
    }

    #[test]
    fn count_parameter_resizes_population() {
        let mut sim = Simulation::new(small(Variant::Boids), 3);
        sim.set_parameter("boid_count", 12).unwrap();
        assert_eq!(sim.population().count(AgentKind::Boid), 12);
        sim.set_parameter("boid_count", -4).unwrap();
        assert_eq!(sim.population().count(AgentKind::Boid), 0);
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let mut sim = Simulation::new(small(Variant::Boids), 3);
        assert_eq!(
            sim.set_parameter("warp_factor", 9.0),
            Err(ParamError::Unknown("warp_factor".to_string()))
        );
    }

    #[test]
    fn reset_is_reproducible() {
        let mut sim = Simulation::new(small(Variant::Boids), 42);
        let start: Vec<Vec2> = sim.population().agents().iter().map(|a| a.position).collect();
        for _ in 0..10 {
            sim.step();
        }
        sim.reset();
        let again: Vec<Vec2> = sim.population().agents().iter().map(|a| a.position).collect();
        assert_eq!(start, again);
        assert_eq!(sim.tick_count(), 0);
    }

    #[test]
    fn interactions_place_food_and_obstacles() {
        let mut sim = Simulation::new(small(Variant::Aquarium), 5);
        sim.on_interaction(InteractionKind::PlaceFood, Vec2::new(0.0, 100.0));
        assert_eq!(sim.resources().pellet_count(), sim.config().pellets_per_feed);

        sim.on_interaction(InteractionKind::PlaceObstacle, Vec2::ZERO);
        sim.on_interaction(InteractionKind::PlaceObstacle, Vec2::new(50.0, 0.0));
        assert_eq!(sim.resources().obstacles.len(), 2);
        sim.on_interaction(InteractionKind::ClearObstacles, Vec2::ZERO);
        assert!(sim.resources().obstacles.is_empty());
    }

    #[test]
    fn variant_switch_repopulates() {
        let mut sim = Simulation::new(small(Variant::Boids), 6);
        sim.set_variant(Variant::AntColony);
        assert_eq!(sim.population().count(AgentKind::Boid), 0);
        assert_eq!(sim.population().count(AgentKind::Ant), 30);
        assert_eq!(sim.config().boundary_policy(), BoundaryPolicy::Repel);
    }

    #[test]
    fn zero_area_resize_keeps_running() {
        let mut sim = Simulation::new(small(Variant::AntColony), 7);
        sim.resize(0.0, 0.0);
        assert!(sim.field().is_empty());
        for _ in 0..5 {
            sim.frame();
        }
        assert_eq!(sim.tick_count(), 5);
        assert_eq!(sim.statistics().active_field_cells, 0);
    }

    #[test]
    fn variant_switch_drops_boundary_override() {
        let mut sim = Simulation::new(small(Variant::Aquarium), 8);
        sim.set_boundary_policy(BoundaryPolicy::Wrap);
        assert_eq!(sim.config().boundary_policy(), BoundaryPolicy::Wrap);

        sim.set_variant(Variant::AntColony);
        assert_eq!(sim.config().boundary, None);
        assert_eq!(sim.config().boundary_policy(), BoundaryPolicy::Repel);

        sim.set_variant(Variant::Boids);
        assert_eq!(sim.config().boundary_policy(), BoundaryPolicy::Wrap);
    }

    #[test]
    fn enormous_query_radii_keep_ticking() {
        let mut sim = Simulation::new(small(Variant::Aquarium), 9);
        sim.set_parameter("hunt_radius", 1.0e30f32).unwrap();
        sim.set_parameter("flee_radius", f32::INFINITY).unwrap();
        for _ in 0..10 {
            sim.step();
        }
        assert_eq!(sim.tick_count(), 10);
        assert_eq!(sim.population().count(AgentKind::Predator), 1);
    }

    #[test]
    fn enormous_trail_capacity_still_renders() {
        let mut sim = Simulation::new(small(Variant::Boids), 10);
        sim.set_parameter("trail_capacity", i64::MAX).unwrap();
        sim.set_parameter("boid_count", 40).unwrap();
        for _ in 0..5 {
            assert!(!sim.frame().is_empty());
        }
        let trail = &sim.population().agents()[0].trail;
        assert_eq!(trail.capacity(), i64::MAX as usize);
        assert!(trail.len() <= 5);
    }

    #[test]
    fn tiny_cell_size_is_floored() {
        let mut sim = Simulation::new(small(Variant::AntColony), 11);
        sim.set_parameter("cell_size", 1.0e-4f32).unwrap();
        sim.step();
        assert_eq!(sim.field().cell_size(), crate::field::MIN_CELL_SIZE);
        assert!(sim.field().cols() <= sim.config().world_width.ceil() as usize);
        assert!(sim.field().rows() <= sim.config().world_height.ceil() as usize);
    }

    #[test]
    fn world_size_is_not_a_tunable() {
        let mut sim = Simulation::new(small(Variant::Boids), 12);
        assert_eq!(
            sim.set_parameter("world_width", 500.0),
            Err(ParamError::Unknown("world_width".to_string()))
        );
    }
}
