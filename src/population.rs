/*
 * Population Module
 *
 * AgentPopulation owns every agent and drives one tick at a time:
 * 1. Snapshot positions, velocities and kinds, rebuild the spatial grid
 * 2. Decide: every agent computes its steering force and one-shot events
 *    (capture, pickup, delivery, eating) from the snapshot only
 * 3. Apply: decay transient state, integrate, record trails, deposit
 *    pheromones, resolve events, remove captured prey
 *
 * Because no agent moves before all decisions are made, neighbor queries
 * always observe one consistent tick-start state.
 */

use nannou::prelude::*;
use rand::Rng;
use tracing::debug;

use crate::agent::{Agent, AgentKind, AntState, FishSize, Role};
use crate::field::{Channel, FieldGrid};
use crate::params::{BoundaryPolicy, SimulationConfig};
use crate::physics;
use crate::resources::Resources;
use crate::spatial_grid::SpatialGrid;
use crate::steering::{self, Fear, Limits, Neighbor, Sensors};
use crate::vector;

// Where new agents of a kind appear: uniformly within `center +/- half_extent`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnAnchor {
    pub center: Vec2,
    pub half_extent: Vec2,
}

impl SpawnAnchor {
    pub fn point(center: Vec2) -> Self {
        Self {
            center,
            half_extent: Vec2::ZERO,
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let dx = jitter(self.half_extent.x, &mut *rng);
        let dy = jitter(self.half_extent.y, &mut *rng);
        self.center + Vec2::new(dx, dy)
    }
}

fn jitter<R: Rng + ?Sized>(half: f32, rng: &mut R) -> f32 {
    if half > 0.0 {
        rng.gen_range(-half..half)
    } else {
        0.0
    }
}

// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub captures: u32,
    pub pickups: u32,
    pub deliveries: u32,
    pub pellets_eaten: u32,
}

// Ant arrival at a food source or at the nest
#[derive(Debug, Clone, Copy, PartialEq)]
enum AntEvent {
    Pickup(usize),
    Deliver,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Decision {
    force: Vec2,
    capture: Option<usize>,
    ant_event: Option<AntEvent>,
    eat: Option<usize>,
    // Threat position that should (re)trigger the agent's alarm
    alarm: Option<Vec2>,
}

impl Decision {
    fn steer(force: Vec2) -> Self {
        Self {
            force,
            capture: None,
            ant_event: None,
            eat: None,
            alarm: None,
        }
    }
}

// Read-only tick-start state shared by every decision
struct Snapshot {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    kinds: Vec<AgentKind>,
}

pub struct AgentPopulation {
    agents: Vec<Agent>,
    next_id: u64,
    grid: SpatialGrid,
    grid_key: (f32, f32, f32),
}

impl Default for AgentPopulation {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentPopulation {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            next_id: 0,
            grid: SpatialGrid::new(50.0, 0.0, 0.0),
            grid_key: (50.0, 0.0, 0.0),
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn count(&self, kind: AgentKind) -> usize {
        self.agents.iter().filter(|a| a.kind() == kind).count()
    }

    pub fn prey_count(&self) -> usize {
        self.agents.iter().filter(|a| a.kind().is_prey()).count()
    }

    pub fn clear(&mut self) {
        self.agents.clear();
    }

    // Add one agent with an explicit state; returns its id
    pub fn insert(&mut self, role: Role, position: Vec2, velocity: Vec2, size: f32, trail_capacity: usize) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.agents.push(Agent::new(id, role, position, velocity, size, trail_capacity));
        id
    }

    // Spawn a randomized agent of `kind` near `anchor`
    pub fn spawn<R: Rng + ?Sized>(&mut self, kind: AgentKind, anchor: &SpawnAnchor, config: &SimulationConfig, rng: &mut R) -> u64 {
        let position = anchor.sample(&mut *rng);
        let direction = vector::from_angle(rng.gen_range(0.0..std::f32::consts::TAU));
        let max_speed = config.max_speed(kind);

        let (role, speed, size) = match kind {
            AgentKind::Boid => (Role::Boid, max_speed.min(2.0), 6.0),
            AgentKind::Ant => (
                Role::Ant {
                    state: AntState::Exploring,
                    deposit_strength: config.deposit_amount,
                },
                max_speed,
                4.0,
            ),
            AgentKind::Fish(size) => {
                let base = match size {
                    FishSize::Small => 5.0,
                    FishSize::Medium => 8.0,
                    FishSize::Large => 12.0,
                };
                let role = Role::Fish {
                    size,
                    depth: rng.gen_range(0.0..1.0),
                };
                (role, max_speed * 0.5, base * rng.gen_range(0.85..1.15))
            }
            AgentKind::Predator => (
                Role::Predator {
                    cooldown: 0,
                    catches: 0,
                },
                max_speed * 0.5,
                16.0,
            ),
        };

        self.insert(role, position, direction * speed, size, config.trail_capacity)
    }

    // Grow or shrink `kind` to exactly `target` agents; newest are removed first
    pub fn set_target_count<R: Rng + ?Sized>(
        &mut self,
        kind: AgentKind,
        target: usize,
        anchor: &SpawnAnchor,
        config: &SimulationConfig,
        rng: &mut R,
    ) {
        let current = self.count(kind);
        if current == target {
            return;
        }

        if current < target {
            for _ in current..target {
                self.spawn(kind, anchor, config, rng);
            }
        } else {
            let mut excess = current - target;
            let mut index = self.agents.len();
            while excess > 0 && index > 0 {
                index -= 1;
                if self.agents[index].kind() == kind {
                    self.agents.remove(index);
                    excess -= 1;
                }
            }
        }
        debug!(?kind, from = current, to = target, "population resized");
    }

    // One-shot scare: alarm every agent within `radius` of `point`
    pub fn scare(&mut self, point: Vec2, radius: f32) -> usize {
        let radius_sq = radius * radius;
        let mut scared = 0;
        for agent in &mut self.agents {
            if agent.position.distance_squared(point) < radius_sq {
                agent.alarm.trigger(point);
                scared += 1;
            }
        }
        scared
    }

    // Recreate the spatial grid only when its geometry changed
    fn prepare_grid(&mut self, config: &SimulationConfig) {
        let cell = config.perception_radius.max(10.0);
        let key = (cell, config.world_width, config.world_height);
        if key != self.grid_key {
            self.grid = SpatialGrid::new(cell, config.world_width, config.world_height);
            self.grid_key = key;
        }
    }

    fn take_snapshot(&mut self, config: &SimulationConfig) -> Snapshot {
        self.prepare_grid(config);
        let snapshot = Snapshot {
            positions: self.agents.iter().map(|a| a.position).collect(),
            velocities: self.agents.iter().map(|a| a.velocity).collect(),
            kinds: self.agents.iter().map(|a| a.kind()).collect(),
        };
        self.grid.rebuild(&snapshot.positions);
        snapshot
    }

    fn neighbors(&self, snapshot: &Snapshot, index: usize, radius: f32) -> Vec<Neighbor> {
        let mut out = Vec::new();
        self.grid.for_each_neighbor(&snapshot.positions, index, radius, |other, d_sq| {
            out.push(Neighbor {
                index: other,
                position: snapshot.positions[other],
                velocity: snapshot.velocities[other],
                kind: snapshot.kinds[other],
                distance: d_sq.sqrt(),
            });
        });
        out
    }

    // Advance every agent by one tick
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        config: &SimulationConfig,
        field: &mut FieldGrid,
        resources: &mut Resources,
        tick: u64,
        rng: &mut R,
    ) -> TickReport {
        let snapshot = self.take_snapshot(config);

        let decisions: Vec<Decision> = {
            let field = &*field;
            let resources = &*resources;
            (0..self.agents.len())
                .map(|i| self.decide(i, &snapshot, config, field, resources, &mut *rng))
                .collect()
        };

        self.apply(decisions, config, field, resources, tick)
    }

    fn decide<R: Rng + ?Sized>(
        &self,
        index: usize,
        snapshot: &Snapshot,
        config: &SimulationConfig,
        field: &FieldGrid,
        resources: &Resources,
        rng: &mut R,
    ) -> Decision {
        let agent = &self.agents[index];
        let limits = Limits {
            max_speed: config.max_speed(agent.kind()),
            max_force: config.max_force,
        };

        let mut decision = match &agent.role {
            Role::Boid => self.decide_boid(index, snapshot, config, limits),
            Role::Fish { size, .. } => self.decide_fish(index, *size, snapshot, config, resources, limits),
            Role::Predator { cooldown, .. } => self.decide_predator(index, *cooldown, snapshot, config, limits, rng),
            Role::Ant { state, .. } => decide_ant(agent, *state, config, field, resources, limits, rng),
        };

        // Scare response shared by everything that can be scared
        if !matches!(agent.role, Role::Predator { .. }) {
            if let Some(source) = agent.alarm.source {
                let fear = Fear {
                    multiplier: 1.0,
                    alarm_level: agent.alarm.level,
                    alarm_boost: config.alarm_boost,
                };
                decision.force += steering::flee(agent.position, agent.velocity, source, config.scare_radius, fear, limits)
                    * config.flee_weight;
            }
        }

        if config.boundary_policy() == BoundaryPolicy::Repel {
            decision.force += steering::boundary_avoidance(
                agent.position,
                config.world_width / 2.0,
                config.world_height / 2.0,
                config.boundary_margin,
                config.boundary_weight,
            );
        }
        decision.force += steering::obstacle_avoidance(
            agent.position,
            &resources.obstacles,
            config.boundary_margin * 0.5,
            config.obstacle_weight,
        );

        decision
    }

    fn flocking(&self, index: usize, neighbors: &[Neighbor], school: &[Neighbor], config: &SimulationConfig, limits: Limits) -> Vec2 {
        let agent = &self.agents[index];
        let (position, velocity) = (agent.position, agent.velocity);

        steering::separation(position, velocity, neighbors, config.separation_radius, limits) * config.separation_weight
            + steering::alignment(velocity, school, limits) * config.alignment_weight
            + steering::cohesion(position, velocity, school, limits) * config.cohesion_weight
    }

    fn decide_boid(&self, index: usize, snapshot: &Snapshot, config: &SimulationConfig, limits: Limits) -> Decision {
        let neighbors = self.neighbors(snapshot, index, config.perception_radius);
        Decision::steer(self.flocking(index, &neighbors, &neighbors, config, limits))
    }

    fn decide_fish(
        &self,
        index: usize,
        size: FishSize,
        snapshot: &Snapshot,
        config: &SimulationConfig,
        resources: &Resources,
        limits: Limits,
    ) -> Decision {
        let agent = &self.agents[index];
        let own_kind = AgentKind::Fish(size);

        let nearby = self.neighbors(snapshot, index, config.perception_radius);
        let fish: Vec<Neighbor> = nearby.iter().copied().filter(|n| n.kind.is_prey()).collect();
        let school: Vec<Neighbor> = fish.iter().copied().filter(|n| n.kind == own_kind).collect();
        let mut decision = Decision::steer(self.flocking(index, &fish, &school, config, limits));

        let fear = Fear {
            multiplier: config.fear_multiplier(size),
            alarm_level: agent.alarm.level,
            alarm_boost: config.alarm_boost,
        };
        let threats: Vec<Neighbor> = self
            .neighbors(snapshot, index, config.flee_radius)
            .into_iter()
            .filter(|n| n.kind == AgentKind::Predator)
            .collect();
        for threat in &threats {
            decision.force += steering::flee(agent.position, agent.velocity, threat.position, config.flee_radius, fear, limits)
                * config.flee_weight;
        }
        decision.alarm = threats
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .map(|t| t.position);

        // Only a calm fish goes for food
        if threats.is_empty() {
            if let Some((food, distance)) = resources.nearest_food(agent.position, config.feed_radius) {
                let target = resources.food[food].position;
                decision.force += steering::seek(agent.position, agent.velocity, target, limits) * config.food_weight;
                if distance < config.eat_distance {
                    decision.eat = Some(food);
                }
            }
        }

        decision
    }

    fn decide_predator<R: Rng + ?Sized>(
        &self,
        index: usize,
        cooldown: u32,
        snapshot: &Snapshot,
        config: &SimulationConfig,
        limits: Limits,
        rng: &mut R,
    ) -> Decision {
        let agent = &self.agents[index];
        let candidates = self.neighbors(snapshot, index, config.hunt_radius);
        let hunt = steering::hunt(agent.position, agent.velocity, &candidates, cooldown, config.capture_distance, limits);

        let rivals: Vec<Neighbor> = candidates
            .iter()
            .copied()
            .filter(|n| n.kind == AgentKind::Predator)
            .collect();
        let mut force = hunt.force * config.hunt_weight
            + steering::separation(agent.position, agent.velocity, &rivals, config.separation_radius * 2.0, limits)
                * config.separation_weight;

        // Cruise at half speed while resting or when nothing is in range
        if hunt.force == Vec2::ZERO {
            let heading = steering::wander(agent.heading, config.wander_jitter_deg.to_radians() * 0.25, rng);
            let desired = vector::from_angle(heading) * limits.max_speed * 0.5;
            force += vector::clamp_magnitude(desired - agent.velocity, limits.max_force);
        }

        Decision {
            capture: hunt.capture,
            ..Decision::steer(force)
        }
    }

    fn apply(
        &mut self,
        decisions: Vec<Decision>,
        config: &SimulationConfig,
        field: &mut FieldGrid,
        resources: &mut Resources,
        tick: u64,
    ) -> TickReport {
        let mut report = TickReport::default();
        let mut captures = Vec::new();
        let half_width = config.world_width / 2.0;
        let half_height = config.world_height / 2.0;
        let wrap = config.boundary_policy() == BoundaryPolicy::Wrap;

        for (index, (agent, decision)) in self.agents.iter_mut().zip(decisions).enumerate() {
            // Transient state decays before this tick's events land
            agent.alarm.decay(config.alarm_decay);
            if let Role::Predator { cooldown, .. } = &mut agent.role {
                *cooldown = cooldown.saturating_sub(1);
            }
            if let Some(threat) = decision.alarm {
                agent.alarm.trigger(threat);
            }

            if agent.trail.capacity() != config.trail_capacity {
                agent.trail.set_capacity(config.trail_capacity);
            }

            physics::integrate(agent, decision.force, config.max_force, config.max_speed(agent.kind()));
            let wrapped = wrap && physics::wrap_edges(&mut agent.position, half_width, half_height);
            physics::record_trail(agent, wrapped, tick);

            if let Role::Ant { state, deposit_strength } = &mut agent.role {
                match decision.ant_event {
                    Some(AntEvent::Pickup(food)) => {
                        if resources.food.get_mut(food).map_or(false, |f| f.take()) {
                            *state = AntState::Returning;
                            *deposit_strength = config.deposit_amount;
                            agent.velocity = -agent.velocity;
                            report.pickups += 1;
                        }
                    }
                    Some(AntEvent::Deliver) => {
                        if let Some(nest) = resources.nest.as_mut() {
                            nest.delivered += 1;
                        }
                        *state = AntState::Exploring;
                        *deposit_strength = config.deposit_amount;
                        agent.velocity = -agent.velocity;
                        report.deliveries += 1;
                    }
                    None => {}
                }

                // Exploring ants mark the way home, returning ants the way to food
                let channel = match state {
                    AntState::Exploring => Channel::ToNest,
                    AntState::Returning => Channel::ToFood,
                };
                field.deposit(agent.position, channel, *deposit_strength);
                *deposit_strength *= config.deposit_falloff.clamp(0.0, 1.0);
            }

            if let Some(food) = decision.eat {
                if resources.food.get_mut(food).map_or(false, |f| f.take()) {
                    report.pellets_eaten += 1;
                }
            }

            if let Some(prey) = decision.capture {
                captures.push((index, prey));
            }
        }

        if !captures.is_empty() {
            report.captures = self.resolve_captures(&captures, config);
        }
        report
    }

    // Each prey is caught at most once; each resting predator at most once per tick
    fn resolve_captures(&mut self, captures: &[(usize, usize)], config: &SimulationConfig) -> u32 {
        let mut eaten = vec![false; self.agents.len()];
        let mut count = 0;

        for &(predator, prey) in captures {
            if eaten[prey] || eaten[predator] {
                continue;
            }
            if let Role::Predator { cooldown, catches } = &mut self.agents[predator].role {
                if *cooldown > 0 {
                    continue;
                }
                *catches += 1;
                *cooldown = config.digestion_ticks as u32;
                eaten[prey] = true;
                count += 1;
            }
        }

        let mut index = 0;
        self.agents.retain(|_| {
            let keep = !eaten[index];
            index += 1;
            keep
        });
        count
    }
}

fn decide_ant<R: Rng + ?Sized>(
    agent: &Agent,
    state: AntState,
    config: &SimulationConfig,
    field: &FieldGrid,
    resources: &Resources,
    limits: Limits,
    rng: &mut R,
) -> Decision {
    let position = agent.position;
    let velocity = agent.velocity;

    // Targets close enough to see are sought directly
    match state {
        AntState::Exploring => {
            if let Some((food, distance)) = resources.nearest_food(position, config.target_pull_radius) {
                let mut decision = Decision::steer(steering::seek(position, velocity, resources.food[food].position, limits));
                if distance < config.pickup_radius {
                    decision.ant_event = Some(AntEvent::Pickup(food));
                }
                return decision;
            }
        }
        AntState::Returning => {
            if let Some(nest) = resources.nest {
                let distance = position.distance(nest.position);
                if distance < config.target_pull_radius {
                    let mut decision = Decision::steer(steering::seek(position, velocity, nest.position, limits));
                    if distance < config.nest_radius.max(nest.radius) {
                        decision.ant_event = Some(AntEvent::Deliver);
                    }
                    return decision;
                }
            }
        }
    }

    let channel = match state {
        AntState::Exploring => Channel::ToFood,
        AntState::Returning => Channel::ToNest,
    };
    let sensors = Sensors {
        count: config.sensor_count,
        spread: config.sensor_angle_deg.to_radians(),
        distance: config.sensor_distance,
        saturation: config.pheromone_saturation,
        sensitivity: config.pheromone_sensitivity,
    };

    let followed = steering::pheromone_follow(field, position, agent.heading, channel, &sensors)
        .filter(|_| rng.gen::<f32>() >= config.explore_probability);

    let force = match followed {
        Some(direction) => vector::steer_towards(direction, velocity, limits.max_speed, limits.max_force) * config.pheromone_weight,
        None => {
            let heading = steering::wander(agent.heading, config.wander_jitter_deg.to_radians(), rng);
            vector::steer_towards(vector::from_angle(heading), velocity, limits.max_speed, limits.max_force)
        }
    };
    Decision::steer(force)
}
