/*
 * Simulation Parameters Module
 *
 * SimulationConfig holds every tunable of the three simulations: population
 * counts, speed limits, force weights, radii, decay rates and visual
 * toggles. It is owned by the simulation and only changes through named
 * setters, which the UI drives by diffing an edited copy against the live
 * config. Configs can also be loaded from TOML; missing keys keep defaults.
 */

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::{AgentKind, FishSize};
use crate::error::{ConfigError, ParamError};

// Which of the three simulations is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Boids,
    AntColony,
    Aquarium,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Boids, Variant::AntColony, Variant::Aquarium];

    // Agent kinds populated by this variant
    pub fn kinds(self) -> &'static [AgentKind] {
        const BOIDS: [AgentKind; 1] = [AgentKind::Boid];
        const ANTS: [AgentKind; 1] = [AgentKind::Ant];
        const AQUARIUM: [AgentKind; 4] = [
            AgentKind::Fish(FishSize::Small),
            AgentKind::Fish(FishSize::Medium),
            AgentKind::Fish(FishSize::Large),
            AgentKind::Predator,
        ];
        match self {
            Variant::Boids => &BOIDS,
            Variant::AntColony => &ANTS,
            Variant::Aquarium => &AQUARIUM,
        }
    }

    // Pure flocking wraps at the edges; the ecosystems push back softly
    pub fn default_boundary(self) -> BoundaryPolicy {
        match self {
            Variant::Boids => BoundaryPolicy::Wrap,
            Variant::AntColony | Variant::Aquarium => BoundaryPolicy::Repel,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Variant::Boids => "Boids",
            Variant::AntColony => "Ant Colony",
            Variant::Aquarium => "Aquarium",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    // Teleport to the opposite edge
    Wrap,
    // Inward force proportional to penetration into the edge margin
    Repel,
}

// Loosely typed value for named parameter updates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Int(i64),
    Bool(bool),
}

impl ParamValue {
    pub fn to_f32(self, name: &str) -> Result<f32, ParamError> {
        match self {
            ParamValue::Float(v) => Ok(v),
            ParamValue::Int(v) => Ok(v as f32),
            ParamValue::Bool(_) => Err(self.mismatch(name, "a number")),
        }
    }

    // Counts never go negative; fractional counts round to nearest
    pub fn to_count(self, name: &str) -> Result<usize, ParamError> {
        match self {
            ParamValue::Int(v) => Ok(v.max(0) as usize),
            ParamValue::Float(v) if v.is_finite() => Ok(v.round().max(0.0) as usize),
            ParamValue::Float(_) => Ok(0),
            ParamValue::Bool(_) => Err(self.mismatch(name, "a count")),
        }
    }

    pub fn to_bool(self, _name: &str) -> Result<bool, ParamError> {
        match self {
            ParamValue::Bool(v) => Ok(v),
            ParamValue::Int(v) => Ok(v != 0),
            ParamValue::Float(v) => Ok(v != 0.0),
        }
    }

    fn mismatch(self, name: &str, expected: &'static str) -> ParamError {
        ParamError::TypeMismatch {
            name: name.to_string(),
            expected,
            got: self,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v as f32)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub variant: Variant,
    // Overrides the variant's boundary policy when set
    pub boundary: Option<BoundaryPolicy>,
    pub world_width: f32,
    pub world_height: f32,

    // Shared steering
    pub max_force: f32,
    pub perception_radius: f32,
    pub separation_radius: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub boundary_margin: f32,
    pub boundary_weight: f32,
    pub obstacle_radius: f32,
    pub obstacle_weight: f32,
    pub scare_radius: f32,

    // Boids
    pub boid_count: usize,
    pub boid_max_speed: f32,

    // Ant colony
    pub ant_count: usize,
    pub ant_max_speed: f32,
    pub cell_size: f32,
    pub decay_rate: f32,
    pub deposit_amount: f32,
    pub deposit_falloff: f32,
    pub pheromone_saturation: f32,
    pub pheromone_sensitivity: f32,
    pub pheromone_weight: f32,
    pub sensor_angle_deg: f32,
    pub sensor_count: usize,
    pub sensor_distance: f32,
    pub explore_probability: f32,
    pub wander_jitter_deg: f32,
    pub target_pull_radius: f32,
    pub pickup_radius: f32,
    pub nest_radius: f32,
    pub food_source_size: usize,

    // Aquarium
    pub small_fish_count: usize,
    pub medium_fish_count: usize,
    pub large_fish_count: usize,
    pub predator_count: usize,
    pub small_fish_speed: f32,
    pub medium_fish_speed: f32,
    pub large_fish_speed: f32,
    pub predator_speed: f32,
    pub flee_radius: f32,
    pub flee_weight: f32,
    pub small_fish_fear: f32,
    pub medium_fish_fear: f32,
    pub large_fish_fear: f32,
    pub alarm_decay: f32,
    pub alarm_boost: f32,
    pub hunt_radius: f32,
    pub hunt_weight: f32,
    pub capture_distance: f32,
    pub digestion_ticks: usize,
    pub feed_radius: f32,
    pub food_weight: f32,
    pub eat_distance: f32,
    pub food_fall_speed: f32,
    pub pellet_lifetime: usize,
    pub pellets_per_feed: usize,
    pub auto_feed_interval: usize,
    pub respawn_interval: usize,

    // Trails and visuals
    pub trail_capacity: usize,
    pub trail_fade_secs: f32,
    pub frame_rate: f32,
    pub show_trails: bool,
    pub show_field: bool,
    pub show_perception: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Boids,
            boundary: None,
            world_width: 1200.0,
            world_height: 800.0,

            max_force: 0.2,
            perception_radius: 50.0,
            separation_radius: 25.0,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            boundary_margin: 60.0,
            boundary_weight: 1.0,
            obstacle_radius: 30.0,
            obstacle_weight: 2.0,
            scare_radius: 150.0,

            boid_count: 200,
            boid_max_speed: 4.0,

            ant_count: 200,
            ant_max_speed: 1.5,
            cell_size: 5.0,
            decay_rate: 0.01,
            deposit_amount: 10.0,
            deposit_falloff: 0.995,
            pheromone_saturation: 50.0,
            pheromone_sensitivity: 0.05,
            pheromone_weight: 1.0,
            sensor_angle_deg: 45.0,
            sensor_count: 5,
            sensor_distance: 15.0,
            explore_probability: 0.05,
            wander_jitter_deg: 20.0,
            target_pull_radius: 60.0,
            pickup_radius: 12.0,
            nest_radius: 25.0,
            food_source_size: 100,

            small_fish_count: 40,
            medium_fish_count: 20,
            large_fish_count: 8,
            predator_count: 2,
            small_fish_speed: 3.0,
            medium_fish_speed: 2.4,
            large_fish_speed: 1.8,
            predator_speed: 2.8,
            flee_radius: 100.0,
            flee_weight: 2.0,
            small_fish_fear: 1.5,
            medium_fish_fear: 1.0,
            large_fish_fear: 0.6,
            alarm_decay: 0.97,
            alarm_boost: 1.5,
            hunt_radius: 150.0,
            hunt_weight: 1.0,
            capture_distance: 8.0,
            digestion_ticks: 180,
            feed_radius: 120.0,
            food_weight: 0.8,
            eat_distance: 6.0,
            food_fall_speed: 0.6,
            pellet_lifetime: 900,
            pellets_per_feed: 6,
            auto_feed_interval: 0,
            respawn_interval: 120,

            trail_capacity: 20,
            trail_fade_secs: 2.0,
            frame_rate: 60.0,
            show_trails: true,
            show_field: true,
            show_perception: false,
        }
    }
}

// Generates the named-parameter surface from one field list
macro_rules! tunables {
    ($($field:ident: $conv:ident),* $(,)?) => {
        impl SimulationConfig {
            pub const PARAMETER_NAMES: &'static [&'static str] = &[$(stringify!($field)),*];

            pub fn get_parameter(&self, name: &str) -> Option<ParamValue> {
                match name {
                    $(stringify!($field) => Some(ParamValue::from(self.$field)),)*
                    _ => None,
                }
            }

            pub fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
                match name {
                    $(stringify!($field) => {
                        self.$field = value.$conv(name)?;
                        Ok(())
                    })*
                    _ => Err(ParamError::Unknown(name.to_string())),
                }
            }

            // Named values that differ in `edited`, in declaration order
            pub fn changes(&self, edited: &Self) -> Vec<(&'static str, ParamValue)> {
                let mut out = Vec::new();
                $(
                    if self.$field != edited.$field {
                        out.push((stringify!($field), ParamValue::from(edited.$field)));
                    }
                )*
                out
            }
        }
    };
}

tunables! {
    max_force: to_f32,
    perception_radius: to_f32,
    separation_radius: to_f32,
    separation_weight: to_f32,
    alignment_weight: to_f32,
    cohesion_weight: to_f32,
    boundary_margin: to_f32,
    boundary_weight: to_f32,
    obstacle_radius: to_f32,
    obstacle_weight: to_f32,
    scare_radius: to_f32,
    boid_count: to_count,
    boid_max_speed: to_f32,
    ant_count: to_count,
    ant_max_speed: to_f32,
    cell_size: to_f32,
    decay_rate: to_f32,
    deposit_amount: to_f32,
    deposit_falloff: to_f32,
    pheromone_saturation: to_f32,
    pheromone_sensitivity: to_f32,
    pheromone_weight: to_f32,
    sensor_angle_deg: to_f32,
    sensor_count: to_count,
    sensor_distance: to_f32,
    explore_probability: to_f32,
    wander_jitter_deg: to_f32,
    target_pull_radius: to_f32,
    pickup_radius: to_f32,
    nest_radius: to_f32,
    food_source_size: to_count,
    small_fish_count: to_count,
    medium_fish_count: to_count,
    large_fish_count: to_count,
    predator_count: to_count,
    small_fish_speed: to_f32,
    medium_fish_speed: to_f32,
    large_fish_speed: to_f32,
    predator_speed: to_f32,
    flee_radius: to_f32,
    flee_weight: to_f32,
    small_fish_fear: to_f32,
    medium_fish_fear: to_f32,
    large_fish_fear: to_f32,
    alarm_decay: to_f32,
    alarm_boost: to_f32,
    hunt_radius: to_f32,
    hunt_weight: to_f32,
    capture_distance: to_f32,
    digestion_ticks: to_count,
    feed_radius: to_f32,
    food_weight: to_f32,
    eat_distance: to_f32,
    food_fall_speed: to_f32,
    pellet_lifetime: to_count,
    pellets_per_feed: to_count,
    auto_feed_interval: to_count,
    respawn_interval: to_count,
    trail_capacity: to_count,
    trail_fade_secs: to_f32,
    frame_rate: to_f32,
    show_trails: to_bool,
    show_field: to_bool,
    show_perception: to_bool,
}

impl SimulationConfig {
    // Defaults with the given variant selected
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn boundary_policy(&self) -> BoundaryPolicy {
        self.boundary.unwrap_or_else(|| self.variant.default_boundary())
    }

    pub fn max_speed(&self, kind: AgentKind) -> f32 {
        match kind {
            AgentKind::Boid => self.boid_max_speed,
            AgentKind::Ant => self.ant_max_speed,
            AgentKind::Fish(FishSize::Small) => self.small_fish_speed,
            AgentKind::Fish(FishSize::Medium) => self.medium_fish_speed,
            AgentKind::Fish(FishSize::Large) => self.large_fish_speed,
            AgentKind::Predator => self.predator_speed,
        }
        .max(0.0)
    }

    pub fn fear_multiplier(&self, size: FishSize) -> f32 {
        match size {
            FishSize::Small => self.small_fish_fear,
            FishSize::Medium => self.medium_fish_fear,
            FishSize::Large => self.large_fish_fear,
        }
    }

    pub fn target_count(&self, kind: AgentKind) -> usize {
        match kind {
            AgentKind::Boid => self.boid_count,
            AgentKind::Ant => self.ant_count,
            AgentKind::Fish(FishSize::Small) => self.small_fish_count,
            AgentKind::Fish(FishSize::Medium) => self.medium_fish_count,
            AgentKind::Fish(FishSize::Large) => self.large_fish_count,
            AgentKind::Predator => self.predator_count,
        }
    }

    pub fn set_target_count(&mut self, kind: AgentKind, count: usize) {
        let slot = match kind {
            AgentKind::Boid => &mut self.boid_count,
            AgentKind::Ant => &mut self.ant_count,
            AgentKind::Fish(FishSize::Small) => &mut self.small_fish_count,
            AgentKind::Fish(FishSize::Medium) => &mut self.medium_fish_count,
            AgentKind::Fish(FishSize::Large) => &mut self.large_fish_count,
            AgentKind::Predator => &mut self.predator_count,
        };
        *slot = count;
    }

    // Count parameter name for a kind, if the name refers to one
    pub fn count_kind(name: &str) -> Option<AgentKind> {
        match name {
            "boid_count" => Some(AgentKind::Boid),
            "ant_count" => Some(AgentKind::Ant),
            "small_fish_count" => Some(AgentKind::Fish(FishSize::Small)),
            "medium_fish_count" => Some(AgentKind::Fish(FishSize::Medium)),
            "large_fish_count" => Some(AgentKind::Fish(FishSize::Large)),
            "predator_count" => Some(AgentKind::Predator),
            _ => None,
        }
    }

    // Ticks a trail point stays visible
    pub fn trail_fade_ticks(&self) -> f32 {
        (self.trail_fade_secs * self.frame_rate).max(1.0)
    }

    // Parameter ranges for UI sliders
    pub fn get_count_range() -> std::ops::RangeInclusive<usize> {
        0..=600
    }

    pub fn get_max_speed_range() -> std::ops::RangeInclusive<f32> {
        0.5..=10.0
    }

    pub fn get_force_range() -> std::ops::RangeInclusive<f32> {
        0.01..=1.0
    }

    pub fn get_weight_range() -> std::ops::RangeInclusive<f32> {
        0.0..=3.0
    }

    pub fn get_radius_range() -> std::ops::RangeInclusive<f32> {
        5.0..=250.0
    }

    pub fn get_rate_range() -> std::ops::RangeInclusive<f32> {
        0.0..=0.2
    }

    pub fn get_probability_range() -> std::ops::RangeInclusive<f32> {
        0.0..=1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_round_trip_names() {
        let mut config = SimulationConfig::default();
        config.set_parameter("cohesion_weight", ParamValue::Float(2.5)).unwrap();
        assert_eq!(config.cohesion_weight, 2.5);
        assert_eq!(config.get_parameter("cohesion_weight"), Some(ParamValue::Float(2.5)));
        assert!(SimulationConfig::PARAMETER_NAMES.contains(&"decay_rate"));
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        let mut config = SimulationConfig::default();
        config.set_parameter("boid_count", ParamValue::Int(-12)).unwrap();
        assert_eq!(config.boid_count, 0);
        config.set_parameter("boid_count", ParamValue::Float(-3.0)).unwrap();
        assert_eq!(config.boid_count, 0);
        config.set_parameter("boid_count", ParamValue::Float(41.6)).unwrap();
        assert_eq!(config.boid_count, 42);
    }

    #[test]
    fn negative_weights_are_accepted() {
        let mut config = SimulationConfig::default();
        assert!(config.set_parameter("separation_weight", ParamValue::Float(-1.0)).is_ok());
        assert_eq!(config.separation_weight, -1.0);
    }

    #[test]
    fn unknown_and_mistyped_parameters_are_rejected() {
        let mut config = SimulationConfig::default();
        assert_eq!(
            config.set_parameter("warp_factor", ParamValue::Float(9.0)),
            Err(ParamError::Unknown("warp_factor".to_string()))
        );
        assert!(matches!(
            config.set_parameter("max_force", ParamValue::Bool(true)),
            Err(ParamError::TypeMismatch { .. })
        ));
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn changes_lists_only_edited_fields() {
        let live = SimulationConfig::default();
        let mut edited = live.clone();
        edited.show_field = false;
        edited.ant_count = 10;
        let changes = live.changes(&edited);
        assert_eq!(
            changes,
            vec![("ant_count", ParamValue::Int(10)), ("show_field", ParamValue::Bool(false))]
        );
    }

    #[test]
    fn toml_overrides_keep_defaults() {
        let config = SimulationConfig::from_toml_str(
            "variant = \"aquarium\"\npredator_count = 5\nboundary = \"wrap\"\n",
        )
        .unwrap();
        assert_eq!(config.variant, Variant::Aquarium);
        assert_eq!(config.predator_count, 5);
        assert_eq!(config.boundary_policy(), BoundaryPolicy::Wrap);
        assert_eq!(config.small_fish_count, SimulationConfig::default().small_fish_count);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            SimulationConfig::from_toml_str("boid_count = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn boundary_defaults_follow_variant() {
        assert_eq!(SimulationConfig::for_variant(Variant::Boids).boundary_policy(), BoundaryPolicy::Wrap);
        assert_eq!(SimulationConfig::for_variant(Variant::Aquarium).boundary_policy(), BoundaryPolicy::Repel);
        assert_eq!(SimulationConfig::for_variant(Variant::AntColony).boundary_policy(), BoundaryPolicy::Repel);
    }
}
