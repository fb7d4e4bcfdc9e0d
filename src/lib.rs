/*
 * Swarm Simulation - Module Definitions
 *
 * Core (headless, testable without a window):
 *   vector, spatial_grid, agent, steering, physics, field, resources,
 *   population, params, error, debug, simulation, renderer
 *
 * Surface (nannou window, egui panel, camera and pointer input):
 *   camera, culling, input, ui, app
 */

// Re-export key components for easier access
pub use agent::{Agent, AgentKind, FishSize, Role};
pub use debug::{DebugInfo, Statistics};
pub use error::{ConfigError, ParamError};
pub use field::{Channel, FieldGrid};
pub use params::{BoundaryPolicy, ParamValue, SimulationConfig, Variant};
pub use population::{AgentPopulation, SpawnAnchor};
pub use renderer::{Primitive, RenderSnapshot};
pub use simulation::{InteractionKind, LoopState, Simulation};
pub use spatial_grid::SpatialGrid;

// Define modules
pub mod agent;
pub mod app;
pub mod camera;
pub mod culling;
pub mod debug;
pub mod error;
pub mod field;
pub mod input;
pub mod params;
pub mod physics;
pub mod population;
pub mod renderer;
pub mod resources;
pub mod simulation;
pub mod spatial_grid;
pub mod steering;
pub mod ui;
pub mod vector;
