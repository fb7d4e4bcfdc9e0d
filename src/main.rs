/*
 * Swarm Simulation
 *
 * Three steering simulations in one window:
 * 1. Boids: separation, alignment and cohesion with wrap-around edges
 * 2. Ant colony: pheromone trails between a nest and food sources
 * 3. Aquarium: schooling fish fleeing predators and chasing food pellets
 *
 * Usage: swarmsim [config.toml]
 * Log verbosity follows RUST_LOG (default: info).
 */

use swarmsim::app::{model, update};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    nannou::app(model).update(update).run();
}
