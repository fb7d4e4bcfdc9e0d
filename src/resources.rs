/*
 * Resources Module
 *
 * Non-agent entities the agents react to: food sources for the ants,
 * sinking food pellets in the aquarium, the ant nest and user-placed
 * obstacles. Quantities stay within [0, max]; depleted or expired items
 * are removed at the end of each tick.
 */

use nannou::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FoodKind {
    // Stationary pile placed by the user
    Source,
    // Falls at a constant speed until it lands or expires
    Pellet { age: u32, lifetime: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub position: Vec2,
    pub quantity: u32,
    pub max_quantity: u32,
    pub kind: FoodKind,
}

impl Food {
    pub fn source(position: Vec2, quantity: u32) -> Self {
        Self {
            position,
            quantity,
            max_quantity: quantity,
            kind: FoodKind::Source,
        }
    }

    pub fn pellet(position: Vec2, lifetime: u32) -> Self {
        Self {
            position,
            quantity: 1,
            max_quantity: 1,
            kind: FoodKind::Pellet { age: 0, lifetime },
        }
    }

    // Take one unit; false if already empty
    pub fn take(&mut self) -> bool {
        if self.quantity == 0 {
            return false;
        }
        self.quantity -= 1;
        true
    }

    pub fn fill_ratio(&self) -> f32 {
        if self.max_quantity == 0 {
            0.0
        } else {
            self.quantity as f32 / self.max_quantity as f32
        }
    }

    pub fn is_gone(&self) -> bool {
        match self.kind {
            FoodKind::Source => self.quantity == 0,
            FoodKind::Pellet { age, lifetime } => self.quantity == 0 || age >= lifetime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nest {
    pub position: Vec2,
    pub radius: f32,
    pub delivered: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub position: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resources {
    pub food: Vec<Food>,
    pub nest: Option<Nest>,
    pub obstacles: Vec<Obstacle>,
}

impl Resources {
    pub fn clear(&mut self) {
        self.food.clear();
        self.nest = None;
        self.obstacles.clear();
    }

    // Index and distance of the closest non-empty food within `radius`
    pub fn nearest_food(&self, position: Vec2, radius: f32) -> Option<(usize, f32)> {
        let radius_sq = radius * radius;
        self.food
            .iter()
            .enumerate()
            .filter(|(_, f)| f.quantity > 0)
            .map(|(i, f)| (i, position.distance_squared(f.position)))
            .filter(|&(_, d_sq)| d_sq < radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, d_sq)| (i, d_sq.sqrt()))
    }

    // Advance pellets: sink toward `floor_y`, age, then drop anything depleted or expired
    pub fn tick(&mut self, fall_speed: f32, floor_y: f32) {
        for food in &mut self.food {
            if let FoodKind::Pellet { age, .. } = &mut food.kind {
                *age = age.saturating_add(1);
                food.position.y = (food.position.y - fall_speed).max(floor_y);
            }
        }
        self.food.retain(|f| !f.is_gone());
    }

    pub fn food_remaining(&self) -> u64 {
        self.food.iter().map(|f| f.quantity as u64).sum()
    }

    pub fn pellet_count(&self) -> usize {
        self.food
            .iter()
            .filter(|f| matches!(f.kind, FoodKind::Pellet { .. }))
            .count()
    }
}
