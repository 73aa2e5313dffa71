//! Food ledger and spawning policy

use std::collections::{BTreeSet, VecDeque};

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use super::state::{OccupancyMap, Position};

/// Food spawning policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    /// Food placed at reset; `None` places one item per snake
    pub initial_food: Option<usize>,
    /// Food is topped up to this count at the end of every turn
    pub minimum_food: usize,
    /// Chance of one extra item per turn once the minimum is met
    pub spawn_chance: f64,
    /// Coordinates used for spawning, in order, before falling back to random cells
    pub spawn_locations: Vec<Position>,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            initial_food: None,
            minimum_food: 1,
            spawn_chance: 0.15,
            spawn_locations: Vec::new(),
        }
    }
}

/// Set of food coordinates on the board
#[derive(Debug, Clone, PartialEq)]
pub struct FoodLedger {
    locations: BTreeSet<Position>,
    forced: VecDeque<Position>,
    config: FoodConfig,
    grid_width: usize,
    grid_height: usize,
}

impl FoodLedger {
    /// Create an empty ledger
    pub fn new(grid_width: usize, grid_height: usize, config: FoodConfig) -> Self {
        let forced = config.spawn_locations.iter().copied().collect();
        Self {
            locations: BTreeSet::new(),
            forced,
            config,
            grid_width,
            grid_height,
        }
    }

    pub fn has_food(&self, pos: Position) -> bool {
        self.locations.contains(&pos)
    }

    /// Remove food from a cell; returns false if there was none
    pub fn remove(&mut self, pos: Position) -> bool {
        self.locations.remove(&pos)
    }

    /// Place food on a cell; returns false if the cell already had food
    pub fn insert(&mut self, pos: Position) -> bool {
        self.locations.insert(pos)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.locations.iter()
    }

    /// Spawn up to `count` items; returns how many were placed
    ///
    /// Forced locations are consumed first. Food never lands on an occupied
    /// cell or on existing food.
    pub fn spawn_food<R: Rng + ?Sized>(
        &mut self,
        occupancy: &OccupancyMap,
        count: usize,
        rng: &mut R,
    ) -> usize {
        let mut placed = 0;
        while placed < count {
            let Some(pos) = self.next_location(occupancy, rng) else {
                break;
            };
            self.locations.insert(pos);
            tracing::trace!(x = pos.x, y = pos.y, "spawned food");
            placed += 1;
        }
        placed
    }

    fn next_location<R: Rng + ?Sized>(
        &mut self,
        occupancy: &OccupancyMap,
        rng: &mut R,
    ) -> Option<Position> {
        while let Some(pos) = self.forced.pop_front() {
            if self.is_free(occupancy, pos) {
                return Some(pos);
            }
        }

        let free: Vec<Position> = occupancy
            .free_cells()
            .filter(|pos| !self.locations.contains(pos))
            .collect();
        free.choose(rng).copied()
    }

    fn is_free(&self, occupancy: &OccupancyMap, pos: Position) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.grid_width
            && (pos.y as usize) < self.grid_height
            && !occupancy.is_occupied(pos)
            && !self.locations.contains(&pos)
    }

    /// Turn-end replenishment, called once per resolved turn
    ///
    /// Tops the board up to `minimum_food`, otherwise rolls `spawn_chance` for
    /// one extra item. Nothing spawns once every snake is dead.
    pub fn end_of_turn<R: Rng + ?Sized>(
        &mut self,
        occupancy: &OccupancyMap,
        eaten: usize,
        alive: usize,
        rng: &mut R,
    ) {
        if alive == 0 {
            return;
        }

        let missing = self.config.minimum_food.saturating_sub(self.locations.len());
        let placed = if missing > 0 {
            self.spawn_food(occupancy, missing, rng)
        } else if rng.gen_bool(self.config.spawn_chance.clamp(0.0, 1.0)) {
            self.spawn_food(occupancy, 1, rng)
        } else {
            0
        };

        tracing::trace!(eaten, alive, placed, remaining = self.locations.len(), "food turn end");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_insert_and_remove() {
        let mut food = FoodLedger::new(5, 5, FoodConfig::default());
        assert!(food.insert(Position::new(1, 1)));
        assert!(!food.insert(Position::new(1, 1)));
        assert_eq!(food.len(), 1);
        assert!(food.has_food(Position::new(1, 1)));

        assert!(food.remove(Position::new(1, 1)));
        assert!(!food.remove(Position::new(1, 1)));
        assert!(food.is_empty());
    }

    #[test]
    fn test_spawn_avoids_occupied_cells() {
        let mut occupancy = OccupancyMap::new(2, 2);
        occupancy.mark(Position::new(0, 0));
        occupancy.mark(Position::new(1, 0));
        occupancy.mark(Position::new(0, 1));

        let mut food = FoodLedger::new(2, 2, FoodConfig::default());
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(food.spawn_food(&occupancy, 3, &mut rng), 1);
        assert!(food.has_food(Position::new(1, 1)));
    }

    #[test]
    fn test_forced_locations_come_first() {
        let config = FoodConfig {
            spawn_locations: vec![Position::new(2, 2), Position::new(0, 0)],
            ..Default::default()
        };
        let mut occupancy = OccupancyMap::new(5, 5);
        occupancy.mark(Position::new(0, 0));

        let mut food = FoodLedger::new(5, 5, config);
        let mut rng = StdRng::seed_from_u64(3);
        food.spawn_food(&occupancy, 1, &mut rng);
        assert!(food.has_food(Position::new(2, 2)));

        // (0, 0) is occupied, so the next item is random
        food.spawn_food(&occupancy, 1, &mut rng);
        assert_eq!(food.len(), 2);
        assert!(!food.has_food(Position::new(0, 0)));
    }

    #[test]
    fn test_end_of_turn_tops_up_minimum() {
        let config = FoodConfig {
            minimum_food: 3,
            spawn_chance: 0.0,
            ..Default::default()
        };
        let occupancy = OccupancyMap::new(5, 5);
        let mut food = FoodLedger::new(5, 5, config);
        let mut rng = StdRng::seed_from_u64(11);

        food.end_of_turn(&occupancy, 0, 2, &mut rng);
        assert_eq!(food.len(), 3);

        // Minimum met and no spawn chance: nothing changes
        food.end_of_turn(&occupancy, 0, 2, &mut rng);
        assert_eq!(food.len(), 3);
    }

    #[test]
    fn test_end_of_turn_spawn_chance() {
        let config = FoodConfig {
            minimum_food: 0,
            spawn_chance: 1.0,
            ..Default::default()
        };
        let occupancy = OccupancyMap::new(5, 5);
        let mut food = FoodLedger::new(5, 5, config);
        let mut rng = StdRng::seed_from_u64(11);

        food.end_of_turn(&occupancy, 1, 1, &mut rng);
        assert_eq!(food.len(), 1);
    }

    #[test]
    fn test_no_spawn_when_everyone_is_dead() {
        let occupancy = OccupancyMap::new(5, 5);
        let mut food = FoodLedger::new(5, 5, FoodConfig::default());
        let mut rng = StdRng::seed_from_u64(11);

        food.end_of_turn(&occupancy, 0, 0, &mut rng);
        assert!(food.is_empty());
    }
}
