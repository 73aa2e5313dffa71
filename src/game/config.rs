use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::{food::FoodConfig, rewards::SimpleRewards, state::Position};
use crate::error::{GameError, Result};

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Number of snakes competing on the board
    pub number_of_snakes: usize,
    /// Initial length of every snake
    pub initial_snake_length: usize,
    /// Health after spawning or eating
    pub max_health: u32,
    /// Fixed spawn cells, one per snake; empty means random spawns
    pub snake_spawn_locations: Vec<Position>,
    /// Seed for the engine RNG; `None` seeds from entropy
    pub seed: Option<u64>,
    pub food: FoodConfig,
    pub rewards: SimpleRewards,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 15,
            grid_height: 15,
            number_of_snakes: 4,
            initial_snake_length: 3,
            max_health: 100,
            snake_spawn_locations: Vec::new(),
            seed: None,
            food: FoodConfig::default(),
            rewards: SimpleRewards::default(),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size and snake count
    pub fn new(width: usize, height: usize, number_of_snakes: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            number_of_snakes,
            ..Default::default()
        }
    }

    /// Create a small two-snake grid for testing
    pub fn small() -> Self {
        Self::new(7, 7, 2)
    }

    /// Single snake on its own board
    pub fn solo(width: usize, height: usize) -> Self {
        Self::new(width, height, 1)
    }

    /// Fix the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot describe a playable game
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(GameError::InvalidConfig(msg));

        if self.grid_width == 0 || self.grid_height == 0 {
            return invalid(format!(
                "grid must be non-empty, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }
        if self.number_of_snakes == 0 {
            return invalid("at least one snake is required".to_string());
        }
        if self.number_of_snakes > self.grid_width * self.grid_height {
            return invalid(format!(
                "{} snakes do not fit on a {}x{} grid",
                self.number_of_snakes, self.grid_width, self.grid_height
            ));
        }
        if self.initial_snake_length == 0 {
            return invalid("initial snake length must be positive".to_string());
        }
        if self.max_health == 0 {
            return invalid("max health must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.food.spawn_chance) {
            return invalid(format!(
                "food spawn chance {} is outside [0, 1]",
                self.food.spawn_chance
            ));
        }

        if !self.snake_spawn_locations.is_empty() {
            if self.snake_spawn_locations.len() != self.number_of_snakes {
                return invalid(format!(
                    "{} spawn locations given for {} snakes",
                    self.snake_spawn_locations.len(),
                    self.number_of_snakes
                ));
            }
            let mut seen = self.snake_spawn_locations.clone();
            seen.sort();
            seen.dedup();
            if seen.len() != self.snake_spawn_locations.len() {
                return invalid("snake spawn locations must be distinct".to_string());
            }
        }

        let out_of_bounds = self
            .snake_spawn_locations
            .iter()
            .chain(&self.food.spawn_locations)
            .find(|pos| !self.contains(**pos));
        if let Some(pos) = out_of_bounds {
            return invalid(format!("spawn location {:?} is off the board", pos));
        }

        Ok(())
    }

    /// Whether `pos` lies on the configured board
    pub(crate) fn contains(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.grid_width
            && (pos.y as usize) < self.grid_height
    }

    /// Food placed at reset
    pub fn initial_food(&self) -> usize {
        self.food.initial_food.unwrap_or(self.number_of_snakes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 15);
        assert_eq!(config.number_of_snakes, 4);
        assert_eq!(config.initial_snake_length, 3);
        assert_eq!(config.max_health, 100);
        assert_eq!(config.initial_food(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(11, 9, 2).with_seed(5);
        assert_eq!(config.grid_width, 11);
        assert_eq!(config.grid_height, 9);
        assert_eq!(config.number_of_snakes, 2);
        assert_eq!(config.seed, Some(5));
    }

    #[test]
    fn test_validation_rejects_bad_configs() {
        assert!(GameConfig::new(0, 5, 1).validate().is_err());
        assert!(GameConfig::new(5, 5, 0).validate().is_err());
        assert!(GameConfig::new(2, 2, 5).validate().is_err());

        let mut config = GameConfig::small();
        config.snake_spawn_locations = vec![Position::new(1, 1)];
        assert!(config.validate().is_err());

        config.snake_spawn_locations = vec![Position::new(1, 1), Position::new(1, 1)];
        assert!(config.validate().is_err());

        config.snake_spawn_locations = vec![Position::new(1, 1), Position::new(7, 1)];
        assert!(config.validate().is_err());

        let mut config = GameConfig::small();
        config.food.spawn_chance = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"grid_width": 11, "number_of_snakes": 2, "seed": 9}"#)
                .unwrap();
        assert_eq!(config.grid_width, 11);
        assert_eq!(config.grid_height, 15);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.food, FoodConfig::default());
    }
}
