//! Core game logic for multi-agent Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Every snake moves at once each turn; the engine resolves the turn and reports
//! per-snake rewards, done flags and collision outcomes.

pub mod action;
pub mod collision;
pub mod config;
pub mod engine;
pub mod food;
pub mod rewards;
pub mod snakes;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use collision::{CollisionOutcome, CollisionResolver};
pub use config::GameConfig;
pub use engine::{GameEngine, StepInfo, StepResult};
pub use food::{FoodConfig, FoodLedger};
pub use rewards::{RewardEvent, RewardPolicy, SimpleRewards};
pub use snakes::{Snake, SnakeStore};
pub use state::{GameState, InitialState, OccupancyMap, Position, SnakeLayout};
