//! Snake Gym - a multi-agent Snake environment for reinforcement learning
//!
//! This library provides:
//! - Core game logic with simultaneous-move turn resolution (game module)
//! - Tensor observations and a multi-agent RL interface (rl module)
//! - Episode statistics (metrics module)

pub mod error;
pub mod game;
pub mod metrics;
pub mod rl;

pub use error::{GameError, Result};
