//! Reinforcement learning environment for multi-agent Snake
//!
//! Provides:
//! - Grid observations (food channel plus one channel per snake)
//! - Burn-compatible multi-agent environment interface
//! - Backend-agnostic tensor operations

pub mod backend;
pub mod environment;
pub mod observation;

pub use backend::{InferenceBackend, default_device};
pub use environment::{GymStep, SnakeGym};
pub use observation::{ObservationType, create_observation, observation_shape};
