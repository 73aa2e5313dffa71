//! Error type shared by the game engine and the environment wrapper

use thiserror::Error;

/// Errors surfaced by the gym
///
/// Every variant is terminal to the call that produced it: a turn is either
/// resolved completely or not applied at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// An action index outside the discrete action space `0..=3`
    #[error("invalid action {action} for snake {snake_id}: expected 0..=3")]
    InvalidAction { snake_id: usize, action: usize },

    /// The action list does not cover every snake
    #[error("expected {expected} actions (one per snake), got {got}")]
    ActionCountMismatch { expected: usize, got: usize },

    /// An initial state was built for a different board size
    #[error("initial state map size {got:?} does not match configured {expected:?}")]
    MapSizeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// An initial state carries a different number of snakes
    #[error("initial state has {got} snakes but {expected} are configured")]
    SnakeCountMismatch { expected: usize, got: usize },

    /// The configuration cannot describe a playable game
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Not enough free cells to place every snake
    #[error("only {0} spawn cells available")]
    NoSpawnRoom(usize),
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, GameError>;
