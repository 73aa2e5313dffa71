//! Reward events and pluggable reward policies

use std::fmt;

use serde::{Deserialize, Serialize};

/// Everything that can happen to a snake during a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardEvent {
    Starved,
    ForbiddenMove,
    AteFood,
    HitWall,
    WasEaten,
    HitSelf,
    HitOtherSnake,
    OtherSnakeHitBody,
    AteAnotherSnake,
    AnotherTurn,
    Won,
    Died,
}

impl RewardEvent {
    pub const ALL: [RewardEvent; 12] = [
        RewardEvent::Starved,
        RewardEvent::ForbiddenMove,
        RewardEvent::AteFood,
        RewardEvent::HitWall,
        RewardEvent::WasEaten,
        RewardEvent::HitSelf,
        RewardEvent::HitOtherSnake,
        RewardEvent::OtherSnakeHitBody,
        RewardEvent::AteAnotherSnake,
        RewardEvent::AnotherTurn,
        RewardEvent::Won,
        RewardEvent::Died,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RewardEvent::Starved => "starved",
            RewardEvent::ForbiddenMove => "forbidden_move",
            RewardEvent::AteFood => "ate_food",
            RewardEvent::HitWall => "hit_wall",
            RewardEvent::WasEaten => "was_eaten",
            RewardEvent::HitSelf => "hit_self",
            RewardEvent::HitOtherSnake => "hit_other_snake",
            RewardEvent::OtherSnakeHitBody => "other_snake_hit_body",
            RewardEvent::AteAnotherSnake => "ate_another_snake",
            RewardEvent::AnotherTurn => "another_turn",
            RewardEvent::Won => "won",
            RewardEvent::Died => "died",
        }
    }
}

impl fmt::Display for RewardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps an event for a snake to a scalar reward
///
/// Implementations are pure: the same arguments always give the same reward.
pub trait RewardPolicy {
    fn reward(&self, event: RewardEvent, snake_id: usize, episode: Option<usize>) -> f32;
}

impl<F> RewardPolicy for F
where
    F: Fn(RewardEvent, usize, Option<usize>) -> f32,
{
    fn reward(&self, event: RewardEvent, snake_id: usize, episode: Option<usize>) -> f32 {
        self(event, snake_id, episode)
    }
}

/// Fixed reward per event, the same for every snake and episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleRewards {
    pub starved: f32,
    pub forbidden_move: f32,
    pub ate_food: f32,
    pub hit_wall: f32,
    pub was_eaten: f32,
    pub hit_self: f32,
    pub hit_other_snake: f32,
    pub other_snake_hit_body: f32,
    pub ate_another_snake: f32,
    pub another_turn: f32,
    pub won: f32,
    pub died: f32,
}

impl Default for SimpleRewards {
    fn default() -> Self {
        Self {
            starved: -1.0,
            forbidden_move: -1.0,
            ate_food: 0.0,
            hit_wall: -1.0,
            was_eaten: -1.0,
            hit_self: -1.0,
            hit_other_snake: -1.0,
            other_snake_hit_body: 0.0,
            ate_another_snake: 0.0,
            another_turn: 1.0,
            won: 2.0,
            died: -1.0,
        }
    }
}

impl RewardPolicy for SimpleRewards {
    fn reward(&self, event: RewardEvent, _snake_id: usize, _episode: Option<usize>) -> f32 {
        match event {
            RewardEvent::Starved => self.starved,
            RewardEvent::ForbiddenMove => self.forbidden_move,
            RewardEvent::AteFood => self.ate_food,
            RewardEvent::HitWall => self.hit_wall,
            RewardEvent::WasEaten => self.was_eaten,
            RewardEvent::HitSelf => self.hit_self,
            RewardEvent::HitOtherSnake => self.hit_other_snake,
            RewardEvent::OtherSnakeHitBody => self.other_snake_hit_body,
            RewardEvent::AteAnotherSnake => self.ate_another_snake,
            RewardEvent::AnotherTurn => self.another_turn,
            RewardEvent::Won => self.won,
            RewardEvent::Died => self.died,
        }
    }
}
