//! Collision resolution for one fully moved turn
//!
//! The resolver only borrows the snake store, so every snake is judged
//! against the same post-move board. Kills are applied by the caller once
//! all outcomes are known, which keeps results independent of the order the
//! snakes are visited in.

use serde::{Deserialize, Serialize};

use super::{rewards::RewardEvent, snakes::SnakeStore};

/// What happened to a snake after everyone moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollisionOutcome {
    HitWall,
    /// Lost a head-on collision on a shared tile
    EatenSameTile,
    /// Lost a head-on collision after swapping tiles with the other head
    EatenAdjacentTile,
    HitSelfBody,
    HitOtherBody,
    NoCollision,
    /// Won a head-on collision against a shorter snake
    AteOtherSnake,
    /// Another snake ran into this snake's body
    OtherSnakeHitBody,
}

impl CollisionOutcome {
    pub const ALL: [CollisionOutcome; 8] = [
        CollisionOutcome::HitWall,
        CollisionOutcome::EatenSameTile,
        CollisionOutcome::EatenAdjacentTile,
        CollisionOutcome::HitSelfBody,
        CollisionOutcome::HitOtherBody,
        CollisionOutcome::NoCollision,
        CollisionOutcome::AteOtherSnake,
        CollisionOutcome::OtherSnakeHitBody,
    ];

    /// Whether this outcome kills the snake it was reported for
    pub fn is_fatal(&self) -> bool {
        match self {
            CollisionOutcome::HitWall
            | CollisionOutcome::EatenSameTile
            | CollisionOutcome::EatenAdjacentTile
            | CollisionOutcome::HitSelfBody
            | CollisionOutcome::HitOtherBody => true,
            CollisionOutcome::NoCollision
            | CollisionOutcome::AteOtherSnake
            | CollisionOutcome::OtherSnakeHitBody => false,
        }
    }

    /// Reward event emitted for this outcome, if any
    pub fn reward_event(&self) -> Option<RewardEvent> {
        match self {
            CollisionOutcome::HitWall => Some(RewardEvent::HitWall),
            CollisionOutcome::EatenSameTile | CollisionOutcome::EatenAdjacentTile => {
                Some(RewardEvent::WasEaten)
            }
            CollisionOutcome::HitSelfBody => Some(RewardEvent::HitSelf),
            CollisionOutcome::HitOtherBody => Some(RewardEvent::HitOtherSnake),
            CollisionOutcome::OtherSnakeHitBody => Some(RewardEvent::OtherSnakeHitBody),
            CollisionOutcome::AteOtherSnake => Some(RewardEvent::AteAnotherSnake),
            CollisionOutcome::NoCollision => None,
        }
    }
}

/// Read-only view of the moved board used to classify every live snake
pub struct CollisionResolver<'a> {
    snakes: &'a SnakeStore,
    grid_width: usize,
    grid_height: usize,
}

impl<'a> CollisionResolver<'a> {
    pub fn new(snakes: &'a SnakeStore, grid_width: usize, grid_height: usize) -> Self {
        Self {
            snakes,
            grid_width,
            grid_height,
        }
    }

    /// Live snakes other than `id`
    fn others(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.snakes
            .iter()
            .filter(move |other| other.alive && other.id != id)
            .map(|other| other.id)
    }

    /// Head-on result for `id` against every snake in `rivals`
    ///
    /// `id` survives only if it is strictly longer than all of them, so a tie
    /// kills both snakes. `None` when there are no rivals.
    fn head_on(
        &self,
        id: usize,
        rivals: &[usize],
        eaten: CollisionOutcome,
    ) -> Option<(bool, CollisionOutcome)> {
        if rivals.is_empty() {
            return None;
        }
        let len = self.snakes.body(id).len();
        if rivals.iter().any(|&other| self.snakes.body(other).len() >= len) {
            Some((true, eaten))
        } else {
            Some((false, CollisionOutcome::AteOtherSnake))
        }
    }

    /// Classify a single snake; returns (should_kill, outcome)
    ///
    /// Checks run in a fixed priority and the first match wins.
    pub fn resolve(&self, id: usize) -> (bool, CollisionOutcome) {
        let head = self.snakes.head(id);

        let on_board = head.x >= 0
            && head.y >= 0
            && (head.x as usize) < self.grid_width
            && (head.y as usize) < self.grid_height;
        if !on_board {
            return (true, CollisionOutcome::HitWall);
        }

        let same_tile: Vec<usize> = self
            .others(id)
            .filter(|&other| self.snakes.head(other) == head)
            .collect();
        if let Some(verdict) = self.head_on(id, &same_tile, CollisionOutcome::EatenSameTile) {
            return verdict;
        }

        let previous_head = self.snakes.previous_head(id);
        let swapped: Vec<usize> = self
            .others(id)
            .filter(|&other| {
                let other_head = self.snakes.head(other);
                head.manhattan_distance(other_head) == 1
                    && head == self.snakes.previous_head(other)
                    && other_head == previous_head
            })
            .collect();
        if let Some(verdict) = self.head_on(id, &swapped, CollisionOutcome::EatenAdjacentTile) {
            return verdict;
        }

        let body = self.snakes.body_segments(id);
        if body.contains(&head) {
            return (true, CollisionOutcome::HitSelfBody);
        }

        let others_map = self
            .snakes
            .occupancy_map(self.grid_width, self.grid_height, &[id]);
        if others_map.is_occupied(head) {
            return (true, CollisionOutcome::HitOtherBody);
        }

        if self.others(id).any(|other| body.contains(&self.snakes.head(other))) {
            return (false, CollisionOutcome::OtherSnakeHitBody);
        }

        (false, CollisionOutcome::NoCollision)
    }

    /// Classify every live snake, in id order
    pub fn resolve_all(&self) -> Vec<(usize, bool, CollisionOutcome)> {
        self.snakes
            .iter()
            .filter(|snake| snake.alive)
            .map(|snake| {
                let (kill, outcome) = self.resolve(snake.id);
                (snake.id, kill, outcome)
            })
            .collect()
    }
}
