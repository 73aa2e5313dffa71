//! Snake bodies and movement primitives
//!
//! Snakes live in a dense arena indexed by their id. A dead snake stays in the
//! arena with a frozen body so ids, reward vectors and info maps line up for
//! the whole episode.

use rand::{Rng, seq::SliceRandom};

use super::{
    action::Direction,
    state::{OccupancyMap, Position},
};
use crate::error::{GameError, Result};

/// A single snake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    pub id: usize,
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    pub health: u32,
    pub alive: bool,
    pub ate_food_this_turn: bool,
    /// Head position before the latest move
    pub previous_head: Position,
}

impl Snake {
    /// Create a snake with every segment stacked on the spawn cell
    pub fn new(id: usize, spawn: Position, length: usize, health: u32) -> Self {
        Self::from_body(id, vec![spawn; length.max(1)], health)
    }

    /// Create a snake from an explicit body, head first
    pub fn from_body(id: usize, body: Vec<Position>, health: u32) -> Self {
        let previous_head = body[0];
        Self {
            id,
            body,
            health,
            alive: true,
            ate_food_this_turn: false,
            previous_head,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Moving in `direction` would put the head back onto the neck
    ///
    /// Stacked spawn segments do not count as a neck.
    pub fn is_forbidden(&self, direction: Direction) -> bool {
        let target = self.head().moved_in_direction(direction);
        self.body
            .get(1)
            .is_some_and(|&neck| neck != self.head() && neck == target)
    }

    /// Move one cell, dropping the tail; returns true if the move was forbidden
    ///
    /// A forbidden move leaves the body untouched.
    pub fn apply_move(&mut self, direction: Direction) -> bool {
        self.previous_head = self.head();
        if self.is_forbidden(direction) {
            return true;
        }

        let new_head = self.head().moved_in_direction(direction);
        self.body.insert(0, new_head);
        self.body.pop();
        false
    }

    /// Extend the snake by duplicating its tail segment
    pub fn grow(&mut self) {
        if let Some(&tail) = self.body.last() {
            self.body.push(tail);
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Arena of every snake in the episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnakeStore {
    snakes: Vec<Snake>,
    max_health: u32,
}

impl SnakeStore {
    pub fn new(snakes: Vec<Snake>, max_health: u32) -> Self {
        Self { snakes, max_health }
    }

    /// Spawn `count` snakes at the given locations, or at distinct random
    /// cells when `locations` is empty
    pub fn spawn<R: Rng + ?Sized>(
        grid_width: usize,
        grid_height: usize,
        count: usize,
        length: usize,
        max_health: u32,
        locations: &[Position],
        rng: &mut R,
    ) -> Result<Self> {
        let spawns: Vec<Position> = if locations.is_empty() {
            let cells: Vec<Position> = OccupancyMap::new(grid_width, grid_height)
                .free_cells()
                .collect();
            if count > cells.len() {
                return Err(GameError::NoSpawnRoom(cells.len()));
            }
            cells.choose_multiple(rng, count).copied().collect()
        } else {
            locations.iter().take(count).copied().collect()
        };

        if spawns.len() < count {
            return Err(GameError::NoSpawnRoom(spawns.len()));
        }

        let snakes = spawns
            .into_iter()
            .enumerate()
            .map(|(id, spawn)| Snake::new(id, spawn, length, max_health))
            .collect();

        Ok(Self::new(snakes, max_health))
    }

    pub fn len(&self) -> usize {
        self.snakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snakes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snake> {
        self.snakes.iter()
    }

    pub fn get(&self, id: usize) -> Option<&Snake> {
        self.snakes.get(id)
    }

    pub fn alive_count(&self) -> usize {
        self.snakes.iter().filter(|snake| snake.alive).count()
    }

    pub fn is_alive(&self, id: usize) -> bool {
        self.snakes[id].alive
    }

    pub fn head(&self, id: usize) -> Position {
        self.snakes[id].head()
    }

    pub fn previous_head(&self, id: usize) -> Position {
        self.snakes[id].previous_head
    }

    pub fn body(&self, id: usize) -> &[Position] {
        &self.snakes[id].body
    }

    /// Body of snake `id` without its head
    pub fn body_segments(&self, id: usize) -> &[Position] {
        self.snakes[id].body_segments()
    }

    /// Apply a move to a snake; returns true if the move was forbidden
    pub fn apply_move(&mut self, id: usize, direction: Direction) -> bool {
        self.snakes[id].apply_move(direction)
    }

    pub fn grow(&mut self, id: usize) {
        self.snakes[id].grow();
    }

    pub fn kill(&mut self, id: usize) {
        self.snakes[id].alive = false;
    }

    /// Take one point of health; returns the remaining health
    pub fn decay_health(&mut self, id: usize) -> u32 {
        let snake = &mut self.snakes[id];
        snake.health = snake.health.saturating_sub(1);
        snake.health
    }

    /// Mark a snake as fed: health back to maximum
    pub fn set_ate_food(&mut self, id: usize) {
        let max_health = self.max_health;
        let snake = &mut self.snakes[id];
        snake.ate_food_this_turn = true;
        snake.health = max_health;
    }

    /// Clear per-turn flags before a new turn resolves
    pub fn begin_turn(&mut self) {
        for snake in &mut self.snakes {
            snake.ate_food_this_turn = false;
        }
    }

    /// Cells covered by live snakes, leaving out the `excluding` ids
    pub fn occupancy_map(
        &self,
        grid_width: usize,
        grid_height: usize,
        excluding: &[usize],
    ) -> OccupancyMap {
        let mut map = OccupancyMap::new(grid_width, grid_height);
        for snake in self
            .snakes
            .iter()
            .filter(|snake| snake.alive && !excluding.contains(&snake.id))
        {
            for &pos in &snake.body {
                map.mark(pos);
            }
        }
        map
    }
}
