use serde::{Deserialize, Serialize};

use super::{action::Direction, food::FoodLedger, snakes::SnakeStore};

/// A position on the game grid
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// Grid (Manhattan) distance to another position
    pub fn manhattan_distance(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Boolean grid marking cells covered by at least one snake segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyMap {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl OccupancyMap {
    /// Create an empty map
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        let in_bounds = pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height;
        in_bounds.then(|| pos.y as usize * self.width + pos.x as usize)
    }

    /// Mark a cell as occupied; positions off the board are ignored
    pub fn mark(&mut self, pos: Position) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = true;
        }
    }

    /// Off-board positions are never occupied
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|idx| self.cells[idx])
    }

    /// Number of occupied cells
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&occupied| occupied).count()
    }

    /// All free cells in row-major order
    pub fn free_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, occupied)| !**occupied)
            .map(|(idx, _)| {
                Position::new((idx % self.width) as i32, (idx / self.width) as i32)
            })
    }
}

/// Starting layout for a single snake in an [`InitialState`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnakeLayout {
    /// Body segments, head first
    pub body: Vec<Position>,
    pub health: u32,
}

/// A mid-game position to start an episode from
///
/// Must agree with the engine configuration on board size and snake count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialState {
    pub grid_width: usize,
    pub grid_height: usize,
    pub turn_count: u32,
    pub snakes: Vec<SnakeLayout>,
    pub food: Vec<Position>,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snakes: SnakeStore,
    pub food: FoodLedger,
    pub grid_width: usize,
    pub grid_height: usize,
    pub turn_count: u32,
}

impl GameState {
    /// Create a new game state
    pub fn new(
        snakes: SnakeStore,
        food: FoodLedger,
        grid_width: usize,
        grid_height: usize,
    ) -> Self {
        Self {
            snakes,
            food,
            grid_width,
            grid_height,
            turn_count: 0,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    /// Occupancy of every live snake
    pub fn occupancy_map(&self) -> OccupancyMap {
        self.snakes
            .occupancy_map(self.grid_width, self.grid_height, &[])
    }

    pub fn number_of_snakes(&self) -> usize {
        self.snakes.len()
    }

    pub fn alive_count(&self) -> usize {
        self.snakes.alive_count()
    }

    /// Per-snake done flags (done means dead)
    pub fn dones(&self) -> Vec<bool> {
        self.snakes.iter().map(|snake| !snake.alive).collect()
    }

    /// Current health of every snake; dead snakes report their last value
    pub fn healths(&self) -> Vec<u32> {
        self.snakes.iter().map(|snake| snake.health).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_in_direction(Direction::Up), Position::new(5, 4));
        assert_eq!(pos.moved_in_direction(Direction::Down), Position::new(5, 6));
    }

    #[test]
    fn test_manhattan_distance() {
        let pos = Position::new(2, 2);
        assert_eq!(pos.manhattan_distance(Position::new(2, 3)), 1);
        assert_eq!(pos.manhattan_distance(Position::new(3, 3)), 2);
        assert_eq!(pos.manhattan_distance(Position::new(-1, 2)), 3);
        assert_eq!(pos.manhattan_distance(pos), 0);
    }

    #[test]
    fn test_occupancy_map_bounds() {
        let mut map = OccupancyMap::new(3, 2);
        map.mark(Position::new(1, 1));
        map.mark(Position::new(-1, 0));
        map.mark(Position::new(3, 0));

        assert!(map.is_occupied(Position::new(1, 1)));
        assert!(!map.is_occupied(Position::new(0, 0)));
        assert!(!map.is_occupied(Position::new(-1, 0)));
        assert_eq!(map.count(), 1);
        assert_eq!(map.free_cells().count(), 5);
        assert!(!map.free_cells().any(|pos| pos == Position::new(1, 1)));
    }
}
