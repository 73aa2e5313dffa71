use rand::{SeedableRng, rngs::StdRng};

use super::{
    action::Direction,
    collision::{CollisionOutcome, CollisionResolver},
    config::GameConfig,
    food::FoodLedger,
    rewards::{RewardEvent, RewardPolicy, SimpleRewards},
    snakes::{Snake, SnakeStore},
    state::{GameState, InitialState},
};
use crate::error::{GameError, Result};

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Turn counter after the step
    pub current_turn: u32,
    /// Health of every snake; dead snakes keep their last value
    pub snake_health: Vec<u32>,
    /// Collision outcome per snake, `None` for snakes that were already dead
    /// when collisions were resolved
    pub outcomes: Vec<Option<CollisionOutcome>>,
    /// Reward events emitted per snake, in emission order
    pub events: Vec<Vec<RewardEvent>>,
    /// Food eaten during the step
    pub food_eaten: usize,
}

impl StepInfo {
    fn from_state(state: &GameState) -> Self {
        let n = state.number_of_snakes();
        Self {
            current_turn: state.turn_count,
            snake_health: state.healths(),
            outcomes: vec![None; n],
            events: vec![Vec::new(); n],
            food_eaten: 0,
        }
    }
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Reward per snake for this step
    pub rewards: Vec<f32>,
    /// Per-snake done flags (done means dead)
    pub dones: Vec<bool>,
    /// Whether the episode has ended (at most one snake left out of several)
    pub terminal: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// Rewards and events gathered while a turn resolves
struct TurnTally {
    rewards: Vec<f32>,
    events: Vec<Vec<RewardEvent>>,
}

impl TurnTally {
    fn new(n: usize) -> Self {
        Self {
            rewards: vec![0.0; n],
            events: vec![Vec::new(); n],
        }
    }
}

/// The turn engine: resolves simultaneous moves for every snake
#[derive(Debug, Clone)]
pub struct GameEngine<R = SimpleRewards> {
    config: GameConfig,
    rewards: R,
    rng: StdRng,
}

impl GameEngine<SimpleRewards> {
    /// Create an engine using the reward table from the configuration
    pub fn new(config: GameConfig) -> Result<Self> {
        let rewards = config.rewards.clone();
        Self::with_rewards(config, rewards)
    }
}

impl<R: RewardPolicy> GameEngine<R> {
    /// Create an engine with a custom reward policy
    pub fn with_rewards(config: GameConfig, rewards: R) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rewards,
            rng,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to a fresh initial state
    pub fn reset(&mut self) -> Result<GameState> {
        let config = &self.config;
        let snakes = SnakeStore::spawn(
            config.grid_width,
            config.grid_height,
            config.number_of_snakes,
            config.initial_snake_length,
            config.max_health,
            &config.snake_spawn_locations,
            &mut self.rng,
        )?;

        let mut food = FoodLedger::new(config.grid_width, config.grid_height, config.food.clone());
        let occupancy = snakes.occupancy_map(config.grid_width, config.grid_height, &[]);
        food.spawn_food(&occupancy, config.initial_food(), &mut self.rng);

        tracing::debug!(
            snakes = config.number_of_snakes,
            food = food.len(),
            "reset game"
        );

        Ok(GameState::new(snakes, food, config.grid_width, config.grid_height))
    }

    /// Build a state from an explicit layout
    ///
    /// The layout must match the configured board size and snake count.
    /// Snakes with zero health start dead.
    pub fn load_state(&self, initial: &InitialState) -> Result<GameState> {
        let config = &self.config;
        let expected = (config.grid_width, config.grid_height);
        let got = (initial.grid_width, initial.grid_height);
        if expected != got {
            return Err(GameError::MapSizeMismatch { expected, got });
        }
        if initial.snakes.len() != config.number_of_snakes {
            return Err(GameError::SnakeCountMismatch {
                expected: config.number_of_snakes,
                got: initial.snakes.len(),
            });
        }

        let mut snakes = Vec::with_capacity(initial.snakes.len());
        for (id, layout) in initial.snakes.iter().enumerate() {
            if layout.body.is_empty() {
                return Err(GameError::InvalidConfig(format!(
                    "snake {} has an empty body",
                    id
                )));
            }
            let health = layout.health.min(config.max_health);
            let mut snake = Snake::from_body(id, layout.body.clone(), health);
            snake.alive = snake.health > 0;
            let off_board = snake
                .body
                .iter()
                .find(|&&pos| !config.contains(pos))
                .filter(|_| snake.alive);
            if let Some(pos) = off_board {
                return Err(GameError::InvalidConfig(format!(
                    "snake {} has a segment off the board at ({}, {})",
                    id, pos.x, pos.y
                )));
            }
            snakes.push(snake);
        }

        let mut food = FoodLedger::new(config.grid_width, config.grid_height, config.food.clone());
        for &pos in &initial.food {
            if !config.contains(pos) {
                return Err(GameError::InvalidConfig(format!(
                    "food off the board at ({}, {})",
                    pos.x, pos.y
                )));
            }
            food.insert(pos);
        }

        let mut state = GameState::new(
            SnakeStore::new(snakes, config.max_health),
            food,
            config.grid_width,
            config.grid_height,
        );
        state.turn_count = initial.turn_count;
        Ok(state)
    }

    /// Info for a state that has not been stepped yet
    pub fn initial_info(&self, state: &GameState) -> StepInfo {
        StepInfo::from_state(state)
    }

    fn emit(&self, tally: &mut TurnTally, id: usize, event: RewardEvent, episode: Option<usize>) {
        tally.rewards[id] += self.rewards.reward(event, id, episode);
        tally.events[id].push(event);
    }

    /// Execute one turn for every snake
    ///
    /// `actions` holds one direction per snake id; entries for dead snakes are
    /// ignored. The whole turn is rejected up front if the action list does
    /// not cover every snake.
    pub fn step(
        &mut self,
        state: &mut GameState,
        actions: &[Direction],
        episode: Option<usize>,
    ) -> Result<StepResult> {
        let n = state.number_of_snakes();
        if actions.len() != n {
            return Err(GameError::ActionCountMismatch {
                expected: n,
                got: actions.len(),
            });
        }

        let mut tally = TurnTally::new(n);
        state.snakes.begin_turn();

        // Every live snake loses health and moves before any collision check
        for (id, &direction) in actions.iter().enumerate() {
            if !state.snakes.is_alive(id) {
                continue;
            }

            if state.snakes.decay_health(id) == 0 {
                state.snakes.kill(id);
                tracing::debug!(snake = id, turn = state.turn_count, "snake starved");
                self.emit(&mut tally, id, RewardEvent::Starved, episode);
                continue;
            }

            if state.snakes.apply_move(id, direction) {
                state.snakes.kill(id);
                tracing::debug!(snake = id, ?direction, "forbidden move");
                self.emit(&mut tally, id, RewardEvent::ForbiddenMove, episode);
            }
        }

        // Judge everyone against the same moved board, then apply the results
        let verdicts = CollisionResolver::new(&state.snakes, state.grid_width, state.grid_height)
            .resolve_all();

        let mut outcomes = vec![None; n];
        let mut food_eaten = 0;
        for (id, should_kill, outcome) in verdicts {
            outcomes[id] = Some(outcome);
            if should_kill {
                state.snakes.kill(id);
                tracing::debug!(snake = id, ?outcome, "snake killed");
            }

            let head = state.snakes.head(id);
            if state.snakes.is_alive(id) && state.food.has_food(head) {
                food_eaten += 1;
                state.snakes.set_ate_food(id);
                state.snakes.grow(id);
                state.food.remove(head);
                tracing::debug!(snake = id, x = head.x, y = head.y, "ate food");
                self.emit(&mut tally, id, RewardEvent::AteFood, episode);
            }

            if let Some(event) = outcome.reward_event() {
                self.emit(&mut tally, id, event, episode);
            }

            if state.snakes.is_alive(id) {
                self.emit(&mut tally, id, RewardEvent::AnotherTurn, episode);
            }
        }

        let alive = state.alive_count();
        let occupancy = state.occupancy_map();
        state
            .food
            .end_of_turn(&occupancy, food_eaten, alive, &mut self.rng);

        let terminal = n > 1 && alive <= 1;
        if terminal {
            for id in 0..n {
                let event = if state.snakes.is_alive(id) {
                    RewardEvent::Won
                } else {
                    RewardEvent::Died
                };
                self.emit(&mut tally, id, event, episode);
            }
            tracing::debug!(
                turn = state.turn_count,
                winner = ?state.snakes.iter().find(|snake| snake.alive).map(|snake| snake.id),
                "episode finished"
            );
        }

        state.turn_count += 1;

        let info = StepInfo {
            current_turn: state.turn_count,
            snake_health: state.healths(),
            outcomes,
            events: tally.events,
            food_eaten,
        };

        Ok(StepResult {
            rewards: tally.rewards,
            dones: state.dones(),
            terminal,
            info,
        })
    }
}
